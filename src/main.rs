use chrono::{Duration as ChronoDuration, Utc};
use clap::{Args, Parser, Subcommand};
use staffing_desk::config::AppConfig;
use staffing_desk::error::AppError;
use staffing_desk::telemetry;
use staffing_desk::workflows::review::{
    ApplicantDirectory, ApplicantStatus, DirectoryGateway, HttpDirectoryGateway, RefreshPolicy,
    RefreshScheduler,
};
use staffing_desk::{AuthContext, StaffRole};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Staffing Desk",
    about = "Inspect and monitor the agency applicant directory from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the directory once and print a status breakdown
    Fetch(FetchArgs),
    /// Keep the directory synchronized on the refresh schedule until interrupted
    Watch(WatchArgs),
}

#[derive(Args, Debug, Default)]
struct FetchArgs {
    /// Override the configured API base URL
    #[arg(long)]
    api_base: Option<String>,
    /// Substring search over names, emails, and phone numbers
    #[arg(long)]
    query: Option<String>,
    /// Restrict the listing to one pipeline status
    #[arg(long, value_parser = parse_status)]
    status: Option<ApplicantStatus>,
    /// Bearer token for endpoints that require a staff session
    /// (falls back to the API_TOKEN environment variable)
    #[arg(long)]
    token: Option<String>,
}

#[derive(Args, Debug, Default)]
struct WatchArgs {
    /// Override the configured API base URL
    #[arg(long)]
    api_base: Option<String>,
    /// Bearer token for endpoints that require a staff session
    /// (falls back to the API_TOKEN environment variable)
    #[arg(long)]
    token: Option<String>,
}

fn parse_status(raw: &str) -> Result<ApplicantStatus, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(ApplicantStatus::Pending),
        "vetted" => Ok(ApplicantStatus::Vetted),
        "approved" => Ok(ApplicantStatus::Approved),
        "rejected" => Ok(ApplicantStatus::Rejected),
        "hired" => Ok(ApplicantStatus::Hired),
        other => Err(format!(
            "unknown status '{other}' (expected pending, vetted, approved, rejected, or hired)"
        )),
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Fetch(args) => run_fetch(args).await,
        Command::Watch(args) => run_watch(args).await,
    }
}

fn build_gateway(
    config: &AppConfig,
    api_base: Option<String>,
    token: Option<String>,
) -> Result<HttpDirectoryGateway, AppError> {
    let api = match api_base {
        Some(base) => {
            staffing_desk::config::ApiConfig::new(base, config.api.request_timeout.as_secs())?
        }
        None => config.api.clone(),
    };

    let gateway = HttpDirectoryGateway::new(&api)?;
    let token = token.or_else(|| std::env::var("API_TOKEN").ok());
    if let Some(token) = token {
        // CLI sessions are treated as short-lived staff logins.
        gateway.set_auth(Some(AuthContext::new(
            token,
            Utc::now() + ChronoDuration::hours(8),
            StaffRole::Admin,
        )));
    }
    Ok(gateway)
}

async fn run_fetch(args: FetchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let FetchArgs {
        api_base,
        query,
        status,
        token,
    } = args;
    let gateway = build_gateway(&config, api_base, token)?;

    let mut directory = ApplicantDirectory::new();
    let ticket = directory.begin_load();
    let outcome = gateway.list_applicants().await;
    let count = directory.complete_load(ticket, outcome)?;
    info!(count, "directory loaded");

    render_directory(&directory, query.as_deref(), status);
    Ok(())
}

async fn run_watch(args: WatchArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let WatchArgs { api_base, token } = args;
    let gateway = Arc::new(build_gateway(&config, api_base, token)?);
    let directory = Arc::new(Mutex::new(ApplicantDirectory::new()));

    // The terminal is always "visible"; the sender is held so the loop keeps
    // running until ctrl-c.
    let (_visibility_tx, visibility_rx) = watch::channel(true);
    let scheduler = RefreshScheduler::new(
        gateway,
        directory.clone(),
        RefreshPolicy::from_config(&config.refresh),
        visibility_rx,
    );

    println!(
        "Watching the applicant directory (base interval {}ms, ctrl-c to stop)",
        config.refresh.base_interval_ms
    );

    tokio::select! {
        _ = scheduler.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("interrupt received; stopping watch");
        }
    }

    let directory = directory.lock().unwrap_or_else(PoisonError::into_inner);
    render_directory(&directory, None, None);
    Ok(())
}

fn render_directory(
    directory: &ApplicantDirectory,
    query: Option<&str>,
    status: Option<ApplicantStatus>,
) {
    let sync = directory.sync_status();
    match sync.last_synced_at {
        Some(at) => println!("Directory: {} applicants (synced {at})", directory.len()),
        None => println!("Directory: {} applicants (never synced)", directory.len()),
    }
    if sync.stale {
        println!("Warning: the last refresh failed; showing previous data");
    }

    println!("\nStatus breakdown");
    for wanted in [
        ApplicantStatus::Pending,
        ApplicantStatus::Vetted,
        ApplicantStatus::Approved,
        ApplicantStatus::Rejected,
        ApplicantStatus::Hired,
    ] {
        println!("- {}: {}", wanted, directory.with_status(Some(wanted)).len());
    }

    println!("\nLocations");
    for facet in directory.location_facets() {
        println!("- {}: {}", facet.display_label(), facet.count);
    }

    let listed: Vec<_> = match query {
        Some(query) => directory.search(query),
        None => directory.with_status(status),
    };
    let listed: Vec<_> = listed
        .into_iter()
        .filter(|record| status.map_or(true, |wanted| record.status == wanted))
        .collect();

    if query.is_some() || status.is_some() {
        if listed.is_empty() {
            println!("\nMatches: none");
        } else {
            println!("\nMatches");
            for record in listed {
                println!(
                    "- #{} {} | {} | {} | {}",
                    record.id,
                    record.full_name,
                    record.email,
                    record.phone_number,
                    record.status
                );
            }
        }
    }
}
