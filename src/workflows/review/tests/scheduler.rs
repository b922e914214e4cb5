use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use super::common::*;
use crate::config::RefreshConfig;
use crate::workflows::review::directory::{ApplicantDirectory, FetchError};
use crate::workflows::review::scheduler::{RefreshPolicy, RefreshScheduler};

#[test]
fn backoff_doubles_to_the_cap_and_resets_on_success() {
    let mut policy = RefreshPolicy::new(Duration::from_secs(30), Duration::from_secs(120));
    assert_eq!(policy.current_interval(), Duration::from_secs(30));

    policy.on_failure();
    assert_eq!(policy.current_interval(), Duration::from_secs(60));
    policy.on_failure();
    assert_eq!(policy.current_interval(), Duration::from_secs(120));
    policy.on_failure();
    assert_eq!(policy.current_interval(), Duration::from_secs(120), "capped");

    policy.on_success();
    assert_eq!(policy.current_interval(), Duration::from_secs(30));
}

#[test]
fn policy_mirrors_the_refresh_config() {
    let config = RefreshConfig {
        base_interval_ms: 5_000,
        max_interval_ms: 20_000,
        search_debounce_ms: 250,
    };
    let policy = RefreshPolicy::from_config(&config);
    assert_eq!(policy.current_interval(), Duration::from_millis(5_000));

    // A cap below the base is clamped up rather than inverting the window.
    let clamped = RefreshPolicy::new(Duration::from_secs(60), Duration::from_secs(30));
    let mut clamped = clamped;
    clamped.on_failure();
    assert_eq!(clamped.current_interval(), Duration::from_secs(60));
}

#[tokio::test]
async fn manual_refresh_loads_the_directory_and_tracks_failures() {
    let gateway = Arc::new(RecordingGateway::default());
    gateway.queue_listing(Err(status_error("/api/applications")));
    let directory = Arc::new(Mutex::new(ApplicantDirectory::new()));
    let (_tx, rx) = watch::channel(true);
    let mut scheduler = RefreshScheduler::new(
        gateway.clone(),
        directory.clone(),
        RefreshPolicy::new(Duration::from_secs(30), Duration::from_secs(120)),
        rx,
    );

    match scheduler.refresh().await {
        Err(FetchError::Transport(_)) => {}
        other => panic!("expected transport error, got {other:?}"),
    }
    assert_eq!(
        scheduler.policy().current_interval(),
        Duration::from_secs(60),
        "failure doubles the interval"
    );

    let count = scheduler.refresh().await.expect("fallback listing loads");
    assert_eq!(count, 2);
    assert_eq!(
        scheduler.policy().current_interval(),
        Duration::from_secs(30),
        "success resets the interval"
    );
    let directory = directory.lock().expect("directory mutex poisoned");
    assert_eq!(directory.len(), 2);
}

async fn settle() {
    for _ in 0..16 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test(start_paused = true)]
async fn hidden_views_skip_ticks_and_refresh_on_becoming_visible() {
    let gateway = Arc::new(RecordingGateway::default());
    let directory = Arc::new(Mutex::new(ApplicantDirectory::new()));
    let (tx, rx) = watch::channel(false);
    let scheduler = RefreshScheduler::new(
        gateway.clone(),
        directory.clone(),
        RefreshPolicy::new(Duration::from_secs(30), Duration::from_secs(120)),
        rx,
    );
    let handle = tokio::spawn(scheduler.run());

    // The startup load runs regardless of visibility.
    settle().await;
    assert_eq!(gateway.list_calls(), 1);

    // Two scheduled ticks pass while hidden; both are skipped.
    tokio::time::sleep(Duration::from_secs(65)).await;
    settle().await;
    assert_eq!(gateway.list_calls(), 1);

    // Becoming visible triggers an immediate load, not a wait for the tick.
    tx.send(true).expect("receiver alive");
    settle().await;
    assert_eq!(gateway.list_calls(), 2);

    // Visible ticks load on schedule.
    tokio::time::sleep(Duration::from_secs(31)).await;
    settle().await;
    assert_eq!(gateway.list_calls(), 3);

    // Dropping the visibility source stops the loop.
    drop(tx);
    handle.await.expect("refresh loop exits cleanly");
}

#[tokio::test(start_paused = true)]
async fn startup_load_populates_the_shared_directory() {
    let gateway = Arc::new(RecordingGateway::default());
    let directory = Arc::new(Mutex::new(ApplicantDirectory::new()));
    let (tx, rx) = watch::channel(true);
    let scheduler = RefreshScheduler::new(
        gateway,
        directory.clone(),
        RefreshPolicy::default(),
        rx,
    );
    let handle = tokio::spawn(scheduler.run());

    settle().await;
    {
        let directory = directory.lock().expect("directory mutex poisoned");
        assert_eq!(directory.len(), 2);
        assert!(directory.sync_status().last_synced_at.is_some());
    }

    drop(tx);
    handle.await.expect("refresh loop exits cleanly");
}
