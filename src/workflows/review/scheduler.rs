use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::directory::{ApplicantDirectory, FetchError};
use super::gateway::DirectoryGateway;
use crate::config::RefreshConfig;

/// Exponential backoff with a ceiling and no jitter. The interval doubles on
/// every failed load and snaps back to the base on the first success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshPolicy {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl RefreshPolicy {
    pub fn new(base: Duration, max: Duration) -> Self {
        let max = max.max(base);
        Self {
            base,
            max,
            current: base,
        }
    }

    pub fn from_config(config: &RefreshConfig) -> Self {
        Self::new(config.base_interval(), config.max_interval())
    }

    /// Delay until the next scheduled silent load.
    pub fn current_interval(&self) -> Duration {
        self.current
    }

    pub fn on_success(&mut self) {
        self.current = self.base;
    }

    pub fn on_failure(&mut self) {
        self.current = (self.current * 2).min(self.max);
    }
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self::from_config(&RefreshConfig::default())
    }
}

/// Keeps the directory fresh without user interaction.
///
/// An immediate load runs on startup; afterwards silent loads fire on the
/// policy interval. Ticks are skipped (but still rescheduled) while the
/// hosting view is hidden, and a hidden-to-visible flip triggers an
/// immediate silent load. Every load supersedes the previous one via the
/// directory's tickets, so only the most recently issued response applies.
pub struct RefreshScheduler<G> {
    gateway: Arc<G>,
    directory: Arc<Mutex<ApplicantDirectory>>,
    policy: RefreshPolicy,
    visibility: watch::Receiver<bool>,
}

impl<G> RefreshScheduler<G>
where
    G: DirectoryGateway,
{
    pub fn new(
        gateway: Arc<G>,
        directory: Arc<Mutex<ApplicantDirectory>>,
        policy: RefreshPolicy,
        visibility: watch::Receiver<bool>,
    ) -> Self {
        Self {
            gateway,
            directory,
            policy,
            visibility,
        }
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// User-initiated refresh. Shares the load path (and therefore the
    /// success/failure interval bookkeeping) with scheduled loads.
    pub async fn refresh(&mut self) -> Result<usize, FetchError> {
        self.load_once().await
    }

    async fn load_once(&mut self) -> Result<usize, FetchError> {
        let ticket = {
            let mut directory = self.directory.lock().unwrap_or_else(PoisonError::into_inner);
            directory.begin_load()
        };

        let outcome = self.gateway.list_applicants().await;

        let result = {
            let mut directory = self.directory.lock().unwrap_or_else(PoisonError::into_inner);
            directory.complete_load(ticket, outcome)
        };

        match &result {
            Ok(count) => {
                self.policy.on_success();
                debug!(count, "directory refreshed");
            }
            Err(FetchError::Superseded) => {}
            Err(FetchError::Transport(err)) => {
                self.policy.on_failure();
                warn!(
                    error = %err,
                    next_interval_ms = self.policy.current_interval().as_millis() as u64,
                    "refresh failed; backing off"
                );
            }
        }
        result
    }

    /// Run the refresh loop until the visibility channel closes.
    pub async fn run(mut self) {
        let _ = self.load_once().await;

        loop {
            let delay = self.policy.current_interval();
            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    if *self.visibility.borrow() {
                        let _ = self.load_once().await;
                    } else {
                        debug!("view hidden; skipping scheduled refresh");
                    }
                }
                changed = self.visibility.changed() => {
                    match changed {
                        Ok(()) => {
                            let visible = *self.visibility.borrow_and_update();
                            if visible {
                                debug!("view became visible; refreshing immediately");
                                let _ = self.load_once().await;
                            }
                        }
                        Err(_) => {
                            info!("visibility source dropped; stopping refresh loop");
                            break;
                        }
                    }
                }
            }
        }
    }
}
