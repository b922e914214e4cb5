use std::time::{Duration, Instant};

/// Debounce for search input: each submission restarts the window, and only
/// the latest query is released once the window has elapsed. Keyed text
/// input therefore drives at most one filter pass per quiet period.
#[derive(Debug)]
pub struct QueryDebouncer {
    window: Duration,
    pending: Option<(String, Instant)>,
}

impl QueryDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    /// Record a keystroke's worth of input at `now`.
    pub fn submit(&mut self, query: impl Into<String>, now: Instant) {
        self.pending = Some((query.into(), now));
    }

    /// Release the pending query if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<String> {
        match &self.pending {
            Some((_, submitted_at)) if now.duration_since(*submitted_at) >= self.window => {
                self.pending.take().map(|(query, _)| query)
            }
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(250);

    #[test]
    fn releases_only_after_the_window() {
        let mut debouncer = QueryDebouncer::new(WINDOW);
        let start = Instant::now();
        debouncer.submit("ja", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(100)), None);
        assert_eq!(
            debouncer.poll(start + WINDOW),
            Some("ja".to_string())
        );
        assert!(debouncer.is_idle());
    }

    #[test]
    fn later_submission_replaces_earlier_one() {
        let mut debouncer = QueryDebouncer::new(WINDOW);
        let start = Instant::now();
        debouncer.submit("ja", start);
        debouncer.submit("jane", start + Duration::from_millis(200));

        // The first query's window has elapsed but it was superseded.
        assert_eq!(debouncer.poll(start + Duration::from_millis(300)), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(450)),
            Some("jane".to_string())
        );
    }
}
