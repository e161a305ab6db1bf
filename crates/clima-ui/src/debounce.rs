//! Cancel-and-reschedule delay for suggestion lookups.

use std::time::Duration;

use tokio::time::Instant;

/// Holds at most one pending value, released once `quiet` has passed
/// without a newer [`schedule`](Debouncer::schedule).
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn quiet(&self) -> Duration {
        self.quiet
    }

    /// Replace any pending value and restart the quiet period
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.quiet));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, at)| *at)
    }

    /// The pending value, if its quiet period is over
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, at)) if now >= *at => self.pending.take().map(|(value, _)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(380));
        debouncer.schedule("li", start);

        assert_eq!(debouncer.take_due(start + Duration::from_millis(379)), None);
        assert_eq!(debouncer.take_due(start + Duration::from_millis(380)), Some("li"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_reschedule_restarts_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(380));
        debouncer.schedule("li", start);
        debouncer.schedule("lis", start + Duration::from_millis(300));

        assert_eq!(debouncer.take_due(start + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(680))
        );
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(680)),
            Some("lis")
        );
    }

    #[test]
    fn test_cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(Duration::from_millis(380));
        debouncer.schedule("li", start);
        debouncer.cancel();
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.take_due(start + Duration::from_secs(1)), None);
    }
}
