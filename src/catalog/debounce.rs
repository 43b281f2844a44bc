//! Trailing-edge debounce with injected time.

use std::time::{Duration, Instant};

#[derive(Debug)]
/// Holds the latest pushed value until `wait` has passed without a newer one.
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    /// Replace any pending value and restart the window at `now`.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now));
    }

    /// Pending value, if its window has elapsed by `now`.
    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((_, pushed_at)) if now.saturating_duration_since(*pushed_at) >= self.wait => {
                self.pending.take().map(|(value, _)| value)
            }
            _ => None,
        }
    }

    /// Pending value regardless of timing.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .as_ref()
            .map(|(_, pushed_at)| *pushed_at + self.wait)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SEARCH_DEBOUNCE;

    #[test]
    fn only_last_value_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.push("d", start);
        debouncer.push("do", start + Duration::from_millis(100));
        debouncer.push("dom", start + Duration::from_millis(200));
        assert_eq!(
            debouncer.deadline(),
            Some(start + Duration::from_millis(500))
        );

        assert_eq!(debouncer.take_due(start + Duration::from_millis(400)), None);
        assert_eq!(
            debouncer.take_due(start + Duration::from_millis(500)),
            Some("dom")
        );
        assert!(!debouncer.is_pending());
        assert_eq!(debouncer.deadline(), None);
        assert_eq!(debouncer.take_due(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn flush_ignores_timing() {
        let now = Instant::now();
        let mut debouncer = Debouncer::new(SEARCH_DEBOUNCE);
        debouncer.push(String::from("iracema"), now);
        assert_eq!(debouncer.flush().as_deref(), Some("iracema"));
        assert_eq!(debouncer.flush(), None);
    }
}
