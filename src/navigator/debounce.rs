//! Millisecond-deadline debouncing for the cooperative event loop.
//!
//! Timestamps are caller-supplied monotonic milliseconds, so the types are
//! trivially testable without sleeping.

/// Coalesces a burst of values into the last one, released after the
/// trigger stream has been quiet for `delay_ms`.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay_ms: u64,
    pending: Option<(T, u64)>,
}

impl<T> Debouncer<T> {
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Queue a value, replacing any pending one and restarting the delay.
    pub fn queue(&mut self, value: T, now_ms: u64) {
        self.pending = Some((value, now_ms));
    }

    /// Release the pending value once the delay has elapsed.
    pub fn take_ready(&mut self, now_ms: u64) -> Option<T> {
        let (_, queued_at) = self.pending.as_ref()?;
        if now_ms.saturating_sub(*queued_at) >= self.delay_ms {
            self.pending.take().map(|(value, _)| value)
        } else {
            None
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub const fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Absolute deadline of the pending value, for poll-timeout selection.
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending
            .as_ref()
            .map(|(_, queued_at)| queued_at + self.delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_before_delay() {
        let mut d = Debouncer::new(150);
        d.queue("abc", 1000);
        assert_eq!(d.take_ready(1100), None);
        assert!(d.is_pending());
    }

    #[test]
    fn test_ready_after_delay() {
        let mut d = Debouncer::new(150);
        d.queue("abc", 1000);
        assert_eq!(d.take_ready(1150), Some("abc"));
        assert!(!d.is_pending());
    }

    #[test]
    fn test_requeue_restarts_delay_and_keeps_latest() {
        let mut d = Debouncer::new(150);
        d.queue("old", 1000);
        d.queue("new", 1100);
        assert_eq!(d.take_ready(1150), None);
        assert_eq!(d.take_ready(1250), Some("new"));
    }

    #[test]
    fn test_cancel_discards_pending() {
        let mut d = Debouncer::new(30);
        d.queue(7usize, 0);
        d.cancel();
        assert_eq!(d.take_ready(1000), None);
    }

    #[test]
    fn test_next_deadline() {
        let mut d = Debouncer::new(30);
        assert_eq!(d.next_deadline(), None);
        d.queue((), 200);
        assert_eq!(d.next_deadline(), Some(230));
    }
}
