//! Trailing-edge debouncer for search input.
//!
//! Time is passed in explicitly so the controller can be driven by whatever
//! clock the host uses (and by tests without sleeping). [`Debouncer::settled`]
//! is the async convenience for hosts running on tokio.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new input; any pending value is replaced and the timer restarts.
    pub fn push(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    /// Take the pending value if its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if ready { self.flush() } else { None }
    }

    /// Take the pending value immediately, ignoring the timer.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(value, _)| value)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(_, deadline)| *deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Sleep until the pending value settles and return it.
    ///
    /// Returns `None` immediately when nothing is pending.
    pub async fn settled(&mut self) -> Option<T> {
        let deadline = self.deadline()?;
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
        self.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn value_is_released_only_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.push("a", start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn each_push_restarts_the_timer() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.push("a", start);
        debouncer.push("ab", start + Duration::from_millis(200));
        debouncer.push("abc", start + Duration::from_millis(400));

        assert_eq!(debouncer.poll(start + Duration::from_millis(500)), None);
        assert_eq!(debouncer.poll(start + Duration::from_millis(700)), Some("abc"));
        assert_eq!(debouncer.poll(start + Duration::from_millis(900)), None);
    }

    #[test]
    fn cancel_drops_the_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.push("a", start);

        debouncer.cancel();

        assert_eq!(debouncer.poll(start + DELAY * 2), None);
    }

    #[tokio::test]
    async fn settled_waits_for_the_deadline() {
        let mut debouncer = Debouncer::new(Duration::from_millis(20));
        debouncer.push("abc", Instant::now());

        assert_eq!(debouncer.settled().await, Some("abc"));
        assert_eq!(debouncer.settled().await, None);
    }
}
