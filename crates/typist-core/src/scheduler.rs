#![forbid(unsafe_code)]

//! Single-slot delayed-tick scheduler.
//!
//! A [`Scheduler`] holds at most one pending payload. The payload plays the
//! role of a delayed callback: when it comes due, [`Scheduler::poll`] hands it
//! back to the owner, who performs the work. Keeping callbacks as plain values
//! means a canceled tick is simply dropped and can never touch the owner's
//! state.
//!
//! Time is virtual. The owner advances it by polling up to a target time;
//! nothing fires inside [`Scheduler::schedule`], even with a zero delay.
//!
//! # Invariants
//!
//! 1. At most one payload is pending (`pending_count() <= 1`).
//! 2. `schedule()` discards any pending payload before storing the new one.
//! 3. `cancel_all()` on an empty scheduler changes nothing.
//! 4. A payload fires only from `poll()`, never from `schedule()`.
//! 5. Delays are measured from the logical time of the tick being handled,
//!    so polling far ahead replays ticks at their exact due times.
//! 6. `now()` never decreases.

use std::time::Duration;

#[derive(Debug)]
struct Pending<T> {
    due: Duration,
    payload: T,
}

/// Counters for diagnostics and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Payloads stored by `schedule()`.
    pub scheduled: u64,
    /// Payloads handed back by `poll()`.
    pub fired: u64,
    /// Payloads discarded by rescheduling or `cancel_all()`.
    pub canceled: u64,
}

/// One-pending-tick-at-a-time scheduler over a virtual clock.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: Duration,
    slot: Option<Pending<T>>,
    stats: SchedulerStats,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Create an idle scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            slot: None,
            stats: SchedulerStats::default(),
        }
    }

    /// Current logical time.
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `payload` to fire `delay` after the current logical time,
    /// discarding any payload that is still pending.
    pub fn schedule(&mut self, delay: Duration, payload: T) {
        self.cancel_all();
        self.slot = Some(Pending {
            due: self.now.saturating_add(delay),
            payload,
        });
        self.stats.scheduled += 1;
    }

    /// Discard the pending payload, if any. Returns whether one was pending.
    pub fn cancel_all(&mut self) -> bool {
        if self.slot.take().is_some() {
            self.stats.canceled += 1;
            true
        } else {
            false
        }
    }

    /// Fire the pending payload if it is due at or before `until`.
    ///
    /// On fire, the clock moves to the payload's due time (so work scheduled
    /// while handling it is timed from there) and the payload is returned.
    /// Otherwise the clock moves to `until` and `None` is returned. A target
    /// in the past leaves the clock where it is.
    pub fn poll(&mut self, until: Duration) -> Option<T> {
        let until = until.max(self.now);
        match self.slot.take() {
            Some(pending) if pending.due <= until => {
                self.now = self.now.max(pending.due);
                self.stats.fired += 1;
                Some(pending.payload)
            }
            other => {
                self.slot = other;
                self.now = until;
                None
            }
        }
    }

    /// Number of pending payloads (0 or 1).
    #[must_use]
    pub fn pending_count(&self) -> usize {
        usize::from(self.slot.is_some())
    }

    #[cfg(test)]
    fn peek(&self) -> Option<&T> {
        self.slot.as_ref().map(|p| &p.payload)
    }

    /// Time left until the pending payload is due (zero if overdue).
    #[must_use]
    pub fn time_until_due(&self) -> Option<Duration> {
        self.slot
            .as_ref()
            .map(|p| p.due.saturating_sub(self.now))
    }

    /// Lifetime counters, logged when the owner is disposed.
    #[must_use]
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_10: Duration = Duration::from_millis(10);
    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn new_scheduler_is_idle() {
        let s: Scheduler<u8> = Scheduler::new();
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.time_until_due(), None);
        assert_eq!(s.now(), Duration::ZERO);
    }

    #[test]
    fn fires_when_due() {
        let mut s = Scheduler::new();
        s.schedule(MS_100, "tick");
        assert_eq!(s.poll(Duration::from_millis(99)), None);
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.poll(MS_100), Some("tick"));
        assert_eq!(s.pending_count(), 0);
        assert_eq!(s.now(), MS_100);
    }

    #[test]
    fn schedule_replaces_pending() {
        let mut s = Scheduler::new();
        s.schedule(MS_10, 1);
        s.schedule(MS_100, 2);
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.peek(), Some(&2));
        assert_eq!(s.poll(MS_10), None);
        assert_eq!(s.poll(MS_100), Some(2));
        assert_eq!(s.stats().canceled, 1);
    }

    #[test]
    fn cancel_all_on_empty_is_noop() {
        let mut s: Scheduler<u8> = Scheduler::new();
        assert!(!s.cancel_all());
        assert!(!s.cancel_all());
        assert_eq!(s.stats(), SchedulerStats::default());
    }

    #[test]
    fn cancel_all_drops_pending() {
        let mut s = Scheduler::new();
        s.schedule(MS_10, 'x');
        assert!(s.cancel_all());
        assert_eq!(s.poll(MS_100), None);
        assert_eq!(s.stats().fired, 0);
    }

    #[test]
    fn zero_delay_never_fires_synchronously() {
        let mut s = Scheduler::new();
        s.schedule(Duration::ZERO, ());
        assert_eq!(s.pending_count(), 1);
        assert_eq!(s.time_until_due(), Some(Duration::ZERO));
        assert_eq!(s.poll(s.now()), Some(()));
    }

    #[test]
    fn delays_chain_from_due_time() {
        let mut s = Scheduler::new();
        s.schedule(MS_10, 0u32);
        let target = Duration::from_millis(35);
        let mut fired_at = Vec::new();
        while let Some(n) = s.poll(target) {
            fired_at.push(s.now());
            s.schedule(MS_10, n + 1);
        }
        assert_eq!(
            fired_at,
            vec![MS_10, Duration::from_millis(20), Duration::from_millis(30)]
        );
        assert_eq!(s.now(), target);
        assert_eq!(s.time_until_due(), Some(Duration::from_millis(5)));
    }

    #[test]
    fn poll_into_the_past_keeps_clock() {
        let mut s: Scheduler<u8> = Scheduler::new();
        s.poll(MS_100);
        s.poll(MS_10);
        assert_eq!(s.now(), MS_100);
    }

    #[test]
    fn peek_does_not_fire() {
        let mut s = Scheduler::new();
        s.schedule(MS_10, 7);
        assert_eq!(s.peek(), Some(&7));
        assert_eq!(s.pending_count(), 1);
    }
}
