use std::time::{Duration, Instant};

/// A deadline owned by a round phase.
///
/// Nothing ticks in the background: remaining time is derived from the
/// instant the caller passes in, and `fire` reports the expiry exactly once
/// no matter how many times it is polled.
#[derive(Debug, Clone)]
pub struct Countdown {
    deadline: Instant,
    fired: bool,
}

impl Countdown {
    pub fn start(now: Instant, duration: Duration) -> Self {
        Self {
            deadline: now + duration,
            fired: false,
        }
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline.saturating_duration_since(now)
    }

    /// Remaining whole seconds, rounded up so a fresh 30 second countdown
    /// reads 30 and only an expired one reads 0.
    pub fn remaining_secs(&self, now: Instant) -> u64 {
        let millis = self.remaining(now).as_millis() as u64;
        millis.div_ceil(1000)
    }

    pub fn has_expired(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Returns true the first time it is called at or after the deadline.
    pub fn fire(&mut self, now: Instant) -> bool {
        if self.fired || !self.has_expired(now) {
            return false;
        }
        self.fired = true;
        true
    }
}
