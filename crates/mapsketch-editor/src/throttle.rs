//! Drop-intermediate throttling for pointer moves.

use std::time::{Duration, Instant};

/// Lets at most one value through per interval.
///
/// Values offered inside the window replace each other; the last one is kept
/// as pending and can be [`flush`](Throttle::flush)ed, so the final position
/// of a gesture is never lost.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_emit: Option<Instant>,
    pending: Option<T>,
}

impl<T> Throttle<T> {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_emit: None,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Offer `value` at time `now`; returns it when the window is open.
    pub fn offer(&mut self, now: Instant, value: T) -> Option<T> {
        let open = self
            .last_emit
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval);
        if open {
            self.last_emit = Some(now);
            self.pending = None;
            Some(value)
        } else {
            self.pending = Some(value);
            None
        }
    }

    /// Take the value held back by the last closed window.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Forget any pending value and reopen the window.
    pub fn reset(&mut self) {
        self.last_emit = None;
        self.pending = None;
    }
}
