//! Exponential backoff schedule shared by dispatch retries and provider
//! reconnection.

use std::time::Duration;

use meridian_core::constants::{
    DISPATCH_BACKOFF_BASE_MS, DISPATCH_BACKOFF_CAP_MS, DISPATCH_BACKOFF_FACTOR,
    DISPATCH_MAX_ATTEMPTS,
};

/// Iterator over retry delays: base 500 ms, doubling, capped at 30 s.
#[derive(Debug, Clone)]
pub struct Backoff {
    next_ms: u64,
    cap_ms: u64,
    factor: u64,
    remaining: u32,
}

impl Backoff {
    /// The dispatch schedule: 6 attempts total.
    pub fn dispatch() -> Self {
        Backoff {
            next_ms: DISPATCH_BACKOFF_BASE_MS,
            cap_ms: DISPATCH_BACKOFF_CAP_MS,
            factor: DISPATCH_BACKOFF_FACTOR as u64,
            remaining: DISPATCH_MAX_ATTEMPTS.saturating_sub(1),
        }
    }

    /// The reconnect schedule: same shape, unbounded attempts.
    pub fn reconnect() -> Self {
        Backoff {
            next_ms: DISPATCH_BACKOFF_BASE_MS,
            cap_ms: DISPATCH_BACKOFF_CAP_MS,
            factor: DISPATCH_BACKOFF_FACTOR as u64,
            remaining: u32::MAX,
        }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        let delay = Duration::from_millis(self.next_ms);
        self.next_ms = (self.next_ms * self.factor).min(self.cap_ms);
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_schedule_shape() {
        let delays: Vec<u64> = Backoff::dispatch().map(|d| d.as_millis() as u64).collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000], "5 waits for 6 attempts");
    }

    #[test]
    fn test_reconnect_caps_at_30s() {
        let delays: Vec<u64> = Backoff::reconnect()
            .take(10)
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays[6], 30_000);
        assert_eq!(delays[9], 30_000, "delay stays capped");
    }
}
