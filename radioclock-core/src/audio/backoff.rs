//! Reconnect back-off

/// First delay after a failure (milliseconds)
pub const INITIAL_DELAY_MS: u32 = 1_000;

/// Longest delay between attempts (milliseconds)
pub const MAX_DELAY_MS: u32 = 30_000;

/// Doubling delay between reconnect attempts, reset on success
#[derive(Debug, Clone, Default)]
pub struct Backoff {
    failures: u32,
}

impl Backoff {
    /// Create a back-off with no recorded failures
    pub const fn new() -> Self {
        Self { failures: 0 }
    }

    /// Record a failure and return how long to wait before retrying
    pub fn next_delay_ms(&mut self) -> u32 {
        let shift = self.failures.min(15);
        self.failures = self.failures.saturating_add(1);
        INITIAL_DELAY_MS.saturating_mul(1 << shift).min(MAX_DELAY_MS)
    }

    /// Forget past failures after a successful connection
    pub fn reset(&mut self) {
        self.failures = 0;
    }

    /// Consecutive failures since the last reset
    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doubles_up_to_limit() {
        let mut backoff = Backoff::new();
        let delays: [u32; 7] = core::array::from_fn(|_| backoff.next_delay_ms());
        assert_eq!(delays, [1_000, 2_000, 4_000, 8_000, 16_000, 30_000, 30_000]);
        assert_eq!(backoff.failures(), 7);
    }

    #[test]
    fn test_reset() {
        let mut backoff = Backoff::new();
        backoff.next_delay_ms();
        backoff.next_delay_ms();
        backoff.reset();
        assert_eq!(backoff.next_delay_ms(), INITIAL_DELAY_MS);
    }

    #[test]
    fn test_many_failures_do_not_overflow() {
        let mut backoff = Backoff::new();
        for _ in 0..1000 {
            assert!(backoff.next_delay_ms() <= MAX_DELAY_MS);
        }
    }
}
