use std::time::Duration;
use tokio::time::Instant;

/// Token bucket applied to each connection's inbound messages.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    tokens: u32,
    max_tokens: u32,
    refill_rate: Duration,
    last_refill: Instant,
}

impl RateLimiter {
    pub fn new(max_tokens: u32, refill_rate: Duration) -> Self {
        Self {
            tokens: max_tokens,
            max_tokens,
            refill_rate,
            last_refill: Instant::now(),
        }
    }

    pub fn check_rate_limit(&mut self) -> bool {
        self.refill_tokens();

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }

    fn refill_tokens(&mut self) {
        if self.refill_rate.is_zero() {
            self.tokens = self.max_tokens;
            return;
        }

        let elapsed = self.last_refill.elapsed();
        let earned = elapsed.as_millis() / self.refill_rate.as_millis().max(1);
        if earned == 0 {
            return;
        }

        let missing = self.max_tokens - self.tokens;
        if earned >= u128::from(missing) {
            self.tokens = self.max_tokens;
            self.last_refill = Instant::now();
        } else {
            let earned = earned as u32;
            self.tokens += earned;
            // Keep the fractional progress towards the next token
            self.last_refill += self.refill_rate * earned;
        }
    }

    #[cfg(test)]
    fn remaining_tokens(&mut self) -> u32 {
        self.refill_tokens();
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_refill() {
        let mut limiter = RateLimiter::new(3, Duration::from_millis(500));

        assert!(limiter.check_rate_limit());
        assert!(limiter.check_rate_limit());
        assert!(limiter.check_rate_limit());
        assert!(!limiter.check_rate_limit());

        tokio::time::advance(Duration::from_millis(600)).await;
        assert_eq!(limiter.remaining_tokens(), 1);
        assert!(limiter.check_rate_limit());
        assert!(!limiter.check_rate_limit());

        // The 100ms left over from the last refill still counts
        tokio::time::advance(Duration::from_millis(400)).await;
        assert_eq!(limiter.remaining_tokens(), 1);

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(limiter.remaining_tokens(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_long_idle_refills_to_capacity_only() {
        let mut limiter = RateLimiter::new(3, Duration::from_millis(1));
        assert!(limiter.check_rate_limit());

        // Far more milliseconds than fit in a u32
        tokio::time::advance(Duration::from_secs(60 * 24 * 60 * 60)).await;
        assert_eq!(limiter.remaining_tokens(), 3);

        for _ in 0..3 {
            assert!(limiter.check_rate_limit());
        }
        assert!(!limiter.check_rate_limit());
    }
}
