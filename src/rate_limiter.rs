// ⏱️ Rate Limiter - Minimum spacing between registry requests
// Blocking wrapper over a governor GCRA limiter with a burst of one

use governor::clock::{Clock, DefaultClock};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GcraLimiter};
use std::thread;
use std::time::Duration;

pub struct RateLimiter {
    interval: Duration,

    /// None when spacing is disabled (zero interval)
    limiter: Option<DefaultDirectRateLimiter>,
    clock: DefaultClock,
}

impl RateLimiter {
    pub fn new(interval: Duration) -> Self {
        // with_period yields a single-cell quota, None for a zero period
        let limiter = Quota::with_period(interval).map(GcraLimiter::direct);

        RateLimiter {
            interval,
            limiter,
            clock: DefaultClock::default(),
        }
    }

    /// Negative, non-finite or out-of-range values mean "no spacing"
    pub fn from_secs_f64(secs: f64) -> Self {
        let interval = if secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        };
        RateLimiter::new(interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Block until the next request is allowed
    pub fn wait(&mut self) {
        let Some(limiter) = &self.limiter else {
            return;
        };

        while let Err(not_until) = limiter.check() {
            thread::sleep(not_until.wait_time_from(self.clock.now()));
        }
    }
}

impl Default for RateLimiter {
    /// 0.2s → at most 5 requests per second
    fn default() -> Self {
        RateLimiter::new(Duration::from_millis(200))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_first_wait_does_not_sleep() {
        let mut limiter = RateLimiter::new(Duration::from_secs(5));
        let start = Instant::now();
        limiter.wait();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_consecutive_waits_are_spaced() {
        let interval = Duration::from_millis(30);
        let mut limiter = RateLimiter::new(interval);
        let calls = 5;

        let start = Instant::now();
        for _ in 0..calls {
            limiter.wait();
        }

        // governor and std read different monotonic sources; allow clock skew only
        assert!(start.elapsed() + Duration::from_millis(1) >= interval * (calls - 1));
    }

    #[test]
    fn test_zero_interval_never_blocks() {
        let mut limiter = RateLimiter::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..100 {
            limiter.wait();
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_invalid_seconds_mean_no_spacing() {
        assert_eq!(RateLimiter::from_secs_f64(-1.0).interval(), Duration::ZERO);
        assert_eq!(RateLimiter::from_secs_f64(f64::NAN).interval(), Duration::ZERO);
        assert_eq!(RateLimiter::from_secs_f64(0.2).interval().as_millis(), 200);
    }

    #[test]
    fn test_overflowing_seconds_do_not_panic() {
        assert_eq!(RateLimiter::from_secs_f64(1e30).interval(), Duration::ZERO);
        assert_eq!(RateLimiter::from_secs_f64(f64::INFINITY).interval(), Duration::ZERO);
    }

    #[test]
    fn test_default_is_five_per_second() {
        assert_eq!(RateLimiter::default().interval(), Duration::from_millis(200));
    }
}
