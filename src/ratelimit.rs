use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use rand::{Rng, rng};

use crate::error::ConfigError;

type WaitFn = dyn Fn(u32) -> Option<Duration> + Send + Sync;

/// How long to wait before a given attempt (1-based).
#[derive(Clone)]
pub enum WaitStrategy {
    Fixed(Duration),
    RandomRange { min: Duration, max: Duration },
    /// `base * 2^(attempt - 1)`, optionally capped.
    Exponential { base: Duration, max: Option<Duration> },
    Custom(Arc<WaitFn>),
}

impl WaitStrategy {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u32) -> Option<Duration> + Send + Sync + 'static,
    {
        WaitStrategy::Custom(Arc::new(f))
    }

    pub fn random_range(min: Duration, max: Duration) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidWaitRange { min, max });
        }
        Ok(WaitStrategy::RandomRange { min, max })
    }

    /// `None` means no wait; a zero duration is treated the same way.
    pub fn wait_duration(&self, attempt: u32) -> Option<Duration> {
        let duration = match self {
            WaitStrategy::Fixed(duration) => Some(*duration),
            WaitStrategy::RandomRange { min, max } => {
                if min >= max {
                    Some(*min)
                } else {
                    Some(rng().random_range(*min..=*max))
                }
            }
            WaitStrategy::Exponential { base, max } => {
                let exponent = attempt.saturating_sub(1).min(31);
                let delay = base.saturating_mul(1u32 << exponent);
                Some(max.map_or(delay, |cap| delay.min(cap)))
            }
            WaitStrategy::Custom(f) => f(attempt),
        };
        duration.filter(|duration| !duration.is_zero())
    }
}

impl fmt::Debug for WaitStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitStrategy::Fixed(duration) => f.debug_tuple("Fixed").field(duration).finish(),
            WaitStrategy::RandomRange { min, max } => f
                .debug_struct("RandomRange")
                .field("min", min)
                .field("max", max)
                .finish(),
            WaitStrategy::Exponential { base, max } => f
                .debug_struct("Exponential")
                .field("base", base)
                .field("max", max)
                .finish(),
            WaitStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

// The lower, the faster.
const MS_BETWEEN_REQ: Duration = Duration::from_millis(10);

pub struct RateLimiter {
    req_per_sec: DefaultDirectRateLimiter,
    ms_between_req: DefaultDirectRateLimiter,
}

impl RateLimiter {
    pub fn new(requests_per_second: u32) -> Result<Self, ConfigError> {
        let requests_per_second =
            NonZeroU32::new(requests_per_second).ok_or(ConfigError::InvalidRequestRate)?;
        // Limit to X total req/sec on average.
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(requests_per_second));

        // No two requests closer than Y ms.
        let quota = Quota::with_period(MS_BETWEEN_REQ).ok_or(ConfigError::InvalidRequestRate)?;
        let ms_between_req = GovernorRateLimiter::direct(quota);

        Ok(RateLimiter {
            req_per_sec,
            ms_between_req,
        })
    }

    pub async fn wait_until_ready(&self) {
        // Order matters: the per-second quota admits bursts, the spacing
        // limiter then serialises them.
        self.req_per_sec.until_ready().await;
        self.ms_between_req.until_ready().await;
    }
}

impl fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_wait_means_no_wait() {
        assert_eq!(WaitStrategy::Fixed(Duration::ZERO).wait_duration(1), None);
        assert_eq!(
            WaitStrategy::Fixed(Duration::from_millis(250)).wait_duration(3),
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn exponential_wait_doubles_and_caps() {
        let strategy = WaitStrategy::Exponential {
            base: Duration::from_secs(1),
            max: Some(Duration::from_secs(5)),
        };
        assert_eq!(strategy.wait_duration(1), Some(Duration::from_secs(1)));
        assert_eq!(strategy.wait_duration(2), Some(Duration::from_secs(2)));
        assert_eq!(strategy.wait_duration(3), Some(Duration::from_secs(4)));
        assert_eq!(strategy.wait_duration(4), Some(Duration::from_secs(5)));
    }

    #[test]
    fn random_wait_stays_in_range() {
        let min = Duration::from_millis(100);
        let max = Duration::from_millis(200);
        let strategy = WaitStrategy::random_range(min, max).unwrap();
        for attempt in 1..20 {
            let wait = strategy.wait_duration(attempt).unwrap();
            assert!(wait >= min && wait <= max);
        }
        assert!(WaitStrategy::random_range(max, min).is_err());
    }

    #[test]
    fn custom_strategy_sees_attempt_index() {
        let strategy = WaitStrategy::from_fn(|attempt| {
            (attempt > 1).then(|| Duration::from_millis(u64::from(attempt) * 10))
        });
        assert_eq!(strategy.wait_duration(1), None);
        assert_eq!(strategy.wait_duration(3), Some(Duration::from_millis(30)));
    }

    #[test]
    fn rate_limiter_rejects_zero_rate() {
        assert!(RateLimiter::new(0).is_err());
        assert!(RateLimiter::new(5).is_ok());
    }

    #[tokio::test]
    async fn rate_limiter_admits_first_request_immediately() {
        let limiter = RateLimiter::new(80).unwrap();
        let started = std::time::Instant::now();
        limiter.wait_until_ready().await;
        assert!(started.elapsed() < Duration::from_secs(1));
    }
}
