//! Request pacing
//!
//! Every gateway request, retries included, takes a slot from one shared
//! token bucket so a run never hammers the portal.

use crate::error::{Error, Result};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Sustained request rate plus burst allowance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pace {
    per_second: NonZeroU32,
    burst: NonZeroU32,
}

impl Pace {
    /// A zero rate is rejected; a zero burst means one request at a time.
    pub fn new(per_second: u32, burst: u32) -> Result<Self> {
        let per_second = NonZeroU32::new(per_second).ok_or_else(|| {
            Error::invalid_value("http.rate_limit.requests_per_second", "must be positive")
        })?;
        Ok(Self {
            per_second,
            burst: NonZeroU32::new(burst).unwrap_or(NonZeroU32::MIN),
        })
    }

    pub fn per_second(&self) -> u32 {
        self.per_second.get()
    }

    pub fn burst(&self) -> u32 {
        self.burst.get()
    }
}

impl Default for Pace {
    /// Two requests per second, two at once
    fn default() -> Self {
        let two = NonZeroU32::MIN.saturating_add(1);
        Self {
            per_second: two,
            burst: two,
        }
    }
}

/// Shared bucket handing out request slots at a [`Pace`]
#[derive(Clone)]
pub struct Pacer {
    pace: Pace,
    bucket: Arc<DefaultDirectRateLimiter>,
}

impl Pacer {
    pub fn new(pace: Pace) -> Self {
        let quota = Quota::per_second(pace.per_second).allow_burst(pace.burst);
        Self {
            pace,
            bucket: Arc::new(RateLimiter::direct(quota)),
        }
    }

    pub fn pace(&self) -> Pace {
        self.pace
    }

    /// Wait for a request slot and report how long the request was held
    pub async fn acquire(&self) -> Duration {
        if self.bucket.check().is_ok() {
            return Duration::ZERO;
        }

        let start = Instant::now();
        self.bucket.until_ready().await;
        let held = start.elapsed();
        debug!(
            held_ms = held.as_millis() as u64,
            per_second = self.pace.per_second(),
            "Request paced"
        );
        held
    }
}

impl std::fmt::Debug for Pacer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pacer").field("pace", &self.pace).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pace() {
        let pace = Pace::default();
        assert_eq!(pace.per_second(), 2);
        assert_eq!(pace.burst(), 2);
    }

    #[test]
    fn test_pace_rejects_zero_rate() {
        assert!(matches!(
            Pace::new(0, 4),
            Err(Error::InvalidConfigValue { ref field, .. })
                if field == "http.rate_limit.requests_per_second"
        ));
        assert_eq!(Pace::new(3, 0).unwrap().burst(), 1);
    }

    #[tokio::test]
    async fn test_pacer_holds_requests_past_burst() {
        let pacer = Pacer::new(Pace::new(20, 2).unwrap());

        assert_eq!(pacer.acquire().await, Duration::ZERO);
        assert_eq!(pacer.acquire().await, Duration::ZERO);
        assert!(pacer.acquire().await > Duration::ZERO);
    }

    #[tokio::test]
    async fn test_pacer_clones_share_bucket() {
        let pacer = Pacer::new(Pace::new(20, 1).unwrap());
        let other = pacer.clone();

        assert_eq!(pacer.acquire().await, Duration::ZERO);
        assert!(other.acquire().await > Duration::ZERO);
    }
}
