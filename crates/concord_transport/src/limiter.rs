//! Per-bucket rate-limit bookkeeping and the global limiter.
//!
//! Discord declares the bucket for a route via `X-RateLimit-Bucket` and
//! the current budget via `X-RateLimit-Remaining` / `X-RateLimit-Reset-After`.
//! The coordinator keeps one record per route key, admits requests FIFO per
//! bucket (a held tokio mutex queues waiters in arrival order), waits out
//! exhausted budgets before sending, and can block every bucket when
//! Discord signals a global limit.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use reqwest::header::HeaderMap;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Discord's documented global request budget per second.
const GLOBAL_REQUESTS_PER_SECOND: u32 = 50;

#[derive(Debug, Default)]
struct BucketState {
    /// Requests left in the current window, when known.
    remaining: Option<u32>,
    /// When the window resets, when known.
    reset_at: Option<Instant>,
    /// Discord's bucket key for this route, once learned.
    bucket_key: Option<String>,
}

#[derive(Debug)]
struct Bucket {
    /// FIFO admission latch; held across the HTTP round trip.
    latch: Arc<Mutex<()>>,
    state: std::sync::Mutex<BucketState>,
}

impl Bucket {
    fn new() -> Self {
        Self {
            latch: Arc::new(Mutex::new(())),
            state: std::sync::Mutex::new(BucketState::default()),
        }
    }
}

/// Rate-limit fields parsed from a Discord response.
///
/// Parsing is a separate seam from bookkeeping so header handling is
/// directly testable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateLimitUpdate {
    /// `X-RateLimit-Bucket`.
    pub bucket: Option<String>,
    /// `X-RateLimit-Remaining`.
    pub remaining: Option<u32>,
    /// `X-RateLimit-Reset-After`, seconds.
    pub reset_after: Option<f64>,
    /// `Retry-After`, seconds (429 responses).
    pub retry_after: Option<f64>,
    /// `X-RateLimit-Global` was set.
    pub global: bool,
}

impl RateLimitUpdate {
    /// Parse the `X-RateLimit-*` and `Retry-After` headers.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            bucket: header_str(headers, "x-ratelimit-bucket"),
            remaining: header_parse(headers, "x-ratelimit-remaining"),
            reset_after: header_parse(headers, "x-ratelimit-reset-after"),
            retry_after: header_parse(headers, "retry-after"),
            global: header_str(headers, "x-ratelimit-global").is_some(),
        }
    }

    /// The retry delay for a 429, preferring `Retry-After`.
    pub fn retry_delay(&self) -> Option<Duration> {
        self.retry_after
            .or(self.reset_after)
            .map(Duration::from_secs_f64)
    }
}

/// Observable bucket state, for tests and logging.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketSnapshot {
    /// Requests left in the window, when known.
    pub remaining: Option<u32>,
    /// Discord's bucket key, once learned.
    pub bucket_key: Option<String>,
    /// Whether a reset instant is pending in the future.
    pub reset_pending: bool,
}

/// Admission ticket for one request; dropping it releases the bucket.
pub struct Admission {
    _latch: OwnedMutexGuard<()>,
    bucket: Arc<Bucket>,
}

/// The rate-limit coordinator embedded in the transport.
///
/// Safe for concurrent use: operations on different buckets proceed in
/// parallel; within one bucket requests are serialized FIFO.
#[derive(Debug)]
pub struct RateLimitCoordinator {
    buckets: Mutex<HashMap<String, Arc<Bucket>>>,
    global_block: RwLock<Option<Instant>>,
    global: DefaultDirectRateLimiter,
}

impl RateLimitCoordinator {
    /// Create a coordinator with the default global budget.
    pub fn new() -> Self {
        let per_second = NonZeroU32::new(GLOBAL_REQUESTS_PER_SECOND)
            .expect("global request budget is non-zero");
        Self {
            buckets: Mutex::new(HashMap::new()),
            global_block: RwLock::new(None),
            global: RateLimiter::direct(Quota::per_second(per_second)),
        }
    }

    /// Admit one request on `route`, blocking until the bucket and the
    /// global limiter allow it. The returned [`Admission`] must be held
    /// until [`record`](Self::record) is called for the response.
    #[instrument(skip(self))]
    pub async fn admit(&self, route: &str) -> Admission {
        let bucket = {
            let mut buckets = self.buckets.lock().await;
            buckets
                .entry(route.to_string())
                .or_insert_with(|| Arc::new(Bucket::new()))
                .clone()
        };

        let latch = bucket.latch.clone().lock_owned().await;

        // Global block applies to every bucket.
        loop {
            let until = *self.global_block.read().await;
            match until {
                Some(at) if at > Instant::now() => {
                    debug!("Waiting out global rate limit");
                    tokio::time::sleep_until(at).await;
                }
                _ => break,
            }
        }

        // Exhausted bucket: wait for the declared reset.
        let wait_until = {
            let state = bucket.state.lock().expect("bucket state lock poisoned");
            match (state.remaining, state.reset_at) {
                (Some(0), Some(reset_at)) if reset_at > Instant::now() => Some(reset_at),
                _ => None,
            }
        };
        if let Some(at) = wait_until {
            debug!(route, "Bucket exhausted, waiting for reset");
            tokio::time::sleep_until(at).await;
        }

        self.global.until_ready().await;

        Admission {
            _latch: latch,
            bucket,
        }
    }

    /// Record the response headers for an admitted request.
    ///
    /// A global 429 blocks every bucket until the retry delay elapses.
    #[instrument(skip(self, admission, update))]
    pub async fn record(&self, admission: &Admission, update: &RateLimitUpdate) {
        {
            let mut state = admission
                .bucket
                .state
                .lock()
                .expect("bucket state lock poisoned");
            if let Some(bucket_key) = &update.bucket {
                state.bucket_key = Some(bucket_key.clone());
            }
            if let Some(remaining) = update.remaining {
                state.remaining = Some(remaining);
            }
            if let Some(reset_after) = update.reset_after {
                state.reset_at = Some(Instant::now() + Duration::from_secs_f64(reset_after));
            }
        }

        if update.global {
            if let Some(delay) = update.retry_delay() {
                warn!(delay_secs = delay.as_secs_f64(), "Global rate limit hit, blocking all buckets");
                let until = Instant::now() + delay;
                let mut block = self.global_block.write().await;
                if block.is_none_or(|existing| existing < until) {
                    *block = Some(until);
                }
            }
        }
    }

    /// Snapshot a bucket's bookkeeping, for tests and diagnostics.
    pub async fn snapshot(&self, route: &str) -> Option<BucketSnapshot> {
        let buckets = self.buckets.lock().await;
        let bucket = buckets.get(route)?;
        let state = bucket.state.lock().expect("bucket state lock poisoned");
        Some(BucketSnapshot {
            remaining: state.remaining,
            bucket_key: state.bucket_key.clone(),
            reset_pending: state.reset_at.is_some_and(|at| at > Instant::now()),
        })
    }
}

impl Default for RateLimitCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

fn header_str(headers: &HeaderMap, key: &str) -> Option<String> {
    headers.get(key)?.to_str().ok().map(String::from)
}

fn header_parse<T: std::str::FromStr>(headers: &HeaderMap, key: &str) -> Option<T> {
    headers.get(key)?.to_str().ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{HeaderName, HeaderValue};

    fn headers(entries: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (key, value) in entries {
            map.insert(
                HeaderName::from_bytes(key.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_parse_bucket_headers() {
        let update = RateLimitUpdate::from_headers(&headers(&[
            ("x-ratelimit-bucket", "abcd1234"),
            ("x-ratelimit-remaining", "3"),
            ("x-ratelimit-reset-after", "1.5"),
        ]));
        assert_eq!(update.bucket.as_deref(), Some("abcd1234"));
        assert_eq!(update.remaining, Some(3));
        assert_eq!(update.reset_after, Some(1.5));
        assert!(!update.global);
    }

    #[test]
    fn test_retry_delay_prefers_retry_after() {
        let update = RateLimitUpdate::from_headers(&headers(&[
            ("retry-after", "0.2"),
            ("x-ratelimit-reset-after", "9.0"),
        ]));
        assert_eq!(update.retry_delay(), Some(Duration::from_secs_f64(0.2)));
    }

    #[tokio::test]
    async fn test_record_updates_snapshot() {
        let coordinator = RateLimitCoordinator::new();
        let admission = coordinator.admit("GET:/guilds/1/roles").await;
        coordinator
            .record(
                &admission,
                &RateLimitUpdate {
                    bucket: Some("b1".into()),
                    remaining: Some(4),
                    reset_after: Some(2.0),
                    retry_after: None,
                    global: false,
                },
            )
            .await;
        drop(admission);

        let snap = coordinator.snapshot("GET:/guilds/1/roles").await.unwrap();
        assert_eq!(snap.remaining, Some(4));
        assert_eq!(snap.bucket_key.as_deref(), Some("b1"));
        assert!(snap.reset_pending);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_bucket_waits_for_reset() {
        let coordinator = RateLimitCoordinator::new();
        let admission = coordinator.admit("GET:/x").await;
        coordinator
            .record(
                &admission,
                &RateLimitUpdate {
                    remaining: Some(0),
                    reset_after: Some(5.0),
                    ..Default::default()
                },
            )
            .await;
        drop(admission);

        let start = Instant::now();
        let _second = coordinator.admit("GET:/x").await;
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_global_block_applies_to_other_buckets() {
        let coordinator = RateLimitCoordinator::new();
        let admission = coordinator.admit("GET:/a").await;
        coordinator
            .record(
                &admission,
                &RateLimitUpdate {
                    retry_after: Some(3.0),
                    global: true,
                    ..Default::default()
                },
            )
            .await;
        drop(admission);

        let start = Instant::now();
        let _other = coordinator.admit("GET:/b").await;
        assert!(start.elapsed() >= Duration::from_secs(3));
    }
}
