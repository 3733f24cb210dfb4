use crate::error::RateLimitError;
use crate::limiter::{quota_for, Limiter};
use dashmap::DashMap;
use governor::clock::{Clock, DefaultClock};
use tracing::debug;

/// Owns one token bucket per client key.
///
/// Buckets are created on first use and kept for the lifetime of the
/// registry; there is no eviction, so the map grows with the number of
/// distinct keys seen.
///
/// Construct one at startup and share it (e.g. behind an `Arc`) with every
/// component that needs to throttle.
pub struct RateLimiterRegistry<C: Clock = DefaultClock> {
    limiters: DashMap<String, Limiter<C>>,
    clock: C,
}

impl RateLimiterRegistry<DefaultClock> {
    pub fn new() -> Self {
        Self::with_clock(DefaultClock::default())
    }
}

impl Default for RateLimiterRegistry<DefaultClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> RateLimiterRegistry<C> {
    /// Creates an empty registry whose buckets read time from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            limiters: DashMap::new(),
            clock,
        }
    }

    /// Returns the bucket for `key`, creating it with the given quota if
    /// this is the first request for that key.
    ///
    /// Only the first caller's `refill_per_second` and `burst` take effect;
    /// later calls for the same key get the existing bucket unchanged.
    /// Concurrent first calls for one key always end up sharing a single
    /// bucket.
    pub fn get_or_create(
        &self,
        key: &str,
        refill_per_second: f64,
        burst: u32,
    ) -> Result<Limiter<C>, RateLimitError> {
        if let Some(existing) = self.limiters.get(key) {
            return Ok(existing.value().clone());
        }

        let quota = quota_for(refill_per_second, burst)?;

        // `entry` holds the shard's write lock across the check and the insert.
        let limiter = self
            .limiters
            .entry(key.to_owned())
            .or_insert_with(|| {
                debug!(key, refill_per_second, burst, "creating rate limiter");
                Limiter::new(quota, &self.clock)
            })
            .value()
            .clone();

        Ok(limiter)
    }

    /// Number of keys that currently own a bucket.
    pub fn len(&self) -> usize {
        self.limiters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limiters.is_empty()
    }
}

impl<C: Clock> std::fmt::Debug for RateLimiterRegistry<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterRegistry")
            .field("keys", &self.limiters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor::clock::FakeRelativeClock;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    fn fake_registry() -> (RateLimiterRegistry<FakeRelativeClock>, FakeRelativeClock) {
        let clock = FakeRelativeClock::default();
        (RateLimiterRegistry::with_clock(clock.clone()), clock)
    }

    #[test]
    fn same_key_returns_same_bucket() {
        let (registry, _clock) = fake_registry();

        let first = registry.get_or_create("10.0.0.1", 1.0, 1).unwrap();
        let second = registry.get_or_create("10.0.0.1", 1.0, 1).unwrap();

        assert!(first.same_bucket(&second));
        assert!(first.allow());
        // The token consumed through `first` is gone for `second` too.
        assert!(!second.allow());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn later_quota_is_ignored_for_existing_key() {
        let (registry, _clock) = fake_registry();

        let first = registry.get_or_create("k", 1.0, 1).unwrap();
        assert!(first.allow());

        let second = registry.get_or_create("k", 100.0, 50).unwrap();
        assert!(!second.allow());
    }

    #[test]
    fn keys_are_isolated() {
        let (registry, _clock) = fake_registry();

        let a = registry.get_or_create("a", 1.0, 1).unwrap();
        let b = registry.get_or_create("b", 1.0, 1).unwrap();

        assert!(!a.same_bucket(&b));
        assert!(a.allow());
        assert!(b.allow());
        assert!(!a.allow());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn burst_of_one_refills_after_one_period() {
        let (registry, clock) = fake_registry();
        let limiter = registry.get_or_create("k", 1.0, 1).unwrap();

        assert!(limiter.allow());
        assert!(!limiter.allow());

        clock.advance(Duration::from_millis(500));
        assert!(!limiter.allow());

        clock.advance(Duration::from_millis(600));
        assert!(limiter.allow());
        assert!(!limiter.allow());
    }

    #[test]
    fn burst_caps_consecutive_admissions() {
        let (registry, clock) = fake_registry();
        let limiter = registry.get_or_create("k", 2.0, 3).unwrap();

        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(limiter.allow());
        assert!(!limiter.allow());

        // Idle for a long time: the bucket refills only up to the burst.
        clock.advance(Duration::from_secs(60));
        for _ in 0..3 {
            assert!(limiter.allow());
        }
        assert!(!limiter.allow());
    }

    #[test]
    fn invalid_quota_creates_nothing() {
        let (registry, _clock) = fake_registry();

        assert!(registry.get_or_create("k", 0.0, 1).is_err());
        assert!(registry.get_or_create("k", 1.0, 0).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_first_calls_create_one_bucket() {
        const THREADS: usize = 32;
        let (registry, _clock) = fake_registry();
        let barrier = Barrier::new(THREADS);

        let handles: Vec<Limiter<FakeRelativeClock>> = std::thread::scope(|s| {
            let workers: Vec<_> = (0..THREADS)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        registry.get_or_create("unseen", 1.0, 5).unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        let mut distinct: Vec<&Limiter<FakeRelativeClock>> = Vec::new();
        for handle in &handles {
            if !distinct.iter().any(|d| d.same_bucket(handle)) {
                distinct.push(handle);
            }
        }

        assert_eq!(distinct.len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_allow_never_exceeds_burst() {
        const THREADS: usize = 16;
        const BURST: u32 = 10;
        let (registry, _clock) = fake_registry();
        let admitted = AtomicUsize::new(0);
        let barrier = Barrier::new(THREADS);

        std::thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|| {
                    let limiter = registry.get_or_create("hot", 1.0, BURST).unwrap();
                    barrier.wait();
                    for _ in 0..5 {
                        if limiter.allow() {
                            admitted.fetch_add(1, Ordering::SeqCst);
                        }
                    }
                });
            }
        });

        // The fake clock never moves, so nothing refills.
        assert_eq!(admitted.load(Ordering::SeqCst), BURST as usize);
    }
}
