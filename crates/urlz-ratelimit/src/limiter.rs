use crate::error::RateLimitError;
use governor::clock::{Clock, DefaultClock, Reference};
use governor::Quota;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Builds a token-bucket quota holding up to `burst` tokens and refilling
/// at `refill_per_second` tokens per second.
pub fn quota_for(refill_per_second: f64, burst: u32) -> Result<Quota, RateLimitError> {
    if !refill_per_second.is_finite() || refill_per_second <= 0.0 {
        return Err(RateLimitError::InvalidQuota(format!(
            "refill rate must be a positive number, got {refill_per_second}"
        )));
    }

    let burst = NonZeroU32::new(burst).ok_or_else(|| {
        RateLimitError::InvalidQuota("burst must be at least 1".to_string())
    })?;

    let period = Duration::try_from_secs_f64(1.0 / refill_per_second).map_err(|e| {
        RateLimitError::InvalidQuota(format!(
            "refill rate {refill_per_second} is out of range: {e}"
        ))
    })?;

    let quota = Quota::with_period(period).ok_or_else(|| {
        RateLimitError::InvalidQuota(format!(
            "refill rate {refill_per_second} is too high to represent"
        ))
    })?;

    Ok(quota.allow_burst(burst))
}

/// A shared handle to one token bucket.
///
/// Clones point at the same bucket. [`Limiter::allow`] may be called from
/// any number of threads; each call holds the bucket's lock only for a
/// little arithmetic.
pub struct Limiter<C: Clock = DefaultClock> {
    inner: Arc<Bucket<C>>,
}

/// Credit is kept in nanoseconds of refill time: one token costs one
/// replenish interval and the bucket never holds more than `burst` of them.
struct Bucket<C: Clock> {
    clock: C,
    token_cost: u128,
    capacity: u128,
    state: Mutex<BucketState<C::Instant>>,
}

struct BucketState<I> {
    credit: u128,
    refilled_at: I,
}

impl<C: Clock> Bucket<C> {
    fn try_take(&self) -> bool {
        let now = self.clock.now();
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if now > state.refilled_at {
            let elapsed = Duration::from(now.duration_since(state.refilled_at)).as_nanos();
            state.credit = state.credit.saturating_add(elapsed).min(self.capacity);
            state.refilled_at = now;
        }

        if state.credit < self.token_cost {
            return false;
        }
        state.credit -= self.token_cost;
        true
    }
}

impl<C: Clock> Limiter<C> {
    /// A full bucket for `quota`, reading time from `clock`.
    pub(crate) fn new(quota: Quota, clock: &C) -> Self {
        let token_cost = quota.replenish_interval().as_nanos().max(1);
        let capacity = token_cost.saturating_mul(u128::from(quota.burst_size().get()));

        Self {
            inner: Arc::new(Bucket {
                clock: clock.clone(),
                token_cost,
                capacity,
                state: Mutex::new(BucketState {
                    credit: capacity,
                    refilled_at: clock.now(),
                }),
            }),
        }
    }

    /// Takes one token if one is available.
    ///
    /// Never waits for a refill: returns `false` without consuming anything
    /// when the bucket is empty.
    pub fn allow(&self) -> bool {
        self.inner.try_take()
    }

    /// Returns `true` if both handles share the same bucket.
    pub fn same_bucket(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<C: Clock> Clone for Limiter<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C: Clock> fmt::Debug for Limiter<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Limiter")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
