//! # Admission Control
//!
//! Per-caller admission decisions for the HTTP service.
//!
//! The transport asks an [`AdmissionGate`] before running a computation and
//! turns the caller away when the gate says no. Two implementations exist:
//!
//! - [`SlidingWindowGate`]: weighted count over the current and the previous
//!   fixed window, with an injectable [`WindowClock`]
//! - [`TokenBucketGate`]: GCRA token bucket from `governor`
//!
//! Both keep state per caller key and are safe to share across tasks.

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::config::{GateStrategy, RateLimitConfig};
use dashmap::DashMap;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use parking_lot::Mutex;
use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Decides whether a caller may proceed.
pub trait AdmissionGate: Send + Sync + fmt::Debug {
    /// Records an attempt by `caller_key` and returns whether it is admitted.
    fn try_admit(&self, caller_key: &str) -> bool;

    /// Drops state for callers that have gone quiet.
    fn prune(&self) {}
}

/// Source of elapsed time for [`SlidingWindowGate`].
pub trait WindowClock: Send + Sync + fmt::Debug {
    /// Time elapsed since the clock's origin. Never decreases.
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Starts a clock at the current instant.
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowClock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Clock advanced by hand; starts at zero.
#[derive(Debug, Default)]
pub struct ManualClock {
    elapsed: Mutex<Duration>,
}

impl ManualClock {
    /// Creates a clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut elapsed = self.elapsed.lock();
        *elapsed = elapsed.saturating_add(by);
    }
}

impl WindowClock for ManualClock {
    fn now(&self) -> Duration {
        *self.elapsed.lock()
    }
}

impl<C: WindowClock + ?Sized> WindowClock for Arc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Counters of one caller.
#[derive(Debug, Clone, Copy)]
struct WindowCounter {
    window: u128,
    current: u64,
    previous: u64,
    last_admitted: Duration,
}

/// Sliding-window counter gate.
///
/// Time is cut into fixed windows of `interval`, aligned to the clock's
/// origin. A caller's estimated rate at elapsed time `t` inside window `w` is
///
/// ```text
/// previous · (interval − (t − w·interval)) / interval + current
/// ```
///
/// and the attempt is admitted while that estimate is below `limit`. A caller
/// with no admitted request during the last full interval starts from zero.
///
/// # Examples
///
/// ```
/// use decimal_ratio::application::services::admission::{
///     AdmissionGate, ManualClock, SlidingWindowGate,
/// };
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = Arc::new(ManualClock::new());
/// let gate = SlidingWindowGate::with_clock(2, Duration::from_secs(60), Arc::clone(&clock));
///
/// assert!(gate.try_admit("10.0.0.1"));
/// assert!(gate.try_admit("10.0.0.1"));
/// assert!(!gate.try_admit("10.0.0.1"));
///
/// clock.advance(Duration::from_secs(60));
/// assert!(gate.try_admit("10.0.0.1"));
/// ```
#[derive(Debug)]
pub struct SlidingWindowGate<C: WindowClock = MonotonicClock> {
    limit: u64,
    interval: Duration,
    clock: C,
    counters: DashMap<String, WindowCounter>,
}

impl SlidingWindowGate<MonotonicClock> {
    /// Creates a gate on the wall clock.
    ///
    /// `interval` must be non-zero.
    #[must_use]
    pub fn new(limit: u32, interval: Duration) -> Self {
        Self::with_clock(limit, interval, MonotonicClock::new())
    }
}

impl<C: WindowClock> SlidingWindowGate<C> {
    /// Creates a gate on the given clock.
    ///
    /// `interval` must be non-zero.
    #[must_use]
    pub fn with_clock(limit: u32, interval: Duration, clock: C) -> Self {
        Self {
            limit: u64::from(limit),
            interval,
            clock,
            counters: DashMap::new(),
        }
    }

    /// Number of callers currently tracked.
    #[must_use]
    pub fn tracked_callers(&self) -> usize {
        self.counters.len()
    }

    fn window_of(&self, elapsed: Duration) -> u128 {
        elapsed.as_nanos() / self.interval.as_nanos().max(1)
    }
}

impl<C: WindowClock> AdmissionGate for SlidingWindowGate<C> {
    fn try_admit(&self, caller_key: &str) -> bool {
        let now = self.clock.now();
        let window = self.window_of(now);
        let interval_ns = self.interval.as_nanos().max(1);

        // The entry guard serialises check-and-increment per caller.
        let mut entry = self
            .counters
            .entry(caller_key.to_owned())
            .or_insert(WindowCounter {
                window,
                current: 0,
                previous: 0,
                last_admitted: now,
            });
        let counter = entry.value_mut();

        if now.saturating_sub(counter.last_admitted) >= self.interval {
            counter.previous = 0;
            counter.current = 0;
        } else if window == counter.window + 1 {
            counter.previous = counter.current;
            counter.current = 0;
        } else if window > counter.window {
            counter.previous = 0;
            counter.current = 0;
        }
        counter.window = window;

        let into_window = now.as_nanos() - window * interval_ns;
        let weighted = u128::from(counter.previous) * (interval_ns - into_window)
            + u128::from(counter.current) * interval_ns;
        if weighted >= u128::from(self.limit) * interval_ns {
            return false;
        }

        counter.current += 1;
        counter.last_admitted = now;
        true
    }

    fn prune(&self) {
        let now = self.clock.now();
        let horizon = self.interval.saturating_mul(2);
        self.counters
            .retain(|_, counter| now.saturating_sub(counter.last_admitted) < horizon);
    }
}

/// GCRA token bucket gate.
///
/// Each caller has a bucket of `limit` cells, refilled one cell every
/// `interval / limit`.
pub struct TokenBucketGate {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl fmt::Debug for TokenBucketGate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBucketGate")
            .field("tracked_callers", &self.limiter.len())
            .finish()
    }
}

impl TokenBucketGate {
    /// Creates a gate admitting `limit` requests per `interval`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if `limit` is zero or
    /// `interval / limit` is shorter than a nanosecond.
    pub fn new(limit: u32, interval: Duration) -> ApplicationResult<Self> {
        let burst = NonZeroU32::new(limit)
            .ok_or_else(|| ApplicationError::configuration("rate limit must be positive"))?;
        let quota = Quota::with_period(interval / limit)
            .ok_or_else(|| {
                ApplicationError::configuration("rate limit interval too short for its limit")
            })?
            .allow_burst(burst);
        Ok(Self {
            limiter: RateLimiter::keyed(quota),
        })
    }
}

impl AdmissionGate for TokenBucketGate {
    fn try_admit(&self, caller_key: &str) -> bool {
        self.limiter.check_key(&caller_key.to_owned()).is_ok()
    }

    fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }
}

/// Builds the gate selected by `config.strategy`.
///
/// # Errors
///
/// Returns `ApplicationError::Configuration` if the limits are unusable.
pub fn build_gate(config: &RateLimitConfig) -> ApplicationResult<Arc<dyn AdmissionGate>> {
    if config.limit == 0 || config.interval.is_zero() {
        return Err(ApplicationError::configuration(
            "rate limit and interval must be positive",
        ));
    }
    let gate: Arc<dyn AdmissionGate> = match config.strategy {
        GateStrategy::SlidingWindow => {
            Arc::new(SlidingWindowGate::new(config.limit, config.interval))
        }
        GateStrategy::TokenBucket => Arc::new(TokenBucketGate::new(config.limit, config.interval)?),
    };
    tracing::debug!(
        strategy = ?config.strategy,
        limit = config.limit,
        interval = ?config.interval,
        "admission gate ready"
    );
    Ok(gate)
}
