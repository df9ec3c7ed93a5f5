//! `{name, state, failure_count, success_count, last_failure_time,
//! half_open_in_flight, metrics_reset_at}`, instrumented the same way the
//! rest of the crate is (`LOG_TARGET`, `#[instrument]`, structured
//! `warn!`/`info!` fields) around a CLOSED/OPEN/HALF_OPEN transition table.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::errors::ServiceUnavailable;

const LOG_TARGET: &str = "poker_core::resilience::circuit_breaker";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

/// `{failure_threshold, reset_timeout, half_open_limit, monitoring_period}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub reset_timeout: Duration,
    pub half_open_limit: u32,
    pub monitoring_period: Duration,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout: Duration::from_secs(60),
            half_open_limit: 1,
            monitoring_period: Duration::from_secs(60),
        }
    }
}

/// Alerts a breaker emits on trip, recovery, and threshold-exceeded rates
///; the caller (typically the `logging` module) decides how to
/// surface these.
#[derive(Clone, Debug, PartialEq)]
pub enum BreakerAlert {
    Tripped { name: String, failure_count: u32 },
    Recovered { name: String },
    ThresholdExceededRate { name: String, trips_per_hour: f64, failure_rate_pct: f64 },
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

struct Inner {
    state: BreakerState,
    failure_count: u32,
    success_count: u32,
    last_failure_time_ms: Option<u64>,
    metrics_reset_at_ms: u64,
    half_open_in_flight: u32,
    trips_this_hour: u32,
    trip_window_start_ms: u64,
}

/// A single named gate in front of a failing dependency. Shared by resource name across table engines in
/// the same process via
/// `ResilienceRegistry`, so every public method takes `&self` and locks
/// internally rather than requiring `&mut self`.
pub struct CircuitBreaker {
    name: String,
    cfg: BreakerConfig,
    inner: Mutex<Inner>,
    manual_trip: AtomicU32,
    /// Added on top of real wall-clock time in `now_ms()`. Zero in
    /// production; tests advance it via `advance_time_for_test` instead of
    /// sleeping real time.
    test_offset_ms: AtomicU64,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, cfg: BreakerConfig) -> Self {
        let now = now_millis();
        Self {
            name: name.into(),
            cfg,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                failure_count: 0,
                success_count: 0,
                last_failure_time_ms: None,
                metrics_reset_at_ms: now + cfg.monitoring_period.as_millis() as u64,
                half_open_in_flight: 0,
                trips_this_hour: 0,
                trip_window_start_ms: now,
            }),
            manual_trip: AtomicU32::new(0),
            test_offset_ms: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Real wall-clock "now" for this breaker, plus whatever offset tests
    /// have advanced via `advance_time_for_test`. The offset is zero
    /// outside tests, so production timing is driven entirely by
    /// `SystemTime::now()`.
    fn now_ms(&self) -> u64 {
        now_millis().saturating_add(self.test_offset_ms.load(AtomicOrdering::SeqCst))
    }

    #[cfg(test)]
    pub fn advance_time_for_test(&self, by: Duration) {
        self.test_offset_ms.fetch_add(by.as_millis() as u64, AtomicOrdering::SeqCst);
    }

    fn maybe_reset_metrics(&self, inner: &mut Inner) {
        let now = self.now_ms();
        if now > inner.metrics_reset_at_ms {
            inner.failure_count = 0;
            inner.success_count = 0;
            inner.metrics_reset_at_ms = now + self.cfg.monitoring_period.as_millis() as u64;
        }
        if now.saturating_sub(inner.trip_window_start_ms) > Duration::from_secs(3600).as_millis() as u64 {
            inner.trips_this_hour = 0;
            inner.trip_window_start_ms = now;
        }
    }

    /// Returns `Ok(())` if a call may proceed right now, transitioning
    /// OPEN -> HALF_OPEN when `reset_timeout` has elapsed.
    pub fn allow_request(&self) -> Result<(), ServiceUnavailable> {
        let mut inner = self.inner.lock();
        self.maybe_reset_metrics(&mut inner);

        match inner.state {
            BreakerState::Closed => Ok(()),
            BreakerState::Open => {
                let elapsed_since_failure = inner
                    .last_failure_time_ms
                    .map(|t| self.now_ms().saturating_sub(t))
                    .unwrap_or(u64::MAX);
                if elapsed_since_failure >= self.cfg.reset_timeout.as_millis() as u64 {
                    inner.state = BreakerState::HalfOpen;
                    inner.half_open_in_flight = 1;
                    info!(target: LOG_TARGET, name = %self.name, "breaker transitioning to half-open");
                    Ok(())
                } else {
                    Err(ServiceUnavailable)
                }
            }
            BreakerState::HalfOpen => {
                if inner.half_open_in_flight < self.cfg.half_open_limit {
                    inner.half_open_in_flight += 1;
                    Ok(())
                } else {
                    Err(ServiceUnavailable)
                }
            }
        }
    }

    pub fn record_success(&self) {
        let mut inner = self.inner.lock();
        self.maybe_reset_metrics(&mut inner);
        inner.success_count += 1;
        if inner.state == BreakerState::HalfOpen {
            inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
            inner.state = BreakerState::Closed;
            inner.failure_count = 0;
            info!(target: LOG_TARGET, name = %self.name, "breaker recovered to closed");
        }
    }

    pub fn record_failure(&self) {
        let mut inner = self.inner.lock();
        self.maybe_reset_metrics(&mut inner);
        inner.failure_count += 1;
        inner.last_failure_time_ms = Some(self.now_ms());

        match inner.state {
            BreakerState::HalfOpen => {
                inner.half_open_in_flight = inner.half_open_in_flight.saturating_sub(1);
                self.trip(&mut inner);
            }
            BreakerState::Closed => {
                if inner.failure_count >= self.cfg.failure_threshold {
                    self.trip(&mut inner);
                }
            }
            BreakerState::Open => {}
        }
    }

    fn trip(&self, inner: &mut Inner) {
        inner.state = BreakerState::Open;
        inner.trips_this_hour += 1;
        warn!(
            target: LOG_TARGET,
            name = %self.name,
            failure_count = inner.failure_count,
            "breaker tripped open"
        );
    }

    /// Manual `trip()`.
    pub fn trip_manually(&self) {
        let mut inner = self.inner.lock();
        inner.last_failure_time_ms = Some(self.now_ms());
        self.trip(&mut inner);
    }

    /// Manual `reset()`.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        inner.state = BreakerState::Closed;
        inner.failure_count = 0;
        inner.success_count = 0;
        inner.half_open_in_flight = 0;
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let inner = self.inner.lock();
        BreakerSnapshot {
            name: self.name.clone(),
            state: inner.state,
            failure_count: inner.failure_count,
            success_count: inner.success_count,
            last_failure_time_ms: inner.last_failure_time_ms,
        }
    }

    /// Trips/hour and failure-rate %,
    /// used to build a `ThresholdExceededRate` alert from outside.
    pub fn failure_rate_pct(&self) -> f64 {
        let inner = self.inner.lock();
        let total = inner.failure_count + inner.success_count;
        if total == 0 {
            0.0
        } else {
            100.0 * inner.failure_count as f64 / total as f64
        }
    }

    pub fn trips_this_hour(&self) -> u32 {
        self.inner.lock().trips_this_hour
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub name: String,
    pub state: BreakerState,
    pub failure_count: u32,
    pub success_count: u32,
    pub last_failure_time_ms: Option<u64>,
}
