//! The error-recovery fabric: circuit breakers, retry policies with
//! backoff strategies, typed recovery strategies per error class, and the
//! connection/game-error/state-conflict decision procedures that sit next
//! to them. Wraps every external or fallible operation the table engine,
//! deck oracle client, and persistence collaborator make.

pub mod circuit_breaker;
pub mod errors;
pub mod registry;
pub mod retry;
pub mod strategies;

pub use circuit_breaker::{BreakerAlert, BreakerConfig, BreakerSnapshot, BreakerState, CircuitBreaker};
pub use errors::{classify, ErrorClass, RetryError, ServiceUnavailable};
pub use registry::ResilienceRegistry;
pub use retry::{execute_with_retry, AbortSignal, BackoffStrategy, RetryPolicy};
pub use strategies::{
    decide_connection_failure, decide_game_error, decide_player_disconnected,
    grace_period_expired, rate_limit_policy_from, resolve_state_conflict,
    websocket_should_terminate, ConnectionDecision, ConnectionType, ConflictResolution,
    GameErrorDecision, GameErrorKind, RecoveryStrategy, CRITICAL_FIELDS,
};

use std::future::Future;
use tracing::warn;

const LOG_TARGET: &str = "poker_core::resilience";

/// Convenience wrapper combining a named circuit breaker with the
/// `RecoveryStrategy` for an error class: checks the breaker before
/// calling, retries per the strategy's policy if the operation fails, and
/// feeds the outcome back into the breaker. This is the shape every
/// external collaborator call in the table engine goes through.
pub async fn call_guarded<T, E, F, Fut>(
    registry: &ResilienceRegistry,
    resource: &str,
    classify_err: impl Fn(&E) -> ErrorClass,
    signal: &AbortSignal,
    mut op: F,
) -> Result<T, GuardedCallError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Clone,
{
    // The breaker configuration for a resource is set once (typically via
    // `CoreConfig`'s `breaker.<resource>` entries) rather than derived
    // per call; `registry.breaker` only falls back to this default the
    // first time a given resource name is seen.
    let breaker = registry.breaker(resource, BreakerConfig::default());

    if breaker.allow_request().is_err() {
        warn!(target: LOG_TARGET, resource, "call rejected: breaker open");
        return Err(GuardedCallError::ServiceUnavailable);
    }

    let mut last_class = ErrorClass::Unknown;
    let policy = registry.retry_policy(resource, RetryPolicy::default());
    let result = execute_with_retry(
        &policy,
        signal,
        |err: &E| {
            let class = classify_err(err);
            last_class = class;
            strategies::strategy_for(class).retryable
        },
        &mut op,
    )
    .await;

    match result {
        Ok(value) => {
            breaker.record_success();
            Ok(value)
        }
        Err(RetryError::OperationCancelled) => Err(GuardedCallError::Cancelled),
        Err(RetryError::Exhausted { last, .. }) => {
            breaker.record_failure();
            Err(GuardedCallError::Failed(last))
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardedCallError<E> {
    ServiceUnavailable,
    Cancelled,
    Failed(E),
}
