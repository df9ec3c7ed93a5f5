//! Typed recovery strategies per error class, plus the
//! three decision procedures next to it: connection-failure handling,
//! game-error decisions, and state-conflict resolution. None of these read
//! or hold any circuit-breaker/retry state themselves — they're pure
//! functions over their inputs, callable from either the table
//! engine or ingress-side glue.

use std::time::Duration;

use serde_json::Value;

use super::circuit_breaker::BreakerConfig;
use super::errors::ErrorClass;
use super::retry::{BackoffStrategy, RetryPolicy};

/// What to do with a particular error class: whether it retries, which
/// policy to use, an optional named fallback, and an optional breaker
/// configuration to pair with it.
#[derive(Clone, Debug, PartialEq)]
pub struct RecoveryStrategy {
    pub class: ErrorClass,
    pub retryable: bool,
    pub retry_policy: Option<RetryPolicy>,
    pub fallback: Option<&'static str>,
    pub breaker: Option<BreakerConfig>,
}

fn exp(initial: Duration, max: Duration, jitter: bool) -> RetryPolicy {
    RetryPolicy { max_attempts: 5, strategy: BackoffStrategy::Exponential, initial_delay: initial, max_delay: max, jitter }
}

/// Looks up the fixed recovery strategy for `class`. `PLAYER_DISCONNECTED`'s "conditional" retry and `RATE_LIMIT`'s
/// `retry_after`-seeded initial delay are callers' responsibility — see
/// `grace_period_expired` and `rate_limit_policy_from` below.
pub fn strategy_for(class: ErrorClass) -> RecoveryStrategy {
    match class {
        ErrorClass::Network => RecoveryStrategy {
            class,
            retryable: true,
            retry_policy: Some(exp(Duration::from_secs(1), Duration::from_secs(30), true)),
            fallback: Some("offline-mode"),
            breaker: None,
        },
        ErrorClass::Timeout => RecoveryStrategy {
            class,
            retryable: true,
            retry_policy: Some(exp(Duration::from_secs(2), Duration::from_secs(10), false)),
            fallback: None,
            breaker: None,
        },
        ErrorClass::Auth => RecoveryStrategy {
            class,
            retryable: false,
            retry_policy: None,
            fallback: Some("re-authenticate"),
            breaker: None,
        },
        ErrorClass::Validation => RecoveryStrategy {
            class,
            retryable: false,
            retry_policy: None,
            fallback: Some("reject"),
            breaker: None,
        },
        ErrorClass::RateLimit => RecoveryStrategy {
            class,
            retryable: true,
            retry_policy: Some(exp(Duration::from_secs(1), Duration::from_secs(300), false)),
            fallback: None,
            breaker: None,
        },
        ErrorClass::Server => RecoveryStrategy {
            class,
            retryable: true,
            retry_policy: Some(exp(Duration::from_secs(1), Duration::from_secs(10), true)),
            fallback: None,
            breaker: Some(BreakerConfig {
                failure_threshold: 5,
                reset_timeout: Duration::from_secs(60),
                half_open_limit: 1,
                monitoring_period: Duration::from_secs(60),
            }),
        },
        ErrorClass::ExternalService => RecoveryStrategy {
            class,
            retryable: true,
            retry_policy: Some(exp(Duration::from_secs(2), Duration::from_secs(30), true)),
            fallback: None,
            breaker: Some(BreakerConfig {
                failure_threshold: 3,
                reset_timeout: Duration::from_secs(120),
                half_open_limit: 1,
                monitoring_period: Duration::from_secs(120),
            }),
        },
        ErrorClass::Websocket => RecoveryStrategy {
            class,
            retryable: true,
            retry_policy: Some(exp(Duration::from_secs(1), Duration::from_secs(30), false)),
            fallback: Some("reconnect"),
            breaker: None,
        },
        ErrorClass::PlayerDisconnected => RecoveryStrategy {
            class,
            retryable: true,
            retry_policy: Some(RetryPolicy {
                max_attempts: 6,
                strategy: BackoffStrategy::Fixed,
                initial_delay: Duration::from_secs(5),
                max_delay: Duration::from_secs(5),
                jitter: false,
            }),
            fallback: Some("auto-fold"),
            breaker: None,
        },
        ErrorClass::ResourceExhausted => RecoveryStrategy {
            class,
            retryable: false,
            retry_policy: None,
            fallback: Some("shed-load"),
            breaker: Some(BreakerConfig {
                failure_threshold: 1,
                reset_timeout: Duration::from_secs(300),
                half_open_limit: 1,
                monitoring_period: Duration::from_secs(300),
            }),
        },
        ErrorClass::Unknown => RecoveryStrategy { class, retryable: false, retry_policy: None, fallback: None, breaker: None },
    }
}

/// WebSocket "terminate after 10 attempts or 5 min inactivity".
pub fn websocket_should_terminate(attempt_count: u32, inactive_for: Duration) -> bool {
    attempt_count >= 10 || inactive_for >= Duration::from_secs(300)
}

/// `PLAYER_DISCONNECTED`'s 30s grace period: once elapsed, the
/// caller should stop retrying reconnection and apply the `auto-fold`
/// fallback.
pub fn grace_period_expired(disconnected_for: Duration) -> bool {
    disconnected_for >= Duration::from_secs(30)
}

/// `RATE_LIMIT`'s policy seeded from the collaborator's own `retry_after`
/// hint rather than the fixed 1s default.
pub fn rate_limit_policy_from(retry_after: Duration) -> RetryPolicy {
    exp(retry_after.max(Duration::from_millis(100)), Duration::from_secs(300), false)
}

/// What to do about a dropped player/spectator connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionDecision {
    Terminate,
    DegradeToPolling,
    ReconnectAfter(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionType {
    Player,
    Spectator,
}

pub fn decide_connection_failure(
    attempt_count: u32,
    disconnect_elapsed: Duration,
    connection_type: ConnectionType,
) -> ConnectionDecision {
    if attempt_count >= 5 || disconnect_elapsed > Duration::from_secs(300) {
        return ConnectionDecision::Terminate;
    }
    if connection_type == ConnectionType::Spectator {
        return ConnectionDecision::DegradeToPolling;
    }
    let backoff_secs = 1u64.checked_shl(attempt_count.saturating_sub(1)).unwrap_or(u64::MAX).min(30);
    ConnectionDecision::ReconnectAfter(Duration::from_secs(backoff_secs))
}

/// What to do in response to a classified in-game error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameErrorDecision {
    AutoFoldAndNotify,
    RemoveFromTable,
    PauseGameAdminAlert,
    RollbackToLastValidState,
    SkipTurnDefaultCheckOrFold,
}

pub fn decide_player_disconnected(in_hand: bool) -> GameErrorDecision {
    if in_hand {
        GameErrorDecision::AutoFoldAndNotify
    } else {
        GameErrorDecision::RemoveFromTable
    }
}

pub fn decide_game_error(kind: GameErrorKind) -> GameErrorDecision {
    match kind {
        GameErrorKind::StateCorruption => GameErrorDecision::PauseGameAdminAlert,
        GameErrorKind::InvalidAction => GameErrorDecision::RollbackToLastValidState,
        GameErrorKind::PlayerTimeout => GameErrorDecision::SkipTurnDefaultCheckOrFold,
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameErrorKind {
    StateCorruption,
    InvalidAction,
    PlayerTimeout,
}

/// State-conflict resolution. `critical_fields` names the fields a
/// conflict touches; `CRITICAL_FIELDS` lists the ones that always force
/// manual intervention.
pub const CRITICAL_FIELDS: &[&str] = &["gamePhase", "pot", "playerBalances", "deck"];

#[derive(Clone, Debug, PartialEq)]
pub enum ConflictResolution {
    ManualIntervention,
    Merged(Value),
    LastWriteWinsRemote,
}

/// `local`/`remote` are the two conflicting values for one field or
/// sub-object; `touched_fields` names what the conflict spans.
pub fn resolve_state_conflict(
    touched_fields: &[&str],
    invalid_state_transition: bool,
    local: &Value,
    remote: &Value,
) -> ConflictResolution {
    if invalid_state_transition || touched_fields.iter().any(|f| CRITICAL_FIELDS.contains(f)) {
        return ConflictResolution::ManualIntervention;
    }

    if let (Value::Object(local_map), Value::Object(remote_map)) = (local, remote) {
        let mut merged = local_map.clone();
        for (key, remote_value) in remote_map {
            match key.as_str() {
                "version" | "timestamp" => {
                    let local_value = local_map.get(key).cloned().unwrap_or(Value::Null);
                    merged.insert(key.clone(), max_numeric(&local_value, remote_value));
                }
                _ if remote_value.is_array() => {
                    merged.insert(key.clone(), remote_value.clone());
                }
                _ => {
                    merged.insert(key.clone(), remote_value.clone());
                }
            }
        }
        return ConflictResolution::Merged(Value::Object(merged));
    }

    ConflictResolution::LastWriteWinsRemote
}

fn max_numeric(a: &Value, b: &Value) -> Value {
    match (a.as_f64(), b.as_f64()) {
        (Some(av), Some(bv)) => if av >= bv { a.clone() } else { b.clone() },
        _ => b.clone(),
    }
}
