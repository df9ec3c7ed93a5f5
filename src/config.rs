//! Process-wide configuration envelope:
//! `retry.<resource>`, `breaker.<resource>`, and `sync.*`. Parsed from
//! environment variables with typed defaults and documented bounds, the
//! same way a `DATABASE_URL`-style env lookup would be read — no
//! additional config crate.

use std::collections::HashMap;
use std::time::Duration;

use thiserror::Error;

use crate::resilience::{BackoffStrategy, BreakerConfig, RetryPolicy};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be in {bounds}, got {value}")]
    OutOfBounds { field: &'static str, bounds: &'static str, value: String },
    #[error("unrecognized strategy {0:?} (expected exponential, linear, or fixed)")]
    UnknownStrategy(String),
}

/// `sync.version_diff_threshold`, `sync.max_delta_bytes`, `sync.history_cap`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SyncConfig {
    pub version_diff_threshold: u64,
    pub max_delta_bytes: usize,
    pub history_cap: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            version_diff_threshold: 10,
            max_delta_bytes: 10 * 1024,
            history_cap: 50,
        }
    }
}

/// The full parsed envelope: per-resource retry/breaker overrides plus the
/// synchronizer's global knobs.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CoreConfig {
    pub retry: HashMap<String, RetryPolicy>,
    pub breaker: HashMap<String, BreakerConfig>,
    pub sync: SyncConfig,
}

const RETRY_PREFIX: &str = "retry.";
const BREAKER_PREFIX: &str = "breaker.";

impl CoreConfig {
    /// Reads every `std::env::var` matching `retry.<resource>.*`,
    /// `breaker.<resource>.*`, and `sync.*`. Unset variables keep their
    /// documented defaults; out-of-bounds values are rejected rather
    /// than silently clamped, so a misconfiguration is caught at startup.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars(vars: impl IntoIterator<Item = (String, String)>) -> Result<Self, ConfigError> {
        let mut retry_fields: HashMap<String, HashMap<&'static str, String>> = HashMap::new();
        let mut breaker_fields: HashMap<String, HashMap<&'static str, String>> = HashMap::new();
        let mut sync = SyncConfig::default();

        for (key, value) in vars {
            if let Some(rest) = key.strip_prefix(RETRY_PREFIX) {
                let Some((resource, field)) = split_last_dot(rest) else { continue };
                if let Some(canonical) = canonical_retry_field(field) {
                    retry_fields.entry(resource.to_string()).or_default().insert(canonical, value);
                }
            } else if let Some(rest) = key.strip_prefix(BREAKER_PREFIX) {
                let Some((resource, field)) = split_last_dot(rest) else { continue };
                if let Some(canonical) = canonical_breaker_field(field) {
                    breaker_fields.entry(resource.to_string()).or_default().insert(canonical, value);
                }
            } else {
                match key.as_str() {
                    "sync.version_diff_threshold" => sync.version_diff_threshold = value.parse().unwrap_or(sync.version_diff_threshold),
                    "sync.max_delta_bytes" => sync.max_delta_bytes = value.parse().unwrap_or(sync.max_delta_bytes),
                    "sync.history_cap" => sync.history_cap = value.parse().unwrap_or(sync.history_cap),
                    _ => {}
                }
            }
        }

        let mut retry = HashMap::new();
        for (resource, fields) in retry_fields {
            retry.insert(resource, parse_retry_policy(&fields)?);
        }

        let mut breaker = HashMap::new();
        for (resource, fields) in breaker_fields {
            breaker.insert(resource, parse_breaker_config(&fields)?);
        }

        Ok(Self { retry, breaker, sync })
    }

    pub fn retry_for(&self, resource: &str, default: RetryPolicy) -> RetryPolicy {
        self.retry.get(resource).copied().unwrap_or(default)
    }

    pub fn breaker_for(&self, resource: &str, default: BreakerConfig) -> BreakerConfig {
        self.breaker.get(resource).copied().unwrap_or(default)
    }
}

fn split_last_dot(s: &str) -> Option<(&str, &str)> {
    let idx = s.rfind('.')?;
    Some((&s[..idx], &s[idx + 1..]))
}

fn canonical_retry_field(field: &str) -> Option<&'static str> {
    match field {
        "max_attempts" => Some("max_attempts"),
        "strategy" => Some("strategy"),
        "initial_delay" => Some("initial_delay"),
        "max_delay" => Some("max_delay"),
        "jitter" => Some("jitter"),
        _ => None,
    }
}

fn canonical_breaker_field(field: &str) -> Option<&'static str> {
    match field {
        "failure_threshold" => Some("failure_threshold"),
        "reset_timeout" => Some("reset_timeout"),
        "half_open_limit" => Some("half_open_limit"),
        "monitoring_period" => Some("monitoring_period"),
        _ => None,
    }
}

fn parse_millis(value: &str) -> Option<u64> {
    value.parse::<u64>().ok()
}

fn parse_retry_policy(fields: &HashMap<&'static str, String>) -> Result<RetryPolicy, ConfigError> {
    let mut policy = RetryPolicy::default();

    if let Some(v) = fields.get("max_attempts") {
        let n: u32 = v.parse().unwrap_or(policy.max_attempts);
        if !(1..=10).contains(&n) {
            return Err(ConfigError::OutOfBounds { field: "retry.max_attempts", bounds: "[1,10]", value: v.clone() });
        }
        policy.max_attempts = n;
    }
    if let Some(v) = fields.get("strategy") {
        policy.strategy = match v.as_str() {
            "exponential" => BackoffStrategy::Exponential,
            "linear" => BackoffStrategy::Linear,
            "fixed" => BackoffStrategy::Fixed,
            other => return Err(ConfigError::UnknownStrategy(other.to_string())),
        };
    }
    if let Some(v) = fields.get("initial_delay") {
        let ms = parse_millis(v).unwrap_or(policy.initial_delay.as_millis() as u64);
        if !(100..=10_000).contains(&ms) {
            return Err(ConfigError::OutOfBounds { field: "retry.initial_delay", bounds: "[100ms,10s]", value: v.clone() });
        }
        policy.initial_delay = Duration::from_millis(ms);
    }
    if let Some(v) = fields.get("max_delay") {
        let ms = parse_millis(v).unwrap_or(policy.max_delay.as_millis() as u64);
        if !(1_000..=60_000).contains(&ms) {
            return Err(ConfigError::OutOfBounds { field: "retry.max_delay", bounds: "[1s,60s]", value: v.clone() });
        }
        if ms < policy.initial_delay.as_millis() as u64 {
            return Err(ConfigError::OutOfBounds { field: "retry.max_delay", bounds: ">= initial_delay", value: v.clone() });
        }
        policy.max_delay = Duration::from_millis(ms);
    }
    if let Some(v) = fields.get("jitter") {
        policy.jitter = v == "true" || v == "1";
    }
    Ok(policy)
}

fn parse_breaker_config(fields: &HashMap<&'static str, String>) -> Result<BreakerConfig, ConfigError> {
    let mut cfg = BreakerConfig::default();

    if let Some(v) = fields.get("failure_threshold") {
        let n: u32 = v.parse().unwrap_or(cfg.failure_threshold);
        if !(1..=100).contains(&n) {
            return Err(ConfigError::OutOfBounds { field: "breaker.failure_threshold", bounds: "[1,100]", value: v.clone() });
        }
        cfg.failure_threshold = n;
    }
    if let Some(v) = fields.get("reset_timeout") {
        let ms = parse_millis(v).unwrap_or(cfg.reset_timeout.as_millis() as u64);
        if !(1_000..=300_000).contains(&ms) {
            return Err(ConfigError::OutOfBounds { field: "breaker.reset_timeout", bounds: "[1s,5min]", value: v.clone() });
        }
        cfg.reset_timeout = Duration::from_millis(ms);
    }
    if let Some(v) = fields.get("half_open_limit") {
        let n: u32 = v.parse().unwrap_or(cfg.half_open_limit);
        if !(1..=10).contains(&n) {
            return Err(ConfigError::OutOfBounds { field: "breaker.half_open_limit", bounds: "[1,10]", value: v.clone() });
        }
        cfg.half_open_limit = n;
    }
    if let Some(v) = fields.get("monitoring_period") {
        let ms = parse_millis(v).unwrap_or(cfg.monitoring_period.as_millis() as u64);
        if !(10_000..=3_600_000).contains(&ms) {
            return Err(ConfigError::OutOfBounds { field: "breaker.monitoring_period", bounds: "[10s,1h]", value: v.clone() });
        }
        cfg.monitoring_period = Duration::from_millis(ms);
    }
    Ok(cfg)
}
