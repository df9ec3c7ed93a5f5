//! Process-wide circuit-breaker/retry registries, keyed by resource name,
//! using `dashmap::DashMap` for lock-free concurrent lookups shared
//! across tables hosted in the same process.

use std::sync::Arc;

use dashmap::DashMap;

use super::circuit_breaker::{BreakerConfig, CircuitBreaker};
use super::retry::RetryPolicy;

/// Holds every named circuit breaker and retry policy a process has ever
/// asked for. Never a true `static` singleton — callers construct one
/// (typically once, at process startup) and pass it by `Arc` wherever a
/// table engine or collaborator wrapper needs it, which is what keeps
/// tests hermetic.
#[derive(Default)]
pub struct ResilienceRegistry {
    breakers: DashMap<String, Arc<CircuitBreaker>>,
    retry_policies: DashMap<String, RetryPolicy>,
}

impl ResilienceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn breaker(&self, resource: &str, default_cfg: BreakerConfig) -> Arc<CircuitBreaker> {
        self.breakers
            .entry(resource.to_string())
            .or_insert_with(|| Arc::new(CircuitBreaker::new(resource, default_cfg)))
            .clone()
    }

    pub fn set_retry_policy(&self, resource: &str, policy: RetryPolicy) {
        self.retry_policies.insert(resource.to_string(), policy);
    }

    pub fn retry_policy(&self, resource: &str, default_policy: RetryPolicy) -> RetryPolicy {
        self.retry_policies.get(resource).map(|p| *p).unwrap_or(default_policy)
    }

    pub fn breaker_names(&self) -> Vec<String> {
        self.breakers.iter().map(|e| e.key().clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breaker_is_created_once_and_reused_by_name() {
        let registry = ResilienceRegistry::new();
        let a = registry.breaker("deck-oracle", BreakerConfig::default());
        let b = registry.breaker("deck-oracle", BreakerConfig::default());
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn different_resources_get_independent_breakers() {
        let registry = ResilienceRegistry::new();
        let a = registry.breaker("deck-oracle", BreakerConfig::default());
        let b = registry.breaker("persistence", BreakerConfig::default());
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn retry_policy_override_is_visible_to_later_lookups() {
        let registry = ResilienceRegistry::new();
        let custom = RetryPolicy { max_attempts: 9, ..RetryPolicy::default() };
        registry.set_retry_policy("deck-oracle", custom);
        let looked_up = registry.retry_policy("deck-oracle", RetryPolicy::default());
        assert_eq!(looked_up.max_attempts, 9);
    }
}
