//! The logger collaborator: `{level, message,
//! structured_context}` with mandatory PII redaction of `password, email,
//! token, api_key, credit_card, ssn`, built on a `tracing_subscriber`
//! setup but wrapped in a small `GameLogger` trait so table/sync/resilience
//! code can log through a single collaborator boundary instead of calling
//! `tracing` macros directly everywhere.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::{event, Level};

/// Fields redacted before any message reaches a sink.
pub const PII_FIELDS: &[&str] = &["password", "email", "token", "api_key", "credit_card", "ssn"];

pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn to_tracing(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

/// `{level, message, structured_context}`. `structured_context` is a
/// flat map rather than an arbitrary JSON tree — every field name is
/// checked against `PII_FIELDS` (case-insensitively), which requires the
/// caller to name fields rather than bury them in nested structures.
pub trait GameLogger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, structured_context: &BTreeMap<String, Value>);
}

/// Replaces any key in `PII_FIELDS` (case-insensitive) with
/// `REDACTED_PLACEHOLDER`, leaving the field present (so a consumer still
/// sees that, say, an email was involved) without leaking its value.
pub fn redact(structured_context: &BTreeMap<String, Value>) -> BTreeMap<String, Value> {
    structured_context
        .iter()
        .map(|(key, value)| {
            let is_pii = PII_FIELDS.iter().any(|f| f.eq_ignore_ascii_case(key));
            if is_pii {
                (key.clone(), Value::String(REDACTED_PLACEHOLDER.to_string()))
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

/// Default `GameLogger`, backed by `tracing`. Emits one structured event
/// per call with `context` fields flattened onto it after redaction.
pub struct TracingGameLogger {
    target: &'static str,
}

impl TracingGameLogger {
    pub const fn new(target: &'static str) -> Self {
        Self { target }
    }
}

impl Default for TracingGameLogger {
    fn default() -> Self {
        Self::new("poker_core")
    }
}

impl GameLogger for TracingGameLogger {
    fn log(&self, level: LogLevel, message: &str, structured_context: &BTreeMap<String, Value>) {
        let redacted = redact(structured_context);
        let context_json = Value::Object(redacted.into_iter().collect());
        match level.to_tracing() {
            Level::TRACE => event!(target: "poker_core::game", Level::TRACE, target_module = self.target, message, context = %context_json),
            Level::DEBUG => event!(target: "poker_core::game", Level::DEBUG, target_module = self.target, message, context = %context_json),
            Level::INFO => event!(target: "poker_core::game", Level::INFO, target_module = self.target, message, context = %context_json),
            Level::WARN => event!(target: "poker_core::game", Level::WARN, target_module = self.target, message, context = %context_json),
            Level::ERROR => event!(target: "poker_core::game", Level::ERROR, target_module = self.target, message, context = %context_json),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pii_fields_are_redacted_case_insensitively() {
        let mut ctx = BTreeMap::new();
        ctx.insert("Email".to_string(), json!("a@b.com"));
        ctx.insert("table_id".to_string(), json!("t1"));
        let redacted = redact(&ctx);
        assert_eq!(redacted["Email"], json!(REDACTED_PLACEHOLDER));
        assert_eq!(redacted["table_id"], json!("t1"));
    }

    #[test]
    fn non_pii_fields_pass_through_unchanged() {
        let mut ctx = BTreeMap::new();
        ctx.insert("hand_number".to_string(), json!(3));
        let redacted = redact(&ctx);
        assert_eq!(redacted["hand_number"], json!(3));
    }

    #[test]
    fn tracing_logger_does_not_panic_on_log() {
        let logger = TracingGameLogger::default();
        let mut ctx = BTreeMap::new();
        ctx.insert("password".to_string(), json!("hunter2"));
        logger.log(LogLevel::Info, "test event", &ctx);
    }
}
