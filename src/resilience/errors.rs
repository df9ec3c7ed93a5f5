use thiserror::Error;

/// Error classes: how a failure is treated (retried, fallback,
/// never retried) is decided entirely by which class it gets classified
/// into, never by its message text once classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Network,
    Timeout,
    Auth,
    Validation,
    RateLimit,
    Server,
    ExternalService,
    Websocket,
    PlayerDisconnected,
    ResourceExhausted,
    Unknown,
}

/// Classify by message substring or HTTP-like status code. Status codes win over substrings when both are
/// available; unrecognized input is `Unknown`.
pub fn classify(message: &str, status_code: Option<u16>) -> ErrorClass {
    if let Some(code) = status_code {
        match code {
            401 => return ErrorClass::Auth,
            429 => return ErrorClass::RateLimit,
            400 => return ErrorClass::Validation,
            500..=599 => return ErrorClass::Server,
            _ => {}
        }
    }

    let lower = message.to_ascii_lowercase();
    if lower.contains("disconnect") {
        ErrorClass::PlayerDisconnected
    } else if lower.contains("websocket") || lower.contains("ws:") {
        ErrorClass::Websocket
    } else if lower.contains("rate limit") || lower.contains("too many requests") {
        ErrorClass::RateLimit
    } else if lower.contains("timeout") || lower.contains("timed out") {
        ErrorClass::Timeout
    } else if lower.contains("unauthor") || lower.contains("auth") {
        ErrorClass::Auth
    } else if lower.contains("invalid") || lower.contains("validation") {
        ErrorClass::Validation
    } else if lower.contains("resource exhausted")
        || lower.contains("out of memory")
        || lower.contains("quota")
    {
        ErrorClass::ResourceExhausted
    } else if lower.contains("network") || lower.contains("connection refused") || lower.contains("dns") {
        ErrorClass::Network
    } else if lower.contains("external service") || lower.contains("upstream") {
        ErrorClass::ExternalService
    } else {
        ErrorClass::Unknown
    }
}

/// Surfaced by `CircuitBreaker::call` when the breaker is OPEN — the only detail a caller outside this
/// module should see; resource names and internal counters are not
/// part of the public error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("service temporarily unavailable")]
pub struct ServiceUnavailable;

/// The retry executor's own failure modes,
/// distinct from the classification of the operation's own error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    #[error("operation cancelled")]
    OperationCancelled,
    #[error("exhausted {attempts} attempt(s), last error: {last}")]
    Exhausted { attempts: u32, last: E },
}
