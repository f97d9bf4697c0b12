//! Order gateway error types.
//!
//! Backend outcomes (success, rejection, validation failure, timeout,
//! cancellation) are *values* of [`Outcome`](super::Outcome), not errors.
//! The types here cover misuse of the engine and bad configuration.

use shared_bus::SubscriptionError;
use shared_types::CorrelationId;
use thiserror::Error;

/// Error kinds surfaced in `PlaceOrderResponse.error.error`.
pub mod codes {
    /// No completion event arrived before the deadline.
    pub const TIMEOUT: &str = "Timeout";
    /// The request was cancelled or the engine shut down while it was pending.
    pub const CANCELLED: &str = "Cancelled";
    /// The request could not be dispatched at all.
    pub const UNAVAILABLE: &str = "Unavailable";
    /// The backend's failure payload did not match the configured shape.
    pub const PROTOCOL_ERROR: &str = "ProtocolError";
}

/// Errors returned by the correlation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine was shut down (or never attached).
    #[error("Engine is detached from its channels")]
    Detached,

    /// A caller-supplied id collides with a live request.
    #[error("Correlation ID already in flight: {0}")]
    DuplicateCorrelationId(CorrelationId),

    /// A caller-supplied id was blank.
    #[error("Correlation ID must not be blank")]
    InvalidCorrelationId,

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Installing an inbound listener failed.
    #[error("Subscription failed: {0}")]
    Subscription(#[from] SubscriptionError),
}

impl From<ConfigError> for EngineError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Invalid retention: {0}")]
    InvalidRetention(String),

    #[error("Invalid capacity: {0}")]
    InvalidCapacity(String),

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(String),
}

/// Top-level gateway error
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),
}
