//! Domain types for the order gateway.
//!
//! Configuration, errors, outcomes and the bookkeeping behind the
//! correlation engine. The engine itself lives in [`crate::engine`].

pub mod config;
pub mod error;
pub mod outcome;
pub mod pending;
pub mod settled;
pub mod types;

// Re-exports for convenience
pub use config::{EngineConfig, FailureShape, GatewayConfig};
pub use error::{codes, ConfigError, EngineError, GatewayError};
pub use outcome::{Outcome, TerminalState};
pub use pending::{
    EngineMetrics, InboundDisposition, PendingRequestStore, PendingStats, Registration,
};
pub use settled::SettledLedger;
pub use types::PlaceOrderResponse;
