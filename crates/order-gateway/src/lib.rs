//! # Order Gateway
//!
//! A synchronous `placeOrder` API over an asynchronous backend that is only
//! reachable through one-directional channels.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                     ORDER GATEWAY                         │
//! ├───────────────────────────────────────────────────────────┤
//! │  PlaceOrderAdapter   placeOrder(order) / version          │
//! │          │                                                │
//! │  ┌───────┴──────────────────────────────────────┐         │
//! │  │            Correlation Engine                │         │
//! │  │  dispatch → PendingOutcome (oneshot)         │         │
//! │  │  1 listener per inbound channel              │         │
//! │  │  per-request deadline timer                  │         │
//! │  └───────┬───────────────────────────▲──────────┘         │
//! └──────────┼───────────────────────────┼────────────────────┘
//!            │ orderPlaced               │ orderSucceeded / orderFailed
//!            ▼                           │
//!                   Order backend (opaque)
//! ```
//!
//! Every request carries a correlation id which the backend echoes on its
//! completion event. Each caller's future settles exactly once: with the
//! matching success or failure, `TimedOut`, or `Cancelled`.
//!
//! ## Usage
//!
//! ```ignore
//! use order_gateway::{GatewayConfig, OrderGatewayService};
//!
//! let (service, channels) = OrderGatewayService::in_memory(GatewayConfig::from_env()?)?;
//! // hand `channels` to the backend side
//! let response = service.place_order(order).await;
//! ```

#![warn(clippy::all)]
#![deny(unsafe_code)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod domain;
pub mod engine;
pub mod service;

// Re-exports for public API
pub use adapters::{OrderEngine, OrderFailure, OrderOutcome, PlaceOrderAdapter, API_VERSION};
pub use domain::config::{EngineConfig, FailureShape, GatewayConfig};
pub use domain::error::{codes, ConfigError, EngineError, GatewayError};
pub use domain::{EngineMetrics, Outcome, PlaceOrderResponse, TerminalState};
pub use engine::{CorrelationEngine, DispatchOptions, PendingOutcome};
pub use service::{InMemoryOrderChannels, OrderGatewayService};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
