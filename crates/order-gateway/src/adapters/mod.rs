//! Outward operations built on the correlation engine.

pub mod failure;
pub mod place_order;

pub use failure::{FailureDecodeError, OrderFailure};
pub use place_order::{OrderEngine, OrderOutcome, PlaceOrderAdapter, API_VERSION};
