//! # Channel Message Bodies
//!
//! Bodies carried inside [`Envelope`](crate::Envelope) on each channel of
//! the order channel set.

use crate::order::{Event, Order};
use serde::{Deserialize, Serialize};

/// Outbound: `{correlationId, order}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceOrderBody {
    pub order: Order,
}

/// Inbound success: `{correlationId, events}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSucceededBody {
    pub events: Vec<Event>,
}

/// Inbound failure: `{correlationId, error}`.
///
/// The error is kept as raw JSON. Its canonical shape (`{error, reason}` or
/// a list of `{field, errorDescription}`) is a deployment choice decoded by
/// the gateway adapter, not by the correlation engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFailedBody {
    pub error: serde_json::Value,
}
