//! # Order Domain Entities
//!
//! The outward "place order" schema: an order with customer info, two
//! addresses and an ordered list of lines, plus the event and error shapes
//! the backend reports back.

use serde::{Deserialize, Serialize};

// =============================================================================
// ORDER INPUT
// =============================================================================

/// A postal address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub line3: String,
    pub line4: String,
    pub city: String,
    pub zip_code: String,
}

/// Customer contact details.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
}

/// One line item. Quantity is fractional to allow weighed products.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub order_line_id: String,
    pub product_code: String,
    pub quantity: f64,
}

/// An order as submitted by a client.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Client-chosen order identifier. Not used for correlation.
    pub order_id: String,
    pub customer_info: CustomerInfo,
    pub shipping_address: Address,
    pub billing_address: Address,
    /// Line items, in submission order.
    pub lines: Vec<OrderLine>,
}

// =============================================================================
// BACKEND OUTPUT
// =============================================================================

/// A domain event emitted by the backend when an order succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Event name, e.g. `OrderPlaced`.
    pub event: String,
    /// Backend timestamp (milliseconds, as a float on the wire).
    pub time_stamp: f64,
    /// Event data, serialized by the backend.
    pub data: String,
}

impl Event {
    pub fn new(event: impl Into<String>, time_stamp: f64, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            time_stamp,
            data: data.into(),
        }
    }
}

/// A business-rule rejection: `{error, reason}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub error: String,
    pub reason: String,
}

impl ErrorInfo {
    pub fn new(error: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            reason: reason.into(),
        }
    }
}

/// A per-field validation failure: `{field, errorDescription}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldError {
    pub field: String,
    pub error_description: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, error_description: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            error_description: error_description.into(),
        }
    }
}
