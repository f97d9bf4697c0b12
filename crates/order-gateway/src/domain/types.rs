//! Outward response of the place-order operation.

use serde::{Deserialize, Serialize};
use shared_types::{ErrorInfo, Event, FieldError};

/// Result of `placeOrder`, returned to the client.
///
/// Exactly one of `events`, `error` or `errors` is set. Absent fields are
/// omitted from the serialized form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub success: bool,
    /// Echo of the submitted `Order.orderId`.
    pub order_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<Event>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

impl PlaceOrderResponse {
    /// The order was accepted and produced `events`.
    pub fn succeeded(order_id: impl Into<String>, events: Vec<Event>) -> Self {
        Self {
            success: true,
            order_id: order_id.into(),
            events: Some(events),
            error: None,
            errors: None,
        }
    }

    /// The order was rejected, or could not be processed.
    pub fn rejected(order_id: impl Into<String>, error: ErrorInfo) -> Self {
        Self {
            success: false,
            order_id: order_id.into(),
            events: None,
            error: Some(error),
            errors: None,
        }
    }

    /// The order failed field validation.
    pub fn invalid(order_id: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            success: false,
            order_id: order_id.into(),
            events: None,
            error: None,
            errors: Some(errors),
        }
    }

    /// Kind of the single error, if any (`Timeout`, `Cancelled`, ...).
    pub fn error_kind(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.error.as_str())
    }
}
