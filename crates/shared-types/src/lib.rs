//! # Shared Types Crate
//!
//! Domain entities and channel message types for the order gateway.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Every message that crosses a channel is
//!   defined here, so the backend contract lives in one place.
//! - **Correlation on the Envelope**: Payloads never carry their own
//!   correlation field; the `Envelope<T>` wrapper owns it and the backend
//!   MUST echo it on every completion event.
//! - **camelCase on the wire**: field names match the outward schema
//!   (`orderId`, `timeStamp`, `errorDescription`, ...).

pub mod correlation;
pub mod envelope;
pub mod errors;
pub mod messages;
pub mod order;

pub use correlation::CorrelationId;
pub use envelope::Envelope;
pub use errors::CorrelationIdError;
pub use messages::{OrderFailedBody, OrderSucceededBody, PlaceOrderBody};
pub use order::*;
