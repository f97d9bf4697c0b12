//! # Correlated Envelope
//!
//! The wrapper for every message that crosses a channel.
//!
//! The body is flattened next to the id, so the wire shape is
//! `{ "correlationId": ..., <body fields> }`:
//!
//! ```text
//! outbound   {correlationId, order}
//! succeeded  {correlationId, events: [...]}
//! failed     {correlationId, error}
//! ```

use crate::correlation::CorrelationId;
use serde::{Deserialize, Serialize};

/// A message body tagged with the correlation id of the request it belongs to.
///
/// A missing `correlationId` deserializes to a blank id, which the engine
/// treats as a protocol error rather than failing the whole decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope<T> {
    /// Correlation id; echoed verbatim by the backend on completion.
    #[serde(default = "CorrelationId::blank")]
    pub correlation_id: CorrelationId,

    /// The payload.
    #[serde(flatten)]
    pub body: T,
}

impl<T> Envelope<T> {
    /// Wrap a body with its correlation id.
    pub fn new(correlation_id: CorrelationId, body: T) -> Self {
        Self {
            correlation_id,
            body,
        }
    }

    /// Split into id and body.
    pub fn into_parts(self) -> (CorrelationId, T) {
        (self.correlation_id, self.body)
    }
}
