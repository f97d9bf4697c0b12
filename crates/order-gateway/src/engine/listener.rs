//! Inbound listeners: one per inbound channel, installed at attach.

use crate::domain::{InboundDisposition, Outcome, PendingRequestStore};
use shared_bus::Listener;
use shared_types::Envelope;
use std::sync::Arc;
use tracing::{trace, warn};

/// Label of the success channel in logs.
pub(crate) const SUCCEEDED: &str = "succeeded";
/// Label of the failure channel in logs.
pub(crate) const FAILED: &str = "failed";

/// Build the listener for one inbound channel.
///
/// `into_outcome` wraps the event body in the matching `Outcome` variant.
/// Nothing escapes the listener: unmatched events are counted, logged and
/// dropped.
pub(crate) fn inbound_listener<B, S, F>(
    channel: &'static str,
    store: Arc<PendingRequestStore<S, F>>,
    into_outcome: fn(B) -> Outcome<S, F>,
) -> Listener<Envelope<B>>
where
    B: 'static,
    S: Send + 'static,
    F: Send + 'static,
{
    Arc::new(move |envelope: Envelope<B>| {
        let (correlation_id, body) = envelope.into_parts();

        match store.complete(&correlation_id, into_outcome(body)) {
            InboundDisposition::Matched(state) => {
                trace!(
                    correlation_id = %correlation_id,
                    channel,
                    state = %state,
                    "Routed inbound event"
                );
            }
            InboundDisposition::ProtocolError => {
                warn!(channel, "Dropped inbound event without correlation id");
            }
            InboundDisposition::Duplicate(previous) => {
                warn!(
                    correlation_id = %correlation_id,
                    channel,
                    previous = %previous,
                    "Dropped duplicate completion"
                );
            }
            InboundDisposition::Late(previous) => {
                warn!(
                    correlation_id = %correlation_id,
                    channel,
                    previous = %previous,
                    "Dropped late event for settled request"
                );
            }
            InboundDisposition::Unknown => {
                warn!(
                    correlation_id = %correlation_id,
                    channel,
                    "Dropped event for unknown correlation id"
                );
            }
        }
    })
}
