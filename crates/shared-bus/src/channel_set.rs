//! # Channel Set
//!
//! The process-wide collection of channels bound to one backend instance:
//! one outbound dispatch channel and one inbound channel per outcome kind.

use crate::channel::{InMemoryChannel, MessageChannel};
use crate::{ORDER_FAILED, ORDER_PLACED, ORDER_SUCCEEDED};
use shared_types::{Envelope, OrderFailedBody, OrderSucceededBody, PlaceOrderBody};
use std::sync::Arc;

/// Channels shared by every request against one backend.
///
/// `Req` is the outbound request body, `S` and `F` the success and failure
/// event bodies. Cloning is cheap: only the `Arc`s are cloned.
pub struct ChannelSet<Req, S, F> {
    /// Gateway → backend.
    pub outbound: Arc<dyn MessageChannel<Envelope<Req>>>,
    /// Backend → gateway, success events.
    pub succeeded: Arc<dyn MessageChannel<Envelope<S>>>,
    /// Backend → gateway, failure events.
    pub failed: Arc<dyn MessageChannel<Envelope<F>>>,
}

impl<Req, S, F> ChannelSet<Req, S, F> {
    pub fn new(
        outbound: Arc<dyn MessageChannel<Envelope<Req>>>,
        succeeded: Arc<dyn MessageChannel<Envelope<S>>>,
        failed: Arc<dyn MessageChannel<Envelope<F>>>,
    ) -> Self {
        Self {
            outbound,
            succeeded,
            failed,
        }
    }
}

impl<Req, S, F> Clone for ChannelSet<Req, S, F> {
    fn clone(&self) -> Self {
        Self {
            outbound: Arc::clone(&self.outbound),
            succeeded: Arc::clone(&self.succeeded),
            failed: Arc::clone(&self.failed),
        }
    }
}

/// Channel set for the place-order flow.
pub type OrderChannelSet = ChannelSet<PlaceOrderBody, OrderSucceededBody, OrderFailedBody>;

/// In-process channel set with concrete handles kept for diagnostics.
///
/// Tests and single-process deployments build one of these, hand
/// [`channel_set`](Self::channel_set) to the gateway, and wire the backend
/// to the same channels.
pub struct InMemoryChannelSet<Req, S, F> {
    pub outbound: Arc<InMemoryChannel<Envelope<Req>>>,
    pub succeeded: Arc<InMemoryChannel<Envelope<S>>>,
    pub failed: Arc<InMemoryChannel<Envelope<F>>>,
}

impl<Req, S, F> InMemoryChannelSet<Req, S, F>
where
    Req: Clone + Send + Sync + 'static,
    S: Clone + Send + Sync + 'static,
    F: Clone + Send + Sync + 'static,
{
    /// Build the three channels with the given capacity, using the order
    /// port names (`orderPlaced`, `orderSucceeded`, `orderFailed`).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            outbound: Arc::new(InMemoryChannel::with_capacity(ORDER_PLACED, capacity)),
            succeeded: Arc::new(InMemoryChannel::with_capacity(ORDER_SUCCEEDED, capacity)),
            failed: Arc::new(InMemoryChannel::with_capacity(ORDER_FAILED, capacity)),
        }
    }

    /// Type-erased view for the gateway.
    pub fn channel_set(&self) -> ChannelSet<Req, S, F> {
        let outbound: Arc<dyn MessageChannel<Envelope<Req>>> = self.outbound.clone();
        let succeeded: Arc<dyn MessageChannel<Envelope<S>>> = self.succeeded.clone();
        let failed: Arc<dyn MessageChannel<Envelope<F>>> = self.failed.clone();
        ChannelSet::new(outbound, succeeded, failed)
    }

    /// Total active subscriptions across both inbound channels.
    pub fn inbound_subscriber_count(&self) -> usize {
        self.succeeded.subscriber_count() + self.failed.subscriber_count()
    }

    /// Close all three channels.
    pub fn close(&self) {
        self.outbound.close();
        self.succeeded.close();
        self.failed.close();
    }
}

impl<Req, S, F> Clone for InMemoryChannelSet<Req, S, F> {
    fn clone(&self) -> Self {
        Self {
            outbound: Arc::clone(&self.outbound),
            succeeded: Arc::clone(&self.succeeded),
            failed: Arc::clone(&self.failed),
        }
    }
}
