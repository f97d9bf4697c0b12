//! # Subscriptions
//!
//! Handles returned by [`MessageChannel::subscribe`](crate::MessageChannel::subscribe)
//! and the per-subscriber delivery loop.

use crate::channel::Listener;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, error, warn};

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// Subscribing needs a Tokio runtime to drive delivery.
    #[error("no Tokio runtime available to deliver messages on channel '{0}'")]
    NoRuntime(String),

    /// The channel was closed.
    #[error("channel '{0}' closed")]
    Closed(String),
}

/// Opaque handle identifying one subscription on one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionHandle(u64);

impl SubscriptionHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw numeric id (unique per channel).
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Deliver every message from `receiver` to `listener`, in order, until the
/// channel closes or the task is aborted.
///
/// A panicking listener is contained here: the panic is logged and the loop
/// moves on to the next message.
pub(crate) async fn deliver<M: Clone>(
    channel: String,
    handle: SubscriptionHandle,
    mut receiver: broadcast::Receiver<M>,
    listener: Listener<M>,
) {
    loop {
        match receiver.recv().await {
            Ok(message) => {
                if catch_unwind(AssertUnwindSafe(|| listener(message))).is_err() {
                    error!(
                        channel = %channel,
                        subscription = %handle,
                        "Listener panicked, message dropped"
                    );
                }
            }
            Err(broadcast::error::RecvError::Lagged(count)) => {
                warn!(
                    channel = %channel,
                    subscription = %handle,
                    lagged = count,
                    "Subscriber lagged, oldest messages dropped"
                );
            }
            Err(broadcast::error::RecvError::Closed) => {
                debug!(channel = %channel, subscription = %handle, "Channel closed");
                return;
            }
        }
    }
}
