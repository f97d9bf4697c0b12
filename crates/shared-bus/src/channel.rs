//! # Message Channel
//!
//! The channel capability consumed by the gateway, and its in-memory
//! implementation.

use crate::subscription::{deliver, SubscriptionError, SubscriptionHandle};
use crate::DEFAULT_CHANNEL_CAPACITY;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Callback invoked once per message delivered to a subscription.
pub type Listener<M> = Arc<dyn Fn(M) + Send + Sync>;

/// A named, unidirectional pub/sub primitive.
///
/// Any implementation honoring this contract is interchangeable: the gateway
/// never depends on how messages are transported.
pub trait MessageChannel<M>: Send + Sync {
    /// Fire-and-forget. Every currently active subscriber receives `message`;
    /// there is no delivery guarantee beyond that.
    fn send(&self, message: M);

    /// Register a listener for all future sends.
    ///
    /// # Errors
    ///
    /// Returns a [`SubscriptionError`] if the channel cannot deliver to a new
    /// subscriber (closed, or no runtime to drive delivery).
    fn subscribe(&self, listener: Listener<M>) -> Result<SubscriptionHandle, SubscriptionError>;

    /// Remove a subscription. No-op if it was already removed.
    fn unsubscribe(&self, handle: SubscriptionHandle);
}

/// In-memory channel built on `tokio::sync::broadcast`.
///
/// Each subscription owns one delivery task, so a listener sees messages in
/// send order and a slow listener never blocks `send`. A subscriber that
/// falls more than `capacity` messages behind loses the oldest ones.
pub struct InMemoryChannel<M> {
    /// Channel name (for logs).
    name: String,

    /// Broadcast sender for messages.
    sender: broadcast::Sender<M>,

    /// Delivery task per active subscription.
    subscriptions: Mutex<HashMap<SubscriptionHandle, JoinHandle<()>>>,

    /// Next subscription id.
    next_id: AtomicU64,

    /// Total messages sent.
    messages_sent: AtomicU64,

    /// Set once the channel is closed.
    closed: AtomicBool,

    /// Channel capacity.
    capacity: usize,
}

impl<M> InMemoryChannel<M>
where
    M: Clone + Send + 'static,
{
    /// Create a channel with the default capacity.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_capacity(name, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a channel with the given per-subscriber buffer capacity.
    ///
    /// A capacity of zero is raised to one.
    #[must_use]
    pub fn with_capacity(name: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (sender, _) = broadcast::channel(capacity);
        Self {
            name: name.into(),
            sender,
            subscriptions: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            messages_sent: AtomicU64::new(0),
            closed: AtomicBool::new(false),
            capacity,
        }
    }

    /// Channel name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of active subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscriptions.lock().len()
    }

    /// Total messages sent (including ones nobody received).
    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    /// Per-subscriber buffer capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// True once [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Stop all deliveries and refuse new subscriptions.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let tasks: Vec<_> = self.subscriptions.lock().drain().collect();
        for (_, task) in tasks {
            task.abort();
        }
        debug!(channel = %self.name, "Channel closed");
    }
}

impl<M> MessageChannel<M> for InMemoryChannel<M>
where
    M: Clone + Send + 'static,
{
    fn send(&self, message: M) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);

        if self.is_closed() {
            warn!(channel = %self.name, "Message dropped (channel closed)");
            return;
        }

        match self.sender.send(message) {
            Ok(receivers) => {
                debug!(channel = %self.name, receivers = receivers, "Message sent");
            }
            Err(_) => {
                warn!(channel = %self.name, "Message dropped (no subscribers)");
            }
        }
    }

    fn subscribe(&self, listener: Listener<M>) -> Result<SubscriptionHandle, SubscriptionError> {
        if self.is_closed() {
            return Err(SubscriptionError::Closed(self.name.clone()));
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|_| SubscriptionError::NoRuntime(self.name.clone()))?;

        let handle = SubscriptionHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        // The receiver exists before we return, so no send after this point
        // can be missed by the new subscriber.
        let receiver = self.sender.subscribe();
        let task = runtime.spawn(deliver(self.name.clone(), handle, receiver, listener));

        self.subscriptions.lock().insert(handle, task);
        debug!(channel = %self.name, subscription = %handle, "New subscription created");

        Ok(handle)
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) {
        if let Some(task) = self.subscriptions.lock().remove(&handle) {
            task.abort();
            debug!(channel = %self.name, subscription = %handle, "Subscription removed");
        }
    }
}

impl<M> Drop for InMemoryChannel<M> {
    fn drop(&mut self) {
        for (_, task) in self.subscriptions.get_mut().drain() {
            task.abort();
        }
    }
}
