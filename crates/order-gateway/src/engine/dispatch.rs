//! Per-request dispatch options and the caller-side future.

use crate::domain::{Outcome, PendingRequestStore};
use shared_types::CorrelationId;
use std::future::Future;
use std::pin::Pin;
use std::sync::Weak;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::sync::oneshot;

/// Options for a single dispatch.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    /// Deadline for this request. `None` uses the engine default.
    pub timeout: Option<Duration>,
    /// Use this id instead of generating one. Must not be live.
    pub correlation_id: Option<CorrelationId>,
}

impl DispatchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

/// Future for the outcome of one dispatched request.
///
/// Resolves exactly once. Dropping it before it resolves removes the
/// pending record, so an abandoned request never lingers in the engine.
#[must_use = "dropping a PendingOutcome abandons the request"]
pub struct PendingOutcome<S, F> {
    correlation_id: CorrelationId,
    receiver: oneshot::Receiver<Outcome<S, F>>,
    store: Weak<PendingRequestStore<S, F>>,
    generation: u64,
    done: bool,
}

impl<S, F> PendingOutcome<S, F> {
    pub(crate) fn new(
        correlation_id: CorrelationId,
        receiver: oneshot::Receiver<Outcome<S, F>>,
        store: Weak<PendingRequestStore<S, F>>,
        generation: u64,
    ) -> Self {
        Self {
            correlation_id,
            receiver,
            store,
            generation,
            done: false,
        }
    }

    /// Id the request was dispatched under.
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Cancel this request. The future then resolves to `Cancelled`,
    /// unless it was already settled.
    ///
    /// Only touches the record this future was created for, even if the id
    /// has since been reused by another dispatch.
    pub fn cancel(&self) -> bool {
        self.store.upgrade().is_some_and(|store| {
            store.cancel_generation(&self.correlation_id, self.generation)
        })
    }
}

impl<S, F> Future for PendingOutcome<S, F> {
    type Output = Outcome<S, F>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        if this.done {
            panic!("`PendingOutcome` polled after completion");
        }

        match Pin::new(&mut this.receiver).poll(cx) {
            Poll::Ready(result) => {
                this.done = true;
                // A dropped sender means the store went away with the engine.
                Poll::Ready(result.unwrap_or(Outcome::Cancelled))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S, F> Drop for PendingOutcome<S, F> {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        if let Some(store) = self.store.upgrade() {
            store.abandon(&self.correlation_id, self.generation);
        }
    }
}

impl<S, F> std::fmt::Debug for PendingOutcome<S, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingOutcome")
            .field("correlation_id", &self.correlation_id)
            .field("done", &self.done)
            .finish()
    }
}
