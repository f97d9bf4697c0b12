//! # Correlation Engine
//!
//! Turns a shared, multiplexed set of one-directional channels into one
//! future per caller.
//!
//! ```text
//! dispatch(req) ──register──► PendingRequestStore ◄──complete── inbound listener
//!      │                            ▲     ▲                        (1 per channel)
//!      └──send {id, req}──► outbound│     └── deadline timer (1 per request)
//! ```
//!
//! ## Lifecycle
//!
//! `Created → Dispatched → {Fulfilled | Failed | TimedOut | Cancelled}`
//!
//! The record is inserted before the request is sent, so a backend that
//! answers instantly still finds it. Whichever path removes the record
//! (event, timer, cancel, shutdown, caller drop) is the only one allowed to
//! settle it.
//!
//! ## Listeners
//!
//! Exactly one listener per inbound channel is installed at
//! [`attach`](CorrelationEngine::attach) and removed at
//! [`shutdown`](CorrelationEngine::shutdown), independent of traffic.

mod dispatch;
mod listener;

pub use dispatch::{DispatchOptions, PendingOutcome};

use crate::domain::{
    EngineConfig, EngineError, EngineMetrics, Outcome, PendingRequestStore,
};
use parking_lot::RwLock;
use shared_bus::{ChannelSet, MessageChannel, SubscriptionError, SubscriptionHandle};
use shared_types::{CorrelationId, Envelope};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::{debug, info};

/// Inbound subscriptions held while attached.
#[derive(Debug, Clone, Copy)]
struct Listeners {
    succeeded: SubscriptionHandle,
    failed: SubscriptionHandle,
}

/// Correlation engine over one channel set.
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct CorrelationEngine<Req, S, F> {
    channels: ChannelSet<Req, S, F>,
    store: Arc<PendingRequestStore<S, F>>,
    /// `None` once shut down.
    listeners: RwLock<Option<Listeners>>,
    /// Runtime that drives deadline timers.
    runtime: Handle,
    config: EngineConfig,
}

impl<Req, S, F> CorrelationEngine<Req, S, F>
where
    Req: 'static,
    S: Send + 'static,
    F: Send + 'static,
{
    /// Validate `config` and install one listener on each inbound channel.
    ///
    /// Must be called from within a Tokio runtime; that runtime drives the
    /// per-request deadline timers.
    pub fn attach(channels: ChannelSet<Req, S, F>, config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let runtime = Handle::try_current()
            .map_err(|_| SubscriptionError::NoRuntime("correlation-engine".into()))?;
        let store = Arc::new(PendingRequestStore::new(config.settled_retention));

        let succeeded = channels.succeeded.subscribe(listener::inbound_listener(
            listener::SUCCEEDED,
            Arc::clone(&store),
            Outcome::Success,
        ))?;
        let failed = match channels.failed.subscribe(listener::inbound_listener(
            listener::FAILED,
            Arc::clone(&store),
            Outcome::Failure,
        )) {
            Ok(handle) => handle,
            Err(e) => {
                channels.succeeded.unsubscribe(succeeded);
                return Err(e.into());
            }
        };

        info!(
            default_timeout_ms = config.default_timeout.as_millis() as u64,
            "Correlation engine attached"
        );

        Ok(Self {
            channels,
            store,
            listeners: RwLock::new(Some(Listeners { succeeded, failed })),
            runtime,
            config,
        })
    }

    /// Send `request` and return a future for its single outcome.
    ///
    /// # Errors
    ///
    /// - `EngineError::Detached` after shutdown
    /// - `EngineError::InvalidCorrelationId` for a blank caller-supplied id
    /// - `EngineError::DuplicateCorrelationId` if that id is still in flight
    pub fn dispatch(
        &self,
        request: Req,
        options: DispatchOptions,
    ) -> Result<PendingOutcome<S, F>, EngineError> {
        let correlation_id = match options.correlation_id {
            Some(id) if id.is_blank() => return Err(EngineError::InvalidCorrelationId),
            Some(id) => id,
            None => CorrelationId::generate(),
        };
        let timeout = options.timeout.unwrap_or(self.config.default_timeout);

        let registration = {
            // Holding the read lock keeps shutdown from draining between
            // the attach check and the insert.
            let listeners = self.listeners.read();
            if listeners.is_none() {
                return Err(EngineError::Detached);
            }
            let registration = self.store.register(correlation_id.clone(), timeout)?;
            self.store
                .arm_timer(&self.runtime, &correlation_id, registration.generation, timeout);
            registration
        };

        let pending = PendingOutcome::new(
            correlation_id.clone(),
            registration.receiver,
            Arc::downgrade(&self.store),
            registration.generation,
        );

        self.channels
            .outbound
            .send(Envelope::new(correlation_id.clone(), request));

        debug!(
            correlation_id = %correlation_id,
            timeout_ms = timeout.as_millis() as u64,
            "Dispatched request"
        );

        Ok(pending)
    }

    /// Dispatch and wait for the outcome.
    pub async fn request(
        &self,
        request: Req,
        options: DispatchOptions,
    ) -> Result<Outcome<S, F>, EngineError> {
        Ok(self.dispatch(request, options)?.await)
    }
}

impl<Req, S, F> CorrelationEngine<Req, S, F> {
    /// Cancel a pending request. Returns true if it was still pending.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        self.store.cancel(correlation_id)
    }

    /// Detach from the inbound channels and cancel everything in flight.
    ///
    /// Returns how many pending requests were cancelled. Idempotent; later
    /// dispatches fail with `EngineError::Detached`.
    pub fn shutdown(&self) -> usize {
        let Some(listeners) = self.listeners.write().take() else {
            return 0;
        };

        self.channels.succeeded.unsubscribe(listeners.succeeded);
        self.channels.failed.unsubscribe(listeners.failed);
        let cancelled = self.store.cancel_all();

        info!(cancelled, "Correlation engine detached");
        cancelled
    }

    pub fn is_attached(&self) -> bool {
        self.listeners.read().is_some()
    }

    /// Number of requests awaiting an outcome.
    pub fn pending_count(&self) -> usize {
        self.store.pending_count()
    }

    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.store.is_pending(correlation_id)
    }

    /// Snapshot of the engine's counters.
    pub fn metrics(&self) -> EngineMetrics {
        self.store.metrics()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}

impl<Req, S, F> Drop for CorrelationEngine<Req, S, F> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
