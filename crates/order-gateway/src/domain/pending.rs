//! Pending Request Store - the correlation table behind the engine.
//!
//! Maps correlation ids to callers waiting for a completion event.
//!
//! Every path that ends a request (completion event, deadline, cancel,
//! shutdown, caller drop) goes through `DashMap::remove`. Only the path that
//! gets the record back may settle it, and the `oneshot` sender inside the
//! record is consumed by that one send. Together these give exactly-once
//! resolution without any extra locking on the hot path.

use super::error::EngineError;
use super::outcome::{Outcome, TerminalState};
use super::settled::SettledLedger;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use shared_types::CorrelationId;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

/// A pending request waiting for its completion event
struct PendingRecord<S, F> {
    /// Channel to deliver the outcome
    sender: oneshot::Sender<Outcome<S, F>>,
    /// When request was registered
    created_at: Instant,
    /// Deadline for this request
    timeout: Duration,
    /// Distinguishes this record from an earlier one with the same id
    generation: u64,
    /// Deadline timer, aborted when the record is removed by any other path
    timer: Option<AbortHandle>,
}

impl<S, F> PendingRecord<S, F> {
    fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Result of registering a request.
pub struct Registration<S, F> {
    /// Receives the one outcome for this request
    pub receiver: oneshot::Receiver<Outcome<S, F>>,
    /// Generation of the registered record
    pub generation: u64,
}

/// What happened to one inbound event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundDisposition {
    /// Matched a pending request and settled it.
    Matched(TerminalState),
    /// The event carried a blank correlation id.
    ProtocolError,
    /// The id was already settled by an earlier completion event.
    Duplicate(TerminalState),
    /// The id was settled by timeout or cancellation before the event arrived.
    Late(TerminalState),
    /// The id was never seen, or was settled too long ago to remember.
    Unknown,
}

/// Statistics for pending request store
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total requests registered
    pub total_registered: AtomicU64,
    /// Total requests settled by a success event
    pub total_fulfilled: AtomicU64,
    /// Total requests settled by a failure event
    pub total_failed: AtomicU64,
    /// Total requests timed out
    pub total_timeouts: AtomicU64,
    /// Total requests cancelled (explicitly or on shutdown)
    pub total_cancelled: AtomicU64,
    /// Total requests whose caller stopped waiting
    pub total_abandoned: AtomicU64,
    /// Inbound events with a blank correlation id
    pub protocol_errors: AtomicU64,
    /// Second completion for an already completed id
    pub duplicate_completions: AtomicU64,
    /// Completion for an id that already timed out or was cancelled
    pub late_events: AtomicU64,
    /// Completion for an id never seen
    pub unknown_events: AtomicU64,
}

/// Point-in-time view of the engine's counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineMetrics {
    pub pending: usize,
    pub total_dispatched: u64,
    pub total_fulfilled: u64,
    pub total_failed: u64,
    pub total_timeouts: u64,
    pub total_cancelled: u64,
    pub total_abandoned: u64,
    pub protocol_errors: u64,
    pub duplicate_completions: u64,
    pub late_events: u64,
    pub unknown_events: u64,
}

/// Pending request store for async-to-sync bridging.
///
/// Flow:
/// 1. Engine picks a `CorrelationId`
/// 2. Engine calls `register()` to get a oneshot receiver, then `arm_timer()`
/// 3. Engine sends the request envelope on the outbound channel
/// 4. An inbound listener calls `complete()` with the event's id
/// 5. Caller awaits the receiver; the timer settles it if nothing arrives
pub struct PendingRequestStore<S, F> {
    /// Map of correlation ID to pending request
    pending: DashMap<CorrelationId, PendingRecord<S, F>>,
    /// Recently settled ids, for classifying stray events
    settled: Mutex<SettledLedger>,
    next_generation: AtomicU64,
    /// Statistics
    stats: PendingStats,
}

impl<S, F> PendingRequestStore<S, F> {
    /// Create a new pending request store
    pub fn new(settled_retention: Duration) -> Self {
        Self {
            pending: DashMap::new(),
            settled: Mutex::new(SettledLedger::new(settled_retention)),
            next_generation: AtomicU64::new(1),
            stats: PendingStats::default(),
        }
    }

    /// Register a pending request under `correlation_id`.
    ///
    /// # Errors
    ///
    /// `EngineError::DuplicateCorrelationId` if the id is already live.
    pub fn register(
        &self,
        correlation_id: CorrelationId,
        timeout: Duration,
    ) -> Result<Registration<S, F>, EngineError> {
        let (tx, rx) = oneshot::channel();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        match self.pending.entry(correlation_id.clone()) {
            Entry::Occupied(_) => {
                return Err(EngineError::DuplicateCorrelationId(correlation_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingRecord {
                    sender: tx,
                    created_at: Instant::now(),
                    timeout,
                    generation,
                    timer: None,
                });
            }
        }

        self.settled.lock().forget(&correlation_id);
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = %correlation_id,
            timeout_ms = timeout.as_millis() as u64,
            "Registered pending request"
        );

        Ok(Registration {
            receiver: rx,
            generation,
        })
    }

    /// Complete a pending request with an outcome carried by an inbound event.
    ///
    /// Never panics and never settles anything but the matching record.
    pub fn complete(
        &self,
        correlation_id: &CorrelationId,
        outcome: Outcome<S, F>,
    ) -> InboundDisposition {
        if correlation_id.is_blank() {
            self.stats.protocol_errors.fetch_add(1, Ordering::Relaxed);
            return InboundDisposition::ProtocolError;
        }

        let state = outcome.terminal_state();
        let mut settled = self.settled.lock();

        let Some((_, mut record)) = self.pending.remove(correlation_id) else {
            let disposition = match settled.lookup(correlation_id) {
                Some(previous) if previous.is_completion() => {
                    self.stats
                        .duplicate_completions
                        .fetch_add(1, Ordering::Relaxed);
                    InboundDisposition::Duplicate(previous)
                }
                Some(previous) => {
                    self.stats.late_events.fetch_add(1, Ordering::Relaxed);
                    InboundDisposition::Late(previous)
                }
                None => {
                    self.stats.unknown_events.fetch_add(1, Ordering::Relaxed);
                    InboundDisposition::Unknown
                }
            };
            return disposition;
        };

        settled.record(correlation_id.clone(), state);
        drop(settled);

        record.disarm();
        let counter = match state {
            TerminalState::Fulfilled => &self.stats.total_fulfilled,
            _ => &self.stats.total_failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let elapsed = record.created_at.elapsed();
        if record.sender.send(outcome).is_err() {
            debug!(
                correlation_id = %correlation_id,
                "Pending request receiver dropped before completion"
            );
        }

        debug!(
            correlation_id = %correlation_id,
            state = %state,
            elapsed_ms = elapsed.as_millis() as u64,
            "Completed pending request"
        );

        InboundDisposition::Matched(state)
    }

    /// Settle a request as `TimedOut` if it is still the same record.
    ///
    /// Returns true if the request was still pending.
    pub fn expire(&self, correlation_id: &CorrelationId, generation: u64) -> bool {
        let Some(record) = self.remove_settled(
            correlation_id,
            Some(generation),
            TerminalState::TimedOut,
        ) else {
            return false;
        };

        self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
        warn!(
            correlation_id = %correlation_id,
            elapsed_ms = record.created_at.elapsed().as_millis() as u64,
            timeout_ms = record.timeout.as_millis() as u64,
            "Pending request timed out"
        );
        let _ = record.sender.send(Outcome::TimedOut);
        true
    }

    /// Cancel a pending request.
    ///
    /// Returns true if a live request was cancelled.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        self.cancel_record(correlation_id, None)
    }

    /// Cancel a pending request only if it is still the given generation.
    ///
    /// Returns true if that record was still pending.
    pub fn cancel_generation(&self, correlation_id: &CorrelationId, generation: u64) -> bool {
        self.cancel_record(correlation_id, Some(generation))
    }

    fn cancel_record(&self, correlation_id: &CorrelationId, generation: Option<u64>) -> bool {
        let Some(mut record) =
            self.remove_settled(correlation_id, generation, TerminalState::Cancelled)
        else {
            return false;
        };

        record.disarm();
        self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
        debug!(correlation_id = %correlation_id, "Cancelled pending request");
        let _ = record.sender.send(Outcome::Cancelled);
        true
    }

    /// Cancel every pending request. Returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let ids: Vec<CorrelationId> = self.pending.iter().map(|e| e.key().clone()).collect();
        ids.iter().filter(|id| self.cancel(id)).count()
    }

    /// Drop a request whose caller is no longer waiting.
    ///
    /// Returns true if the record was still pending.
    pub fn abandon(&self, correlation_id: &CorrelationId, generation: u64) -> bool {
        let Some(mut record) = self.remove_settled(
            correlation_id,
            Some(generation),
            TerminalState::Cancelled,
        ) else {
            return false;
        };

        record.disarm();
        self.stats.total_abandoned.fetch_add(1, Ordering::Relaxed);
        debug!(correlation_id = %correlation_id, "Caller abandoned pending request");
        true
    }

    /// Remove a record (optionally only a specific generation of it) and
    /// note how it settled.
    fn remove_settled(
        &self,
        correlation_id: &CorrelationId,
        generation: Option<u64>,
        state: TerminalState,
    ) -> Option<PendingRecord<S, F>> {
        let mut settled = self.settled.lock();
        let (_, record) = match generation {
            Some(generation) => self
                .pending
                .remove_if(correlation_id, |_, record| record.generation == generation)?,
            None => self.pending.remove(correlation_id)?,
        };
        settled.record(correlation_id.clone(), state);
        Some(record)
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    /// Snapshot the counters
    pub fn metrics(&self) -> EngineMetrics {
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let stats = &self.stats;

        EngineMetrics {
            pending: self.pending_count(),
            total_dispatched: load(&stats.total_registered),
            total_fulfilled: load(&stats.total_fulfilled),
            total_failed: load(&stats.total_failed),
            total_timeouts: load(&stats.total_timeouts),
            total_cancelled: load(&stats.total_cancelled),
            total_abandoned: load(&stats.total_abandoned),
            protocol_errors: load(&stats.protocol_errors),
            duplicate_completions: load(&stats.duplicate_completions),
            late_events: load(&stats.late_events),
            unknown_events: load(&stats.unknown_events),
        }
    }
}

impl<S, F> PendingRequestStore<S, F>
where
    S: Send + 'static,
    F: Send + 'static,
{
    /// Start the deadline timer for a registered record.
    ///
    /// The timer holds only a weak reference, so a dropped store does not
    /// outlive its timers. If the record is already gone the timer is
    /// aborted immediately.
    pub fn arm_timer(
        self: &Arc<Self>,
        runtime: &Handle,
        correlation_id: &CorrelationId,
        generation: u64,
        timeout: Duration,
    ) {
        let store = Arc::downgrade(self);
        let timer_id = correlation_id.clone();
        let task = runtime.spawn(async move {
            tokio::time::sleep(timeout).await;
            if let Some(store) = store.upgrade() {
                store.expire(&timer_id, generation);
            }
        });

        let timer = task.abort_handle();
        match self.pending.get_mut(correlation_id) {
            Some(mut record) if record.generation == generation => {
                record.timer = Some(timer);
            }
            _ => timer.abort(),
        }
    }
}
