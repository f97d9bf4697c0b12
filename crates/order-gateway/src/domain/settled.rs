//! # Settled Ledger
//!
//! Remembers recently settled correlation ids for a bounded time so the
//! inbound listener can tell apart events that arrive for an id that is
//! no longer pending:
//!
//! - settled as `Fulfilled`/`Failed` → duplicate completion
//! - settled as `TimedOut`/`Cancelled` → late event
//! - never seen (or forgotten) → unknown
//!
//! Entries older than the retention window are garbage-collected on insert,
//! at most once per GC interval. The ledger is diagnostics only; routing
//! never depends on it.

use super::outcome::TerminalState;
use shared_types::CorrelationId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Time-bounded record of recently settled ids.
#[derive(Debug)]
pub struct SettledLedger {
    /// id -> (how it settled, when)
    entries: HashMap<CorrelationId, (TerminalState, Instant)>,

    retention: Duration,

    last_gc: Instant,

    gc_interval: Duration,
}

impl SettledLedger {
    /// Default retention: long enough to cover typical backend stragglers.
    pub const DEFAULT_RETENTION: Duration = Duration::from_secs(120);

    /// Default garbage collection interval.
    pub const DEFAULT_GC_INTERVAL: Duration = Duration::from_secs(10);

    /// GC runs at most every `DEFAULT_GC_INTERVAL`, or every `retention`
    /// if that is shorter.
    #[must_use]
    pub fn new(retention: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            retention,
            last_gc: Instant::now(),
            gc_interval: Self::DEFAULT_GC_INTERVAL.min(retention),
        }
    }

    /// Record how `id` settled.
    pub fn record(&mut self, id: CorrelationId, state: TerminalState) {
        let now = Instant::now();
        if now.saturating_duration_since(self.last_gc) >= self.gc_interval {
            self.garbage_collect(now);
            self.last_gc = now;
        }
        self.entries.insert(id, (state, now));
    }

    /// How `id` settled, if it did so within the retention window.
    #[must_use]
    pub fn lookup(&self, id: &CorrelationId) -> Option<TerminalState> {
        let (state, at) = self.entries.get(id)?;
        (at.elapsed() < self.retention).then_some(*state)
    }

    /// Drop any memory of `id` (used when an id is registered again).
    pub fn forget(&mut self, id: &CorrelationId) {
        self.entries.remove(id);
    }

    fn garbage_collect(&mut self, now: Instant) {
        let retention = self.retention;
        self.entries
            .retain(|_, (_, at)| now.saturating_duration_since(*at) < retention);
    }
}

impl Default for SettledLedger {
    fn default() -> Self {
        Self::new(Self::DEFAULT_RETENTION)
    }
}
