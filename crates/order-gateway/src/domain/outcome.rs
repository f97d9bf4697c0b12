//! Terminal results of a correlated request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The single result a caller receives for one dispatched request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<S, F> {
    /// A success event arrived for this request.
    Success(S),
    /// A failure event arrived for this request.
    Failure(F),
    /// The deadline passed first.
    TimedOut,
    /// Cancelled explicitly, or the engine shut down.
    Cancelled,
}

impl<S, F> Outcome<S, F> {
    /// The terminal state this outcome leaves its record in.
    pub fn terminal_state(&self) -> TerminalState {
        match self {
            Self::Success(_) => TerminalState::Fulfilled,
            Self::Failure(_) => TerminalState::Failed,
            Self::TimedOut => TerminalState::TimedOut,
            Self::Cancelled => TerminalState::Cancelled,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// What removed a pending record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalState {
    Fulfilled,
    Failed,
    TimedOut,
    Cancelled,
}

impl TerminalState {
    /// Settled by a completion event rather than by the engine itself.
    pub fn is_completion(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Failed)
    }
}

impl fmt::Display for TerminalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Fulfilled => "fulfilled",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
