//! # Error Types
//!
//! Errors raised while constructing shared wire types.

use thiserror::Error;

/// Errors from building a correlation id.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CorrelationIdError {
    /// The id was empty or whitespace only.
    #[error("correlation id must not be blank")]
    Blank,
}
