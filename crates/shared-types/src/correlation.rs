//! Correlation ID for matching completion events to waiting callers.
//!
//! Engine-generated ids are UUID v7 strings (time-ordered). Callers may also
//! supply their own opaque id, as long as it is not blank.

use crate::errors::CorrelationIdError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Correlation ID carried on a request and echoed on its completion event.
///
/// The value is opaque to everything except the correlation engine, which
/// only ever compares ids for equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a fresh correlation ID (UUID v7).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wrap a caller-supplied id.
    ///
    /// # Errors
    ///
    /// Returns [`CorrelationIdError::Blank`] if the id is empty or whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, CorrelationIdError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(CorrelationIdError::Blank);
        }
        Ok(Self(value))
    }

    /// Placeholder used when an inbound event omits its id.
    ///
    /// A blank id never matches a pending request.
    pub fn blank() -> Self {
        Self(String::new())
    }

    /// True if the id is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }

    /// Borrow the raw string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CorrelationId {
    type Err = CorrelationIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for CorrelationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
