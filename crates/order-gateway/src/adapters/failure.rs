//! Decoding of the backend's opaque failure payload.

use crate::domain::FailureShape;
use serde::Deserialize;
use shared_types::{ErrorInfo, FieldError};
use thiserror::Error;

/// A failure event decoded according to the deployment's [`FailureShape`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderFailure {
    /// Business-rule rejection: `{error, reason}`.
    Rejected(ErrorInfo),
    /// Per-field validation errors: `[{field, errorDescription}]`.
    Invalid(Vec<FieldError>),
}

/// The payload did not have the configured shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failure payload does not match shape {shape:?}: {message}")]
pub struct FailureDecodeError {
    pub shape: FailureShape,
    pub message: String,
}

impl OrderFailure {
    /// Decode `payload` as `shape`. No fallback to the other shape.
    pub fn decode(shape: FailureShape, payload: &serde_json::Value) -> Result<Self, FailureDecodeError> {
        let mismatch = |e: serde_json::Error| FailureDecodeError {
            shape,
            message: e.to_string(),
        };

        match shape {
            FailureShape::Reason => ErrorInfo::deserialize(payload)
                .map(Self::Rejected)
                .map_err(mismatch),
            FailureShape::FieldErrors => Vec::<FieldError>::deserialize(payload)
                .map(Self::Invalid)
                .map_err(mismatch),
        }
    }
}
