//! # Integration Flows
//!
//! Gateway and mock backend wired together over in-memory channels.

pub mod correlation;
pub mod place_order;
