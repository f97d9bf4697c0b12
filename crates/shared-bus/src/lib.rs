//! # Shared Bus - One-Directional Message Channels
//!
//! The channel layer between the order gateway and its event-driven backend.
//!
//! ## Channel Contract
//!
//! A channel is a named, unidirectional pub/sub primitive:
//!
//! - `send(message)` is fire-and-forget; every *currently active*
//!   subscriber receives the message, in send order. Nothing is persisted.
//! - `subscribe(listener)` registers a callback and returns a handle.
//! - `unsubscribe(handle)` is idempotent.
//!
//! There is no ordering guarantee *across* channels.
//!
//! ## Channel Set
//!
//! ```text
//! ┌──────────────┐  orderPlaced     ┌──────────────┐
//! │   Gateway    │ ───────────────► │   Backend    │
//! │              │                  │   (opaque)   │
//! │              │ ◄─────────────── │              │
//! └──────────────┘  orderSucceeded  └──────────────┘
//!                   orderFailed
//! ```
//!
//! One outbound channel, one inbound channel per outcome kind, created once
//! per process and bound to a single backend instance.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod channel;
pub mod channel_set;
pub mod subscription;

// Re-export main types
pub use channel::{InMemoryChannel, Listener, MessageChannel};
pub use channel_set::{ChannelSet, InMemoryChannelSet, OrderChannelSet};
pub use subscription::{SubscriptionError, SubscriptionHandle};

/// Maximum messages buffered per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;

/// Outbound channel name (gateway → backend).
pub const ORDER_PLACED: &str = "orderPlaced";

/// Inbound success channel name (backend → gateway).
pub const ORDER_SUCCEEDED: &str = "orderSucceeded";

/// Inbound failure channel name (backend → gateway).
pub const ORDER_FAILED: &str = "orderFailed";
