//! # Order Gateway Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── support/          # Scripted mock backend, fixtures, logging
//! └── integration/      # End-to-end flows over in-memory channels
//!     ├── correlation.rs    # Routing, exactly-once, timeouts
//!     ├── lifecycle.rs      # Listeners, cancel, shutdown, caller drop
//!     └── place_order.rs    # Adapter responses through the service
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p og-tests
//! cargo test -p og-tests integration::correlation::
//! cargo bench -p og-tests
//! ```

pub mod integration;
pub mod support;
