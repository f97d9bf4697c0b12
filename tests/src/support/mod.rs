//! Shared test infrastructure.

pub mod backend;

pub use backend::{MockOrderBackend, Reply};
pub use fixtures::*;
pub use logging::init_test_logging;
