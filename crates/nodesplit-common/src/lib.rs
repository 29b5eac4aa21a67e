//! Common utilities shared across nodesplit crates
//!
//! Environment bootstrapping and logging setup used by the binary and by
//! integration tests.

pub mod init;
pub mod logging;

pub use init::initialize_environment;
pub use logging::{LoggingGuard, LoggingOptions, init_logging};
