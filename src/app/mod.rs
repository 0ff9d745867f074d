//! Application module
//!
//! Process-level concerns of the binary:
//! - Logging setup
//! - Fatal error reporting

pub mod error_handling;
pub mod logging;

pub use error_handling::handle_fatal_error;
pub use logging::{init_logging, log_level};
