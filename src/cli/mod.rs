//! CLI handlers
//!
//! - Argument parsing structures
//! - Mode routing for single, split and interactive runs
//! - The interactive prompt

pub mod args;
pub mod interactive;
pub mod router;

pub use args::Cli;
pub use interactive::{parse_command, run_interactive, ReplCommand};
pub use router::execute;
