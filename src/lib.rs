//! # ShellCast
//!
//! Run terminal commands and multiplex their output into the console, an
//! in-memory buffer, a live-stream capture file and a recording file.
//!
//! ## Usage
//!
//! ```bash
//! shellcast [--rtmp URL] [--record] [--timestamp] COMMAND [ARGS...]
//! shellcast --split "cmd1 args" "cmd2 args"
//! shellcast -i
//! ```
//!
//! ## Modules
//!
//! - `app` - Logging setup and fatal error reporting for the binary
//! - `cli` - Argument parsing, mode routing and the interactive prompt
//! - `config` - Persisted settings and theme presets
//! - `error` - Library error type
//! - `output` - Line formatting and the fan-out sink set
//! - `session` - Command runners and the streaming/recording lifecycles
//! - `subprocess` - Process spawning behind a mockable trait
pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod session;
pub mod subprocess;

pub use error::{Error, Result};
