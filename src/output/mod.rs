//! Line formatting and the sink set every runner publishes into.

pub mod formatter;
pub mod sink;

pub use formatter::{format_line, split_tag, TimestampPolicy, DEFAULT_TIMESTAMP_FORMAT};
pub use sink::{append_to_file, ConsoleMode, SinkSet, StreamSource};
