//! Display formatting for captured lines.

use chrono::format::{Item, StrftimeItems};
use chrono::Local;

use crate::error::{Error, Result};

pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Whether lines get a `[<time>]` bracket, and how the time is rendered.
///
/// The format is a chrono strftime string, checked once at construction so
/// that formatting a line can never fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampPolicy {
    enabled: bool,
    format: String,
}

impl TimestampPolicy {
    pub fn new(enabled: bool, format: impl Into<String>) -> Result<Self> {
        let format = format.into();
        validate_time_format(&format)?;
        Ok(Self { enabled, format })
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    /// Render the current local time with this policy's format.
    pub fn now(&self) -> String {
        Local::now().format(&self.format).to_string()
    }
}

impl Default for TimestampPolicy {
    fn default() -> Self {
        Self::disabled()
    }
}

/// Reject strftime strings chrono cannot render.
pub fn validate_time_format(format: &str) -> Result<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(Error::Config(format!("invalid timestamp format '{format}'")));
    }
    Ok(())
}

/// `<tag><[time] ><raw>`: the tag always comes first, then the optional
/// timestamp bracket, then the line as the process wrote it.
pub fn format_line(raw: &str, tag: Option<&str>, policy: &TimestampPolicy) -> String {
    let mut line = String::with_capacity(raw.len() + 32);
    if let Some(tag) = tag {
        line.push_str(tag);
    }
    if policy.enabled {
        line.push('[');
        line.push_str(&policy.now());
        line.push_str("] ");
    }
    line.push_str(raw);
    line
}

/// Prefix used for the `index`-th (0-based) command in split mode.
pub fn split_tag(index: usize) -> String {
    format!("[CMD{}] ", index + 1)
}
