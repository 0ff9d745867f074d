//! Recording file layout: naming, header and footer.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const SEPARATOR_WIDTH: usize = 80;

/// An open recording. Present exactly while recording is active.
#[derive(Debug)]
pub(crate) struct ActiveRecording {
    pub path: PathBuf,
    pub started: Instant,
}

/// What `stop_recording` reports back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingSummary {
    pub path: PathBuf,
    pub duration: Duration,
}

/// `shellcast_<YYYY-MM-DD_HH-MM-SS>.txt` inside `dir`, with a numeric suffix
/// when a recording from the same second already exists.
pub fn recording_file_path(dir: &Path, at: &DateTime<Local>) -> PathBuf {
    let stem = format!("shellcast_{}", at.format("%Y-%m-%d_%H-%M-%S"));
    let mut path = dir.join(format!("{stem}.txt"));
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{stem}_{n}.txt"));
        n += 1;
    }
    path
}

pub fn recording_header(started_at: &str, command_line: &str) -> String {
    format!(
        "ShellCast Recording - Started at {}\nCommand: {}\n{}\n\n",
        started_at,
        command_line,
        "-".repeat(SEPARATOR_WIDTH)
    )
}

pub fn recording_footer(ended_at: &str, elapsed: Duration) -> String {
    format!(
        "\n\n{}\nRecording ended at {}\nDuration: {}\n",
        "-".repeat(SEPARATOR_WIDTH),
        ended_at,
        format_elapsed(elapsed)
    )
}

/// Whole seconds, leading zero units dropped: `0s`, `42s`, `2m0s`, `1h0m5s`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let total = (elapsed.as_millis() + 500) / 1000;
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);
    if hours > 0 {
        format!("{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m{seconds}s")
    } else {
        format!("{seconds}s")
    }
}
