//! Fan-out of formatted lines to the console, the session buffer and the
//! capture/recording files.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use crate::error::Result;

/// Which of the child's streams a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamSource {
    Stdout,
    Stderr,
}

/// Whether published lines are echoed to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConsoleMode {
    #[default]
    Echo,
    Silent,
}

#[derive(Debug, Default)]
struct SinkState {
    buffer: String,
    capture: Option<PathBuf>,
    recording: Option<PathBuf>,
}

/// The fixed set of sinks. File sinks are armed and disarmed by the session
/// while publishers are running; a line only reaches the files armed at the
/// moment it is published.
///
/// Publishers hold `appends` shared from their target snapshot until their
/// file writes are done. Disarming takes it exclusively, so once a disarm
/// returns no write to the old target is still in flight.
#[derive(Debug, Default)]
pub struct SinkSet {
    state: Mutex<SinkState>,
    appends: RwLock<()>,
    console: ConsoleMode,
}

impl SinkSet {
    pub fn new(console: ConsoleMode) -> Self {
        Self {
            state: Mutex::new(SinkState::default()),
            appends: RwLock::new(()),
            console,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish one formatted line to every active sink.
    ///
    /// The buffer append and the snapshot of armed files happen in one critical
    /// section; file appends run afterwards, each as its own open-append-close.
    /// Failures are logged and never stop delivery to the other sinks.
    pub async fn publish(&self, line: &str, source: StreamSource) {
        let _appending = self.appends.read().await;
        let (capture, recording) = {
            let mut state = self.lock();
            state.buffer.push_str(line);
            state.buffer.push('\n');
            (state.capture.clone(), state.recording.clone())
        };
        trace!("Published {:?} line ({} bytes)", source, line.len());

        self.write_console(line, source);

        let entry = format!("{line}\n");
        if let Some(path) = capture {
            match append_to_existing_file(&path, &entry).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!("Capture file {} is gone, dropping line", path.display())
                }
                Err(e) => warn!("Failed to append to capture file {}: {}", path.display(), e),
            }
        }
        if let Some(path) = recording {
            if let Err(e) = append_to_file(&path, &entry).await {
                warn!("Failed to append to recording {}: {}", path.display(), e);
            }
        }
    }

    fn write_console(&self, line: &str, source: StreamSource) {
        if self.console == ConsoleMode::Silent {
            return;
        }
        let result = match source {
            StreamSource::Stdout => writeln!(std::io::stdout().lock(), "{line}"),
            StreamSource::Stderr => writeln!(std::io::stderr().lock(), "{line}"),
        };
        if let Err(e) = result {
            warn!("Failed to write {:?} line to console: {}", source, e);
        }
    }

    /// Copy of everything published so far.
    pub fn snapshot(&self) -> String {
        self.lock().buffer.clone()
    }

    /// Write the whole buffer into `path` (truncating it) and start appending
    /// new lines there. Both happen under the buffer lock, so every line ends
    /// up in the file exactly once.
    pub fn flush_into_capture(&self, path: &Path) -> Result<()> {
        let mut state = self.lock();
        std::fs::write(path, state.buffer.as_bytes())?;
        state.capture = Some(path.to_path_buf());
        Ok(())
    }

    /// Stop appending to the capture file, waiting for appends already under way.
    pub async fn disarm_capture(&self) -> Option<PathBuf> {
        let _exclusive = self.appends.write().await;
        self.lock().capture.take()
    }

    pub fn arm_recording(&self, path: &Path) {
        self.lock().recording = Some(path.to_path_buf());
    }

    /// Stop appending to the recording, waiting for appends already under way.
    pub async fn disarm_recording(&self) -> Option<PathBuf> {
        let _exclusive = self.appends.write().await;
        self.lock().recording.take()
    }

    pub fn capture_target(&self) -> Option<PathBuf> {
        self.lock().capture.clone()
    }

    pub fn recording_target(&self) -> Option<PathBuf> {
        self.lock().recording.clone()
    }
}

/// Append `text` to `path` with a single open-append-close cycle.
pub async fn append_to_file(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}

/// Like [`append_to_file`], but never creates `path`; a missing file is a
/// `NotFound` error.
pub async fn append_to_existing_file(path: &Path, text: &str) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new().append(true).open(path).await?;
    file.write_all(text.as_bytes()).await?;
    file.flush().await
}
