//! The shared session: one sink set every runner publishes into, the
//! streaming and recording lifecycles, and the entry points for running
//! commands.
//!
//! Streaming and recording are two independent `Idle`/`Active` machines. The
//! active state is the `Some` of an `Option` holding the encoder handle or the
//! open recording, so a flag and its handle can never disagree.

pub mod encoder;
pub mod recording;
pub mod runner;
pub mod signal_handler;
pub mod streaming;


pub use recording::RecordingSummary;
pub use runner::{CommandRunner, ExitOutcome};

use chrono::Local;
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::{append_to_file, split_tag, ConsoleMode, SinkSet, TimestampPolicy};
use crate::subprocess::SubprocessManager;
use recording::ActiveRecording;
use streaming::{ActiveStream, CaptureFile};

struct Settings {
    config: Config,
    policy: TimestampPolicy,
}

pub struct Session {
    settings: RwLock<Settings>,
    sinks: Arc<SinkSet>,
    subprocess: SubprocessManager,
    streaming: Mutex<Option<ActiveStream>>,
    recording: Mutex<Option<ActiveRecording>>,
    command_line: String,
}

impl Session {
    /// Session backed by real child processes.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_subprocess(config, SubprocessManager::production())
    }

    /// Fails if the configured timestamp format is malformed.
    pub fn with_subprocess(config: Config, subprocess: SubprocessManager) -> Result<Self> {
        let policy = config.timestamp_policy()?;
        Ok(Self {
            settings: RwLock::new(Settings { config, policy }),
            sinks: Arc::new(SinkSet::new(ConsoleMode::Echo)),
            subprocess,
            streaming: Mutex::new(None),
            recording: Mutex::new(None),
            command_line: std::env::args().collect::<Vec<_>>().join(" "),
        })
    }

    pub fn with_console(mut self, console: ConsoleMode) -> Self {
        self.sinks = Arc::new(SinkSet::new(console));
        self
    }

    /// The command line written into recording headers.
    pub fn with_command_line(mut self, command_line: impl Into<String>) -> Self {
        self.command_line = command_line.into();
        self
    }

    pub fn config(&self) -> Config {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .config
            .clone()
    }

    pub fn timestamp_policy(&self) -> TimestampPolicy {
        self.settings
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .policy
            .clone()
    }

    /// Edit the configuration. The edit is discarded if `f` fails or leaves an
    /// invalid timestamp format behind.
    pub fn update_config<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Config) -> Result<()>,
    {
        let mut config = self.config();
        f(&mut config)?;
        self.replace_config(config)
    }

    /// Commands already running keep the timestamp policy they started with.
    pub fn replace_config(&self, config: Config) -> Result<()> {
        let policy = config.timestamp_policy()?;
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        *settings = Settings { config, policy };
        Ok(())
    }

    /// Everything published so far, across all commands.
    pub fn buffer(&self) -> String {
        self.sinks.snapshot()
    }

    pub async fn is_streaming(&self) -> bool {
        self.streaming.lock().await.is_some()
    }

    pub async fn is_recording(&self) -> bool {
        self.recording.lock().await.is_some()
    }

    fn command_runner(&self) -> CommandRunner {
        CommandRunner::new(
            self.subprocess.runner(),
            Arc::clone(&self.sinks),
            self.timestamp_policy(),
        )
    }

    /// Run one command to completion.
    pub async fn run_one(&self, argv: &[String]) -> Result<ExitOutcome> {
        self.command_runner().run(argv, None).await
    }

    /// Run every command concurrently, each tagged `[CMD<n>] ` by position.
    ///
    /// Outcomes come back in input order. A command that fails, or never
    /// starts, does not affect the others.
    pub async fn run_split(&self, commands: &[Vec<String>]) -> Result<Vec<ExitOutcome>> {
        if commands.is_empty() {
            return Err(Error::NoCommands);
        }

        let runner = self.command_runner();
        let runs = commands.iter().enumerate().map(|(index, argv)| {
            let runner = &runner;
            async move {
                let tag = split_tag(index);
                let outcome = match runner.run(argv, Some(&tag)).await {
                    Ok(outcome) => outcome,
                    Err(e) => ExitOutcome::SpawnFailed {
                        reason: e.to_string(),
                    },
                };
                info!("{}{}", tag, outcome);
                outcome
            }
        });

        Ok(futures::future::join_all(runs).await)
    }

    /// Flush the buffer into the capture file and start the encoder on it.
    ///
    /// Returns the capture file path. On failure nothing stays armed and a
    /// temporary capture file is removed again.
    pub async fn start_streaming(&self) -> Result<PathBuf> {
        let mut streaming = self.streaming.lock().await;
        if streaming.is_some() {
            return Err(Error::AlreadyStreaming);
        }

        let config = self.config();
        let destination = config
            .destination()
            .ok_or(Error::MissingDestination)?
            .to_string();

        let capture = match &config.output_file {
            Some(path) => CaptureFile::External(path.clone()),
            None => CaptureFile::create_temporary()?,
        };

        if let Err(e) = self.sinks.flush_into_capture(capture.path()) {
            discard_capture(capture);
            return Err(e);
        }

        let command = encoder::encoder_command(&config, capture.path(), &destination);
        match self.subprocess.runner().spawn_background(command).await {
            Ok(encoder) => {
                let path = capture.path().to_path_buf();
                info!(
                    "Streaming to {} (encoder pid {:?}, capture {})",
                    destination,
                    encoder.id(),
                    path.display()
                );
                *streaming = Some(ActiveStream { encoder, capture });
                Ok(path)
            }
            Err(e) => {
                self.sinks.disarm_capture().await;
                discard_capture(capture);
                Err(e.into())
            }
        }
    }

    /// Kill the encoder and return to idle. A session-created capture file is
    /// deleted; a configured one is left in place.
    pub async fn stop_streaming(&self) -> Result<()> {
        let mut streaming = self.streaming.lock().await;
        let Some(mut active) = streaming.take() else {
            return Err(Error::NotStreaming);
        };

        self.sinks.disarm_capture().await;
        let terminated = active.encoder.terminate().await;
        discard_capture(active.capture);

        info!("Streaming stopped");
        terminated.map_err(Error::from)
    }

    /// Open a new recording file under the configured directory and write its
    /// header. Returns the recording path.
    pub async fn start_recording(&self) -> Result<PathBuf> {
        let mut recording = self.recording.lock().await;
        if recording.is_some() {
            return Err(Error::AlreadyRecording);
        }

        let config = self.config();
        let policy = self.timestamp_policy();
        tokio::fs::create_dir_all(&config.record_path).await?;

        let started_at = Local::now();
        let started = Instant::now();
        let path = recording::recording_file_path(&config.record_path, &started_at);
        let header = recording::recording_header(
            &started_at.format(policy.format()).to_string(),
            &self.command_line,
        );
        tokio::fs::write(&path, header).await?;

        self.sinks.arm_recording(&path);
        info!("Recording started: {}", path.display());
        *recording = Some(ActiveRecording {
            path: path.clone(),
            started,
        });
        Ok(path)
    }

    /// Append the footer with the elapsed time and return to idle.
    pub async fn stop_recording(&self) -> Result<RecordingSummary> {
        let mut recording = self.recording.lock().await;
        let Some(active) = recording.take() else {
            return Err(Error::NotRecording);
        };

        self.sinks.disarm_recording().await;
        let duration = active.started.elapsed();
        let ended_at = Local::now().format(self.timestamp_policy().format()).to_string();
        let footer = recording::recording_footer(&ended_at, duration);
        append_to_file(&active.path, &footer).await?;

        info!("Recording stopped: {}", active.path.display());
        Ok(RecordingSummary {
            path: active.path,
            duration,
        })
    }

    /// Stop whatever is active. Safe to call any number of times, from the
    /// normal exit path and from a signal handler; never fails.
    pub async fn cleanup(&self) {
        match self.stop_streaming().await {
            Ok(()) => {}
            Err(e) if e.is_state_conflict() => {}
            Err(e) => warn!("Failed to stop streaming during cleanup: {}", e),
        }
        match self.stop_recording().await {
            Ok(summary) => debug!("Closed recording {}", summary.path.display()),
            Err(e) if e.is_state_conflict() => {}
            Err(e) => warn!("Failed to stop recording during cleanup: {}", e),
        }
    }
}

fn discard_capture(capture: CaptureFile) {
    let path = capture.path().to_path_buf();
    if let Err(e) = capture.release() {
        warn!("Failed to remove capture file {}: {}", path.display(), e);
    }
}
