//! One child's spawn-drain-wait lifecycle.

use futures::StreamExt;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::output::{format_line, SinkSet, StreamSource, TimestampPolicy};
use crate::subprocess::runner::ProcessStreamFut;
use crate::subprocess::{ExitStatus, ProcessCommand, ProcessRunner};

/// How a command ended. A non-zero exit is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Success,
    Failed { code: i32 },
    Signaled { signal: i32 },
    SpawnFailed { reason: String },
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        matches!(self, ExitOutcome::Success)
    }

    /// Shell-style status: the child's code, 128+signal, or 127 when the
    /// command never started.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Failed { code } => *code,
            ExitOutcome::Signaled { signal } => 128 + signal,
            ExitOutcome::SpawnFailed { .. } => 127,
        }
    }
}

impl From<ExitStatus> for ExitOutcome {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitOutcome::Success,
            ExitStatus::Error(code) => ExitOutcome::Failed { code },
            ExitStatus::Signal(signal) => ExitOutcome::Signaled { signal },
        }
    }
}

impl fmt::Display for ExitOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitOutcome::Success => write!(f, "completed successfully"),
            ExitOutcome::Failed { code } => write!(f, "exited with code {code}"),
            ExitOutcome::Signaled { signal } => write!(f, "terminated by signal {signal}"),
            ExitOutcome::SpawnFailed { reason } => write!(f, "failed to start: {reason}"),
        }
    }
}

/// Runs a command and pushes every line it prints through the formatter and
/// into the shared sink set.
#[derive(Clone)]
pub struct CommandRunner {
    runner: Arc<dyn ProcessRunner>,
    sinks: Arc<SinkSet>,
    policy: TimestampPolicy,
}

impl CommandRunner {
    pub fn new(runner: Arc<dyn ProcessRunner>, sinks: Arc<SinkSet>, policy: TimestampPolicy) -> Self {
        Self {
            runner,
            sinks,
            policy,
        }
    }

    /// Spawn `argv`, drain stdout and stderr concurrently, then wait for exit.
    ///
    /// An empty `argv` is rejected before anything is spawned. A spawn failure
    /// is reported as [`ExitOutcome::SpawnFailed`].
    pub async fn run(&self, argv: &[String], tag: Option<&str>) -> Result<ExitOutcome> {
        let command = ProcessCommand::from_argv(argv).ok_or(Error::EmptyCommand)?;
        let command_line = command.display();

        let stream = match self.runner.run_streaming(command).await {
            Ok(stream) => stream,
            Err(e) => {
                warn!("{}could not start '{}': {}", tag.unwrap_or(""), command_line, e);
                return Ok(ExitOutcome::SpawnFailed {
                    reason: e.to_string(),
                });
            }
        };

        let tag = tag.map(str::to_string);
        let stdout_handle = tokio::spawn(drain(
            stream.stdout,
            StreamSource::Stdout,
            tag.clone(),
            self.policy.clone(),
            Arc::clone(&self.sinks),
        ));
        let stderr_handle = tokio::spawn(drain(
            stream.stderr,
            StreamSource::Stderr,
            tag,
            self.policy.clone(),
            Arc::clone(&self.sinks),
        ));

        let (stdout_lines, stderr_lines) = tokio::join!(stdout_handle, stderr_handle);
        for (source, joined) in [
            (StreamSource::Stdout, stdout_lines),
            (StreamSource::Stderr, stderr_lines),
        ] {
            match joined {
                Ok(count) => {
                    debug!("'{}' {:?} drained after {} lines", command_line, source, count)
                }
                Err(e) => warn!("'{}' {:?} drain task failed: {}", command_line, source, e),
            }
        }

        let status = stream.status.await?;
        let outcome = ExitOutcome::from(status);
        debug!("'{}' {}", command_line, outcome);
        Ok(outcome)
    }
}

/// Publish every line of one stream, in order, until it is exhausted.
async fn drain(
    mut lines: ProcessStreamFut,
    source: StreamSource,
    tag: Option<String>,
    policy: TimestampPolicy,
    sinks: Arc<SinkSet>,
) -> usize {
    let mut count = 0;
    while let Some(item) = lines.next().await {
        match item {
            Ok(raw) => {
                let formatted = format_line(&raw, tag.as_deref(), &policy);
                sinks.publish(&formatted, source).await;
                count += 1;
            }
            Err(e) => {
                warn!("Stopped reading {:?}: {}", source, e);
                break;
            }
        }
    }
    count
}
