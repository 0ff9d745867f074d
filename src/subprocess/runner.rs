use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;
use std::process::Stdio;

use super::error::ProcessError;

/// A fixed argument vector. Never passed through a shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ProcessCommand {
    /// Build a command from `argv[0]` and the remaining arguments.
    ///
    /// Returns `None` for an empty vector.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.program.clone()
        } else {
            format!("{} {}", self.program, self.args.join(" "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        matches!(self, ExitStatus::Success)
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

pub type ProcessStreamItem = Result<String, ProcessError>;
pub type ProcessStreamFut = Pin<Box<dyn Stream<Item = ProcessStreamItem> + Send>>;
pub type ExitStatusFut =
    Pin<Box<dyn futures::Future<Output = Result<ExitStatus, ProcessError>> + Send>>;

/// A running child split into its two line streams and its exit status.
///
/// The streams are independent: draining one never waits on the other.
pub struct ProcessStream {
    pub stdout: ProcessStreamFut,
    pub stderr: ProcessStreamFut,
    pub status: ExitStatusFut,
}

/// Ownership of a long-running child that can be forcibly stopped.
#[async_trait]
pub trait ProcessHandle: Send {
    fn id(&self) -> Option<u32>;

    /// Kill the child and reap it. A child that already exited is not an error.
    async fn terminate(&mut self) -> Result<(), ProcessError>;
}

#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run_streaming(&self, command: ProcessCommand) -> Result<ProcessStream, ProcessError>;

    async fn spawn_background(
        &self,
        command: ProcessCommand,
    ) -> Result<Box<dyn ProcessHandle>, ProcessError>;
}

pub struct TokioProcessRunner;

impl TokioProcessRunner {
    /// Strip the line terminator and decode, replacing invalid UTF-8.
    fn normalize_line(mut line: Vec<u8>) -> String {
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        match String::from_utf8(line) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }

    /// Create a line stream from a buffered reader.
    ///
    /// Reads up to each `\n` with no length cap, so arbitrarily long lines are
    /// delivered whole.
    fn create_line_stream<R>(reader: tokio::io::BufReader<R>) -> ProcessStreamFut
    where
        R: tokio::io::AsyncRead + Send + Unpin + 'static,
    {
        use tokio::io::AsyncBufReadExt;

        Box::pin(futures::stream::unfold(reader, |mut reader| async move {
            let mut line = Vec::new();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => None, // EOF
                Ok(_) => Some((Ok(Self::normalize_line(line)), reader)),
                Err(e) => Some((Err(ProcessError::Io(e)), reader)),
            }
        })) as ProcessStreamFut
    }

    /// Convert process exit status to our ExitStatus enum
    fn parse_exit_status(status: std::process::ExitStatus) -> ExitStatus {
        if status.success() {
            ExitStatus::Success
        } else if let Some(code) = status.code() {
            ExitStatus::Error(code)
        } else {
            Self::parse_signal_status(status)
        }
    }

    #[cfg(unix)]
    fn parse_signal_status(status: std::process::ExitStatus) -> ExitStatus {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            ExitStatus::Signal(signal)
        } else {
            ExitStatus::Error(1)
        }
    }

    #[cfg(not(unix))]
    fn parse_signal_status(_status: std::process::ExitStatus) -> ExitStatus {
        ExitStatus::Error(1)
    }

    fn map_spawn_error(error: std::io::Error, command: &ProcessCommand) -> ProcessError {
        tracing::error!(
            "Failed to spawn '{}': {:?} (kind: {:?})",
            command.program,
            error,
            error.kind()
        );
        if error.kind() == std::io::ErrorKind::NotFound {
            ProcessError::CommandNotFound(command.program.clone())
        } else {
            ProcessError::SpawnFailed {
                command: command.display(),
                source: error,
            }
        }
    }

    /// Extract a stream from a child process, converting None to error
    fn extract_stream<T>(stream: Option<T>, stream_name: &str) -> Result<T, ProcessError> {
        stream.ok_or_else(|| ProcessError::InternalError {
            message: format!("Failed to capture {}", stream_name),
        })
    }

    fn create_status_future(mut child: tokio::process::Child, program: String) -> ExitStatusFut {
        Box::pin(async move {
            let status = child.wait().await.map_err(|e| {
                tracing::warn!("Failed to wait for '{}': {}", program, e);
                ProcessError::Io(e)
            })?;
            Ok(Self::parse_exit_status(status))
        })
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run_streaming(&self, command: ProcessCommand) -> Result<ProcessStream, ProcessError> {
        use tokio::io::BufReader;

        tracing::debug!("Executing subprocess: {}", command.display());

        let mut child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, &command))?;

        let stdout = Self::extract_stream(child.stdout.take(), "stdout")?;
        let stderr = Self::extract_stream(child.stderr.take(), "stderr")?;

        Ok(ProcessStream {
            stdout: Self::create_line_stream(BufReader::new(stdout)),
            stderr: Self::create_line_stream(BufReader::new(stderr)),
            status: Self::create_status_future(child, command.program),
        })
    }

    async fn spawn_background(
        &self,
        command: ProcessCommand,
    ) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        tracing::debug!("Spawning background process: {}", command.display());

        let child = tokio::process::Command::new(&command.program)
            .args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| Self::map_spawn_error(e, &command))?;

        Ok(Box::new(TokioProcessHandle {
            child,
            program: command.program,
        }))
    }
}

struct TokioProcessHandle {
    child: tokio::process::Child,
    program: String,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn terminate(&mut self) -> Result<(), ProcessError> {
        if let Some(status) = self.child.try_wait()? {
            tracing::debug!("'{}' already exited with {}", self.program, status);
            return Ok(());
        }
        self.child.kill().await?;
        tracing::debug!("Terminated '{}'", self.program);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use std::io::Cursor;

    fn stream_from(bytes: Vec<u8>) -> ProcessStreamFut {
        TokioProcessRunner::create_line_stream(tokio::io::BufReader::new(Cursor::new(bytes)))
    }

    #[test]
    fn test_from_argv() {
        let argv = vec!["ls".to_string(), "-la".to_string(), "my dir".to_string()];
        let command = ProcessCommand::from_argv(&argv).unwrap();
        assert_eq!(command.program, "ls");
        assert_eq!(command.args, vec!["-la", "my dir"]);
        assert!(ProcessCommand::from_argv(&[]).is_none());
    }

    #[test]
    fn test_extract_stream_with_none() {
        let value: Option<i32> = None;
        let result = TokioProcessRunner::extract_stream(value, "test_stream");
        match result.unwrap_err() {
            ProcessError::InternalError { message } => {
                assert_eq!(message, "Failed to capture test_stream");
            }
            _ => panic!("Expected InternalError"),
        }
    }

    #[test]
    fn test_normalize_line() {
        assert_eq!(TokioProcessRunner::normalize_line(b"test\n".to_vec()), "test");
        assert_eq!(TokioProcessRunner::normalize_line(b"test\r\n".to_vec()), "test");
        assert_eq!(TokioProcessRunner::normalize_line(b"test".to_vec()), "test");
        assert_eq!(TokioProcessRunner::normalize_line(Vec::new()), "");
        assert_eq!(
            TokioProcessRunner::normalize_line(vec![b'a', 0xff, b'b', b'\n']),
            "a\u{fffd}b"
        );
    }

    #[tokio::test]
    async fn test_line_stream_keeps_unterminated_tail() {
        let lines: Vec<String> = stream_from(b"one\ntwo\nthree".to_vec())
            .map(|line| line.unwrap())
            .collect()
            .await;
        assert_eq!(lines, vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn test_line_stream_does_not_truncate_long_lines() {
        let long = "x".repeat(256 * 1024);
        let input = format!("{long}\nshort\n").into_bytes();
        let lines: Vec<String> = stream_from(input).map(|line| line.unwrap()).collect().await;
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), long.len());
        assert_eq!(lines[1], "short");
    }

    #[test]
    fn test_parse_exit_status() {
        use std::os::unix::process::ExitStatusExt;

        let status = std::process::ExitStatus::from_raw(0);
        assert_eq!(TokioProcessRunner::parse_exit_status(status), ExitStatus::Success);

        let status = std::process::ExitStatus::from_raw(256); // Exit code 1
        assert_eq!(TokioProcessRunner::parse_exit_status(status), ExitStatus::Error(1));

        let status = std::process::ExitStatus::from_raw(9); // SIGKILL
        assert_eq!(TokioProcessRunner::parse_exit_status(status), ExitStatus::Signal(9));
    }

    #[tokio::test]
    async fn test_run_streaming_nonexistent() {
        let command = ProcessCommand {
            program: "nonexistent_command_12345".to_string(),
            args: vec![],
        };
        match TokioProcessRunner.run_streaming(command).await {
            Err(ProcessError::CommandNotFound(program)) => {
                assert_eq!(program, "nonexistent_command_12345");
            }
            Err(other) => panic!("Expected CommandNotFound, got {other}"),
            Ok(_) => panic!("Expected spawn failure"),
        }
    }

    #[tokio::test]
    async fn test_background_terminate() {
        let command = ProcessCommand {
            program: "sleep".to_string(),
            args: vec!["30".to_string()],
        };
        let mut handle = TokioProcessRunner.spawn_background(command).await.unwrap();
        assert!(handle.id().is_some());
        handle.terminate().await.unwrap();
        // Terminating an already reaped child stays quiet.
        handle.terminate().await.unwrap();
    }
}
