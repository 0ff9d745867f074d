use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessHandle, ProcessRunner, ProcessStream};

/// Scripted stand-in for real child processes.
///
/// Programs without an expectation behave like a missing binary.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    responses: HashMap<String, MockResponse>,
    call_history: Vec<ProcessCommand>,
    background: Vec<Arc<AtomicBool>>,
}

#[derive(Debug, Clone)]
struct MockResponse {
    stdout: Vec<String>,
    stderr: Vec<String>,
    status: ExitStatus,
    spawn_error: bool,
}

pub struct MockCommandConfig {
    runner: MockProcessRunner,
    program: String,
    response: MockResponse,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_command(&mut self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            program: program.to_string(),
            response: MockResponse {
                stdout: Vec::new(),
                stderr: Vec::new(),
                status: ExitStatus::Success,
                spawn_error: false,
            },
        }
    }

    pub fn verify_called(&self, program: &str, times: usize) -> bool {
        let state = self.state.lock().unwrap();
        let count = state
            .call_history
            .iter()
            .filter(|cmd| cmd.program == program)
            .count();
        count == times
    }

    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        self.state.lock().unwrap().call_history.clone()
    }

    /// Background processes spawned and not yet terminated.
    pub fn running_background(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .background
            .iter()
            .filter(|terminated| !terminated.load(Ordering::SeqCst))
            .count()
    }

    fn lookup(&self, command: &ProcessCommand) -> Result<MockResponse, ProcessError> {
        let mut state = self.state.lock().unwrap();
        state.call_history.push(command.clone());
        match state.responses.get(&command.program) {
            Some(response) if !response.spawn_error => Ok(response.clone()),
            Some(_) => Err(ProcessError::SpawnFailed {
                command: command.display(),
                source: std::io::Error::other("mock spawn failure"),
            }),
            None => Err(ProcessError::CommandNotFound(command.program.clone())),
        }
    }
}

impl MockCommandConfig {
    pub fn stdout_line(mut self, line: &str) -> Self {
        self.response.stdout.push(line.to_string());
        self
    }

    pub fn stderr_line(mut self, line: &str) -> Self {
        self.response.stderr.push(line.to_string());
        self
    }

    pub fn exit_code(mut self, code: i32) -> Self {
        self.response.status = if code == 0 {
            ExitStatus::Success
        } else {
            ExitStatus::Error(code)
        };
        self
    }

    pub fn fail_to_spawn(mut self) -> Self {
        self.response.spawn_error = true;
        self
    }

    pub fn finish(self) {
        let mut state = self.runner.state.lock().unwrap();
        state.responses.insert(self.program, self.response);
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run_streaming(&self, command: ProcessCommand) -> Result<ProcessStream, ProcessError> {
        let response = self.lookup(&command)?;
        let status = response.status.clone();
        Ok(ProcessStream {
            stdout: Box::pin(futures::stream::iter(response.stdout.into_iter().map(Ok))),
            stderr: Box::pin(futures::stream::iter(response.stderr.into_iter().map(Ok))),
            status: Box::pin(async move { Ok(status) }),
        })
    }

    async fn spawn_background(
        &self,
        command: ProcessCommand,
    ) -> Result<Box<dyn ProcessHandle>, ProcessError> {
        self.lookup(&command)?;
        let terminated = Arc::new(AtomicBool::new(false));
        self.state
            .lock()
            .unwrap()
            .background
            .push(Arc::clone(&terminated));
        Ok(Box::new(MockProcessHandle { terminated }))
    }
}

struct MockProcessHandle {
    terminated: Arc<AtomicBool>,
}

#[async_trait]
impl ProcessHandle for MockProcessHandle {
    fn id(&self) -> Option<u32> {
        if self.terminated.load(Ordering::SeqCst) {
            None
        } else {
            Some(4242)
        }
    }

    async fn terminate(&mut self) -> Result<(), ProcessError> {
        self.terminated.store(true, Ordering::SeqCst);
        Ok(())
    }
}
