use thiserror::Error;

use crate::subprocess::ProcessError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    #[error("Empty command")]
    EmptyCommand,

    #[error("No commands provided for split mode")]
    NoCommands,

    #[error("Already streaming")]
    AlreadyStreaming,

    #[error("Not streaming")]
    NotStreaming,

    #[error("Already recording")]
    AlreadyRecording,

    #[error("Not recording")]
    NotRecording,

    #[error("Theme '{0}' not found")]
    ThemeNotFound(String),

    #[error("No streaming destination configured (set an RTMP URL)")]
    MissingDestination,
}

impl Error {
    /// True for the start/stop conflicts that leave the session untouched.
    pub fn is_state_conflict(&self) -> bool {
        matches!(
            self,
            Error::AlreadyStreaming
                | Error::NotStreaming
                | Error::AlreadyRecording
                | Error::NotRecording
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
