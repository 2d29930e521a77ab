use std::path::PathBuf;
use std::process::ExitStatus;

/// Error that occurs when opening a file fails.
#[derive(Debug, thiserror::Error)]
#[error("failed to open file `{path}`: {source}")]
pub struct FileOpenError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] FileOpenError),
    #[error("failed to start command `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command `{command}` has no readable output")]
    MissingStdout { command: String },
    #[error("failed to wait for command `{command}`: {source}")]
    Wait {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("command `{command}` failed with {status}")]
    CommandFailed { command: String, status: ExitStatus },
}

pub type Result<T> = std::result::Result<T, Error>;
