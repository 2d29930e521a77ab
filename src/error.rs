use crate::{config, export, input, parser};

/// Failures of a complete run of the binary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::Error),
    #[error(transparent)]
    Input(#[from] input::Error),
    #[error("failed to parse log: {0}")]
    Session(#[from] parser::SessionError),
    #[error(transparent)]
    Export(#[from] export::Error),
    #[error("parse task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub trait ResultOkLogExt<T, E> {
    fn ok_log(self) -> Option<T>;
}

impl<T, E> ResultOkLogExt<T, E> for std::result::Result<T, E>
where
    E: std::error::Error,
{
    fn ok_log(self) -> Option<T> {
        match self {
            Ok(ok) => Some(ok),
            Err(err) => {
                log::error!("{err}");
                None
            }
        }
    }
}
