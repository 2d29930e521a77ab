use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create `{path}`: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to flush output: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
