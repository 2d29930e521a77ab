use crate::datetime;
use crate::series::RowError;

use super::banner::BannerField;

/// A banner line that does not have the fields of its dialect.
#[derive(Debug, thiserror::Error)]
pub enum BannerError {
    #[error("empty banner line")]
    Empty,
    #[error("missing `{field}` in banner line: `{line}`")]
    MissingField { field: BannerField, line: String },
}

/// Failures that end a parse before any session exists.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("input ended before a banner line")]
    MissingBanner,
    #[error("interrupted before a banner line")]
    Interrupted,
    #[error("failed to read banner line: {0}")]
    Read(#[source] std::io::Error),
    #[error("no parser for operating system `{token}` in banner line: `{line}`")]
    UnknownDialect { token: String, line: String },
    #[error("no configuration for operating system `{os}`")]
    MissingOsConfig { os: String },
    #[error(transparent)]
    Banner(#[from] BannerError),
    #[error("failed to resolve date of banner line `{line}`: {source}")]
    BannerDate {
        line: String,
        #[source]
        source: datetime::Error,
    },
}

/// Failures confined to a single line; parsing continues with the next one.
#[derive(Debug, thiserror::Error)]
pub enum LineError {
    #[error("unparsable time: {0}")]
    Time(#[source] datetime::Error),
    #[error("rejected row: {0}")]
    Row(#[from] RowError),
    #[error("invalid banner line: {0}")]
    Banner(#[from] BannerError),
    #[error("unparsable banner date: {0}")]
    BannerDate(#[source] datetime::Error),
}

pub type Result<T> = std::result::Result<T, LineError>;
