#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("date `{token}` matches none of the known date formats")]
    UnknownDateFormat { token: String },
    #[error("date `{token}` does not match format `{format}`: {source}")]
    Date {
        token: String,
        format: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("time `{token}` does not match format `{format}`: {source}")]
    Time {
        token: String,
        format: &'static str,
        #[source]
        source: chrono::ParseError,
    },
    #[error("expected {expected} time column(s), found {found}")]
    MissingTimeColumn { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
