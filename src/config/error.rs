use crate::input;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    FileOpen(#[from] input::FileOpenError),
    #[error("failed to decode configuration `{origin}`: {source}")]
    Decode {
        origin: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("header `{header}` is claimed by both `{first}` and `{second}` in os `{os}`")]
    DuplicateHeader {
        os: String,
        header: String,
        first: String,
        second: String,
    },
    #[error("statistic `{stat}` in os `{os}` has an empty header")]
    EmptyHeader { os: String, stat: String },
    #[error("invalid colour `{value}`: expected `r,g,b` with components in 0..=255")]
    InvalidColor { value: String },
    #[error("invalid range `{value:?}`: minimum is greater than maximum")]
    InvalidRange { value: (f64, f64) },
}

pub type Result<T> = std::result::Result<T, Error>;
