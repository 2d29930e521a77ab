use std::num::ParseFloatError;

/// Reasons a data row is rejected by a graph.
///
/// A rejected row leaves every series untouched.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    #[error("`{title}` expects {expected} values, found {found}")]
    ColumnCount {
        title: String,
        expected: usize,
        found: usize,
    },
    #[error("`{title}` column `{column}` has non-numeric value `{value}`: {source}")]
    NotNumeric {
        title: String,
        column: String,
        value: String,
        #[source]
        source: ParseFloatError,
    },
}

pub type Result<T> = std::result::Result<T, RowError>;
