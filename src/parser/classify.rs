//! Header classification.
//!
//! A line is a statistic header when its columns after the timestamp, joined
//! by single spaces, equal a configured header signature exactly.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::{IGNORE_GRAPH, OsConfig, StatConfig};

static INTERRUPT_COLUMN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^i[0-9]+/s$").expect("interrupt column regex is valid"));

/// Result of classifying the data columns of a line.
#[derive(Debug, Clone, Copy)]
pub enum Classification<'c> {
    /// A header whose rows are recognised and discarded.
    Ignore,
    /// The header of a configured statistic.
    Statistic(&'c StatConfig),
    /// Not a known header; the line is a data row.
    Unmatched,
}

/// Per-CPU interrupt tables (`CPU i000/s i001/s ...`) have one column per
/// interrupt line and cannot be described by a fixed signature.
fn is_interrupt_header(fields: &[&str]) -> bool {
    match fields {
        [first, rest @ ..] if *first == "CPU" => {
            rest.iter().any(|column| INTERRUPT_COLUMN.is_match(column))
        }
        _ => false,
    }
}

/// Classifies a line from its columns.
///
/// # Arguments
///
/// * `columns` - All columns of the line.
/// * `first_data_column` - Index of the first column after the timestamp.
/// * `os` - Statistics configured for the log's operating system.
pub fn classify<'c>(
    columns: &[&str],
    first_data_column: usize,
    os: &'c OsConfig,
) -> Classification<'c> {
    let fields = columns.get(first_data_column..).unwrap_or_default();
    if is_interrupt_header(fields) {
        return Classification::Ignore;
    }
    match os.stat_for_header(&fields.join(" ")) {
        Some(stat) if stat.graph == IGNORE_GRAPH => Classification::Ignore,
        Some(stat) => Classification::Statistic(stat),
        None => Classification::Unmatched,
    }
}
