//! Writers for parsed sessions.

mod delimited;
mod error;
mod summary;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub use delimited::{DATE_FORMAT, write_csv};
pub use error::{Error, Result};
pub use summary::{GraphSummary, StatisticSummary, Summary, write_json};

use crate::parser::ParseReport;

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(|source| Error::Create {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Writes the CSV export of `report` to the file at `path`.
///
/// # Errors
///
/// Returns [`Error::Create`] if the file cannot be created, or the write
/// error otherwise.
pub fn export_csv(report: &ParseReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_csv(&report.session, create(path)?)?;
    log::info!("wrote csv export to `{}`", path.display());
    Ok(())
}

/// Writes the JSON summary of `report` to the file at `path`.
///
/// # Errors
///
/// Same as [`export_csv`].
pub fn export_json(report: &ParseReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_json(report, create(path)?)?;
    log::info!("wrote json summary to `{}`", path.display());
    Ok(())
}
