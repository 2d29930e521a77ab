//! Semicolon separated export of every series of a session.

use std::io::Write;

use super::error::Result;
use crate::parser::ParseSession;

/// Format of the `Date` column.
pub const DATE_FORMAT: &str = "%d/%m/%y %H:%M:%S";

/// Writes one line per date sample of `session`.
///
/// Columns follow the order in which statistics were first seen, with the
/// graphs of a list in natural key order. Cells without a sample are empty.
///
/// # Errors
///
/// Returns an error if writing to `output` fails.
pub fn write_csv<W: Write>(session: &ParseSession, output: W) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_writer(output);

    let mut header = vec!["Date".to_owned()];
    for (_, sink) in session.registry().iter() {
        header.extend(sink.csv_header());
    }
    writer.write_record(&header)?;

    for instant in session.date_samples() {
        let mut record = Vec::with_capacity(header.len());
        record.push(instant.format(DATE_FORMAT).to_string());
        for (_, sink) in session.registry().iter() {
            record.extend(sink.csv_line(instant));
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
