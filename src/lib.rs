//! sargraph: parses the text output of `sar` (Linux, SunOS, HP-UX and AIX)
//! into time series, one graph per statistic and device.
//!
//! The parser is synchronous and single threaded. [`parser::parse_reader`]
//! turns any buffered reader into a [`parser::ParseSession`] whose series
//! registry can be inspected or exported with [`export`].

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use error::ResultOkLogExt;

pub mod cli;
pub mod config;
pub mod datetime;
pub mod error;
pub mod export;
pub mod input;
pub mod parser;
pub mod series;

/// Runs the sargraph binary.
///
/// Loads the configuration, reads the log from the selected source on a
/// blocking thread and writes the requested exports. Without `--csv` or
/// `--json` the JSON summary is printed to standard output. Ctrl-C stops
/// the read after the current line; what was parsed so far is still
/// exported.
///
/// # Errors
///
/// Possible errors include:
/// - An unreadable or inconsistent configuration file.
/// - A source that cannot be opened.
/// - A log without a valid banner line.
pub async fn run(args: cli::Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => config::Config::from_path(path).map_err(error::Error::from)?,
        None => config::Config::builtin().map_err(error::Error::from)?,
    };
    let config = match args.date_format {
        Some(format) => config.with_linux_date_format(format),
        None => config,
    };
    log::debug!("Linux date format: {}", config.linux_date_format());

    let interrupt = Arc::new(AtomicBool::new(false));
    {
        let interrupt = Arc::clone(&interrupt);
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    log::info!("received Ctrl-C, stopping after the current line");
                    interrupt.store(true, Ordering::Relaxed);
                }
                Err(err) => log::error!("failed to listen for Ctrl-C: {err}"),
            }
        });
    }

    let source = args.source.source();
    log::info!("reading {source}");
    let report = tokio::task::spawn_blocking(move || -> error::Result<parser::ParseReport> {
        let mut input = source.open()?;
        let before = std::time::Instant::now();
        let result = parser::parse_reader(&config, input.reader(), &interrupt);
        log::debug!("parse took {} ms", before.elapsed().as_millis());
        let stopped_early = !matches!(&result, Ok(report) if report.is_complete());
        input.finish(stopped_early).ok_log();
        Ok(result?)
    })
    .await
    .map_err(error::Error::from)??;

    let session = &report.session;
    log::info!(
        "{} log of `{}` ({}): {} statistics, {} samples, {} lines rejected",
        session.dialect(),
        session.host().hostname,
        session.date_label(),
        session.registry().len(),
        session.date_samples().len(),
        report.stats.rejected
    );
    if !report.is_complete() {
        log::warn!("log was not read to the end ({:?})", report.stop);
    }

    if let Some(path) = &args.csv {
        export::export_csv(&report, path).ok_log();
    }
    if let Some(path) = &args.json {
        export::export_json(&report, path).ok_log();
    }
    if args.csv.is_none() && args.json.is_none() {
        export::write_json(&report, std::io::stdout().lock()).map_err(error::Error::from)?;
    }
    Ok(())
}
