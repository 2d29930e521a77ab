//! Read loop over a line source.

use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};

use super::error::{LineError, SessionError};
use super::session::{ParseSession, SarParser};
use super::{DropReason, LineOutcome};
use crate::config::Config;

/// Why the read loop ended.
#[derive(Debug)]
pub enum StopReason {
    EndOfStream,
    /// The interrupt flag was set between two lines.
    Interrupted,
    /// The source failed; lines read before the failure are kept.
    ReadError(io::Error),
}

/// Line counts of a parse, by outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LineStats {
    /// Lines read, banner included.
    pub lines: usize,
    pub blank: usize,
    pub control: usize,
    pub headers: usize,
    pub recorded: usize,
    /// Rows of ignored tables and averaged blocks.
    pub skipped: usize,
    pub dropped: usize,
    /// Lines that failed with a [`LineError`].
    pub rejected: usize,
}

impl LineStats {
    fn count(&mut self, outcome: &Result<LineOutcome, LineError>) {
        match outcome {
            Ok(LineOutcome::Blank) => self.blank += 1,
            Ok(LineOutcome::Banner | LineOutcome::Control) => self.control += 1,
            Ok(LineOutcome::Header { .. }) => self.headers += 1,
            Ok(LineOutcome::Recorded) => self.recorded += 1,
            Ok(LineOutcome::Ignored | LineOutcome::Suppressed) => self.skipped += 1,
            Ok(LineOutcome::Dropped(DropReason::NoActiveStatistic | DropReason::NoGraph)) => {
                self.dropped += 1
            }
            Err(_) => self.rejected += 1,
        }
    }
}

/// Result of reading one log.
#[derive(Debug)]
pub struct ParseReport {
    pub session: ParseSession,
    pub stop: StopReason,
    pub stats: LineStats,
}

impl ParseReport {
    /// `true` if the whole source was read.
    pub fn is_complete(&self) -> bool {
        matches!(self.stop, StopReason::EndOfStream)
    }
}

/// Reads the next line without its terminator. Invalid UTF-8 is replaced
/// rather than rejected.
fn next_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    let line = String::from_utf8_lossy(buf);
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_owned()))
}

/// Parses a whole log from `reader`.
///
/// `interrupt` is checked before each line; once set, the loop stops and
/// returns what was parsed so far. Line errors are logged and counted, never
/// returned.
///
/// # Arguments
///
/// * `config` - Statistic and column configuration.
/// * `reader` - The log.
/// * `interrupt` - Cooperative cancellation flag.
///
/// # Errors
///
/// Returns a [`SessionError`] if no session could be started: the source
/// ends, fails or is interrupted before its banner, or the banner is invalid.
pub fn parse_reader<R: BufRead>(
    config: &Config,
    mut reader: R,
    interrupt: &AtomicBool,
) -> Result<ParseReport, SessionError> {
    let mut buf = Vec::new();
    let mut stats = LineStats::default();

    let mut parser = loop {
        if interrupt.load(Ordering::Relaxed) {
            return Err(SessionError::Interrupted);
        }
        let line = next_line(&mut reader, &mut buf)
            .map_err(SessionError::Read)?
            .ok_or(SessionError::MissingBanner)?;
        stats.lines += 1;
        if line.trim().is_empty() {
            stats.blank += 1;
            continue;
        }
        break SarParser::from_banner(config, &line)?;
    };

    let stop = loop {
        if interrupt.load(Ordering::Relaxed) {
            log::info!("parse interrupted after {} lines", stats.lines);
            break StopReason::Interrupted;
        }
        let line = match next_line(&mut reader, &mut buf) {
            Ok(Some(line)) => line,
            Ok(None) => break StopReason::EndOfStream,
            Err(err) => {
                log::error!("read failed after {} lines: {err}", stats.lines);
                break StopReason::ReadError(err);
            }
        };
        stats.lines += 1;
        let outcome = parser.parse_line(&line);
        if let Err(err) = &outcome {
            log::debug!("line {}: {err}: `{line}`", stats.lines);
        }
        stats.count(&outcome);
    };

    log::debug!("parse stopped ({stop:?}): {stats:?}");
    Ok(ParseReport {
        session: parser.into_session(),
        stop,
        stats,
    })
}
