//! Line-oriented parser for sar logs.
//!
//! The first non-blank line of a log is its banner. It selects a [`Dialect`]
//! and starts a [`SarParser`]; every following line goes through
//! [`SarParser::parse_line`], which keeps track of the active statistic and
//! feeds data rows into the session's series registry. [`parse_reader`]
//! drives this over any [`std::io::BufRead`].

mod banner;
mod classify;
mod dialect;
mod error;
mod reader;
mod session;

use crate::series::StatisticId;

pub use banner::{Banner, BannerField, HostInfo, parse_banner};
pub use classify::{Classification, classify};
pub use dialect::{Control, Dialect};
pub use error::{BannerError, LineError, Result, SessionError};
pub use reader::{LineStats, ParseReport, StopReason, parse_reader};
pub use session::{ParseSession, SarParser};

/// What a single line did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Blank,
    /// A banner repeated mid-stream; the session date moved.
    Banner,
    /// A restart, summary or average marker.
    Control,
    /// A statistic header. `created` is `true` when its sink did not exist.
    Header {
        statistic: StatisticId,
        created: bool,
    },
    /// A header or row of an ignored table.
    Ignored,
    /// A data row stored in its sink.
    Recorded,
    /// A data row of an averaged block.
    Suppressed,
    Dropped(DropReason),
}

/// Why a data row was not stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No header has been seen since the last reset.
    NoActiveStatistic,
    /// The active statistic has no configured graph.
    NoGraph,
}
