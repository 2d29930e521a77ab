//! Per-log parse state.
//!
//! A [`SarParser`] exists only once a banner line has been read; before that
//! there is nothing to attach lines to. It owns the [`ParseSession`] being
//! built and the line-to-line state of the dialect: the active statistic,
//! the clock, the current date and the averaged-block flag.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use super::banner::{self, HostInfo};
use super::classify::{self, Classification};
use super::dialect::{Control, Dialect};
use super::error::{LineError, Result, SessionError};
use super::{DropReason, LineOutcome};
use crate::config::{Config, OsConfig, StatConfig};
use crate::datetime::{self, Clock, DateFormat, LinuxFormat};
use crate::series::{SeriesRegistry, SeriesSink, StatisticId};

/// Everything learned from one log.
#[derive(Debug, Clone)]
pub struct ParseSession {
    dialect: Dialect,
    host: HostInfo,
    sar_start_date: NaiveDate,
    sar_end_date: NaiveDate,
    start_of_graph: Option<NaiveDateTime>,
    end_of_graph: Option<NaiveDateTime>,
    date_samples: BTreeSet<NaiveDateTime>,
    registry: SeriesRegistry,
}

impl ParseSession {
    fn new(dialect: Dialect, host: HostInfo, date: NaiveDate) -> Self {
        Self {
            dialect,
            host,
            sar_start_date: date,
            sar_end_date: date,
            start_of_graph: None,
            end_of_graph: None,
            date_samples: BTreeSet::new(),
            registry: SeriesRegistry::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn host(&self) -> &HostInfo {
        &self.host
    }

    /// Earliest banner date.
    pub fn sar_start_date(&self) -> NaiveDate {
        self.sar_start_date
    }

    /// Latest banner date.
    pub fn sar_end_date(&self) -> NaiveDate {
        self.sar_end_date
    }

    /// `"2016-03-28"` for a single day, `"2016-03-28 to 2016-03-29"` otherwise.
    pub fn date_label(&self) -> String {
        if self.sar_start_date == self.sar_end_date {
            self.sar_start_date.to_string()
        } else {
            format!("{} to {}", self.sar_start_date, self.sar_end_date)
        }
    }

    /// Earliest timestamp parsed from any line.
    pub fn start_of_graph(&self) -> Option<NaiveDateTime> {
        self.start_of_graph
    }

    /// Latest timestamp parsed from any line.
    pub fn end_of_graph(&self) -> Option<NaiveDateTime> {
        self.end_of_graph
    }

    /// Instants of all data rows handed to a sink, in order.
    pub fn date_samples(&self) -> &BTreeSet<NaiveDateTime> {
        &self.date_samples
    }

    pub fn registry(&self) -> &SeriesRegistry {
        &self.registry
    }

    pub fn sink(&self, id: &str) -> Option<&SeriesSink> {
        self.registry.get(&StatisticId::from(id))
    }

    fn observe_date(&mut self, date: NaiveDate) {
        self.sar_start_date = self.sar_start_date.min(date);
        self.sar_end_date = self.sar_end_date.max(date);
    }

    fn observe_instant(&mut self, instant: NaiveDateTime) {
        self.start_of_graph = Some(self.start_of_graph.map_or(instant, |s| s.min(instant)));
        self.end_of_graph = Some(self.end_of_graph.map_or(instant, |e| e.max(instant)));
    }
}

/// Statistic that data rows currently belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum CurrentStat {
    None,
    Ignore,
    Statistic(StatisticId),
}

impl fmt::Display for CurrentStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentStat::None => f.write_str("NONE"),
            CurrentStat::Ignore => f.write_str("IGNORE"),
            CurrentStat::Statistic(id) => write!(f, "{id}"),
        }
    }
}

/// Line parser for one log, created from its banner line.
#[derive(Debug)]
pub struct SarParser<'c> {
    config: &'c Config,
    os: &'c OsConfig,
    session: ParseSession,
    date_format: DateFormat,
    /// `None` until detected from the first timestamped line.
    clock: Option<Clock>,
    date: NaiveDate,
    current: CurrentStat,
    last: Option<CurrentStat>,
    under_average: bool,
    previous_instant: Option<NaiveDateTime>,
}

impl<'c> SarParser<'c> {
    /// Starts a session from the banner line of a log.
    ///
    /// # Errors
    ///
    /// Any failure here is fatal for the log: an unknown operating system, an
    /// operating system without configuration, a malformed banner or an
    /// unparsable banner date.
    pub fn from_banner(config: &'c Config, line: &str) -> std::result::Result<Self, SessionError> {
        let token = line.split_whitespace().next().unwrap_or_default();
        let dialect =
            Dialect::from_banner_token(token).ok_or_else(|| SessionError::UnknownDialect {
                token: token.to_owned(),
                line: line.to_owned(),
            })?;
        let os = config
            .os(dialect.name())
            .ok_or_else(|| SessionError::MissingOsConfig {
                os: dialect.name().to_owned(),
            })?;
        let banner = banner::parse_banner(dialect, line)?;

        let (date_format, clock) = match dialect.banner_date_pattern() {
            Some(pattern) => (
                DateFormat::from_pattern(pattern),
                Some(Clock::TwentyFourHour),
            ),
            None => {
                let format = LinuxFormat::parse(config.linux_date_format());
                (format.date, format.clock)
            }
        };
        let date = datetime::resolve_date(&banner.date, &date_format).map_err(|source| {
            SessionError::BannerDate {
                line: line.to_owned(),
                source,
            }
        })?;
        log::debug!(
            "{dialect} log of `{}` dated {date} ({date_format:?}, clock {clock:?})",
            banner.host.hostname
        );

        Ok(Self {
            config,
            os,
            session: ParseSession::new(dialect, banner.host, date),
            date_format,
            clock,
            date,
            current: CurrentStat::None,
            last: None,
            under_average: false,
            previous_instant: None,
        })
    }

    pub fn session(&self) -> &ParseSession {
        &self.session
    }

    pub fn into_session(self) -> ParseSession {
        self.session
    }

    /// Parses one line after the banner.
    ///
    /// # Errors
    ///
    /// Returns a [`LineError`] when the line is rejected. Such errors never
    /// affect other lines.
    pub fn parse_line(&mut self, line: &str) -> Result<LineOutcome> {
        let columns: Vec<&str> = line.split_whitespace().collect();
        let Some(first) = columns.first() else {
            return Ok(LineOutcome::Blank);
        };
        let dialect = self.session.dialect;
        if Dialect::from_banner_token(first) == Some(dialect) {
            return self.restart(line);
        }
        match dialect.control_line(line, &columns) {
            Some(Control::Reset) => {
                self.current = CurrentStat::None;
                return Ok(LineOutcome::Control);
            }
            Some(Control::Average) => {
                self.under_average = true;
                return Ok(LineOutcome::Control);
            }
            None => {}
        }

        let (instant, first_data_column) = self.timestamp(&columns)?;

        match classify::classify(&columns, first_data_column, self.os) {
            Classification::Ignore => {
                self.under_average = false;
                self.current = CurrentStat::Ignore;
                return Ok(LineOutcome::Ignored);
            }
            Classification::Statistic(stat) => {
                return Ok(self.enter_statistic(stat, &columns[first_data_column..]));
            }
            Classification::Unmatched => {}
        }

        self.note_transition();
        let id = match &self.current {
            CurrentStat::None => return Ok(LineOutcome::Dropped(DropReason::NoActiveStatistic)),
            CurrentStat::Ignore => return Ok(LineOutcome::Ignored),
            CurrentStat::Statistic(id) => id,
        };
        if self.under_average {
            return Ok(LineOutcome::Suppressed);
        }
        let Some(sink) = self.session.registry.get_mut(id) else {
            return Ok(LineOutcome::Dropped(DropReason::NoGraph));
        };
        self.session.date_samples.insert(instant);
        sink.accept_row(instant, &columns[first_data_column..])?;
        Ok(LineOutcome::Recorded)
    }

    /// A banner in the middle of a log starts a new day.
    fn restart(&mut self, line: &str) -> Result<LineOutcome> {
        let banner = banner::parse_banner(self.session.dialect, line)?;
        let date = datetime::resolve_date(&banner.date, &self.date_format)
            .map_err(LineError::BannerDate)?;
        log::debug!("date changes from {} to {date}", self.date);
        self.date = date;
        self.session.observe_date(date);
        self.current = CurrentStat::None;
        self.previous_instant = None;
        Ok(LineOutcome::Banner)
    }

    /// Resolves the instant of a line and the index of its first data column.
    fn timestamp(&mut self, columns: &[&str]) -> Result<(NaiveDateTime, usize)> {
        let clock = *self.clock.get_or_insert_with(|| {
            let clock = Clock::detect(columns);
            log::debug!("time columns use {clock:?}");
            clock
        });
        match datetime::resolve_time(columns, clock) {
            Ok(time) => {
                let instant = self.date.and_time(time);
                self.session.observe_instant(instant);
                self.previous_instant = Some(instant);
                Ok((instant, clock.columns()))
            }
            Err(err) => match (&self.current, self.previous_instant) {
                (CurrentStat::Statistic(id), Some(previous))
                    if self.session.dialect.is_continuation(id.as_str()) =>
                {
                    Ok((previous, 0))
                }
                _ => Err(LineError::Time(err)),
            },
        }
    }

    /// Makes `stat` the active statistic, creating its sink on first sight.
    fn enter_statistic(&mut self, stat: &StatConfig, fields: &[&str]) -> LineOutcome {
        let id = StatisticId::from(stat.graph.as_str());
        self.under_average = false;
        self.current = CurrentStat::Statistic(id.clone());

        let Some(layout) = self.os.graph(&stat.graph) else {
            log::debug!("no graph associated with statistic `{}`", stat.name);
            return LineOutcome::Header {
                statistic: id,
                created: false,
            };
        };
        let config = self.config;
        let (_, created) = self.session.registry.resolve_or_create(&id, || {
            SeriesSink::from_layout(fields, layout, config, stat.duplicate_time.into())
        });
        if created {
            log::debug!("new statistic `{id}` from `{}`", stat.name);
        }
        LineOutcome::Header {
            statistic: id,
            created,
        }
    }

    fn note_transition(&mut self) {
        match &self.last {
            Some(last) if *last == self.current => {}
            Some(last) => {
                log::debug!("statistic change from {last} to {}", self.current);
                self.last = Some(self.current.clone());
            }
            None => self.last = Some(self.current.clone()),
        }
    }
}
