//! Configuration model handed to the parser.
//!
//! A [`Config`] describes, per operating system, which header shapes name a
//! statistic, how each statistic is laid out as a graph, and globally, which
//! semantic type (gauge or counter) every column carries. The parser never
//! loads this itself; callers build it with [`Config::builtin`],
//! [`Config::from_path`] or [`Config::from_json`] and pass a reference in.
//!
//! Header signatures are normalised to single-space separated tokens so that
//! a lookup with the columns of a sar line joined by `' '` is an exact match.

mod error;

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::str::FromStr;

use serde::Deserialize;

use crate::input;

pub use error::{Error, Result};

/// Value of `linux_date_format` that enables automatic date detection.
pub const AUTOMATIC_DETECTION: &str = "Automatic Detection";

/// Graph name reserved for statistics whose rows are recognised but discarded.
pub const IGNORE_GRAPH: &str = "IGNORE";

const BUILTIN_CONFIG: &str = include_str!("default.json");

/// Semantic type of a column, driving how samples at the same instant merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    /// Instantaneous level; duplicates are averaged.
    Gauge,
    /// Accumulating quantity; duplicates are summed.
    Counter,
    #[default]
    Unknown,
}

/// Display colour of a column, written as `"r,g,b"` in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor {
            value: s.to_owned(),
        };
        let mut parts = s.split(',').map(|part| part.trim().parse::<u8>());
        let (Some(Ok(red)), Some(Ok(green)), Some(Ok(blue)), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        Ok(Self { red, green, blue })
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Global per-column settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ColumnConfig {
    #[serde(rename = "type", default)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub color: Option<Rgb>,
}

/// Value axis bounds of a plot or stack.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(try_from = "(f64, f64)")]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl TryFrom<(f64, f64)> for AxisRange {
    type Error = Error;

    fn try_from(value: (f64, f64)) -> Result<Self> {
        if value.0 > value.1 {
            return Err(Error::InvalidRange { value });
        }
        Ok(Self {
            min: value.0,
            max: value.1,
        })
    }
}

/// A plot (lines) or stack (summed areas) drawn from a subset of columns.
#[derive(Debug, Clone, Deserialize)]
pub struct PlotStackConfig {
    pub title: String,
    /// Whitespace separated column names.
    pub header: String,
    /// Relative height among the plots of one graph.
    #[serde(default = "default_plot_size")]
    pub size: u32,
    /// Unit base for axis labels: `0` (plain), `1000` or `1024`.
    #[serde(default)]
    pub base: u32,
    #[serde(default)]
    pub factor: f64,
    #[serde(default)]
    pub range: Option<AxisRange>,
}

fn default_plot_size() -> u32 {
    1
}

impl PlotStackConfig {
    /// Column names covered by this plot or stack, in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.header.split_whitespace()
    }
}

/// How a statistic is turned into series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    /// One graph for the whole statistic.
    Unique,
    /// One graph per value of the first data column.
    Multiple,
}

/// Layout of the graph a statistic feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphConfig {
    #[serde(skip)]
    pub name: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: GraphKind,
    #[serde(default)]
    pub plots: Vec<PlotStackConfig>,
    #[serde(default)]
    pub stacks: Vec<PlotStackConfig>,
}

/// A named header shape and the graph it feeds.
#[derive(Debug, Clone, Deserialize)]
pub struct StatConfig {
    #[serde(skip)]
    pub name: String,
    /// Name of the graph; also the identifier of the statistic while parsing.
    pub graph: String,
    /// Column names following the timestamp, whitespace separated.
    pub header: String,
    /// Whether rows repeating an instant are merged instead of dropped.
    #[serde(default)]
    pub duplicate_time: bool,
}

/// Statistics and graphs known for one operating system.
#[derive(Debug, Clone, Default)]
pub struct OsConfig {
    stats: BTreeMap<String, StatConfig>,
    graphs: BTreeMap<String, GraphConfig>,
    headers: HashMap<String, String>,
}

impl OsConfig {
    /// Looks up the statistic whose header signature equals `header` exactly.
    ///
    /// `header` must be single-space separated, as produced by joining the
    /// columns of a line with `' '`.
    pub fn stat_for_header(&self, header: &str) -> Option<&StatConfig> {
        self.headers
            .get(header)
            .and_then(|name| self.stats.get(name))
    }

    pub fn stat(&self, name: &str) -> Option<&StatConfig> {
        self.stats.get(name)
    }

    pub fn graph(&self, name: &str) -> Option<&GraphConfig> {
        self.graphs.get(name)
    }

    pub fn stats(&self) -> impl Iterator<Item = &StatConfig> {
        self.stats.values()
    }
}

#[derive(Debug, Deserialize)]
struct RawOsConfig {
    #[serde(default)]
    stats: BTreeMap<String, StatConfig>,
    #[serde(default)]
    graphs: BTreeMap<String, GraphConfig>,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    os: BTreeMap<String, RawOsConfig>,
    #[serde(default)]
    columns: HashMap<String, ColumnConfig>,
    #[serde(default = "default_date_format")]
    linux_date_format: String,
}

fn default_date_format() -> String {
    AUTOMATIC_DETECTION.to_owned()
}

fn normalize_header(header: &str) -> String {
    header.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl OsConfig {
    fn build(os: &str, raw: RawOsConfig) -> Result<Self> {
        let mut stats = BTreeMap::new();
        let mut headers: HashMap<String, String> = HashMap::with_capacity(raw.stats.len());
        for (name, mut stat) in raw.stats {
            stat.header = normalize_header(&stat.header);
            if stat.header.is_empty() {
                return Err(Error::EmptyHeader {
                    os: os.to_owned(),
                    stat: name,
                });
            }
            if let Some(first) = headers.get(&stat.header) {
                return Err(Error::DuplicateHeader {
                    os: os.to_owned(),
                    header: stat.header,
                    first: first.clone(),
                    second: name,
                });
            }
            headers.insert(stat.header.clone(), name.clone());
            stat.name = name.clone();
            stats.insert(name, stat);
        }

        let graphs = raw
            .graphs
            .into_iter()
            .map(|(name, mut graph)| {
                graph.name = name.clone();
                (name, graph)
            })
            .collect();

        Ok(Self {
            stats,
            graphs,
            headers,
        })
    }
}

/// Complete, immutable configuration for a parse session.
#[derive(Debug, Clone, Default)]
pub struct Config {
    os: HashMap<String, OsConfig>,
    columns: HashMap<String, ColumnConfig>,
    linux_date_format: String,
}

impl TryFrom<RawConfig> for Config {
    type Error = Error;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let os = raw
            .os
            .into_iter()
            .map(|(name, os)| OsConfig::build(&name, os).map(|os| (name, os)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self {
            os,
            columns: raw.columns,
            linux_date_format: raw.linux_date_format,
        })
    }
}

impl Config {
    /// Returns the configuration bundled with the crate.
    ///
    /// # Errors
    ///
    /// Fails only if the bundled document is inconsistent.
    pub fn builtin() -> Result<Self> {
        Self::from_json("<builtin>", BUILTIN_CONFIG)
    }

    /// Decodes a configuration from a JSON document.
    ///
    /// # Arguments
    ///
    /// * `origin` - Name of the document, used in error messages.
    /// * `json` - The document itself.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] for malformed JSON or invalid values, and
    /// [`Error::DuplicateHeader`] or [`Error::EmptyHeader`] for inconsistent
    /// statistics.
    pub fn from_json(origin: &str, json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json).map_err(|source| Error::Decode {
            origin: origin.to_owned(),
            source,
        })?;
        Self::try_from(raw)
    }

    /// Reads and decodes a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Same as [`Config::from_json`], plus [`Error::FileOpen`] when the file
    /// cannot be opened.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = input::open_file_reader(path)?;
        let raw: RawConfig = serde_json::from_reader(reader).map_err(|source| Error::Decode {
            origin: path.display().to_string(),
            source,
        })?;
        Self::try_from(raw)
    }

    /// Replaces the Linux date format, e.g. `"MM/DD/YY 23:59:59"`.
    pub fn with_linux_date_format(mut self, format: impl Into<String>) -> Self {
        self.linux_date_format = format.into();
        self
    }

    pub fn linux_date_format(&self) -> &str {
        &self.linux_date_format
    }

    /// Returns the statistics configured for the operating system `name`
    /// (`"Linux"`, `"SunOS"`, `"HPUX"` or `"AIX"`).
    pub fn os(&self, name: &str) -> Option<&OsConfig> {
        self.os.get(name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnConfig> {
        self.columns.get(name)
    }

    /// Semantic type of a column; [`ColumnKind::Unknown`] if not configured.
    pub fn column_kind(&self, name: &str) -> ColumnKind {
        self.column(name).map(|c| c.kind).unwrap_or_default()
    }
}
