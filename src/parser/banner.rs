//! Banner line parser.
//!
//! The banner is the first line of a sar log. Its layout depends on the
//! dialect:
//!
//! ```text
//! Linux 3.10.0-327.el7.x86_64 (db01)  03/28/16  _x86_64_  (4 CPU)
//! SunOS db02 5.10 Generic_147440-01 sun4v    03/28/2016
//! HP-UX db03 B.11.31 U ia64    03/28/16
//! AIX db04 1 7 00C5CC2E4C00    03/28/16
//! ```

use std::sync::LazyLock;

use regex::Regex;

use super::dialect::Dialect;
use super::error::BannerError;

static CPU_COUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+) CPU\)").expect("cpu count regex is valid"));

/// Host description taken from the banner.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct HostInfo {
    pub os: String,
    pub hostname: String,
    pub kernel: Option<String>,
    pub os_version: Option<String>,
    pub cpu_type: Option<String>,
    pub cpu_count: Option<u32>,
    pub mac_address: Option<String>,
}

/// A parsed banner line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub host: HostInfo,
    /// The date exactly as printed; its format depends on dialect and
    /// configuration.
    pub date: String,
}

/// Named fields of a banner line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerField {
    Kernel,
    Hostname,
    Release,
    Version,
    CpuType,
    MacAddress,
    Date,
}

impl std::fmt::Display for BannerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BannerField::Kernel => "kernel",
            BannerField::Hostname => "hostname",
            BannerField::Release => "release",
            BannerField::Version => "version",
            BannerField::CpuType => "cpu_type",
            BannerField::MacAddress => "mac_address",
            BannerField::Date => "date",
        };
        write!(f, "{name}")
    }
}

fn field<'a>(
    columns: &[&'a str],
    index: usize,
    field: BannerField,
    line: &str,
) -> Result<&'a str, BannerError> {
    columns
        .get(index)
        .copied()
        .ok_or_else(|| BannerError::MissingField {
            field,
            line: line.to_owned(),
        })
}

/// Parses a banner line of the given dialect.
///
/// # Errors
///
/// Returns [`BannerError::Empty`] for a blank line and
/// [`BannerError::MissingField`] if the line is too short for its dialect.
pub fn parse_banner(dialect: Dialect, line: &str) -> Result<Banner, BannerError> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.is_empty() {
        return Err(BannerError::Empty);
    }
    match dialect {
        Dialect::Linux => parse_linux(&columns, line),
        Dialect::SunOs | Dialect::HpUx => parse_system_v(dialect, &columns, line),
        Dialect::Aix => parse_aix(&columns, line),
    }
}

fn parse_linux(columns: &[&str], line: &str) -> Result<Banner, BannerError> {
    let kernel = field(columns, 1, BannerField::Kernel, line)?;
    let hostname = field(columns, 2, BannerField::Hostname, line)?;
    let date = field(columns, 3, BannerField::Date, line)?;
    let hostname = hostname
        .strip_prefix('(')
        .and_then(|h| h.strip_suffix(')'))
        .unwrap_or(hostname);
    let cpu_type = columns[4..]
        .iter()
        .find(|c| c.len() > 2 && c.starts_with('_') && c.ends_with('_'))
        .map(|c| c.trim_matches('_').to_owned());
    let cpu_count = CPU_COUNT
        .captures(line)
        .and_then(|caps| caps[1].parse().ok());

    Ok(Banner {
        host: HostInfo {
            os: Dialect::Linux.name().to_owned(),
            hostname: hostname.to_owned(),
            kernel: Some(kernel.to_owned()),
            os_version: None,
            cpu_type,
            cpu_count,
            mac_address: None,
        },
        date: date.to_owned(),
    })
}

fn parse_system_v(dialect: Dialect, columns: &[&str], line: &str) -> Result<Banner, BannerError> {
    let hostname = field(columns, 1, BannerField::Hostname, line)?;
    let release = field(columns, 2, BannerField::Release, line)?;
    let kernel = field(columns, 3, BannerField::Version, line)?;
    let cpu_type = field(columns, 4, BannerField::CpuType, line)?;
    let date = field(columns, 5, BannerField::Date, line)?;
    Ok(Banner {
        host: HostInfo {
            os: dialect.name().to_owned(),
            hostname: hostname.to_owned(),
            kernel: Some(kernel.to_owned()),
            os_version: Some(release.to_owned()),
            cpu_type: Some(cpu_type.to_owned()),
            cpu_count: None,
            mac_address: None,
        },
        date: date.to_owned(),
    })
}

fn parse_aix(columns: &[&str], line: &str) -> Result<Banner, BannerError> {
    let hostname = field(columns, 1, BannerField::Hostname, line)?;
    let version = field(columns, 2, BannerField::Version, line)?;
    let release = field(columns, 3, BannerField::Release, line)?;
    let mac_address = field(columns, 4, BannerField::MacAddress, line)?;
    let date = field(columns, 5, BannerField::Date, line)?;
    Ok(Banner {
        host: HostInfo {
            os: Dialect::Aix.name().to_owned(),
            hostname: hostname.to_owned(),
            kernel: None,
            os_version: Some(format!("{version}.{release}")),
            cpu_type: None,
            cpu_count: None,
            mac_address: Some(mac_address.to_owned()),
        },
        date: date.to_owned(),
    })
}
