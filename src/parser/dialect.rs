//! Operating system dialects of sar output.
//!
//! A log's dialect is chosen from the first token of its banner line through a
//! static registration table. Each dialect knows its control lines (restart
//! and summary markers), how the date in its banner is written, and which
//! statistics continue over rows that carry no timestamp.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Banner tokens mapped to the dialect that parses the log.
static DIALECTS: LazyLock<HashMap<&'static str, Dialect>> = LazyLock::new(|| {
    HashMap::from([
        ("AIX", Dialect::Aix),
        ("HP-UX", Dialect::HpUx),
        ("HPUX", Dialect::HpUx),
        ("Linux", Dialect::Linux),
        ("SunOS", Dialect::SunOs),
    ])
});

/// Line prefixes that end the current statistic in Linux logs, including
/// localised summary labels.
const LINUX_RESET_PREFIXES: &[&str] = &[
    "Average:",
    "##",
    "Summary",
    "Moyenne :",
    "Moyenne\u{a0}:",
    "Résumé:",
    "Durchschn.:",
    "Zusammenfassung:",
    "Media:",
    "Resumen:",
];

const LINUX_RESTART: &str = "LINUX RESTART";

/// Fragments of restart and configuration notices in System V style logs.
const UNIX_RESET_MARKERS: &[&str] = &[
    "unix restarts",
    " unix restarted",
    "System Configuration",
    "System configuration",
    "State change",
];

/// First column of the averaged block System V style logs print at the end
/// of each statistic.
const UNIX_AVERAGE: &str = "Average";

/// Serialised under the same names as [`Dialect::name`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum Dialect {
    #[serde(rename = "AIX")]
    Aix,
    #[serde(rename = "HPUX")]
    HpUx,
    Linux,
    #[serde(rename = "SunOS")]
    SunOs,
}

/// Effect of a control line on the parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    /// No statistic is active until the next header.
    Reset,
    /// Rows are averages and suppressed until the next header.
    Average,
}

impl Dialect {
    /// Looks up the dialect registered for the first token of a banner line.
    pub fn from_banner_token(token: &str) -> Option<Self> {
        DIALECTS.get(token).copied()
    }

    /// Name of the dialect in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            Dialect::Aix => "AIX",
            Dialect::HpUx => "HPUX",
            Dialect::Linux => "Linux",
            Dialect::SunOs => "SunOS",
        }
    }

    /// Pattern of the banner date, or `None` when it is configurable (Linux).
    pub fn banner_date_pattern(self) -> Option<&'static str> {
        match self {
            Dialect::Aix | Dialect::HpUx => Some("MM/dd/yy"),
            Dialect::SunOs => Some("MM/dd/yyyy"),
            Dialect::Linux => None,
        }
    }

    /// Recognises control lines.
    ///
    /// # Arguments
    ///
    /// * `line` - The raw line.
    /// * `columns` - The line split on whitespace, not empty.
    pub fn control_line(self, line: &str, columns: &[&str]) -> Option<Control> {
        match self {
            Dialect::Linux => {
                let trimmed = line.trim_start();
                let reset = LINUX_RESET_PREFIXES
                    .iter()
                    .any(|prefix| trimmed.starts_with(prefix))
                    || line.contains(LINUX_RESTART);
                reset.then_some(Control::Reset)
            }
            Dialect::Aix | Dialect::HpUx | Dialect::SunOs => {
                if columns.first() == Some(&UNIX_AVERAGE) {
                    return Some(Control::Average);
                }
                UNIX_RESET_MARKERS
                    .iter()
                    .any(|marker| line.contains(marker))
                    .then_some(Control::Reset)
            }
        }
    }

    /// Whether rows of `statistic` may omit the timestamp, continuing the
    /// instant of the row above.
    pub fn is_continuation(self, statistic: &str) -> bool {
        let continued: &[&str] = match self {
            Dialect::Aix => &["DEVICE", "CPUS"],
            Dialect::HpUx => &["DEVICE", "CPU"],
            Dialect::SunOs => &["DEVICE"],
            Dialect::Linux => &[],
        };
        continued.contains(&statistic)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn test_registration_table() {
        assert_eq!(Dialect::from_banner_token("Linux"), Some(Dialect::Linux));
        assert_eq!(Dialect::from_banner_token("HP-UX"), Some(Dialect::HpUx));
        assert_eq!(Dialect::from_banner_token("SunOS"), Some(Dialect::SunOs));
        assert_eq!(Dialect::from_banner_token("AIX"), Some(Dialect::Aix));
        assert_eq!(Dialect::from_banner_token("FreeBSD"), None);
        assert_eq!(Dialect::HpUx.to_string(), "HPUX");
    }

    #[test]
    fn test_serialized_names_match_config_names() {
        for dialect in [Dialect::Aix, Dialect::HpUx, Dialect::Linux, Dialect::SunOs] {
            assert_eq!(
                serde_json::to_value(dialect).unwrap(),
                serde_json::Value::from(dialect.name())
            );
        }
    }

    #[test]
    fn test_linux_control_lines() {
        for line in [
            "Average:        all      0.25      0.00      0.15      0.01      0.00     99.59",
            "Moyenne :       all      0.25",
            "Moyenne\u{a0}:       all      0.25",
            "Résumé:  all",
            "## some comment",
            "Summary:        CPU",
            "09:20:01 AM       LINUX RESTART      (4 CPU)",
        ] {
            assert_eq!(
                Dialect::Linux.control_line(line, &columns(line)),
                Some(Control::Reset),
                "{line}"
            );
        }
        let data = "09:10:01 AM     all      0.25      0.00";
        assert_eq!(Dialect::Linux.control_line(data, &columns(data)), None);
    }

    #[test]
    fn test_unix_control_lines() {
        let average = "Average    sd0    1    0.0";
        assert_eq!(
            Dialect::SunOs.control_line(average, &columns(average)),
            Some(Control::Average)
        );
        let restart = "10:00:00  unix restarts";
        assert_eq!(
            Dialect::HpUx.control_line(restart, &columns(restart)),
            Some(Control::Reset)
        );
        let config = "System configuration: lcpu=4 ent=0.20 mode=Uncapped";
        assert_eq!(
            Dialect::Aix.control_line(config, &columns(config)),
            Some(Control::Reset)
        );
        // Linux summary labels carry a colon and are not System V markers
        let linux_average = "Average:  all  1.0";
        assert_eq!(
            Dialect::SunOs.control_line(linux_average, &columns(linux_average)),
            None
        );
    }

    #[test]
    fn test_continuation_statistics() {
        assert!(Dialect::SunOs.is_continuation("DEVICE"));
        assert!(!Dialect::SunOs.is_continuation("CPU"));
        assert!(Dialect::HpUx.is_continuation("CPU"));
        assert!(Dialect::Aix.is_continuation("CPUS"));
        assert!(!Dialect::Linux.is_continuation("DEVICE"));
    }

    #[test]
    fn test_banner_date_patterns() {
        assert_eq!(Dialect::SunOs.banner_date_pattern(), Some("MM/dd/yyyy"));
        assert_eq!(Dialect::HpUx.banner_date_pattern(), Some("MM/dd/yy"));
        assert_eq!(Dialect::Linux.banner_date_pattern(), None);
    }
}
