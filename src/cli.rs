//! Command line of the `sargraph` binary.

use std::path::PathBuf;

use clap::Parser;

use crate::input::Source;

#[derive(Debug, Parser)]
#[command(name = "sargraph")]
#[command(about = "Parses sar logs into time series", long_about = None)]
pub struct Args {
    /// JSON configuration replacing the built-in statistics.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Date format of Linux logs, e.g. "MM/DD/YY 23:59:59" or
    /// "DD/MM/YYYY 11:59:59 AM|PM".
    #[arg(long)]
    pub date_format: Option<String>,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Write every series as semicolon separated values.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write a JSON summary of the parse.
    #[arg(long)]
    pub json: Option<PathBuf>,
}

#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
pub struct SourceArgs {
    /// Read a sar log file.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Read the output of a shell command, e.g. "sar -A".
    #[arg(long)]
    pub command: Option<String>,

    /// Read from standard input.
    #[arg(long)]
    pub stdin: bool,
}

impl SourceArgs {
    pub fn source(&self) -> Source {
        match (&self.file, &self.command) {
            (Some(path), _) => Source::File(path.clone()),
            (None, Some(command)) => Source::Command(command.clone()),
            (None, None) => Source::Stdin,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_source() {
        let args = Args::try_parse_from([
            "sargraph",
            "--file",
            "/var/log/sa/sar28",
            "--csv",
            "out.csv",
            "--date-format",
            "DD/MM/YY 23:59:59",
        ])
        .unwrap();
        assert_eq!(
            args.source.source(),
            Source::File(PathBuf::from("/var/log/sa/sar28"))
        );
        assert_eq!(args.csv, Some(PathBuf::from("out.csv")));
        assert_eq!(args.date_format.as_deref(), Some("DD/MM/YY 23:59:59"));
        assert!(args.json.is_none());
    }

    #[test]
    fn test_parse_command_and_stdin() {
        let args = Args::try_parse_from(["sargraph", "--command", "sar -A"]).unwrap();
        assert_eq!(args.source.source(), Source::Command("sar -A".to_owned()));
        let args = Args::try_parse_from(["sargraph", "--stdin"]).unwrap();
        assert_eq!(args.source.source(), Source::Stdin);
    }

    #[test]
    fn test_exactly_one_source() {
        assert!(Args::try_parse_from(["sargraph"]).is_err());
        assert!(Args::try_parse_from(["sargraph", "--stdin", "--file", "x"]).is_err());
    }
}
