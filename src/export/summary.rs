//! JSON summary of a parse: host, dates and the graphs that were built.

use std::io::Write;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use super::error::Result;
use crate::parser::{Dialect, HostInfo, LineStats, ParseReport, StopReason};
use crate::series::Graph;

#[derive(Debug, Serialize)]
pub struct Summary<'a> {
    pub host: &'a HostInfo,
    pub dialect: Dialect,
    pub sar_start_date: NaiveDate,
    pub sar_end_date: NaiveDate,
    pub start_of_graph: Option<NaiveDateTime>,
    pub end_of_graph: Option<NaiveDateTime>,
    pub date_samples: usize,
    /// `false` if the read was interrupted or failed.
    pub complete: bool,
    pub lines: LineStats,
    pub statistics: Vec<StatisticSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct StatisticSummary<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub graphs: Vec<GraphSummary<'a>>,
}

#[derive(Debug, Serialize)]
pub struct GraphSummary<'a> {
    pub title: &'a str,
    pub columns: Vec<&'a str>,
    pub samples: usize,
}

impl<'a> From<&'a Graph> for GraphSummary<'a> {
    fn from(graph: &'a Graph) -> Self {
        Self {
            title: graph.title(),
            columns: graph
                .schema()
                .columns()
                .iter()
                .map(|column| column.name.as_str())
                .collect(),
            samples: graph.sample_count(),
        }
    }
}

impl<'a> Summary<'a> {
    pub fn new(report: &'a ParseReport) -> Self {
        let session = &report.session;
        let statistics = session
            .registry()
            .iter()
            .map(|(id, sink)| StatisticSummary {
                id: id.as_str(),
                title: sink.title(),
                graphs: sink.graphs().into_iter().map(GraphSummary::from).collect(),
            })
            .collect();
        Self {
            host: session.host(),
            dialect: session.dialect(),
            sar_start_date: session.sar_start_date(),
            sar_end_date: session.sar_end_date(),
            start_of_graph: session.start_of_graph(),
            end_of_graph: session.end_of_graph(),
            date_samples: session.date_samples().len(),
            complete: matches!(report.stop, StopReason::EndOfStream),
            lines: report.stats,
            statistics,
        }
    }
}

/// Writes the summary of `report` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialisation or writing fails.
pub fn write_json<W: Write>(report: &ParseReport, mut output: W) -> Result<()> {
    serde_json::to_writer_pretty(&mut output, &Summary::new(report))?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::parser::parse_reader;
    use std::sync::atomic::AtomicBool;

    #[test]
    fn test_write_json() {
        let config = Config::builtin().unwrap();
        let log = "\
SunOS db02 5.10 Generic_147440-01 sun4v    03/28/2016

10:00:00   device        %busy   avque   r+w/s  blks/s  avwait  avserv
10:10:00   sd0               1     0.0       1      12     0.0    10.5
           sd1               2     0.0       2      24     0.0    11.5
";
        let report = parse_reader(&config, log.as_bytes(), &AtomicBool::new(false)).unwrap();
        let mut out = Vec::new();
        write_json(&report, &mut out).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();

        assert_eq!(value["host"]["hostname"], "db02");
        assert_eq!(value["dialect"], "SunOS");
        assert_eq!(value["sar_start_date"], "2016-03-28");
        assert_eq!(value["start_of_graph"], "2016-03-28T10:00:00");
        assert_eq!(value["end_of_graph"], "2016-03-28T10:10:00");
        assert_eq!(value["complete"], true);
        assert_eq!(value["lines"]["recorded"], 2);
        let statistics = value["statistics"].as_array().unwrap();
        assert_eq!(statistics.len(), 1);
        assert_eq!(statistics[0]["id"], "DEVICE");
        let graphs = statistics[0]["graphs"].as_array().unwrap();
        assert_eq!(graphs.len(), 2);
        assert_eq!(graphs[1]["columns"][0], "%busy");
        assert_eq!(graphs[1]["samples"], 1);
    }
}
