//! Time-series sink for one statistic instance.
//!
//! A [`Graph`] keeps one [`TimeSeries`] per data column of the header that
//! created it, plus the stack groups its layout declares. Rows are accepted
//! whole or not at all: every value is parsed before any series is touched.

use std::collections::BTreeSet;
use std::num::ParseFloatError;
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::error::{Result, RowError};
use super::merge::DuplicatePolicy;
use super::timeseries::TimeSeries;
use crate::config::{ColumnKind, Config, GraphConfig, PlotStackConfig};

/// A data column and its semantic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub kind: ColumnKind,
}

/// Column layout shared by every graph of a statistic.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<ColumnSpec>,
    plots: Vec<PlotStackConfig>,
    stacks: Vec<PlotStackConfig>,
    policy: DuplicatePolicy,
}

impl Schema {
    /// Builds the layout for the data columns `headers`, resolving each
    /// column's kind from `config`.
    pub fn new(
        headers: &[&str],
        layout: &GraphConfig,
        config: &Config,
        policy: DuplicatePolicy,
    ) -> Self {
        let columns = headers
            .iter()
            .map(|name| ColumnSpec {
                name: (*name).to_owned(),
                kind: config.column_kind(name),
            })
            .collect();
        Self {
            columns,
            plots: layout.plots.clone(),
            stacks: layout.stacks.clone(),
            policy,
        }
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    /// Parses one value per column.
    ///
    /// # Errors
    ///
    /// Returns [`RowError::ColumnCount`] unless there is exactly one field per
    /// column and [`RowError::NotNumeric`] for the first field that is not a
    /// number.
    pub fn parse_row(&self, title: &str, fields: &[&str]) -> Result<Vec<f64>> {
        if fields.len() != self.columns.len() {
            return Err(RowError::ColumnCount {
                title: title.to_owned(),
                expected: self.columns.len(),
                found: fields.len(),
            });
        }
        fields
            .iter()
            .zip(&self.columns)
            .map(|(field, column)| {
                parse_value(field).map_err(|source| RowError::NotNumeric {
                    title: title.to_owned(),
                    column: column.name.clone(),
                    value: (*field).to_owned(),
                    source,
                })
            })
            .collect()
    }
}

/// Parses a sar value, accepting a decimal comma.
fn parse_value(field: &str) -> std::result::Result<f64, ParseFloatError> {
    field.parse::<f64>().or_else(|err| {
        if field.contains(',') {
            field.replace(',', ".").parse::<f64>()
        } else {
            Err(err)
        }
    })
}

/// One column's contribution to a stack group.
#[derive(Debug, Clone)]
pub struct StackMember {
    column: usize,
    name: String,
    series: TimeSeries,
}

impl StackMember {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn series(&self) -> &TimeSeries {
        &self.series
    }
}

/// Columns drawn as stacked areas.
#[derive(Debug, Clone)]
pub struct StackGroup {
    config: PlotStackConfig,
    members: Vec<StackMember>,
}

impl StackGroup {
    fn new(config: &PlotStackConfig, schema: &Schema) -> Self {
        let members = config
            .columns()
            .filter_map(|name| match schema.position(name) {
                Some(column) => Some(StackMember {
                    column,
                    name: name.to_owned(),
                    series: TimeSeries::new(),
                }),
                None => {
                    log::debug!("stack `{}` names unknown column `{name}`", config.title);
                    None
                }
            })
            .collect();
        Self {
            config: config.clone(),
            members,
        }
    }

    pub fn title(&self) -> &str {
        &self.config.title
    }

    pub fn config(&self) -> &PlotStackConfig {
        &self.config
    }

    pub fn members(&self) -> &[StackMember] {
        &self.members
    }

    /// Height of the stack at `instant`, or `None` if no member has a sample.
    pub fn total_at(&self, instant: &NaiveDateTime) -> Option<f64> {
        self.members
            .iter()
            .filter_map(|member| member.series.get(instant))
            .fold(None, |total, value| Some(total.unwrap_or(0.0) + value))
    }
}

/// Series of one statistic, or of one key of a keyed statistic.
#[derive(Debug, Clone)]
pub struct Graph {
    title: String,
    schema: Arc<Schema>,
    series: Vec<TimeSeries>,
    stacks: Vec<StackGroup>,
}

impl Graph {
    pub fn new(title: impl Into<String>, schema: Arc<Schema>) -> Self {
        let series = vec![TimeSeries::new(); schema.columns().len()];
        let stacks = schema
            .stacks
            .iter()
            .map(|stack| StackGroup::new(stack, &schema))
            .collect();
        Self {
            title: title.into(),
            schema,
            series,
            stacks,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Plot layout hints for rendering.
    pub fn plots(&self) -> &[PlotStackConfig] {
        &self.schema.plots
    }

    pub fn stacks(&self) -> &[StackGroup] {
        &self.stacks
    }

    /// Iterates columns with their series, in header order.
    pub fn columns(&self) -> impl Iterator<Item = (&ColumnSpec, &TimeSeries)> {
        self.schema.columns().iter().zip(&self.series)
    }

    /// Series of the first column called `name`.
    pub fn series(&self, name: &str) -> Option<&TimeSeries> {
        self.schema.position(name).map(|index| &self.series[index])
    }

    /// Parses and records one row of values at `instant`.
    ///
    /// # Arguments
    ///
    /// * `instant` - Timestamp of the row.
    /// * `fields` - The row's values, timestamp columns excluded.
    ///
    /// # Errors
    ///
    /// Returns a [`RowError`] if the row does not fit the schema; no series is
    /// modified in that case.
    pub fn accept_row(&mut self, instant: NaiveDateTime, fields: &[&str]) -> Result<()> {
        let values = self.schema.parse_row(&self.title, fields)?;
        self.record(instant, &values);
        Ok(())
    }

    /// Records already parsed values, one per column.
    pub(super) fn record(&mut self, instant: NaiveDateTime, values: &[f64]) {
        let policy = self.schema.policy();
        let columns = self.schema.columns();
        for ((series, column), value) in self.series.iter_mut().zip(columns).zip(values) {
            series.insert(instant, *value, policy, column.kind);
        }
        for stack in &mut self.stacks {
            for member in &mut stack.members {
                let kind = columns[member.column].kind;
                member
                    .series
                    .insert(instant, values[member.column], policy, kind);
            }
        }
    }

    /// All instants holding at least one sample.
    pub fn instants(&self) -> BTreeSet<NaiveDateTime> {
        self.series
            .iter()
            .flat_map(|series| series.instants().copied())
            .collect()
    }

    /// Number of distinct instants recorded.
    pub fn sample_count(&self) -> usize {
        self.instants().len()
    }

    /// Export column titles: `"<graph title> <column>"` in header order.
    pub fn csv_header(&self) -> Vec<String> {
        self.schema
            .columns()
            .iter()
            .map(|column| format!("{} {}", self.title, column.name))
            .collect()
    }

    /// Values at `instant` in header order, `None` where a column has no
    /// sample.
    pub fn values_at(&self, instant: &NaiveDateTime) -> Vec<Option<f64>> {
        self.series.iter().map(|series| series.get(instant)).collect()
    }

    /// Export cells at `instant`, aligned with [`Graph::csv_header`]; missing
    /// samples are empty strings.
    pub fn csv_line(&self, instant: &NaiveDateTime) -> Vec<String> {
        self.values_at(instant)
            .into_iter()
            .map(|value| value.map(|v| v.to_string()).unwrap_or_default())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GraphKind;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2016, 3, 28)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn test_config() -> Config {
        Config::from_json(
            "test",
            r#"{ "columns": {
                "%user": { "type": "gauge" },
                "%system": { "type": "gauge" },
                "cswch/s": { "type": "counter" }
            } }"#,
        )
        .unwrap()
    }

    fn layout() -> GraphConfig {
        GraphConfig {
            name: "CPU".to_owned(),
            title: "CPU".to_owned(),
            kind: GraphKind::Unique,
            plots: Vec::new(),
            stacks: vec![PlotStackConfig {
                title: "busy".to_owned(),
                header: "%user %system %missing".to_owned(),
                size: 1,
                base: 0,
                factor: 0.0,
                range: None,
            }],
        }
    }

    fn graph(policy: DuplicatePolicy) -> Graph {
        let schema = Schema::new(
            &["%user", "%system", "cswch/s", "%idle"],
            &layout(),
            &test_config(),
            policy,
        );
        Graph::new("CPU", Arc::new(schema))
    }

    #[test]
    fn test_schema_column_kinds() {
        let graph = graph(DuplicatePolicy::Keep);
        let kinds: Vec<ColumnKind> = graph.columns().map(|(c, _)| c.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ColumnKind::Gauge,
                ColumnKind::Gauge,
                ColumnKind::Counter,
                ColumnKind::Unknown
            ]
        );
    }

    #[test]
    fn test_accept_row() {
        let mut graph = graph(DuplicatePolicy::Keep);
        graph
            .accept_row(at(9, 10, 1), &["1.5", "2.5", "300", "96.00"])
            .unwrap();
        assert_eq!(graph.series("%user").unwrap().get(&at(9, 10, 1)), Some(1.5));
        assert_eq!(graph.series("%idle").unwrap().get(&at(9, 10, 1)), Some(96.0));
        assert_eq!(graph.sample_count(), 1);
    }

    #[test]
    fn test_decimal_comma() {
        let mut graph = graph(DuplicatePolicy::Keep);
        graph
            .accept_row(at(9, 10, 1), &["0,50", "1,00", "12", "98,50"])
            .unwrap();
        assert_eq!(graph.series("%user").unwrap().get(&at(9, 10, 1)), Some(0.5));
        assert_eq!(graph.series("%idle").unwrap().get(&at(9, 10, 1)), Some(98.5));
    }

    #[test]
    fn test_malformed_row_is_isolated() {
        let mut graph = graph(DuplicatePolicy::Keep);
        graph
            .accept_row(at(9, 10, 1), &["1", "2", "3", "94"])
            .unwrap();
        let err = graph
            .accept_row(at(9, 20, 1), &["1", "n/a", "3", "94"])
            .unwrap_err();
        match err {
            RowError::NotNumeric { column, value, .. } => {
                assert_eq!(column, "%system");
                assert_eq!(value, "n/a");
            }
            other => panic!("unexpected error: {other}"),
        }
        graph
            .accept_row(at(9, 30, 1), &["5", "6", "7", "82"])
            .unwrap();

        let user = graph.series("%user").unwrap();
        let samples: Vec<(NaiveDateTime, f64)> = user.iter().map(|(t, v)| (*t, *v)).collect();
        assert_eq!(samples, vec![(at(9, 10, 1), 1.0), (at(9, 30, 1), 5.0)]);
        assert_eq!(graph.stacks()[0].total_at(&at(9, 20, 1)), None);
    }

    #[test]
    fn test_column_count_mismatch() {
        let mut graph = graph(DuplicatePolicy::Keep);
        let err = graph.accept_row(at(9, 10, 1), &["1", "2", "3"]).unwrap_err();
        assert!(matches!(
            err,
            RowError::ColumnCount {
                expected: 4,
                found: 3,
                ..
            }
        ));
        assert!(
            graph
                .accept_row(at(9, 10, 1), &["1", "2", "3", "4", "5"])
                .is_err()
        );
        assert_eq!(graph.sample_count(), 0);
    }

    #[test]
    fn test_duplicate_instant_merged() {
        let mut graph = graph(DuplicatePolicy::Merge);
        let now = at(9, 10, 1);
        graph.accept_row(now, &["4.0", "1", "10", "50"]).unwrap();
        graph.accept_row(now, &["6.0", "3", "20", "70"]).unwrap();
        assert_eq!(graph.series("%user").unwrap().get(&now), Some(5.0));
        assert_eq!(graph.series("cswch/s").unwrap().get(&now), Some(30.0));
        // unknown kind keeps the first value
        assert_eq!(graph.series("%idle").unwrap().get(&now), Some(50.0));
        // stack members merge the same way: 5.0 + 2.0
        assert_eq!(graph.stacks()[0].total_at(&now), Some(7.0));
    }

    #[test]
    fn test_duplicate_instant_kept() {
        let mut graph = graph(DuplicatePolicy::Keep);
        let now = at(9, 10, 1);
        graph.accept_row(now, &["10", "1", "10", "50"]).unwrap();
        graph.accept_row(now, &["20", "3", "20", "70"]).unwrap();
        assert_eq!(graph.series("%user").unwrap().get(&now), Some(10.0));
    }

    #[test]
    fn test_stack_members() {
        let graph = graph(DuplicatePolicy::Keep);
        let stack = &graph.stacks()[0];
        assert_eq!(stack.title(), "busy");
        let names: Vec<&str> = stack.members().iter().map(StackMember::name).collect();
        assert_eq!(names, vec!["%user", "%system"]);
    }

    #[test]
    fn test_csv_projection() {
        let mut graph = graph(DuplicatePolicy::Keep);
        graph
            .accept_row(at(9, 20, 1), &["1.5", "2", "3", "93.5"])
            .unwrap();
        graph
            .accept_row(at(9, 10, 1), &["0", "1", "2", "97"])
            .unwrap();
        assert_eq!(
            graph.csv_header(),
            vec!["CPU %user", "CPU %system", "CPU cswch/s", "CPU %idle"]
        );
        assert_eq!(graph.csv_line(&at(9, 20, 1)), vec!["1.5", "2", "3", "93.5"]);
        assert_eq!(graph.csv_line(&at(9, 30, 1)), vec!["", "", "", ""]);
        let instants: Vec<NaiveDateTime> = graph.instants().into_iter().collect();
        assert_eq!(instants, vec![at(9, 10, 1), at(9, 20, 1)]);
    }
}
