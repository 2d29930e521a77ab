//! Time-indexed series built from classified sar rows.
//!
//! Each statistic seen in a log is bound to one [`SeriesSink`] in the
//! [`SeriesRegistry`]: a single [`Graph`] for statistics printed once per
//! interval, or a [`List`] of graphs for statistics printed once per device,
//! CPU or interface.

mod error;
mod graph;
mod list;
mod merge;
mod natural;
mod timeseries;

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;

use crate::config::{Config, GraphConfig, GraphKind};

pub use error::{Result, RowError};
pub use graph::{ColumnSpec, Graph, Schema, StackGroup, StackMember};
pub use list::List;
pub use merge::{DuplicatePolicy, merge};
pub use natural::{NaturalKey, natural_cmp};
pub use timeseries::{Insertion, TimeSeries};

/// Identifier of a statistic within a session: the name of its graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatisticId(String);

impl StatisticId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatisticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StatisticId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// Destination of a statistic's rows.
#[derive(Debug, Clone)]
pub enum SeriesSink {
    Graph(Graph),
    List(List),
}

impl SeriesSink {
    /// Builds the sink a graph layout asks for.
    ///
    /// # Arguments
    ///
    /// * `headers` - Data column names of the header line that introduced the
    ///   statistic, timestamp columns excluded.
    /// * `layout` - The statistic's graph configuration.
    /// * `config` - Source of column kinds.
    /// * `policy` - Handling of repeated instants.
    pub fn from_layout(
        headers: &[&str],
        layout: &GraphConfig,
        config: &Config,
        policy: DuplicatePolicy,
    ) -> Self {
        match layout.kind {
            GraphKind::Unique => {
                let schema = Schema::new(headers, layout, config, policy);
                SeriesSink::Graph(Graph::new(layout.title.clone(), Arc::new(schema)))
            }
            GraphKind::Multiple => SeriesSink::List(List::new(
                layout.title.clone(),
                headers,
                layout,
                config,
                policy,
            )),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SeriesSink::Graph(graph) => graph.title(),
            SeriesSink::List(list) => list.title(),
        }
    }

    /// Hands a data row to the sink.
    ///
    /// # Errors
    ///
    /// Returns a [`RowError`] if the row does not fit the statistic's schema.
    pub fn accept_row(&mut self, instant: NaiveDateTime, fields: &[&str]) -> Result<()> {
        match self {
            SeriesSink::Graph(graph) => graph.accept_row(instant, fields),
            SeriesSink::List(list) => list.accept_row(instant, fields),
        }
    }

    /// Graphs of the sink: the graph itself, or the children in natural
    /// order.
    pub fn graphs(&self) -> Vec<&Graph> {
        match self {
            SeriesSink::Graph(graph) => vec![graph],
            SeriesSink::List(list) => list.children().map(|(_, graph)| graph).collect(),
        }
    }

    pub fn instants(&self) -> BTreeSet<NaiveDateTime> {
        match self {
            SeriesSink::Graph(graph) => graph.instants(),
            SeriesSink::List(list) => list.instants(),
        }
    }

    pub fn csv_header(&self) -> Vec<String> {
        match self {
            SeriesSink::Graph(graph) => graph.csv_header(),
            SeriesSink::List(list) => list.csv_header(),
        }
    }

    pub fn csv_line(&self, instant: &NaiveDateTime) -> Vec<String> {
        match self {
            SeriesSink::Graph(graph) => graph.csv_line(instant),
            SeriesSink::List(list) => list.csv_line(instant),
        }
    }
}

/// Binds statistic identifiers to their sinks for the lifetime of a session.
///
/// Sinks are never replaced or removed. Iteration follows the order in
/// which statistics were first seen.
#[derive(Debug, Clone, Default)]
pub struct SeriesRegistry {
    sinks: Vec<(StatisticId, SeriesSink)>,
    index: HashMap<StatisticId, usize>,
}

impl SeriesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the sink of `id`, creating it with `create` on first use.
    ///
    /// The boolean is `true` if the sink was created by this call.
    pub fn resolve_or_create<F>(&mut self, id: &StatisticId, create: F) -> (&mut SeriesSink, bool)
    where
        F: FnOnce() -> SeriesSink,
    {
        let (position, created) = match self.index.get(id) {
            Some(&position) => (position, false),
            None => {
                let position = self.sinks.len();
                self.sinks.push((id.clone(), create()));
                self.index.insert(id.clone(), position);
                (position, true)
            }
        };
        (&mut self.sinks[position].1, created)
    }

    pub fn contains(&self, id: &StatisticId) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &StatisticId) -> Option<&SeriesSink> {
        self.index.get(id).map(|&position| &self.sinks[position].1)
    }

    pub fn get_mut(&mut self, id: &StatisticId) -> Option<&mut SeriesSink> {
        self.index
            .get(id)
            .map(|&position| &mut self.sinks[position].1)
    }

    /// Iterates sinks in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&StatisticId, &SeriesSink)> {
        self.sinks.iter().map(|(id, sink)| (id, sink))
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
