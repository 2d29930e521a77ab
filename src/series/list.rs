//! Keyed group of graphs for statistics printed once per device, CPU or
//! interface.
//!
//! The first data column of each row is the key; the remaining columns go to
//! the key's own [`Graph`], created the first time the key appears. Children
//! are kept in natural order so `cpu2` comes before `cpu10`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::NaiveDateTime;

use super::error::{Result, RowError};
use super::graph::{Graph, Schema};
use super::merge::DuplicatePolicy;
use super::natural::NaturalKey;
use crate::config::{Config, GraphConfig};

#[derive(Debug, Clone)]
pub struct List {
    title: String,
    key_column: String,
    schema: Arc<Schema>,
    children: BTreeMap<NaturalKey, Graph>,
}

impl List {
    /// Creates an empty group.
    ///
    /// # Arguments
    ///
    /// * `title` - Title of the group; children are titled `"<title> <key>"`.
    /// * `headers` - Data column names, the key column first.
    /// * `layout` - Graph layout shared by all children.
    /// * `config` - Source of column kinds.
    /// * `policy` - Handling of repeated instants.
    pub fn new(
        title: impl Into<String>,
        headers: &[&str],
        layout: &GraphConfig,
        config: &Config,
        policy: DuplicatePolicy,
    ) -> Self {
        let (key_column, columns) = match headers.split_first() {
            Some((key, columns)) => ((*key).to_owned(), columns),
            None => (String::new(), headers),
        };
        Self {
            title: title.into(),
            key_column,
            schema: Arc::new(Schema::new(columns, layout, config, policy)),
            children: BTreeMap::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Name of the discriminating column, e.g. `CPU` or `IFACE`.
    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    /// Routes a row to the graph of its key.
    ///
    /// # Arguments
    ///
    /// * `instant` - Timestamp of the row.
    /// * `fields` - The key followed by the row's values.
    ///
    /// # Errors
    ///
    /// Returns a [`RowError`] if the row is empty or its values do not fit
    /// the schema. A rejected row never creates a child.
    pub fn accept_row(&mut self, instant: NaiveDateTime, fields: &[&str]) -> Result<()> {
        let Some((key, values)) = fields.split_first() else {
            return Err(RowError::ColumnCount {
                title: self.title.clone(),
                expected: self.schema.columns().len() + 1,
                found: 0,
            });
        };
        let child_title = format!("{} {}", self.title, key);
        let values = self.schema.parse_row(&child_title, values)?;
        let schema = &self.schema;
        let child = self
            .children
            .entry(NaturalKey::from(*key))
            .or_insert_with(|| {
                log::debug!("new series `{child_title}`");
                Graph::new(child_title, Arc::clone(schema))
            });
        child.record(instant, &values);
        Ok(())
    }

    /// Iterates children in natural key order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &Graph)> {
        self.children.iter().map(|(key, graph)| (key.as_str(), graph))
    }

    pub fn child(&self, key: &str) -> Option<&Graph> {
        self.children.get(&NaturalKey::from(key))
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// All instants recorded by any child.
    pub fn instants(&self) -> BTreeSet<NaiveDateTime> {
        self.children
            .values()
            .flat_map(|graph| graph.instants())
            .collect()
    }

    /// Export column titles of all children, in natural key order.
    pub fn csv_header(&self) -> Vec<String> {
        self.children.values().flat_map(Graph::csv_header).collect()
    }

    /// Export cells of all children at `instant`, aligned with
    /// [`List::csv_header`].
    pub fn csv_line(&self, instant: &NaiveDateTime) -> Vec<String> {
        self.children
            .values()
            .flat_map(|graph| graph.csv_line(instant))
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

    fn layout() -> GraphConfig {
        GraphConfig {
            name: "DISK".to_owned(),
            title: "Disk".to_owned(),
            kind: GraphKind::Multiple,
            plots: Vec::new(),
            stacks: Vec::new(),
        }
    }

    fn disk_list() -> List {
        List::new(
            "Disk",
            &["DEV", "tps", "%util"],
            &layout(),
            &Config::default(),
            DuplicatePolicy::Keep,
        )
    }

    #[test]
    fn test_children_per_key() {
        let mut list = disk_list();
        list.accept_row(at(9, 10, 1), &["sda", "1.0", "10"]).unwrap();
        list.accept_row(at(9, 10, 1), &["sdb", "2.0", "20"]).unwrap();
        list.accept_row(at(9, 20, 1), &["sda", "3.0", "30"]).unwrap();

        assert_eq!(list.len(), 2);
        assert_eq!(list.key_column(), "DEV");
        let sda = list.child("sda").unwrap();
        assert_eq!(sda.title(), "Disk sda");
        let tps: Vec<f64> = sda.series("tps").unwrap().iter().map(|(_, v)| *v).collect();
        assert_eq!(tps, vec![1.0, 3.0]);
        assert_eq!(list.child("sdb").unwrap().sample_count(), 1);
    }

    #[test]
    fn test_children_natural_order() {
        let mut list = disk_list();
        for key in ["cpu2", "cpu10", "cpu1", "all"] {
            list.accept_row(at(9, 10, 1), &[key, "1", "2"]).unwrap();
        }
        let keys: Vec<&str> = list.children().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["all", "cpu1", "cpu2", "cpu10"]);
    }

    #[test]
    fn test_rejected_row_creates_no_child() {
        let mut list = disk_list();
        assert!(list.accept_row(at(9, 10, 1), &["sda", "x", "1"]).is_err());
        assert!(list.accept_row(at(9, 10, 1), &["sda", "1"]).is_err());
        assert!(matches!(
            list.accept_row(at(9, 10, 1), &[]),
            Err(RowError::ColumnCount {
                expected: 3,
                found: 0,
                ..
            })
        ));
        assert!(list.is_empty());
    }

    #[test]
    fn test_csv_projection() {
        let mut list = disk_list();
        list.accept_row(at(9, 10, 1), &["sdb", "2", "20"]).unwrap();
        list.accept_row(at(9, 10, 1), &["sda", "1", "10"]).unwrap();
        list.accept_row(at(9, 20, 1), &["sda", "3", "30"]).unwrap();
        assert_eq!(
            list.csv_header(),
            vec!["Disk sda tps", "Disk sda %util", "Disk sdb tps", "Disk sdb %util"]
        );
        assert_eq!(list.csv_line(&at(9, 20, 1)), vec!["3", "30", "", ""]);
        assert_eq!(list.instants().len(), 2);
    }
}
