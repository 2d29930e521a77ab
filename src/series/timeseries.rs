use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::NaiveDateTime;

use super::merge::{self, DuplicatePolicy};
use crate::config::ColumnKind;

/// Result of recording one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The instant was new.
    Inserted,
    /// The instant existed and the values were combined.
    Merged,
    /// The instant existed and the new value was discarded.
    Dropped,
}

/// Samples of one column ordered by instant, at most one per instant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    samples: BTreeMap<NaiveDateTime, f64>,
}

impl TimeSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` at `instant`, reconciling with an existing sample
    /// according to `policy` and the column `kind`.
    pub fn insert(
        &mut self,
        instant: NaiveDateTime,
        value: f64,
        policy: DuplicatePolicy,
        kind: ColumnKind,
    ) -> Insertion {
        match self.samples.entry(instant) {
            Entry::Vacant(entry) => {
                entry.insert(value);
                Insertion::Inserted
            }
            Entry::Occupied(mut entry) => {
                if policy == DuplicatePolicy::Keep {
                    return Insertion::Dropped;
                }
                match merge::merge(*entry.get(), value, kind) {
                    Some(merged) => {
                        entry.insert(merged);
                        Insertion::Merged
                    }
                    None => Insertion::Dropped,
                }
            }
        }
    }

    pub fn get(&self, instant: &NaiveDateTime) -> Option<f64> {
        self.samples.get(instant).copied()
    }

    /// Iterates samples in instant order.
    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDateTime, &f64)> {
        self.samples.iter()
    }

    pub fn instants(&self) -> impl Iterator<Item = &NaiveDateTime> {
        self.samples.keys()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
