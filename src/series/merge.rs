//! Reconciliation of samples that land on an instant already recorded.

use crate::config::ColumnKind;

/// What happens when a row repeats an instant of its statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Keep the first value and discard the newcomer.
    #[default]
    Keep,
    /// Combine both values according to the column kind.
    Merge,
}

impl From<bool> for DuplicatePolicy {
    fn from(can_duplicate_time: bool) -> Self {
        if can_duplicate_time {
            DuplicatePolicy::Merge
        } else {
            DuplicatePolicy::Keep
        }
    }
}

/// Combines an existing and an incoming value at the same instant.
///
/// Gauges are averaged and counters summed. Returns `None` for columns of
/// unknown kind, meaning the incoming value is dropped.
pub fn merge(old: f64, new: f64, kind: ColumnKind) -> Option<f64> {
    match kind {
        ColumnKind::Gauge => Some((old + new) / 2.0),
        ColumnKind::Counter => Some(old + new),
        ColumnKind::Unknown => None,
    }
}
