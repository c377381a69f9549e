//! Flattening the metric tree into exportable records.
//!
//! A snapshot is a depth-first walk over the tree. Every leaf contributes one
//! [`Record`] carrying its full path and the value read at the moment the
//! leaf was visited; there is no consistency across leaves beyond that.
//! Sibling order follows map iteration and must not be relied upon.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sluice_metrics::{Instrument, MetricKind, MetricValue};

use crate::node::{Binding, NamespaceNode};
use crate::segment::{self, Segment};

/// One exported metric: where it lives and what it read.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    /// Full path from the root, the leaf key included.
    pub path: Vec<Segment>,
    pub kind: MetricKind,
    pub value: MetricValue,
}

impl Record {
    pub fn new(path: Vec<Segment>, instrument: &dyn Instrument) -> Self {
        Self {
            path,
            kind: instrument.kind(),
            value: instrument.value(),
        }
    }

    /// The leaf key, i.e. the last path segment.
    pub fn key(&self) -> Option<&Segment> {
        self.path.last()
    }

    /// Every segment but the leaf key.
    pub fn namespace(&self) -> &[Segment] {
        match self.path.split_last() {
            Some((_, namespace)) => namespace,
            None => &[],
        }
    }

    pub fn name(&self, separator: &str) -> String {
        segment::join(&self.path, separator)
    }
}

/// The records of one walk, stamped with when it was taken.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub created_at: DateTime<Utc>,
    pub records: Vec<Record>,
}

impl Snapshot {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            created_at: Utc::now(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Finds the record stored at exactly `path`.
    pub fn find<S: AsRef<str>>(&self, path: &[S]) -> Option<&Record> {
        self.records.iter().find(|record| {
            record.path.len() == path.len()
                && record
                    .path
                    .iter()
                    .zip(path)
                    .all(|(ours, theirs)| ours.as_str() == theirs.as_ref())
        })
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Depth-first walk appending one record per leaf below `node`.
///
/// `prefix` is the path of `node` and is restored before returning.
pub(crate) fn flatten(node: &NamespaceNode, prefix: &mut Vec<Segment>, out: &mut Vec<Record>) {
    for (segment, binding) in node.entries() {
        prefix.push(segment);

        match binding {
            Binding::Namespace(child) => flatten(&child, prefix, out),
            Binding::Leaf(instrument) => out.push(Record::new(prefix.clone(), instrument.as_ref())),
        }

        prefix.pop();
    }
}
