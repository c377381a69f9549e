//! The concurrent tree underneath [`MetricStore`](crate::MetricStore).
//!
//! Each [`NamespaceNode`] maps segments to a [`Binding`] in a sharded
//! `DashMap`. Inserting a binding goes through the map's entry API, which
//! holds the key's shard lock for the duration of the check-and-insert: two
//! threads racing on the same unbound segment serialize there and observe a
//! single winner, while unrelated segments (and every other node) are not
//! blocked. No lock spans more than one node.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sluice_metrics::Instrument;

use crate::segment::Segment;
use crate::snapshot::{self, Record};

/// What a segment is bound to.
#[derive(Debug, Clone)]
pub enum Binding {
    Namespace(Arc<NamespaceNode>),
    Leaf(Arc<dyn Instrument>),
}

/// The tag of a [`Binding`], compared when detecting namespace conflicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Namespace,
    Leaf,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Shape::Namespace => f.write_str("namespace"),
            Shape::Leaf => f.write_str("metric"),
        }
    }
}

impl Binding {
    pub fn shape(&self) -> Shape {
        match self {
            Binding::Namespace(_) => Shape::Namespace,
            Binding::Leaf(_) => Shape::Leaf,
        }
    }

    pub fn as_namespace(&self) -> Option<&Arc<NamespaceNode>> {
        match self {
            Binding::Namespace(node) => Some(node),
            Binding::Leaf(_) => None,
        }
    }

    pub fn as_leaf(&self) -> Option<&Arc<dyn Instrument>> {
        match self {
            Binding::Leaf(instrument) => Some(instrument),
            Binding::Namespace(_) => None,
        }
    }

    pub fn into_namespace(self) -> Option<Arc<NamespaceNode>> {
        match self {
            Binding::Namespace(node) => Some(node),
            Binding::Leaf(_) => None,
        }
    }

    pub fn into_leaf(self) -> Option<Arc<dyn Instrument>> {
        match self {
            Binding::Leaf(instrument) => Some(instrument),
            Binding::Namespace(_) => None,
        }
    }

    /// Flattens this binding, which lives at `path`, into records.
    ///
    /// A leaf yields exactly one record for `path` itself.
    pub fn to_records(&self, path: &[Segment]) -> Vec<Record> {
        match self {
            Binding::Namespace(node) => node.to_records(path),
            Binding::Leaf(instrument) => vec![Record::new(path.to_vec(), instrument.as_ref())],
        }
    }
}

/// A level of the metric tree.
#[derive(Debug, Default)]
pub struct NamespaceNode {
    children: DashMap<Segment, Binding>,
}

impl NamespaceNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the binding for `segment`, if any.
    pub fn get(&self, segment: &str) -> Option<Binding> {
        self.children
            .get(segment)
            .map(|binding| binding.value().clone())
    }

    pub fn contains(&self, segment: &str) -> bool {
        self.children.contains_key(segment)
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn keys(&self) -> Vec<Segment> {
        self.children
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Copies the current bindings out of the map.
    ///
    /// No shard guard outlives this call, so callers may recurse or read
    /// instrument values without holding up concurrent inserts.
    pub fn entries(&self) -> Vec<(Segment, Binding)> {
        self.children
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of leaves in this subtree.
    pub fn size(&self) -> usize {
        self.entries()
            .iter()
            .map(|(_, binding)| match binding {
                Binding::Namespace(node) => node.size(),
                Binding::Leaf(_) => 1,
            })
            .sum()
    }

    /// Flattens this subtree into records whose paths start with `prefix`.
    pub fn to_records(&self, prefix: &[Segment]) -> Vec<Record> {
        let mut records = Vec::new();
        snapshot::flatten(self, &mut prefix.to_vec(), &mut records);
        records
    }

    /// Descends into the namespace bound at `segment`, creating it if the
    /// segment is unbound. Fails with the shape found when it is a leaf.
    pub(crate) fn namespace(&self, segment: &str) -> Result<Arc<NamespaceNode>, Shape> {
        if let Some(binding) = self.get(segment) {
            return binding.into_namespace().ok_or(Shape::Leaf);
        }

        match self.children.entry(Segment::from(segment)) {
            Entry::Occupied(entry) => match entry.get() {
                Binding::Namespace(node) => Ok(Arc::clone(node)),
                Binding::Leaf(_) => Err(Shape::Leaf),
            },
            Entry::Vacant(entry) => {
                let node = Arc::new(NamespaceNode::new());
                entry.insert(Binding::Namespace(Arc::clone(&node)));
                Ok(node)
            }
        }
    }

    /// Returns the instrument bound at `segment`, installing the one built by
    /// `factory` if the segment is unbound.
    ///
    /// `factory` runs while the segment's shard is locked: it is called at
    /// most once, only when this call wins the insert, and must not touch
    /// this node.
    pub(crate) fn leaf_or_insert_with<F>(
        &self,
        segment: &str,
        factory: F,
    ) -> Result<Arc<dyn Instrument>, Shape>
    where
        F: FnOnce() -> Arc<dyn Instrument>,
    {
        if let Some(binding) = self.get(segment) {
            return binding.into_leaf().ok_or(Shape::Namespace);
        }

        match self.children.entry(Segment::from(segment)) {
            Entry::Occupied(entry) => match entry.get() {
                Binding::Leaf(instrument) => Ok(Arc::clone(instrument)),
                Binding::Namespace(_) => Err(Shape::Namespace),
            },
            Entry::Vacant(entry) => {
                let instrument = factory();
                entry.insert(Binding::Leaf(Arc::clone(&instrument)));
                Ok(instrument)
            }
        }
    }
}
