use std::sync::Arc;

use sluice_metrics::Instrument;

use crate::error::{Error, Result};
use crate::node::{Binding, NamespaceNode, Shape};
use crate::segment::{self, Segment};
use crate::snapshot::{Record, Snapshot};

/// The process-wide registry of metric instruments, organized as a tree of
/// namespaces.
///
/// Producers call [`fetch_or_store`](Self::fetch_or_store) (or the factory
/// flavor) once per metric identity and then mutate the returned instrument
/// directly; the store is not on the hot path after lookup. A reporter calls
/// [`get`](Self::get) and [`to_records`](Self::to_records) concurrently with
/// ongoing inserts.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use sluice_metrics::{Action, Counter};
/// use sluice_store::MetricStore;
///
/// let store = MetricStore::new();
///
/// let events_in = store
///     .fetch_or_store_with(&["node", "pipelines", "main"], "events_in", Counter::new)
///     .unwrap();
/// events_in.execute(Action::Increment(1)).unwrap();
///
/// let records = store.to_records();
/// assert_eq!(records.len(), 1);
/// assert_eq!(records[0].name("/"), "node/pipelines/main/events_in");
/// ```
#[derive(Debug, Default)]
pub struct MetricStore {
    root: Arc<NamespaceNode>,
}

impl MetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(&self) -> &Arc<NamespaceNode> {
        &self.root
    }

    /// Returns the instrument at `path`/`key`, storing `instrument` there if
    /// nothing is bound yet. When a leaf already exists, `instrument` is
    /// dropped and the existing one returned.
    ///
    /// Intermediate namespaces along `path` are created as needed. An empty
    /// `path` stores the leaf directly under the root.
    ///
    /// # Errors
    ///
    /// [`Error::NamespaceConflict`] when a segment of `path` is already a
    /// metric, or `key` is already a namespace. The tree is left unchanged
    /// from the conflicting segment down.
    pub fn fetch_or_store<S: AsRef<str>>(
        &self,
        path: &[S],
        key: &str,
        instrument: Arc<dyn Instrument>,
    ) -> Result<Arc<dyn Instrument>> {
        self.fetch_or_insert(path, key, move || instrument)
    }

    /// Like [`fetch_or_store`](Self::fetch_or_store), building the
    /// instrument lazily.
    ///
    /// `factory` is invoked at most once per installed leaf, and only by the
    /// caller that wins the insert; racing callers that lose never run it.
    /// It runs while a shard of the parent namespace is locked, so it must
    /// not call back into this store.
    pub fn fetch_or_store_with<S, F, I>(
        &self,
        path: &[S],
        key: &str,
        factory: F,
    ) -> Result<Arc<dyn Instrument>>
    where
        S: AsRef<str>,
        F: FnOnce() -> I,
        I: Instrument + 'static,
    {
        self.fetch_or_insert(path, key, move || Arc::new(factory()) as Arc<dyn Instrument>)
    }

    fn fetch_or_insert<S, F>(
        &self,
        path: &[S],
        key: &str,
        factory: F,
    ) -> Result<Arc<dyn Instrument>>
    where
        S: AsRef<str>,
        F: FnOnce() -> Arc<dyn Instrument>,
    {
        let mut node = Arc::clone(&self.root);

        for (depth, name) in path.iter().enumerate() {
            node = node
                .namespace(name.as_ref())
                .map_err(|found| Error::NamespaceConflict {
                    path: segment::to_path(&path[..=depth]),
                    expected: Shape::Namespace,
                    found,
                })?;
        }

        node.leaf_or_insert_with(key, factory)
            .map_err(|found| Error::NamespaceConflict {
                path: full_path(path, key),
                expected: Shape::Leaf,
                found,
            })
    }

    /// Looks up whatever is bound at `path`, without creating anything.
    ///
    /// Returns a [`Binding::Namespace`] for an intermediate path (the whole
    /// subtree) and a [`Binding::Leaf`] for a metric. `None` means nothing is
    /// bound there, which includes walking past a leaf. An empty path yields
    /// the root namespace.
    pub fn get<S: AsRef<str>>(&self, path: &[S]) -> Option<Binding> {
        let mut current = Binding::Namespace(Arc::clone(&self.root));

        for segment in path {
            let next = match &current {
                Binding::Namespace(node) => node.get(segment.as_ref())?,
                Binding::Leaf(_) => return None,
            };
            current = next;
        }

        Some(current)
    }

    /// Flattens the whole tree, one record per metric.
    pub fn to_records(&self) -> Vec<Record> {
        self.root.to_records(&[])
    }

    /// Flattens the subtree at `path`. Record paths still start at the root.
    pub fn to_records_at<S: AsRef<str>>(&self, path: &[S]) -> Option<Vec<Record>> {
        let binding = self.get(path)?;
        Some(binding.to_records(&segment::to_path(path)))
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(self.to_records())
    }

    pub fn snapshot_at<S: AsRef<str>>(&self, path: &[S]) -> Option<Snapshot> {
        self.to_records_at(path).map(Snapshot::new)
    }

    /// Number of metrics in the store.
    pub fn size(&self) -> usize {
        self.root.size()
    }
}

fn full_path<S: AsRef<str>>(path: &[S], key: &str) -> Vec<Segment> {
    let mut full = segment::to_path(path);
    full.push(Segment::from(key));
    full
}
