//! # Sluice Store
//!
//! A hierarchical, concurrent registry of metric instruments.
//!
//! Metrics live in a tree of namespaces (`node` / `pipelines` / `main` /
//! `events_in`). Producers on any thread fetch-or-create an instrument once
//! per identity and then mutate it directly; a reporter flattens the tree
//! into [`Record`]s on a schedule without stopping the producers.
//!
//! ## Layers
//!
//! - [`MetricStore`]: `fetch_or_store`, `get`, `to_records` over
//!   [`NamespaceNode`]s, with [`Error::NamespaceConflict`] when a path is
//!   used both as a namespace and as a metric
//! - [`Metric`] / [`NamespacedMetric`]: producer-side helpers that create the
//!   right instrument on first use
//! - [`StoreRecorder`]: routes the `metrics` macros into the tree
//! - [`Reporter`]: periodic snapshots handed to a [`RecordSink`]
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use sluice_store::{Metric, MetricStore};
//!
//! let store = Arc::new(MetricStore::new());
//! let metric = Metric::new(Arc::clone(&store));
//!
//! let pipeline = metric.namespace(&["node", "pipelines", "main"]).unwrap();
//! pipeline.increment("events_in").unwrap();
//! pipeline.gauge("queue_depth", 12.0).unwrap();
//!
//! let snapshot = store.snapshot();
//! assert_eq!(snapshot.len(), 2);
//! assert!(snapshot.find(&["node", "pipelines", "main", "events_in"]).is_some());
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod metric;
pub mod node;
pub mod recorder;
pub mod reporter;
pub mod segment;
pub mod sink;
pub mod snapshot;
pub mod store;

mod key;

pub use config::{Config, RecorderConfig, ReporterConfig};
pub use error::{ConfigError, Error, Result};
pub use metric::{Metric, NamespacedMetric};
pub use node::{Binding, NamespaceNode, Shape};
pub use recorder::StoreRecorder;
pub use reporter::Reporter;
pub use segment::Segment;
pub use sink::{ChannelSink, LogSink, RecordSink};
pub use snapshot::{Record, Snapshot};
pub use store::MetricStore;

pub use sluice_metrics::{Action, Counter, Gauge, Instrument, MetricKind, MetricValue, Timer};
