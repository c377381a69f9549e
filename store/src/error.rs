use std::time::Duration;

use sluice_metrics::InstrumentError;
use thiserror::Error;

use crate::node::Shape;
use crate::segment::{Segment, join};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A segment expected to be a namespace is a metric, or the other way
    /// round. Points at a naming collision in the instrumentation scheme.
    #[error(
        "Namespace conflict at `{}`: expected a {expected}, found a {found}",
        join(.path, "/")
    )]
    NamespaceConflict {
        /// Path up to and including the conflicting segment.
        path: Vec<Segment>,
        expected: Shape,
        found: Shape,
    },

    #[error("Metric key must not be empty")]
    MissingKey,

    #[error("Metric namespace must not be empty")]
    MissingNamespace,

    #[error(transparent)]
    Instrument(#[from] InstrumentError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record sink is closed")]
    SinkClosed,
}

impl Error {
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::NamespaceConflict { .. })
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Invalid duration: {field} = {duration:?} (must be > 0)")]
    InvalidDuration { field: String, duration: Duration },

    #[error("Missing required field: {field}")]
    MissingField { field: String },
}
