use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One component of a namespace path, e.g. `pipelines` in
/// `node/pipelines/main/events_in`.
///
/// Cloning is a reference-count bump. Segments borrow as `str`, so map
/// lookups by `&str` never allocate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Segment(Arc<str>);

impl Segment {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Deref for Segment {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Segment {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Segment {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Segment {
    fn from(name: &str) -> Self {
        Self(Arc::from(name))
    }
}

impl From<String> for Segment {
    fn from(name: String) -> Self {
        Self(Arc::from(name))
    }
}

impl From<&String> for Segment {
    fn from(name: &String) -> Self {
        Self::from(name.as_str())
    }
}

/// Converts any borrowed path into owned segments.
pub fn to_path<S: AsRef<str>>(path: &[S]) -> Vec<Segment> {
    path.iter().map(|segment| Segment::new(segment)).collect()
}

/// Renders a path with `separator` between segments.
pub fn join<S: AsRef<str>>(path: &[S], separator: &str) -> String {
    path.iter()
        .map(|segment| segment.as_ref())
        .collect::<Vec<_>>()
        .join(separator)
}
