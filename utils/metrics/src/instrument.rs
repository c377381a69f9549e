use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{InstrumentError, Result};
use crate::types::TimerSummary;

/// A mutation applied to an instrument through [`Instrument::execute`].
///
/// Which actions an instrument accepts is up to the instrument; anything it
/// does not understand is rejected with [`InstrumentError::UnsupportedAction`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Add to a counter, or raise a gauge.
    Increment(u64),
    /// Subtract from a counter, or lower a gauge.
    Decrement(u64),
    /// Replace the current value.
    Set(f64),
    /// Replace a counter with an exact integer value.
    Absolute(u64),
    /// Shift a gauge by a signed amount.
    Adjust(f64),
    /// Record one timed observation.
    Record(Duration),
    /// Record the same observation several times in one update.
    RecordMany(Duration, u64),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Increment(_) => "increment",
            Action::Decrement(_) => "decrement",
            Action::Set(_) => "set",
            Action::Absolute(_) => "absolute",
            Action::Adjust(_) => "adjust",
            Action::Record(_) => "record",
            Action::RecordMany(..) => "record_many",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Converts a `metrics` histogram sample, in seconds, into a [`Duration`].
///
/// Negative, NaN and out-of-range samples yield `None`.
pub fn duration_from_secs(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value).ok()
}

/// The variant of an instrument, carried alongside its value in snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Timer,
}

impl MetricKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Timer => "timer",
        }
    }

    pub(crate) fn unsupported(self, action: Action) -> InstrumentError {
        InstrumentError::UnsupportedAction {
            kind: self,
            action: action.name(),
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time reading of an instrument.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Counter(i64),
    Gauge(f64),
    Timer(TimerSummary),
}

impl MetricValue {
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricValue::Counter(_) => MetricKind::Counter,
            MetricValue::Gauge(_) => MetricKind::Gauge,
            MetricValue::Timer(_) => MetricKind::Timer,
        }
    }

    pub fn as_counter(&self) -> Option<i64> {
        match self {
            MetricValue::Counter(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_gauge(&self) -> Option<f64> {
        match self {
            MetricValue::Gauge(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_timer(&self) -> Option<&TimerSummary> {
        match self {
            MetricValue::Timer(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Capability shared by every metric instrument.
///
/// Implementations must be safe for concurrent mutation: any number of
/// threads may hold the same instrument and call [`execute`](Self::execute)
/// while a reporter calls [`value`](Self::value).
pub trait Instrument: fmt::Debug + Send + Sync {
    fn kind(&self) -> MetricKind;

    /// Applies a mutation. Variant-specific; unsupported actions are errors.
    fn execute(&self, action: Action) -> Result<()>;

    /// Reads the current observable state.
    fn value(&self) -> MetricValue;
}
