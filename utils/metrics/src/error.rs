use crate::instrument::MetricKind;

pub type Result<T> = std::result::Result<T, InstrumentError>;

/// Errors raised by [`Instrument::execute`](crate::Instrument::execute).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InstrumentError {
    #[error("{kind} does not support the `{action}` action")]
    UnsupportedAction {
        kind: MetricKind,
        action: &'static str,
    },

    #[error("Invalid value for `{action}`: {value}")]
    InvalidValue { action: &'static str, value: f64 },
}
