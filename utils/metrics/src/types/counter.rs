use std::sync::atomic::{AtomicI64, Ordering};

use crate::error::{InstrumentError, Result};
use crate::instrument::{Action, Instrument, MetricKind, MetricValue};

/// Signed event count.
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicI64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> i64 {
        self.value.load(Ordering::Relaxed)
    }

    pub fn increment_by(&self, amount: u64) {
        self.value.fetch_add(saturate(amount), Ordering::Relaxed);
    }

    pub fn decrement_by(&self, amount: u64) {
        self.value.fetch_sub(saturate(amount), Ordering::Relaxed);
    }

    pub fn set(&self, value: i64) {
        self.value.store(value, Ordering::Relaxed);
    }
}

fn saturate(amount: u64) -> i64 {
    i64::try_from(amount).unwrap_or(i64::MAX)
}

impl Instrument for Counter {
    fn kind(&self) -> MetricKind {
        MetricKind::Counter
    }

    fn execute(&self, action: Action) -> Result<()> {
        match action {
            Action::Increment(amount) => self.increment_by(amount),
            Action::Decrement(amount) => self.decrement_by(amount),
            Action::Set(value) if value.is_finite() => self.set(value as i64),
            Action::Absolute(value) => self.set(saturate(value)),
            Action::Set(value) => {
                return Err(InstrumentError::InvalidValue {
                    action: action.name(),
                    value,
                });
            }
            other => return Err(self.kind().unsupported(other)),
        }

        Ok(())
    }

    fn value(&self) -> MetricValue {
        MetricValue::Counter(self.get())
    }
}

impl metrics::CounterFn for Counter {
    fn increment(&self, value: u64) {
        self.increment_by(value);
    }

    fn absolute(&self, value: u64) {
        self.set(saturate(value));
    }
}
