use std::sync::atomic::{AtomicU64, Ordering};

use super::update_f64;
use crate::error::Result;
use crate::instrument::{Action, Instrument, MetricKind, MetricValue};

/// Last observed value, stored as `f64` bits.
#[derive(Debug, Default)]
pub struct Gauge {
    value: AtomicU64,
}

impl Gauge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> f64 {
        f64::from_bits(self.value.load(Ordering::Relaxed))
    }

    pub fn set(&self, value: f64) {
        self.value.store(value.to_bits(), Ordering::Relaxed);
    }

    pub fn adjust(&self, delta: f64) {
        update_f64(&self.value, |current| Some(current + delta));
    }
}

impl Instrument for Gauge {
    fn kind(&self) -> MetricKind {
        MetricKind::Gauge
    }

    fn execute(&self, action: Action) -> Result<()> {
        match action {
            Action::Set(value) => self.set(value),
            Action::Absolute(value) => self.set(value as f64),
            Action::Adjust(delta) => self.adjust(delta),
            Action::Increment(amount) => self.adjust(amount as f64),
            Action::Decrement(amount) => self.adjust(-(amount as f64)),
            other => return Err(self.kind().unsupported(other)),
        }

        Ok(())
    }

    fn value(&self) -> MetricValue {
        MetricValue::Gauge(self.get())
    }
}

impl metrics::GaugeFn for Gauge {
    fn set(&self, value: f64) {
        Gauge::set(self, value);
    }

    fn increment(&self, value: f64) {
        self.adjust(value);
    }

    fn decrement(&self, value: f64) {
        self.adjust(-value);
    }
}
