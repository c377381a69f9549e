//! Producer-side convenience over [`MetricStore`].
//!
//! [`Metric`] creates the right instrument on first use and applies an
//! action to it in one call, so plugin code can write
//! `metric.increment(&["pipelines", "main"], "events_in")` without dealing
//! with instruments directly. [`NamespacedMetric`] binds a path prefix once
//! (per pipeline, per plugin) and then takes only keys.

use std::sync::Arc;
use std::time::Duration;

use sluice_metrics::{Action, Counter, Gauge, Instrument, Timer};

use crate::error::{Error, Result};
use crate::segment::{self, Segment};
use crate::store::MetricStore;

#[derive(Debug, Clone)]
pub struct Metric {
    store: Arc<MetricStore>,
}

impl Metric {
    pub fn new(store: Arc<MetricStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    pub fn increment<S: AsRef<str>>(&self, namespace: &[S], key: &str) -> Result<()> {
        self.increment_by(namespace, key, 1)
    }

    pub fn increment_by<S: AsRef<str>>(
        &self,
        namespace: &[S],
        key: &str,
        amount: u64,
    ) -> Result<()> {
        self.apply(namespace, key, Counter::new, Action::Increment(amount))
    }

    pub fn decrement<S: AsRef<str>>(&self, namespace: &[S], key: &str) -> Result<()> {
        self.decrement_by(namespace, key, 1)
    }

    pub fn decrement_by<S: AsRef<str>>(
        &self,
        namespace: &[S],
        key: &str,
        amount: u64,
    ) -> Result<()> {
        self.apply(namespace, key, Counter::new, Action::Decrement(amount))
    }

    pub fn gauge<S: AsRef<str>>(&self, namespace: &[S], key: &str, value: f64) -> Result<()> {
        self.apply(namespace, key, Gauge::new, Action::Set(value))
    }

    pub fn report_time<S: AsRef<str>>(
        &self,
        namespace: &[S],
        key: &str,
        duration: Duration,
    ) -> Result<()> {
        self.apply(namespace, key, Timer::new, Action::Record(duration))
    }

    /// Runs `f` and records its duration under `namespace`/`key`.
    ///
    /// The timer is resolved before `f` runs, so a naming error is reported
    /// without executing `f`.
    pub fn time<S, T>(&self, namespace: &[S], key: &str, f: impl FnOnce() -> T) -> Result<T>
    where
        S: AsRef<str>,
    {
        let timer = self.resolve(namespace, key, Timer::new)?;
        let started = std::time::Instant::now();
        let output = f();
        timer.execute(Action::Record(started.elapsed()))?;
        Ok(output)
    }

    /// Binds `namespace` as a prefix for subsequent calls.
    pub fn namespace<S: AsRef<str>>(&self, namespace: &[S]) -> Result<NamespacedMetric> {
        if namespace.is_empty() {
            return Err(Error::MissingNamespace);
        }

        Ok(NamespacedMetric {
            metric: self.clone(),
            namespace: segment::to_path(namespace),
        })
    }

    fn apply<S, F, I>(&self, namespace: &[S], key: &str, factory: F, action: Action) -> Result<()>
    where
        S: AsRef<str>,
        F: FnOnce() -> I,
        I: Instrument + 'static,
    {
        self.resolve(namespace, key, factory)?.execute(action)?;
        Ok(())
    }

    fn resolve<S, F, I>(
        &self,
        namespace: &[S],
        key: &str,
        factory: F,
    ) -> Result<Arc<dyn Instrument>>
    where
        S: AsRef<str>,
        F: FnOnce() -> I,
        I: Instrument + 'static,
    {
        if namespace.is_empty() {
            return Err(Error::MissingNamespace);
        }
        if key.trim().is_empty() {
            return Err(Error::MissingKey);
        }

        self.store.fetch_or_store_with(namespace, key, factory)
    }
}

/// A [`Metric`] with a fixed path prefix.
#[derive(Debug, Clone)]
pub struct NamespacedMetric {
    metric: Metric,
    namespace: Vec<Segment>,
}

impl NamespacedMetric {
    pub fn namespace_path(&self) -> &[Segment] {
        &self.namespace
    }

    pub fn metric(&self) -> &Metric {
        &self.metric
    }

    pub fn increment(&self, key: &str) -> Result<()> {
        self.metric.increment(&self.namespace, key)
    }

    pub fn increment_by(&self, key: &str, amount: u64) -> Result<()> {
        self.metric.increment_by(&self.namespace, key, amount)
    }

    pub fn decrement(&self, key: &str) -> Result<()> {
        self.metric.decrement(&self.namespace, key)
    }

    pub fn decrement_by(&self, key: &str, amount: u64) -> Result<()> {
        self.metric.decrement_by(&self.namespace, key, amount)
    }

    pub fn gauge(&self, key: &str, value: f64) -> Result<()> {
        self.metric.gauge(&self.namespace, key, value)
    }

    pub fn report_time(&self, key: &str, duration: Duration) -> Result<()> {
        self.metric.report_time(&self.namespace, key, duration)
    }

    pub fn time<T>(&self, key: &str, f: impl FnOnce() -> T) -> Result<T> {
        self.metric.time(&self.namespace, key, f)
    }

    /// Extends the prefix with `sub`.
    pub fn namespace<S: AsRef<str>>(&self, sub: &[S]) -> NamespacedMetric {
        let mut namespace = self.namespace.clone();
        namespace.extend(sub.iter().map(|name| Segment::new(name)));

        NamespacedMetric {
            metric: self.metric.clone(),
            namespace,
        }
    }
}
