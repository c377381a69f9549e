//! Bridge from the `metrics` facade into the tree.
//!
//! With a [`StoreRecorder`] installed, `metrics::counter!`,
//! `metrics::gauge!` and `metrics::histogram!` resolve to Counter, Gauge and
//! Timer leaves of a [`MetricStore`], and show up in its snapshots next to
//! metrics registered through [`Metric`](crate::Metric).

use std::sync::Arc;

use dashmap::DashMap;
use metrics::{Key, KeyName, Metadata, SharedString, Unit};
use sluice_metrics::{Action, Counter, Gauge, Instrument, Timer, duration_from_secs};
use tracing::{debug, warn};

use crate::key::{self, Location};
use crate::store::MetricStore;

#[derive(Debug, Clone)]
pub struct StoreRecorder {
    store: Arc<MetricStore>,
    separator: char,
    locations: Arc<DashMap<Key, Location>>,
}

impl StoreRecorder {
    pub fn new(store: Arc<MetricStore>) -> Self {
        Self {
            store,
            separator: '.',
            locations: Arc::new(DashMap::new()),
        }
    }

    /// Character splitting a metric name into path segments (default `.`).
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn store(&self) -> &Arc<MetricStore> {
        &self.store
    }

    /// Installs this recorder as the process-wide `metrics` recorder.
    pub fn install(self) -> Result<(), metrics::SetRecorderError<Self>> {
        metrics::set_global_recorder(self)
    }

    fn locate(&self, key: &Key) -> Location {
        self.locations
            .entry(key.clone())
            .or_insert_with(|| key::locate(key, self.separator))
            .value()
            .clone()
    }

    fn register<F, I>(&self, key: &Key, factory: F) -> Option<Handle>
    where
        F: FnOnce() -> I,
        I: Instrument + 'static,
    {
        let location = self.locate(key);

        match self
            .store
            .fetch_or_store_with(&location.namespace, &location.key, factory)
        {
            Ok(instrument) => Some(Handle(instrument)),
            Err(err) => {
                warn!(metric = %key.name(), error = %err, "Dropping metric registration");
                None
            }
        }
    }
}

impl metrics::Recorder for StoreRecorder {
    fn describe_counter(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        //
    }

    fn describe_gauge(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        //
    }

    fn describe_histogram(&self, _key: KeyName, _unit: Option<Unit>, _description: SharedString) {
        //
    }

    fn register_counter(&self, key: &Key, _metadata: &Metadata<'_>) -> metrics::Counter {
        match self.register(key, Counter::new) {
            Some(handle) => metrics::Counter::from_arc(Arc::new(handle)),
            None => metrics::Counter::noop(),
        }
    }

    fn register_gauge(&self, key: &Key, _metadata: &Metadata<'_>) -> metrics::Gauge {
        match self.register(key, Gauge::new) {
            Some(handle) => metrics::Gauge::from_arc(Arc::new(handle)),
            None => metrics::Gauge::noop(),
        }
    }

    fn register_histogram(&self, key: &Key, _metadata: &Metadata<'_>) -> metrics::Histogram {
        match self.register(key, Timer::new) {
            Some(handle) => metrics::Histogram::from_arc(Arc::new(handle)),
            None => metrics::Histogram::noop(),
        }
    }
}

/// A stored instrument driven through the `metrics` handle traits.
///
/// Everything goes through [`Instrument::execute`], so a handle works even
/// when the leaf was created earlier with a different kind; actions the leaf
/// rejects are dropped.
#[derive(Debug)]
struct Handle(Arc<dyn Instrument>);

impl Handle {
    fn apply(&self, action: Action) {
        if let Err(err) = self.0.execute(action) {
            debug!(error = %err, "Ignoring metric update");
        }
    }
}

impl metrics::CounterFn for Handle {
    fn increment(&self, value: u64) {
        self.apply(Action::Increment(value));
    }

    fn absolute(&self, value: u64) {
        self.apply(Action::Absolute(value));
    }
}

impl metrics::GaugeFn for Handle {
    fn increment(&self, value: f64) {
        self.apply(Action::Adjust(value));
    }

    fn decrement(&self, value: f64) {
        self.apply(Action::Adjust(-value));
    }

    fn set(&self, value: f64) {
        self.apply(Action::Set(value));
    }
}

impl metrics::HistogramFn for Handle {
    fn record(&self, value: f64) {
        match duration_from_secs(value) {
            Some(duration) => self.apply(Action::Record(duration)),
            None => debug!(value, "Ignoring invalid histogram sample"),
        }
    }

    fn record_many(&self, value: f64, count: usize) {
        match duration_from_secs(value) {
            Some(duration) => self.apply(Action::RecordMany(duration, count as u64)),
            None => debug!(value, count, "Ignoring invalid histogram sample"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sluice_metrics::{MetricKind, MetricValue};

    fn value_at(store: &MetricStore, path: &[&str]) -> Option<MetricValue> {
        store
            .get(path)
            .and_then(|binding| binding.into_leaf())
            .map(|instrument| instrument.value())
    }

    #[test]
    fn test_macros_land_in_the_tree() {
        let store = Arc::new(MetricStore::new());
        let recorder = StoreRecorder::new(Arc::clone(&store));

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("pipelines.main.events_in").increment(3);
            metrics::counter!("pipelines.main.events_in").increment(2);
            metrics::gauge!("jvm.heap_used").set(64.0);
            metrics::histogram!("pipelines.main.duration").record(0.5);
        });

        assert_eq!(
            value_at(&store, &["pipelines", "main", "events_in"]),
            Some(MetricValue::Counter(5))
        );
        assert_eq!(value_at(&store, &["jvm", "heap_used"]), Some(MetricValue::Gauge(64.0)));

        let timer = value_at(&store, &["pipelines", "main", "duration"]).unwrap();
        assert_eq!(timer.kind(), MetricKind::Timer);
        assert_eq!(timer.as_timer().unwrap().sum_ms, 500.0);
        assert_eq!(store.size(), 3);
    }

    #[test]
    fn test_custom_separator_and_labels() {
        let store = Arc::new(MetricStore::new());
        let recorder = StoreRecorder::new(Arc::clone(&store)).with_separator('/');

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("pipelines/main/events_out", "plugin" => "stdout").increment(1);
        });

        assert_eq!(
            value_at(&store, &["pipelines", "main", r#"events_out{plugin="stdout"}"#]),
            Some(MetricValue::Counter(1))
        );
    }

    #[test]
    fn test_conflicting_registration_is_a_noop() {
        let store = Arc::new(MetricStore::new());
        let recorder = StoreRecorder::new(Arc::clone(&store));

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("pipelines.main").increment(1);
            // `pipelines.main` is a metric, not a namespace
            metrics::counter!("pipelines.main.events_in").increment(1);
        });

        assert_eq!(store.size(), 1);
        assert_eq!(value_at(&store, &["pipelines", "main"]), Some(MetricValue::Counter(1)));
    }

    #[test]
    fn test_invalid_histogram_samples_are_ignored() {
        let store = Arc::new(MetricStore::new());
        let recorder = StoreRecorder::new(Arc::clone(&store));

        metrics::with_local_recorder(&recorder, || {
            metrics::histogram!("latency").record(-1.0);
            metrics::histogram!("latency").record(f64::NAN);
        });

        let timer = value_at(&store, &["latency"]).unwrap();
        assert_eq!(timer.as_timer().unwrap().count, 0);
    }

    #[test]
    fn test_histogram_samples_match_timer_facade() {
        let store = Arc::new(MetricStore::new());
        let recorder = StoreRecorder::new(Arc::clone(&store));
        let direct = Timer::new();

        let samples = [0.25, 1e-9, 1e20, -0.5, f64::NAN, f64::INFINITY];

        metrics::with_local_recorder(&recorder, || {
            let histogram = metrics::histogram!("latency");
            for sample in samples {
                histogram.record(sample);
            }
            histogram.record_many(0.5, 4);
        });

        for sample in samples {
            metrics::HistogramFn::record(&direct, sample);
        }
        metrics::HistogramFn::record_many(&direct, 0.5, 4);

        let recorded = value_at(&store, &["latency"]).unwrap();
        assert_eq!(recorded.as_timer(), Some(&direct.summary()));
        assert_eq!(direct.count(), 6);
    }

    #[test]
    fn test_counter_absolute_keeps_integer_precision() {
        let store = Arc::new(MetricStore::new());
        let recorder = StoreRecorder::new(Arc::clone(&store));
        let exact = (1u64 << 53) + 1;

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("events").absolute(exact);
        });

        assert_eq!(value_at(&store, &["events"]), Some(MetricValue::Counter(exact as i64)));

        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("events").absolute(u64::MAX);
        });

        assert_eq!(value_at(&store, &["events"]), Some(MetricValue::Counter(i64::MAX)));
    }
}
