use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use super::update_f64;
use crate::error::Result;
use crate::instrument::{Action, Instrument, MetricKind, MetricValue, duration_from_secs};

/// A thread-safe aggregate of recorded durations.
///
/// ## Overview
///
/// `Timer` keeps running statistics over every duration recorded into it,
/// in milliseconds: count, sum, min, max and the latest sample. It does not
/// keep individual samples, so memory use is constant regardless of how many
/// observations are recorded.
///
/// ## Example Usage
///
/// ```rust
/// use std::time::Duration;
/// use sluice_metrics::Timer;
///
/// let timer = Timer::new();
/// timer.record(Duration::from_millis(10));
/// timer.record(Duration::from_millis(30));
///
/// assert_eq!(timer.count(), 2);
/// assert_eq!(timer.mean(), 20.0);
///
/// let answer = timer.time(|| 6 * 7);
/// assert_eq!(answer, 42);
/// assert_eq!(timer.count(), 3);
/// ```
///
/// ## Thread Safety
///
/// All fields are atomics. Count uses `fetch_add`; sum, min and max are
/// updated with compare-exchange loops over their `f64` bit patterns. A
/// reader may observe a count that already includes a sample whose sum
/// update has not landed yet; each field is individually consistent.
///
/// ## Edge Cases
///
/// - **NaN, negative or out-of-range samples**: skipped (only reachable
///   through [`metrics::HistogramFn`], since [`Duration`] is never negative)
/// - **Empty timer**: min, max, mean and latest all read as `0.0`
#[derive(Debug)]
pub struct Timer {
    /// Number of recorded samples.
    count: AtomicU64,

    /// Sum of all samples in milliseconds, as `f64` bits.
    sum: AtomicU64,

    /// Smallest sample in milliseconds, as `f64` bits.
    ///
    /// Starts at `+inf` so the first sample always replaces it.
    min: AtomicU64,

    /// Largest sample in milliseconds, as `f64` bits.
    max: AtomicU64,

    /// Most recent sample in milliseconds, as `f64` bits.
    latest: AtomicU64,
}

/// Snapshot of a [`Timer`], all durations in milliseconds.
///
/// This is what a timer reports as its [`MetricValue`], and what ends up in
/// exported records.
///
/// ```rust
/// use std::time::Duration;
/// use sluice_metrics::Timer;
///
/// let timer = Timer::new();
/// timer.record(Duration::from_millis(5));
///
/// let summary = timer.summary();
/// assert_eq!(summary.count, 1);
/// assert_eq!(summary.max_ms, 5.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSummary {
    /// Number of recorded samples.
    pub count: u64,

    /// Sum of all samples.
    pub sum_ms: f64,

    /// `sum_ms / count`, or `0.0` when nothing has been recorded.
    pub mean_ms: f64,

    /// Smallest sample, or `0.0` when nothing has been recorded.
    pub min_ms: f64,

    /// Largest sample, or `0.0` when nothing has been recorded.
    pub max_ms: f64,

    /// Most recent sample.
    pub latest_ms: f64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum: AtomicU64::new(0),
            min: AtomicU64::new(f64::INFINITY.to_bits()),
            max: AtomicU64::new(0),
            latest: AtomicU64::new(0),
        }
    }

    /// Records a single duration.
    pub fn record(&self, duration: Duration) {
        self.record_ms(duration.as_nanos() as f64 / 1e6, 1);
    }

    /// Records `times` samples of `duration` with one update per statistic.
    pub fn record_many(&self, duration: Duration, times: u64) {
        self.record_ms(duration.as_nanos() as f64 / 1e6, times);
    }

    /// Runs `f`, records how long it took, and returns its output.
    pub fn time<T>(&self, f: impl FnOnce() -> T) -> T {
        let started = Instant::now();
        let output = f();
        self.record(started.elapsed());
        output
    }

    /// Clears every statistic.
    pub fn reset(&self) {
        self.count.store(0, Ordering::Relaxed);
        self.sum.store(0, Ordering::Relaxed);
        self.min.store(f64::INFINITY.to_bits(), Ordering::Relaxed);
        self.max.store(0, Ordering::Relaxed);
        self.latest.store(0, Ordering::Relaxed);
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Sum of all samples in milliseconds.
    pub fn sum(&self) -> f64 {
        f64::from_bits(self.sum.load(Ordering::Relaxed))
    }

    pub fn mean(&self) -> f64 {
        let count = self.count();

        if count == 0 {
            0.0
        } else {
            self.sum() / count as f64
        }
    }

    pub fn min(&self) -> f64 {
        let min = f64::from_bits(self.min.load(Ordering::Relaxed));

        if min.is_finite() { min } else { 0.0 }
    }

    pub fn max(&self) -> f64 {
        f64::from_bits(self.max.load(Ordering::Relaxed))
    }

    pub fn latest(&self) -> f64 {
        f64::from_bits(self.latest.load(Ordering::Relaxed))
    }

    pub fn summary(&self) -> TimerSummary {
        TimerSummary {
            count: self.count(),
            sum_ms: self.sum(),
            mean_ms: self.mean(),
            min_ms: self.min(),
            max_ms: self.max(),
            latest_ms: self.latest(),
        }
    }

    /// Adds `times` identical samples of `ms` milliseconds.
    ///
    /// Each statistic is touched once regardless of `times`, so batches cost
    /// the same as a single sample.
    fn record_ms(&self, ms: f64, times: u64) {
        if !ms.is_finite() || ms < 0.0 || times == 0 {
            return;
        }

        self.latest.store(ms.to_bits(), Ordering::Relaxed);
        self.count.fetch_add(times, Ordering::Relaxed);

        let total = ms * times as f64;
        update_f64(&self.sum, |sum| Some(sum + total));
        update_f64(&self.min, |min| (ms < min).then_some(ms));
        update_f64(&self.max, |max| (ms > max).then_some(ms));
    }
}

impl Instrument for Timer {
    fn kind(&self) -> MetricKind {
        MetricKind::Timer
    }

    fn execute(&self, action: Action) -> Result<()> {
        match action {
            Action::Record(duration) => {
                self.record(duration);
                Ok(())
            }
            Action::RecordMany(duration, times) => {
                self.record_many(duration, times);
                Ok(())
            }
            other => Err(self.kind().unsupported(other)),
        }
    }

    fn value(&self) -> MetricValue {
        MetricValue::Timer(self.summary())
    }
}

/// Values arriving through the `metrics` facade are seconds, following the
/// convention of `metrics::histogram!` paired with `Duration::as_secs_f64`.
/// Samples [`duration_from_secs`] rejects are skipped.
impl metrics::HistogramFn for Timer {
    fn record(&self, value: f64) {
        if let Some(duration) = duration_from_secs(value) {
            Timer::record(self, duration);
        }
    }

    fn record_many(&self, value: f64, count: usize) {
        if let Some(duration) = duration_from_secs(value) {
            Timer::record_many(self, duration, count as u64);
        }
    }
}
