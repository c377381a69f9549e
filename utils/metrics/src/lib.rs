//! # Sluice Metrics
//!
//! Lock-free metric instruments for the sluice pipeline metric store.
//!
//! ## Overview
//!
//! Every instrument is a small struct of atomics that can be shared between
//! pipeline worker threads behind an `Arc` and mutated without locks. The
//! store in `sluice-store` never looks at concrete types: it talks to
//! instruments exclusively through the [`Instrument`] trait, which exposes a
//! single mutation entry point ([`Instrument::execute`]) and a single read
//! accessor ([`Instrument::value`]).
//!
//! ## Instruments
//!
//! - **[`Counter`]**: signed event count (`increment`, `decrement`, `set`)
//! - **[`Gauge`]**: last observed `f64` (`set`, `adjust`)
//! - **[`Timer`]**: aggregate of recorded durations in milliseconds
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use sluice_metrics::{Action, Counter, Instrument, MetricValue, Timer};
//!
//! let counter = Counter::new();
//! counter.execute(Action::Increment(3)).unwrap();
//! counter.execute(Action::Decrement(1)).unwrap();
//! assert_eq!(counter.value(), MetricValue::Counter(2));
//!
//! let timer = Timer::new();
//! timer.execute(Action::Record(Duration::from_millis(40))).unwrap();
//! assert_eq!(timer.summary().count, 1);
//! ```
//!
//! ## `metrics` facade
//!
//! The instruments also implement [`metrics::CounterFn`], [`metrics::GaugeFn`]
//! and [`metrics::HistogramFn`], so they can back handles produced by a
//! [`metrics::Recorder`].
//!
//! ## Thread Safety
//!
//! ```rust
//! use std::sync::Arc;
//! use std::thread;
//! use sluice_metrics::{Action, Counter, Instrument};
//!
//! let counter = Arc::new(Counter::new());
//! let handles: Vec<_> = (0..8)
//!     .map(|_| {
//!         let counter = Arc::clone(&counter);
//!         thread::spawn(move || {
//!             for _ in 0..1000 {
//!                 counter.execute(Action::Increment(1)).unwrap();
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//!
//! assert_eq!(counter.get(), 8000);
//! ```

pub mod error;
pub mod instrument;
pub mod types;

pub use error::{InstrumentError, Result};
pub use instrument::{Action, Instrument, MetricKind, MetricValue, duration_from_secs};
pub use types::{Counter, Gauge, Timer, TimerSummary};
