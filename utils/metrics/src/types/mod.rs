mod counter;
mod gauge;
mod timer;

pub use counter::Counter;
pub use gauge::Gauge;
pub use timer::{Timer, TimerSummary};

use std::sync::atomic::{AtomicU64, Ordering};

/// Applies `update` to an `f64` stored as bits until the swap succeeds.
///
/// Returning `None` from `update` leaves the cell untouched.
pub(crate) fn update_f64(cell: &AtomicU64, update: impl Fn(f64) -> Option<f64>) {
    let mut current_bits = cell.load(Ordering::Relaxed);
    loop {
        let Some(next) = update(f64::from_bits(current_bits)) else {
            return;
        };

        match cell.compare_exchange_weak(
            current_bits,
            next.to_bits(),
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return,
            Err(actual) => current_bits = actual,
        }
    }
}
