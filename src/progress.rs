//! # Progress — Percentage Reporting on Standard Error
//!
//! Worker 0 reports how far the interval has been covered at the end of
//! each of its segments. Updates are advisory: they are deduplicated
//! through an atomic so repeat percentages cost one load, and the figure
//! is capped at 99 so the line never claims completion before the final
//! gather. The driver prints the real summary afterwards.

use std::sync::atomic::{AtomicI64, Ordering};

pub struct Progress {
    origin: u64,
    target: u64,
    last: AtomicI64,
}

impl Progress {
    pub fn new(origin: u64, target: u64) -> Self {
        Progress {
            origin,
            target,
            last: AtomicI64::new(-1),
        }
    }

    /// Report that sieving has covered everything up to `reached`.
    /// Writes `"  <p>%\r"` to stderr when the whole percentage changed.
    pub fn report(&self, reached: u64) {
        if self.target <= self.origin {
            return;
        }
        let done = (reached - self.origin) as f64 / (self.target - self.origin) as f64;
        let pct = ((done * 100.0) as i64).min(99);
        if self.last.swap(pct, Ordering::Relaxed) != pct {
            eprint!("  {pct}%\r");
        }
    }

    #[cfg(test)]
    fn last_reported(&self) -> i64 {
        self.last.load(Ordering::Relaxed)
    }
}
