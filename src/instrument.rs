// src/instrument.rs

//! Wall-clock timing for compositing calls. Results are only logged.

use std::time::{Duration, Instant};

use log::debug;

/// Measures the time since [`start`](ElapsedTimer::start).
#[derive(Debug)]
pub struct ElapsedTimer {
    label: &'static str,
    started: Instant,
}

impl ElapsedTimer {
    pub fn start(label: &'static str) -> Self {
        ElapsedTimer {
            label,
            started: Instant::now(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs the elapsed time at debug level and returns it.
    pub fn finish(self) -> Duration {
        let elapsed = self.elapsed();
        debug!(
            "{}: {:.3} ms",
            self.label,
            elapsed.as_secs_f64() * 1000.0
        );
        elapsed
    }
}

/// Runs `f` and logs how long it took under `label`.
pub fn timed<T>(label: &'static str, f: impl FnOnce() -> T) -> T {
    let timer = ElapsedTimer::start(label);
    let result = f();
    timer.finish();
    result
}
