use std::time::Duration;

/// Observer for per-sweep progress of the MAP fit.
///
/// The solver calls `on_sweep` after every completed sweep and `on_finish`
/// once before returning. All methods default to no-ops so implementors can
/// pick what they care about.
pub trait SweepObserver {
    fn on_sweep(&mut self, iteration: usize, elapsed: Duration, diff: f64, tau_sq: f64) {
        let _ = (iteration, elapsed, diff, tau_sq);
    }
    fn on_finish(&mut self, iterations: usize, elapsed: Duration, final_diff: f64) {
        let _ = (iterations, elapsed, final_diff);
    }
}

#[derive(Default)]
pub struct NoopProgress;

impl SweepObserver for NoopProgress {}

/// Log-backed observer with the classic verbosity cadence.
pub struct LogProgress {
    stride: usize,
    summary: bool,
}

impl LogProgress {
    /// Maps an integer verbosity level onto a reporting stride: anything
    /// above 1 reports every sweep, exactly 1 reports every 10th sweep, and
    /// 0 or below reports no sweeps. The final summary is emitted for any
    /// non-negative level.
    pub fn from_verbosity(verbose: i32) -> Self {
        let stride = match verbose {
            v if v > 1 => 1,
            1 => 10,
            _ => 0,
        };
        Self {
            stride,
            summary: verbose >= 0,
        }
    }
}

impl SweepObserver for LogProgress {
    fn on_sweep(&mut self, iteration: usize, elapsed: Duration, diff: f64, tau_sq: f64) {
        if self.stride > 0 && iteration % self.stride == 0 {
            log::info!(
                "Iteration: {}. Elapsed time: {:.3} s. Difference: {:.6e}",
                iteration,
                elapsed.as_secs_f64(),
                diff
            );
            log::debug!("Iteration: {}. tau^2: {:.6e}", iteration, tau_sq);
        }
    }

    fn on_finish(&mut self, iterations: usize, elapsed: Duration, final_diff: f64) {
        if self.summary {
            log::info!(
                "Total iterations: {}. Elapsed time: {:.3} s. Final difference: {:.6e}",
                iterations,
                elapsed.as_secs_f64(),
                final_diff
            );
        }
    }
}
