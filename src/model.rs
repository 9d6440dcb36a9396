use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// --- Public Data Structures ---
// These structs define the caller-facing configuration and the fitted
// artifact returned by the solver.

/// Selects the convergence metric compared against the tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffType {
    /// Frobenius-norm change between sweeps, scaled by the previous norm.
    Relative,
    /// Unscaled Frobenius-norm change between sweeps.
    Absolute,
}

/// Terminal state of the sweep loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FitStatus {
    /// The convergence metric dropped to the tolerance or below.
    Converged,
    /// The sweep budget ran out first. The returned estimate is still the
    /// best one available; inspect `diffs` to judge how far it got.
    MaxIterationsReached,
}

/// Hyperparameters and run controls for the MAP fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorseshoeConfig {
    /// Shape hyperparameter of the global shrinkage prior.
    pub t_alpha: f64,
    /// Scale hyperparameter of the global shrinkage prior.
    pub t_beta: f64,
    /// Convergence tolerance for the per-sweep difference.
    pub tol: f64,
    /// Sweep budget. The loop always executes at least one sweep.
    pub max_iter: usize,
    pub diff_type: DiffType,
    /// Progress reporting level: negative is fully silent, 0 logs only the
    /// final summary, 1 logs every 10th sweep, anything higher logs every
    /// sweep.
    pub verbose: i32,
    /// When set, Kappa folds the sample size and global scale into the
    /// shrinkage weight instead of using the local scale alone.
    pub alt_kappa: bool,
    /// Zero estimates the global scale tau² each sweep; any positive value
    /// pins tau² there for the whole run.
    pub fixed_tau: f64,
}

impl Default for HorseshoeConfig {
    fn default() -> Self {
        Self {
            t_alpha: 1.0,
            t_beta: 1.0,
            tol: 1e-4,
            max_iter: 200,
            diff_type: DiffType::Relative,
            verbose: 1,
            alt_kappa: true,
            fixed_tau: 0.0,
        }
    }
}

/// The fitted artifact: point estimates, the thresholded graph, and the
/// per-sweep diagnostic history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HorseshoeFit {
    /// Estimated covariance matrix, maintained as the running inverse of
    /// `omega` throughout the fit.
    pub sigma: Array2<f64>,
    /// Estimated precision matrix (the MAP point estimate).
    pub omega: Array2<f64>,
    /// Edge-inclusion indicator: exactly 1.0 where a conditional dependence
    /// was detected, 0.0 elsewhere, with a zero diagonal.
    pub theta: Array2<f64>,
    /// Shrinkage weights in (0, 1); values near 1 mean the corresponding
    /// precision entry was shrunk toward zero.
    pub kappa: Array2<f64>,
    /// tau² after each executed sweep. Length `max_iter`, zero-filled past
    /// the executed count.
    pub taus: Array1<f64>,
    /// Convergence metric after each executed sweep, padded like `taus`.
    pub diffs: Array1<f64>,
    /// Number of sweeps actually executed.
    pub iterations: usize,
    /// Wall-clock time of the whole fit.
    pub elapsed: Duration,
    pub status: FitStatus,
}

impl HorseshoeFit {
    /// True when the fit stopped on tolerance rather than on the budget.
    pub fn converged(&self) -> bool {
        self.status == FitStatus::Converged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_values() {
        let config = HorseshoeConfig::default();
        assert_eq!(config.t_alpha, 1.0);
        assert_eq!(config.t_beta, 1.0);
        assert_eq!(config.tol, 1e-4);
        assert_eq!(config.max_iter, 200);
        assert_eq!(config.diff_type, DiffType::Relative);
        assert_eq!(config.verbose, 1);
        assert!(config.alt_kappa);
        assert_eq!(config.fixed_tau, 0.0);
    }

    #[test]
    fn config_round_trips_through_serde() {
        let config = HorseshoeConfig {
            diff_type: DiffType::Absolute,
            fixed_tau: 0.25,
            ..HorseshoeConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let restored: HorseshoeConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.diff_type, DiffType::Absolute);
        assert_eq!(restored.fixed_tau, 0.25);
        assert_eq!(restored.max_iter, config.max_iter);
    }
}
