//! Input validation and sufficient statistics.
//!
//! The observation matrix is the only data the estimator ever reads, and it
//! is reduced to the scatter matrix `S = XᵗX` exactly once before the sweep
//! loop starts. Failures here are assumed to be caller errors, so the
//! `DataError` variants name the offending dimension or entry directly.

use ndarray::{Array2, ArrayView2};
use thiserror::Error;

/// Validation failures for the observation matrix.
#[derive(Error, Debug)]
pub enum DataError {
    #[error(
        "The observation matrix has {found} column(s), but the per-variable update needs at least 2 variables."
    )]
    TooFewVariables { found: usize },

    #[error("The observation matrix has no rows. At least one observation is required.")]
    NoObservations,

    #[error(
        "Non-finite value (NaN or Infinity) at row {row}, column {col} of the observation matrix. All observations must be finite."
    )]
    NonFiniteData { row: usize, col: usize },
}

/// Checks the observation matrix once, before any estimator state is built.
pub fn validate_observations(x: ArrayView2<f64>) -> Result<(), DataError> {
    if x.nrows() == 0 {
        return Err(DataError::NoObservations);
    }
    if x.ncols() < 2 {
        return Err(DataError::TooFewVariables { found: x.ncols() });
    }
    for ((row, col), &value) in x.indexed_iter() {
        if !value.is_finite() {
            return Err(DataError::NonFiniteData { row, col });
        }
    }
    Ok(())
}

/// Computes the scatter matrix `S = XᵗX`.
///
/// The result is symmetric positive semi-definite and is frozen for the
/// whole run; every column update reads its sub-blocks but never writes it.
pub fn scatter_matrix(x: ArrayView2<f64>) -> Array2<f64> {
    x.t().dot(&x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn scatter_matrix_matches_hand_computation() {
        let x = arr2(&[[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]]);
        let s = scatter_matrix(x.view());

        assert_abs_diff_eq!(s[[0, 0]], 35.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[[0, 1]], 44.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[[1, 0]], 44.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[[1, 1]], 56.0, epsilon = 1e-12);
    }

    #[test]
    fn scatter_matrix_is_symmetric() {
        let x = arr2(&[
            [0.3, -1.2, 2.0],
            [1.1, 0.4, -0.7],
            [-0.5, 0.9, 0.2],
            [2.2, -0.1, 1.4],
        ]);
        let s = scatter_matrix(x.view());
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(s[[i, j]], s[[j, i]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn rejects_empty_matrix() {
        let x = Array2::<f64>::zeros((0, 3));
        assert!(matches!(
            validate_observations(x.view()),
            Err(DataError::NoObservations)
        ));
    }

    #[test]
    fn rejects_single_variable() {
        let x = Array2::<f64>::zeros((10, 1));
        assert!(matches!(
            validate_observations(x.view()),
            Err(DataError::TooFewVariables { found: 1 })
        ));
    }

    #[test]
    fn rejects_non_finite_entries_with_position() {
        let mut x = Array2::<f64>::zeros((4, 3));
        x[[2, 1]] = f64::NAN;
        assert!(matches!(
            validate_observations(x.view()),
            Err(DataError::NonFiniteData { row: 2, col: 1 })
        ));

        let mut x = Array2::<f64>::zeros((4, 3));
        x[[0, 2]] = f64::INFINITY;
        assert!(matches!(
            validate_observations(x.view()),
            Err(DataError::NonFiniteData { row: 0, col: 2 })
        ));
    }

    #[test]
    fn accepts_well_formed_matrix() {
        let x = arr2(&[[0.1, -0.2], [1.5, 0.3]]);
        assert!(validate_observations(x.view()).is_ok());
    }
}
