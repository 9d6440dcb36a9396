#![deny(dead_code)]
#![deny(unused_imports)]

//! # MAP estimation for sparse Gaussian graphical models
//!
//! This crate estimates the precision (inverse covariance) matrix of a
//! multivariate Gaussian under the graphical horseshoe shrinkage prior. The
//! estimate is the posterior mode, found by block-coordinate ascent: each
//! sweep revisits every variable, rewrites that variable's row and column of
//! the precision matrix through a partitioned-matrix identity, and then
//! refreshes the global shrinkage scale. The running covariance matrix is
//! maintained by rank-one block updates rather than re-inversion, so a sweep
//! costs one dense solve per variable.
//!
//! The entry point is [`fit_graphical_horseshoe`]; callers that want custom
//! progress reporting can inject a [`SweepObserver`] through
//! [`fit_graphical_horseshoe_with_observer`].

pub mod data;
pub mod model;
pub mod progress;
pub mod solver;

pub use data::DataError;
pub use model::{DiffType, FitStatus, HorseshoeConfig, HorseshoeFit};
pub use progress::{LogProgress, NoopProgress, SweepObserver};
pub use solver::{EstimationError, fit_graphical_horseshoe, fit_graphical_horseshoe_with_observer};
