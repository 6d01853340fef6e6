//! estimation — demeaning, design construction, and placebo regressions.
//!
//! Purpose
//! -------
//! Turn a [`ProcessedPanel`](crate::panel::ProcessedPanel) into demeaned
//! [`DesignMatrices`] and estimate the placebo coefficients, both
//! unconstrained ([`estimate_placebo`]) and on the null boundary
//! ([`estimate_constrained`]).
//!
//! Key behaviors
//! -------------
//! - Two-way fixed effects are removed by alternating one-way demeaning
//!   ([`demean`]), exact on balanced panels and iterated on unbalanced ones.
//! - Collinear columns are screened by an in-order pivoted Cholesky on X'X
//!   and dropped with a warning; the remaining system is solved without any
//!   pseudo-inverse.
//!
//! Downstream usage
//! ----------------
//! - `inference` consumes [`DesignMatrices`] and [`PlaceboFit`] to build
//!   covariance matrices.
//! - `statistical_tests` calls [`estimate_placebo`] for every test and
//!   [`estimate_constrained`] for the bootstrap max tests.
pub mod constrained;
pub mod demean;
pub mod design;
pub mod errors;
pub mod linalg;
pub mod placebo;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::constrained::{ConstrainedFit, estimate_constrained};
pub use self::demean::{
    between_transform, construct_w, double_demean, double_demean_vec, grouped_mean, sigma_hathat_c,
};
pub use self::design::DesignMatrices;
pub use self::errors::{EstimationError, EstimationResult};
pub use self::placebo::{PlaceboFit, estimate_placebo, fit_ols};
