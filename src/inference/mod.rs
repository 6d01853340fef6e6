//! inference — covariance estimators for the placebo regression.
//!
//! Purpose
//! -------
//! Provide post-estimation uncertainty for the placebo coefficients: the
//! classical, heteroskedasticity-robust and cluster-robust covariance
//! matrices, their placebo block, and standard errors.
//!
//! Key behaviors
//! -------------
//! - Define a unified error and result type, [`InferenceError`] and
//!   [`InferenceResult`], for configuration and numerical failures.
//! - Enumerate estimator families with [`VceKind`]; string names resolve
//!   through its `FromStr` impl.
//! - Build a [`VarianceEstimate`] via [`estimate_variance`] from a fitted
//!   [`PlaceboFit`](crate::estimation::PlaceboFit) and its design.
//!
//! Invariants & assumptions
//! ------------------------
//! - The bread (X'X)⁻¹ comes from the fit; it is never recomputed here.
//! - Covariance matrices are symmetric with a positive diagonal, otherwise
//!   an error is returned.
//!
//! Conventions
//! -----------
//! - Coefficient order follows the fit: kept placebo coefficients in
//!   ascending period order, then kept covariates.
//! - All functions are pure: no logging and no global state.
//!
//! Downstream usage
//! ----------------
//! - `statistical_tests` calls [`estimate_variance`] once per test and uses
//!   [`VarianceEstimate::placebo_block`] / [`VarianceEstimate::placebo_se`].
pub mod covariance;
pub mod errors;
pub mod vce;

// ---- Re-exports (primary surface) -----------------------------------------

pub use self::covariance::{
    VarianceEstimate, compute_se, contrast_se, estimate_variance, extract_placebo_submatrix,
};
pub use self::errors::{InferenceError, InferenceResult};
pub use self::vce::VceKind;

// ---- Optional convenience prelude for downstream crates ------------------
//
// Downstream crates can `use equitrends::inference::prelude::*;` to import
// the primary inference surface in a single line.

pub mod prelude {
    pub use super::covariance::{VarianceEstimate, estimate_variance};
    pub use super::errors::{InferenceError, InferenceResult};
    pub use super::vce::VceKind;
}
