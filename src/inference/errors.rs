//! Unified error handling for variance estimation.
//!
//! This module defines `InferenceError`, the error type used by the
//! OLS / heteroskedasticity-robust / cluster-robust covariance estimators
//! and the variance-kind parser. An alias `InferenceResult<T>` standardizes
//! the return type across inference code.

use crate::errors::ErrorKind;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Unified error type for variance estimation.
///
/// Covers unknown estimator names, degenerate leverage, too few clusters,
/// non-positive degrees of freedom, and non-positive variances. Integrates
/// with `anyhow::Error` via `From` and gives readable diagnostics through
/// `Display`.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceError {
    // ---- Configuration ----
    /// The variance-kind name is not recognized.
    UnknownVceKind {
        name: String,
    },

    /// A cluster vector has the wrong length.
    ClusterLengthMismatch {
        expected: usize,
        found: usize,
    },

    /// Cluster-robust variance with fewer than two clusters.
    TooFewClusters {
        found: usize,
    },

    // ---- Numerical degeneracies ----
    /// Residual degrees of freedom are not positive.
    NonPositiveDof {
        dof: i64,
    },

    /// A leverage value is numerically 1, so the HC2 / HC3 weight is
    /// undefined.
    DegenerateLeverage {
        row: usize,
        leverage: f64,
    },

    /// A diagonal entry of the covariance matrix is non-positive or
    /// non-finite.
    NonPositiveVariance {
        index: usize,
        value: f64,
    },

    // ---- Anyhow catchall ----
    Anyhow(String),

    // ---- Fallback ----
    UnknownError,
}

pub type InferenceResult<T> = Result<T, InferenceError>;

impl InferenceError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            InferenceError::UnknownVceKind { .. }
            | InferenceError::ClusterLengthMismatch { .. }
            | InferenceError::TooFewClusters { .. }
            | InferenceError::NonPositiveDof { .. } => ErrorKind::Validation,
            InferenceError::DegenerateLeverage { .. }
            | InferenceError::NonPositiveVariance { .. } => ErrorKind::SingularMatrix,
            InferenceError::Anyhow(_) | InferenceError::UnknownError => ErrorKind::Domain,
        }
    }
}

impl From<anyhow::Error> for InferenceError {
    fn from(err: anyhow::Error) -> Self {
        InferenceError::Anyhow(err.to_string())
    }
}

impl std::error::Error for InferenceError {}

impl std::fmt::Display for InferenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Configuration ----
            InferenceError::UnknownVceKind { name } => write!(
                f,
                "Inference Error: unknown variance estimator '{name}' (expected ols, hc1, hc2, hc3, cr0 or cr1)"
            ),
            InferenceError::ClusterLengthMismatch { expected, found } => write!(
                f,
                "Inference Error: cluster vector has length {found}, expected {expected}"
            ),
            InferenceError::TooFewClusters { found } => write!(
                f,
                "Inference Error: cluster-robust variance needs at least 2 clusters, found {found}"
            ),

            // ---- Numerical degeneracies ----
            InferenceError::NonPositiveDof { dof } => {
                write!(f, "Inference Error: residual degrees of freedom must be positive, got {dof}")
            }
            InferenceError::DegenerateLeverage { row, leverage } => write!(
                f,
                "Inference Error: leverage of observation {row} is {leverage}; HC2/HC3 weights are undefined"
            ),
            InferenceError::NonPositiveVariance { index, value } => write!(
                f,
                "Inference Error: variance of coefficient {index} is {value}, expected a positive finite value"
            ),

            // ---- Anyhow catchall ----
            InferenceError::Anyhow(msg) => write!(f, "Inference Error: {msg}"),

            // ---- Fallback ----
            InferenceError::UnknownError => write!(f, "Inference Error: Unknown error occurred"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<InferenceError> for PyErr {
    fn from(err: InferenceError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Configuration problems are validation errors; numerical degeneracies
    // are singular-matrix errors.
    fn kind_separates_configuration_from_degeneracy() {
        assert_eq!(InferenceError::TooFewClusters { found: 1 }.kind(), ErrorKind::Validation);
        assert_eq!(
            InferenceError::NonPositiveVariance { index: 0, value: -1.0 }.kind(),
            ErrorKind::SingularMatrix
        );
    }

    #[test]
    // Purpose
    // -------
    // The unknown-name message echoes the name.
    fn unknown_vce_message_echoes_name() {
        let msg = InferenceError::UnknownVceKind { name: "hc9".into() }.to_string();
        assert!(msg.contains("hc9"), "Got: {msg}");
    }
}
