//! folded_normal::errors — domain and convergence errors for the folded
//! normal distribution functions.
//!
//! Purpose
//! -------
//! Report out-of-range arguments to `cdf`, `quantile`, and the threshold
//! inversions with the offending value embedded in the message, and wrap
//! root-finder failures so that callers can tell a domain problem from a
//! numerical one.
//!
//! Conventions
//! -----------
//! - Argument errors classify as [`ErrorKind::Domain`]; wrapped
//!   [`OptError`] values keep their own classification.
//! - Messages are phrased as constraints ("sd must be strictly positive,
//!   got -1").

use crate::{errors::ErrorKind, optimization::OptError};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type FoldedNormalResult<T> = Result<T, FoldedNormalError>;

/// FoldedNormalError — failures of the folded-normal functions.
///
/// Variants
/// --------
/// - `InvalidScale(sd)`: σ ≤ 0 or non-finite.
/// - `NegativeArgument(x)`: CDF evaluated below the support [0, ∞).
/// - `InvalidProbability(p)`: quantile level outside (0, 1).
/// - `InvalidAlpha(alpha)`: threshold-inversion level outside (0, 1).
/// - `NonFinite { name, value }`: a location or statistic is NaN or ±∞.
/// - `LengthMismatch { p, mean, sd }`: element-wise inputs of unequal length.
/// - `Solver(OptError)`: the root finder failed (bracketing or iteration
///   cap); carries the best estimate when one exists.
#[derive(Debug, Clone, PartialEq)]
pub enum FoldedNormalError {
    InvalidScale(f64),
    NegativeArgument(f64),
    InvalidProbability(f64),
    InvalidAlpha(f64),
    NonFinite { name: &'static str, value: f64 },
    LengthMismatch { p: usize, mean: usize, sd: usize },
    Solver(OptError),
}

impl FoldedNormalError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FoldedNormalError::Solver(err) => match err.kind() {
                ErrorKind::Validation => ErrorKind::Domain,
                other => other,
            },
            _ => ErrorKind::Domain,
        }
    }
}

impl std::error::Error for FoldedNormalError {}

impl std::fmt::Display for FoldedNormalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FoldedNormalError::InvalidScale(sd) => {
                write!(f, "sd must be strictly positive and finite, got {sd}")
            }
            FoldedNormalError::NegativeArgument(x) => {
                write!(f, "x must be non-negative (support is [0, inf)), got {x}")
            }
            FoldedNormalError::InvalidProbability(p) => {
                write!(f, "p must lie strictly between 0 and 1, got {p}")
            }
            FoldedNormalError::InvalidAlpha(alpha) => {
                write!(f, "alpha must lie strictly between 0 and 1, got {alpha}")
            }
            FoldedNormalError::NonFinite { name, value } => {
                write!(f, "{name} must be finite, got {value}")
            }
            FoldedNormalError::LengthMismatch { p, mean, sd } => {
                write!(f, "p, mean and sd must have equal lengths, got {p}, {mean} and {sd}")
            }
            FoldedNormalError::Solver(err) => write!(f, "Folded normal root finding failed: {err}"),
        }
    }
}

impl From<OptError> for FoldedNormalError {
    fn from(err: OptError) -> Self {
        FoldedNormalError::Solver(err)
    }
}

#[cfg(feature = "python-bindings")]
impl From<FoldedNormalError> for PyErr {
    fn from(err: FoldedNormalError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
