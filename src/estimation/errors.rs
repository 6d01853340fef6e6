//! estimation::errors — failures of the demeaning transform and the
//! placebo regressions.
//!
//! Variants are grouped by stage. [`EstimationError::kind`] maps them onto
//! the crate-wide [`ErrorKind`] taxonomy: rank and factorization failures
//! are singular-matrix errors, a stalled demeaning sweep is a convergence
//! error, and bad arguments are validation errors.
use crate::{errors::ErrorKind, panel::PanelError};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type EstimationResult<T> = Result<T, EstimationError>;

#[derive(Debug, Clone, PartialEq)]
pub enum EstimationError {
    // ---- Design construction ----
    /// A column has a different number of rows than the outcome.
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    /// Alternating demeaning sweeps did not settle within the cap.
    DemeanNotConverged {
        sweeps: usize,
        change: f64,
    },

    // ---- Least squares ----
    /// Every placebo column is collinear with the fixed effects or with
    /// earlier columns.
    NoPlaceboColumns {
        dropped: Vec<f64>,
    },
    /// A Gram matrix that passed the rank screen failed to factorize.
    SingularSystem {
        context: &'static str,
    },
    /// Residual degrees of freedom are not positive.
    NonPositiveDof {
        n_obs: usize,
        absorbed: usize,
    },

    // ---- Constrained fit ----
    /// The equivalence threshold is not strictly positive and finite.
    InvalidThreshold {
        delta: f64,
    },

    // ---- Subsamples ----
    /// Re-processing a unit subsample failed.
    Panel(PanelError),

    // ---- Anyhow catchall ----
    Anyhow(String),
}

impl EstimationError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EstimationError::NoPlaceboColumns { .. } | EstimationError::SingularSystem { .. } => {
                ErrorKind::SingularMatrix
            }
            EstimationError::DemeanNotConverged { .. } | EstimationError::Anyhow(_) => {
                ErrorKind::Convergence
            }
            EstimationError::Panel(err) => err.kind(),
            EstimationError::DimensionMismatch { .. }
            | EstimationError::NonPositiveDof { .. }
            | EstimationError::InvalidThreshold { .. } => ErrorKind::Validation,
        }
    }
}

impl From<PanelError> for EstimationError {
    fn from(err: PanelError) -> Self {
        EstimationError::Panel(err)
    }
}

impl From<anyhow::Error> for EstimationError {
    fn from(err: anyhow::Error) -> Self {
        EstimationError::Anyhow(err.to_string())
    }
}

impl std::error::Error for EstimationError {}

impl std::fmt::Display for EstimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Design construction ----
            EstimationError::DimensionMismatch { what, expected, found } => {
                write!(f, "Estimation Error: '{what}' has {found} rows, expected {expected}")
            }
            EstimationError::DemeanNotConverged { sweeps, change } => write!(
                f,
                "Estimation Error: two-way demeaning did not converge after {sweeps} sweeps (last change {change:e})"
            ),

            // ---- Least squares ----
            EstimationError::NoPlaceboColumns { dropped } => write!(
                f,
                "Estimation Error: all placebo columns are collinear (dropped periods {dropped:?})"
            ),
            EstimationError::SingularSystem { context } => {
                write!(f, "Estimation Error: singular matrix in {context}")
            }
            EstimationError::NonPositiveDof { n_obs, absorbed } => write!(
                f,
                "Estimation Error: {n_obs} observations cannot support {absorbed} absorbed parameters"
            ),

            // ---- Constrained fit ----
            EstimationError::InvalidThreshold { delta } => write!(
                f,
                "Estimation Error: equivalence threshold must be strictly positive and finite, got {delta}"
            ),

            // ---- Subsamples ----
            EstimationError::Panel(err) => write!(f, "{err}"),

            // ---- Anyhow catchall ----
            EstimationError::Anyhow(msg) => write!(f, "Estimation Error: {msg}"),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<EstimationError> for PyErr {
    fn from(err: EstimationError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
