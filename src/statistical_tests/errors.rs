//! statistical_tests::errors — top-level error type for equivalence tests.
//!
//! Purpose
//! -------
//! Provide one error enum, [`EquivalenceError`], for the max, mean and RMS
//! tests. It wraps the subtree errors (panel, estimation, inference,
//! folded normal, root finding) and adds the test-level validation and
//! convergence failures, so a caller sees a single `Result` type.
//!
//! Key behaviors
//! -------------
//! - `From` impls for every subtree error let `?` lift failures unchanged.
//! - [`EquivalenceError::kind`] exposes the four-way taxonomy
//!   (validation, singular matrix, convergence, domain), delegating to the
//!   wrapped error where there is one.
//! - `From<EquivalenceError> for PyErr` maps every failure to
//!   `PyValueError` with the `Display` message.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of the violated constraint and include
//!   the offending value ("alpha must lie in (0, 1), got 1.5").
use crate::{
    errors::ErrorKind,
    estimation::EstimationError,
    folded_normal::FoldedNormalError,
    inference::InferenceError,
    optimization::OptError,
    panel::PanelError,
};

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type EquivalenceResult<T> = Result<T, EquivalenceError>;

/// EquivalenceError — failures of the equivalence tests.
///
/// Variants
/// --------
/// - Wrapped subtree errors: `Panel`, `Estimation`, `Inference`,
///   `FoldedNormal`, `Optimization`.
/// - Option validation: `InvalidAlpha`, `InvalidThreshold`,
///   `InvalidReplications`, `InvalidSubsamples`, `UnsupportedAlpha`,
///   `InvalidFailureFraction`, `InvalidSearchTolerance`, `UnknownMethod`.
/// - Runtime: `BootstrapFailures`, `ConstrainedNotConverged`,
///   `SubsampleLostPlacebo`, `SearchNotBracketed`.
#[derive(Debug, Clone, PartialEq)]
pub enum EquivalenceError {
    // ---- Wrapped ----
    Panel(PanelError),
    Estimation(EstimationError),
    Inference(InferenceError),
    FoldedNormal(FoldedNormalError),
    Optimization(OptError),

    // ---- Option validation ----
    /// Significance level outside (0, 1).
    InvalidAlpha {
        alpha: f64,
    },
    /// Equivalence threshold not strictly positive and finite.
    InvalidThreshold {
        name: &'static str,
        value: f64,
    },
    /// Fewer bootstrap replications than the minimum.
    InvalidReplications {
        replications: usize,
        min: usize,
    },
    /// Number of RMS subsamples outside the tabulated range.
    InvalidSubsamples {
        subsamples: usize,
    },
    /// RMS α not among the tabulated levels.
    UnsupportedAlpha {
        alpha: f64,
    },
    /// Allowed failure fraction outside [0, 1).
    InvalidFailureFraction {
        value: f64,
    },
    /// Bootstrap search tolerance not strictly positive and finite.
    InvalidSearchTolerance {
        value: f64,
    },
    /// Unrecognized max-test method name.
    UnknownMethod {
        name: String,
    },

    // ---- Runtime ----
    /// Too many bootstrap replications produced non-finite estimates.
    BootstrapFailures {
        failed: usize,
        replications: usize,
        max_fraction: f64,
    },
    /// The constrained fit missed the null boundary.
    ConstrainedNotConverged {
        delta: f64,
        residual: f64,
    },
    /// An RMS subsample lost placebo columns to collinearity.
    SubsampleLostPlacebo {
        subsample: usize,
        expected: usize,
        found: usize,
    },
    /// The bootstrap threshold search never found a rejecting upper bound.
    SearchNotBracketed {
        hi: f64,
    },
}

impl EquivalenceError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EquivalenceError::Panel(err) => err.kind(),
            EquivalenceError::Estimation(err) => err.kind(),
            EquivalenceError::Inference(err) => err.kind(),
            EquivalenceError::FoldedNormal(err) => err.kind(),
            EquivalenceError::Optimization(err) => err.kind(),
            EquivalenceError::InvalidAlpha { .. }
            | EquivalenceError::InvalidThreshold { .. }
            | EquivalenceError::InvalidReplications { .. }
            | EquivalenceError::InvalidSubsamples { .. }
            | EquivalenceError::UnsupportedAlpha { .. }
            | EquivalenceError::InvalidFailureFraction { .. }
            | EquivalenceError::InvalidSearchTolerance { .. }
            | EquivalenceError::UnknownMethod { .. }
            | EquivalenceError::SubsampleLostPlacebo { .. } => ErrorKind::Validation,
            EquivalenceError::BootstrapFailures { .. }
            | EquivalenceError::ConstrainedNotConverged { .. }
            | EquivalenceError::SearchNotBracketed { .. } => ErrorKind::Convergence,
        }
    }
}

impl From<PanelError> for EquivalenceError {
    fn from(err: PanelError) -> Self {
        EquivalenceError::Panel(err)
    }
}

impl From<EstimationError> for EquivalenceError {
    fn from(err: EstimationError) -> Self {
        match err {
            EstimationError::Panel(inner) => EquivalenceError::Panel(inner),
            other => EquivalenceError::Estimation(other),
        }
    }
}

impl From<InferenceError> for EquivalenceError {
    fn from(err: InferenceError) -> Self {
        EquivalenceError::Inference(err)
    }
}

impl From<FoldedNormalError> for EquivalenceError {
    fn from(err: FoldedNormalError) -> Self {
        EquivalenceError::FoldedNormal(err)
    }
}

impl From<OptError> for EquivalenceError {
    fn from(err: OptError) -> Self {
        EquivalenceError::Optimization(err)
    }
}

impl std::error::Error for EquivalenceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EquivalenceError::Panel(err) => Some(err),
            EquivalenceError::Estimation(err) => Some(err),
            EquivalenceError::Inference(err) => Some(err),
            EquivalenceError::FoldedNormal(err) => Some(err),
            EquivalenceError::Optimization(err) => Some(err),
            _ => None,
        }
    }
}

impl std::fmt::Display for EquivalenceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Wrapped ----
            EquivalenceError::Panel(err) => write!(f, "{err}"),
            EquivalenceError::Estimation(err) => write!(f, "{err}"),
            EquivalenceError::Inference(err) => write!(f, "{err}"),
            EquivalenceError::FoldedNormal(err) => write!(f, "{err}"),
            EquivalenceError::Optimization(err) => write!(f, "{err}"),

            // ---- Option validation ----
            EquivalenceError::InvalidAlpha { alpha } => {
                write!(f, "alpha must lie in (0, 1), got {alpha}")
            }
            EquivalenceError::InvalidThreshold { name, value } => {
                write!(f, "{name} must be strictly positive and finite, got {value}")
            }
            EquivalenceError::InvalidReplications { replications, min } => {
                write!(f, "at least {min} bootstrap replications are required, got {replications}")
            }
            EquivalenceError::InvalidSubsamples { subsamples } => {
                write!(f, "number of RMS subsamples must lie in 2..=10, got {subsamples}")
            }
            EquivalenceError::UnsupportedAlpha { alpha } => write!(
                f,
                "RMS test supports alpha in {{0.01, 0.025, 0.05, 0.1, 0.2}}, got {alpha}"
            ),
            EquivalenceError::InvalidFailureFraction { value } => {
                write!(f, "max_failure_fraction must lie in [0, 1), got {value}")
            }
            EquivalenceError::InvalidSearchTolerance { value } => {
                write!(f, "search tolerance must be strictly positive and finite, got {value}")
            }
            EquivalenceError::UnknownMethod { name } => write!(
                f,
                "unknown max-test method '{name}' (expected iu, boot or wild)"
            ),

            // ---- Runtime ----
            EquivalenceError::BootstrapFailures { failed, replications, max_fraction } => write!(
                f,
                "{failed} of {replications} bootstrap replications failed, more than the allowed fraction {max_fraction}"
            ),
            EquivalenceError::ConstrainedNotConverged { delta, residual } => write!(
                f,
                "constrained estimate at delta = {delta} did not converge (boundary residual {residual:e})"
            ),
            EquivalenceError::SubsampleLostPlacebo { subsample, expected, found } => write!(
                f,
                "RMS subsample {subsample} identifies {found} of {expected} placebo coefficients"
            ),
            EquivalenceError::SearchNotBracketed { hi } => write!(
                f,
                "bootstrap threshold search found no rejecting threshold up to {hi}"
            ),
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<EquivalenceError> for PyErr {
    fn from(err: EquivalenceError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Kind delegation for wrapped errors.
    // - Kinds of test-level variants.
    // - Flattening of panel errors raised inside estimation.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Wrapped errors keep the classification of their source.
    fn kind_delegates_to_wrapped_errors() {
        let singular: EquivalenceError =
            EstimationError::NoPlaceboColumns { dropped: vec![] }.into();
        assert_eq!(singular.kind(), ErrorKind::SingularMatrix);
        let domain: EquivalenceError = FoldedNormalError::InvalidScale(-1.0).into();
        assert_eq!(domain.kind(), ErrorKind::Domain);
    }

    #[test]
    // Purpose
    // -------
    // Test-level variants classify as validation or convergence errors.
    fn kind_classifies_test_level_variants() {
        assert_eq!(EquivalenceError::InvalidAlpha { alpha: 0.7 }.kind(), ErrorKind::Validation);
        assert_eq!(
            EquivalenceError::BootstrapFailures { failed: 20, replications: 100, max_fraction: 0.1 }
                .kind(),
            ErrorKind::Convergence
        );
    }

    #[test]
    // Purpose
    // -------
    // A panel error raised by estimation surfaces as a panel error.
    fn estimation_panel_errors_are_flattened() {
        let err: EquivalenceError = EstimationError::Panel(PanelError::NoObservations).into();
        assert_eq!(err, EquivalenceError::Panel(PanelError::NoObservations));
        assert!(err.to_string().contains("No observations"));
    }
}
