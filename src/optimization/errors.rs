//! optimization::errors — error type for the scalar root finder.
//!
//! Wraps option validation failures, bracketing failures, non-finite
//! objective values, iteration-cap exhaustion, and the `argmin` error
//! family (downcast from `argmin::core::Error`).
use argmin::core::{ArgminError, Error};

use crate::errors::ErrorKind;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

/// Crate-wide result alias for root-finding operations.
pub type OptResult<T> = Result<T, OptError>;

#[derive(Debug, Clone, PartialEq)]
pub enum OptError {
    // ---- RootOptions ----
    /// Absolute tolerance needs to be positive and finite.
    InvalidTolerance {
        tol: f64,
        reason: &'static str,
    },
    /// Maximum iterations needs to be positive.
    InvalidMaxIter {
        max_iter: usize,
        reason: &'static str,
    },

    // ---- Bracketing ----
    /// Bracket endpoints must be finite with lo < hi.
    InvalidBracket {
        lo: f64,
        hi: f64,
    },
    /// No sign change was found after expanding the upper endpoint.
    RootNotBracketed {
        lo: f64,
        hi: f64,
        f_lo: f64,
        f_hi: f64,
    },

    // ---- Objective ----
    /// The objective returned a non-finite value.
    NonFiniteCost {
        value: f64,
    },

    // ---- Outcome ----
    /// The solver hit its iteration cap before converging.
    MaxItersReached {
        iterations: u64,
        best: f64,
    },
    /// The solver returned without a parameter estimate.
    MissingRoot,

    // ---- Argmin ---
    /// Wrapper for argmin::InvalidParameter
    InvalidParameter {
        text: String,
    },
    /// Wrapper for argmin::NotImplemented
    NotImplemented {
        text: String,
    },
    /// Wrapper for argmin::NotInitialized
    NotInitialized {
        text: String,
    },
    /// Wrapper for argmin::ConditionViolated
    ConditionViolated {
        text: String,
    },
    /// Wrapper for argmin::PotentialBug
    PotentialBug {
        text: String,
    },
    /// Wrapper for other argmin::Error types
    BackendError {
        text: String,
    },

    // ---- Fallback ----
    UnknownError,
}

impl OptError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OptError::InvalidTolerance { .. }
            | OptError::InvalidMaxIter { .. }
            | OptError::InvalidBracket { .. } => ErrorKind::Validation,
            _ => ErrorKind::Convergence,
        }
    }
}

impl std::error::Error for OptError {}

impl std::fmt::Display for OptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- RootOptions ----
            OptError::InvalidTolerance { tol, reason } => {
                write!(f, "Invalid root-finding tolerance {tol}: {reason}")
            }
            OptError::InvalidMaxIter { max_iter, reason } => {
                write!(f, "Invalid maximum iterations {max_iter}: {reason}")
            }

            // ---- Bracketing ----
            OptError::InvalidBracket { lo, hi } => {
                write!(f, "Invalid bracket [{lo}, {hi}]: endpoints must be finite with lo < hi")
            }
            OptError::RootNotBracketed { lo, hi, f_lo, f_hi } => write!(
                f,
                "Root not bracketed on [{lo}, {hi}]: f(lo) = {f_lo}, f(hi) = {f_hi} have the same sign"
            ),

            // ---- Objective ----
            OptError::NonFiniteCost { value } => {
                write!(f, "Non-finite objective value: {value}")
            }

            // ---- Outcome ----
            OptError::MaxItersReached { iterations, best } => write!(
                f,
                "Root finder did not converge within {iterations} iterations (best estimate {best})"
            ),
            OptError::MissingRoot => {
                write!(f, "Root finder returned no estimate")
            }

            // ---- Argmin ----
            OptError::InvalidParameter { text } => {
                write!(f, "Invalid parameter: {text}")
            }
            OptError::NotImplemented { text } => {
                write!(f, "Not implemented: {text}")
            }
            OptError::NotInitialized { text } => {
                write!(f, "Not initialized: {text}")
            }
            OptError::ConditionViolated { text } => {
                write!(f, "Condition violated: {text}")
            }
            OptError::PotentialBug { text } => {
                write!(f, "Potential bug: {text}")
            }
            OptError::BackendError { text } => {
                write!(f, "Backend error: {text}")
            }

            // ---- Fallback ----
            OptError::UnknownError => {
                write!(f, "Unknown error")
            }
        }
    }
}

impl From<Error> for OptError {
    fn from(original_err: Error) -> Self {
        if let Some(opt_err) = original_err.downcast_ref::<OptError>() {
            return opt_err.clone();
        }
        match original_err.downcast() {
            Ok(argmin_err) => match argmin_err {
                ArgminError::InvalidParameter { text } => OptError::InvalidParameter { text },
                ArgminError::NotImplemented { text } => OptError::NotImplemented { text },
                ArgminError::NotInitialized { text } => OptError::NotInitialized { text },
                ArgminError::ConditionViolated { text } => OptError::ConditionViolated { text },
                ArgminError::PotentialBug { text } => OptError::PotentialBug { text },
                _ => OptError::UnknownError,
            },
            Err(err) => OptError::BackendError { text: err.to_string() },
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<OptError> for PyErr {
    fn from(err: OptError) -> PyErr {
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
    // - Payload embedding in `Display` messages.
    // - Round-tripping an `OptError` through `argmin::core::Error`.
    // - Classification via `kind()`.
    //
    // They intentionally DO NOT cover:
    // - The PyO3 conversion, which needs the Python C API.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // `MaxItersReached` reports both the iteration count and the best
    // estimate.
    //
    // Given
    // -----
    // - iterations = 200, best = 0.25.
    //
    // Expect
    // ------
    // - The message contains "200" and "0.25".
    fn max_iters_reached_display_includes_iterations_and_best() {
        // Arrange
        let err = OptError::MaxItersReached { iterations: 200, best: 0.25 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("200"), "Got: {msg}");
        assert!(msg.contains("0.25"), "Got: {msg}");
        assert_eq!(err.kind(), ErrorKind::Convergence);
    }

    #[test]
    // Purpose
    // -------
    // An `OptError` raised inside an argmin callback survives the trip
    // through `argmin::core::Error` unchanged.
    //
    // Given
    // -----
    // - `OptError::NonFiniteCost { value: NaN }` converted into `Error`.
    //
    // Expect
    // ------
    // - Converting back yields `NonFiniteCost`.
    fn opt_error_round_trips_through_argmin_error() {
        // Arrange
        let wrapped: Error = OptError::NonFiniteCost { value: f64::INFINITY }.into();

        // Act
        let back = OptError::from(wrapped);

        // Assert
        assert!(matches!(back, OptError::NonFiniteCost { value } if value.is_infinite()));
    }

    #[test]
    // Purpose
    // -------
    // Bracket and option errors classify as validation failures.
    fn invalid_bracket_is_validation_kind() {
        let err = OptError::InvalidBracket { lo: 1.0, hi: 0.0 };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("[1, 0]"));
    }
}
