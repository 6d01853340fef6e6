//! panel::errors — validation errors for raw panel input, panel options,
//! and the simulation generator.
//!
//! Every variant classifies as [`ErrorKind::Validation`]: these checks run
//! eagerly, before any numerical work.

use crate::errors::ErrorKind;

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type PanelResult<T> = Result<T, PanelError>;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelError {
    // ---- Raw input ----
    /// The panel has no rows.
    EmptyPanel,
    /// A column has a different length than the outcome.
    LengthMismatch {
        field: &'static str,
        expected: usize,
        found: usize,
    },
    /// The group column contains a value other than 0 or 1.
    InvalidGroupValue {
        value: f64,
    },
    /// An individual switches group across periods.
    GroupNotConstant {
        id: i64,
    },
    /// An (id, period) pair appears more than once.
    DuplicateObservation {
        id: i64,
        period: f64,
    },

    // ---- Period selection ----
    /// Fewer than two pre-treatment periods.
    TooFewPeriods {
        found: usize,
    },
    /// An explicit pre-treatment period does not occur in the data.
    PeriodNotObserved {
        period: f64,
    },
    /// The explicit base period is not one of the pre-treatment periods.
    BaseNotInPretreatment {
        base: f64,
    },
    /// An option value is NaN or infinite.
    NonFiniteOption {
        name: &'static str,
        value: f64,
    },

    // ---- After filtering ----
    /// No observations remain after dropping missing rows and filtering.
    NoObservations,
    /// Every remaining individual is in the same group.
    MissingGroup {
        treated: bool,
    },
    /// A unit subsample is too small to estimate the placebo model.
    SubsampleTooSmall {
        treated: usize,
        control: usize,
    },

    // ---- Simulation ----
    /// A simulation parameter violates its documented range.
    InvalidSimulationParam {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },
}

impl PanelError {
    /// Coarse classification of this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::Validation
    }
}

impl std::error::Error for PanelError {}

impl std::fmt::Display for PanelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // ---- Raw input ----
            PanelError::EmptyPanel => write!(f, "Panel must contain at least one row"),
            PanelError::LengthMismatch { field, expected, found } => write!(
                f,
                "Column '{field}' has length {found}, expected {expected} (length of outcome)"
            ),
            PanelError::InvalidGroupValue { value } => {
                write!(f, "Group variable must be binary (0 or 1), got {value}")
            }
            PanelError::GroupNotConstant { id } => {
                write!(f, "Group membership must be constant within individual {id}")
            }
            PanelError::DuplicateObservation { id, period } => {
                write!(f, "Individual {id} has more than one observation in period {period}")
            }

            // ---- Period selection ----
            PanelError::TooFewPeriods { found } => write!(
                f,
                "At least 2 unique pre-treatment periods are required, found {found}"
            ),
            PanelError::PeriodNotObserved { period } => {
                write!(f, "Pre-treatment period {period} does not occur in the data")
            }
            PanelError::BaseNotInPretreatment { base } => {
                write!(f, "Base period {base} is not one of the pre-treatment periods")
            }
            PanelError::NonFiniteOption { name, value } => {
                write!(f, "Option '{name}' must be finite, got {value}")
            }

            // ---- After filtering ----
            PanelError::NoObservations => {
                write!(f, "No observations remain after dropping missing values and filtering")
            }
            PanelError::MissingGroup { treated } => {
                let which = if *treated { "treated" } else { "control" };
                write!(f, "No {which} individuals remain in the selected periods")
            }
            PanelError::SubsampleTooSmall { treated, control } => write!(
                f,
                "Subsample has {treated} treated and {control} control individuals; at least one of each is required"
            ),

            // ---- Simulation ----
            PanelError::InvalidSimulationParam { name, value, reason } => {
                write!(f, "Invalid simulation parameter '{name}' = {value}: {reason}")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<PanelError> for PyErr {
    fn from(err: PanelError) -> PyErr {
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
    // - Payload embedding in `Display` messages for representative variants.
    // - The uniform validation classification.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // A non-binary group value is named in the message.
    //
    // Given
    // -----
    // - `InvalidGroupValue { value: 2.0 }`.
    //
    // Expect
    // ------
    // - The message contains "2" and the error is a validation error.
    fn invalid_group_value_message_names_value() {
        // Arrange
        let err = PanelError::InvalidGroupValue { value: 2.0 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains("binary"), "Got: {msg}");
        assert!(msg.contains('2'), "Got: {msg}");
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[test]
    // Purpose
    // -------
    // Length mismatches report the field and both lengths.
    fn length_mismatch_message_names_field_and_lengths() {
        let err = PanelError::LengthMismatch { field: "period", expected: 10, found: 9 };
        let msg = err.to_string();
        assert!(msg.contains("period") && msg.contains("10") && msg.contains('9'), "Got: {msg}");
    }
}
