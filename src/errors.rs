//! errors — crate-wide error classification.
//!
//! Purpose
//! -------
//! Give every subtree error a common coarse classification so callers can
//! branch on the *kind* of failure without matching on each enum.
//!
//! Key behaviors
//! -------------
//! - [`ErrorKind`] partitions failures into input validation, singular
//!   linear systems, numerical non-convergence, and out-of-domain
//!   distribution arguments.
//! - Each subtree error (`OptError`, `FoldedNormalError`, `PanelError`,
//!   `EstimationError`, `InferenceError`, `EquivalenceError`) exposes a
//!   `kind()` method returning one of these values.
//!
//! Conventions
//! -----------
//! - The classification is lossy by construction; the subtree enums carry
//!   the payloads and human-readable messages.

/// ErrorKind — coarse classification of crate errors.
///
/// Variants
/// --------
/// - `Validation`
///   Malformed or insufficient input: wrong lengths, non-binary groups,
///   too few periods, thresholds ≤ 0, α outside (0, 1), unsupported
///   options.
/// - `SingularMatrix`
///   A design or variance matrix is not invertible, or a variance
///   diagonal is degenerate.
/// - `Convergence`
///   A root finder, demeaning sweep, constrained fit, or bootstrap run
///   exceeded its iteration or failure budget.
/// - `Domain`
///   Out-of-range arguments to the folded-normal distribution functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    SingularMatrix,
    Convergence,
    Domain,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Validation => "ValidationError",
            ErrorKind::SingularMatrix => "SingularMatrixError",
            ErrorKind::Convergence => "ConvergenceError",
            ErrorKind::Domain => "DomainError",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The Display names match the public taxonomy labels.
    fn error_kind_display_uses_taxonomy_names() {
        assert_eq!(ErrorKind::Validation.to_string(), "ValidationError");
        assert_eq!(ErrorKind::SingularMatrix.to_string(), "SingularMatrixError");
        assert_eq!(ErrorKind::Convergence.to_string(), "ConvergenceError");
        assert_eq!(ErrorKind::Domain.to_string(), "DomainError");
    }
}
