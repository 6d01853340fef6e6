//! statistical_tests::validation — shared input guards for the tests.
//!
//! Purpose
//! -------
//! Centralize the eager option checks run by every test before the panel is
//! processed, so a bad α or threshold fails before any numerical work.
//!
//! Conventions
//! -----------
//! - Each guard returns `EquivalenceResult<()>` with a variant naming the
//!   offending value.
//! - Guards perform no I/O and no allocation beyond error construction.
use crate::statistical_tests::errors::{EquivalenceError, EquivalenceResult};

/// Smallest accepted number of bootstrap replications.
pub const MIN_REPLICATIONS: usize = 10;

/// Significance level must lie strictly inside (0, 1).
pub fn validate_alpha(alpha: f64) -> EquivalenceResult<()> {
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(EquivalenceError::InvalidAlpha { alpha });
    }
    Ok(())
}

/// Equivalence thresholds must be strictly positive and finite.
pub fn validate_threshold(name: &'static str, value: f64) -> EquivalenceResult<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(EquivalenceError::InvalidThreshold { name, value });
    }
    Ok(())
}

/// Bootstrap replication count must reach [`MIN_REPLICATIONS`].
pub fn validate_replications(replications: usize) -> EquivalenceResult<()> {
    if replications < MIN_REPLICATIONS {
        return Err(EquivalenceError::InvalidReplications { replications, min: MIN_REPLICATIONS });
    }
    Ok(())
}

/// Allowed failure fraction must lie in [0, 1).
pub fn validate_failure_fraction(value: f64) -> EquivalenceResult<()> {
    if !(value >= 0.0 && value < 1.0) {
        return Err(EquivalenceError::InvalidFailureFraction { value });
    }
    Ok(())
}

/// An explicit search tolerance must be strictly positive and finite.
pub fn validate_search_tol(value: Option<f64>) -> EquivalenceResult<()> {
    match value {
        Some(v) if !(v.is_finite() && v > 0.0) => Err(EquivalenceError::InvalidSearchTolerance { value: v }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Each guard accepts a valid value and rejects the boundary cases.
    fn guards_reject_boundary_values() {
        assert!(validate_alpha(0.05).is_ok());
        assert_eq!(validate_alpha(0.0), Err(EquivalenceError::InvalidAlpha { alpha: 0.0 }));
        assert!(validate_alpha(1.0).is_err());
        assert!(validate_alpha(f64::NAN).is_err());

        assert!(validate_threshold("delta", 0.5).is_ok());
        assert_eq!(
            validate_threshold("delta", -1.0),
            Err(EquivalenceError::InvalidThreshold { name: "delta", value: -1.0 })
        );

        assert!(validate_replications(MIN_REPLICATIONS).is_ok());
        assert!(validate_replications(MIN_REPLICATIONS - 1).is_err());

        assert!(validate_failure_fraction(0.0).is_ok());
        assert!(validate_failure_fraction(1.0).is_err());

        assert!(validate_search_tol(None).is_ok());
        assert!(validate_search_tol(Some(0.0)).is_err());
    }
}
