//! folded_normal — the distribution of |X| for X ~ N(μ, σ²).
//!
//! Purpose
//! -------
//! Provide the CDF, quantile, and threshold inversions that drive the
//! intersection-union max test and the mean test.
//!
//! Key behaviors
//! -------------
//! - [`cdf`] and [`quantile`] with strict domain checks.
//! - [`min_threshold_iu`] and [`min_threshold_mean`]: the smallest
//!   equivalence threshold at which a single statistic rejects at level α.
//! - [`FoldedNormal`] value type with moments.
//!
//! Invariants & assumptions
//! ------------------------
//! - All functions validate their arguments and report
//!   [`FoldedNormalError`] rather than panicking or returning NaN.
//! - Root finding goes through `optimization::root_finder`; a capped solve
//!   surfaces as `FoldedNormalError::Solver`.
//!
//! Testing notes
//! -------------
//! - [`distribution`] pins reference values and round trips; [`thresholds`]
//!   checks the defining equation and the rejection boundary.
pub mod distribution;
pub mod errors;
pub mod thresholds;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::distribution::{FoldedNormal, cdf, quantile, quantile_vec, quantile_with};
pub use self::errors::{FoldedNormalError, FoldedNormalResult};
pub use self::thresholds::{min_threshold_iu, min_threshold_mean, min_threshold_with};
