//! folded_normal::thresholds — minimum equivalence thresholds by inverting
//! the folded normal CDF in its location parameter.
//!
//! Purpose
//! -------
//! For a statistic |b| with standard error s, the IU and mean tests reject
//! H0: |θ| ≥ δ at level α iff F(|b|; δ, s) < α. Since F(x; δ, s) decreases
//! strictly in δ for fixed x > 0, the set of rejecting thresholds is an
//! interval (δ*, ∞); this module computes its left endpoint δ*.
//!
//! Key behaviors
//! -------------
//! - Solve F(|b|; δ, s) = α for δ with the shared Brent root finder, using
//!   δ = 0 as the lower endpoint and a doubling upper bracket starting at
//!   |b| + 10s.
//! - When F(|b|; 0, s) ≤ α there is no positive root: every δ > 0 already
//!   rejects, so δ* = 0. This is the region |b| ≤ s·Φ⁻¹((1 + α)/2), the
//!   statistic at which F(|b|; 0, s) = α. It contains |b| = 0, where
//!   F(0; δ, s) = Φ(−δ/s) + Φ(δ/s) − 1 = 0 for every δ; no separate branch
//!   for tiny statistics exists.
//!
//! Invariants & assumptions
//! ------------------------
//! - The statistic enters only through its absolute value.
//! - s > 0 and α ∈ (0, 1) are validated before any root finding.
//!
//! Downstream usage
//! ----------------
//! - `statistical_tests::max_test` (IU method) calls [`min_threshold_iu`]
//!   per coefficient and takes the maximum.
//! - `statistical_tests::mean_test` calls [`min_threshold_mean`].
use crate::{
    folded_normal::{
        distribution::{cdf_unchecked, validate_location, validate_scale},
        errors::{FoldedNormalError, FoldedNormalResult},
    },
    optimization::{RootOptions, expand_upper_bracket, solve_bracket},
};

/// Minimum IU threshold for a single coefficient.
///
/// Parameters
/// ----------
/// - `coef`: `f64`
///   Coefficient estimate; only |coef| is used. Must be finite.
/// - `se`: `f64`
///   Standard error, strictly positive.
/// - `alpha`: `f64`
///   Significance level in (0, 1).
///
/// Returns
/// -------
/// `FoldedNormalResult<f64>`
///   δ* ≥ 0 with F(|coef|; δ*, se) = α whenever such a root exists, and 0
///   otherwise.
///
/// Errors
/// ------
/// - `FoldedNormalError::InvalidScale`, `InvalidAlpha`, `NonFinite` for bad
///   arguments.
/// - `FoldedNormalError::Solver` if the root finder fails to bracket or
///   converge.
///
/// Examples
/// --------
/// ```rust
/// use equitrends::folded_normal::{cdf, min_threshold_iu};
///
/// let delta = min_threshold_iu(0.3, 0.1, 0.05).unwrap();
/// assert!((cdf(0.3, delta, 0.1).unwrap() - 0.05).abs() < 1e-8);
/// ```
pub fn min_threshold_iu(coef: f64, se: f64, alpha: f64) -> FoldedNormalResult<f64> {
    invert_in_location(coef, se, alpha, &RootOptions::default())
}

/// Minimum mean-test threshold for the average placebo coefficient.
///
/// Same inversion as [`min_threshold_iu`], applied to |β̄| and its standard
/// error √(d'Σ̂d).
///
/// # Errors
/// Same as [`min_threshold_iu`].
pub fn min_threshold_mean(mean_coef: f64, se: f64, alpha: f64) -> FoldedNormalResult<f64> {
    invert_in_location(mean_coef, se, alpha, &RootOptions::default())
}

/// Inversion with explicit root-finder options.
///
/// # Errors
/// Same as [`min_threshold_iu`].
pub fn min_threshold_with(
    stat: f64, se: f64, alpha: f64, opts: &RootOptions,
) -> FoldedNormalResult<f64> {
    invert_in_location(stat, se, alpha, opts)
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Solve F(|stat|; δ, se) = α for δ ≥ 0 (δ* = 0 when F(|stat|; 0, se) ≤ α).
fn invert_in_location(
    stat: f64, se: f64, alpha: f64, opts: &RootOptions,
) -> FoldedNormalResult<f64> {
    validate_location("statistic", stat)?;
    validate_scale(se)?;
    if !(alpha > 0.0 && alpha < 1.0) {
        return Err(FoldedNormalError::InvalidAlpha(alpha));
    }

    let x = stat.abs();
    let g = |delta: f64| cdf_unchecked(x, delta, se) - alpha;
    if g(0.0) <= 0.0 {
        return Ok(0.0);
    }
    let bracket = expand_upper_bracket(&g, 0.0, x + 10.0 * se, opts.max_doublings)?;
    let out = solve_bracket(&g, &bracket, &opts.scaled(se.max(x)))?;
    Ok(out.root)
}
