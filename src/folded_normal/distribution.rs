//! folded_normal::distribution — CDF and quantile of |X|, X ~ N(μ, σ²).
//!
//! Purpose
//! -------
//! Evaluate the folded normal CDF in closed form and its quantile by
//! monotone root finding, with strict argument validation.
//!
//! Key behaviors
//! -------------
//! - [`cdf`] computes F(x) = Φ((x−μ)/σ) + Φ((x+μ)/σ) − 1 through upper-tail
//!   probabilities, F(x) = Q((|μ|−x)/σ) − Q((|μ|+x)/σ), which stays accurate
//!   when both normal CDF terms are close to one.
//! - [`quantile`] solves F(x) = p on [0, |μ| + 10σ] (expanded by doubling
//!   if needed) with the shared Brent root finder.
//! - For |μ|/σ > 1e10 the lower fold has no mass at double precision and
//!   the quantile is |μ| + σΦ⁻¹(p) in closed form.
//! - [`FoldedNormal`] bundles one parameterization with its moments.
//!
//! Invariants & assumptions
//! ------------------------
//! - The distribution depends on μ only through |μ|.
//! - σ must be finite and strictly positive; x must be non-negative.
//! - Results of [`cdf`] are clipped to [0, 1].
//!
//! Testing notes
//! -------------
//! - Unit tests pin reference values (median of |N(0,1)|, a CDF value at
//!   an exact one-sigma offset, a lower-tail quantile), check symmetry in
//!   μ, monotonicity in x, and the CDF/quantile round trip.
use statrs::function::erf::{erfc, erfc_inv};
use std::f64::consts::SQRT_2;

use crate::{
    folded_normal::errors::{FoldedNormalError, FoldedNormalResult},
    optimization::{RootOptions, expand_upper_bracket, solve_bracket},
};

/// Location-to-scale ratio beyond which the lower fold is negligible.
const NORMAL_APPROX_RATIO: f64 = 1e10;

/// FoldedNormal — distribution of |X| for X ~ N(μ, σ²).
///
/// Fields
/// ------
/// - `mean`: location μ of the underlying normal (sign irrelevant).
/// - `sd`: scale σ > 0 of the underlying normal.
///
/// Notes
/// -----
/// - Construction validates the parameters once; the methods then only
///   validate their own arguments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FoldedNormal {
    mean: f64,
    sd: f64,
}

impl FoldedNormal {
    /// Build a validated folded normal.
    ///
    /// # Errors
    /// - `FoldedNormalError::NonFinite` if `mean` is not finite.
    /// - `FoldedNormalError::InvalidScale` if `sd` is not finite and > 0.
    pub fn new(mean: f64, sd: f64) -> FoldedNormalResult<Self> {
        validate_location("mean", mean)?;
        validate_scale(sd)?;
        Ok(Self { mean, sd })
    }

    /// Location μ of the underlying normal.
    pub fn location(&self) -> f64 {
        self.mean
    }

    /// Scale σ of the underlying normal.
    pub fn scale(&self) -> f64 {
        self.sd
    }

    /// P(|X| ≤ x).
    pub fn cdf(&self, x: f64) -> FoldedNormalResult<f64> {
        cdf(x, self.mean, self.sd)
    }

    /// Smallest x with P(|X| ≤ x) = p.
    pub fn quantile(&self, p: f64) -> FoldedNormalResult<f64> {
        quantile(p, self.mean, self.sd)
    }

    /// E|X| = σ√(2/π)·exp(−μ²/2σ²) + μ(1 − 2Φ(−μ/σ)).
    pub fn mean_value(&self) -> f64 {
        let (mu, sd) = (self.mean.abs(), self.sd);
        let z = mu / sd;
        sd * (2.0 / std::f64::consts::PI).sqrt() * (-0.5 * z * z).exp()
            + mu * (1.0 - 2.0 * std_normal_cdf(-z))
    }

    /// Var|X| = μ² + σ² − (E|X|)².
    pub fn variance(&self) -> f64 {
        let m = self.mean_value();
        (self.mean * self.mean + self.sd * self.sd - m * m).max(0.0)
    }
}

/// Folded normal CDF F(x; μ, σ).
///
/// Parameters
/// ----------
/// - `x`: `f64`
///   Evaluation point; must be finite and ≥ 0.
/// - `mean`: `f64`
///   Location μ of the underlying normal (any finite value).
/// - `sd`: `f64`
///   Scale σ > 0.
///
/// Returns
/// -------
/// `FoldedNormalResult<f64>`
///   F(x) ∈ [0, 1].
///
/// Errors
/// ------
/// - `FoldedNormalError::NegativeArgument` if `x < 0`.
/// - `FoldedNormalError::InvalidScale` if `sd ≤ 0` or non-finite.
/// - `FoldedNormalError::NonFinite` for a non-finite `x` or `mean`.
///
/// Examples
/// --------
/// ```rust
/// use equitrends::folded_normal::cdf;
///
/// let p = cdf(0.15, 0.2, 0.05).unwrap();
/// assert!((p - 0.158655253931457).abs() < 1e-9);
/// ```
pub fn cdf(x: f64, mean: f64, sd: f64) -> FoldedNormalResult<f64> {
    validate_location("x", x)?;
    if x < 0.0 {
        return Err(FoldedNormalError::NegativeArgument(x));
    }
    validate_location("mean", mean)?;
    validate_scale(sd)?;
    Ok(cdf_unchecked(x, mean, sd))
}

/// Folded normal quantile: the smallest x ≥ 0 with F(x; μ, σ) = p.
///
/// Parameters
/// ----------
/// - `p`: `f64`
///   Probability level in (0, 1).
/// - `mean`: `f64`
///   Location μ (any finite value).
/// - `sd`: `f64`
///   Scale σ > 0.
///
/// Returns
/// -------
/// `FoldedNormalResult<f64>`
///   The quantile, accurate to the root finder tolerance (1e-12 relative to
///   max(σ, |μ|)).
///
/// Errors
/// ------
/// - `FoldedNormalError::InvalidProbability` if `p ∉ (0, 1)`.
/// - `FoldedNormalError::InvalidScale` if `sd ≤ 0` or non-finite.
/// - `FoldedNormalError::Solver` if bracketing fails or the root finder
///   exceeds its iteration cap; the wrapped error carries the best estimate.
///
/// Examples
/// --------
/// ```rust
/// use equitrends::folded_normal::quantile;
///
/// let median = quantile(0.5, 0.0, 1.0).unwrap();
/// assert!((median - 0.6744897501960817).abs() < 1e-9);
/// ```
pub fn quantile(p: f64, mean: f64, sd: f64) -> FoldedNormalResult<f64> {
    quantile_with(p, mean, sd, &RootOptions::default())
}

/// [`quantile`] with explicit root-finder options.
///
/// # Errors
/// Same as [`quantile`].
pub fn quantile_with(p: f64, mean: f64, sd: f64, opts: &RootOptions) -> FoldedNormalResult<f64> {
    validate_probability(p)?;
    validate_location("mean", mean)?;
    validate_scale(sd)?;

    let mu = mean.abs();
    if mu / sd > NORMAL_APPROX_RATIO {
        return Ok((mu + sd * std_normal_quantile(p)).max(0.0));
    }

    let g = |x: f64| cdf_unchecked(x, mu, sd) - p;
    let bracket = expand_upper_bracket(&g, 0.0, mu + 10.0 * sd, opts.max_doublings)?;
    let out = solve_bracket(&g, &bracket, &opts.scaled(sd.max(mu)))?;
    Ok(out.root)
}

/// Element-wise [`quantile`] over equal-length slices.
///
/// # Errors
/// - `FoldedNormalError::LengthMismatch` when the slices differ in length.
/// - The first error [`quantile`] reports for any element.
pub fn quantile_vec(p: &[f64], mean: &[f64], sd: &[f64]) -> FoldedNormalResult<Vec<f64>> {
    if p.len() != mean.len() || p.len() != sd.len() {
        return Err(FoldedNormalError::LengthMismatch { p: p.len(), mean: mean.len(), sd: sd.len() });
    }
    let opts = RootOptions::default();
    p.iter().zip(mean).zip(sd).map(|((&p, &m), &s)| quantile_with(p, m, s, &opts)).collect()
}

//
// ---------- Crate-internal helpers ----------
//

/// F(x; μ, σ) without argument checks; callers validate first.
#[inline]
pub(crate) fn cdf_unchecked(x: f64, mean: f64, sd: f64) -> f64 {
    let mu = mean.abs();
    let value = std_normal_sf((mu - x) / sd) - std_normal_sf((mu + x) / sd);
    value.clamp(0.0, 1.0)
}

/// Standard normal CDF Φ(z).
#[inline]
pub(crate) fn std_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / SQRT_2)
}

/// Standard normal survival function Q(z) = 1 − Φ(z).
#[inline]
pub(crate) fn std_normal_sf(z: f64) -> f64 {
    0.5 * erfc(z / SQRT_2)
}

/// Standard normal quantile Φ⁻¹(p) for p ∈ (0, 1).
#[inline]
pub(crate) fn std_normal_quantile(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

pub(crate) fn validate_scale(sd: f64) -> FoldedNormalResult<()> {
    if !sd.is_finite() || sd <= 0.0 {
        return Err(FoldedNormalError::InvalidScale(sd));
    }
    Ok(())
}

pub(crate) fn validate_location(name: &'static str, value: f64) -> FoldedNormalResult<()> {
    if !value.is_finite() {
        return Err(FoldedNormalError::NonFinite { name, value });
    }
    Ok(())
}

fn validate_probability(p: f64) -> FoldedNormalResult<()> {
    if !(p > 0.0 && p < 1.0) {
        return Err(FoldedNormalError::InvalidProbability(p));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Reference values for the CDF and quantile.
    // - Symmetry in μ and monotonicity in x.
    // - CDF ∘ quantile round trips on a parameter grid.
    // - The large |μ|/σ closed-form branch.
    // - Domain errors for every argument.
    //
    // They intentionally DO NOT cover:
    // - Root-finder internals (see `optimization::root_finder`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // The median of |N(0, 1)| is Φ⁻¹(0.75).
    //
    // Given
    // -----
    // - p = 0.5, μ = 0, σ = 1.
    //
    // Expect
    // ------
    // - quantile = 0.6744897501960817 within 1e-9.
    fn quantile_of_half_normal_median_matches_reference() {
        // Act
        let q = quantile(0.5, 0.0, 1.0).unwrap();

        // Assert
        assert_abs_diff_eq!(q, 0.6744897501960817, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // A point exactly one σ below μ has F ≈ Φ(−1) since the upper fold is
    // seven σ away.
    //
    // Given
    // -----
    // - x = 0.15, μ = 0.2, σ = 0.05.
    //
    // Expect
    // ------
    // - F = 0.158655253931457 within 1e-9.
    fn cdf_one_sigma_below_location_matches_reference() {
        // Act
        let p = cdf(0.15, 0.2, 0.05).unwrap();

        // Assert
        assert_abs_diff_eq!(p, 0.158655253931457, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // A lower-tail quantile sits about 1.645σ below μ when the fold is far.
    //
    // Given
    // -----
    // - p = 0.05, μ = 0.2, σ = 0.05.
    //
    // Expect
    // ------
    // - quantile ≈ 0.11775 within 1e-4.
    fn quantile_lower_tail_matches_reference() {
        let q = quantile(0.05, 0.2, 0.05).unwrap();
        assert_abs_diff_eq!(q, 0.11775, epsilon = 1e-4);
    }

    #[test]
    // Purpose
    // -------
    // The distribution is symmetric in μ.
    fn cdf_and_quantile_are_symmetric_in_location() {
        assert_abs_diff_eq!(
            cdf(0.7, -1.3, 0.4).unwrap(),
            cdf(0.7, 1.3, 0.4).unwrap(),
            epsilon = 1e-15
        );
        assert_abs_diff_eq!(
            quantile(0.3, -1.3, 0.4).unwrap(),
            quantile(0.3, 1.3, 0.4).unwrap(),
            epsilon = 1e-12
        );
    }

    #[test]
    // Purpose
    // -------
    // F is non-decreasing in x and starts at 0.
    //
    // Given
    // -----
    // - μ = 0.5, σ = 0.3, x on a grid over [0, 3].
    //
    // Expect
    // ------
    // - F(0) = 0 and successive values never decrease.
    fn cdf_is_monotone_in_x() {
        // Arrange
        let grid: Vec<f64> = (0..=60).map(|i| i as f64 * 0.05).collect();

        // Act
        let values: Vec<f64> = grid.iter().map(|&x| cdf(x, 0.5, 0.3).unwrap()).collect();

        // Assert
        assert_eq!(values[0], 0.0);
        for pair in values.windows(2) {
            assert!(pair[1] >= pair[0], "CDF decreased: {pair:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // cdf(quantile(p)) recovers p on a grid of parameters.
    //
    // Given
    // -----
    // - p ∈ {0.01, 0.05, 0.3, 0.5, 0.9, 0.99}, μ ∈ {0, 0.1, 1, 5}, σ ∈ {0.05, 1, 3}.
    //
    // Expect
    // ------
    // - |cdf(quantile(p)) − p| < 1e-6 everywhere.
    fn cdf_of_quantile_round_trips() {
        for &p in &[0.01, 0.05, 0.3, 0.5, 0.9, 0.99] {
            for &mu in &[0.0, 0.1, 1.0, 5.0] {
                for &sd in &[0.05, 1.0, 3.0] {
                    let x = quantile(p, mu, sd).unwrap();
                    let back = cdf(x, mu, sd).unwrap();
                    assert_abs_diff_eq!(back, p, epsilon = 1e-6);
                }
            }
        }
    }

    #[test]
    // Purpose
    // -------
    // For |μ|/σ beyond 1e10 the closed-form normal quantile is used.
    fn quantile_uses_normal_branch_for_far_location() {
        let q = quantile(0.975, 1.0, 1e-11).unwrap();
        assert_abs_diff_eq!(q, 1.0 + 1e-11 * 1.959963984540054, epsilon = 1e-15);
    }

    #[test]
    // Purpose
    // -------
    // Every out-of-domain argument is rejected with the matching variant.
    fn domain_errors_are_reported_per_argument() {
        assert_eq!(cdf(-0.1, 0.0, 1.0), Err(FoldedNormalError::NegativeArgument(-0.1)));
        assert_eq!(cdf(0.1, 0.0, -1.0), Err(FoldedNormalError::InvalidScale(-1.0)));
        assert_eq!(cdf(0.1, 0.0, 0.0), Err(FoldedNormalError::InvalidScale(0.0)));
        assert_eq!(quantile(1.0, 0.0, 1.0), Err(FoldedNormalError::InvalidProbability(1.0)));
        assert_eq!(quantile(0.0, 0.0, 1.0), Err(FoldedNormalError::InvalidProbability(0.0)));
        assert!(matches!(
            cdf(0.1, f64::NAN, 1.0),
            Err(FoldedNormalError::NonFinite { name: "mean", .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Moments of |N(0, 1)| match √(2/π) and 1 − 2/π.
    fn half_normal_moments_match_closed_form() {
        let fd = FoldedNormal::new(0.0, 1.0).unwrap();
        let pi = std::f64::consts::PI;
        assert_abs_diff_eq!(fd.mean_value(), (2.0 / pi).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(fd.variance(), 1.0 - 2.0 / pi, epsilon = 1e-12);
        assert_abs_diff_eq!(fd.quantile(0.5).unwrap(), 0.6744897501960817, epsilon = 1e-9);
    }

    #[test]
    // Purpose
    // -------
    // The element-wise quantile matches the scalar one entry by entry and
    // rejects slices of unequal length.
    fn quantile_vec_matches_scalar_quantile() {
        // Arrange
        let (p, mean, sd) = ([0.5, 0.05, 0.9], [0.0, 1.0, -2.0], [1.0, 0.3, 0.5]);

        // Act
        let qs = quantile_vec(&p, &mean, &sd).unwrap();

        // Assert
        for i in 0..3 {
            assert_abs_diff_eq!(qs[i], quantile(p[i], mean[i], sd[i]).unwrap(), epsilon = 1e-14);
        }
        assert_eq!(
            quantile_vec(&p, &mean[..2], &sd),
            Err(FoldedNormalError::LengthMismatch { p: 3, mean: 2, sd: 3 })
        );
    }
}
