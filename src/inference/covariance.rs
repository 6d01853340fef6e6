//! inference::covariance — sandwich covariance for the placebo regression.
//!
//! Purpose
//! -------
//! Compute Σ̂ = Var(β̂) for a [`PlaceboFit`] on its [`DesignMatrices`] under
//! any [`VceKind`], and expose the placebo block and standard errors.
//!
//! Key behaviors
//! -------------
//! - All estimators share the bread B = (X'X)⁻¹ already stored in the fit.
//! - Row-level meats (HC1/HC2/HC3) weight xᵢxᵢ' by eᵢ² times the kind's
//!   factor; cluster meats sum (X_g'e_g)(X_g'e_g)' over clusters.
//! - The classical estimator uses σ̂² = RSS / (N − n − k), which equals
//!   RSS / (nT − k) on a balanced panel: the n individual effects and the
//!   period effects absorbed by demeaning are charged against the degrees
//!   of freedom.
//!
//! Invariants & assumptions
//! ------------------------
//! - The returned matrix is symmetric with a strictly positive, finite
//!   diagonal; anything else is an error, never clipped.
//! - Without an explicit cluster vector, the design's cluster index is
//!   used (individuals unless the panel carried a cluster column).
//!
//! Testing notes
//! -------------
//! - Unit tests check the OLS formula, the exact CR0/CR1 scale identity,
//!   HC2 ≤ HC3, and the error paths.
use ndarray::{Array1, Array2, s};

use crate::{
    estimation::{DesignMatrices, PlaceboFit},
    inference::{
        errors::{InferenceError, InferenceResult},
        vce::VceKind,
    },
};

/// Leverage values at or above `1 − LEVERAGE_EPS` are rejected.
pub const LEVERAGE_EPS: f64 = 1e-12;

/// VarianceEstimate — covariance of the kept coefficients.
///
/// Fields
/// ------
/// - `sigma`: symmetric k×k covariance matrix, placebo block first.
/// - `se`: √diag(sigma).
/// - `kind`: estimator used.
/// - `n_clusters`: number of clusters for CR0/CR1, `None` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceEstimate {
    pub sigma: Array2<f64>,
    pub se: Array1<f64>,
    pub kind: VceKind,
    pub n_clusters: Option<usize>,
}

impl VarianceEstimate {
    /// Leading `t × t` block (placebo coefficients).
    pub fn placebo_block(&self, t: usize) -> Array2<f64> {
        extract_placebo_submatrix(&self.sigma, t)
    }

    /// Standard errors of the first `t` coefficients.
    pub fn placebo_se(&self, t: usize) -> Array1<f64> {
        self.se.slice(s![..t]).to_owned()
    }
}

/// Estimate Var(β̂) for a placebo fit.
///
/// Parameters
/// ----------
/// - `design`: `&DesignMatrices`
///   Reduced design the fit was computed on.
/// - `fit`: `&PlaceboFit`
///   Supplies β̂, residuals, RSS and (X'X)⁻¹.
/// - `kind`: `VceKind`
///   Estimator family.
/// - `cluster`: `Option<&[usize]>`
///   Dense cluster index per row (values need not be contiguous); defaults
///   to the design's cluster index. Ignored by non-cluster kinds.
///
/// Returns
/// -------
/// `InferenceResult<VarianceEstimate>`
///
/// Errors
/// ------
/// - `InferenceError::NonPositiveDof` if N − n − k ≤ 0 (OLS) or N − k ≤ 0
///   (HC1).
/// - `InferenceError::DegenerateLeverage` for hᵢᵢ ≥ 1 − 1e-12 under HC2/HC3.
/// - `InferenceError::ClusterLengthMismatch`, `InferenceError::TooFewClusters`
///   for cluster kinds.
/// - `InferenceError::NonPositiveVariance` for a non-positive or
///   non-finite diagonal entry.
pub fn estimate_variance(
    design: &DesignMatrices, fit: &PlaceboFit, kind: VceKind, cluster: Option<&[usize]>,
) -> InferenceResult<VarianceEstimate> {
    let x = design.regressors();
    let e = &fit.residuals;
    let bread = &fit.xtx_inv;
    let (n_obs, k) = x.dim();
    if bread.nrows() != k || e.len() != n_obs {
        return Err(anyhow::anyhow!(
            "fit ({} coefficients, {} residuals) does not match design ({n_obs}×{k})",
            bread.nrows(),
            e.len()
        )
        .into());
    }

    let mut n_clusters = None;
    let sigma = match kind {
        VceKind::Ols => {
            let dof = n_obs as i64 - design.n_units() as i64 - k as i64;
            if dof <= 0 {
                return Err(InferenceError::NonPositiveDof { dof });
            }
            bread * (fit.rss / dof as f64)
        }
        VceKind::Hc1 => {
            let dof = n_obs as i64 - k as i64;
            if dof <= 0 {
                return Err(InferenceError::NonPositiveDof { dof });
            }
            let weights = e.mapv(|v| v * v);
            sandwich(bread, &row_meat(x, &weights)) * (n_obs as f64 / dof as f64)
        }
        VceKind::Hc2 | VceKind::Hc3 => {
            let power = if kind == VceKind::Hc2 { 1 } else { 2 };
            let mut weights = Array1::<f64>::zeros(n_obs);
            for i in 0..n_obs {
                let xi = x.row(i);
                let h = xi.dot(&bread.dot(&xi));
                if h >= 1.0 - LEVERAGE_EPS {
                    return Err(InferenceError::DegenerateLeverage { row: i, leverage: h });
                }
                weights[i] = e[i] * e[i] / (1.0 - h).powi(power);
            }
            sandwich(bread, &row_meat(x, &weights))
        }
        VceKind::Cr0 | VceKind::Cr1 => {
            let index = cluster.unwrap_or(design.cluster_index());
            if index.len() != n_obs {
                return Err(InferenceError::ClusterLengthMismatch { expected: n_obs, found: index.len() });
            }
            let (meat, g) = cluster_meat(x, e, index);
            if g < 2 {
                return Err(InferenceError::TooFewClusters { found: g });
            }
            n_clusters = Some(g);
            let v = sandwich(bread, &meat);
            if kind == VceKind::Cr1 { v * (g as f64 / (g as f64 - 1.0)) } else { v }
        }
    };

    let se = compute_se(&sigma)?;
    Ok(VarianceEstimate { sigma, se, kind, n_clusters })
}

/// Leading `t × t` block of a covariance matrix.
pub fn extract_placebo_submatrix(sigma: &Array2<f64>, t: usize) -> Array2<f64> {
    sigma.slice(s![..t, ..t]).to_owned()
}

/// Standard errors √diag(Σ̂).
///
/// # Errors
/// - `InferenceError::NonPositiveVariance` for the first diagonal entry that
///   is ≤ 0 or non-finite.
pub fn compute_se(sigma: &Array2<f64>) -> InferenceResult<Array1<f64>> {
    let diag = sigma.diag();
    if let Some((index, &value)) = diag.iter().enumerate().find(|(_, v)| !(v.is_finite() && **v > 0.0)) {
        return Err(InferenceError::NonPositiveVariance { index, value });
    }
    Ok(diag.mapv(f64::sqrt))
}

/// Standard error √(d'Σ̂d) of a linear contrast d'β.
///
/// # Errors
/// - `InferenceError::NonPositiveVariance` with `index = 0` when d'Σ̂d is
///   ≤ 0 or non-finite.
pub fn contrast_se(sigma: &Array2<f64>, d: &Array1<f64>) -> InferenceResult<f64> {
    let value = d.dot(&sigma.dot(d));
    if !(value.is_finite() && value > 0.0) {
        return Err(InferenceError::NonPositiveVariance { index: 0, value });
    }
    Ok(value.sqrt())
}

//
// ---------- Private helpers (compact docs) ----------
//

/// B M B, symmetrized.
fn sandwich(bread: &Array2<f64>, meat: &Array2<f64>) -> Array2<f64> {
    let v = bread.dot(meat).dot(bread);
    (&v + &v.t()) * 0.5
}

/// Σᵢ wᵢ xᵢxᵢ' = X' diag(w) X.
fn row_meat(x: &Array2<f64>, weights: &Array1<f64>) -> Array2<f64> {
    let weighted = x * &weights.view().insert_axis(ndarray::Axis(1));
    x.t().dot(&weighted)
}

/// Σ_g s_g s_g' with s_g = Σ_{i∈g} xᵢeᵢ; also returns the cluster count.
fn cluster_meat(x: &Array2<f64>, e: &Array1<f64>, index: &[usize]) -> (Array2<f64>, usize) {
    let k = x.ncols();
    let mut codes: Vec<usize> = index.to_vec();
    codes.sort_unstable();
    codes.dedup();
    let mut scores = Array2::<f64>::zeros((codes.len(), k));
    for (i, &c) in index.iter().enumerate() {
        let g = codes.binary_search(&c).unwrap_or(0);
        let mut row = scores.row_mut(g);
        row.scaled_add(e[i], &x.row(i));
    }
    (scores.t().dot(&scores), codes.len())
}
