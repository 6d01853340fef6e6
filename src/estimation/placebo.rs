//! estimation::placebo — unconstrained placebo regression.
//!
//! Purpose
//! -------
//! Estimate the placebo coefficients β by least squares on the two-way
//! demeaned design, after screening out collinear columns.
//!
//! Key behaviors
//! -------------
//! - [`estimate_placebo`] builds the design, runs the in-order rank screen
//!   on X'X with each column measured against its norm before demeaning
//!   (a period with no control rows is absorbed by the period effect), drops dependent columns with a `log::warn!` each, and solves
//!   the reduced normal equations by Cholesky.
//! - [`PlaceboFit`] keeps β̂, the residuals, the RSS and (X'X)⁻¹ so the
//!   variance estimators and the bootstrap reuse them.
//!
//! Invariants & assumptions
//! ------------------------
//! - β̂ lists the kept placebo coefficients (ascending period) first, then
//!   the kept covariates.
//! - At least one placebo column survives, otherwise
//!   `EstimationError::NoPlaceboColumns`.
//! - No pseudo-inverse is used: the reduced Gram matrix is full rank.
//!
//! Testing notes
//! -------------
//! - Tests recover known coefficients from noiseless data and check the
//!   collinearity path against a duplicated covariate.
use ndarray::{Array1, Array2, ArrayView1, s};

use crate::{
    estimation::{
        design::DesignMatrices,
        errors::{EstimationError, EstimationResult},
        linalg::{RANK_TOL, independent_columns, spd_inverse},
    },
    panel::ProcessedPanel,
};

/// PlaceboFit — least-squares fit on the reduced design.
///
/// Fields
/// ------
/// - `beta`: kept coefficients, placebo block first.
/// - `placebo_periods`: labels of the kept placebo coefficients.
/// - `dropped_periods`: labels of placebo columns dropped as collinear.
/// - `dropped_covariates`: original indices of dropped covariates.
/// - `residuals`, `rss`: Ÿ − Ẍβ̂ and its squared norm.
/// - `xtx_inv`: (X'X)⁻¹ of the reduced design.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceboFit {
    pub beta: Array1<f64>,
    pub placebo_periods: Vec<f64>,
    pub dropped_periods: Vec<f64>,
    pub dropped_covariates: Vec<usize>,
    pub residuals: Array1<f64>,
    pub rss: f64,
    pub xtx_inv: Array2<f64>,
}

impl PlaceboFit {
    /// Effective number of placebo coefficients.
    pub fn n_placebo(&self) -> usize {
        self.placebo_periods.len()
    }

    /// Placebo block of β̂.
    pub fn placebo_coefficients(&self) -> ArrayView1<'_, f64> {
        self.beta.slice(s![..self.n_placebo()])
    }

    /// ‖β̂_P‖∞.
    pub fn max_abs_placebo(&self) -> f64 {
        sup_norm(self.placebo_coefficients())
    }
}

/// Estimate the placebo regression on a processed panel.
///
/// Parameters
/// ----------
/// - `panel`: `&ProcessedPanel`
///   Output of `panel::process_panel`.
///
/// Returns
/// -------
/// `EstimationResult<(DesignMatrices, PlaceboFit)>`
///   The reduced design (collinear columns removed) and the fit on it.
///
/// Errors
/// ------
/// - `EstimationError::DemeanNotConverged` from the demeaning sweeps.
/// - `EstimationError::NoPlaceboColumns` if every placebo column is
///   dependent.
/// - `EstimationError::SingularSystem` if the reduced Gram matrix fails to
///   factorize.
pub fn estimate_placebo(panel: &ProcessedPanel) -> EstimationResult<(DesignMatrices, PlaceboFit)> {
    let full = DesignMatrices::build(panel)?;
    let gram = full.regressors().t().dot(full.regressors());
    let (kept, dropped) = independent_columns(&gram, full.raw_sq_norms(), RANK_TOL);

    let t = full.n_placebo();
    let mut dropped_periods = Vec::new();
    let mut dropped_covariates = Vec::new();
    for &c in &dropped {
        if c < t {
            let period = full.placebo_periods()[c];
            log::warn!("dropping placebo period {period}: collinear with fixed effects or earlier columns");
            dropped_periods.push(period);
        } else {
            let cov = full.covariate_columns()[c - t];
            log::warn!("dropping covariate {cov}: collinear with fixed effects or earlier columns");
            dropped_covariates.push(cov);
        }
    }
    if kept.iter().all(|&c| c >= t) {
        return Err(EstimationError::NoPlaceboColumns { dropped: dropped_periods });
    }

    let design = if dropped.is_empty() { full } else { full.select_columns(&kept) };
    let mut fit = fit_ols(&design)?;
    fit.dropped_periods = dropped_periods;
    fit.dropped_covariates = dropped_covariates;
    Ok((design, fit))
}

/// Least squares on a full-rank design.
///
/// # Errors
/// - `EstimationError::SingularSystem` if X'X is not positive definite.
pub fn fit_ols(design: &DesignMatrices) -> EstimationResult<PlaceboFit> {
    let x = design.regressors();
    let xtx_inv = spd_inverse(&x.t().dot(x))
        .ok_or(EstimationError::SingularSystem { context: "placebo normal equations" })?;
    let beta = xtx_inv.dot(&x.t().dot(design.y()));
    let residuals = design.y() - &x.dot(&beta);
    let rss = residuals.dot(&residuals);
    Ok(PlaceboFit {
        beta,
        placebo_periods: design.placebo_periods().to_vec(),
        dropped_periods: Vec::new(),
        dropped_covariates: Vec::new(),
        residuals,
        rss,
        xtx_inv,
    })
}

/// Largest absolute entry; 0 for an empty view.
pub(crate) fn sup_norm(v: ArrayView1<'_, f64>) -> f64 {
    v.iter().fold(0.0_f64, |m, b| m.max(b.abs()))
}
