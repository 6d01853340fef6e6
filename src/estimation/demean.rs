//! estimation::demean — two-way fixed-effects demeaning.
//!
//! Purpose
//! -------
//! Remove individual and period effects from the outcome, the placebo
//! indicators, and the covariates so the placebo regression can run without
//! an intercept or dummy columns.
//!
//! Key behaviors
//! -------------
//! - [`construct_w`] builds the N×T placebo indicator matrix.
//! - [`grouped_mean`] and [`between_transform`] are the one-way building
//!   blocks.
//! - [`double_demean`] applies them alternately (individual, then period)
//!   until the largest change is below `1e-13 · scale`. On a balanced panel
//!   the first sweep is already exact and the second confirms it; on an
//!   unbalanced panel the sweeps converge to the two-way residual.
//! - [`sigma_hathat_c`] is the residual variance under the constrained
//!   coefficients used by the spherical bootstrap.
//!
//! Invariants & assumptions
//! ------------------------
//! - Group indices are dense: every index is `< n_groups`.
//! - Demeaning is idempotent up to round-off.
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::{
    estimation::{
        design::DesignMatrices,
        errors::{EstimationError, EstimationResult},
    },
    panel::ProcessedPanel,
};

/// Relative change below which demeaning sweeps stop.
pub const DEMEAN_TOL: f64 = 1e-13;
/// Maximum number of alternating sweeps.
pub const MAX_DEMEAN_SWEEPS: usize = 1000;

/// Placebo indicator matrix W.
///
/// Entry (row, l) is `G_i · 1[period(row) = placebo period l]`, with
/// columns in ascending period order and the base period omitted.
pub fn construct_w(panel: &ProcessedPanel) -> Array2<f64> {
    let n_obs = panel.n_obs();
    let t = panel.structure().n_placebo();
    let mut w = Array2::<f64>::zeros((n_obs, t));
    for (row, &time) in panel.time_index().iter().enumerate() {
        if let (true, Some(col)) = (panel.row_treated(row), panel.placebo_column(time)) {
            w[[row, col]] = 1.0;
        }
    }
    w
}

/// Each row's group mean of `x`.
///
/// Parameters
/// ----------
/// - `x`: values per row.
/// - `index`: dense group index per row.
/// - `n_groups`: number of groups.
///
/// Returns
/// -------
/// `Array1<f64>` of the same length as `x`.
pub fn grouped_mean(x: ArrayView1<'_, f64>, index: &[usize], n_groups: usize) -> Array1<f64> {
    let mut sum = vec![0.0; n_groups];
    let mut count = vec![0usize; n_groups];
    for (&v, &g) in x.iter().zip(index) {
        sum[g] += v;
        count[g] += 1;
    }
    let means: Vec<f64> =
        sum.iter().zip(&count).map(|(&s, &c)| if c > 0 { s / c as f64 } else { 0.0 }).collect();
    index.iter().map(|&g| means[g]).collect()
}

/// `x` minus its group mean.
pub fn between_transform(x: ArrayView1<'_, f64>, index: &[usize], n_groups: usize) -> Array1<f64> {
    &x - &grouped_mean(x, index, n_groups)
}

/// Two-way demean every column of `x`.
///
/// Parameters
/// ----------
/// - `x`: `&Array2<f64>`
///   N×p matrix, one row per observation.
/// - `unit`, `time`: dense individual and period index per row.
///
/// Returns
/// -------
/// `EstimationResult<Array2<f64>>`
///   The demeaned matrix.
///
/// Errors
/// ------
/// - `EstimationError::DimensionMismatch` if an index length differs from N.
/// - `EstimationError::DemeanNotConverged` if a column has not settled after
///   [`MAX_DEMEAN_SWEEPS`] sweeps.
pub fn double_demean(x: &Array2<f64>, unit: &[usize], time: &[usize]) -> EstimationResult<Array2<f64>> {
    let n = x.nrows();
    check_rows("unit index", n, unit.len())?;
    check_rows("time index", n, time.len())?;
    let n_units = unit.iter().max().map_or(0, |m| m + 1);
    let n_periods = time.iter().max().map_or(0, |m| m + 1);

    let mut out = Array2::<f64>::zeros(x.dim());
    for (j, col) in x.axis_iter(Axis(1)).enumerate() {
        let demeaned = demean_column(col, unit, n_units, time, n_periods)?;
        out.column_mut(j).assign(&demeaned);
    }
    Ok(out)
}

/// Two-way demean a single vector.
pub fn double_demean_vec(x: &Array1<f64>, unit: &[usize], time: &[usize]) -> EstimationResult<Array1<f64>> {
    check_rows("unit index", x.len(), unit.len())?;
    check_rows("time index", x.len(), time.len())?;
    let n_units = unit.iter().max().map_or(0, |m| m + 1);
    let n_periods = time.iter().max().map_or(0, |m| m + 1);
    demean_column(x.view(), unit, n_units, time, n_periods)
}

/// Residual variance at constrained coefficients.
///
/// `Σ(Ÿ − Ẍβ_c)² / (N_obs − n − T)`, where Ẍ holds the kept regressors and
/// T the kept placebo count. On a balanced panel the denominator is
/// `(n − 1)·T`.
///
/// # Errors
/// - `EstimationError::DimensionMismatch` if `beta_c` does not match the
///   regressor count.
/// - `EstimationError::NonPositiveDof` if the denominator is not positive.
pub fn sigma_hathat_c(beta_c: &Array1<f64>, design: &DesignMatrices) -> EstimationResult<f64> {
    let x = design.regressors();
    check_rows("constrained coefficients", x.ncols(), beta_c.len())?;
    let absorbed = design.n_units() + design.n_placebo();
    if design.n_obs() <= absorbed {
        return Err(EstimationError::NonPositiveDof { n_obs: design.n_obs(), absorbed });
    }
    let resid = design.y() - &x.dot(beta_c);
    Ok(resid.dot(&resid) / (design.n_obs() - absorbed) as f64)
}

//
// ---------- Private helpers (compact docs) ----------
//

fn check_rows(what: &'static str, expected: usize, found: usize) -> EstimationResult<()> {
    if expected != found {
        return Err(EstimationError::DimensionMismatch { what, expected, found });
    }
    Ok(())
}

/// Alternating individual / period sweeps on one column.
fn demean_column(
    col: ArrayView1<'_, f64>, unit: &[usize], n_units: usize, time: &[usize], n_periods: usize,
) -> EstimationResult<Array1<f64>> {
    let scale = col.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    let mut current = col.to_owned();
    let mut change = f64::INFINITY;
    for _ in 0..MAX_DEMEAN_SWEEPS {
        let next = between_transform(current.view(), unit, n_units);
        let next = between_transform(next.view(), time, n_periods);
        change = next.iter().zip(current.iter()).fold(0.0_f64, |m, (a, b)| m.max((a - b).abs()));
        current = next;
        if change <= DEMEAN_TOL * scale {
            return Ok(current);
        }
    }
    Err(EstimationError::DemeanNotConverged { sweeps: MAX_DEMEAN_SWEEPS, change })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelData, PanelOptions, process_panel};
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - One-way means and the between transform.
    // - Exact two-way demeaning on a balanced 2×2 layout.
    // - Orthogonality to both sets of dummies on an unbalanced layout.
    // - Idempotence.
    // - The placebo indicator matrix layout.
    //
    // They intentionally DO NOT cover:
    // - The regression built on top (see `placebo`).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Group means are broadcast back to rows.
    fn grouped_mean_broadcasts_group_means() {
        let x = array![1.0, 3.0, 10.0, 20.0];
        let m = grouped_mean(x.view(), &[0, 0, 1, 1], 2);
        assert_eq!(m, array![2.0, 2.0, 15.0, 15.0]);
        assert_eq!(between_transform(x.view(), &[0, 0, 1, 1], 2), array![-1.0, 1.0, -5.0, 5.0]);
    }

    #[test]
    // Purpose
    // -------
    // On a balanced layout the result equals x − x̄_i − x̄_t + x̄.
    //
    // Given
    // -----
    // - 2 units × 2 periods, x = [1, 2, 3, 7] (unit-major).
    //
    // Expect
    // ------
    // - x̄ = 3.25, unit means [1.5, 5], time means [2, 4.5];
    //   ẍ = [0.75, −0.75, −0.75, 0.75].
    fn double_demean_matches_closed_form_on_balanced_layout() {
        // Arrange
        let x = array![[1.0], [2.0], [3.0], [7.0]];

        // Act
        let out = double_demean(&x, &[0, 0, 1, 1], &[0, 1, 0, 1]).unwrap();

        // Assert
        let expected = [0.75, -0.75, -0.75, 0.75];
        for (a, b) in out.column(0).iter().zip(expected) {
            assert_abs_diff_eq!(*a, b, epsilon = 1e-14);
        }
    }

    #[test]
    // Purpose
    // -------
    // On an unbalanced layout the result sums to zero within every unit and
    // every period, and a second application changes nothing.
    fn double_demean_is_orthogonal_and_idempotent_on_unbalanced_layout() {
        // Arrange
        let unit = [0, 0, 0, 1, 1, 2, 2, 2];
        let time = [0, 1, 2, 0, 2, 0, 1, 2];
        let x = array![1.0, 4.0, 2.0, -3.0, 5.0, 0.5, 8.0, 1.5];

        // Act
        let once = double_demean_vec(&x, &unit, &time).unwrap();
        let twice = double_demean_vec(&once, &unit, &time).unwrap();

        // Assert
        for g in 0..3 {
            let s: f64 = once.iter().zip(&unit).filter(|(_, u)| **u == g).map(|(v, _)| v).sum();
            assert_abs_diff_eq!(s, 0.0, epsilon = 1e-10);
            let s: f64 = once.iter().zip(&time).filter(|(_, t)| **t == g).map(|(v, _)| v).sum();
            assert_abs_diff_eq!(s, 0.0, epsilon = 1e-10);
        }
        for (a, b) in once.iter().zip(twice.iter()) {
            assert_abs_diff_eq!(*a, *b, epsilon = 1e-10);
        }
    }

    #[test]
    // Purpose
    // -------
    // W marks treated rows in non-base periods, one column per placebo
    // period.
    //
    // Given
    // -----
    // - One treated and one control unit over periods 1, 2, 3 (base 3).
    //
    // Expect
    // ------
    // - Treated rows in periods 1 and 2 set columns 0 and 1; all other
    //   entries are zero.
    fn construct_w_marks_treated_placebo_rows() {
        // Arrange
        let data = PanelData::new(
            array![0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            array![1, 1, 1, 2, 2, 2],
            array![1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
            array![1.0, 2.0, 3.0, 1.0, 2.0, 3.0],
        )
        .unwrap();
        let panel = process_panel(&data, &PanelOptions::default()).unwrap();

        // Act
        let w = construct_w(&panel);

        // Assert
        assert_eq!(
            w,
            array![[1.0, 0.0], [0.0, 1.0], [0.0, 0.0], [0.0, 0.0], [0.0, 0.0], [0.0, 0.0]]
        );
    }
}
