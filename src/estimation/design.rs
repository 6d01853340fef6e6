//! estimation::design — demeaned regression inputs.
//!
//! Purpose
//! -------
//! Hold the double-demeaned outcome Ÿ and regressor matrix [Ẅ Ẍ] (placebo
//! columns first, covariates after) together with the row → individual /
//! period / cluster indices the variance estimators and the bootstrap need.
//!
//! Invariants & assumptions
//! ------------------------
//! - `regressors` has `n_placebo` leading placebo columns whose labels are
//!   `placebo_periods`, followed by the covariate columns.
//! - `raw_sq_norms[j]` is the squared norm of regressor j before demeaning.
//!   It is the scale the rank screen measures a demeaned column against.
//! - Values are immutable once built; column selection returns a new value.
use ndarray::{Array1, Array2, ArrayView2, Axis, s};

use crate::{
    estimation::{
        demean::{construct_w, double_demean, double_demean_vec},
        errors::EstimationResult,
    },
    panel::ProcessedPanel,
};

/// DesignMatrices — demeaned outcome and regressors with row indices.
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrices {
    y: Array1<f64>,
    regressors: Array2<f64>,
    raw_sq_norms: Array1<f64>,
    n_placebo: usize,
    placebo_periods: Vec<f64>,
    covariate_columns: Vec<usize>,
    unit: Vec<usize>,
    time: Vec<usize>,
    cluster: Vec<usize>,
    n_units: usize,
    n_clusters: usize,
    balanced: bool,
}

impl DesignMatrices {
    /// Build Ÿ and [Ẅ Ẍ] from a processed panel.
    ///
    /// # Errors
    /// - `EstimationError::DemeanNotConverged` from [`double_demean`].
    pub fn build(panel: &ProcessedPanel) -> EstimationResult<Self> {
        let unit = panel.unit_index();
        let time = panel.time_index();
        let s = panel.structure();

        let y = double_demean_vec(panel.outcome(), unit, time)?;
        let raw_w = construct_w(panel);
        let w = double_demean(&raw_w, unit, time)?;
        let (regressors, raw_sq_norms) = match panel.covariates() {
            Some(x) => {
                let x_dm = double_demean(x, unit, time)?;
                let stacked = ndarray::concatenate(Axis(1), &[w.view(), x_dm.view()])
                    .map_err(|e| anyhow::anyhow!("stacking regressors: {e}"))?;
                let norms = column_sq_norms(&raw_w).into_iter().chain(column_sq_norms(x)).collect::<Array1<f64>>();
                (stacked, norms)
            }
            None => (w, column_sq_norms(&raw_w)),
        };

        Ok(Self {
            y,
            regressors,
            raw_sq_norms,
            n_placebo: s.n_placebo(),
            placebo_periods: s.placebo_periods.clone(),
            covariate_columns: (0..panel.n_covariates()).collect(),
            unit: unit.to_vec(),
            time: time.to_vec(),
            cluster: panel.cluster_index().to_vec(),
            n_units: s.n_individuals,
            n_clusters: s.n_clusters,
            balanced: s.balanced,
        })
    }

    /// Keep only the listed regressor columns (ascending indices into the
    /// current regressor matrix). Placebo labels and covariate positions
    /// follow the selection.
    pub fn select_columns(&self, columns: &[usize]) -> Self {
        let n_placebo = columns.iter().filter(|&&c| c < self.n_placebo).count();
        let placebo_periods =
            columns.iter().filter(|&&c| c < self.n_placebo).map(|&c| self.placebo_periods[c]).collect();
        let covariate_columns = columns
            .iter()
            .filter(|&&c| c >= self.n_placebo)
            .map(|&c| self.covariate_columns[c - self.n_placebo])
            .collect();
        Self {
            regressors: self.regressors.select(Axis(1), columns),
            raw_sq_norms: self.raw_sq_norms.select(Axis(0), columns),
            n_placebo,
            placebo_periods,
            covariate_columns,
            ..self.clone()
        }
    }

    /// Demeaned outcome Ÿ.
    pub fn y(&self) -> &Array1<f64> {
        &self.y
    }

    /// Demeaned regressors [Ẅ Ẍ].
    pub fn regressors(&self) -> &Array2<f64> {
        &self.regressors
    }

    /// Squared column norms of the regressors before demeaning.
    pub fn raw_sq_norms(&self) -> &Array1<f64> {
        &self.raw_sq_norms
    }

    /// Leading placebo block Ẅ.
    pub fn placebo_block(&self) -> ArrayView2<'_, f64> {
        self.regressors.slice(s![.., ..self.n_placebo])
    }

    /// Number of placebo columns.
    pub fn n_placebo(&self) -> usize {
        self.n_placebo
    }

    /// Number of covariate columns.
    pub fn n_covariates(&self) -> usize {
        self.covariate_columns.len()
    }

    /// Total number of regressors.
    pub fn n_params(&self) -> usize {
        self.regressors.ncols()
    }

    /// Labels of the placebo columns.
    pub fn placebo_periods(&self) -> &[f64] {
        &self.placebo_periods
    }

    /// Original covariate column of each kept covariate.
    pub fn covariate_columns(&self) -> &[usize] {
        &self.covariate_columns
    }

    pub fn n_obs(&self) -> usize {
        self.y.len()
    }

    pub fn unit_index(&self) -> &[usize] {
        &self.unit
    }

    pub fn time_index(&self) -> &[usize] {
        &self.time
    }

    pub fn cluster_index(&self) -> &[usize] {
        &self.cluster
    }

    pub fn n_units(&self) -> usize {
        self.n_units
    }

    pub fn n_clusters(&self) -> usize {
        self.n_clusters
    }

    pub fn balanced(&self) -> bool {
        self.balanced
    }
}

fn column_sq_norms(a: &Array2<f64>) -> Array1<f64> {
    a.columns().into_iter().map(|c| c.dot(&c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelData, PanelOptions, process_panel};
    use ndarray::array;

    #[test]
    // Purpose
    // -------
    // Selecting columns keeps placebo labels and covariate positions in
    // step with the regressor matrix.
    //
    // Given
    // -----
    // - Three periods (T = 2) and two covariates; keep columns [1, 3].
    //
    // Expect
    // ------
    // - One placebo column labelled period 2 and covariate 1.
    fn select_columns_tracks_labels() {
        // Arrange
        let data = PanelData::new(
            array![1.0, 2.0, 4.0, 0.0, 1.0, 5.0],
            array![1, 1, 1, 2, 2, 2],
            array![1.0, 1.0, 1.0, 0.0, 0.0, 0.0],
            array![1.0, 2.0, 3.0, 1.0, 2.0, 3.0],
        )
        .unwrap()
        .with_covariates(array![[0.1, 1.0], [0.4, 2.0], [0.2, 0.0], [0.9, 1.0], [0.3, 3.0], [0.5, 2.0]])
        .unwrap();
        let panel = process_panel(&data, &PanelOptions::default()).unwrap();
        let design = DesignMatrices::build(&panel).unwrap();

        // Act
        let reduced = design.select_columns(&[1, 3]);

        // Assert
        assert_eq!(design.n_params(), 4);
        assert_eq!(reduced.n_placebo(), 1);
        assert_eq!(reduced.placebo_periods(), &[2.0]);
        assert_eq!(reduced.covariate_columns(), &[1]);
        assert_eq!(reduced.regressors().column(1), design.regressors().column(3));
    }
}
