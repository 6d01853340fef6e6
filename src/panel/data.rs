//! panel::data — raw, column-oriented panel input.
//!
//! Purpose
//! -------
//! Hold the caller's panel columns (outcome, individual id, group, period,
//! optional covariates and cluster id) with length checks done once at
//! construction.
//!
//! Conventions
//! -----------
//! - Missing values are `NaN` in the floating-point columns (outcome,
//!   group, period, covariates). Id and cluster columns are integers and
//!   cannot be missing.
//! - Covariates are an `N × k` matrix with one row per observation.
//! - No semantic validation happens here (binary group, duplicates,
//!   periods); that is `panel::structure::process_panel`'s job.
use ndarray::{Array1, Array2};

use crate::panel::errors::{PanelError, PanelResult};

/// PanelData — caller-supplied panel columns.
///
/// Fields
/// ------
/// - `outcome`: `Array1<f64>` outcome per row.
/// - `id`: `Array1<i64>` individual identifier per row.
/// - `group`: `Array1<f64>` treatment-group indicator per row (0 or 1).
/// - `period`: `Array1<f64>` period label per row.
/// - `covariates`: optional `N × k` covariate matrix.
/// - `cluster`: optional cluster identifier per row.
///
/// Invariants
/// ----------
/// - All columns have the same length `N ≥ 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelData {
    outcome: Array1<f64>,
    id: Array1<i64>,
    group: Array1<f64>,
    period: Array1<f64>,
    covariates: Option<Array2<f64>>,
    cluster: Option<Array1<i64>>,
}

impl PanelData {
    /// Build a panel from its four required columns.
    ///
    /// # Errors
    /// - `PanelError::EmptyPanel` if `outcome` is empty.
    /// - `PanelError::LengthMismatch` if any column's length differs from
    ///   `outcome.len()`.
    pub fn new(
        outcome: Array1<f64>, id: Array1<i64>, group: Array1<f64>, period: Array1<f64>,
    ) -> PanelResult<Self> {
        let n = outcome.len();
        if n == 0 {
            return Err(PanelError::EmptyPanel);
        }
        check_len("id", n, id.len())?;
        check_len("group", n, group.len())?;
        check_len("period", n, period.len())?;
        Ok(Self { outcome, id, group, period, covariates: None, cluster: None })
    }

    /// Attach an `N × k` covariate matrix.
    ///
    /// # Errors
    /// - `PanelError::LengthMismatch` if the row count differs from `N`.
    pub fn with_covariates(mut self, covariates: Array2<f64>) -> PanelResult<Self> {
        check_len("covariates", self.len(), covariates.nrows())?;
        self.covariates = if covariates.ncols() == 0 { None } else { Some(covariates) };
        Ok(self)
    }

    /// Attach a cluster identifier column.
    ///
    /// # Errors
    /// - `PanelError::LengthMismatch` if its length differs from `N`.
    pub fn with_cluster(mut self, cluster: Array1<i64>) -> PanelResult<Self> {
        check_len("cluster", self.len(), cluster.len())?;
        self.cluster = Some(cluster);
        Ok(self)
    }

    /// Number of raw rows.
    pub fn len(&self) -> usize {
        self.outcome.len()
    }

    /// Always false for a constructed panel.
    pub fn is_empty(&self) -> bool {
        self.outcome.is_empty()
    }

    /// Outcome column.
    pub fn outcome(&self) -> &Array1<f64> {
        &self.outcome
    }

    /// Individual id column.
    pub fn id(&self) -> &Array1<i64> {
        &self.id
    }

    /// Group column.
    pub fn group(&self) -> &Array1<f64> {
        &self.group
    }

    /// Period column.
    pub fn period(&self) -> &Array1<f64> {
        &self.period
    }

    /// Covariate matrix, if any.
    pub fn covariates(&self) -> Option<&Array2<f64>> {
        self.covariates.as_ref()
    }

    /// Cluster column, if any.
    pub fn cluster(&self) -> Option<&Array1<i64>> {
        self.cluster.as_ref()
    }
}

fn check_len(field: &'static str, expected: usize, found: usize) -> PanelResult<()> {
    if expected != found {
        return Err(PanelError::LengthMismatch { field, expected, found });
    }
    Ok(())
}
