//! panel::structure — validated, filtered, and indexed panel.
//!
//! Purpose
//! -------
//! Turn raw [`PanelData`] into a [`ProcessedPanel`]: missing rows dropped,
//! the pre-treatment window and base period resolved, rows outside the
//! window removed, and dense individual / period / cluster indices built
//! for the demeaning and variance code.
//!
//! Key behaviors
//! -------------
//! - Steps run in a fixed order: drop incomplete rows, check the group is
//!   binary, resolve the pre-treatment set, resolve the base period, derive
//!   the ascending placebo periods, filter rows, index individuals, then
//!   detect balance.
//! - [`PanelStructure`] summarizes the result (n, T, N_obs, balance, NA
//!   count, labels) for reporting.
//! - [`ProcessedPanel::subset_units`] re-indexes a subset of individuals
//!   for the subsampling used by the RMS test.
//!
//! Invariants & assumptions
//! ------------------------
//! - The base period belongs to the pre-treatment set, which has at least
//!   two periods, so T = |pre| − 1 ≥ 1.
//! - Each (individual, period) pair occurs at most once.
//! - Group membership is constant within an individual.
//! - At least one treated and one control individual remain.
//!
//! Conventions
//! -----------
//! - Period indices refer to the ascending pre-treatment periods (base
//!   included). Placebo column l corresponds to the l-th non-base period.
//! - Individuals are indexed in ascending id order; clusters in ascending
//!   cluster-id order. Without a cluster column every individual is its own
//!   cluster.
//!
//! Testing notes
//! -------------
//! - Unit tests cover every validation branch, NA counting, window
//!   filtering, default and explicit base periods, balance detection, and
//!   unit subsetting.
use std::collections::{BTreeMap, HashSet};

use ndarray::{Array1, Array2, Axis};

use crate::panel::{
    data::PanelData,
    errors::{PanelError, PanelResult},
    options::PanelOptions,
};

/// PanelStructure — summary of a processed panel.
///
/// Fields
/// ------
/// - `n_individuals`: number of distinct individuals n.
/// - `n_treated`, `n_control`: individuals per group.
/// - `placebo_periods`: ascending placebo period labels (base excluded).
/// - `base_period`: the reference period.
/// - `n_obs`: rows after dropping NA and filtering to the window.
/// - `balanced`: every individual observed once in every selected period.
/// - `na_omitted`: raw rows dropped for missing values.
/// - `n_clusters`: number of distinct clusters (individuals by default).
#[derive(Debug, Clone, PartialEq)]
pub struct PanelStructure {
    pub n_individuals: usize,
    pub n_treated: usize,
    pub n_control: usize,
    pub placebo_periods: Vec<f64>,
    pub base_period: f64,
    pub n_obs: usize,
    pub balanced: bool,
    pub na_omitted: usize,
    pub n_clusters: usize,
}

impl PanelStructure {
    /// Number of placebo periods T requested by the window.
    pub fn n_placebo(&self) -> usize {
        self.placebo_periods.len()
    }

    /// Number of selected periods, base included (T + 1).
    pub fn n_periods(&self) -> usize {
        self.placebo_periods.len() + 1
    }
}

/// ProcessedPanel — filtered panel with dense indices.
///
/// Invariants
/// ----------
/// - All per-row vectors have length `structure.n_obs`.
/// - `unit[i] < n_individuals`, `time[i] < n_periods`,
///   `cluster[i] < n_clusters`.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPanel {
    structure: PanelStructure,
    periods: Vec<f64>,
    base_index: usize,
    outcome: Array1<f64>,
    unit: Vec<usize>,
    time: Vec<usize>,
    cluster: Vec<usize>,
    unit_ids: Vec<i64>,
    unit_treated: Vec<bool>,
    covariates: Option<Array2<f64>>,
}

impl ProcessedPanel {
    /// Summary of the processed panel.
    pub fn structure(&self) -> &PanelStructure {
        &self.structure
    }

    /// Selected periods in ascending order, base included.
    pub fn periods(&self) -> &[f64] {
        &self.periods
    }

    /// Outcome per kept row.
    pub fn outcome(&self) -> &Array1<f64> {
        &self.outcome
    }

    /// Dense individual index per row.
    pub fn unit_index(&self) -> &[usize] {
        &self.unit
    }

    /// Dense period index per row.
    pub fn time_index(&self) -> &[usize] {
        &self.time
    }

    /// Dense cluster index per row.
    pub fn cluster_index(&self) -> &[usize] {
        &self.cluster
    }

    /// Original id of each dense individual index.
    pub fn unit_ids(&self) -> &[i64] {
        &self.unit_ids
    }

    /// Treatment flag of each dense individual index.
    pub fn unit_treated(&self) -> &[bool] {
        &self.unit_treated
    }

    /// Covariates for kept rows, if any.
    pub fn covariates(&self) -> Option<&Array2<f64>> {
        self.covariates.as_ref()
    }

    /// Number of covariate columns (0 without covariates).
    pub fn n_covariates(&self) -> usize {
        self.covariates.as_ref().map_or(0, |x| x.ncols())
    }

    /// Number of kept rows.
    pub fn n_obs(&self) -> usize {
        self.outcome.len()
    }

    /// Whether row `i` belongs to a treated individual.
    pub fn row_treated(&self, i: usize) -> bool {
        self.unit_treated[self.unit[i]]
    }

    /// Placebo column for a period index; `None` for the base period.
    pub fn placebo_column(&self, time: usize) -> Option<usize> {
        match time.cmp(&self.base_index) {
            std::cmp::Ordering::Less => Some(time),
            std::cmp::Ordering::Equal => None,
            std::cmp::Ordering::Greater => Some(time - 1),
        }
    }

    /// Restrict the panel to a subset of individuals.
    ///
    /// Parameters
    /// ----------
    /// - `units`: dense individual indices to keep (any order, duplicates
    ///   ignored).
    ///
    /// Returns
    /// -------
    /// A new panel over the same period window, with individuals and
    /// clusters re-indexed densely and the structure (n, N_obs, balance,
    /// clusters) recomputed. `na_omitted` is carried over.
    ///
    /// Errors
    /// ------
    /// - `PanelError::SubsampleTooSmall` if the subset lacks a treated or a
    ///   control individual.
    pub fn subset_units(&self, units: &[usize]) -> PanelResult<ProcessedPanel> {
        let mut keep = vec![false; self.structure.n_individuals];
        for &u in units {
            if u < keep.len() {
                keep[u] = true;
            }
        }
        let treated = (0..keep.len()).filter(|&u| keep[u] && self.unit_treated[u]).count();
        let control = (0..keep.len()).filter(|&u| keep[u] && !self.unit_treated[u]).count();
        if treated == 0 || control == 0 {
            return Err(PanelError::SubsampleTooSmall { treated, control });
        }

        let rows: Vec<usize> = (0..self.n_obs()).filter(|&i| keep[self.unit[i]]).collect();
        let mut new_unit_of = vec![usize::MAX; keep.len()];
        let mut unit_ids = Vec::new();
        let mut unit_treated = Vec::new();
        for u in (0..keep.len()).filter(|&u| keep[u]) {
            new_unit_of[u] = unit_ids.len();
            unit_ids.push(self.unit_ids[u]);
            unit_treated.push(self.unit_treated[u]);
        }
        let unit: Vec<usize> = rows.iter().map(|&i| new_unit_of[self.unit[i]]).collect();
        let time: Vec<usize> = rows.iter().map(|&i| self.time[i]).collect();
        let cluster = densify(rows.iter().map(|&i| self.cluster[i]));
        let n_clusters = cluster.iter().copied().max().map_or(0, |m| m + 1);

        let structure = PanelStructure {
            n_individuals: unit_ids.len(),
            n_treated: treated,
            n_control: control,
            placebo_periods: self.structure.placebo_periods.clone(),
            base_period: self.structure.base_period,
            n_obs: rows.len(),
            balanced: is_balanced(&unit, &time, unit_ids.len(), self.periods.len()),
            na_omitted: self.structure.na_omitted,
            n_clusters,
        };

        Ok(ProcessedPanel {
            structure,
            periods: self.periods.clone(),
            base_index: self.base_index,
            outcome: self.outcome.select(Axis(0), &rows),
            unit,
            time,
            cluster,
            unit_ids,
            unit_treated,
            covariates: self.covariates.as_ref().map(|x| x.select(Axis(0), &rows)),
        })
    }
}

/// Validate and reshape raw panel input.
///
/// Parameters
/// ----------
/// - `data`: `&PanelData`
///   Raw columns; NaN marks a missing value.
/// - `opts`: `&PanelOptions`
///   Optional explicit pre-treatment window and base period.
///
/// Returns
/// -------
/// `PanelResult<ProcessedPanel>`
///   The filtered, indexed panel and its [`PanelStructure`].
///
/// Errors
/// ------
/// - `PanelError::InvalidGroupValue` for a group value other than 0/1.
/// - `PanelError::PeriodNotObserved` if an explicit pre-treatment period is
///   absent from the (complete) data.
/// - `PanelError::TooFewPeriods` for fewer than 2 pre-treatment periods.
/// - `PanelError::BaseNotInPretreatment` for an explicit base outside the
///   window.
/// - `PanelError::NoObservations` if nothing survives NA removal.
/// - `PanelError::GroupNotConstant`, `PanelError::DuplicateObservation`,
///   `PanelError::MissingGroup` for structural violations.
///
/// Notes
/// -----
/// - The NA count refers to raw rows with any missing required value,
///   regardless of whether they would have been filtered by the window.
pub fn process_panel(data: &PanelData, opts: &PanelOptions) -> PanelResult<ProcessedPanel> {
    let n_raw = data.len();
    let complete: Vec<bool> = (0..n_raw).map(|i| row_is_complete(data, i)).collect();
    let na_omitted = complete.iter().filter(|&&c| !c).count();
    if na_omitted == n_raw {
        return Err(PanelError::NoObservations);
    }
    if na_omitted > 0 {
        log::debug!("dropped {na_omitted} of {n_raw} rows with missing values");
    }

    let group = data.group();
    let period = data.period();
    for i in (0..n_raw).filter(|&i| complete[i]) {
        let g = group[i];
        if g != 0.0 && g != 1.0 {
            return Err(PanelError::InvalidGroupValue { value: g });
        }
    }

    let observed = sorted_unique((0..n_raw).filter(|&i| complete[i]).map(|i| period[i]));
    let periods = resolve_pretreatment(&observed, opts)?;
    let base_period = resolve_base(&periods, opts)?;
    let base_index = find_period(&periods, base_period).ok_or(PanelError::BaseNotInPretreatment {
        base: base_period,
    })?;
    let placebo_periods: Vec<f64> =
        periods.iter().copied().filter(|&p| p != base_period).collect();

    let rows: Vec<usize> = (0..n_raw)
        .filter(|&i| complete[i] && find_period(&periods, period[i]).is_some())
        .collect();
    if rows.is_empty() {
        return Err(PanelError::NoObservations);
    }

    // Individuals in ascending id order.
    let ids = data.id();
    let unit_map: BTreeMap<i64, usize> = {
        let mut map = BTreeMap::new();
        for &i in &rows {
            map.insert(ids[i], 0);
        }
        for (dense, slot) in map.values_mut().enumerate() {
            *slot = dense;
        }
        map
    };
    let n_units = unit_map.len();
    let unit_ids: Vec<i64> = unit_map.keys().copied().collect();

    let mut unit_group: Vec<Option<bool>> = vec![None; n_units];
    let mut seen: HashSet<(usize, usize)> = HashSet::with_capacity(rows.len());
    let mut unit = Vec::with_capacity(rows.len());
    let mut time = Vec::with_capacity(rows.len());
    for &i in &rows {
        let u = unit_map[&ids[i]];
        let t = find_period(&periods, period[i]).unwrap_or(base_index);
        let treated = group[i] == 1.0;
        match unit_group[u] {
            None => unit_group[u] = Some(treated),
            Some(g) if g != treated => return Err(PanelError::GroupNotConstant { id: ids[i] }),
            Some(_) => {}
        }
        if !seen.insert((u, t)) {
            return Err(PanelError::DuplicateObservation { id: ids[i], period: period[i] });
        }
        unit.push(u);
        time.push(t);
    }
    let unit_treated: Vec<bool> = unit_group.into_iter().map(|g| g.unwrap_or(false)).collect();
    let n_treated = unit_treated.iter().filter(|&&t| t).count();
    let n_control = n_units - n_treated;
    if n_treated == 0 {
        return Err(PanelError::MissingGroup { treated: true });
    }
    if n_control == 0 {
        return Err(PanelError::MissingGroup { treated: false });
    }

    let cluster = match data.cluster() {
        Some(c) => densify_ids(rows.iter().map(|&i| c[i])),
        None => unit.clone(),
    };
    let n_clusters = cluster.iter().copied().max().map_or(0, |m| m + 1);

    let balanced = is_balanced(&unit, &time, n_units, periods.len());
    if !balanced {
        log::debug!(
            "unbalanced panel: {} rows for {n_units} individuals over {} periods",
            rows.len(),
            periods.len()
        );
    }

    let structure = PanelStructure {
        n_individuals: n_units,
        n_treated,
        n_control,
        placebo_periods,
        base_period,
        n_obs: rows.len(),
        balanced,
        na_omitted,
        n_clusters,
    };

    Ok(ProcessedPanel {
        structure,
        periods,
        base_index,
        outcome: data.outcome().select(Axis(0), &rows),
        unit,
        time,
        cluster,
        unit_ids,
        unit_treated,
        covariates: data.covariates().map(|x| x.select(Axis(0), &rows)),
    })
}

//
// ---------- Private helpers (compact docs) ----------
//

/// Row has finite outcome, group, period, and covariates.
fn row_is_complete(data: &PanelData, i: usize) -> bool {
    let scalar_ok =
        data.outcome()[i].is_finite() && data.group()[i].is_finite() && data.period()[i].is_finite();
    let cov_ok = data.covariates().is_none_or(|x| x.row(i).iter().all(|v| v.is_finite()));
    scalar_ok && cov_ok
}

/// Ascending, de-duplicated copy of finite values.
fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.collect();
    out.sort_by(|a, b| a.total_cmp(b));
    out.dedup();
    out
}

/// Position of `p` in an ascending period list.
fn find_period(periods: &[f64], p: f64) -> Option<usize> {
    periods.binary_search_by(|q| q.total_cmp(&p)).ok()
}

/// Explicit window (validated against observed periods) or all observed.
fn resolve_pretreatment(observed: &[f64], opts: &PanelOptions) -> PanelResult<Vec<f64>> {
    let periods = match &opts.pretreatment_periods {
        Some(explicit) => {
            let wanted = sorted_unique(explicit.iter().copied());
            if let Some(&missing) = wanted.iter().find(|&&p| find_period(observed, p).is_none()) {
                return Err(PanelError::PeriodNotObserved { period: missing });
            }
            wanted
        }
        None => observed.to_vec(),
    };
    if periods.len() < 2 {
        return Err(PanelError::TooFewPeriods { found: periods.len() });
    }
    Ok(periods)
}

/// Explicit base (must lie in the window) or the latest pre-treatment period.
fn resolve_base(periods: &[f64], opts: &PanelOptions) -> PanelResult<f64> {
    match opts.base_period {
        Some(base) if find_period(periods, base).is_some() => Ok(base),
        Some(base) => Err(PanelError::BaseNotInPretreatment { base }),
        None => periods.last().copied().ok_or(PanelError::TooFewPeriods { found: 0 }),
    }
}

/// Balanced iff N_obs = n·P (duplicates are rejected upstream).
fn is_balanced(unit: &[usize], time: &[usize], n_units: usize, n_periods: usize) -> bool {
    if unit.len() != n_units * n_periods {
        return false;
    }
    let mut cell = vec![false; n_units * n_periods];
    for (&u, &t) in unit.iter().zip(time) {
        cell[u * n_periods + t] = true;
    }
    cell.into_iter().all(|c| c)
}

/// Dense 0-based codes for integer ids, in ascending id order.
fn densify_ids(ids: impl Iterator<Item = i64> + Clone) -> Vec<usize> {
    let mut map: BTreeMap<i64, usize> = ids.clone().map(|c| (c, 0)).collect();
    for (dense, slot) in map.values_mut().enumerate() {
        *slot = dense;
    }
    ids.map(|c| map[&c]).collect()
}

/// Dense 0-based codes for already-dense indices after subsetting.
fn densify(codes: impl Iterator<Item = usize> + Clone) -> Vec<usize> {
    densify_ids(codes.map(|c| c as i64))
}
