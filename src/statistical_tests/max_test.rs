//! statistical_tests::max_test — equivalence test on the largest placebo
//! coefficient.
//!
//! Purpose
//! -------
//! Test H0: max_l |β_l| ≥ δ against H1: max_l |β_l| < δ, either at a given
//! δ or by searching for the smallest δ at which H0 is rejected.
//!
//! Key behaviors
//! -------------
//! - [`MaxMethod::Iu`]: intersection-union. Reject iff every |β̂_l| lies
//!   below the α-quantile of FoldedNormal(δ, se_l). Per-coefficient critical
//!   values (or minimum thresholds) are reported, together with a note that
//!   the test is conservative.
//! - [`MaxMethod::Bootstrap`] / [`MaxMethod::WildBootstrap`]: resample at
//!   the constrained estimate β̂_c on the null boundary and compare ‖β̂_P‖∞
//!   with the α-quantile of the bootstrap sup-norms.
//! - Search mode for the bootstrap bisects on δ with common random numbers
//!   (see `statistical_tests::min_threshold`).
//!
//! Invariants & assumptions
//! ------------------------
//! - Options are validated before the panel is processed.
//! - A constrained fit that misses the boundary aborts the test with a
//!   convergence error rather than resampling from a wrong null point.
//!
//! Conventions
//! -----------
//! - `MaxMethod` parses "iu", "boot"/"bootstrap" and
//!   "wild"/"wildboot"/"wild_bootstrap", case-insensitively.
//! - With `seed = None` a base seed is drawn from OS entropy and reported in
//!   the outcome's bootstrap diagnostics.
use std::str::FromStr;

use ndarray::{Array2, s};

use crate::{
    estimation::{DesignMatrices, PlaceboFit, estimate_constrained, estimate_placebo, sigma_hathat_c},
    folded_normal::{min_threshold_iu, quantile},
    inference::{VceKind, estimate_variance},
    panel::{PanelData, PanelOptions, process_panel},
    statistical_tests::{
        bootstrap::{
            BootstrapConfig, BootstrapDiagnostics, BootstrapProblem, Resampling, bootstrap_critical_value,
            entropy_seed,
        },
        errors::{EquivalenceError, EquivalenceResult},
        min_threshold::bootstrap_min_threshold,
        outcome::{CoefficientSummary, Decision, IU_CONSERVATIVE_NOTE, MaxTestOutcome, TestMode},
        validation::{
            validate_alpha, validate_failure_fraction, validate_replications, validate_search_tol,
            validate_threshold,
        },
    },
};

/// Default number of bootstrap replications.
pub const DEFAULT_REPLICATIONS: usize = 1000;
/// Default largest tolerated share of failed replications.
pub const DEFAULT_MAX_FAILURE_FRACTION: f64 = 0.1;

/// Max-test procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MaxMethod {
    /// Intersection-union test with folded-normal critical values.
    #[default]
    Iu,
    /// Parametric bootstrap with spherical normal errors.
    Bootstrap,
    /// Wild cluster bootstrap with Rademacher weights.
    WildBootstrap,
}

impl MaxMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            MaxMethod::Iu => "iu",
            MaxMethod::Bootstrap => "bootstrap",
            MaxMethod::WildBootstrap => "wild_bootstrap",
        }
    }
}

impl std::fmt::Display for MaxMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaxMethod {
    type Err = EquivalenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "iu" => Ok(MaxMethod::Iu),
            "boot" | "bootstrap" => Ok(MaxMethod::Bootstrap),
            "wild" | "wildboot" | "wild_bootstrap" => Ok(MaxMethod::WildBootstrap),
            _ => Err(EquivalenceError::UnknownMethod { name: s.to_string() }),
        }
    }
}

/// MaxTestOptions — configuration of a max test.
///
/// Fields
/// ------
/// - `method`: IU, bootstrap or wild bootstrap.
/// - `vce`: covariance estimator for the reported (and IU) standard errors.
/// - `alpha`: significance level in (0, 1).
/// - `mode`: a threshold δ or a search for the minimum δ.
/// - `replications`: bootstrap replications B.
/// - `seed`: bootstrap base seed; `None` draws one from OS entropy.
/// - `search_tol`: bisection tolerance; `None` uses `1e-4 · max(se)`
///   (at least 1e-10).
/// - `max_failure_fraction`: largest tolerated share of failed
///   replications.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxTestOptions {
    pub method: MaxMethod,
    pub vce: VceKind,
    pub alpha: f64,
    pub mode: TestMode,
    pub replications: usize,
    pub seed: Option<u64>,
    pub search_tol: Option<f64>,
    pub max_failure_fraction: f64,
}

impl Default for MaxTestOptions {
    fn default() -> Self {
        Self {
            method: MaxMethod::Iu,
            vce: VceKind::default(),
            alpha: 0.05,
            mode: TestMode::Search,
            replications: DEFAULT_REPLICATIONS,
            seed: None,
            search_tol: None,
            max_failure_fraction: DEFAULT_MAX_FAILURE_FRACTION,
        }
    }
}

impl MaxTestOptions {
    /// Validated options with defaults for everything else.
    ///
    /// # Errors
    /// - `EquivalenceError::InvalidAlpha` / `EquivalenceError::InvalidThreshold`.
    pub fn new(method: MaxMethod, alpha: f64, mode: TestMode) -> EquivalenceResult<Self> {
        let opts = Self { method, alpha, mode, ..Self::default() };
        opts.validate()?;
        Ok(opts)
    }

    /// Check every field against its documented range.
    pub fn validate(&self) -> EquivalenceResult<()> {
        validate_alpha(self.alpha)?;
        if let TestMode::Threshold(delta) = self.mode {
            validate_threshold("delta", delta)?;
        }
        if self.method != MaxMethod::Iu {
            validate_replications(self.replications)?;
            validate_failure_fraction(self.max_failure_fraction)?;
            validate_search_tol(self.search_tol)?;
        }
        Ok(())
    }
}

/// Run the max equivalence test.
///
/// Parameters
/// ----------
/// - `data`: raw panel columns.
/// - `panel_opts`: pre-treatment window and base period.
/// - `opts`: method, α, mode and bootstrap settings.
///
/// Returns
/// -------
/// `EquivalenceResult<MaxTestOutcome>`
///
/// Errors
/// ------
/// - Validation errors for options and panel structure.
/// - Singular-matrix errors from estimation or variance estimation.
/// - `EquivalenceError::ConstrainedNotConverged`,
///   `EquivalenceError::BootstrapFailures`,
///   `EquivalenceError::SearchNotBracketed` for the bootstrap methods.
/// - Folded-normal root-finding failures for IU search.
///
/// Examples
/// --------
/// ```rust
/// use equitrends::panel::{PanelOptions, SimulationOptions, simulate_panel};
/// use equitrends::statistical_tests::{MaxMethod, MaxTestOptions, TestMode, max_test};
///
/// let data = simulate_panel(&SimulationOptions { n: 40, t: 2, beta: vec![0.0, 0.0], sd: 0.2, ..Default::default() }).unwrap();
/// let window = PanelOptions::new(Some(vec![1.0, 2.0, 3.0]), None).unwrap();
/// let opts = MaxTestOptions::new(MaxMethod::Iu, 0.05, TestMode::Threshold(1.0)).unwrap();
/// let out = max_test(&data, &window, &opts).unwrap();
/// assert_eq!(out.decision.reject(), Some(true));
/// ```
pub fn max_test(
    data: &PanelData, panel_opts: &PanelOptions, opts: &MaxTestOptions,
) -> EquivalenceResult<MaxTestOutcome> {
    opts.validate()?;
    let panel = process_panel(data, panel_opts)?;
    let (design, fit) = estimate_placebo(&panel)?;
    let t = fit.n_placebo();
    let variance = estimate_variance(&design, &fit, opts.vce, None)?;
    let se = variance.placebo_se(t);
    let max_abs_coef = fit.max_abs_placebo();

    let mut coefficients: Vec<CoefficientSummary> = (0..t)
        .map(|l| CoefficientSummary {
            period: fit.placebo_periods[l],
            estimate: fit.beta[l],
            se: se[l],
            critical_value: None,
            min_threshold: None,
        })
        .collect();

    let mut bootstrap = None;
    let decision = match opts.method {
        MaxMethod::Iu => match opts.mode {
            TestMode::Threshold(delta) => {
                let mut reject = true;
                for c in coefficients.iter_mut() {
                    let crit = quantile(opts.alpha, delta, c.se)?;
                    reject &= c.estimate.abs() < crit;
                    c.critical_value = Some(crit);
                }
                Decision::Threshold { threshold: delta, critical_value: None, reject }
            }
            TestMode::Search => {
                let mut overall = 0.0_f64;
                for c in coefficients.iter_mut() {
                    let m = min_threshold_iu(c.estimate, c.se, opts.alpha)?;
                    overall = overall.max(m);
                    c.min_threshold = Some(m);
                }
                Decision::Search { min_threshold: overall }
            }
        },
        MaxMethod::Bootstrap | MaxMethod::WildBootstrap => {
            let seed = opts.seed.unwrap_or_else(entropy_seed);
            let boundary = BoundaryBootstrap::new(&design, &fit, opts, seed);
            match opts.mode {
                TestMode::Threshold(delta) => {
                    let (crit, diagnostics) = boundary.critical_value(delta)?;
                    bootstrap = Some(diagnostics);
                    Decision::Threshold {
                        threshold: delta,
                        critical_value: Some(crit),
                        reject: max_abs_coef < crit,
                    }
                }
                TestMode::Search => {
                    let se_max = se.iter().fold(0.0_f64, |m, v| m.max(*v));
                    let tol = opts.search_tol.unwrap_or((1e-4 * se_max).max(1e-10));
                    let (min_threshold, diagnostics) =
                        bootstrap_min_threshold(&boundary, max_abs_coef, se_max, tol)?;
                    bootstrap = Some(diagnostics);
                    Decision::Search { min_threshold }
                }
            }
        }
    };

    Ok(MaxTestOutcome {
        method: opts.method,
        vce: opts.vce,
        alpha: opts.alpha,
        max_abs_coef,
        coefficients,
        decision,
        bootstrap,
        dropped_periods: fit.dropped_periods.clone(),
        structure: panel.structure().clone(),
        note: (opts.method == MaxMethod::Iu).then_some(IU_CONSERVATIVE_NOTE),
    })
}

/// Bootstrap at the null boundary for a fixed design.
///
/// Holds the placebo rows of (X'X)⁻¹X' so repeated calls at different δ
/// (threshold search) share the projection work.
pub(crate) struct BoundaryBootstrap<'a> {
    design: &'a DesignMatrices,
    fit: &'a PlaceboFit,
    projector: Array2<f64>,
    wild: bool,
    cfg: BootstrapConfig,
}

impl<'a> BoundaryBootstrap<'a> {
    pub(crate) fn new(design: &'a DesignMatrices, fit: &'a PlaceboFit, opts: &MaxTestOptions, seed: u64) -> Self {
        let t = fit.n_placebo();
        let projector = fit.xtx_inv.slice(s![..t, ..]).dot(&design.regressors().t());
        Self {
            design,
            fit,
            projector,
            wild: opts.method == MaxMethod::WildBootstrap,
            cfg: BootstrapConfig {
                replications: opts.replications,
                seed,
                alpha: opts.alpha,
                max_failure_fraction: opts.max_failure_fraction,
            },
        }
    }

    /// Bootstrap critical value at threshold δ.
    ///
    /// # Errors
    /// - `EquivalenceError::ConstrainedNotConverged` if β̂_c misses the
    ///   boundary.
    /// - Estimation and bootstrap failures.
    pub(crate) fn critical_value(&self, delta: f64) -> EquivalenceResult<(f64, BootstrapDiagnostics)> {
        let constrained = estimate_constrained(self.design, self.fit, delta)?;
        if !constrained.converged {
            return Err(EquivalenceError::ConstrainedNotConverged {
                delta,
                residual: constrained.constraint_residual,
            });
        }
        let fitted = self.design.regressors().dot(&constrained.beta);
        let resampling = if self.wild {
            Resampling::Wild {
                residuals: self.design.y() - &fitted,
                cluster: self.design.cluster_index().to_vec(),
                n_clusters: self.design.n_clusters(),
            }
        } else {
            Resampling::Spherical { sigma: sigma_hathat_c(&constrained.beta, self.design)?.sqrt() }
        };
        let problem = BootstrapProblem { projector: self.projector.clone(), fitted, resampling };
        bootstrap_critical_value(&problem, &self.cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{SimulationOptions, simulate_panel};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Method parsing.
    // - IU threshold and search modes, including the search / threshold
    //   consistency.
    // - Bootstrap reproducibility with a fixed seed.
    // - Option validation before any work.
    //
    // They intentionally DO NOT cover:
    // - The full AR(1) scenario (integration tests).
    // -------------------------------------------------------------------------

    fn sample(beta: Vec<f64>, sd: f64) -> (PanelData, PanelOptions) {
        let t = beta.len();
        let data = simulate_panel(&SimulationOptions { n: 60, t, beta, sd, seed: 3, ..Default::default() })
            .unwrap();
        let window = (1..=t + 1).map(|p| p as f64).collect();
        (data, PanelOptions::new(Some(window), None).unwrap())
    }

    #[test]
    // Purpose
    // -------
    // Every documented alias parses; anything else is rejected.
    fn max_method_parses_aliases() {
        assert_eq!("IU".parse::<MaxMethod>().unwrap(), MaxMethod::Iu);
        assert_eq!("boot".parse::<MaxMethod>().unwrap(), MaxMethod::Bootstrap);
        assert_eq!("Bootstrap".parse::<MaxMethod>().unwrap(), MaxMethod::Bootstrap);
        assert_eq!("wild".parse::<MaxMethod>().unwrap(), MaxMethod::WildBootstrap);
        assert_eq!("wildboot".parse::<MaxMethod>().unwrap(), MaxMethod::WildBootstrap);
        assert_eq!("wild_bootstrap".parse::<MaxMethod>().unwrap(), MaxMethod::WildBootstrap);
        assert!("bonferroni".parse::<MaxMethod>().is_err());
    }

    #[test]
    // Purpose
    // -------
    // The IU search threshold is the boundary of the IU threshold test:
    // slightly above it the test rejects, slightly below it does not.
    //
    // Given
    // -----
    // - T = 3, small true coefficients, OLS variance.
    //
    // Expect
    // ------
    // - Search returns δ* = max_l δ*_l; threshold mode rejects at 1.01·δ*
    //   and not at 0.99·δ*.
    fn iu_search_matches_threshold_boundary() {
        // Arrange
        let (data, window) = sample(vec![0.1, -0.05, 0.0], 0.5);
        let search = MaxTestOptions { vce: VceKind::Ols, ..Default::default() };

        // Act
        let found = max_test(&data, &window, &search).unwrap();
        let delta = found.decision.min_threshold().unwrap();
        let above = MaxTestOptions { mode: TestMode::Threshold(delta * 1.01), ..search };
        let below = MaxTestOptions { mode: TestMode::Threshold(delta * 0.99), ..search };

        // Assert
        let per_coef = found.coefficients.iter().filter_map(|c| c.min_threshold).fold(0.0, f64::max);
        assert_eq!(delta, per_coef);
        assert_eq!(max_test(&data, &window, &above).unwrap().decision.reject(), Some(true));
        assert_eq!(max_test(&data, &window, &below).unwrap().decision.reject(), Some(false));
        assert_eq!(found.note, Some(IU_CONSERVATIVE_NOTE));
    }

    #[test]
    // Purpose
    // -------
    // The bootstrap verdict and critical value are reproducible with a
    // fixed seed, and the diagnostics report that seed.
    fn bootstrap_threshold_is_reproducible() {
        // Arrange
        let (data, window) = sample(vec![0.0, 0.0], 0.3);
        let opts = MaxTestOptions {
            method: MaxMethod::Bootstrap,
            mode: TestMode::Threshold(0.5),
            replications: 199,
            seed: Some(2024),
            ..Default::default()
        };

        // Act
        let a = max_test(&data, &window, &opts).unwrap();
        let b = max_test(&data, &window, &opts).unwrap();

        // Assert
        assert_eq!(a.decision, b.decision);
        assert_eq!(a.bootstrap.map(|d| d.seed), Some(2024));
        assert_eq!(a.decision.reject(), Some(true));
        assert!(a.note.is_none());
    }

    #[test]
    // Purpose
    // -------
    // Invalid options fail before the panel is touched.
    fn invalid_options_fail_fast() {
        let (data, window) = sample(vec![0.0], 1.0);
        let bad_alpha = MaxTestOptions { alpha: 1.5, ..Default::default() };
        assert_eq!(
            max_test(&data, &window, &bad_alpha).unwrap_err(),
            EquivalenceError::InvalidAlpha { alpha: 1.5 }
        );
        let bad_delta = MaxTestOptions { mode: TestMode::Threshold(0.0), ..Default::default() };
        assert!(matches!(
            max_test(&data, &window, &bad_delta),
            Err(EquivalenceError::InvalidThreshold { name: "delta", .. })
        ));
    }
}
