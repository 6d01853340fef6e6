//! statistical_tests::outcome — result types shared by the equivalence tests.
//!
//! Purpose
//! -------
//! Represent what a test returns: the statistic, the per-coefficient
//! summaries, and a [`Decision`] that is either a threshold verdict or the
//! minimum threshold found by search. [`TestResult`] tags the three
//! outcome types by test kind.
//!
//! Conventions
//! -----------
//! - Outcomes are plain values computed once per call and never cached.
//! - Every outcome embeds the [`PanelStructure`] it was computed on, so a
//!   caller can report n, T, balance and dropped NA rows next to the verdict.
use crate::{
    inference::VceKind,
    panel::PanelStructure,
    statistical_tests::{bootstrap::BootstrapDiagnostics, max_test::MaxMethod},
};

/// Conservatism note attached to every intersection-union max test.
pub const IU_CONSERVATIVE_NOTE: &str = "The intersection-union test controls size at alpha without \
    multiplicity correction; its actual size is at most alpha and can be much smaller when several \
    placebo coefficients sit at the threshold.";

/// How a test is run: against a given threshold, or searching for the
/// smallest threshold at which it rejects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum TestMode {
    Threshold(f64),
    #[default]
    Search,
}

/// Decision — verdict of a single test call.
///
/// - `Threshold`: H0 (non-equivalence at `threshold`) is rejected iff
///   `reject`. `critical_value` is the single critical value the statistic
///   is compared against; `None` for the IU max test, whose critical values
///   are per coefficient.
/// - `Search`: the smallest threshold at which H0 is rejected at level α.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Decision {
    Threshold { threshold: f64, critical_value: Option<f64>, reject: bool },
    Search { min_threshold: f64 },
}

impl Decision {
    /// Verdict in threshold mode.
    pub fn reject(&self) -> Option<bool> {
        match self {
            Decision::Threshold { reject, .. } => Some(*reject),
            Decision::Search { .. } => None,
        }
    }

    /// Minimum threshold in search mode.
    pub fn min_threshold(&self) -> Option<f64> {
        match self {
            Decision::Threshold { .. } => None,
            Decision::Search { min_threshold } => Some(*min_threshold),
        }
    }
}

/// Per-coefficient summary of the placebo regression.
///
/// `critical_value` is set by the IU max test in threshold mode and
/// `min_threshold` in search mode; both are `None` otherwise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoefficientSummary {
    pub period: f64,
    pub estimate: f64,
    pub se: f64,
    pub critical_value: Option<f64>,
    pub min_threshold: Option<f64>,
}

/// Outcome of [`max_test`](crate::statistical_tests::max_test).
#[derive(Debug, Clone, PartialEq)]
pub struct MaxTestOutcome {
    pub method: MaxMethod,
    pub vce: VceKind,
    pub alpha: f64,
    /// ‖β̂_P‖∞.
    pub max_abs_coef: f64,
    pub coefficients: Vec<CoefficientSummary>,
    pub decision: Decision,
    /// Replication diagnostics for the bootstrap methods.
    pub bootstrap: Option<BootstrapDiagnostics>,
    /// Placebo periods dropped as collinear.
    pub dropped_periods: Vec<f64>,
    pub structure: PanelStructure,
    /// Conservatism note, set for the IU method.
    pub note: Option<&'static str>,
}

/// Outcome of [`mean_test`](crate::statistical_tests::mean_test).
#[derive(Debug, Clone, PartialEq)]
pub struct MeanTestOutcome {
    pub vce: VceKind,
    pub alpha: f64,
    /// β̄ = mean of the placebo coefficients.
    pub mean_coef: f64,
    /// |β̄|.
    pub abs_mean: f64,
    /// √(d'Σ̂d).
    pub se: f64,
    /// cdf(|β̄|; τ, se), threshold mode only.
    pub p_value: Option<f64>,
    pub coefficients: Vec<CoefficientSummary>,
    pub decision: Decision,
    pub dropped_periods: Vec<f64>,
    pub structure: PanelStructure,
}

/// RMS confidence interval at one level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RmsInterval {
    /// Confidence level in percent (80, 90, 95, 98 or 99).
    pub level: u32,
    pub ms_lower: f64,
    pub ms_upper: f64,
    pub rms_lower: f64,
    pub rms_upper: f64,
}

/// Outcome of [`rms_test`](crate::statistical_tests::rms_test).
#[derive(Debug, Clone, PartialEq)]
pub struct RmsTestOutcome {
    pub alpha: f64,
    /// Full-sample mean square M̂ = ‖β̂_P‖²/T.
    pub ms: f64,
    /// √M̂.
    pub rms: f64,
    /// Self-normalizer V̂.
    pub v_hat: f64,
    /// Subsample fractions λ_k.
    pub lambdas: Vec<f64>,
    /// Mean squares on each subsample.
    pub subsample_ms: Vec<f64>,
    /// Q_W(α) used for the decision.
    pub w_quantile: f64,
    pub decision: Decision,
    pub confidence_intervals: Vec<RmsInterval>,
    /// Seed of the subsample permutations.
    pub seed: u64,
    /// Per-coefficient standard errors are descriptive; when the covariance
    /// estimator fails they are NaN and this holds the reason.
    pub se_error: Option<String>,
    pub coefficients: Vec<CoefficientSummary>,
    pub structure: PanelStructure,
}

/// TestResult — outcome tagged by test kind.
#[derive(Debug, Clone, PartialEq)]
pub enum TestResult {
    Max(MaxTestOutcome),
    Mean(MeanTestOutcome),
    Rms(RmsTestOutcome),
}

impl TestResult {
    pub fn decision(&self) -> &Decision {
        match self {
            TestResult::Max(o) => &o.decision,
            TestResult::Mean(o) => &o.decision,
            TestResult::Rms(o) => &o.decision,
        }
    }

    pub fn structure(&self) -> &PanelStructure {
        match self {
            TestResult::Max(o) => &o.structure,
            TestResult::Mean(o) => &o.structure,
            TestResult::Rms(o) => &o.structure,
        }
    }

    /// Verdict in threshold mode.
    pub fn reject(&self) -> Option<bool> {
        self.decision().reject()
    }

    /// Minimum threshold in search mode.
    pub fn min_threshold(&self) -> Option<f64> {
        self.decision().min_threshold()
    }
}

impl From<MaxTestOutcome> for TestResult {
    fn from(o: MaxTestOutcome) -> Self {
        TestResult::Max(o)
    }
}

impl From<MeanTestOutcome> for TestResult {
    fn from(o: MeanTestOutcome) -> Self {
        TestResult::Mean(o)
    }
}

impl From<RmsTestOutcome> for TestResult {
    fn from(o: RmsTestOutcome) -> Self {
        TestResult::Rms(o)
    }
}
