//! panel::simulate — seeded generator of difference-in-differences panels.
//!
//! Purpose
//! -------
//! Produce reproducible panels with known placebo coefficients for tests,
//! examples, and power studies.
//!
//! Model
//! -----
//! For individuals i = 1..=n and periods s = 1..=T+1+post:
//!
//! ```text
//! Y_is = α_i + λ_s + β_s·G_i·1[s ≤ T] + att·G_i·1[s > T+1] + X_is'γ + u_is
//! u_is = Σ_j φ_j u_i,s−j + ε_is,   ε_is ~ N(0, (sd·(1 + het·G_i))²)
//! ```
//!
//! with α_i, λ_s and every covariate entry drawn i.i.d. N(0, 1). Period
//! T + 1 is the last pre-treatment period, so with the default base period
//! the true placebo coefficients are exactly `beta`.
//!
//! Conventions
//! -----------
//! - Rows are ordered by individual, then period.
//! - The first `round(n·treated_share)` individuals (clamped to 1..=n−1)
//!   are treated.
//! - Same options, same panel: the RNG is `StdRng::seed_from_u64(seed)`.
use ndarray::{Array1, Array2};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

use crate::panel::{
    data::PanelData,
    errors::{PanelError, PanelResult},
};

/// SimulationOptions — parameters of the generating process.
///
/// Defaults: n = 100, t = 4, beta = 0, att = 1, one post period, white
/// noise errors with sd 1, no heteroskedasticity, half treated, no
/// covariates, burn-in 100, seed 42.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationOptions {
    /// Number of individuals n (≥ 2).
    pub n: usize,
    /// Number of placebo periods T (≥ 1).
    pub t: usize,
    /// True placebo coefficients, length T.
    pub beta: Vec<f64>,
    /// Treatment effect in post periods.
    pub att: f64,
    /// Number of post-treatment periods.
    pub post_periods: usize,
    /// AR coefficients φ_1..φ_p of the idiosyncratic error.
    pub ar: Vec<f64>,
    /// Innovation standard deviation (> 0).
    pub sd: f64,
    /// Extra relative innovation scale for treated individuals (≥ 0).
    pub het: f64,
    /// Share of treated individuals, in (0, 1).
    pub treated_share: f64,
    /// Covariate coefficients γ; empty means no covariates.
    pub gamma: Vec<f64>,
    /// AR burn-in length discarded before period 1.
    pub burn_in: usize,
    pub seed: u64,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            n: 100,
            t: 4,
            beta: vec![0.0; 4],
            att: 1.0,
            post_periods: 1,
            ar: Vec::new(),
            sd: 1.0,
            het: 0.0,
            treated_share: 0.5,
            gamma: Vec::new(),
            burn_in: 100,
            seed: 42,
        }
    }
}

impl SimulationOptions {
    /// Defaults with `n` individuals and `t` zero placebo coefficients.
    pub fn new(n: usize, t: usize) -> Self {
        Self { n, t, beta: vec![0.0; t], ..Self::default() }
    }

    /// Check every parameter against its documented range.
    ///
    /// # Errors
    /// `PanelError::InvalidSimulationParam` naming the first violation.
    pub fn validate(&self) -> PanelResult<()> {
        let bad = |name, value, reason| Err(PanelError::InvalidSimulationParam { name, value, reason });
        if self.n < 2 {
            return bad("n", self.n as f64, "at least 2 individuals are required");
        }
        if self.t < 1 {
            return bad("t", self.t as f64, "at least 1 placebo period is required");
        }
        if self.beta.len() != self.t {
            return bad("beta", self.beta.len() as f64, "length must equal t");
        }
        if let Some(&b) = self.beta.iter().chain(&self.gamma).find(|v| !v.is_finite()) {
            return bad("beta/gamma", b, "coefficients must be finite");
        }
        if !self.att.is_finite() {
            return bad("att", self.att, "must be finite");
        }
        if !(self.sd.is_finite() && self.sd > 0.0) {
            return bad("sd", self.sd, "must be strictly positive and finite");
        }
        if !(self.het.is_finite() && self.het >= 0.0) {
            return bad("het", self.het, "must be non-negative and finite");
        }
        if !(self.treated_share > 0.0 && self.treated_share < 1.0) {
            return bad("treated_share", self.treated_share, "must lie strictly between 0 and 1");
        }
        let ar_sum: f64 = self.ar.iter().map(|p| p.abs()).sum();
        if !(ar_sum < 1.0) {
            return bad("ar", ar_sum, "sum of |phi| must be below 1 for stationarity");
        }
        Ok(())
    }
}

/// Draw a panel from the model in the module docs.
///
/// Parameters
/// ----------
/// - `opts`: `&SimulationOptions`
///   Validated before any draw.
///
/// Returns
/// -------
/// `PanelResult<PanelData>`
///   `n·(T + 1 + post_periods)` rows; covariates attached when `gamma` is
///   non-empty.
///
/// Errors
/// ------
/// - `PanelError::InvalidSimulationParam` from [`SimulationOptions::validate`].
///
/// Examples
/// --------
/// ```rust
/// use equitrends::panel::{SimulationOptions, simulate_panel};
///
/// let opts = SimulationOptions { n: 10, t: 2, beta: vec![0.1, -0.1], ..Default::default() };
/// let panel = simulate_panel(&opts).unwrap();
/// assert_eq!(panel.len(), 10 * 4);
/// ```
pub fn simulate_panel(opts: &SimulationOptions) -> PanelResult<PanelData> {
    opts.validate()?;
    let mut rng = StdRng::seed_from_u64(opts.seed);

    let n = opts.n;
    let n_periods = opts.t + 1 + opts.post_periods;
    let n_rows = n * n_periods;
    let k = opts.gamma.len();
    let n_treated = ((n as f64 * opts.treated_share).round() as usize).clamp(1, n - 1);

    let alpha: Vec<f64> = (0..n).map(|_| rng.sample(StandardNormal)).collect();
    let lambda: Vec<f64> = (0..n_periods).map(|_| rng.sample(StandardNormal)).collect();

    let mut outcome = Vec::with_capacity(n_rows);
    let mut id = Vec::with_capacity(n_rows);
    let mut group = Vec::with_capacity(n_rows);
    let mut period = Vec::with_capacity(n_rows);
    let mut covariates = Array2::<f64>::zeros((n_rows, k));

    let mut row = 0;
    for i in 0..n {
        let treated = i < n_treated;
        let g = if treated { 1.0 } else { 0.0 };
        let scale = opts.sd * (1.0 + opts.het * g);
        let errors = ar_errors(&mut rng, &opts.ar, scale, opts.burn_in, n_periods);

        for (s, &u) in errors.iter().enumerate() {
            let label = s + 1;
            let mut y = alpha[i] + lambda[s] + u;
            if label <= opts.t {
                y += opts.beta[s] * g;
            } else if label > opts.t + 1 {
                y += opts.att * g;
            }
            for (j, &gamma_j) in opts.gamma.iter().enumerate() {
                let x: f64 = rng.sample(StandardNormal);
                covariates[[row, j]] = x;
                y += gamma_j * x;
            }
            outcome.push(y);
            id.push(i as i64 + 1);
            group.push(g);
            period.push(label as f64);
            row += 1;
        }
    }

    let panel =
        PanelData::new(Array1::from(outcome), Array1::from(id), Array1::from(group), Array1::from(period))?;
    if k > 0 { panel.with_covariates(covariates) } else { Ok(panel) }
}

//
// ---------- Private helpers (compact docs) ----------
//

/// AR(p) path of length `len` after discarding `burn_in` draws.
fn ar_errors<R: Rng>(rng: &mut R, phi: &[f64], scale: f64, burn_in: usize, len: usize) -> Vec<f64> {
    let total = burn_in + len;
    let mut path = Vec::with_capacity(total);
    for s in 0..total {
        let eps: f64 = rng.sample(StandardNormal);
        let ar: f64 = phi.iter().enumerate().filter(|(j, _)| *j < s).map(|(j, p)| p * path[s - 1 - j]).sum();
        path.push(ar + scale * eps);
    }
    path.split_off(burn_in)
}
