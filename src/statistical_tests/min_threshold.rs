//! statistical_tests::min_threshold — smallest threshold at which a test
//! rejects.
//!
//! Purpose
//! -------
//! Search-mode solvers that have no closed form in the folded-normal layer:
//! the bootstrap max test (bisection on δ) and the RMS test (closed form in
//! M̂ and V̂). IU and mean-test inversions live in
//! `folded_normal::thresholds`.
//!
//! Key behaviors
//! -------------
//! - Bootstrap search starts at lo = ‖β̂_P‖∞, where the constrained estimate
//!   equals the unconstrained one and the test cannot reject, and grows
//!   hi = lo + 15·max(se) by doubling until the test rejects.
//! - Every evaluation reuses the same base seed, so the rejection region is
//!   a fixed function of δ during the search.
//! - Bisection stops once hi − lo ≤ `tol` and reports hi, the smallest
//!   evaluated threshold known to reject.
//!
//! Invariants & assumptions
//! ------------------------
//! - The bootstrap critical value is non-decreasing in δ up to Monte-Carlo
//!   noise; bisection returns one crossing if several exist.
use crate::statistical_tests::{
    bootstrap::BootstrapDiagnostics,
    errors::{EquivalenceError, EquivalenceResult},
    max_test::BoundaryBootstrap,
};

/// Width multiplier of the initial search bracket, in units of max(se).
const INITIAL_WIDTH_SE: f64 = 15.0;
/// Largest number of bracket doublings.
const MAX_DOUBLINGS: usize = 30;
/// Iteration cap of the bisection.
const MAX_BISECTIONS: usize = 200;

/// Minimum bootstrap max-test threshold by bisection on δ.
///
/// Parameters
/// ----------
/// - `boundary`: bootstrap at the null boundary for the fitted design.
/// - `max_abs_coef`: observed ‖β̂_P‖∞.
/// - `se_max`: largest placebo standard error (scales the bracket).
/// - `tol`: absolute bisection tolerance on δ.
///
/// Returns
/// -------
/// `(min_threshold, diagnostics)`, with the diagnostics of the reported
/// threshold's bootstrap run.
///
/// Errors
/// ------
/// - `EquivalenceError::SearchNotBracketed` if no rejecting δ is found
///   after the doublings.
/// - Failures of the underlying constrained fits and bootstrap runs.
pub(crate) fn bootstrap_min_threshold(
    boundary: &BoundaryBootstrap<'_>, max_abs_coef: f64, se_max: f64, tol: f64,
) -> EquivalenceResult<(f64, BootstrapDiagnostics)> {
    let rejects = |delta: f64| -> EquivalenceResult<(bool, BootstrapDiagnostics)> {
        let (crit, diagnostics) = boundary.critical_value(delta)?;
        Ok((max_abs_coef < crit, diagnostics))
    };

    let mut lo = max_abs_coef;
    if lo > 0.0 {
        let (reject, diagnostics) = rejects(lo)?;
        if reject {
            return Ok((lo, diagnostics));
        }
    }

    let mut span = INITIAL_WIDTH_SE * se_max.max(f64::MIN_POSITIVE);
    let mut hi = max_abs_coef + span;
    let mut found = None;
    for _ in 0..=MAX_DOUBLINGS {
        let (reject, diagnostics) = rejects(hi)?;
        if reject {
            found = Some(diagnostics);
            break;
        }
        lo = hi;
        span *= 2.0;
        hi = max_abs_coef + span;
    }
    let Some(mut best) = found else {
        return Err(EquivalenceError::SearchNotBracketed { hi });
    };

    let mut iterations = 0;
    while hi - lo > tol && iterations < MAX_BISECTIONS {
        let mid = 0.5 * (lo + hi);
        let (reject, diagnostics) = rejects(mid)?;
        if reject {
            hi = mid;
            best = diagnostics;
        } else {
            lo = mid;
        }
        iterations += 1;
    }
    log::debug!("bootstrap threshold search: {iterations} bisections, bracket [{lo}, {hi}]");
    Ok((hi, best))
}

/// Minimum RMS threshold ζ* = √max(0, M̂ − Q_W(α)·V̂).
///
/// `w_quantile` is the (negative) lower-tail quantile of the pivot, so
/// ζ* ≥ √M̂ always.
pub fn rms_min_threshold(ms: f64, v_hat: f64, w_quantile: f64) -> f64 {
    (ms - w_quantile * v_hat).max(0.0).sqrt()
}
