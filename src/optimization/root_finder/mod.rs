//! root_finder — bracketed scalar root finding on top of `argmin`.
//!
//! Purpose
//! -------
//! Provide a single entry point, [`find_root`], for solving monotone scalar
//! equations `g(x) = 0` that arise throughout the crate: folded-normal
//! quantiles and the minimum-threshold inversions of the IU and mean tests.
//!
//! Key behaviors
//! -------------
//! - Validate the bracket and the endpoint values before starting.
//! - Short-circuit exact endpoint roots.
//! - Run `argmin`'s `BrentRoot` with a hard iteration cap and map its
//!   termination status into [`RootOutcome`] or an [`OptError`].
//! - Offer [`expand_upper_bracket`] for callers that only know a lower
//!   endpoint and a scale.
//!
//! Invariants & assumptions
//! ------------------------
//! - `g` is continuous on the bracket; monotonicity is not required by
//!   Brent but all callers in this crate supply monotone equations, so the
//!   root is unique.
//! - A solve that hits the cap is reported as
//!   [`OptError::MaxItersReached`] with the best estimate; it is never
//!   returned as a converged root.
//!
//! Downstream usage
//! ----------------
//! - `folded_normal::distribution::quantile` and
//!   `folded_normal::thresholds` build a bracket with
//!   [`expand_upper_bracket`] and then call [`find_root`].
//!
//! Testing notes
//! -------------
//! - Unit tests below check convergence on equations with known roots and
//!   the iteration-cap path; option and outcome validation is tested in
//!   [`traits`].
pub mod adapter;
pub mod bracket;
pub mod run;
pub mod traits;

use crate::optimization::errors::{OptError, OptResult};

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bracket::{Bracket, evaluate_bracket, expand_upper_bracket};
pub use self::run::run_brent;
pub use self::traits::{
    DEFAULT_MAX_DOUBLINGS, DEFAULT_ROOT_MAX_ITER, DEFAULT_ROOT_TOL, RootOptions, RootOutcome,
};

/// Solve `g(x) = 0` on `[lo, hi]`.
///
/// Parameters
/// ----------
/// - `g`: `&G`
///   Continuous scalar equation.
/// - `lo`, `hi`: `f64`
///   Finite bracket with `lo < hi` and a sign change of `g`.
/// - `opts`: `&RootOptions`
///   Tolerance, iteration cap, verbosity.
///
/// Returns
/// -------
/// `OptResult<RootOutcome>`
///   The located root, or the endpoint itself when `g` vanishes there.
///
/// Errors
/// ------
/// - `OptError::InvalidBracket` / `OptError::NonFiniteCost` from endpoint
///   evaluation.
/// - `OptError::RootNotBracketed` if `g(lo)` and `g(hi)` share a sign.
/// - `OptError::MaxItersReached` if Brent does not converge in time.
pub fn find_root<G>(g: &G, lo: f64, hi: f64, opts: &RootOptions) -> OptResult<RootOutcome>
where
    G: Fn(f64) -> f64,
{
    let bracket = evaluate_bracket(g, lo, hi)?;
    solve_bracket(g, &bracket, opts)
}

/// Solve `g(x) = 0` on an already evaluated [`Bracket`].
///
/// # Errors
/// Same as [`find_root`], minus endpoint validation.
pub fn solve_bracket<G>(g: &G, bracket: &Bracket, opts: &RootOptions) -> OptResult<RootOutcome>
where
    G: Fn(f64) -> f64,
{
    if bracket.f_lo == 0.0 {
        return Ok(RootOutcome::exact(bracket.lo));
    }
    if bracket.f_hi == 0.0 {
        return Ok(RootOutcome::exact(bracket.hi));
    }
    if !bracket.has_sign_change() {
        return Err(OptError::RootNotBracketed {
            lo: bracket.lo,
            hi: bracket.hi,
            f_lo: bracket.f_lo,
            f_hi: bracket.f_hi,
        });
    }
    run_brent(g, bracket.lo, bracket.hi, opts)
}
