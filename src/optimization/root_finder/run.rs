//! Execution helper that runs `argmin`'s Brent root finder on a scalar
//! equation and returns a crate-friendly [`RootOutcome`].
use crate::optimization::{
    errors::OptResult,
    root_finder::{RootOptions, RootOutcome, adapter::ScalarEquation},
};
use argmin::{
    core::{Executor, State},
    solver::brent::BrentRoot,
};

/// Run Brent's method for `g(x) = 0` on a bracket with a sign change.
///
/// This wires up:
/// - the closure via [`ScalarEquation`],
/// - a `BrentRoot` solver on `[lo, hi]` with `opts.tol`,
/// - the iteration cap `opts.max_iter`,
/// - an optional terminal observer (behind the `obs_slog` feature),
///   then executes the solver and converts the final state into a
///   [`RootOutcome`].
///
/// The caller guarantees `g(lo)` and `g(hi)` have opposite signs; argmin
/// reports `InvalidParameter` otherwise.
///
/// # Errors
/// - Propagates any `argmin` runtime error via `From<argmin::core::Error>`.
/// - `OptError::MaxItersReached` when the cap is hit before convergence.
pub fn run_brent<G>(g: &G, lo: f64, hi: f64, opts: &RootOptions) -> OptResult<RootOutcome>
where
    G: Fn(f64) -> f64,
{
    let problem = ScalarEquation::new(g);
    let solver = BrentRoot::new(lo, hi, opts.tol);
    let max_iter = opts.max_iter as u64;

    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        eprintln!("brent: bracket = [{lo:.6e}, {hi:.6e}], tol = {:.3e}", opts.tol);
    }

    let executor = Executor::new(problem, solver).configure(|state| state.max_iters(max_iter));
    #[cfg(feature = "obs_slog")]
    let executor = if opts.verbose {
        let observer = argmin_observer_slog::SlogLogger::term_noblock();
        executor.add_observer(observer, argmin::core::observers::ObserverMode::Always)
    } else {
        executor
    };

    let result = executor.run()?;
    let state = result.state();
    // The cost is the signed residual g(x), so the state's "best" is its
    // most negative value. The final iterate is the root estimate.
    RootOutcome::new(
        state.get_param().copied(),
        state.get_cost(),
        state.get_termination_status(),
        state.get_iter(),
    )
}
