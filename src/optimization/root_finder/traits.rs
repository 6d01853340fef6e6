//! Public configuration and outcome types for scalar root finding.
//!
//! - [`RootOptions`]: tolerance, iteration cap, and verbosity.
//! - [`RootOutcome`]: normalized result returned by [`find_root`](super::find_root).
use crate::optimization::errors::{OptError, OptResult};
use argmin::core::{TerminationReason, TerminationStatus};

/// Default absolute tolerance on the root location.
pub const DEFAULT_ROOT_TOL: f64 = 1e-12;

/// Default iteration cap for a single Brent solve.
pub const DEFAULT_ROOT_MAX_ITER: usize = 200;

/// Default number of doublings allowed when searching for an upper bracket.
pub const DEFAULT_MAX_DOUBLINGS: usize = 64;

/// Root-finder configuration.
///
/// Fields:
/// - `tol: f64` — absolute tolerance on the root location (scaled by callers
///   through [`RootOptions::scaled`] when the natural unit is not 1).
/// - `max_iter: usize` — hard cap on Brent iterations; exceeding it is a
///   convergence failure, never a silent answer.
/// - `max_doublings: usize` — cap on upper-bracket expansion steps.
/// - `verbose: bool` — if `true`, attaches a terminal observer (behind the
///   `obs_slog` feature).
///
/// Default:
/// - `tol = 1e-12`, `max_iter = 200`, `max_doublings = 64`, `verbose = false`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootOptions {
    pub tol: f64,
    pub max_iter: usize,
    pub max_doublings: usize,
    pub verbose: bool,
}

impl RootOptions {
    /// Construct validated root-finder options.
    ///
    /// # Rules
    /// - `tol` must be finite and strictly positive.
    /// - `max_iter` and `max_doublings` must be `> 0`.
    ///
    /// # Errors
    /// - [`OptError::InvalidTolerance`] for a non-finite or non-positive `tol`.
    /// - [`OptError::InvalidMaxIter`] if `max_iter == 0` or `max_doublings == 0`.
    pub fn new(tol: f64, max_iter: usize, max_doublings: usize, verbose: bool) -> OptResult<Self> {
        if !tol.is_finite() || tol <= 0.0 {
            return Err(OptError::InvalidTolerance {
                tol,
                reason: "Tolerance must be finite and strictly positive.",
            });
        }
        if max_iter == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter,
                reason: "Maximum iterations must be greater than zero.",
            });
        }
        if max_doublings == 0 {
            return Err(OptError::InvalidMaxIter {
                max_iter: max_doublings,
                reason: "Maximum bracket doublings must be greater than zero.",
            });
        }
        Ok(Self { tol, max_iter, max_doublings, verbose })
    }

    /// Copy with `tol` multiplied by `scale`; non-positive or non-finite
    /// scales leave the tolerance unchanged.
    pub fn scaled(&self, scale: f64) -> Self {
        let mut out = *self;
        if scale.is_finite() && scale > 0.0 {
            out.tol = self.tol * scale;
        }
        out
    }
}

impl Default for RootOptions {
    fn default() -> Self {
        Self {
            tol: DEFAULT_ROOT_TOL,
            max_iter: DEFAULT_ROOT_MAX_ITER,
            max_doublings: DEFAULT_MAX_DOUBLINGS,
            verbose: false,
        }
    }
}

/// Canonical result of a bracketed root solve.
///
/// - `root`: the located root.
/// - `value`: objective value at `root` (≈ 0).
/// - `iterations`: Brent iterations performed (0 when an endpoint was an
///   exact root).
/// - `status`: human-readable termination status.
#[derive(Debug, Clone, PartialEq)]
pub struct RootOutcome {
    pub root: f64,
    pub value: f64,
    pub iterations: u64,
    pub status: String,
}

impl RootOutcome {
    /// Build a validated [`RootOutcome`] from raw solver state.
    ///
    /// Maps `TerminationStatus`:
    /// - `SolverConverged` / `TargetCostReached` → success;
    /// - `MaxItersReached` → [`OptError::MaxItersReached`] carrying the best
    ///   estimate;
    /// - anything else → [`OptError::BackendError`].
    ///
    /// # Errors
    /// - [`OptError::MissingRoot`] if the solver produced no parameter.
    /// - [`OptError::NonFiniteCost`] if the root or its value is not finite.
    pub fn new(
        root: Option<f64>, value: f64, termination: &TerminationStatus, iterations: u64,
    ) -> OptResult<Self> {
        let root = root.ok_or(OptError::MissingRoot)?;
        if !root.is_finite() {
            return Err(OptError::NonFiniteCost { value: root });
        }
        match termination {
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
            | TerminationStatus::Terminated(TerminationReason::TargetCostReached) => {}
            TerminationStatus::Terminated(TerminationReason::MaxItersReached) => {
                return Err(OptError::MaxItersReached { iterations, best: root });
            }
            other => {
                return Err(OptError::BackendError {
                    text: format!("unexpected termination status {other:?}"),
                });
            }
        }
        Ok(Self { root, value, iterations, status: format!("{termination:?}") })
    }

    /// Outcome for an endpoint that is already an exact root.
    pub(crate) fn exact(root: f64) -> Self {
        Self { root, value: 0.0, iterations: 0, status: "Exact endpoint root".to_string() }
    }
}
