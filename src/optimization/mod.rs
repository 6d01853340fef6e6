//! optimization — numerical solvers shared across the crate.
//!
//! Purpose
//! -------
//! Host the `argmin`-backed scalar root finder used by the folded-normal
//! quantile and the minimum-threshold inversions, together with its error
//! type.
//!
//! Key behaviors
//! -------------
//! - [`root_finder`] wraps `argmin::solver::brent::BrentRoot` in an
//!   `Executor`, adds bracket validation and doubling expansion, and maps
//!   termination statuses to [`OptError`].
//! - [`errors`] converts `argmin::core::Error` into [`OptError`] by
//!   downcasting to `ArgminError`.
//!
//! Conventions
//! -----------
//! - Every solve is capped; exceeding the cap is a convergence error that
//!   carries the best estimate.
//! - Optional observers are attached only with the `obs_slog` feature and
//!   `RootOptions::verbose`.
pub mod errors;
pub mod root_finder;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{OptError, OptResult};
pub use self::root_finder::{
    Bracket, RootOptions, RootOutcome, expand_upper_bracket, find_root, solve_bracket,
};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::root_finder::{RootOptions, RootOutcome, find_root};
}
