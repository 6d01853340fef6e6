//! statistical_tests — equivalence tests for pre-trends in
//! difference-in-differences panels.
//!
//! Purpose
//! -------
//! Decide whether the placebo coefficients of a DiD event-study regression
//! are small enough to treat parallel trends as plausible. The null is
//! non-equivalence (pre-trends at least as large as a threshold), so a
//! rejection is positive evidence for parallel trends.
//!
//! Key behaviors
//! -------------
//! - [`max_test`]: ‖β_P‖∞ against δ via intersection-union, parametric
//!   bootstrap or wild cluster bootstrap ([`MaxMethod`]).
//! - [`mean_test`]: |β̄| against τ with a folded-normal critical value.
//! - [`rms_test`]: RMS(β_P) against ζ with a self-normalized subsampling
//!   statistic.
//! - Every test runs either against a given threshold or in search mode
//!   ([`TestMode`]), returning the smallest threshold at which it rejects.
//!
//! Invariants & assumptions
//! ------------------------
//! - Options are validated before any panel processing; invalid α,
//!   thresholds, replication counts or subsample counts fail fast.
//! - Randomized procedures (bootstrap, RMS subsampling) are reproducible
//!   given a seed and report the seed they used.
//! - Tests hold no state between calls.
//!
//! Conventions
//! -----------
//! - Failures surface as [`EquivalenceError`], which wraps the panel,
//!   estimation, inference, folded-normal and root-finding errors and
//!   exposes their coarse [`ErrorKind`](crate::errors::ErrorKind).
//! - Outcomes embed the [`PanelStructure`](crate::panel::PanelStructure)
//!   they were computed on.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use equitrends::panel::{PanelOptions, SimulationOptions, simulate_panel};
//! use equitrends::statistical_tests::prelude::*;
//!
//! let data = simulate_panel(&SimulationOptions::default()).unwrap();
//! let window = PanelOptions::default();
//! let out = mean_test(&data, &window, &MeanTestOptions::default()).unwrap();
//! println!("minimum tau: {:?}", out.decision.min_threshold());
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests in each module cover option validation, decision-rule
//!   boundaries (search vs. threshold mode) and seed reproducibility.
//! - `tests/integration_equivalence_pipeline.rs` runs the simulated AR(1)
//!   scenario end to end.
pub mod bootstrap;
pub mod errors;
pub mod max_test;
pub mod min_threshold;
pub mod outcome;
pub mod rms_quantiles;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::bootstrap::{BootstrapDiagnostics, counter_rng_seed};
pub use self::errors::{EquivalenceError, EquivalenceResult};
pub use self::max_test::{MaxMethod, MaxTestOptions, max_test};
pub use self::mean_test::{MeanTestOptions, mean_test};
pub use self::min_threshold::rms_min_threshold;
pub use self::outcome::{
    CoefficientSummary, Decision, MaxTestOutcome, MeanTestOutcome, RmsInterval, RmsTestOutcome, TestMode,
    TestResult,
};
pub use self::rms_test::{RmsTestOptions, rms_test};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use equitrends::statistical_tests::prelude::*;
//
// to import the test entry points and their option/outcome types.

pub mod prelude {
    pub use super::errors::{EquivalenceError, EquivalenceResult};
    pub use super::max_test::{MaxMethod, MaxTestOptions, max_test};
    pub use super::mean_test::{MeanTestOptions, mean_test};
    pub use super::outcome::{Decision, TestMode, TestResult};
    pub use super::rms_test::{RmsTestOptions, rms_test};
}
