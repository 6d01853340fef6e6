//! panel — raw panel input, period selection, and validated structure.
//!
//! Purpose
//! -------
//! Own everything between the caller's columns and the estimator:
//! [`PanelData`] holds raw columns, [`PanelOptions`] selects the
//! pre-treatment window and base period, and [`process_panel`] produces a
//! [`ProcessedPanel`] with dense indices and a [`PanelStructure`] summary.
//! [`simulate_panel`] generates seeded test panels.
//!
//! Invariants & assumptions
//! ------------------------
//! - Every failure is a [`PanelError`] classified as a validation error.
//! - A processed panel always has T ≥ 1 placebo periods and both groups.
pub mod data;
pub mod errors;
pub mod options;
pub mod simulate;
pub mod structure;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::data::PanelData;
pub use self::errors::{PanelError, PanelResult};
pub use self::options::PanelOptions;
pub use self::simulate::{SimulationOptions, simulate_panel};
pub use self::structure::{PanelStructure, ProcessedPanel, process_panel};
