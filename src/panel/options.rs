//! panel::options — period selection options for panel processing.
use crate::panel::errors::{PanelError, PanelResult};

/// Period-selection configuration.
///
/// Fields:
/// - `pretreatment_periods: Option<Vec<f64>>` — explicit pre-treatment
///   window. When `None`, every observed period is treated as
///   pre-treatment.
/// - `base_period: Option<f64>` — reference period. When `None`, the
///   latest pre-treatment period is used.
///
/// Default: both `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PanelOptions {
    pub pretreatment_periods: Option<Vec<f64>>,
    pub base_period: Option<f64>,
}

impl PanelOptions {
    /// Create validated options.
    ///
    /// Only finiteness is checked here; membership of the periods in the
    /// data is checked when the panel is processed.
    ///
    /// # Errors
    /// - `PanelError::NonFiniteOption` for a NaN or infinite period.
    pub fn new(pretreatment_periods: Option<Vec<f64>>, base_period: Option<f64>) -> PanelResult<Self> {
        if let Some(periods) = &pretreatment_periods {
            if let Some(&bad) = periods.iter().find(|p| !p.is_finite()) {
                return Err(PanelError::NonFiniteOption { name: "pretreatment_periods", value: bad });
            }
        }
        if let Some(base) = base_period {
            if !base.is_finite() {
                return Err(PanelError::NonFiniteOption { name: "base_period", value: base });
            }
        }
        Ok(Self { pretreatment_periods, base_period })
    }
}
