//! Variance-covariance estimator kinds.
//!
//! This module provides:
//! - A closed `VceKind` enum covering classical, heteroskedasticity-robust
//!   (HC1, HC2, HC3) and cluster-robust (CR0, CR1) estimators.
//! - Case-insensitive parsing of the accepted aliases via `FromStr`, so the
//!   string surface resolves in exactly one place.
use std::str::FromStr;

use crate::inference::errors::InferenceError;

/// Covariance estimator family.
///
/// - `Ols`: σ̂²(X'X)⁻¹ under homoskedastic, independent errors.
/// - `Hc1`: White sandwich with the N/(N−k) small-sample factor.
/// - `Hc2`, `Hc3`: leverage-adjusted sandwiches, eᵢ²/(1−hᵢᵢ) and
///   eᵢ²/(1−hᵢᵢ)².
/// - `Cr0`: cluster-robust sandwich without correction.
/// - `Cr1`: `Cr0` scaled by G/(G−1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VceKind {
    Ols,
    Hc1,
    Hc2,
    Hc3,
    Cr0,
    #[default]
    Cr1,
}

impl VceKind {
    /// Whether the estimator aggregates scores by cluster.
    pub fn is_cluster(&self) -> bool {
        matches!(self, VceKind::Cr0 | VceKind::Cr1)
    }

    /// Canonical lower-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            VceKind::Ols => "ols",
            VceKind::Hc1 => "hc1",
            VceKind::Hc2 => "hc2",
            VceKind::Hc3 => "hc3",
            VceKind::Cr0 => "cr0",
            VceKind::Cr1 => "cr1",
        }
    }
}

impl std::fmt::Display for VceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VceKind {
    type Err = InferenceError;

    /// Parse an estimator name.
    ///
    /// Accepted (case-insensitive, surrounding whitespace ignored):
    /// `ols`/`classical`/`homoskedastic`, `hc1`/`robust`/`het`, `hc2`,
    /// `hc3`, `cr0`, `cr1`/`cluster`/`cl`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ols" | "classical" | "homoskedastic" => Ok(VceKind::Ols),
            "hc1" | "robust" | "het" => Ok(VceKind::Hc1),
            "hc2" => Ok(VceKind::Hc2),
            "hc3" => Ok(VceKind::Hc3),
            "cr0" => Ok(VceKind::Cr0),
            "cr1" | "cluster" | "cl" => Ok(VceKind::Cr1),
            _ => Err(InferenceError::UnknownVceKind { name: s.to_string() }),
        }
    }
}
