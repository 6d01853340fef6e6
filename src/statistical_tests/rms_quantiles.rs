//! statistical_tests::rms_quantiles — tabulated quantiles of the RMS pivot.
//!
//! The pivot is
//!
//! ```text
//! W = B(1) / sqrt( K⁻¹ Σ_k ( B(λ_k)/λ_k − B(1) )² ),   λ_k = k/(K+1),
//! ```
//!
//! for a standard Brownian motion B. W is symmetric around zero, so only
//! lower-tail quantiles are stored. Entries are Monte-Carlo estimates from
//! 1.5 million draws per K (K = 2..=10).
use crate::statistical_tests::errors::{EquivalenceError, EquivalenceResult};

/// Smallest and largest supported number of subsamples.
pub const MIN_SUBSAMPLES: usize = 2;
pub const MAX_SUBSAMPLES: usize = 10;

/// Significance levels accepted by the RMS test.
pub const SUPPORTED_ALPHAS: [f64; 5] = [0.01, 0.025, 0.05, 0.1, 0.2];

/// Lower-tail probabilities of the table columns.
const PROBS: [f64; 6] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.2];

/// Row K − 2 holds Q_W(p) for p in `PROBS`.
const TABLE: [[f64; 6]; 9] = [
    [-10.6116, -7.4291, -4.5551, -3.0389, -1.9090, -1.0317],
    [-6.5704, -5.0234, -3.4091, -2.4369, -1.6192, -0.9129],
    [-5.2189, -4.1471, -2.9428, -2.1623, -1.4701, -0.8429],
    [-4.5653, -3.6979, -2.6775, -1.9903, -1.3710, -0.7969],
    [-4.1610, -3.4024, -2.4946, -1.8719, -1.2978, -0.7608],
    [-3.9014, -3.2045, -2.3707, -1.7895, -1.2486, -0.7345],
    [-3.6881, -3.0492, -2.2625, -1.7191, -1.2045, -0.7124],
    [-3.5205, -2.9227, -2.1865, -1.6665, -1.1724, -0.6939],
    [-3.4039, -2.8310, -2.1188, -1.6177, -1.1417, -0.6788],
];

/// Lower-tail quantile Q_W(p) for `subsamples` = K.
///
/// # Errors
/// - `EquivalenceError::InvalidSubsamples` for K outside 2..=10.
/// - `EquivalenceError::UnsupportedAlpha` for p not in the table.
pub fn w_quantile(subsamples: usize, p: f64) -> EquivalenceResult<f64> {
    if !(MIN_SUBSAMPLES..=MAX_SUBSAMPLES).contains(&subsamples) {
        return Err(EquivalenceError::InvalidSubsamples { subsamples });
    }
    let col = PROBS
        .iter()
        .position(|&q| (q - p).abs() < 1e-12)
        .ok_or(EquivalenceError::UnsupportedAlpha { alpha: p })?;
    Ok(TABLE[subsamples - MIN_SUBSAMPLES][col])
}

/// Validate an RMS significance level against [`SUPPORTED_ALPHAS`].
pub fn validate_rms_alpha(alpha: f64) -> EquivalenceResult<()> {
    if SUPPORTED_ALPHAS.iter().any(|&a| (a - alpha).abs() < 1e-12) {
        Ok(())
    } else {
        Err(EquivalenceError::UnsupportedAlpha { alpha })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Lookups return the stored values and reject untabulated inputs.
    fn w_quantile_looks_up_and_validates() {
        assert_eq!(w_quantile(5, 0.05).unwrap(), -1.9903);
        assert_eq!(w_quantile(2, 0.005).unwrap(), -10.6116);
        assert_eq!(w_quantile(10, 0.2).unwrap(), -0.6788);
        assert_eq!(w_quantile(1, 0.05), Err(EquivalenceError::InvalidSubsamples { subsamples: 1 }));
        assert_eq!(w_quantile(5, 0.07), Err(EquivalenceError::UnsupportedAlpha { alpha: 0.07 }));
        assert!(validate_rms_alpha(0.025).is_ok());
        assert!(validate_rms_alpha(0.005).is_err());
    }

    #[test]
    // Purpose
    // -------
    // Quantiles increase in p for every K and shrink in magnitude as K
    // grows (more subsamples stabilize the normalizer).
    fn table_is_monotone() {
        for row in TABLE.iter() {
            assert!(row.windows(2).all(|w| w[0] < w[1]));
            assert!(row.iter().all(|&q| q < 0.0));
        }
        for col in 0..PROBS.len() {
            assert!(TABLE.windows(2).all(|w| w[0][col] < w[1][col]));
        }
    }
}
