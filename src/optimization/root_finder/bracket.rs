//! Bracket construction for monotone scalar equations.
//!
//! Callers usually know a natural lower endpoint (e.g. δ = 0 or x = 0) and a
//! rough scale for the upper endpoint. [`expand_upper_bracket`] grows the
//! upper endpoint by doubling the bracket width until a sign change appears.
use crate::optimization::{
    errors::{OptError, OptResult},
    root_finder::adapter::ScalarEquation,
};

/// A validated bracket `[lo, hi]` with the equation values at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub lo: f64,
    pub hi: f64,
    pub f_lo: f64,
    pub f_hi: f64,
}

impl Bracket {
    /// True when the endpoint values differ in sign or one of them is zero.
    pub fn has_sign_change(&self) -> bool {
        self.f_lo == 0.0 || self.f_hi == 0.0 || (self.f_lo < 0.0) != (self.f_hi < 0.0)
    }
}

/// Evaluate `g` at both ends of `[lo, hi]`.
///
/// # Errors
/// - [`OptError::InvalidBracket`] unless both endpoints are finite with
///   `lo < hi`.
/// - [`OptError::NonFiniteCost`] if `g` is not finite at an endpoint.
pub fn evaluate_bracket<G>(g: &G, lo: f64, hi: f64) -> OptResult<Bracket>
where
    G: Fn(f64) -> f64,
{
    if !lo.is_finite() || !hi.is_finite() || lo >= hi {
        return Err(OptError::InvalidBracket { lo, hi });
    }
    let eq = ScalarEquation::new(g);
    Ok(Bracket { lo, hi, f_lo: eq.eval(lo)?, f_hi: eq.eval(hi)? })
}

/// Grow the upper endpoint of `[lo, hi]` until `g` changes sign.
///
/// The width `hi − lo` is doubled at most `max_doublings` times; `lo` stays
/// fixed.
///
/// # Errors
/// - Errors from [`evaluate_bracket`].
/// - [`OptError::RootNotBracketed`] if no sign change appears within the
///   doubling budget.
pub fn expand_upper_bracket<G>(g: &G, lo: f64, hi: f64, max_doublings: usize) -> OptResult<Bracket>
where
    G: Fn(f64) -> f64,
{
    let mut bracket = evaluate_bracket(g, lo, hi)?;
    let eq = ScalarEquation::new(g);
    let mut width = hi - lo;
    for _ in 0..max_doublings {
        if bracket.has_sign_change() {
            return Ok(bracket);
        }
        width *= 2.0;
        bracket.hi = lo + width;
        if !bracket.hi.is_finite() {
            break;
        }
        bracket.f_hi = eq.eval(bracket.hi)?;
    }
    if bracket.has_sign_change() {
        return Ok(bracket);
    }
    Err(OptError::RootNotBracketed {
        lo: bracket.lo,
        hi: bracket.hi,
        f_lo: bracket.f_lo,
        f_hi: bracket.f_hi,
    })
}
