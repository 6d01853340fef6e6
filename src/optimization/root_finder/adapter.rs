//! Adapter that exposes a scalar equation `g(x) = 0` as an `argmin` problem.
//!
//! `BrentRoot` drives the *cost* of the problem to zero, so the cost is the
//! equation value itself (signed, not squared).
use crate::optimization::errors::OptError;
use argmin::core::{CostFunction, Error};

/// Bridges a closure `g: f64 -> f64` to `argmin`'s `CostFunction`.
#[derive(Debug, Clone, Copy)]
pub struct ScalarEquation<'a, G: Fn(f64) -> f64> {
    pub g: &'a G,
}

impl<'a, G: Fn(f64) -> f64> ScalarEquation<'a, G> {
    /// Wrap a borrowed closure.
    pub fn new(g: &'a G) -> Self {
        Self { g }
    }

    /// Evaluate `g(x)`, rejecting non-finite values.
    ///
    /// # Errors
    /// - [`OptError::NonFiniteCost`] if `g(x)` is NaN or infinite.
    pub fn eval(&self, x: f64) -> Result<f64, OptError> {
        let value = (self.g)(x);
        if !value.is_finite() {
            return Err(OptError::NonFiniteCost { value });
        }
        Ok(value)
    }
}

impl<'a, G: Fn(f64) -> f64> CostFunction for ScalarEquation<'a, G> {
    type Param = f64;
    type Output = f64;

    /// Evaluate the signed equation value at `x`.
    ///
    /// # Errors
    /// Returns `Error(NonFiniteCost)` if the value is not finite.
    fn cost(&self, x: &Self::Param) -> Result<Self::Output, Error> {
        Ok(self.eval(*x)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // The adapter returns the signed closure value and flags NaN.
    //
    // Given
    // -----
    // - g(x) = x − 2 and g(x) = NaN.
    //
    // Expect
    // ------
    // - cost(3) = 1 for the first; an error for the second.
    fn scalar_equation_returns_signed_value_and_rejects_nan() {
        // Arrange
        let g = |x: f64| x - 2.0;
        let bad = |_: f64| f64::NAN;

        // Act
        let ok = ScalarEquation::new(&g).cost(&3.0).unwrap();
        let err = ScalarEquation::new(&bad).cost(&3.0);

        // Assert
        assert_eq!(ok, 1.0);
        assert!(err.is_err());
    }
}
