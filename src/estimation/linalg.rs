//! estimation::linalg — small dense linear-algebra helpers.
//!
//! Purpose
//! -------
//! Bridge `ndarray` (used throughout the crate) and `nalgebra` (used for
//! Cholesky factorizations), and provide the in-order rank screen used to
//! drop collinear regressors.
//!
//! Conventions
//! -----------
//! - Copies into `DMatrix` run column by column, matching its column-major
//!   storage.
//! - Every factorization returns `Option`; callers map `None` onto their own
//!   singular-matrix error with context.
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2};

/// Relative pivot tolerance for the rank screen.
pub const RANK_TOL: f64 = 1e-10;

/// Copy an `ndarray` matrix into a freshly allocated `DMatrix`.
pub fn to_dmatrix(a: &Array2<f64>) -> DMatrix<f64> {
    let (nr, nc) = a.dim();
    let mut out = DMatrix::<f64>::zeros(nr, nc);
    for j in 0..nc {
        for i in 0..nr {
            out[(i, j)] = a[[i, j]];
        }
    }
    out
}

/// Copy a `DMatrix` back into an `ndarray` matrix.
pub fn from_dmatrix(a: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((a.nrows(), a.ncols()), |(i, j)| a[(i, j)])
}

/// Inverse of a symmetric positive-definite matrix via Cholesky.
///
/// Returns `None` when the factorization fails. The result is symmetrized
/// to remove round-off asymmetry.
pub fn spd_inverse(a: &Array2<f64>) -> Option<Array2<f64>> {
    if a.nrows() == 0 {
        return Some(Array2::zeros((0, 0)));
    }
    let chol = to_dmatrix(a).cholesky()?;
    let inv = from_dmatrix(&chol.inverse());
    let sym = (&inv + &inv.t()) * 0.5;
    sym.iter().all(|v| v.is_finite()).then_some(sym)
}

/// Solve `a x = b` for symmetric positive-definite `a` via Cholesky.
pub fn spd_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    if a.nrows() == 0 {
        return Some(Array1::zeros(0));
    }
    let chol = to_dmatrix(a).cholesky()?;
    let x = chol.solve(&DVector::from_iterator(b.len(), b.iter().copied()));
    let out = Array1::from_iter(x.iter().copied());
    out.iter().all(|v| v.is_finite()).then_some(out)
}

/// In-order pivoted Cholesky rank screen on a Gram matrix.
///
/// Parameters
/// ----------
/// - `gram`: `&Array2<f64>`
///   Symmetric positive-semidefinite `p×p` matrix X'X.
/// - `scale`: `&Array1<f64>`
///   Reference squared norm of each column. For a demeaned design this is
///   the norm before demeaning, so a column the fixed effects absorb up to
///   round-off is measured against its original size and not its residue.
/// - `rel_tol`: `f64`
///   Column j is dependent when its Schur-complement pivot is at most
///   `rel_tol · max(scale[j], gram[j, j])`, or when `gram[j, j] = 0`.
///
/// Returns
/// -------
/// `(kept, dropped)` column indices, both ascending. Columns are visited
/// left to right, so an earlier column is always preferred over a later one
/// it is collinear with.
pub fn independent_columns(
    gram: &Array2<f64>, scale: &Array1<f64>, rel_tol: f64,
) -> (Vec<usize>, Vec<usize>) {
    let p = gram.nrows();
    let mut kept: Vec<usize> = Vec::with_capacity(p);
    let mut dropped = Vec::new();
    // Rows of the Cholesky factor for kept columns, each of length kept.len() at insertion.
    let mut factor: Vec<Vec<f64>> = Vec::with_capacity(p);

    for j in 0..p {
        let diag = gram[[j, j]];
        if !(diag > 0.0) || !diag.is_finite() {
            dropped.push(j);
            continue;
        }
        let mut row = Vec::with_capacity(kept.len() + 1);
        for (a, &ka) in kept.iter().enumerate() {
            let partial: f64 = (0..a).map(|m| factor[a][m] * row[m]).sum();
            row.push((gram[[ka, j]] - partial) / factor[a][a]);
        }
        let pivot = diag - row.iter().map(|v| v * v).sum::<f64>();
        let reference = scale.get(j).copied().filter(|s| s.is_finite()).unwrap_or(0.0).max(diag);
        if pivot <= rel_tol * reference {
            dropped.push(j);
            continue;
        }
        row.push(pivot.sqrt());
        factor.push(row);
        kept.push(j);
    }
    (kept, dropped)
}
