//! Linear algebra utilities.

use nalgebra::{DMatrix, DVector};

use crate::error::{MathError, MathResult};

/// Solves a tridiagonal system with the Thomas algorithm.
///
/// ```text
/// | b[0]  c[0]                  | | x[0]   |   | d[0]   |
/// | a[0]  b[1]  c[1]            | | x[1]   |   | d[1]   |
/// |       a[1]  b[2]  ...       | | ...    | = | ...    |
/// |             a[n-2] b[n-1]   | | x[n-1] |   | d[n-1] |
/// ```
///
/// `a` and `c` have length `n - 1`; `b` and `d` have length `n`.
pub fn solve_tridiagonal(a: &[f64], b: &[f64], c: &[f64], d: &[f64]) -> MathResult<Vec<f64>> {
    let n = b.len();
    if n == 0 {
        return Ok(Vec::new());
    }
    if a.len() != n - 1 || c.len() != n - 1 || d.len() != n {
        return Err(MathError::invalid_input(
            "tridiagonal system has inconsistent dimensions",
        ));
    }

    let mut c_prime = vec![0.0; n];
    let mut d_prime = vec![0.0; n];

    if b[0].abs() < 1e-15 {
        return Err(MathError::SingularMatrix);
    }
    if n > 1 {
        c_prime[0] = c[0] / b[0];
    }
    d_prime[0] = d[0] / b[0];

    for i in 1..n {
        let denom = b[i] - a[i - 1] * c_prime[i - 1];
        if denom.abs() < 1e-15 {
            return Err(MathError::SingularMatrix);
        }
        if i < n - 1 {
            c_prime[i] = c[i] / denom;
        }
        d_prime[i] = (d[i] - a[i - 1] * d_prime[i - 1]) / denom;
    }

    let mut x = vec![0.0; n];
    x[n - 1] = d_prime[n - 1];
    for i in (0..n - 1).rev() {
        x[i] = d_prime[i] - c_prime[i] * x[i + 1];
    }

    Ok(x)
}

/// Solves the square system `A x = b` by LU decomposition.
pub fn solve_linear_system(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    if a.nrows() != a.ncols() {
        return Err(MathError::invalid_input("matrix must be square"));
    }
    if a.nrows() != b.len() {
        return Err(MathError::invalid_input(format!(
            "dimension mismatch: {}x{} matrix, {} right-hand side",
            a.nrows(),
            a.ncols(),
            b.len()
        )));
    }

    a.clone().lu().solve(b).ok_or(MathError::SingularMatrix)
}

/// Ordinary least squares: minimizes `|A x - b|²` through the normal
/// equations. Requires at least as many rows as columns.
pub fn least_squares(a: &DMatrix<f64>, b: &DVector<f64>) -> MathResult<DVector<f64>> {
    if a.nrows() < a.ncols() {
        return Err(MathError::insufficient_data(a.ncols(), a.nrows()));
    }
    let at = a.transpose();
    solve_linear_system(&(&at * a), &(&at * b))
}
