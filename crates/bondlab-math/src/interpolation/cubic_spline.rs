//! Natural cubic spline interpolation.

use crate::error::MathResult;
use crate::interpolation::{clamp_query, find_segment, validate_knots, Extrapolation, Interpolator};
use crate::linear_algebra::solve_tridiagonal;

/// Natural cubic spline.
///
/// Piecewise cubics with continuous first and second derivatives and zero
/// second derivative at both end knots. The knot second derivatives are
/// solved once at construction; each query is a segment lookup plus a
/// cubic evaluation. With two knots the spline degenerates to a line.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot
    y2s: Vec<f64>,
    extrapolation: Extrapolation,
}

impl CubicSpline {
    /// Creates a natural cubic spline over at least two strictly increasing knots.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_knots(&xs, &ys, 2)?;
        let y2s = natural_second_derivatives(&xs, &ys)?;

        Ok(Self {
            xs,
            ys,
            y2s,
            extrapolation: Extrapolation::None,
        })
    }

    /// Sets the extrapolation policy.
    #[must_use]
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }

    /// Second derivatives at the knots.
    pub fn second_derivatives(&self) -> &[f64] {
        &self.y2s
    }

    fn segment_terms(&self, x: f64) -> (usize, f64, f64, f64) {
        let i = find_segment(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;
        (i, h, a, b)
    }
}

impl Interpolator for CubicSpline {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        if let Some(end) = clamp_query(&self.xs, x, self.extrapolation)? {
            return Ok(self.ys[end]);
        }

        let (i, h, a, b) = self.segment_terms(x);
        Ok(a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.y2s[i] + (b * b * b - b) * self.y2s[i + 1]) * (h * h) / 6.0)
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        if clamp_query(&self.xs, x, self.extrapolation)?.is_some() {
            return Ok(0.0);
        }

        let (i, h, a, b) = self.segment_terms(x);
        Ok((self.ys[i + 1] - self.ys[i]) / h
            - (3.0 * a * a - 1.0) * h * self.y2s[i] / 6.0
            + (3.0 * b * b - 1.0) * h * self.y2s[i + 1] / 6.0)
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}

/// Solves the natural-spline tridiagonal system for the interior second
/// derivatives; the end values are pinned to zero.
fn natural_second_derivatives(xs: &[f64], ys: &[f64]) -> MathResult<Vec<f64>> {
    let n = xs.len();
    let mut y2s = vec![0.0; n];
    if n < 3 {
        return Ok(y2s);
    }

    let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
    let interior = n - 2;

    let mut lower = Vec::with_capacity(interior.saturating_sub(1));
    let mut diag = Vec::with_capacity(interior);
    let mut upper = Vec::with_capacity(interior.saturating_sub(1));
    let mut rhs = Vec::with_capacity(interior);

    for i in 1..n - 1 {
        diag.push(2.0 * (h[i - 1] + h[i]));
        rhs.push(6.0 * ((ys[i + 1] - ys[i]) / h[i] - (ys[i] - ys[i - 1]) / h[i - 1]));
        if i > 1 {
            lower.push(h[i - 1]);
        }
        if i < n - 2 {
            upper.push(h[i]);
        }
    }

    let solution = solve_tridiagonal(&lower, &diag, &upper, &rhs)?;
    y2s[1..n - 1].copy_from_slice(&solution);
    Ok(y2s)
}
