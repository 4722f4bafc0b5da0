//! Linear interpolation.

use crate::error::MathResult;
use crate::interpolation::{clamp_query, find_segment, validate_knots, Extrapolation, Interpolator};

/// Piecewise-linear interpolation between knots.
///
/// # Example
///
/// ```rust
/// use bondlab_math::interpolation::{Interpolator, LinearInterpolator};
///
/// let interp = LinearInterpolator::new(vec![1.0, 2.0], vec![0.03, 0.04]).unwrap();
/// assert!((interp.interpolate(1.5).unwrap() - 0.035).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LinearInterpolator {
    xs: Vec<f64>,
    ys: Vec<f64>,
    extrapolation: Extrapolation,
}

impl LinearInterpolator {
    /// Creates a linear interpolator over at least two strictly increasing knots.
    pub fn new(xs: Vec<f64>, ys: Vec<f64>) -> MathResult<Self> {
        validate_knots(&xs, &ys, 2)?;
        Ok(Self {
            xs,
            ys,
            extrapolation: Extrapolation::None,
        })
    }

    /// Sets the extrapolation policy.
    #[must_use]
    pub fn with_extrapolation(mut self, extrapolation: Extrapolation) -> Self {
        self.extrapolation = extrapolation;
        self
    }
}

impl Interpolator for LinearInterpolator {
    fn interpolate(&self, x: f64) -> MathResult<f64> {
        if let Some(end) = clamp_query(&self.xs, x, self.extrapolation)? {
            return Ok(self.ys[end]);
        }

        let i = find_segment(&self.xs, x);
        let (x0, x1) = (self.xs[i], self.xs[i + 1]);
        let (y0, y1) = (self.ys[i], self.ys[i + 1]);

        let weight = (x - x0) / (x1 - x0);
        Ok(y0 + weight * (y1 - y0))
    }

    fn derivative(&self, x: f64) -> MathResult<f64> {
        if clamp_query(&self.xs, x, self.extrapolation)?.is_some() {
            return Ok(0.0);
        }

        let i = find_segment(&self.xs, x);
        Ok((self.ys[i + 1] - self.ys[i]) / (self.xs[i + 1] - self.xs[i]))
    }

    fn min_x(&self) -> f64 {
        self.xs[0]
    }

    fn max_x(&self) -> f64 {
        self.xs[self.xs.len() - 1]
    }
}
