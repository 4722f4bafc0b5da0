//! Interpolation methods for yield curve construction.
//!
//! - [`LinearInterpolator`]: piecewise linear
//! - [`CubicSpline`]: natural cubic spline (C2, zero curvature at the ends)
//! - [`slope_loading`] / [`curvature_loading`]: the Nelson-Siegel factor
//!   loadings shared by the parametric curve models
//!
//! Both interpolators pass exactly through their knots. Outside the knot
//! range they either refuse ([`Extrapolation::None`]) or hold the end value
//! ([`Extrapolation::Flat`]).

mod cubic_spline;
mod linear;
mod parametric;

pub use cubic_spline::CubicSpline;
pub use linear::LinearInterpolator;
pub use parametric::{curvature_loading, slope_loading};

use crate::error::{MathError, MathResult};

/// Behaviour outside the knot range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Extrapolation {
    /// Queries outside the knots are an error.
    #[default]
    None,
    /// Queries outside the knots return the nearest end value.
    Flat,
}

/// Common interface of the knot-based interpolators.
pub trait Interpolator: Send + Sync {
    /// Returns the interpolated value at x.
    fn interpolate(&self, x: f64) -> MathResult<f64>;

    /// Returns the first derivative at x.
    fn derivative(&self, x: f64) -> MathResult<f64>;

    /// Returns the minimum knot.
    fn min_x(&self) -> f64;

    /// Returns the maximum knot.
    fn max_x(&self) -> f64;

    /// Checks if x is within the knot range.
    fn in_range(&self, x: f64) -> bool {
        x >= self.min_x() && x <= self.max_x()
    }
}

/// Validates knot vectors shared by all interpolators.
pub(crate) fn validate_knots(xs: &[f64], ys: &[f64], required: usize) -> MathResult<()> {
    if xs.len() < required {
        return Err(MathError::insufficient_data(required, xs.len()));
    }
    if xs.len() != ys.len() {
        return Err(MathError::invalid_input(format!(
            "xs and ys must have same length: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.iter().chain(ys.iter()).any(|v| !v.is_finite()) {
        return Err(MathError::invalid_input("knots must be finite"));
    }
    if xs.windows(2).any(|w| w[1] <= w[0]) {
        return Err(MathError::invalid_input(
            "x values must be strictly increasing",
        ));
    }
    Ok(())
}

/// Index `i` of the segment `[xs[i], xs[i+1]]` containing `x` (clamped).
pub(crate) fn find_segment(xs: &[f64], x: f64) -> usize {
    let upper = xs.partition_point(|&knot| knot <= x);
    upper.saturating_sub(1).min(xs.len() - 2)
}

/// Applies the extrapolation policy; returns the value to use for `x`
/// when it lies outside the knots.
pub(crate) fn clamp_query(
    xs: &[f64],
    x: f64,
    extrapolation: Extrapolation,
) -> MathResult<Option<usize>> {
    let last = xs.len() - 1;
    if x >= xs[0] && x <= xs[last] {
        return Ok(None);
    }
    match extrapolation {
        Extrapolation::None => Err(MathError::ExtrapolationNotAllowed {
            x,
            min: xs[0],
            max: xs[last],
        }),
        Extrapolation::Flat => Ok(Some(if x < xs[0] { 0 } else { last })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_find_segment() {
        let xs = [0.5, 1.0, 2.0, 5.0];
        assert_eq!(find_segment(&xs, 0.5), 0);
        assert_eq!(find_segment(&xs, 1.0), 1);
        assert_eq!(find_segment(&xs, 1.5), 1);
        assert_eq!(find_segment(&xs, 5.0), 2);
    }

    #[test]
    fn test_all_interpolators_through_knots() {
        let times = vec![0.5, 1.0, 2.0, 3.0, 5.0];
        let rates = vec![0.02, 0.025, 0.03, 0.035, 0.04];

        let linear = LinearInterpolator::new(times.clone(), rates.clone()).unwrap();
        let spline = CubicSpline::new(times.clone(), rates.clone()).unwrap();

        for (t, r) in times.iter().zip(rates.iter()) {
            assert_relative_eq!(linear.interpolate(*t).unwrap(), *r, epsilon = 1e-12);
            assert_relative_eq!(spline.interpolate(*t).unwrap(), *r, epsilon = 1e-12);
        }
    }

    proptest! {
        #[test]
        fn prop_spline_hits_knots(
            ys in proptest::collection::vec(-0.02f64..0.10, 2..12),
        ) {
            let xs: Vec<f64> = (1..=ys.len()).map(|i| i as f64 * 0.75).collect();
            let spline = CubicSpline::new(xs.clone(), ys.clone()).unwrap();
            for (x, y) in xs.iter().zip(ys.iter()) {
                prop_assert!((spline.interpolate(*x).unwrap() - y).abs() < 1e-12);
            }
        }
    }
}
