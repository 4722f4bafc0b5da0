//! Nelson-Siegel factor loadings.
//!
//! With `x = t / λ`:
//!
//! ```text
//! slope(x)     = (1 - e^(-x)) / x
//! curvature(x) = slope(x) - e^(-x)
//! ```
//!
//! A Nelson-Siegel curve is `β0 + β1·slope(t/λ) + β2·curvature(t/λ)`;
//! Svensson adds `β3·curvature(t/λ2)`.

/// Slope loading `(1 - e^(-x)) / x`, tending to 1 as `x → 0`.
pub fn slope_loading(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        // Taylor expansion
        1.0 - x / 2.0 + x * x / 6.0
    } else {
        -(-x).exp_m1() / x
    }
}

/// Curvature loading `(1 - e^(-x)) / x - e^(-x)`, tending to 0 as `x → 0`.
pub fn curvature_loading(x: f64) -> f64 {
    if x.abs() < 1e-8 {
        x / 2.0 - x * x / 3.0
    } else {
        slope_loading(x) - (-x).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_limits() {
        assert_relative_eq!(slope_loading(0.0), 1.0);
        assert_relative_eq!(curvature_loading(0.0), 0.0);
        assert!(slope_loading(100.0) < 0.011);
        assert!(curvature_loading(100.0) < 0.011);
    }

    #[test]
    fn test_continuity_at_switch() {
        assert_relative_eq!(slope_loading(1e-8), slope_loading(1.0001e-8), epsilon = 1e-12);
        assert_relative_eq!(
            curvature_loading(1e-8),
            curvature_loading(1.0001e-8),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_known_values() {
        let x: f64 = 1.0;
        let e = (-x).exp();
        assert_relative_eq!(slope_loading(x), 1.0 - e, epsilon = 1e-14);
        assert_relative_eq!(curvature_loading(x), 1.0 - 2.0 * e, epsilon = 1e-14);
    }
}
