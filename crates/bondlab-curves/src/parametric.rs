//! Nelson-Siegel and Svensson curve models.
//!
//! ```text
//! NS:  y(t) = β0 + β1·S(t/λ) + β2·C(t/λ)
//! SV:  y(t) = NS(t) + β3·C(t/λ2)
//! S(x) = (1 - e^(-x)) / x,   C(x) = S(x) - e^(-x)
//! ```
//!
//! Fitting is nonlinear least squares on observed zero rates. For a fixed
//! decay the model is linear in the betas, so a grid of decays solved by
//! ordinary least squares seeds a Levenberg-Marquardt refinement of all
//! parameters. Decays are optimized in log space to stay positive.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use bondlab_core::{BondlabError, BondlabResult};
use bondlab_math::interpolation::{curvature_loading, slope_loading};
use bondlab_math::linear_algebra::least_squares;
use bondlab_math::optimization::{levenberg_marquardt, LeastSquaresConfig};

use crate::curve::YieldCurvePoint;

/// Decays tried when seeding a fit, in years.
const DECAY_GRID: [f64; 16] = [
    0.1, 0.2, 0.3, 0.5, 0.75, 1.0, 1.25, 1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 7.0, 10.0, 15.0,
];

/// Nelson-Siegel parameters `(β0, β1, β2, λ)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NelsonSiegelParameters {
    /// Long-run level.
    pub beta0: f64,
    /// Slope factor; `β0 + β1` is the instantaneous short rate.
    pub beta1: f64,
    /// Curvature (hump) factor.
    pub beta2: f64,
    /// Decay in years; positive.
    pub lambda: f64,
}

impl NelsonSiegelParameters {
    /// Creates a parameter set; `lambda` must be positive and all finite.
    pub fn new(beta0: f64, beta1: f64, beta2: f64, lambda: f64) -> BondlabResult<Self> {
        if [beta0, beta1, beta2].iter().any(|b| !b.is_finite()) {
            return Err(BondlabError::invalid_instrument(
                "Nelson-Siegel betas must be finite",
            ));
        }
        validate_decay("lambda", lambda)?;
        Ok(Self {
            beta0,
            beta1,
            beta2,
            lambda,
        })
    }

    /// Zero rate at `t` years.
    pub fn rate(&self, t: f64) -> f64 {
        let x = t / self.lambda;
        self.beta0 + self.beta1 * slope_loading(x) + self.beta2 * curvature_loading(x)
    }
}

/// Svensson parameters: Nelson-Siegel plus a second hump `(β3, λ2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SvenssonParameters {
    /// Long-run level.
    pub beta0: f64,
    /// Slope factor.
    pub beta1: f64,
    /// First curvature factor.
    pub beta2: f64,
    /// First decay in years; positive.
    pub lambda: f64,
    /// Second curvature factor.
    pub beta3: f64,
    /// Second decay in years; positive.
    pub lambda2: f64,
}

impl SvenssonParameters {
    /// Creates a parameter set; both decays must be positive and all finite.
    pub fn new(
        beta0: f64,
        beta1: f64,
        beta2: f64,
        lambda: f64,
        beta3: f64,
        lambda2: f64,
    ) -> BondlabResult<Self> {
        if [beta0, beta1, beta2, beta3].iter().any(|b| !b.is_finite()) {
            return Err(BondlabError::invalid_instrument("Svensson betas must be finite"));
        }
        validate_decay("lambda", lambda)?;
        validate_decay("lambda2", lambda2)?;
        Ok(Self {
            beta0,
            beta1,
            beta2,
            lambda,
            beta3,
            lambda2,
        })
    }

    /// Zero rate at `t` years.
    pub fn rate(&self, t: f64) -> f64 {
        let x1 = t / self.lambda;
        let x2 = t / self.lambda2;
        self.beta0
            + self.beta1 * slope_loading(x1)
            + self.beta2 * curvature_loading(x1)
            + self.beta3 * curvature_loading(x2)
    }

    /// The Nelson-Siegel part of the model.
    pub fn nelson_siegel(&self) -> NelsonSiegelParameters {
        NelsonSiegelParameters {
            beta0: self.beta0,
            beta1: self.beta1,
            beta2: self.beta2,
            lambda: self.lambda,
        }
    }
}

fn validate_decay(name: &str, value: f64) -> BondlabResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(BondlabError::invalid_instrument(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn validate_observations(points: &[YieldCurvePoint], required: usize) -> BondlabResult<()> {
    if points.len() < required {
        return Err(BondlabError::calculation(format!(
            "fit needs at least {required} observations, got {}",
            points.len()
        )));
    }
    if points
        .iter()
        .any(|p| !p.maturity.is_finite() || p.maturity <= 0.0 || !p.rate.is_finite())
    {
        return Err(BondlabError::invalid_instrument(
            "observations need positive maturities and finite rates",
        ));
    }
    Ok(())
}

/// Ordinary least squares for the betas with the decays held fixed.
/// Returns the betas and the sum of squared residuals.
fn betas_for_decays(points: &[YieldCurvePoint], decays: &[f64]) -> Option<(Vec<f64>, f64)> {
    let columns = 2 + decays.len();
    let mut design = DMatrix::zeros(points.len(), columns);
    for (row, p) in points.iter().enumerate() {
        let x1 = p.maturity / decays[0];
        design[(row, 0)] = 1.0;
        design[(row, 1)] = slope_loading(x1);
        design[(row, 2)] = curvature_loading(x1);
        if let Some(decay2) = decays.get(1) {
            design[(row, 3)] = curvature_loading(p.maturity / decay2);
        }
    }
    let rates = DVector::from_iterator(points.len(), points.iter().map(|p| p.rate));

    let betas = least_squares(&design, &rates).ok()?;
    let sse = (&design * &betas - &rates).norm_squared();
    sse.is_finite().then(|| (betas.iter().copied().collect(), sse))
}

/// Fits Nelson-Siegel parameters to observed zero rates.
///
/// Needs at least four observations. Fails with `ConvergenceError` if the
/// refinement exhausts its iteration budget.
pub fn fit_nelson_siegel(points: &[YieldCurvePoint]) -> BondlabResult<NelsonSiegelParameters> {
    validate_observations(points, 4)?;

    let (betas, decay, grid_sse) = DECAY_GRID
        .iter()
        .filter_map(|&decay| betas_for_decays(points, &[decay]).map(|(b, sse)| (b, decay, sse)))
        .min_by(|a, b| a.2.total_cmp(&b.2))
        .ok_or_else(|| BondlabError::calculation("no decay produced a solvable fit"))?;

    let residuals = |p: &[f64]| -> Vec<f64> {
        let lambda = p[3].exp();
        points
            .iter()
            .map(|obs| {
                let x = obs.maturity / lambda;
                p[0] + p[1] * slope_loading(x) + p[2] * curvature_loading(x) - obs.rate
            })
            .collect()
    };

    let initial = [betas[0], betas[1], betas[2], decay.ln()];
    let result = levenberg_marquardt(residuals, &initial, &LeastSquaresConfig::default())?;
    if !result.converged {
        warn!(
            "Nelson-Siegel fit did not converge after {} iterations",
            result.iterations
        );
        return Err(BondlabError::convergence(
            result.iterations,
            result.sum_of_squares.sqrt(),
        ));
    }

    let p = if result.sum_of_squares <= grid_sse {
        result.parameters
    } else {
        initial.to_vec()
    };
    debug!(
        "Nelson-Siegel fit: sse {:.3e} (grid {:.3e}) in {} iterations",
        result.sum_of_squares, grid_sse, result.iterations
    );

    NelsonSiegelParameters::new(p[0], p[1], p[2], p[3].exp())
}

/// Fits Svensson parameters to observed zero rates.
///
/// Needs at least six observations. The second decay is searched above
/// the first so the two humps stay distinguishable.
pub fn fit_svensson(points: &[YieldCurvePoint]) -> BondlabResult<SvenssonParameters> {
    validate_observations(points, 6)?;

    let mut best: Option<(Vec<f64>, f64, f64, f64)> = None;
    for (i, &decay1) in DECAY_GRID.iter().enumerate() {
        for &decay2 in &DECAY_GRID[i + 1..] {
            if let Some((betas, sse)) = betas_for_decays(points, &[decay1, decay2]) {
                if best.as_ref().map_or(true, |b| sse < b.3) {
                    best = Some((betas, decay1, decay2, sse));
                }
            }
        }
    }
    let (betas, decay1, decay2, grid_sse) =
        best.ok_or_else(|| BondlabError::calculation("no decay pair produced a solvable fit"))?;

    let residuals = |p: &[f64]| -> Vec<f64> {
        let (lambda1, lambda2) = (p[3].exp(), p[5].exp());
        points
            .iter()
            .map(|obs| {
                let x1 = obs.maturity / lambda1;
                let x2 = obs.maturity / lambda2;
                p[0] + p[1] * slope_loading(x1)
                    + p[2] * curvature_loading(x1)
                    + p[4] * curvature_loading(x2)
                    - obs.rate
            })
            .collect()
    };

    let initial = [betas[0], betas[1], betas[2], decay1.ln(), betas[3], decay2.ln()];
    let config = LeastSquaresConfig::default().with_max_iterations(200);
    let result = levenberg_marquardt(residuals, &initial, &config)?;
    if !result.converged {
        warn!("Svensson fit did not converge after {} iterations", result.iterations);
        return Err(BondlabError::convergence(
            result.iterations,
            result.sum_of_squares.sqrt(),
        ));
    }

    let p = if result.sum_of_squares <= grid_sse {
        result.parameters
    } else {
        initial.to_vec()
    };

    SvenssonParameters::new(p[0], p[1], p[2], p[3].exp(), p[4], p[5].exp())
}
