//! The yield curve value type.

use serde::{Deserialize, Serialize};

use bondlab_core::{BondlabError, BondlabResult};
use bondlab_math::interpolation::{CubicSpline, Extrapolation, Interpolator, LinearInterpolator};

use crate::forward;
use crate::parametric::{fit_nelson_siegel, NelsonSiegelParameters, SvenssonParameters};

/// A knot of the curve: annually compounded zero rate at a maturity in years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldCurvePoint {
    /// Maturity in years.
    pub maturity: f64,
    /// Zero rate as a decimal.
    pub rate: f64,
}

impl YieldCurvePoint {
    /// Creates a curve point.
    pub fn new(maturity: f64, rate: f64) -> Self {
        Self { maturity, rate }
    }
}

/// How the curve was built, which also fixes how it is evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CurveMethod {
    /// Sequentially bootstrapped; linear between nodes, flat outside.
    Bootstrap,
    /// Fitted Nelson-Siegel (or Svensson) model, evaluated exactly.
    NelsonSiegel,
    /// Natural cubic spline through the knots, flat outside.
    CubicSpline,
    /// Linear through the knots, flat outside.
    Linear,
}

#[derive(Debug, Clone, PartialEq)]
enum Interpolant {
    Flat(f64),
    Linear(LinearInterpolator),
    Spline(CubicSpline),
    NelsonSiegel(NelsonSiegelParameters),
    Svensson(SvenssonParameters),
}

/// Triangular key-rate bump on a parametric curve: full size at `center`,
/// zero at the neighbouring knots, flat beyond the end knots.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NodeBump {
    left: Option<f64>,
    center: f64,
    right: Option<f64>,
    shift: f64,
}

impl NodeBump {
    fn at(&self, t: f64) -> f64 {
        let weight = if t <= self.center {
            match self.left {
                None => 1.0,
                Some(left) if t <= left => 0.0,
                Some(left) => (t - left) / (self.center - left),
            }
        } else {
            match self.right {
                None => 1.0,
                Some(right) if t >= right => 0.0,
                Some(right) => (right - t) / (right - self.center),
            }
        };
        weight * self.shift
    }
}

/// An immutable zero-coupon yield curve.
///
/// Invariants: at least one point, maturities finite, positive and
/// strictly increasing, rates finite and above -100 %. Linear and spline
/// curves need two or more points. Shifts return new curves.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldCurve {
    points: Vec<YieldCurvePoint>,
    method: CurveMethod,
    interpolant: Interpolant,
    /// Parallel offset applied on top of the interpolant.
    offset: f64,
    bumps: Vec<NodeBump>,
}

impl YieldCurve {
    /// Builds a curve from points.
    ///
    /// `CurveMethod::NelsonSiegel` fits a Nelson-Siegel model to the points
    /// and evaluates the fitted model; the other methods interpolate.
    pub fn new(points: Vec<YieldCurvePoint>, method: CurveMethod) -> BondlabResult<Self> {
        validate_points(&points)?;

        let interpolant = match method {
            CurveMethod::NelsonSiegel => Interpolant::NelsonSiegel(fit_nelson_siegel(&points)?),
            _ => knot_interpolant(&points, method)?,
        };

        Ok(Self {
            points,
            method,
            interpolant,
            offset: 0.0,
            bumps: Vec::new(),
        })
    }

    /// A curve evaluating a Nelson-Siegel model, with knots sampled at
    /// `maturities` (used for key-rate shifts and reporting).
    pub fn from_nelson_siegel(
        params: NelsonSiegelParameters,
        maturities: &[f64],
    ) -> BondlabResult<Self> {
        let points = maturities
            .iter()
            .map(|&t| YieldCurvePoint::new(t, params.rate(t)))
            .collect();
        Self::parametric(points, Interpolant::NelsonSiegel(params))
    }

    /// A curve evaluating a Svensson model, with knots sampled at `maturities`.
    pub fn from_svensson(params: SvenssonParameters, maturities: &[f64]) -> BondlabResult<Self> {
        let points = maturities
            .iter()
            .map(|&t| YieldCurvePoint::new(t, params.rate(t)))
            .collect();
        Self::parametric(points, Interpolant::Svensson(params))
    }

    fn parametric(points: Vec<YieldCurvePoint>, interpolant: Interpolant) -> BondlabResult<Self> {
        validate_points(&points)?;
        Ok(Self {
            points,
            method: CurveMethod::NelsonSiegel,
            interpolant,
            offset: 0.0,
            bumps: Vec::new(),
        })
    }

    /// Zero rate at `t` years.
    ///
    /// Knot-based curves hold the end rates flat outside their knots.
    /// Negative or non-finite maturities are rejected.
    pub fn rate_at(&self, t: f64) -> BondlabResult<f64> {
        if !t.is_finite() || t < 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "curve maturity must be a non-negative finite number of years, got {t}"
            )));
        }

        let base = match &self.interpolant {
            Interpolant::Flat(rate) => *rate,
            Interpolant::Linear(interp) => interp.interpolate(t)?,
            Interpolant::Spline(spline) => spline.interpolate(t)?,
            Interpolant::NelsonSiegel(params) => params.rate(t),
            Interpolant::Svensson(params) => params.rate(t),
        };

        Ok(base + self.offset + self.bumps.iter().map(|b| b.at(t)).sum::<f64>())
    }

    /// Discount factor `(1 + z(t))^(-t)`.
    pub fn discount_factor(&self, t: f64) -> BondlabResult<f64> {
        let rate = self.rate_at(t)?;
        discount_factor(rate, t)
    }

    /// Annually compounded forward rate between `t1` and `t2`.
    pub fn forward_rate(&self, t1: f64, t2: f64) -> BondlabResult<f64> {
        forward::forward_rate(self.rate_at(t1)?, t1, self.rate_at(t2)?, t2)
    }

    /// A new curve with every rate moved by `shift` (decimal).
    #[must_use]
    pub fn with_parallel_shift(&self, shift: f64) -> Self {
        let mut shifted = self.clone();
        shifted.offset += shift;
        for point in &mut shifted.points {
            point.rate += shift;
        }
        shifted
    }

    /// A new curve with the rate of knot `index` moved by `shift` (decimal).
    ///
    /// Knot-based curves are rebuilt through the shifted knot. Parametric
    /// curves get a triangular bump peaking at the knot and vanishing at
    /// its neighbours; shifting every knot equals a parallel shift.
    pub fn with_node_shift(&self, index: usize, shift: f64) -> BondlabResult<Self> {
        if index >= self.points.len() {
            return Err(BondlabError::invalid_instrument(format!(
                "node index {index} out of range for a curve with {} points",
                self.points.len()
            )));
        }
        if !shift.is_finite() {
            return Err(BondlabError::invalid_instrument("node shift must be finite"));
        }

        let mut points = self.points.clone();
        points[index].rate += shift;

        match self.interpolant {
            Interpolant::NelsonSiegel(_) | Interpolant::Svensson(_) => {
                let mut bumps = self.bumps.clone();
                bumps.push(NodeBump {
                    left: index.checked_sub(1).map(|i| self.points[i].maturity),
                    center: self.points[index].maturity,
                    right: self.points.get(index + 1).map(|p| p.maturity),
                    shift,
                });
                Ok(Self {
                    points,
                    method: self.method,
                    interpolant: self.interpolant.clone(),
                    offset: self.offset,
                    bumps,
                })
            }
            _ => {
                validate_points(&points)?;
                Ok(Self {
                    interpolant: knot_interpolant(&points, self.method)?,
                    points,
                    method: self.method,
                    offset: 0.0,
                    bumps: Vec::new(),
                })
            }
        }
    }

    /// The curve's knots.
    pub fn points(&self) -> &[YieldCurvePoint] {
        &self.points
    }

    /// Knot maturities.
    pub fn maturities(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.maturity).collect()
    }

    /// Construction method.
    pub fn method(&self) -> CurveMethod {
        self.method
    }

    /// Number of knots.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false: curves hold at least one knot.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Longest knot maturity.
    pub fn max_maturity(&self) -> f64 {
        self.points.last().map_or(0.0, |p| p.maturity)
    }

    /// Fitted Nelson-Siegel parameters, if the curve evaluates one.
    pub fn nelson_siegel_parameters(&self) -> Option<NelsonSiegelParameters> {
        match self.interpolant {
            Interpolant::NelsonSiegel(params) => Some(params),
            _ => None,
        }
    }

    /// Fitted Svensson parameters, if the curve evaluates one.
    pub fn svensson_parameters(&self) -> Option<SvenssonParameters> {
        match self.interpolant {
            Interpolant::Svensson(params) => Some(params),
            _ => None,
        }
    }
}

/// Discount factor for an annually compounded rate over `t` years.
pub fn discount_factor(rate: f64, t: f64) -> BondlabResult<f64> {
    let base = 1.0 + rate;
    if base <= 0.0 {
        return Err(BondlabError::calculation(format!(
            "zero rate {rate} at t = {t} implies a non-positive growth factor"
        )));
    }
    Ok(base.powf(-t))
}

fn validate_points(points: &[YieldCurvePoint]) -> BondlabResult<()> {
    if points.is_empty() {
        return Err(BondlabError::invalid_instrument(
            "yield curve requires at least one point",
        ));
    }
    for point in points {
        if !point.maturity.is_finite() || point.maturity <= 0.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "curve maturities must be positive, got {}",
                point.maturity
            )));
        }
        if !point.rate.is_finite() || point.rate <= -1.0 {
            return Err(BondlabError::invalid_instrument(format!(
                "curve rate must be finite and above -100%, got {}",
                point.rate
            )));
        }
    }
    if let Some(pair) = points.windows(2).find(|w| w[1].maturity <= w[0].maturity) {
        return Err(BondlabError::invalid_instrument(format!(
            "curve maturities must be strictly increasing: {} then {}",
            pair[0].maturity, pair[1].maturity
        )));
    }
    Ok(())
}

fn knot_interpolant(points: &[YieldCurvePoint], method: CurveMethod) -> BondlabResult<Interpolant> {
    let xs: Vec<f64> = points.iter().map(|p| p.maturity).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.rate).collect();

    match method {
        CurveMethod::Bootstrap if points.len() == 1 => Ok(Interpolant::Flat(ys[0])),
        CurveMethod::Bootstrap | CurveMethod::Linear | CurveMethod::NelsonSiegel => {
            require_two_points(points.len(), method)?;
            Ok(Interpolant::Linear(
                LinearInterpolator::new(xs, ys)?.with_extrapolation(Extrapolation::Flat),
            ))
        }
        CurveMethod::CubicSpline => {
            require_two_points(points.len(), method)?;
            Ok(Interpolant::Spline(
                CubicSpline::new(xs, ys)?.with_extrapolation(Extrapolation::Flat),
            ))
        }
    }
}

fn require_two_points(count: usize, method: CurveMethod) -> BondlabResult<()> {
    if count < 2 {
        return Err(BondlabError::calculation(format!(
            "{method:?} interpolation needs at least 2 points, got {count}"
        )));
    }
    Ok(())
}
