//! Bond instruments.
//!
//! [`Bond`] is a closed sum type. Every variant is validated at
//! construction; [`Bond::validate_for`] repeats the checks (deserialized
//! bonds have not been through a constructor) and adds the settlement
//! checks every valuation performs.

use serde::{Deserialize, Serialize};

use bondlab_core::daycounts::DayCountConvention;
use bondlab_core::error::ensure_finite;
use bondlab_core::types::{BasisPoints, Date, Frequency};
use bondlab_core::{BondlabError, BondlabResult};

/// A fixed-coupon bullet bond.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedRateBond {
    face_value: f64,
    coupon_rate: f64,
    maturity: Date,
    frequency: Frequency,
    day_count: DayCountConvention,
    issue_date: Option<Date>,
}

impl FixedRateBond {
    /// Creates a fixed-rate bond. `coupon_rate` is a decimal (0.05 = 5 %).
    pub fn new(
        face_value: f64,
        coupon_rate: f64,
        maturity: Date,
        frequency: Frequency,
        day_count: DayCountConvention,
    ) -> BondlabResult<Self> {
        let bond = Self {
            face_value,
            coupon_rate,
            maturity,
            frequency,
            day_count,
            issue_date: None,
        };
        bond.validate()?;
        Ok(bond)
    }

    /// Sets the issue date, which must precede maturity.
    pub fn with_issue_date(mut self, issue_date: Date) -> BondlabResult<Self> {
        self.issue_date = Some(issue_date);
        self.validate()?;
        Ok(self)
    }

    /// Face (par) amount.
    pub fn face_value(&self) -> f64 {
        self.face_value
    }

    /// Annual coupon rate as a decimal.
    pub fn coupon_rate(&self) -> f64 {
        self.coupon_rate
    }

    /// Maturity date.
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Coupon frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Day count convention.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Issue date, if known.
    pub fn issue_date(&self) -> Option<Date> {
        self.issue_date
    }

    fn validate(&self) -> BondlabResult<()> {
        validate_face(self.face_value)?;
        ensure_finite("coupon rate", self.coupon_rate)?;
        if let Some(issue) = self.issue_date {
            if issue >= self.maturity {
                return Err(BondlabError::invalid_instrument(format!(
                    "issue date {issue} must precede maturity {}",
                    self.maturity
                )));
            }
        }
        Ok(())
    }
}

/// A floating-rate note projected at a flat reference rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloatingRateNote {
    face_value: f64,
    spread: BasisPoints,
    maturity: Date,
    frequency: Frequency,
    day_count: DayCountConvention,
    reference_rate: f64,
}

impl FloatingRateNote {
    /// Creates a floating-rate note paying `reference_rate + spread`.
    pub fn new(
        face_value: f64,
        spread: BasisPoints,
        maturity: Date,
        frequency: Frequency,
        day_count: DayCountConvention,
        reference_rate: f64,
    ) -> BondlabResult<Self> {
        let note = Self {
            face_value,
            spread,
            maturity,
            frequency,
            day_count,
            reference_rate,
        };
        note.validate()?;
        Ok(note)
    }

    /// Face (par) amount.
    pub fn face_value(&self) -> f64 {
        self.face_value
    }

    /// Quoted margin over the reference rate.
    pub fn spread(&self) -> BasisPoints {
        self.spread
    }

    /// Maturity date.
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Reset and payment frequency.
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Day count convention.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }

    /// Reference rate as a decimal.
    pub fn reference_rate(&self) -> f64 {
        self.reference_rate
    }

    /// Projected coupon rate: reference plus spread.
    pub fn coupon_rate(&self) -> f64 {
        self.reference_rate + self.spread.as_decimal()
    }

    fn validate(&self) -> BondlabResult<()> {
        validate_face(self.face_value)?;
        ensure_finite("reference rate", self.reference_rate)?;
        ensure_finite("spread", self.spread.value())?;
        Ok(())
    }
}

/// A zero-coupon bond; yields compound annually.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroCouponBond {
    face_value: f64,
    maturity: Date,
    day_count: DayCountConvention,
}

impl ZeroCouponBond {
    /// Creates a zero-coupon bond.
    pub fn new(
        face_value: f64,
        maturity: Date,
        day_count: DayCountConvention,
    ) -> BondlabResult<Self> {
        validate_face(face_value)?;
        Ok(Self {
            face_value,
            maturity,
            day_count,
        })
    }

    /// Face (par) amount.
    pub fn face_value(&self) -> f64 {
        self.face_value
    }

    /// Maturity date.
    pub fn maturity(&self) -> Date {
        self.maturity
    }

    /// Day count convention.
    pub fn day_count(&self) -> DayCountConvention {
        self.day_count
    }
}

/// One entry of a call or put schedule.
///
/// `price` is an absolute amount in the same units as the face value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExerciseEntry {
    /// First date the price applies.
    pub date: Date,
    /// Exercise price.
    pub price: f64,
}

impl ExerciseEntry {
    /// Creates a schedule entry.
    pub fn new(date: Date, price: f64) -> Self {
        Self { date, price }
    }
}

/// A fixed-rate bond with an embedded call or put schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedOptionBond {
    base: FixedRateBond,
    schedule: Vec<ExerciseEntry>,
}

impl EmbeddedOptionBond {
    /// Attaches an exercise schedule to a fixed-rate bond.
    ///
    /// The schedule must be non-empty with strictly increasing dates, all
    /// before maturity, and positive prices.
    pub fn new(base: FixedRateBond, schedule: Vec<ExerciseEntry>) -> BondlabResult<Self> {
        let bond = Self { base, schedule };
        bond.validate()?;
        Ok(bond)
    }

    /// The underlying option-free bond.
    pub fn base(&self) -> &FixedRateBond {
        &self.base
    }

    /// Exercise schedule in date order.
    pub fn schedule(&self) -> &[ExerciseEntry] {
        &self.schedule
    }

    /// Entries strictly after `settlement`.
    pub fn future_entries(&self, settlement: Date) -> impl Iterator<Item = &ExerciseEntry> {
        self.schedule.iter().filter(move |e| e.date > settlement)
    }

    /// The price in force on `date`: the latest entry on or before it.
    pub fn price_on(&self, date: Date) -> Option<f64> {
        self.schedule
            .iter()
            .take_while(|e| e.date <= date)
            .last()
            .map(|e| e.price)
    }

    fn validate(&self) -> BondlabResult<()> {
        self.base.validate()?;
        if self.schedule.is_empty() {
            return Err(BondlabError::invalid_instrument("exercise schedule is empty"));
        }
        if let Some(pair) = self.schedule.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(BondlabError::invalid_instrument(format!(
                "exercise dates must be strictly increasing: {} then {}",
                pair[0].date, pair[1].date
            )));
        }
        for entry in &self.schedule {
            if entry.date >= self.base.maturity {
                return Err(BondlabError::invalid_instrument(format!(
                    "exercise date {} is not before maturity {}",
                    entry.date, self.base.maturity
                )));
            }
            if !entry.price.is_finite() || entry.price <= 0.0 {
                return Err(BondlabError::invalid_instrument(format!(
                    "exercise price must be positive, got {}",
                    entry.price
                )));
            }
        }
        Ok(())
    }
}

/// A bond of any supported kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Bond {
    /// Fixed-coupon bullet.
    FixedRate(FixedRateBond),
    /// Floating-rate note.
    Floating(FloatingRateNote),
    /// Zero coupon.
    ZeroCoupon(ZeroCouponBond),
    /// Issuer-callable fixed-rate bond.
    Callable(EmbeddedOptionBond),
    /// Holder-putable fixed-rate bond.
    Putable(EmbeddedOptionBond),
}

impl Bond {
    /// Builds a callable bond.
    pub fn callable(base: FixedRateBond, schedule: Vec<ExerciseEntry>) -> BondlabResult<Self> {
        Ok(Bond::Callable(EmbeddedOptionBond::new(base, schedule)?))
    }

    /// Builds a putable bond.
    pub fn putable(base: FixedRateBond, schedule: Vec<ExerciseEntry>) -> BondlabResult<Self> {
        Ok(Bond::Putable(EmbeddedOptionBond::new(base, schedule)?))
    }

    /// Face (par) amount.
    pub fn face_value(&self) -> f64 {
        match self {
            Bond::FixedRate(b) => b.face_value,
            Bond::Floating(b) => b.face_value,
            Bond::ZeroCoupon(b) => b.face_value,
            Bond::Callable(b) | Bond::Putable(b) => b.base.face_value,
        }
    }

    /// Maturity date.
    pub fn maturity(&self) -> Date {
        match self {
            Bond::FixedRate(b) => b.maturity,
            Bond::Floating(b) => b.maturity,
            Bond::ZeroCoupon(b) => b.maturity,
            Bond::Callable(b) | Bond::Putable(b) => b.base.maturity,
        }
    }

    /// Coupon frequency; zero coupons compound annually.
    pub fn frequency(&self) -> Frequency {
        match self {
            Bond::FixedRate(b) => b.frequency,
            Bond::Floating(b) => b.frequency,
            Bond::ZeroCoupon(_) => Frequency::Annual,
            Bond::Callable(b) | Bond::Putable(b) => b.base.frequency,
        }
    }

    /// Compounding periods per year used for yields.
    pub fn periods_per_year(&self) -> f64 {
        f64::from(self.frequency().periods_per_year())
    }

    /// Day count convention.
    pub fn day_count(&self) -> DayCountConvention {
        match self {
            Bond::FixedRate(b) => b.day_count,
            Bond::Floating(b) => b.day_count,
            Bond::ZeroCoupon(b) => b.day_count,
            Bond::Callable(b) | Bond::Putable(b) => b.base.day_count,
        }
    }

    /// Annual coupon rate as a decimal (projected for floaters, zero for
    /// zero coupons).
    pub fn coupon_rate(&self) -> f64 {
        match self {
            Bond::FixedRate(b) => b.coupon_rate,
            Bond::Floating(b) => b.coupon_rate(),
            Bond::ZeroCoupon(_) => 0.0,
            Bond::Callable(b) | Bond::Putable(b) => b.base.coupon_rate,
        }
    }

    /// Issue date, if known.
    pub fn issue_date(&self) -> Option<Date> {
        match self {
            Bond::FixedRate(b) => b.issue_date,
            Bond::Callable(b) | Bond::Putable(b) => b.base.issue_date,
            Bond::Floating(_) | Bond::ZeroCoupon(_) => None,
        }
    }

    /// Coupon amount per period.
    pub fn coupon_amount(&self) -> f64 {
        self.face_value() * self.coupon_rate() / self.periods_per_year()
    }

    /// Whether the bond pays periodic coupons.
    pub fn has_coupons(&self) -> bool {
        !matches!(self, Bond::ZeroCoupon(_))
    }

    /// The embedded exercise schedule, if any.
    pub fn exercise_schedule(&self) -> Option<&EmbeddedOptionBond> {
        match self {
            Bond::Callable(b) | Bond::Putable(b) => Some(b),
            _ => None,
        }
    }

    /// Short kind label for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Bond::FixedRate(_) => "fixed-rate",
            Bond::Floating(_) => "floating-rate",
            Bond::ZeroCoupon(_) => "zero-coupon",
            Bond::Callable(_) => "callable",
            Bond::Putable(_) => "putable",
        }
    }

    /// Re-runs construction invariants.
    pub fn validate(&self) -> BondlabResult<()> {
        match self {
            Bond::FixedRate(b) => b.validate(),
            Bond::Floating(b) => b.validate(),
            Bond::ZeroCoupon(b) => validate_face(b.face_value),
            Bond::Callable(b) | Bond::Putable(b) => b.validate(),
        }
    }

    /// Checks the bond can be valued at `settlement`: invariants hold,
    /// maturity is after settlement and settlement is not before issue.
    pub fn validate_for(&self, settlement: Date) -> BondlabResult<()> {
        self.validate()?;
        if self.maturity() <= settlement {
            return Err(BondlabError::invalid_instrument(format!(
                "{} bond matures {} on or before settlement {settlement}",
                self.kind(),
                self.maturity()
            )));
        }
        if let Some(issue) = self.issue_date() {
            if settlement < issue {
                return Err(BondlabError::invalid_instrument(format!(
                    "settlement {settlement} precedes issue date {issue}"
                )));
            }
        }
        Ok(())
    }
}

impl From<FixedRateBond> for Bond {
    fn from(bond: FixedRateBond) -> Self {
        Bond::FixedRate(bond)
    }
}

impl From<FloatingRateNote> for Bond {
    fn from(note: FloatingRateNote) -> Self {
        Bond::Floating(note)
    }
}

impl From<ZeroCouponBond> for Bond {
    fn from(bond: ZeroCouponBond) -> Self {
        Bond::ZeroCoupon(bond)
    }
}

fn validate_face(face_value: f64) -> BondlabResult<()> {
    if !face_value.is_finite() || face_value <= 0.0 {
        return Err(BondlabError::invalid_instrument(format!(
            "face value must be positive and finite, got {face_value}"
        )));
    }
    Ok(())
}
