//! Pre-built Test Fixtures
//!
//! Provides user types with registered surfaces, one per discovery strategy,
//! plus ready-to-use values of the standard domains. These fixtures are
//! designed to be consistent and predictable for unit tests.

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use core_kernel::{ObjectType, SurfaceBuilder, TargetType, TypeRegistry, Value};
use thiserror::Error;

/// Errors raised by fixture constructors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FixtureError {
    #[error("denominator cannot be 0")]
    ZeroDenominator,

    #[error("{0} is negative")]
    Negative(i64),

    #[error("malformed SKU: {0:?}")]
    MalformedSku(String),
}

/// A ratio of two integers kept in lowest terms with a positive denominator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fraction {
    numerator: i32,
    denominator: i32,
}

impl Fraction {
    pub fn new(numerator: i32, denominator: i32) -> Result<Self, FixtureError> {
        if denominator == 0 {
            return Err(FixtureError::ZeroDenominator);
        }
        let g = gcd(numerator.unsigned_abs(), denominator.unsigned_abs()) as i32;
        let sign = denominator.signum();
        Ok(Self {
            numerator: sign * numerator / g,
            denominator: sign * denominator / g,
        })
    }

    /// A whole number (denominator 1)
    pub fn whole(numerator: i32) -> Self {
        Self {
            numerator,
            denominator: 1,
        }
    }

    pub fn numerator(&self) -> i32 {
        self.numerator
    }

    pub fn denominator(&self) -> i32 {
        self.denominator
    }

    pub fn to_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }

    /// Integer quotient, truncated toward zero
    pub fn as_i32(&self) -> i32 {
        self.numerator / self.denominator
    }
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 {
        a.max(1)
    } else {
        gcd(b, a % b)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}

impl ObjectType for Fraction {}

/// Surface of [`Fraction`]: two constructors and two conversion methods
pub fn fraction_surface() -> SurfaceBuilder<Fraction> {
    SurfaceBuilder::<Fraction>::new()
        .constructor2(Fraction::new)
        .constructor(|n: i32| Ok::<_, FixtureError>(Fraction::whole(n)))
        .method("to_f64", Fraction::to_f64)
        .method("as_i32", Fraction::as_i32)
}

/// A labelled instant exposing its calendar date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    label: String,
    at: DateTime<FixedOffset>,
}

impl Stamp {
    pub fn new(label: impl Into<String>, at: DateTime<FixedOffset>) -> Self {
        Self {
            label: label.into(),
            at,
        }
    }

    pub fn to_local_date(&self) -> NaiveDate {
        self.at.date_naive()
    }

    pub fn to_local_date_time(&self) -> NaiveDateTime {
        self.at.naive_local()
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.label, self.at.to_rfc3339())
    }
}

impl ObjectType for Stamp {}

/// Surface of [`Stamp`]: conversion methods only, no way to build one
pub fn stamp_surface() -> SurfaceBuilder<Stamp> {
    SurfaceBuilder::<Stamp>::new()
        .method("to_local_date", Stamp::to_local_date)
        .method("get_local_date_time", Stamp::to_local_date_time)
        .method("label", |s: &Stamp| s.label.clone())
}

/// A stock-keeping unit built only through static factories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sku(u32);

impl Sku {
    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn parse(text: &str) -> Result<Self, FixtureError> {
        text.strip_prefix("SKU-")
            .and_then(|digits| digits.parse().ok())
            .map(Sku)
            .ok_or_else(|| FixtureError::MalformedSku(text.to_string()))
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SKU-{}", self.0)
    }
}

impl ObjectType for Sku {}

/// Surface of [`Sku`]: `from_number(i64)` and `parse(String)` factories
pub fn sku_surface() -> SurfaceBuilder<Sku> {
    SurfaceBuilder::<Sku>::new()
        .factory("from_number", |n: i64| {
            u32::try_from(n).map(Sku).map_err(|_| FixtureError::Negative(n))
        })
        .factory("parse", |text: String| Sku::parse(&text))
}

/// A non-negative count whose constructor rejects negatives and whose
/// factory clamps them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Count(u32);

impl Count {
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl ObjectType for Count {}

pub fn count_surface() -> SurfaceBuilder<Count> {
    SurfaceBuilder::<Count>::new()
        .constructor(|n: i64| u32::try_from(n).map(Count).map_err(|_| FixtureError::Negative(n)))
        .factory("clamped", |n: i64| {
            Ok::<_, FixtureError>(Count(u32::try_from(n.max(0)).unwrap_or(u32::MAX)))
        })
}

/// Records which of two equally eligible constructors built it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin(pub String);

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ObjectType for Origin {}

/// Surface of [`Origin`]: a `(i64)` constructor declared before an `(Any)` one
pub fn origin_surface() -> SurfaceBuilder<Origin> {
    SurfaceBuilder::<Origin>::new()
        .constructor(|n: i64| Ok::<_, FixtureError>(Origin(format!("i64:{n}"))))
        .constructor(|v: Value| Ok::<_, FixtureError>(Origin(format!("any:{v}"))))
}

/// The built-in surfaces plus every fixture surface
pub fn registry_with_fixtures() -> TypeRegistry {
    let mut registry = TypeRegistry::with_builtins();
    registry
        .register(fraction_surface())
        .register(stamp_surface())
        .register(sku_surface())
        .register(count_surface())
        .register(origin_surface());
    registry
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// The offset date-time used across the conversion tests
    pub fn offset_date_time() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(6 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 4, 14, 21, 56, 30)
            .unwrap()
    }

    /// Its ISO-8601 text form
    pub fn offset_date_time_text() -> &'static str {
        "2023-04-14T21:56:30+06:00"
    }

    /// 19 February 2002, midnight UTC
    pub fn feb_19_2002() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2002, 2, 19, 0, 0, 0).unwrap()
    }

    pub fn stamp() -> Stamp {
        Stamp::new("release", Self::offset_date_time())
    }
}

/// Target types of the fixtures
pub struct TargetFixtures;

impl TargetFixtures {
    pub fn fraction() -> TargetType {
        TargetType::object::<Fraction>()
    }

    pub fn sku() -> TargetType {
        TargetType::object::<Sku>()
    }

    pub fn count() -> TargetType {
        TargetType::object::<Count>()
    }

    pub fn origin() -> TargetType {
        TargetType::object::<Origin>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fraction_normalizes() {
        let f1 = Fraction::new(8, 2).unwrap();
        assert_eq!(Fraction::new(16, 4).unwrap(), f1);
        assert_eq!(Fraction::whole(4), f1);
        assert_eq!(Fraction::new(-12, -3).unwrap(), f1);

        let f5 = Fraction::new(5, -3).unwrap();
        assert!(f5.denominator() > 0);
        assert_eq!(f1.to_string(), "4");
        assert_eq!(f5.to_string(), "-5/3");
        assert_eq!(Fraction::new(0, -7).unwrap(), Fraction::whole(0));
        assert_eq!(Fraction::new(1, 0), Err(FixtureError::ZeroDenominator));
    }

    #[test]
    fn test_sku_parse() {
        assert_eq!(Sku::parse("SKU-42").unwrap().number(), 42);
        assert!(Sku::parse("42").is_err());
    }

    #[test]
    fn test_registry_with_fixtures() {
        let registry = registry_with_fixtures();
        assert_eq!(registry.constructors(&TargetFixtures::fraction()).len(), 2);
        assert_eq!(registry.methods(&TargetType::object::<Stamp>()).len(), 3);
        assert_eq!(registry.methods(&TargetFixtures::sku()).len(), 2);
    }
}
