//! Surfaces of the standard domains
//!
//! These are the constructors, factories and conversion methods a host runtime
//! would expose for its own arbitrary-precision and date/time types. They let
//! the resolver treat the standard domains exactly like registered user types.

use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use num_bigint::BigInt;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::surface::{SurfaceBuilder, TypeRegistry};
use crate::temporal::{OffsetTime, TemporalError, Timezone};

/// Registers every built-in surface
pub fn register(registry: &mut TypeRegistry) {
    registry
        .register(big_int_surface())
        .register(decimal_surface())
        .register(offset_date_time_surface())
        .register(zoned_date_time_surface())
        .register(local_date_time_surface())
        .register(
            SurfaceBuilder::<NaiveDate>::new()
                .factory("parse", |text: String| NaiveDate::from_str(&text)),
        )
        .register(
            SurfaceBuilder::<NaiveTime>::new()
                .factory("parse", |text: String| NaiveTime::from_str(&text)),
        )
        .register(
            SurfaceBuilder::<OffsetTime>::new()
                .factory("parse", |text: String| OffsetTime::from_str(&text)),
        )
        .register(SurfaceBuilder::<DateTime<Utc>>::new().factory(
            "parse",
            |text: String| {
                DateTime::parse_from_rfc3339(&text).map(|dt| dt.with_timezone(&Utc))
            },
        ));
}

fn big_int_surface() -> SurfaceBuilder<BigInt> {
    SurfaceBuilder::<BigInt>::new()
        .constructor(|text: String| BigInt::from_str(&text))
        .factory("value_of", |n: i64| Ok::<_, String>(BigInt::from(n)))
}

fn decimal_surface() -> SurfaceBuilder<Decimal> {
    SurfaceBuilder::<Decimal>::new()
        .constructor(|n: BigInt| Decimal::from_str(&n.to_string()))
        .constructor(|text: String| {
            Decimal::from_str(&text).or_else(|_| Decimal::from_scientific(&text))
        })
        .factory("value_of", |n: i64| Ok::<_, String>(Decimal::from(n)))
        .factory("value_of", |n: f64| {
            Decimal::from_f64(n).ok_or_else(|| format!("{} has no decimal representation", n))
        })
}

fn offset_date_time_surface() -> SurfaceBuilder<DateTime<FixedOffset>> {
    SurfaceBuilder::<DateTime<FixedOffset>>::new()
        .factory("parse", |text: String| DateTime::parse_from_rfc3339(&text))
        .method("to_local_date_time", |dt: &DateTime<FixedOffset>| dt.naive_local())
        .method("to_local_date", |dt: &DateTime<FixedOffset>| dt.date_naive())
        .method("to_local_time", |dt: &DateTime<FixedOffset>| dt.time())
        .method("to_offset_time", |dt: &DateTime<FixedOffset>| {
            OffsetTime::new(dt.time(), *dt.offset())
        })
        .method("to_timestamp", |dt: &DateTime<FixedOffset>| dt.with_timezone(&Utc))
}

fn zoned_date_time_surface() -> SurfaceBuilder<DateTime<Tz>> {
    SurfaceBuilder::<DateTime<Tz>>::new()
        .factory("parse", |text: String| parse_zoned(&text))
        .method("to_local_date_time", |dt: &DateTime<Tz>| dt.naive_local())
        .method("to_local_date", |dt: &DateTime<Tz>| dt.date_naive())
        .method("to_local_time", |dt: &DateTime<Tz>| dt.time())
        .method("to_offset_date_time", |dt: &DateTime<Tz>| dt.fixed_offset())
        .method("to_timestamp", |dt: &DateTime<Tz>| dt.with_timezone(&Utc))
}

fn local_date_time_surface() -> SurfaceBuilder<NaiveDateTime> {
    SurfaceBuilder::<NaiveDateTime>::new()
        .factory("parse", |text: String| NaiveDateTime::from_str(&text))
        .method("to_local_date", |dt: &NaiveDateTime| dt.date())
        .method("to_local_time", |dt: &NaiveDateTime| dt.time())
}

/// Parses `2023-04-14T21:56:30+06:00[Asia/Dhaka]`; the zone suffix may be
/// omitted only for UTC instants
fn parse_zoned(text: &str) -> Result<DateTime<Tz>, TemporalError> {
    let unparseable = |offset: usize| TemporalError::Unparseable {
        input: text.to_string(),
        offset,
    };

    let (instant, zone) = match text.split_once('[') {
        Some((instant, rest)) => {
            let name = rest.strip_suffix(']').ok_or_else(|| unparseable(text.len()))?;
            (instant, Timezone::parse(name)?)
        }
        None => (text, Timezone::default()),
    };

    let parsed = DateTime::parse_from_rfc3339(instant).map_err(|_| unparseable(0))?;
    if !text.contains('[') && parsed.offset().local_minus_utc() != 0 {
        return Err(unparseable(instant.len()));
    }
    Ok(parsed.with_timezone(&zone.tz()))
}
