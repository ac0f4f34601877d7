//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating values of the primitive
//! domains, their canonical literals, and fixture instances.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use core_kernel::{OffsetTime, Primitive, Value};
use num_bigint::BigInt;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::fixtures::Fraction;

/// Strategy for picking any primitive domain
pub fn primitive_strategy() -> impl Strategy<Value = Primitive> {
    proptest::sample::select(Primitive::ALL.to_vec())
}

/// Strategy for calendar dates between years 1900 and 2100
pub fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100i32, 1u32..=12u32, 1u32..=28u32)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Strategy for times of day with whole seconds
pub fn time_strategy() -> impl Strategy<Value = NaiveTime> {
    (0u32..24u32, 0u32..60u32, 0u32..60u32)
        .prop_map(|(h, m, s)| NaiveTime::from_hms_opt(h, m, s).unwrap())
}

/// Strategy for local date-times
pub fn date_time_strategy() -> impl Strategy<Value = NaiveDateTime> {
    (date_strategy(), time_strategy()).prop_map(|(d, t)| d.and_time(t))
}

/// Strategy for whole-quarter-hour UTC offsets within ±14h
pub fn offset_strategy() -> impl Strategy<Value = FixedOffset> {
    (-56i32..=56i32).prop_map(|quarters| FixedOffset::east_opt(quarters * 900).unwrap())
}

/// Strategy for UTC instants with whole seconds
pub fn timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    date_time_strategy().prop_map(|dt| Utc.from_utc_datetime(&dt))
}

/// Strategy for arbitrary-precision decimals with up to 6 fractional digits
pub fn decimal_strategy() -> impl Strategy<Value = Decimal> {
    (any::<i64>(), 0u32..=6u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strategy for arbitrary-precision integers beyond the 64-bit range
pub fn big_int_strategy() -> impl Strategy<Value = BigInt> {
    (any::<i64>(), any::<u64>()).prop_map(|(high, low)| (BigInt::from(high) << 64) + BigInt::from(low))
}

/// Strategy for a value of the given primitive domain
pub fn value_of_strategy(domain: Primitive) -> BoxedStrategy<Value> {
    match domain {
        Primitive::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        Primitive::Char => any::<char>().prop_map(Value::Char).boxed(),
        Primitive::I8 => any::<i8>().prop_map(Value::I8).boxed(),
        Primitive::I16 => any::<i16>().prop_map(Value::I16).boxed(),
        Primitive::I32 => any::<i32>().prop_map(Value::I32).boxed(),
        Primitive::I64 => any::<i64>().prop_map(Value::I64).boxed(),
        Primitive::F32 => any::<f32>().prop_map(Value::F32).boxed(),
        Primitive::F64 => any::<f64>().prop_map(Value::F64).boxed(),
        Primitive::BigInt => big_int_strategy().prop_map(Value::BigInt).boxed(),
        Primitive::Decimal => decimal_strategy().prop_map(Value::Decimal).boxed(),
        Primitive::Timestamp => timestamp_strategy().prop_map(Value::Timestamp).boxed(),
        Primitive::ZonedDateTime => timestamp_strategy()
            .prop_map(|dt| Value::ZonedDateTime(dt.with_timezone(&chrono_tz::Europe::Paris)))
            .boxed(),
        Primitive::OffsetDateTime => (timestamp_strategy(), offset_strategy())
            .prop_map(|(dt, offset)| Value::OffsetDateTime(dt.with_timezone(&offset)))
            .boxed(),
        Primitive::LocalDateTime => date_time_strategy().prop_map(Value::LocalDateTime).boxed(),
        Primitive::LocalDate => date_strategy().prop_map(Value::LocalDate).boxed(),
        Primitive::OffsetTime => (time_strategy(), offset_strategy())
            .prop_map(|(t, offset)| Value::OffsetTime(OffsetTime::new(t, offset)))
            .boxed(),
        Primitive::LocalTime => time_strategy().prop_map(Value::LocalTime).boxed(),
    }
}

/// Strategy for a domain together with one of its values
pub fn primitive_value_strategy() -> impl Strategy<Value = (Primitive, Value)> {
    primitive_strategy().prop_flat_map(|domain| (Just(domain), value_of_strategy(domain)))
}

/// Strategy for canonical literals of the textual grammars, paired with the
/// domain that reads them
pub fn literal_strategy() -> impl Strategy<Value = (Primitive, String)> {
    prop_oneof![
        any::<bool>().prop_map(|b| (Primitive::Bool, b.to_string())),
        any::<i8>().prop_map(|n| (Primitive::I8, n.to_string())),
        any::<i16>().prop_map(|n| (Primitive::I16, n.to_string())),
        any::<i32>().prop_map(|n| (Primitive::I32, n.to_string())),
        any::<i64>().prop_map(|n| (Primitive::I64, n.to_string())),
        any::<f64>()
            .prop_filter("finite", |f| f.is_finite())
            .prop_map(|f| (Primitive::F64, f.to_string())),
        any::<char>().prop_map(|c| (Primitive::Char, c.to_string())),
    ]
}

/// Strategy for valid fractions
pub fn fraction_strategy() -> impl Strategy<Value = Fraction> {
    (-10_000i32..10_000i32, 1i32..10_000i32)
        .prop_map(|(n, d)| Fraction::new(n, d).unwrap())
}
