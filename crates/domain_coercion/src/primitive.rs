//! Primitive coercion dispatcher
//!
//! Direct conversions into the well-known primitive domains. Rules are applied
//! per target domain in a fixed priority:
//!
//! 1. `null` becomes the domain's zero value
//! 2. a value already of the target domain is returned unchanged
//! 3. booleans become `1`/`0` (`'1'`/`'0'` for `char`)
//! 4. numbers are narrowed or widened with the natural cast of the target width
//! 5. text is parsed with the domain's literal grammar
//! 6. date/time values are projected between the temporal domains
//!
//! Anything else is [`Dispatch::Deferred`] to the capability resolver.
//! Characters are not numbers here; they reach the wider numeric domains
//! through assignment widening in the engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use num_bigint::{BigInt, Sign};
use num_traits::{FromPrimitive, ToPrimitive, Zero};
use rust_decimal::Decimal;
use tracing::trace;

use core_kernel::{epoch_date, CoercionError, DateParser, OffsetTime, Primitive, TargetType, Value};

/// Outcome of the primitive fast path
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// The value was converted directly
    Converted(Value),
    /// No primitive rule applies; the resolver decides
    Deferred,
}

/// A numeric input, viewed the way every numeric domain reads it
enum Number<'a> {
    Integer(i64),
    Float(f64),
    Big(&'a BigInt),
    Dec(Decimal),
}

impl<'a> Number<'a> {
    fn of(value: &'a Value) -> Option<Self> {
        let number = match value {
            Value::I8(n) => Number::Integer(i64::from(*n)),
            Value::I16(n) => Number::Integer(i64::from(*n)),
            Value::I32(n) => Number::Integer(i64::from(*n)),
            Value::I64(n) => Number::Integer(*n),
            Value::F32(f) => Number::Float(f64::from(*f)),
            Value::F64(f) => Number::Float(*f),
            Value::BigInt(n) => Number::Big(n),
            Value::Decimal(d) => Number::Dec(*d),
            _ => return None,
        };
        Some(number)
    }

    /// Truncated to 64 bits; floats saturate, wider integers wrap
    fn long_value(&self) -> i64 {
        match self {
            Number::Integer(n) => *n,
            Number::Float(f) => *f as i64,
            Number::Big(n) => {
                let low = n.iter_u64_digits().next().unwrap_or(0) as i64;
                if n.sign() == Sign::Minus {
                    low.wrapping_neg()
                } else {
                    low
                }
            }
            Number::Dec(d) => d.to_i128().unwrap_or_default() as i64,
        }
    }

    /// Truncated to 32 bits; floats saturate, wider integers wrap
    fn int_value(&self) -> i32 {
        match self {
            Number::Float(f) => *f as i32,
            other => other.long_value() as i32,
        }
    }

    fn double_value(&self) -> f64 {
        match self {
            Number::Integer(n) => *n as f64,
            Number::Float(f) => *f,
            Number::Big(n) => n.to_f64().unwrap_or(f64::NAN),
            Number::Dec(d) => d.to_f64().unwrap_or(f64::NAN),
        }
    }

    /// The integral part, exact for every input; non-finite floats have none
    fn big_value(&self, target: Primitive) -> Result<BigInt, CoercionError> {
        let big = match self {
            Number::Integer(n) => Some(BigInt::from(*n)),
            Number::Float(f) => BigInt::from_f64(f.trunc()),
            Number::Big(n) => Some((*n).clone()),
            Number::Dec(d) => d.trunc().to_i128().map(BigInt::from),
        };
        big.ok_or_else(|| CoercionError::invalid_input(target, format!("{} has no integral value", self)))
    }

    /// The decimal value; fails outside the 96-bit mantissa range and for
    /// non-finite floats
    fn decimal_value(&self, target: Primitive) -> Result<Decimal, CoercionError> {
        let decimal = match self {
            Number::Integer(n) => Some(Decimal::from(*n)),
            Number::Float(f) => Decimal::from_f64(*f),
            Number::Big(n) => Decimal::from_str(&n.to_string()).ok(),
            Number::Dec(d) => Some(*d),
        };
        decimal.ok_or_else(|| CoercionError::invalid_input(target, format!("{} does not fit a decimal", self)))
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Integer(n) => *n == 0,
            Number::Float(f) => f.trunc() == 0.0,
            Number::Big(n) => n.is_zero(),
            Number::Dec(d) => d.trunc().is_zero(),
        }
    }
}

impl fmt::Display for Number<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Float(x) => write!(f, "{x}"),
            Number::Big(n) => write!(f, "{n}"),
            Number::Dec(d) => write!(f, "{d}"),
        }
    }
}

/// Converts values into the primitive domains without runtime discovery
#[derive(Debug, Clone, Default)]
pub struct PrimitiveDispatcher {
    parser: DateParser,
}

impl PrimitiveDispatcher {
    pub fn new(parser: DateParser) -> Self {
        Self { parser }
    }

    /// The parser used for text to timestamp conversions
    pub fn parser(&self) -> &DateParser {
        &self.parser
    }

    /// Applies the primitive rules for `target`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for malformed literals, wrong `char` lengths and
    ///   unrepresentable values
    /// - `Unparseable` when no date grammar matches text converted to a timestamp
    pub fn dispatch(&self, value: &Value, target: Primitive) -> Result<Dispatch, CoercionError> {
        if value.is_null() {
            trace!(%target, "null to zero value");
            return Ok(Dispatch::Converted(self.zero(target)));
        }
        if value.type_of() == Some(TargetType::Primitive(target)) {
            return Ok(Dispatch::Converted(value.clone()));
        }

        let converted = match value {
            Value::Bool(b) => from_bool(*b, target),
            Value::Text(text) => self.from_text(text, target)?,
            other => match Number::of(other) {
                Some(number) => from_number(&number, target)?,
                None => self.from_temporal(other, target)?,
            },
        };

        Ok(match converted {
            Some(value) => {
                trace!(%target, "primitive fast path");
                Dispatch::Converted(value)
            }
            None => Dispatch::Deferred,
        })
    }

    /// The value `null` converts to
    pub fn zero(&self, target: Primitive) -> Value {
        let epoch = DateTime::<Utc>::default();
        match target {
            Primitive::Bool => Value::Bool(false),
            Primitive::Char => Value::Char('\0'),
            Primitive::I8 => Value::I8(0),
            Primitive::I16 => Value::I16(0),
            Primitive::I32 => Value::I32(0),
            Primitive::I64 => Value::I64(0),
            Primitive::F32 => Value::F32(0.0),
            Primitive::F64 => Value::F64(0.0),
            Primitive::BigInt => Value::BigInt(BigInt::zero()),
            Primitive::Decimal => Value::Decimal(Decimal::ZERO),
            Primitive::Timestamp => Value::Timestamp(epoch),
            Primitive::ZonedDateTime => Value::ZonedDateTime(epoch.with_timezone(&chrono_tz::UTC)),
            Primitive::OffsetDateTime => Value::OffsetDateTime(epoch.fixed_offset()),
            Primitive::LocalDateTime => Value::LocalDateTime(NaiveDateTime::default()),
            Primitive::LocalDate => Value::LocalDate(epoch_date()),
            Primitive::OffsetTime => Value::OffsetTime(OffsetTime::new(NaiveTime::MIN, Utc.fix())),
            Primitive::LocalTime => Value::LocalTime(NaiveTime::MIN),
        }
    }

    fn from_text(&self, text: &str, target: Primitive) -> Result<Option<Value>, CoercionError> {
        let invalid = |reason: String| CoercionError::invalid_input(target, reason);

        let value = match target {
            Primitive::Bool => {
                if text.eq_ignore_ascii_case("true") {
                    Value::Bool(true)
                } else if text.eq_ignore_ascii_case("false") {
                    Value::Bool(false)
                } else {
                    return Err(invalid(format!("{:?} is not a boolean literal", text)));
                }
            }
            Primitive::Char => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Value::Char(c),
                    _ => {
                        return Err(invalid(format!(
                            "expected exactly one character, got {}",
                            text.chars().count()
                        )))
                    }
                }
            }
            Primitive::I8 => Value::I8(text.parse().map_err(|e| invalid(format!("{e}")))?),
            Primitive::I16 => Value::I16(text.parse().map_err(|e| invalid(format!("{e}")))?),
            Primitive::I32 => Value::I32(text.parse().map_err(|e| invalid(format!("{e}")))?),
            Primitive::I64 => Value::I64(text.parse().map_err(|e| invalid(format!("{e}")))?),
            Primitive::F32 => Value::F32(text.trim().parse().map_err(|e| invalid(format!("{e}")))?),
            Primitive::F64 => Value::F64(text.trim().parse().map_err(|e| invalid(format!("{e}")))?),
            Primitive::BigInt => Value::BigInt(BigInt::from_str(text).map_err(|e| invalid(format!("{e}")))?),
            Primitive::Decimal => Value::Decimal(
                Decimal::from_str(text)
                    .or_else(|_| Decimal::from_scientific(text))
                    .map_err(|e| invalid(format!("{e}")))?,
            ),
            Primitive::Timestamp => Value::Timestamp(self.parser.parse(text)?),
            _ => return Ok(None),
        };
        Ok(Some(value))
    }

    fn from_temporal(&self, value: &Value, target: Primitive) -> Result<Option<Value>, CoercionError> {
        let zone = self.parser.zone();
        let localize = |local: NaiveDateTime| {
            zone.localize(local).ok_or_else(|| {
                CoercionError::invalid_input(
                    target,
                    format!("{} does not exist in {}", local, zone.tz().name()),
                )
            })
        };
        let start_of_day = |date: &NaiveDate| {
            zone.start_of_day(*date).ok_or_else(|| {
                CoercionError::invalid_input(
                    target,
                    format!("{} has no midnight in {}", date, zone.tz().name()),
                )
            })
        };
        let on_epoch = |time: &OffsetTime| {
            time.at_date(epoch_date()).ok_or_else(|| {
                CoercionError::invalid_input(target, format!("{} has no instant on the epoch date", time))
            })
        };

        let converted = match (target, value) {
            (Primitive::Timestamp, Value::ZonedDateTime(dt)) => Value::Timestamp(dt.with_timezone(&Utc)),
            (Primitive::Timestamp, Value::OffsetDateTime(dt)) => Value::Timestamp(dt.with_timezone(&Utc)),
            (Primitive::Timestamp, Value::LocalDateTime(dt)) => {
                Value::Timestamp(localize(*dt)?.with_timezone(&Utc))
            }
            (Primitive::Timestamp, Value::LocalDate(d)) => {
                Value::Timestamp(start_of_day(d)?.with_timezone(&Utc))
            }
            (Primitive::Timestamp, Value::OffsetTime(t)) => Value::Timestamp(on_epoch(t)?.with_timezone(&Utc)),
            (Primitive::Timestamp, Value::LocalTime(t)) => {
                Value::Timestamp(localize(epoch_date().and_time(*t))?.with_timezone(&Utc))
            }

            (Primitive::ZonedDateTime, Value::LocalDateTime(dt)) => Value::ZonedDateTime(localize(*dt)?),
            (Primitive::ZonedDateTime, Value::LocalDate(d)) => {
                Value::ZonedDateTime(start_of_day(d)?)
            }
            (Primitive::ZonedDateTime, Value::LocalTime(t)) => {
                Value::ZonedDateTime(localize(epoch_date().and_time(*t))?)
            }
            (Primitive::ZonedDateTime, Value::OffsetTime(t)) => {
                Value::ZonedDateTime(on_epoch(t)?.with_timezone(&zone.tz()))
            }
            (Primitive::ZonedDateTime, Value::Timestamp(dt)) => Value::ZonedDateTime(dt.with_timezone(&zone.tz())),
            (Primitive::ZonedDateTime, Value::OffsetDateTime(dt)) => {
                Value::ZonedDateTime(dt.with_timezone(&zone.tz()))
            }

            (Primitive::OffsetDateTime, Value::LocalDateTime(dt)) => {
                Value::OffsetDateTime(localize(*dt)?.fixed_offset())
            }
            (Primitive::OffsetDateTime, Value::LocalDate(d)) => {
                Value::OffsetDateTime(start_of_day(d)?.fixed_offset())
            }
            (Primitive::OffsetDateTime, Value::LocalTime(t)) => {
                Value::OffsetDateTime(localize(epoch_date().and_time(*t))?.fixed_offset())
            }
            (Primitive::OffsetDateTime, Value::OffsetTime(t)) => Value::OffsetDateTime(on_epoch(t)?),
            (Primitive::OffsetDateTime, Value::Timestamp(dt)) => {
                Value::OffsetDateTime(dt.with_timezone(&zone.tz()).fixed_offset())
            }
            (Primitive::OffsetDateTime, Value::ZonedDateTime(dt)) => Value::OffsetDateTime(dt.fixed_offset()),

            (Primitive::LocalDateTime, Value::LocalDate(d)) => Value::LocalDateTime(d.and_time(NaiveTime::MIN)),
            (Primitive::LocalDateTime, Value::LocalTime(t)) => Value::LocalDateTime(epoch_date().and_time(*t)),
            (Primitive::LocalDateTime, Value::Timestamp(dt)) => {
                Value::LocalDateTime(dt.with_timezone(&zone.tz()).naive_local())
            }

            (Primitive::LocalDate, Value::Timestamp(dt)) => Value::LocalDate(dt.with_timezone(&zone.tz()).date_naive()),
            (Primitive::OffsetTime, Value::Timestamp(dt)) => {
                Value::OffsetTime(OffsetTime::from_instant(*dt, zone.offset_at(*dt)))
            }
            (Primitive::LocalTime, Value::Timestamp(dt)) => Value::LocalTime(dt.with_timezone(&zone.tz()).time()),

            _ => return Ok(None),
        };
        Ok(Some(converted))
    }
}

fn from_bool(b: bool, target: Primitive) -> Option<Value> {
    let bit = u8::from(b);
    let value = match target {
        Primitive::Char => Value::Char(if b { '1' } else { '0' }),
        Primitive::I8 => Value::I8(bit as i8),
        Primitive::I16 => Value::I16(i16::from(bit)),
        Primitive::I32 => Value::I32(i32::from(bit)),
        Primitive::I64 => Value::I64(i64::from(bit)),
        Primitive::F32 => Value::F32(f32::from(bit)),
        Primitive::F64 => Value::F64(f64::from(bit)),
        Primitive::BigInt => Value::BigInt(BigInt::from(bit)),
        Primitive::Decimal => Value::Decimal(Decimal::from(bit)),
        _ => return None,
    };
    Some(value)
}

fn from_number(number: &Number<'_>, target: Primitive) -> Result<Option<Value>, CoercionError> {
    let value = match target {
        Primitive::Bool => Value::Bool(!number.is_zero()),
        Primitive::Char => {
            let code = number.long_value();
            let c = u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .ok_or_else(|| {
                    CoercionError::invalid_input(target, format!("{code} is not a Unicode scalar value"))
                })?;
            Value::Char(c)
        }
        Primitive::I8 => Value::I8(number.int_value() as i8),
        Primitive::I16 => Value::I16(number.int_value() as i16),
        Primitive::I32 => Value::I32(number.int_value()),
        Primitive::I64 => Value::I64(number.long_value()),
        Primitive::F32 => match number {
            Number::Integer(n) => Value::F32(*n as f32),
            other => Value::F32(other.double_value() as f32),
        },
        Primitive::F64 => Value::F64(number.double_value()),
        Primitive::BigInt => Value::BigInt(number.big_value(target)?),
        Primitive::Decimal => Value::Decimal(number.decimal_value(target)?),
        _ => return Ok(None),
    };
    Ok(Some(value))
}
