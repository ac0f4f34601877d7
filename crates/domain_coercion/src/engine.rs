//! Coercion engine façade
//!
//! [`Coercer::convert`] is the public entry point. Dispatch order:
//!
//! ```text
//! primitive target ──> PrimitiveDispatcher ──[deferred]──┐
//! String target    ──> stringification                   │
//! null / assignable ─> pass-through                      │
//! anything else ─────────────────────────────────> Resolver
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_tz::Tz;
use num_bigint::BigInt;
use rust_decimal::Decimal;
use tracing::instrument;

use core_kernel::{CoercionError, DateParser, OffsetTime, TargetType, TypeRegistry, Value, ValueType};

use crate::config::CoercionConfig;
use crate::primitive::{Dispatch, PrimitiveDispatcher};
use crate::resolver::Resolver;

/// Converts arbitrary values to target types
///
/// Holds the read-only type registry and the primitive dispatcher; every
/// call is independent and the engine can be shared across threads.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = TypeRegistry::with_builtins();
/// registry.register(fraction_surface());
/// let coercer = Coercer::new(registry, DateParser::default());
///
/// let half = coercer.convert(&Value::I32(2), &TargetType::object::<Fraction>())?;
/// let n: i64 = coercer.to_i64(&Value::text("150"))?;
/// ```
#[derive(Debug, Clone)]
pub struct Coercer {
    registry: TypeRegistry,
    primitives: PrimitiveDispatcher,
}

macro_rules! typed_conversions {
    ($($(#[$doc:meta])* $name:ident -> $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, value: &Value) -> Result<$ty, CoercionError> {
                self.convert_to::<$ty>(value)
            }
        )*
    };
}

impl Coercer {
    pub fn new(registry: TypeRegistry, parser: DateParser) -> Self {
        Self {
            registry,
            primitives: PrimitiveDispatcher::new(parser),
        }
    }

    /// Creates an engine whose date parser follows the configured locale and zone
    pub fn from_config(registry: TypeRegistry, config: &CoercionConfig) -> Result<Self, CoercionError> {
        Ok(Self::new(registry, config.date_parser()?))
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn parser(&self) -> &DateParser {
        self.primitives.parser()
    }

    /// Converts `value` to `target`
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for malformed literals of primitive domains
    /// - `Unparseable` when text converted to a timestamp matches no grammar
    /// - `NoApplicableConversion` when neither a primitive rule nor a
    ///   discovered operation applies
    #[instrument(level = "debug", skip_all, fields(target = %target, kind = value.type_name()))]
    pub fn convert(&self, value: &Value, target: &TargetType) -> Result<Value, CoercionError> {
        match target {
            TargetType::Primitive(domain) => {
                if let Dispatch::Converted(converted) = self.primitives.dispatch(value, *domain)? {
                    return Ok(converted);
                }
            }
            TargetType::Text => return Ok(Value::Text(value.to_string())),
            _ => {}
        }

        if value.is_null() {
            return Ok(Value::Null);
        }
        if let Some(assigned) = value.widen_to(target) {
            return Ok(assigned);
        }

        Resolver::new(&self.registry).resolve(value, target)
    }

    /// Converts `value` to the Rust type `T`
    ///
    /// `null` converted to an object type has no `T` representation and is
    /// reported as `NoApplicableConversion`; use [`Coercer::convert`] to keep it.
    pub fn convert_to<T: ValueType>(&self, value: &Value) -> Result<T, CoercionError> {
        let target = T::target_type();
        let converted = self.convert(value, &target)?;
        T::from_value(&converted).ok_or_else(|| CoercionError::no_applicable(value, target))
    }

    typed_conversions! {
        to_bool -> bool;
        to_char -> char;
        to_i8 -> i8;
        to_i16 -> i16;
        to_i32 -> i32;
        to_i64 -> i64;
        to_f32 -> f32;
        to_f64 -> f64;
        /// Converts to an arbitrary-precision integer
        to_big_int -> BigInt;
        /// Converts to an arbitrary-precision decimal
        to_decimal -> Decimal;
        /// Converts to a UTC instant
        to_timestamp -> DateTime<Utc>;
        to_zoned_date_time -> DateTime<Tz>;
        to_offset_date_time -> DateTime<FixedOffset>;
        to_local_date_time -> NaiveDateTime;
        to_local_date -> NaiveDate;
        to_offset_time -> OffsetTime;
        to_local_time -> NaiveTime;
        /// Stringifies any value
        to_text -> String;
    }
}

impl Default for Coercer {
    fn default() -> Self {
        Self::new(TypeRegistry::with_builtins(), DateParser::default())
    }
}
