//! Dynamic values and the type descriptors they are converted between
//!
//! A [`Value`] carries its own runtime type identity, exposed as a
//! [`TargetType`]. The well-known primitive domains are closed enum variants;
//! every other type travels as an [`Object`] behind a type-erased handle and is
//! identified by its [`ObjectDescriptor`].

use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use num_bigint::BigInt;
use rust_decimal::Decimal;

use crate::temporal::OffsetTime;

/// The fixed set of domains converted without runtime discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    Char,
    I8,
    I16,
    I32,
    I64,
    F32,
    F64,
    /// Arbitrary-precision integer
    BigInt,
    /// Arbitrary-precision decimal
    Decimal,
    /// A UTC instant, the legacy "date" domain
    Timestamp,
    ZonedDateTime,
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    OffsetTime,
    LocalTime,
}

impl Primitive {
    /// All primitive domains, in the order the engine checks them
    pub const ALL: [Primitive; 17] = [
        Primitive::Bool,
        Primitive::Char,
        Primitive::I8,
        Primitive::I16,
        Primitive::I32,
        Primitive::I64,
        Primitive::F32,
        Primitive::F64,
        Primitive::BigInt,
        Primitive::Decimal,
        Primitive::Timestamp,
        Primitive::ZonedDateTime,
        Primitive::OffsetDateTime,
        Primitive::LocalDateTime,
        Primitive::LocalDate,
        Primitive::OffsetTime,
        Primitive::LocalTime,
    ];

    /// Returns the simple name used in diagnostics and conversion-method lookup
    pub fn simple_name(&self) -> &'static str {
        match self {
            Primitive::Bool => "bool",
            Primitive::Char => "char",
            Primitive::I8 => "i8",
            Primitive::I16 => "i16",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::F32 => "f32",
            Primitive::F64 => "f64",
            Primitive::BigInt => "BigInt",
            Primitive::Decimal => "Decimal",
            Primitive::Timestamp => "Timestamp",
            Primitive::ZonedDateTime => "ZonedDateTime",
            Primitive::OffsetDateTime => "OffsetDateTime",
            Primitive::LocalDateTime => "LocalDateTime",
            Primitive::LocalDate => "LocalDate",
            Primitive::OffsetTime => "OffsetTime",
            Primitive::LocalTime => "LocalTime",
        }
    }

    /// Looks a domain up by simple name or a common alias, ignoring case
    pub fn from_name(name: &str) -> Option<Self> {
        let lowered = name.trim().to_ascii_lowercase();
        let domain = match lowered.as_str() {
            "boolean" => Primitive::Bool,
            "character" => Primitive::Char,
            "byte" => Primitive::I8,
            "short" => Primitive::I16,
            "int" | "integer" => Primitive::I32,
            "long" => Primitive::I64,
            "float" => Primitive::F32,
            "double" => Primitive::F64,
            "biginteger" => Primitive::BigInt,
            "bigdecimal" => Primitive::Decimal,
            "date" | "instant" => Primitive::Timestamp,
            _ => {
                return Self::ALL
                    .into_iter()
                    .find(|p| p.simple_name().eq_ignore_ascii_case(&lowered))
            }
        };
        Some(domain)
    }

    /// Returns true for the fixed-width and arbitrary-precision integers
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Primitive::I8 | Primitive::I16 | Primitive::I32 | Primitive::I64 | Primitive::BigInt
        )
    }

    /// Returns true for every numeric domain
    pub fn is_numeric(&self) -> bool {
        self.is_integral() || matches!(self, Primitive::F32 | Primitive::F64 | Primitive::Decimal)
    }

    /// Returns true for the date/time domains
    pub fn is_temporal(&self) -> bool {
        matches!(
            self,
            Primitive::Timestamp
                | Primitive::ZonedDateTime
                | Primitive::OffsetDateTime
                | Primitive::LocalDateTime
                | Primitive::LocalDate
                | Primitive::OffsetTime
                | Primitive::LocalTime
        )
    }

    fn widening_rank(&self) -> Option<u8> {
        match self {
            Primitive::I8 => Some(0),
            Primitive::I16 => Some(1),
            Primitive::I32 => Some(2),
            Primitive::I64 => Some(3),
            Primitive::F32 => Some(4),
            Primitive::F64 => Some(5),
            _ => None,
        }
    }

    /// Returns true if a value of this domain can be passed where `to` is
    /// declared without losing its identity (including safe numeric widening)
    pub fn widens_to(&self, to: Primitive) -> bool {
        if *self == to {
            return true;
        }
        if *self == Primitive::Char {
            return matches!(to, Primitive::I32 | Primitive::I64 | Primitive::F32 | Primitive::F64);
        }
        match (self.widening_rank(), to.widening_rank()) {
            (Some(from), Some(to)) => from < to,
            _ => false,
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.simple_name())
    }
}

/// Runtime identity of a registered object type
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectDescriptor {
    id: TypeId,
    name: &'static str,
}

impl ObjectDescriptor {
    /// Describes the Rust type `T`
    pub fn of<T: Any>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: short_type_name(std::any::type_name::<T>()),
        }
    }

    /// Returns the unqualified type name
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }
}

impl fmt::Debug for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

fn short_type_name(full: &'static str) -> &'static str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Descriptor of the type a value is converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetType {
    /// One of the well-known primitive domains
    Primitive(Primitive),
    /// Textual values
    Text,
    /// Accepts any value; only meaningful as a declared parameter type
    Any,
    /// A registered object type
    Object(ObjectDescriptor),
}

impl TargetType {
    /// Descriptor for any type that can live inside a [`Value`]
    pub fn of<T: ValueType>() -> Self {
        T::target_type()
    }

    /// Descriptor for an object type
    pub fn object<T: ObjectType>() -> Self {
        TargetType::Object(ObjectDescriptor::of::<T>())
    }

    pub fn simple_name(&self) -> &'static str {
        match self {
            TargetType::Primitive(p) => p.simple_name(),
            TargetType::Text => "String",
            TargetType::Any => "Any",
            TargetType::Object(descriptor) => descriptor.name(),
        }
    }

    pub fn as_primitive(&self) -> Option<Primitive> {
        match self {
            TargetType::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Returns true if a value whose runtime type is `from` can be passed
    /// where `self` is declared
    pub fn is_assignable_from(&self, from: &TargetType) -> bool {
        match (self, from) {
            (TargetType::Any, _) => true,
            (TargetType::Primitive(to), TargetType::Primitive(from)) => from.widens_to(*to),
            _ => self == from,
        }
    }
}

impl From<Primitive> for TargetType {
    fn from(primitive: Primitive) -> Self {
        TargetType::Primitive(primitive)
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.simple_name())
    }
}

/// Marker for user types that can travel inside a [`Value::Object`]
///
/// Implement it explicitly (`impl ObjectType for Fraction {}`); the type's
/// construction and conversion surface is then described through a
/// [`SurfaceBuilder`](crate::surface::SurfaceBuilder).
pub trait ObjectType: Any + Clone + fmt::Debug + fmt::Display + PartialEq + Send + Sync {}

trait DynObject: Any + fmt::Debug + fmt::Display + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn dyn_eq(&self, other: &dyn DynObject) -> bool;
    fn descriptor(&self) -> ObjectDescriptor;
}

impl<T: ObjectType> DynObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn dyn_eq(&self, other: &dyn DynObject) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| other == self)
    }

    fn descriptor(&self) -> ObjectDescriptor {
        ObjectDescriptor::of::<T>()
    }
}

/// A type-erased, shareable instance of an [`ObjectType`]
#[derive(Clone)]
pub struct Object {
    inner: Arc<dyn DynObject>,
}

impl Object {
    pub fn new<T: ObjectType>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
        }
    }

    pub fn descriptor(&self) -> ObjectDescriptor {
        self.inner.descriptor()
    }

    pub fn downcast_ref<T: ObjectType>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        self.inner.dyn_eq(&*other.inner)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

/// A dynamically-typed runtime datum
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value
    Null,
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    BigInt(BigInt),
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
    ZonedDateTime(DateTime<Tz>),
    OffsetDateTime(DateTime<FixedOffset>),
    LocalDateTime(NaiveDateTime),
    LocalDate(NaiveDate),
    OffsetTime(OffsetTime),
    LocalTime(NaiveTime),
    Object(Object),
}

impl Value {
    /// Wraps an object type instance
    pub fn object<T: ObjectType>(value: T) -> Self {
        Value::Object(Object::new(value))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the runtime type of this value, `None` for [`Value::Null`]
    pub fn type_of(&self) -> Option<TargetType> {
        let primitive = match self {
            Value::Null => return None,
            Value::Text(_) => return Some(TargetType::Text),
            Value::Object(object) => return Some(TargetType::Object(object.descriptor())),
            Value::Bool(_) => Primitive::Bool,
            Value::Char(_) => Primitive::Char,
            Value::I8(_) => Primitive::I8,
            Value::I16(_) => Primitive::I16,
            Value::I32(_) => Primitive::I32,
            Value::I64(_) => Primitive::I64,
            Value::F32(_) => Primitive::F32,
            Value::F64(_) => Primitive::F64,
            Value::BigInt(_) => Primitive::BigInt,
            Value::Decimal(_) => Primitive::Decimal,
            Value::Timestamp(_) => Primitive::Timestamp,
            Value::ZonedDateTime(_) => Primitive::ZonedDateTime,
            Value::OffsetDateTime(_) => Primitive::OffsetDateTime,
            Value::LocalDateTime(_) => Primitive::LocalDateTime,
            Value::LocalDate(_) => Primitive::LocalDate,
            Value::OffsetTime(_) => Primitive::OffsetTime,
            Value::LocalTime(_) => Primitive::LocalTime,
        };
        Some(TargetType::Primitive(primitive))
    }

    /// Name of the runtime type, `"null"` for the absent value
    pub fn type_name(&self) -> &'static str {
        self.type_of().map_or("null", |t| t.simple_name())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn downcast_ref<T: ObjectType>(&self) -> Option<&T> {
        match self {
            Value::Object(object) => object.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Re-expresses this value as the declared type `to`, applying safe
    /// numeric widening. Returns `None` when `to` does not accept it.
    pub fn widen_to(&self, to: &TargetType) -> Option<Value> {
        let from = self.type_of()?;
        if !to.is_assignable_from(&from) {
            return None;
        }
        match to {
            TargetType::Primitive(domain) if from != *to => self.widen_numeric(*domain),
            _ => Some(self.clone()),
        }
    }

    fn widen_numeric(&self, to: Primitive) -> Option<Value> {
        let integral = match self {
            Value::I8(n) => Some(i64::from(*n)),
            Value::I16(n) => Some(i64::from(*n)),
            Value::I32(n) => Some(i64::from(*n)),
            Value::I64(n) => Some(*n),
            Value::Char(c) => Some(i64::from(u32::from(*c))),
            _ => None,
        };
        match to {
            Primitive::I16 => match self {
                Value::I8(n) => Some(Value::I16(i16::from(*n))),
                _ => None,
            },
            Primitive::I32 => match self {
                Value::I8(n) => Some(Value::I32(i32::from(*n))),
                Value::I16(n) => Some(Value::I32(i32::from(*n))),
                Value::Char(c) => Some(Value::I32(u32::from(*c) as i32)),
                _ => None,
            },
            Primitive::I64 => integral.map(Value::I64),
            Primitive::F32 => integral.map(|n| Value::F32(n as f32)),
            Primitive::F64 => match self {
                Value::F32(f) => Some(Value::F64(f64::from(*f))),
                _ => integral.map(|n| Value::F64(n as f64)),
            },
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::I8(n) => write!(f, "{}", n),
            Value::I16(n) => write!(f, "{}", n),
            Value::I32(n) => write!(f, "{}", n),
            Value::I64(n) => write!(f, "{}", n),
            Value::F32(n) => write!(f, "{}", n),
            Value::F64(n) => write!(f, "{}", n),
            Value::BigInt(n) => write!(f, "{}", n),
            Value::Decimal(n) => write!(f, "{}", n),
            Value::Text(text) => f.write_str(text),
            Value::Timestamp(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::ZonedDateTime(dt) => write!(
                f,
                "{}[{}]",
                dt.to_rfc3339_opts(SecondsFormat::AutoSi, false),
                dt.timezone().name()
            ),
            Value::OffsetDateTime(dt) => {
                f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, false))
            }
            Value::LocalDateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::LocalDate(d) => write!(f, "{}", d),
            Value::OffsetTime(t) => write!(f, "{}", t),
            Value::LocalTime(t) => write!(f, "{}", t),
            Value::Object(object) => write!(f, "{}", object),
        }
    }
}

/// Bridges a Rust type to its [`Value`] representation
///
/// Implemented for every primitive domain, for `String`, for [`Value`] itself
/// (declared as [`TargetType::Any`]) and for every [`ObjectType`].
pub trait ValueType: Sized + 'static {
    fn target_type() -> TargetType;
    fn into_value(self) -> Value;
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! primitive_value_type {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl ValueType for $ty {
                fn target_type() -> TargetType {
                    TargetType::Primitive(Primitive::$variant)
                }

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(inner) => Some(inner.clone()),
                        _ => None,
                    }
                }
            }

            impl From<$ty> for Value {
                fn from(inner: $ty) -> Self {
                    Value::$variant(inner)
                }
            }
        )*
    };
}

primitive_value_type! {
    bool => Bool,
    char => Char,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
    BigInt => BigInt,
    Decimal => Decimal,
    DateTime<Utc> => Timestamp,
    DateTime<Tz> => ZonedDateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    NaiveDateTime => LocalDateTime,
    NaiveDate => LocalDate,
    OffsetTime => OffsetTime,
    NaiveTime => LocalTime,
}

impl ValueType for String {
    fn target_type() -> TargetType {
        TargetType::Text
    }

    fn into_value(self) -> Value {
        Value::Text(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_text().map(str::to_owned)
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_owned())
    }
}

impl ValueType for Value {
    fn target_type() -> TargetType {
        TargetType::Any
    }

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

impl<T: ObjectType> ValueType for T {
    fn target_type() -> TargetType {
        TargetType::object::<T>()
    }

    fn into_value(self) -> Value {
        Value::object(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.downcast_ref::<T>().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Meters(f64);

    impl fmt::Display for Meters {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}m", self.0)
        }
    }

    impl ObjectType for Meters {}

    #[test]
    fn test_primitive_names_round_trip() {
        for domain in Primitive::ALL {
            assert_eq!(Primitive::from_name(domain.simple_name()), Some(domain));
        }
        assert_eq!(Primitive::from_name("Integer"), Some(Primitive::I32));
        assert_eq!(Primitive::from_name("nope"), None);
    }

    #[test]
    fn test_widening_ladder() {
        assert!(Primitive::I8.widens_to(Primitive::I64));
        assert!(Primitive::I32.widens_to(Primitive::F64));
        assert!(Primitive::Char.widens_to(Primitive::I32));
        assert!(!Primitive::I64.widens_to(Primitive::I32));
        assert!(!Primitive::Char.widens_to(Primitive::I16));
        assert!(!Primitive::BigInt.widens_to(Primitive::Decimal));
    }

    #[test]
    fn test_object_identity_and_equality() {
        let value = Value::object(Meters(3.5));
        assert_eq!(value.type_of(), Some(TargetType::object::<Meters>()));
        assert_eq!(value.type_name(), "Meters");
        assert_eq!(value, Value::object(Meters(3.5)));
        assert_ne!(value, Value::object(Meters(1.0)));
        assert_eq!(value.downcast_ref::<Meters>(), Some(&Meters(3.5)));
        assert_eq!(value.to_string(), "3.5m");
    }

    #[test]
    fn test_widen_to_declared_parameter() {
        assert_eq!(
            Value::I16(7).widen_to(&Primitive::I64.into()),
            Some(Value::I64(7))
        );
        assert_eq!(
            Value::Char('A').widen_to(&Primitive::I32.into()),
            Some(Value::I32(65))
        );
        assert_eq!(Value::I64(7).widen_to(&Primitive::I32.into()), None);
        assert_eq!(
            Value::text("x").widen_to(&TargetType::Any),
            Some(Value::text("x"))
        );
        assert_eq!(Value::Null.widen_to(&TargetType::Any), None);
    }

    #[test]
    fn test_value_type_bridge() {
        assert_eq!(i32::from_value(&Value::I32(4)), Some(4));
        assert_eq!(i32::from_value(&Value::I64(4)), None);
        assert_eq!(String::from_value(&Value::text("a")), Some("a".to_string()));
        assert_eq!(Meters::target_type(), TargetType::object::<Meters>());
        assert_eq!(Value::target_type(), TargetType::Any);
    }
}
