//! Tests for the dynamic value model

use std::fmt;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use core_kernel::{ObjectType, Primitive, TargetType, Value, ValueType};
use num_bigint::BigInt;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, PartialEq)]
struct Tag(String);

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl ObjectType for Tag {}

#[derive(Debug, Clone, PartialEq)]
struct Label(String);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl ObjectType for Label {}

mod type_identity {
    use super::*;

    #[test]
    fn test_primitive_values_report_their_domain() {
        assert_eq!(Value::Bool(true).type_of(), Some(Primitive::Bool.into()));
        assert_eq!(Value::BigInt(BigInt::from(3)).type_name(), "BigInt");
        assert_eq!(Value::Decimal(dec!(1.5)).type_name(), "Decimal");
        assert_eq!(Value::text("x").type_of(), Some(TargetType::Text));
        assert_eq!(Value::Null.type_of(), None);
        assert_eq!(Value::Null.type_name(), "null");
    }

    #[test]
    fn test_objects_of_different_types_are_distinct() {
        let tag = Value::object(Tag("a".into()));
        let label = Value::object(Label("a".into()));

        assert_ne!(tag.type_of(), label.type_of());
        assert_ne!(tag, label);
        assert_eq!(tag.type_name(), "Tag");
        assert_eq!(label.downcast_ref::<Tag>(), None);
    }

    #[test]
    fn test_target_type_of_rust_types() {
        assert_eq!(TargetType::of::<i64>(), Primitive::I64.into());
        assert_eq!(TargetType::of::<String>(), TargetType::Text);
        assert_eq!(TargetType::of::<NaiveDate>(), Primitive::LocalDate.into());
        assert_eq!(TargetType::of::<Tag>(), TargetType::object::<Tag>());
    }
}

mod assignability {
    use super::*;

    #[test]
    fn test_any_accepts_everything() {
        for domain in Primitive::ALL {
            assert!(TargetType::Any.is_assignable_from(&domain.into()));
        }
        assert!(TargetType::Any.is_assignable_from(&TargetType::object::<Tag>()));
    }

    #[test]
    fn test_objects_are_assignable_only_to_themselves() {
        let tag = TargetType::object::<Tag>();
        assert!(tag.is_assignable_from(&tag));
        assert!(!tag.is_assignable_from(&TargetType::object::<Label>()));
        assert!(!TargetType::Text.is_assignable_from(&tag));
    }

    #[test]
    fn test_no_widening_into_arbitrary_precision() {
        let big = TargetType::Primitive(Primitive::BigInt);
        assert!(!big.is_assignable_from(&Primitive::I64.into()));
    }
}

mod display {
    use super::*;

    #[test]
    fn test_temporal_display_is_iso() {
        let instant = Utc.with_ymd_and_hms(2023, 4, 14, 15, 56, 30).unwrap();
        assert_eq!(Value::Timestamp(instant).to_string(), "2023-04-14T15:56:30Z");

        let offset = DateTime::parse_from_rfc3339("2023-04-14T21:56:30+06:00").unwrap();
        assert_eq!(
            Value::OffsetDateTime(offset).to_string(),
            "2023-04-14T21:56:30+06:00"
        );

        let zoned = instant.with_timezone(&chrono_tz::Asia::Dhaka);
        assert_eq!(
            Value::ZonedDateTime(zoned).to_string(),
            "2023-04-14T21:56:30+06:00[Asia/Dhaka]"
        );

        let local = NaiveDate::from_ymd_opt(2023, 4, 14)
            .unwrap()
            .and_hms_opt(21, 56, 30)
            .unwrap();
        assert_eq!(Value::LocalDateTime(local).to_string(), "2023-04-14T21:56:30");
    }

    #[test]
    fn test_object_display_delegates() {
        assert_eq!(Value::object(Tag("rust".into())).to_string(), "#rust");
        assert_eq!(Value::Null.to_string(), "null");
    }
}

mod value_type_bridge {
    use super::*;

    #[test]
    fn test_round_trip_through_value() {
        let tag = Tag("x".into());
        let value = tag.clone().into_value();
        assert_eq!(Tag::from_value(&value), Some(tag));

        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(NaiveDate::from_value(&Value::from(date)), Some(date));
    }

    #[test]
    fn test_from_conversions() {
        assert_eq!(Value::from(7i8), Value::I8(7));
        assert_eq!(Value::from("hi"), Value::text("hi"));
        assert_eq!(Value::from(String::from("hi")), Value::text("hi"));
    }
}

mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn widening_preserves_integer_value(n in any::<i16>()) {
            let widened = Value::I16(n).widen_to(&Primitive::I64.into());
            prop_assert_eq!(widened, Some(Value::I64(i64::from(n))));
        }

        #[test]
        fn widening_never_narrows(n in any::<i64>()) {
            prop_assert_eq!(Value::I64(n).widen_to(&Primitive::I32.into()), None);
        }
    }
}
