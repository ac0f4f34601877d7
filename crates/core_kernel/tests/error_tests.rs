//! Tests for core_kernel error types

use chrono::NaiveDate;
use core_kernel::error::{CoercionError, InvocationError};
use core_kernel::temporal::TemporalError;
use core_kernel::{Primitive, TargetType, Value};

#[test]
fn test_invalid_input_helper() {
    let error = CoercionError::invalid_input(Primitive::Char, "expected exactly one character");

    match error {
        CoercionError::InvalidInput { target, reason } => {
            assert_eq!(target, TargetType::Primitive(Primitive::Char));
            assert!(reason.contains("one character"));
        }
        _ => panic!("Expected InvalidInput error"),
    }
}

#[test]
fn test_no_applicable_carries_value_and_target() {
    let error = CoercionError::no_applicable(&Value::I32(2), TargetType::Text);

    assert!(error.is_no_applicable_conversion());
    match error {
        CoercionError::NoApplicableConversion {
            value,
            target,
            attempts,
        } => {
            assert_eq!(value, Value::I32(2));
            assert_eq!(target, TargetType::Text);
            assert!(attempts.is_empty());
        }
        _ => panic!("Expected NoApplicableConversion error"),
    }
}

#[test]
fn test_no_applicable_display_names_runtime_type() {
    let error = CoercionError::no_applicable(&Value::I64(42), Primitive::LocalDate.into());
    assert_eq!(error.to_string(), "Could not convert 42 (i64) to LocalDate");

    let null = CoercionError::no_applicable(&Value::Null, TargetType::Text);
    assert!(null.to_string().contains("(null)"));
}

#[test]
fn test_from_temporal_unparseable_keeps_offset() {
    let temporal = TemporalError::Unparseable {
        input: "19/02/abc".to_string(),
        offset: 6,
    };
    let error: CoercionError = temporal.into();

    assert_eq!(
        error,
        CoercionError::Unparseable {
            input: "19/02/abc".to_string(),
            offset: 6
        }
    );
    assert!(error.to_string().contains("error offset 6"));
}

#[test]
fn test_from_temporal_configuration_errors() {
    let error: CoercionError = TemporalError::InvalidTimezone("Nowhere".to_string()).into();
    assert!(matches!(error, CoercionError::Configuration(msg) if msg.contains("Nowhere")));

    let error: CoercionError = TemporalError::InvalidLocale("??".to_string()).into();
    assert!(matches!(error, CoercionError::Configuration(_)));
}

#[test]
fn test_from_temporal_nonexistent_local_time_is_invalid_input() {
    let local = NaiveDate::from_ymd_opt(2024, 3, 31)
        .unwrap()
        .and_hms_opt(2, 30, 0)
        .unwrap();
    let error: CoercionError = TemporalError::NonexistentLocalTime {
        local,
        zone: "Europe/Paris".to_string(),
    }
    .into();

    match error {
        CoercionError::InvalidInput { target, reason } => {
            assert_eq!(target, TargetType::Primitive(Primitive::Timestamp));
            assert!(reason.contains("Europe/Paris"), "{reason}");
        }
        other => panic!("Expected InvalidInput error, got {other:?}"),
    }
}

#[test]
fn test_invocation_error_helpers() {
    let error = InvocationError::argument_mismatch(&Primitive::I32.into(), &Value::text("2"));
    assert_eq!(error.to_string(), "Argument mismatch: expected i32, got String");

    let failed = InvocationError::failed("denominator is zero");
    assert_eq!(failed, InvocationError::Failed("denominator is zero".to_string()));
    assert_eq!(failed.to_string(), "denominator is zero");
}
