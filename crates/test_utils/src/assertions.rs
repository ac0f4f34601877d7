//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for conversion outcomes that give
//! more meaningful error messages than matching on results by hand.

use core_kernel::{CoercionError, TargetType, Value};

/// Asserts that a conversion succeeded with the expected value
///
/// # Panics
///
/// Panics if the conversion failed or produced a different value
pub fn assert_converted(result: Result<Value, CoercionError>, expected: &Value) {
    match result {
        Ok(actual) => assert_eq!(
            &actual, expected,
            "Converted to {} ({}), expected {} ({})",
            actual,
            actual.type_name(),
            expected,
            expected.type_name()
        ),
        Err(error) => panic!("Expected {}, conversion failed: {}", expected, error),
    }
}

/// Asserts that a conversion failed with `InvalidInput` for the given target
pub fn assert_invalid_input<T: std::fmt::Debug>(result: Result<T, CoercionError>, target: &TargetType) {
    match result {
        Err(CoercionError::InvalidInput { target: actual, .. }) => assert_eq!(
            &actual, target,
            "InvalidInput raised for {}, expected {}",
            actual, target
        ),
        other => panic!("Expected InvalidInput for {}, got {:?}", target, other),
    }
}

/// Asserts that a date parse failed at the given offset
pub fn assert_unparseable_at<T: std::fmt::Debug>(result: Result<T, CoercionError>, offset: usize) {
    match result {
        Err(CoercionError::Unparseable { offset: actual, input }) => assert_eq!(
            actual, offset,
            "Parsing {:?} failed at offset {}, expected {}",
            input, actual, offset
        ),
        other => panic!("Expected Unparseable at offset {}, got {:?}", offset, other),
    }
}

/// Asserts that nothing applied; returns the recorded failed attempts
pub fn assert_no_applicable<T: std::fmt::Debug>(result: Result<T, CoercionError>) -> Vec<String> {
    match result {
        Err(CoercionError::NoApplicableConversion { attempts, .. }) => attempts,
        other => panic!("Expected NoApplicableConversion, got {:?}", other),
    }
}

/// Asserts that two floats are equal within a relative tolerance
pub fn assert_f64_approx_eq(actual: f64, expected: f64, tolerance: f64) {
    let scale = expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance * scale,
        "Values differ by more than tolerance: actual={}, expected={}, tolerance={}",
        actual,
        expected,
        tolerance
    );
}
