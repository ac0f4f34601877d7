//! Error types surfaced by conversions

use thiserror::Error;

use crate::temporal::TemporalError;
use crate::value::{Primitive, TargetType, Value};

/// The terminal outcomes of a failed conversion
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoercionError {
    /// Malformed textual literal for a primitive domain
    #[error("Invalid input for {target}: {reason}")]
    InvalidInput {
        target: TargetType,
        reason: String,
    },

    /// No date/time grammar matched the text
    #[error("Could not parse {input:?} as a date (error offset {offset})")]
    Unparseable {
        input: String,
        offset: usize,
    },

    /// Neither a primitive rule nor any discovery strategy applied
    #[error("Could not convert {value} ({}) to {target}", .value.type_name())]
    NoApplicableConversion {
        value: Value,
        target: TargetType,
        /// Candidates that were located but failed when invoked
        attempts: Vec<String>,
    },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoercionError {
    pub fn invalid_input(target: impl Into<TargetType>, reason: impl Into<String>) -> Self {
        CoercionError::InvalidInput {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn no_applicable(value: &Value, target: TargetType) -> Self {
        CoercionError::NoApplicableConversion {
            value: value.clone(),
            target,
            attempts: Vec::new(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        CoercionError::Configuration(message.into())
    }

    /// Returns true for the error raised when nothing applied
    pub fn is_no_applicable_conversion(&self) -> bool {
        matches!(self, CoercionError::NoApplicableConversion { .. })
    }
}

impl From<TemporalError> for CoercionError {
    fn from(error: TemporalError) -> Self {
        match error {
            TemporalError::Unparseable { input, offset } => {
                CoercionError::Unparseable { input, offset }
            }
            gap @ TemporalError::NonexistentLocalTime { .. } => {
                CoercionError::invalid_input(Primitive::Timestamp, gap.to_string())
            }
            other => CoercionError::Configuration(other.to_string()),
        }
    }
}

/// Failure raised by a registered constructor or method while it runs
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvocationError {
    #[error("Argument mismatch: expected {expected}, got {actual}")]
    ArgumentMismatch {
        expected: String,
        actual: String,
    },

    #[error("Wrong number of arguments: expected {expected}, got {actual}")]
    Arity {
        expected: usize,
        actual: usize,
    },

    #[error("Instance method {0} invoked without a receiver")]
    MissingReceiver(String),

    #[error("Returned {actual}, which is not a {expected}")]
    ReturnMismatch {
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    Failed(String),
}

impl InvocationError {
    pub fn failed(message: impl std::fmt::Display) -> Self {
        InvocationError::Failed(message.to_string())
    }

    pub fn argument_mismatch(expected: &TargetType, actual: &Value) -> Self {
        InvocationError::ArgumentMismatch {
            expected: expected.to_string(),
            actual: actual.type_name().to_string(),
        }
    }
}
