//! Command-line surface of the coercion engine
//!
//! The `coerce` binary reads a literal, optionally interprets it in a source
//! domain, converts it to a target domain and prints the result. This module
//! holds the parts of that flow that do not touch the terminal.

pub mod error;

use serde::Serialize;
use tracing::debug;

use core_kernel::{Primitive, TargetType, Value};
use domain_coercion::Coercer;

pub use error::CliError;

/// Resolves a type name given on the command line
///
/// Accepts every primitive domain name and alias (`int`, `double`, `date`, …),
/// `string`/`text` and `any`, ignoring case.
pub fn parse_target(name: &str) -> Result<TargetType, CliError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "string" | "text" | "str" => Ok(TargetType::Text),
        "any" => Ok(TargetType::Any),
        _ => Primitive::from_name(name)
            .map(TargetType::Primitive)
            .ok_or_else(|| CliError::UnknownType(name.to_string())),
    }
}

/// One conversion requested on the command line
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// The literal, `None` for the absent value
    pub input: Option<String>,
    /// Domain the literal is read as before conversion
    pub from: Option<TargetType>,
    pub to: TargetType,
}

/// The printed result of a conversion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub input: String,
    pub input_type: String,
    pub target: String,
    pub value: String,
    pub value_type: String,
}

impl Request {
    /// Runs the request against `coercer`
    pub fn execute(&self, coercer: &Coercer) -> Result<Outcome, CliError> {
        let literal = self.input.clone().map_or(Value::Null, Value::Text);
        let input = match &self.from {
            Some(from) => coercer.convert(&literal, from)?,
            None => literal,
        };
        debug!(input = %input, from = input.type_name(), to = %self.to, "converting");

        let value = coercer.convert(&input, &self.to)?;
        Ok(Outcome {
            input: input.to_string(),
            input_type: input.type_name().to_string(),
            target: self.to.to_string(),
            value: value.to_string(),
            value_type: value.type_name().to_string(),
        })
    }
}
