//! Capability discovery resolver
//!
//! Queries the [`TypeRegistry`] for a way to build the target type from the
//! value's runtime type. Four strategies are tried in a fixed order, stopping
//! at the first one that produces a value:
//!
//! 1. **Construction**: a one-parameter constructor of the target accepting the value
//! 2. **Factory**: a one-parameter static method of the target returning the target
//! 3. **Parse**: for text values, a one-parameter static method taking text
//! 4. **Instance conversion**: a zero-argument method of the value's type named
//!    `to`/`as`/`get` + the target's simple name, returning exactly the target
//!
//! Each strategy selects the first eligible candidate in declaration order and
//! invokes only that one. A candidate failing while it runs makes its strategy
//! not applicable; the failure is recorded and the chain moves on.

use std::fmt;

use tracing::debug;

use core_kernel::{
    CoercionError, Constructor, InvocationError, Method, ResultCell, TargetType, TypeRegistry,
    Value,
};

/// The discovery strategies, in the order they are tried
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Construction,
    Factory,
    Parse,
    InstanceConversion,
}

impl Strategy {
    pub const ORDER: [Strategy; 4] = [
        Strategy::Construction,
        Strategy::Factory,
        Strategy::Parse,
        Strategy::InstanceConversion,
    ];
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Strategy::Construction => "construction",
            Strategy::Factory => "factory",
            Strategy::Parse => "parse",
            Strategy::InstanceConversion => "instance conversion",
        };
        f.write_str(name)
    }
}

/// A discovered operation able to turn the value into the target
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'r> {
    Constructor(&'r Constructor),
    Factory(&'r Method),
    Parse(&'r Method),
    ConversionMethod(&'r Method),
}

impl<'r> Candidate<'r> {
    pub fn strategy(&self) -> Strategy {
        match self {
            Candidate::Constructor(_) => Strategy::Construction,
            Candidate::Factory(_) => Strategy::Factory,
            Candidate::Parse(_) => Strategy::Parse,
            Candidate::ConversionMethod(_) => Strategy::InstanceConversion,
        }
    }

    /// Invokes the candidate on `value`
    pub fn try_apply(&self, value: &Value) -> Result<Value, InvocationError> {
        match self {
            Candidate::Constructor(constructor) => {
                constructor.invoke(&[argument(value, &constructor.params()[0])?])
            }
            Candidate::Factory(method) => method.invoke_static(&[argument(value, &method.params()[0])?]),
            Candidate::Parse(method) => method.invoke_static(&[Value::Text(value.to_string())]),
            Candidate::ConversionMethod(method) => method.invoke_on(value, &[]),
        }
    }
}

impl fmt::Display for Candidate<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Candidate::Constructor(constructor) => write!(f, "{:?}", constructor),
            Candidate::Factory(method) | Candidate::Parse(method) | Candidate::ConversionMethod(method) => {
                write!(f, "{:?}", method)
            }
        }
    }
}

/// Re-expresses `value` as the declared parameter type
fn argument(value: &Value, param: &TargetType) -> Result<Value, InvocationError> {
    value
        .widen_to(param)
        .ok_or_else(|| InvocationError::argument_mismatch(param, value))
}

/// Outcome of one strategy
#[derive(Debug, Clone, PartialEq)]
pub enum Attempt {
    /// A candidate ran and produced a value of the target type
    Produced(Value),
    /// The strategy found no eligible candidate
    NotApplicable,
    /// A candidate was found but failed while it ran
    Failed(String),
}

/// Matches `to`/`as`/`get` + `simple_name`, ignoring case and underscores
fn is_conversion_name(method: &str, simple_name: &str) -> bool {
    let folded: String = method
        .chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect();
    let wanted = simple_name.to_lowercase();

    ["to", "as", "get"].iter().any(|prefix| {
        folded
            .strip_prefix(prefix)
            .is_some_and(|rest| rest == wanted)
    })
}

/// Finds and invokes conversion operations through a [`TypeRegistry`]
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Resolver<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Returns the first eligible candidate of `strategy`, if any
    pub fn candidate(&self, strategy: Strategy, value: &Value, target: &TargetType) -> Option<Candidate<'r>> {
        let value_type = value.type_of()?;
        let accepts = |params: &[TargetType], from: &TargetType| {
            params.len() == 1 && params[0].is_assignable_from(from)
        };
        let is_factory = |method: &&Method, from: &TargetType| {
            method.is_static() && target.is_assignable_from(&method.returns()) && accepts(method.params(), from)
        };

        match strategy {
            Strategy::Construction => self
                .registry
                .constructors(target)
                .iter()
                .find(|c| accepts(c.params(), &value_type))
                .map(Candidate::Constructor),
            Strategy::Factory => self
                .registry
                .methods(target)
                .iter()
                .find(|m| is_factory(m, &value_type))
                .map(Candidate::Factory),
            Strategy::Parse if value_type == TargetType::Text => self
                .registry
                .methods(target)
                .iter()
                .find(|m| is_factory(m, &TargetType::Text))
                .map(Candidate::Parse),
            Strategy::Parse => None,
            Strategy::InstanceConversion => self
                .registry
                .methods(&value_type)
                .iter()
                .find(|m| {
                    !m.is_static()
                        && m.arity() == 0
                        && m.returns() == *target
                        && is_conversion_name(m.name(), target.simple_name())
                })
                .map(Candidate::ConversionMethod),
        }
    }

    /// Runs one strategy against `value`
    pub fn attempt(&self, strategy: Strategy, value: &Value, target: &TargetType) -> Attempt {
        let Some(candidate) = self.candidate(strategy, value, target) else {
            return Attempt::NotApplicable;
        };

        let produced = candidate.try_apply(value).and_then(|produced| {
            match produced.type_of() {
                Some(actual) if target.is_assignable_from(&actual) => Ok(produced),
                _ => Err(InvocationError::ReturnMismatch {
                    expected: target.to_string(),
                    actual: produced.type_name().to_string(),
                }),
            }
        });

        match produced {
            Ok(produced) => Attempt::Produced(produced),
            Err(error) => {
                debug!(%strategy, %candidate, %error, "candidate failed, strategy not applicable");
                Attempt::Failed(format!("{}: {}", candidate, error))
            }
        }
    }

    /// Tries every strategy in order and returns the first value produced
    ///
    /// # Errors
    ///
    /// `NoApplicableConversion` when no strategy produced a value; its
    /// `attempts` lists the candidates that were found but failed.
    pub fn resolve(&self, value: &Value, target: &TargetType) -> Result<Value, CoercionError> {
        let mut cell = ResultCell::new();
        let mut failures = Vec::new();

        for strategy in Strategy::ORDER {
            if self.apply(strategy, value, target, &mut cell, &mut failures) {
                debug!(%strategy, %target, "conversion discovered");
                break;
            }
        }

        cell.take().ok_or_else(|| CoercionError::NoApplicableConversion {
            value: value.clone(),
            target: *target,
            attempts: failures,
        })
    }

    fn apply(
        &self,
        strategy: Strategy,
        value: &Value,
        target: &TargetType,
        cell: &mut ResultCell<Value>,
        failures: &mut Vec<String>,
    ) -> bool {
        match self.attempt(strategy, value, target) {
            Attempt::Produced(produced) => {
                cell.set(produced);
                true
            }
            Attempt::NotApplicable => false,
            Attempt::Failed(failure) => {
                failures.push(failure);
                false
            }
        }
    }
}
