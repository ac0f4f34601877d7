//! Coercion Domain
//!
//! This crate implements the runtime value-to-type coercion engine: given an
//! arbitrary [`Value`](core_kernel::Value) and a
//! [`TargetType`](core_kernel::TargetType), produce a value of that type or
//! fail with a diagnosable error.
//!
//! # Architecture
//!
//! - **Primitive dispatcher**: direct conversions into the well-known domains
//! - **Resolver**: runtime capability discovery over registered type surfaces
//! - **Engine**: the `Coercer` façade tying both together
//!
//! # Strategy chain
//!
//! ```text
//! Construction -> Factory -> Parse -> InstanceConversion
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_coercion::{Coercer, CoercionConfig};
//! use core_kernel::{Primitive, TypeRegistry, Value};
//!
//! let config = CoercionConfig::from_env()?;
//! let coercer = Coercer::from_config(TypeRegistry::with_builtins(), &config)?;
//!
//! let when = coercer.convert(&Value::text("19/02/2002"), &Primitive::Timestamp.into())?;
//! let digit = coercer.to_char(&Value::Bool(true))?;
//! ```

pub mod config;
pub mod primitive;
pub mod resolver;
pub mod engine;

pub use config::CoercionConfig;
pub use primitive::{Dispatch, PrimitiveDispatcher};
pub use resolver::{Attempt, Candidate, Resolver, Strategy};
pub use engine::Coercer;
