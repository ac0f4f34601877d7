//! Core Kernel - Value model and collaborators of the coercion engine
//!
//! This crate provides the building blocks the engine works on:
//! - Dynamic values and the type descriptors they are converted between
//! - Runtime type surfaces (constructors, factories, conversion methods)
//! - Date/time domains and the locale-sensitive date parser
//! - The single-slot result cell and the error taxonomy

pub mod value;
pub mod surface;
pub mod builtins;
pub mod cell;
pub mod temporal;
pub mod error;

pub use value::{ObjectDescriptor, ObjectType, Primitive, TargetType, Value, ValueType};
pub use surface::{Constructor, Method, Receiver, SurfaceBuilder, TypeRegistry, TypeSurface};
pub use cell::ResultCell;
pub use temporal::{epoch_date, DateParser, Grammar, Locale, OffsetTime, Style, TemporalError, Timezone};
pub use error::{CoercionError, InvocationError};
