//! CLI error types

use thiserror::Error;

use core_kernel::CoercionError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Unknown type name: {0}")]
    UnknownType(String),

    #[error(transparent)]
    Coercion(#[from] CoercionError),
}
