//! Error types for thermal network construction and evaluation.

use hs_core::HsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermalError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Unknown node {index} (network has {len})")]
    UnknownNode { index: usize, len: usize },

    #[error("Node '{name}' is not a {expected} unit")]
    WrongKind {
        name: String,
        expected: &'static str,
    },

    #[error("Node '{name}' was reserved but never defined")]
    Undefined { name: String },

    #[error("State vector length {got} does not match network size {expected}")]
    StateLength { got: usize, expected: usize },

    #[error(transparent)]
    Core(#[from] HsError),
}

pub type ThermalResult<T> = Result<T, ThermalError>;
