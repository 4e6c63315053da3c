//! Error types for the task runtime.

use hs_core::HsError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Task '{task}' has no state {index} (it has {len})")]
    StateOob {
        task: String,
        index: usize,
        len: usize,
    },

    #[error("Unknown task index {index}")]
    UnknownTask { index: usize },

    #[error("Scheduler time moved backward: from {from_s}s to {to_s}s")]
    TimeReversed { from_s: f64, to_s: f64 },

    #[error(transparent)]
    Core(#[from] HsError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
