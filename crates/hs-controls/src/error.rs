//! Error types for control law construction.

use thiserror::Error;

/// Result type for control operations.
pub type ControlResult<T> = Result<T, ControlError>;

/// Errors that can occur when configuring control laws.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ControlError {
    /// Invalid argument provided to a control function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    /// Setpoint schedule is unusable.
    #[error("Invalid setpoint schedule: {what}")]
    Schedule { what: String },
}
