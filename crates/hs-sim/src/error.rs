//! Error types for simulation operations.

use hs_core::HsError;
use hs_thermal::ThermalError;
use thiserror::Error;

/// Errors encountered during transient simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Non-physical condition: {what}")]
    NonPhysical { what: &'static str },

    #[error("Simulation time moved backward: from {from_s}s to {to_s}s")]
    TimeReversed { from_s: f64, to_s: f64 },

    #[error("Thermal model error: {0}")]
    Thermal(#[from] ThermalError),

    #[error(transparent)]
    Core(#[from] HsError),
}

pub type SimResult<T> = Result<T, SimError>;
