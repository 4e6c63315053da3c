//! Error types for the house simulation.

use hs_controls::ControlError;
use hs_project::ValidationError;
use hs_runtime::RuntimeError;
use hs_sim::SimError;
use hs_thermal::ThermalError;

/// Errors raised while building or running a house simulation.
#[derive(Debug, thiserror::Error)]
pub enum HouseError {
    #[error("Invalid project: {0}")]
    Validation(#[from] ValidationError),

    #[error("Scheduler error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Thermal model error: {0}")]
    Thermal(#[from] ThermalError),

    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    #[error("Control setup error: {0}")]
    Control(#[from] ControlError),

    #[error("Core error: {0}")]
    Core(#[from] hs_core::HsError),
}

pub type HouseResult<T> = Result<T, HouseError>;
