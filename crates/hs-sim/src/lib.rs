//! Transient integration for housesim.
//!
//! Provides:
//! - `TransientModel`: flat-vector ODE interface (implemented for the thermal network)
//! - `Rkf45`: embedded Runge-Kutta-Fehlberg 4(5) with fixed and adaptive stepping
//! - `ThermalSimulator`: keeps the network in sync with scheduler time

pub mod error;
pub mod integrator;
pub mod model;
pub mod simulator;

pub use error::{SimError, SimResult};
pub use integrator::{AdaptiveStep, IntegratorStats, Rkf45};
pub use model::TransientModel;
pub use simulator::{SolverOptions, ThermalSimulator};
