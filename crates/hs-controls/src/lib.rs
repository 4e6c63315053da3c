//! Thermostat control laws and HVAC equipment sequencing.
//!
//! Everything here is a plain value type with a pure update function; the
//! scheduler tasks that call these live in `hs-house`.
//!
//! - [`EquipmentSequencer`]: Off/Pre/On/Post sequencing of one HVAC unit
//! - [`Hysteresis`]: dead-band on/off law
//! - [`PIDController`] + [`PwmModulator`]: proportional law driving a duty cycle
//! - [`BoxcarFilter`]: inside-temperature smoothing for the PID law
//! - [`SetpointSchedule`]: weekly setpoint table

pub mod controller;
pub mod equipment;
pub mod error;
pub mod filter;
pub mod hysteresis;
pub mod kind;
pub mod pwm;
pub mod schedule;

pub use controller::{PIDController, PIDControllerState, PidGains};
pub use equipment::{
    EquipmentCommand, EquipmentOutputs, EquipmentSequencer, EquipmentState, FanThresholds,
};
pub use error::{ControlError, ControlResult};
pub use filter::{BoxcarFilter, MAX_FILTER_SAMPLES};
pub use hysteresis::Hysteresis;
pub use kind::{ControlLaw, ThermostatMode, UnitKind};
pub use pwm::PwmModulator;
pub use schedule::{ScheduleEntry, ScheduledSetpoint, SetpointSchedule};
