//! Scheduler tasks of the house.
//!
//! Registration order (see [`crate::Simulation::new`]) is part of the
//! behaviour: each pass, outdoor conditions are sampled first, then the
//! thermostat decides, the equipment reacts, and the thermal network is
//! integrated last up to the pass time.

use hs_controls::{ControlLaw, UnitKind};
use hs_runtime::{State, Task};

use crate::context::House;
use crate::error::HouseError;

mod control;
mod coordinator;
mod environment;
mod equipment;
mod goal_seeker;
mod supervisor;
mod thermal;

pub use control::{filter_task, hysteresis_task, pid_task, pwm_task};
pub use coordinator::coordinator_task;
pub use environment::environment_task;
pub use equipment::equipment_task;
pub use goal_seeker::goal_seeker_task;
pub use supervisor::supervisor_task;
pub use thermal::thermal_task;

pub type HouseTask = Task<House, HouseError>;
type BoxedState = Box<dyn State<House, HouseError>>;

pub const ENVIRONMENT: &str = "environment";
pub const GOAL_SEEKER: &str = "goal_seeker";
pub const SUPERVISOR: &str = "supervisor";
pub const COORDINATOR: &str = "coordinator";
pub const FILTER: &str = "tin_filter";
pub const THERMAL: &str = "thermal";

pub fn equipment_name(kind: UnitKind) -> &'static str {
    match kind {
        UnitKind::Heater => "heater",
        UnitKind::Cooler => "cooler",
    }
}

pub fn control_name(law: ControlLaw, kind: UnitKind) -> &'static str {
    match (law, kind) {
        (ControlLaw::Hysteresis, UnitKind::Heater) => "hysteresis_heat",
        (ControlLaw::Hysteresis, UnitKind::Cooler) => "hysteresis_cool",
        (ControlLaw::Pid, UnitKind::Heater) => "pid_heat",
        (ControlLaw::Pid, UnitKind::Cooler) => "pid_cool",
    }
}

pub fn pwm_name(kind: UnitKind) -> &'static str {
    match kind {
        UnitKind::Heater => "pwm_heat",
        UnitKind::Cooler => "pwm_cool",
    }
}
