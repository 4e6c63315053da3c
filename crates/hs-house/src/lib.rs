//! hs-house: the simulated house and its thermostat, wired onto the
//! cooperative scheduler.
//!
//! [`Simulation::new`] turns a validated [`hs_project::Project`] into a
//! scheduler with one task per concern (environment, goal seeker,
//! supervisor, coordinator, control laws, equipment, thermal integration)
//! sharing a single [`House`] context.

pub mod context;
pub mod environment;
pub mod error;
pub mod simulation;
pub mod tasks;

pub use context::{
    ControlBus, DemandResponseEvent, EquipmentPort, House, PanelDisplay, SetpointBus,
    UnitPair, UserPanel, UtilityPort,
};
pub use environment::{Conditions, ConstantEnvironment, Environment, TableEnvironment};
pub use error::{HouseError, HouseResult};
pub use simulation::{RunSummary, Simulation, TickRecord};
