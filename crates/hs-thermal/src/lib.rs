//! hs-thermal: lumped-capacitance thermal model of a house.
//!
//! Provides:
//! - unit models: HVAC coil (heater/cooler), wall, room air
//! - [`ThermalNetwork`]: arena owning the temperature state and inputs
//! - [`ThermalParams`]: physical parameters with a baseline house
//! - [`build_house`]: the standard five-node network
//!
//! All model math is in imperial units (°F, lb, BTU/s).

pub mod air;
pub mod error;
pub mod house;
pub mod hvac;
pub mod network;
pub mod params;
pub mod wall;

pub use air::{AIR_CP, AirGains, AirUnit};
pub use error::{ThermalError, ThermalResult};
pub use house::{HouseLayout, build_house};
pub use hvac::{COOLING_REFERENCE_F, HvacFlows, HvacKind, HvacUnit, cooler_output};
pub use network::{NetworkBuilder, NodeProbe, ThermalInputs, ThermalNetwork, ThermalUnit};
pub use params::{AirParams, HvacParams, ThermalParams, WallParams};
pub use wall::WallUnit;
