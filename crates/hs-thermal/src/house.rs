//! The five-node house used by every scenario.

use hs_core::NodeId;

use crate::air::AirUnit;
use crate::error::ThermalResult;
use crate::hvac::HvacUnit;
use crate::network::{NetworkBuilder, ThermalInputs, ThermalNetwork, ThermalUnit};
use crate::params::ThermalParams;
use crate::wall::WallUnit;

/// Where each part of the house lives in the network.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HouseLayout {
    pub cooler: NodeId,
    pub heater: NodeId,
    pub exterior_wall: NodeId,
    pub interior_wall: NodeId,
    pub air: NodeId,
}

/// Assemble cooler, heater, exterior wall, interior wall and room air, in
/// that state order.
pub fn build_house(
    params: &ThermalParams,
    inputs: ThermalInputs,
) -> ThermalResult<(ThermalNetwork, HouseLayout)> {
    let mut b = NetworkBuilder::new().with_inputs(inputs);
    let layout = HouseLayout {
        cooler: b.reserve("cooler"),
        heater: b.reserve("heater"),
        exterior_wall: b.reserve("exterior_wall"),
        interior_wall: b.reserve("interior_wall"),
        air: b.reserve("air"),
    };
    let t0 = params.initial_temp_f;

    let cooler = HvacUnit::cooler(&params.cooler, layout.air)?;
    b.define(layout.cooler, t0, ThermalUnit::Hvac(cooler))?;

    let heater = HvacUnit::heater(&params.heater, layout.air)?;
    b.define(layout.heater, t0, ThermalUnit::Hvac(heater))?;

    let ext = WallUnit::new(&params.exterior_wall, layout.air)?;
    b.define(layout.exterior_wall, t0, ThermalUnit::Wall(ext))?;

    let int = WallUnit::interior(&params.interior_wall, layout.air)?;
    b.define(layout.interior_wall, t0, ThermalUnit::Wall(int))?;

    let air = AirUnit::new(
        &params.air,
        vec![layout.heater, layout.cooler],
        vec![layout.interior_wall, layout.exterior_wall],
    )?;
    b.define(layout.air, t0, ThermalUnit::Air(air))?;

    Ok((b.build()?, layout))
}
