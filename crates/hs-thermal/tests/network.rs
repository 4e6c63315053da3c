//! Network assembly and two-phase evaluation.

use hs_core::NodeId;
use hs_thermal::{
    AirUnit, HvacUnit, NetworkBuilder, ThermalError, ThermalInputs, ThermalParams, ThermalUnit,
    WallParams, WallUnit, build_house,
};
use nalgebra::DVector;

fn baseline() -> (hs_thermal::ThermalNetwork, hs_thermal::HouseLayout) {
    build_house(&ThermalParams::default(), ThermalInputs::default()).unwrap()
}

#[test]
fn house_state_order_is_fixed() {
    let (net, layout) = baseline();
    assert_eq!(net.len(), 5);
    assert_eq!(layout.cooler.index(), 0);
    assert_eq!(layout.heater.index(), 1);
    assert_eq!(layout.exterior_wall.index(), 2);
    assert_eq!(layout.interior_wall.index(), 3);
    assert_eq!(layout.air.index(), 4);
    assert_eq!(net.name(layout.air).unwrap(), "air");
    assert_eq!(net.find("heater"), Some(layout.heater));
    for v in net.state().iter() {
        assert_eq!(*v, 76.6);
    }
}

#[test]
fn idle_house_draws_no_power() {
    let (net, _) = baseline();
    assert_eq!(net.total_power_w(), 0.0);
}

#[test]
fn hot_day_warms_idle_house() {
    let (net, layout) = baseline();
    let dx = net.derivatives(net.state()).unwrap();
    assert!(dx[layout.air.index()] > 0.0);
    assert!(dx[layout.exterior_wall.index()] > 0.0);
    assert!(dx.iter().all(|v| v.is_finite()));
}

#[test]
fn air_reads_duct_temperature_from_same_state() {
    let (mut net, layout) = baseline();
    // Cold coil, fan off: no effect on the room.
    let mut x = net.state().clone();
    x[layout.cooler.index()] = 45.0;
    let still = net.derivatives(&x).unwrap()[layout.air.index()];

    net.hvac_mut(layout.cooler).unwrap().set_fan(true);
    let blowing = net.derivatives(&x).unwrap()[layout.air.index()];
    assert!(blowing < still);

    // A colder coil in the evaluated state gives colder supply air.
    x[layout.cooler.index()] = 35.0;
    let colder = net.derivatives(&x).unwrap()[layout.air.index()];
    assert!(colder < blowing);
}

#[test]
fn cooler_power_appears_after_refresh() {
    let (mut net, layout) = baseline();
    net.hvac_mut(layout.cooler).unwrap().set_element(true);
    assert_eq!(net.total_power_w(), 0.0);
    net.refresh();
    assert!(net.total_power_w() > 0.0);
    assert!(net.probe(layout.cooler).unwrap().power_w > 0.0);
}

#[test]
fn wall_gain_balances_wall_uptake() {
    let (mut net, layout) = baseline();
    let mut x = net.state().clone();
    x[layout.interior_wall.index()] = 70.0;
    net.set_state(x).unwrap();
    let gains = net.air_gains(layout.air).unwrap();
    let uptake = net.probe(layout.interior_wall).unwrap().heat_from_air
        + net.probe(layout.exterior_wall).unwrap().heat_from_air;
    assert!((gains.walls + uptake).abs() < 1e-12);
    assert!(gains.walls < 0.0);
}

#[test]
fn isolated_node_is_steady() {
    let mut b = NetworkBuilder::new();
    let id = b.reserve("slab");
    let wall = WallUnit::new(
        &WallParams {
            mass_lb: 500.0,
            k_air: 3.0,
            k_ambient: 0.0,
        },
        id,
    )
    .unwrap();
    b.define(id, 68.0, ThermalUnit::Wall(wall)).unwrap();
    let net = b.build().unwrap();
    let dx = net.derivatives(net.state()).unwrap();
    assert_eq!(dx[0], 0.0);
}

#[test]
fn undefined_slot_is_rejected() {
    let mut b = NetworkBuilder::new();
    b.reserve("ghost");
    let err = b.build().unwrap_err();
    assert!(matches!(err, ThermalError::Undefined { .. }));
}

#[test]
fn air_duct_must_be_hvac() {
    let p = ThermalParams::default();
    let mut b = NetworkBuilder::new();
    let air = b.reserve("air");
    let wall = b
        .add(
            "wall",
            70.0,
            ThermalUnit::Wall(WallUnit::new(&p.exterior_wall, air).unwrap()),
        )
        .unwrap();
    let unit = AirUnit::new(&p.air, vec![wall], vec![]).unwrap();
    b.define(air, 70.0, ThermalUnit::Air(unit)).unwrap();
    let err = b.build().unwrap_err();
    assert!(matches!(err, ThermalError::WrongKind { expected: "HVAC", .. }));
}

#[test]
fn dangling_reference_is_rejected() {
    let p = ThermalParams::default();
    let mut b = NetworkBuilder::new();
    let heater = HvacUnit::heater(&p.heater, NodeId::from_index(9)).unwrap();
    b.add("heater", 70.0, ThermalUnit::Hvac(heater)).unwrap();
    let err = b.build().unwrap_err();
    assert!(matches!(err, ThermalError::UnknownNode { index: 9, .. }));
}

#[test]
fn state_length_is_checked() {
    let (mut net, layout) = baseline();
    let err = net.set_state(DVector::zeros(3)).unwrap_err();
    assert!(matches!(err, ThermalError::StateLength { got: 3, expected: 5 }));
    assert!(net.derivatives(&DVector::zeros(4)).is_err());
    assert!(net.hvac(layout.air).is_err());
    assert!(net.set_outside_temperature(f64::NAN).is_err());
}

#[test]
fn hvac_rate_follows_published_flows() {
    let (mut net, layout) = baseline();
    net.hvac_mut(layout.heater).unwrap().set_element(true);
    net.hvac_mut(layout.heater).unwrap().set_fan(true);
    let mut x = net.state().clone();
    x[layout.heater.index()] = 90.0;
    x[layout.air.index()] = 68.0;
    net.set_state(x.clone()).unwrap();

    let dx = net.derivatives(&x).unwrap();
    let heater = net.hvac(layout.heater).unwrap();
    let flows = heater.flows(90.0, 68.0, net.inputs().outside_f);
    assert_eq!(dx[layout.heater.index()], heater.derivative(&flows));
    assert_eq!(net.total_power_w(), flows.power_w);
    assert!(net.air_gains(layout.air).unwrap().ducts > 0.0);
}
