//! Thermal network integration through the simulator.

use hs_sim::{SimError, SolverOptions, ThermalSimulator};
use hs_thermal::{
    NetworkBuilder, ThermalInputs, ThermalNetwork, ThermalParams, ThermalUnit, WallParams,
    WallUnit, build_house,
};
use proptest::prelude::*;

fn isolated(temp_f: f64) -> ThermalNetwork {
    let mut b = NetworkBuilder::new();
    let id = b.reserve("slab");
    let wall = WallUnit::new(
        &WallParams {
            mass_lb: 200.0,
            k_air: 5.0,
            k_ambient: 0.0,
        },
        id,
    )
    .unwrap();
    b.define(id, temp_f, ThermalUnit::Wall(wall)).unwrap();
    b.build().unwrap()
}

proptest! {
    #[test]
    fn isolated_node_temperature_is_invariant(
        temp in -20.0f64..150.0,
        span in 0.1f64..500.0,
        adaptive in any::<bool>(),
    ) {
        let opts = SolverOptions { adaptive, step: 1.0, ..SolverOptions::default() };
        let mut sim = ThermalSimulator::new(isolated(temp), opts, 0.0).unwrap();
        sim.advance_to(span).unwrap();
        let after = sim.network().state()[0];
        prop_assert!((after - temp).abs() <= 1e-9 * temp.abs().max(1.0));
    }
}

#[test]
fn running_cooler_cools_the_house() {
    let (mut net, layout) = build_house(&ThermalParams::default(), ThermalInputs::default()).unwrap();
    {
        let cooler = net.hvac_mut(layout.cooler).unwrap();
        cooler.set_fan(true);
        cooler.set_element(true);
    }
    let mut sim = ThermalSimulator::new(net, SolverOptions::default(), 0.0).unwrap();
    let t0 = sim.network().temperature(layout.air).unwrap();
    for k in 1..=120 {
        sim.advance_to(f64::from(k) * 5.0).unwrap();
    }
    let net = sim.network();
    let t1 = net.temperature(layout.air).unwrap();
    assert!(t1 < t0 - 0.3, "air went from {t0} to {t1}");
    assert!(net.temperature(layout.cooler).unwrap() < 60.0);
    assert!(net.total_power_w() > 0.0);
    assert_eq!(sim.stats().forced_accepts, 0);
}

#[test]
fn fixed_and_adaptive_agree() {
    let make = |adaptive: bool| {
        let (net, _) = build_house(&ThermalParams::default(), ThermalInputs::default()).unwrap();
        let opts = SolverOptions {
            adaptive,
            step: 0.1,
            ..SolverOptions::default()
        };
        let mut sim = ThermalSimulator::new(net, opts, 0.0).unwrap();
        for k in 1..=60 {
            sim.advance_to(f64::from(k) * 10.0).unwrap();
        }
        sim.network().state().clone()
    };
    let a = make(true);
    let f = make(false);
    for i in 0..a.len() {
        assert!((a[i] - f[i]).abs() < 1e-2, "node {i}: {} vs {}", a[i], f[i]);
    }
}

#[test]
fn nominal_step_is_carried_between_calls() {
    let (net, _) = build_house(&ThermalParams::default(), ThermalInputs::default()).unwrap();
    let mut sim = ThermalSimulator::new(net, SolverOptions::default(), 0.0).unwrap();
    assert_eq!(sim.nominal_step(), 1e-2);
    sim.advance_to(5.0).unwrap();
    assert!(sim.nominal_step() > 1e-2);
}

#[test]
fn time_must_not_go_backward() {
    let (net, _) = build_house(&ThermalParams::default(), ThermalInputs::default()).unwrap();
    let mut sim = ThermalSimulator::new(net, SolverOptions::default(), 0.0).unwrap();
    sim.advance_to(10.0).unwrap();
    let before = sim.stats();
    sim.advance_to(10.0).unwrap();
    assert_eq!(sim.stats(), before);
    let err = sim.advance_to(9.0).unwrap_err();
    assert!(matches!(err, SimError::TimeReversed { .. }));
}

#[test]
fn bad_options_are_rejected() {
    let (net, _) = build_house(&ThermalParams::default(), ThermalInputs::default()).unwrap();
    let opts = SolverOptions {
        step_min: 1.0,
        step: 0.1,
        ..SolverOptions::default()
    };
    assert!(ThermalSimulator::new(net, opts, 0.0).is_err());
}
