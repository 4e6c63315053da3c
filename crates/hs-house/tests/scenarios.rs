use hs_controls::{ControlLaw, EquipmentCommand, EquipmentState, ThermostatMode};
use hs_house::{Simulation, TickRecord, tasks};
use hs_project::{DemandResponseDef, EnvironmentDef, Project, RunDef};

fn project(t_end_s: f64, settle_s: f64) -> Project {
    Project {
        run: RunDef {
            dt_s: 5.0,
            t_end_s,
            settle_s,
        },
        ..Project::default()
    }
}

fn step_until(sim: &mut Simulation, t_s: f64) {
    while sim.now().seconds < t_s {
        sim.pass().unwrap();
        sim.advance_clock().unwrap();
    }
}

fn state_of(sim: &Simulation, task: &str) -> String {
    let id = sim.scheduler().find(task).unwrap();
    sim.scheduler()
        .task(id)
        .unwrap()
        .current_state_name()
        .to_string()
}

#[test]
fn tasks_are_registered_in_pass_order() {
    let sim = Simulation::new(&Project::default()).unwrap();
    let order: Vec<usize> = [
        tasks::ENVIRONMENT,
        tasks::GOAL_SEEKER,
        tasks::SUPERVISOR,
        tasks::COORDINATOR,
        tasks::FILTER,
        "hysteresis_heat",
        "hysteresis_cool",
        "pid_heat",
        "pid_cool",
        "pwm_heat",
        "pwm_cool",
        "heater",
        "cooler",
        tasks::THERMAL,
    ]
    .iter()
    .map(|name| sim.scheduler().find(name).unwrap().index())
    .collect();
    assert_eq!(order, (0..14).collect::<Vec<_>>());
}

#[test]
fn hysteresis_holds_a_hot_day_near_setpoint() {
    let mut sim = Simulation::new(&project(5.0 * 3600.0, 2.0 * 3600.0)).unwrap();
    let mut records: Vec<TickRecord> = Vec::new();
    let summary = sim.run(|r| records.push(*r)).unwrap();

    assert_eq!(summary.ticks, 3601);
    assert!(!summary.stopped);
    assert!(summary.cooler_starts >= 1);
    assert_eq!(summary.heater_starts, 0);
    assert!(records.iter().all(|r| !r.heater_on));
    assert!(records.iter().any(|r| r.cooler_on));

    let (lo, hi) = summary.inside_range_f.unwrap();
    assert!(lo > 74.0 && hi < 76.0, "inside range {lo}..{hi}");
    assert!(summary.energy_wh > 0.0);
    assert!(summary.integrator.rhs_evals > 0);
    for r in records.iter().filter(|r| !r.heater_on && !r.cooler_on) {
        assert_eq!(r.power_w, 0.0, "t = {}", r.t_s);
    }
}

#[test]
fn cooler_runs_through_pre_before_the_fan_starts() {
    let mut sim = Simulation::new(&project(600.0, 0.0)).unwrap();
    let mut seen = Vec::new();
    while sim.now().seconds <= 300.0 {
        sim.pass().unwrap();
        let s = sim.house().units.cooler.state();
        if seen.last() != Some(&s) {
            seen.push(s);
        }
        sim.advance_clock().unwrap();
    }
    assert_eq!(
        seen,
        vec![EquipmentState::Off, EquipmentState::Pre, EquipmentState::On]
    );
    let network = sim.house().sim.network();
    let cooler = network.hvac(sim.house().layout.cooler).unwrap();
    assert!(cooler.fan_on() && cooler.element_on());
    assert!(sim.house().power_w() > 1000.0);
}

/// Cooler states seen on each pass until `t_s`, collapsed to changes.
fn cooler_states_until(sim: &mut Simulation, t_s: f64, seen: &mut Vec<EquipmentState>) {
    while sim.now().seconds < t_s {
        sim.pass().unwrap();
        let s = sim.house().units.cooler.state();
        if seen.last() != Some(&s) {
            seen.push(s);
        }
        sim.advance_clock().unwrap();
    }
}

#[test]
fn cooler_cycles_off_pre_on_post_and_back_to_off() {
    let mut sim = Simulation::new(&project(1e6, 0.0)).unwrap();
    let mut seen = Vec::new();
    cooler_states_until(&mut sim, 300.0, &mut seen);
    sim.house_mut().panel.set_mode(ThermostatMode::Off);
    cooler_states_until(&mut sim, 900.0, &mut seen);
    assert_eq!(
        seen,
        vec![
            EquipmentState::Off,
            EquipmentState::Pre,
            EquipmentState::On,
            EquipmentState::Post,
            EquipmentState::Off,
        ]
    );
}

#[test]
fn pid_starts_the_cooler_on_its_first_sample() {
    let mut p = project(600.0, 0.0);
    p.run.dt_s = 1.0;
    p.thermostat.law = ControlLaw::Pid;
    let mut sim = Simulation::new(&p).unwrap();

    let mut first_on = None;
    while sim.now().seconds < 60.0 {
        sim.pass().unwrap();
        if first_on.is_none() && sim.house().units.cooler.command() == EquipmentCommand::TurnOn {
            first_on = Some(sim.now().seconds);
        }
        sim.advance_clock().unwrap();
    }
    let t = first_on.expect("cooler was never commanded on");
    assert!(t <= 2.0 * p.thermostat.control_dt_s, "first start at {t}");
    assert_ne!(sim.house().units.cooler.state(), EquipmentState::Off);
    assert!(sim.house().control.duty.cooler.is_some_and(|d| d < 0.0));
}

#[test]
fn switching_from_pid_to_hysteresis_keeps_a_running_cooler_on() {
    let mut p = project(1e6, 0.0);
    p.thermostat.law = ControlLaw::Pid;
    let mut sim = Simulation::new(&p).unwrap();
    while sim.house().units.cooler.state() != EquipmentState::On {
        assert!(sim.now().seconds < 900.0, "cooler never reached On");
        sim.pass().unwrap();
        sim.advance_clock().unwrap();
    }

    sim.house_mut().panel.set_law(ControlLaw::Hysteresis);
    let switch_s = sim.now().seconds;
    let mut seen = Vec::new();
    cooler_states_until(&mut sim, switch_s + 40.0, &mut seen);
    assert_eq!(seen, vec![EquipmentState::On]);
    assert_eq!(state_of(&sim, tasks::COORDINATOR), "hysteresis");
    assert_eq!(state_of(&sim, "hysteresis_cool"), "control");
    assert_eq!(state_of(&sim, "pid_cool"), "off");
    assert_eq!(state_of(&sim, "pwm_cool"), "off");
    assert_eq!(sim.house().control.duty.cooler, None);
}

#[test]
fn pid_with_pwm_settles_near_setpoint() {
    let mut p = project(5.0 * 3600.0, 2.0 * 3600.0);
    p.thermostat.law = ControlLaw::Pid;
    let mut sim = Simulation::new(&p).unwrap();
    let summary = sim.run(|_| {}).unwrap();

    assert!(summary.cooler_starts >= 1);
    let (lo, hi) = summary.inside_range_f.unwrap();
    assert!(lo > 73.5 && hi < 76.5, "inside range {lo}..{hi}");
    assert_eq!(state_of(&sim, "pwm_cool"), "modulate");
    assert_eq!(state_of(&sim, "hysteresis_cool"), "off");
    assert_eq!(state_of(&sim, tasks::COORDINATOR), "pid");
}

#[test]
fn heating_mode_uses_the_heater_only() {
    let mut p = project(3.0 * 3600.0, 3600.0);
    p.thermostat.mode = ThermostatMode::Heating;
    p.thermal.initial_temp_f = 72.0;
    p.environment = EnvironmentDef::Constant {
        outside_f: 40.0,
        solar: 0.0,
        period_s: 60.0,
    };
    let mut sim = Simulation::new(&p).unwrap();
    let mut records: Vec<TickRecord> = Vec::new();
    let summary = sim.run(|r| records.push(*r)).unwrap();

    assert!(summary.heater_starts >= 1);
    assert_eq!(summary.cooler_starts, 0);
    assert!(records.iter().all(|r| !r.cooler_on));
    let (lo, hi) = summary.inside_range_f.unwrap();
    assert!(lo > 73.0 && hi < 78.5, "inside range {lo}..{hi}");
}

#[test]
fn user_override_lasts_until_the_schedule_moves_on() {
    let mut sim = Simulation::new(&project(1e6, 0.0)).unwrap();
    step_until(&mut sim, 50.0);
    sim.house_mut().panel.modify_setpoint(2.0);
    step_until(&mut sim, 100.0);
    assert_eq!(sim.house().setpoint(), 77.0);
    assert_eq!(state_of(&sim, tasks::SUPERVISOR), "override");

    // Monday 06:00 starts the next schedule row.
    step_until(&mut sim, 6.0 * 3600.0 + 30.0);
    assert_eq!(sim.house().setpoint(), 75.0);
    assert_eq!(state_of(&sim, tasks::SUPERVISOR), "tables");
}

#[test]
fn hold_toggle_reaches_the_supervisor() {
    let mut sim = Simulation::new(&project(1e6, 0.0)).unwrap();
    step_until(&mut sim, 20.0);
    sim.house_mut().panel.toggle_hold();
    step_until(&mut sim, 60.0);
    assert_eq!(state_of(&sim, tasks::SUPERVISOR), "hold");
    assert!(sim.house().panel.display.hold);

    // Overrides still apply while holding.
    sim.house_mut().panel.modify_setpoint(-1.0);
    step_until(&mut sim, 100.0);
    assert_eq!(sim.house().setpoint(), 74.0);
    assert_eq!(state_of(&sim, tasks::SUPERVISOR), "hold");
}

#[test]
fn demand_response_relaxes_the_setpoint_for_its_window() {
    let mut p = project(3.0 * 3600.0, 0.0);
    p.demand_response.push(DemandResponseDef {
        start_s: 3600.0,
        until_s: 7200.0,
        offset_f: 3.0,
        allow_override: false,
    });
    let mut sim = Simulation::new(&p).unwrap();
    let mut records: Vec<TickRecord> = Vec::new();
    sim.run(|r| records.push(*r)).unwrap();

    for r in &records {
        if r.t_s < 3600.0 || r.t_s >= 7210.0 {
            assert_eq!(r.setpoint_f, 75.0, "t = {}", r.t_s);
        } else if r.t_s >= 3610.0 && r.t_s < 7200.0 {
            assert_eq!(r.setpoint_f, 78.0, "t = {}", r.t_s);
        }
    }
}

#[test]
fn demand_response_refuses_costly_user_changes() {
    let mut p = project(1e6, 0.0);
    p.demand_response.push(DemandResponseDef {
        start_s: 0.0,
        until_s: 3600.0,
        offset_f: 2.0,
        allow_override: false,
    });
    let mut sim = Simulation::new(&p).unwrap();
    step_until(&mut sim, 30.0);
    assert_eq!(sim.house().setpoint(), 77.0);
    assert!(sim.house().panel.display.demand_response);

    // Lowering a cooling setpoint costs energy: dropped.
    sim.house_mut().panel.modify_setpoint(-2.0);
    step_until(&mut sim, 60.0);
    assert_eq!(sim.house().setpoint(), 77.0);

    // Raising it saves energy: forwarded, offset still applied.
    sim.house_mut().panel.modify_setpoint(1.0);
    step_until(&mut sim, 90.0);
    assert_eq!(sim.house().setpoint(), 78.0);
}

#[test]
fn switching_mode_off_releases_the_cooler() {
    let mut sim = Simulation::new(&project(1e6, 0.0)).unwrap();
    step_until(&mut sim, 300.0);
    assert_eq!(sim.house().units.cooler.state(), EquipmentState::On);

    sim.house_mut().panel.set_mode(ThermostatMode::Off);
    step_until(&mut sim, 600.0);
    assert_eq!(sim.house().control.active, None);
    assert_eq!(sim.house().units.cooler.state(), EquipmentState::Off);
    assert_eq!(sim.house().power_w(), 0.0);
}

#[test]
fn law_switch_goes_through_the_coordinator() {
    let mut sim = Simulation::new(&project(1e6, 0.0)).unwrap();
    step_until(&mut sim, 30.0);
    assert_eq!(state_of(&sim, tasks::COORDINATOR), "hysteresis");
    sim.house_mut().panel.set_law(ControlLaw::Pid);
    step_until(&mut sim, 60.0);
    assert_eq!(state_of(&sim, tasks::COORDINATOR), "pid");
    assert_eq!(
        sim.house().control.active,
        Some((ControlLaw::Pid, hs_controls::UnitKind::Cooler))
    );
}

#[test]
fn shutdown_request_stops_the_run() {
    let mut sim = Simulation::new(&project(3600.0, 0.0)).unwrap();
    step_until(&mut sim, 100.0);
    sim.house_mut().panel.request_shutdown();
    let summary = sim.run(|_| {}).unwrap();
    assert!(summary.stopped);
    assert_eq!(summary.ticks, 1);
    assert_eq!(
        sim.scheduler().stopped_by(),
        sim.scheduler().find(tasks::GOAL_SEEKER)
    );
}

#[test]
fn invalid_project_is_rejected() {
    let mut p = Project::default();
    p.thermostat.control_dt_s = 0.0;
    assert!(Simulation::new(&p).is_err());
}
