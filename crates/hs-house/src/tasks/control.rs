//! Control-law tasks.
//!
//! Each law runs as a two-state task per unit: `off` releases the unit,
//! `control` runs the law. The coordinator decides which pair is enabled
//! through [`ControlBus::active`]. A law handing a unit over to another
//! law leaves the command alone so a running unit is not cycled.
//!
//! [`ControlBus::active`]: crate::context::ControlBus::active

use hs_controls::{
    BoxcarFilter, ControlLaw, EquipmentCommand, Hysteresis, PIDController, PIDControllerState,
    PwmModulator, UnitKind,
};
use hs_core::SimTime;
use hs_runtime::{Cadence, State, Task, Transition};

use super::{BoxedState, HouseTask};
use crate::context::House;
use crate::error::{HouseError, HouseResult};

const OFF: usize = 0;
const CONTROL: usize = 1;

/// Disabled law: turns the unit off once, unless another law already owns
/// it, and waits to be enabled.
struct Released {
    law: ControlLaw,
    kind: UnitKind,
}

impl State<House, HouseError> for Released {
    fn name(&self) -> &str {
        "off"
    }

    fn entry(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        if !house.control.drives(self.kind) {
            house
                .units
                .get_mut(self.kind)
                .set_command(EquipmentCommand::TurnOff);
        }
        if self.law == ControlLaw::Pid {
            *house.control.duty.get_mut(self.kind) = None;
        }
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(if house.control.is_enabled(self.law, self.kind) {
            Transition::Goto(CONTROL)
        } else {
            Transition::Stay
        })
    }
}

fn leave_when_disabled(house: &House, law: ControlLaw, kind: UnitKind) -> Transition {
    if house.control.is_enabled(law, kind) {
        Transition::Stay
    } else {
        Transition::Goto(OFF)
    }
}

struct HysteresisControl {
    law: Hysteresis,
    on: bool,
}

impl State<House, HouseError> for HysteresisControl {
    fn name(&self) -> &str {
        "control"
    }

    fn entry(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        // Pick up where the previous law left the unit.
        self.on = house.units.get(self.law.kind).command() == EquipmentCommand::TurnOn;
        Ok(())
    }

    fn action(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        let pv = house.inside_temperature()?;
        self.on = self.law.update(self.on, house.control.setpoint_f, pv);
        house
            .units
            .get_mut(self.law.kind)
            .set_command(self.on.into());
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(leave_when_disabled(
            house,
            ControlLaw::Hysteresis,
            self.law.kind,
        ))
    }
}

pub fn hysteresis_task(law: Hysteresis, period_s: f64) -> HouseResult<HouseTask> {
    let kind = law.kind;
    let states: Vec<BoxedState> = vec![
        Box::new(Released {
            law: ControlLaw::Hysteresis,
            kind,
        }),
        Box::new(HysteresisControl { law, on: false }),
    ];
    Ok(Task::new(
        super::control_name(ControlLaw::Hysteresis, kind),
        Cadence::periodic(period_s)?,
        states,
    )?)
}

struct PidControl {
    kind: UnitKind,
    pid: PIDController,
    state: PIDControllerState,
    last_s: Option<f64>,
}

impl State<House, HouseError> for PidControl {
    fn name(&self) -> &str {
        "control"
    }

    fn entry(&mut self, _house: &mut House, _now: &SimTime) -> HouseResult<()> {
        self.state = PIDControllerState::default();
        self.last_s = None;
        Ok(())
    }

    fn action(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        let pv = match house.control.filtered_inside_f {
            Some(t) => t,
            None => house.inside_temperature()?,
        };
        let dt = self.last_s.map_or(0.0, |last| now.seconds - last);
        let (state, duty) = self
            .pid
            .update(&self.state, pv, house.control.setpoint_f, dt);
        self.state = state;
        self.last_s = Some(now.seconds);
        *house.control.duty.get_mut(self.kind) = Some(duty);
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(leave_when_disabled(house, ControlLaw::Pid, self.kind))
    }
}

pub fn pid_task(kind: UnitKind, pid: PIDController, period_s: f64) -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![
        Box::new(Released {
            law: ControlLaw::Pid,
            kind,
        }),
        Box::new(PidControl {
            kind,
            pid,
            state: PIDControllerState::default(),
            last_s: None,
        }),
    ];
    Ok(Task::new(
        super::control_name(ControlLaw::Pid, kind),
        Cadence::periodic(period_s)?,
        states,
    )?)
}

struct Modulate {
    kind: UnitKind,
    pwm: PwmModulator,
}

impl State<House, HouseError> for Modulate {
    fn name(&self) -> &str {
        "modulate"
    }

    fn entry(&mut self, _house: &mut House, _now: &SimTime) -> HouseResult<()> {
        self.pwm.reset();
        Ok(())
    }

    fn action(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        // No cycle starts before the PID law has produced a duty.
        let Some(duty) = *house.control.duty.get(self.kind) else {
            return Ok(());
        };
        self.pwm.set_duty(duty);
        let on = self.pwm.output(now.seconds);
        house.units.get_mut(self.kind).set_command(on.into());
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(leave_when_disabled(house, ControlLaw::Pid, self.kind))
    }
}

/// Turns the PID duty of `kind` into TURN_ON/TURN_OFF commands.
pub fn pwm_task(pwm: PwmModulator, kind: UnitKind, period_s: f64) -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![
        Box::new(Released {
            law: ControlLaw::Pid,
            kind,
        }),
        Box::new(Modulate { kind, pwm }),
    ];
    Ok(Task::new(
        super::pwm_name(kind),
        Cadence::periodic(period_s)?,
        states,
    )?)
}

struct Smooth {
    filter: BoxcarFilter,
}

impl State<House, HouseError> for Smooth {
    fn name(&self) -> &str {
        "smooth"
    }

    fn action(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        let t = house.inside_temperature()?;
        house.control.filtered_inside_f = Some(self.filter.push(t));
        Ok(())
    }

    fn exit(&mut self, _house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(Transition::Stay)
    }
}

/// Boxcar average of the inside temperature for the PID law.
pub fn filter_task(filter: BoxcarFilter, period_s: f64) -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![Box::new(Smooth { filter })];
    Ok(Task::new(
        super::FILTER,
        Cadence::periodic(period_s)?,
        states,
    )?)
}
