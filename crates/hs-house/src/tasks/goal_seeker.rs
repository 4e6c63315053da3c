//! Goal seeker: mediates between the operator, the utility, the supervisor
//! and the coordinator.

use hs_controls::ThermostatMode;
use hs_core::SimTime;
use hs_runtime::{Cadence, State, Task, Transition};
use tracing::{debug, info};

use super::{BoxedState, HouseTask};
use crate::context::{DemandResponseEvent, House};
use crate::error::{HouseError, HouseResult};

pub const NORMAL: usize = 0;
pub const DEMAND_RESPONSE: usize = 1;

/// Direction (°F sign) in which a setpoint change saves energy.
fn saving_direction(mode: ThermostatMode) -> f64 {
    mode.unit().map_or(0.0, |kind| -kind.sign())
}

/// Move requests and setpoints between the parties and refresh the panel.
/// During an event, user changes that cost energy are dropped unless the
/// event allows overrides.
fn relay(house: &mut House, event: Option<&DemandResponseEvent>) -> HouseResult<()> {
    if let Some(mode) = house.panel.take_mode() {
        house.control.mode = mode;
    }
    if let Some(law) = house.panel.take_law() {
        house.control.requested_law = law;
    }
    if house.panel.take_hold_toggle() {
        let hold = !house.supervisor.is_hold();
        house.supervisor.request_hold(hold);
    }
    if let Some(sp) = house.supervisor.take_new_setpoint() {
        house.control.base_setpoint_f = sp;
    }

    let direction = saving_direction(house.control.mode);
    if let Some(delta) = house.panel.take_setpoint_delta() {
        let allowed = match event {
            None => true,
            Some(e) => e.allow_override || delta * direction > 0.0,
        };
        if allowed {
            house
                .supervisor
                .request_override(house.control.base_setpoint_f + delta);
        } else {
            debug!(delta_f = delta, "setpoint change refused during demand response");
        }
    }

    let offset = event.map_or(0.0, |e| e.offset_f * direction);
    house.control.setpoint_f = house.control.base_setpoint_f + offset;

    let inside_f = house.inside_temperature()?;
    let display = &mut house.panel.display;
    display.inside_f = inside_f;
    display.setpoint_f = house.control.setpoint_f;
    display.hold = house.supervisor.is_hold();
    display.heater_on = house.units.heater.is_on();
    display.cooler_on = house.units.cooler.is_on();
    display.demand_response = event.is_some();
    Ok(())
}

struct Normal;

impl State<House, HouseError> for Normal {
    fn name(&self) -> &str {
        "normal"
    }

    fn action(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        relay(house, None)
    }

    fn exit(&mut self, house: &mut House, now: &SimTime) -> HouseResult<Transition> {
        Ok(if house.panel.shutdown_requested() {
            Transition::Stop
        } else if house.utility.is_due(now.seconds) {
            Transition::Goto(DEMAND_RESPONSE)
        } else {
            Transition::Stay
        })
    }
}

struct DemandResponse {
    event: Option<DemandResponseEvent>,
}

impl State<House, HouseError> for DemandResponse {
    fn name(&self) -> &str {
        "demand_response"
    }

    fn entry(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        self.event = house.utility.take_due(now.seconds);
        if let Some(e) = &self.event {
            info!(
                offset_f = e.offset_f,
                until_s = e.until_s,
                t_s = now.seconds,
                "demand response started"
            );
        }
        Ok(())
    }

    fn action(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        relay(house, self.event.as_ref())
    }

    fn exit(&mut self, house: &mut House, now: &SimTime) -> HouseResult<Transition> {
        if house.panel.shutdown_requested() {
            return Ok(Transition::Stop);
        }
        let over = self.event.is_none_or(|e| now.seconds >= e.until_s);
        if over {
            info!(t_s = now.seconds, "demand response ended");
            Ok(Transition::Goto(NORMAL))
        } else {
            Ok(Transition::Stay)
        }
    }
}

pub fn goal_seeker_task(period_s: f64) -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![
        Box::new(Normal),
        Box::new(DemandResponse { event: None }),
    ];
    Ok(Task::new(
        super::GOAL_SEEKER,
        Cadence::periodic(period_s)?,
        states,
    )?)
}
