//! Setpoint supervisor.
//!
//! ```text
//!   hold  <---- hold requested ----  tables  ---- override ---->  override
//!    |                                 ^  ^                          |
//!    +-------- hold released ----------+  +--- schedule moves on ----+
//! ```
//!
//! Override also drops to hold when hold is requested. Every state entry
//! re-announces the setpoint.

use hs_core::SimTime;
use hs_runtime::{Cadence, State, Task, Transition};

use super::{BoxedState, HouseTask};
use crate::context::House;
use crate::error::{HouseError, HouseResult};

pub const HOLD: usize = 0;
pub const TABLES: usize = 1;
pub const OVERRIDE: usize = 2;

fn scheduled(house: &House, now: &SimTime) -> hs_controls::ScheduledSetpoint {
    house
        .supervisor
        .schedule
        .setpoint_at(now.weekday(), now.seconds_of_day())
}

struct Hold;

impl State<House, HouseError> for Hold {
    fn name(&self) -> &str {
        "hold"
    }

    fn entry(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        house.supervisor.flag_new();
        Ok(())
    }

    fn action(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        if let Some(sp) = house.supervisor.take_override() {
            house.supervisor.publish(sp);
        }
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(if house.supervisor.is_hold() {
            Transition::Stay
        } else {
            Transition::Goto(TABLES)
        })
    }
}

struct Tables;

impl State<House, HouseError> for Tables {
    fn name(&self) -> &str {
        "tables"
    }

    fn entry(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        house.supervisor.flag_new();
        Ok(())
    }

    fn action(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        let table = scheduled(house, now).setpoint_f;
        if table != house.supervisor.setpoint_f() {
            house.supervisor.publish(table);
        }
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(if house.supervisor.is_hold() {
            Transition::Goto(HOLD)
        } else if house.supervisor.has_override() {
            Transition::Goto(OVERRIDE)
        } else {
            Transition::Stay
        })
    }
}

/// User setpoint in force until the schedule reaches its next row.
struct Override {
    slot: Option<usize>,
}

impl State<House, HouseError> for Override {
    fn name(&self) -> &str {
        "override"
    }

    fn entry(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        self.slot = Some(scheduled(house, now).slot);
        house.supervisor.flag_new();
        Ok(())
    }

    fn action(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        if let Some(sp) = house.supervisor.take_override() {
            house.supervisor.publish(sp);
        }
        Ok(())
    }

    fn exit(&mut self, house: &mut House, now: &SimTime) -> HouseResult<Transition> {
        Ok(if house.supervisor.is_hold() {
            Transition::Goto(HOLD)
        } else if self.slot != Some(scheduled(house, now).slot) {
            Transition::Goto(TABLES)
        } else {
            Transition::Stay
        })
    }
}

pub fn supervisor_task(hold: bool, period_s: f64) -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![
        Box::new(Hold),
        Box::new(Tables),
        Box::new(Override { slot: None }),
    ];
    let initial = if hold { HOLD } else { TABLES };
    Ok(Task::new(super::SUPERVISOR, Cadence::periodic(period_s)?, states)?
        .with_initial_state(initial)?)
}
