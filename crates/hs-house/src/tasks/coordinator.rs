use hs_controls::ControlLaw;
use hs_core::SimTime;
use hs_runtime::{Cadence, State, Task, Transition};
use tracing::info;

use super::{BoxedState, HouseTask};
use crate::context::House;
use crate::error::{HouseError, HouseResult};

fn law_index(law: ControlLaw) -> usize {
    match law {
        ControlLaw::Hysteresis => 0,
        ControlLaw::Pid => 1,
    }
}

/// Enables the control tasks matching the selected law and thermostat mode.
struct Coordinate {
    law: ControlLaw,
}

impl State<House, HouseError> for Coordinate {
    fn name(&self) -> &str {
        match self.law {
            ControlLaw::Hysteresis => "hysteresis",
            ControlLaw::Pid => "pid",
        }
    }

    fn entry(&mut self, _house: &mut House, now: &SimTime) -> HouseResult<()> {
        info!(law = self.name(), t_s = now.seconds, "control law selected");
        Ok(())
    }

    fn action(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<()> {
        house.control.active = house.control.mode.unit().map(|kind| (self.law, kind));
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        let requested = house.control.requested_law;
        Ok(if requested == self.law {
            Transition::Stay
        } else {
            Transition::Goto(law_index(requested))
        })
    }
}

pub fn coordinator_task(initial: ControlLaw, period_s: f64) -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![
        Box::new(Coordinate {
            law: ControlLaw::Hysteresis,
        }),
        Box::new(Coordinate {
            law: ControlLaw::Pid,
        }),
    ];
    Ok(Task::new(super::COORDINATOR, Cadence::periodic(period_s)?, states)?
        .with_initial_state(law_index(initial))?)
}
