use hs_core::SimTime;
use hs_runtime::{Cadence, State, Task, Transition};

use super::{BoxedState, HouseTask};
use crate::context::House;
use crate::error::{HouseError, HouseResult};

/// Brings the thermal network up to scheduler time on every pass.
struct Integrate;

impl State<House, HouseError> for Integrate {
    fn name(&self) -> &str {
        "integrate"
    }

    fn action(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        house.sim.advance_to(now.seconds)?;
        Ok(())
    }

    fn exit(&mut self, _house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(Transition::Stay)
    }
}

pub fn thermal_task() -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![Box::new(Integrate)];
    Ok(Task::new(super::THERMAL, Cadence::EveryPass, states)?)
}
