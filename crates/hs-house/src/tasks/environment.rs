use hs_core::SimTime;
use hs_runtime::{Cadence, State, Task, Transition};

use super::{BoxedState, HouseTask};
use crate::context::House;
use crate::environment::Environment;
use crate::error::{HouseError, HouseResult};

/// Pushes outdoor conditions into the thermal network.
struct Sample {
    env: Box<dyn Environment>,
}

impl State<House, HouseError> for Sample {
    fn name(&self) -> &str {
        "sample"
    }

    fn action(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        let c = self.env.conditions(now);
        let network = house.sim.network_mut();
        network.set_outside_temperature(c.outside_f)?;
        network.set_solar_radiation(c.solar)?;
        network.refresh();
        Ok(())
    }

    fn exit(&mut self, _house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        Ok(Transition::Stay)
    }
}

pub fn environment_task(
    env: Box<dyn Environment>,
    period_s: f64,
) -> HouseResult<HouseTask> {
    let states: Vec<BoxedState> = vec![Box::new(Sample { env })];
    Ok(Task::new(
        super::ENVIRONMENT,
        Cadence::periodic(period_s)?,
        states,
    )?)
}
