//! Equipment sequencer task: one per HVAC unit.

use hs_controls::{EquipmentSequencer, EquipmentState, UnitKind};
use hs_core::SimTime;
use hs_runtime::{Cadence, State, Task, Transition};
use tracing::debug;

use super::{BoxedState, HouseTask};
use crate::context::House;
use crate::error::{HouseError, HouseResult};

struct Sequencing {
    state: EquipmentState,
    sequencer: EquipmentSequencer,
}

impl State<House, HouseError> for Sequencing {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn entry(&mut self, house: &mut House, now: &SimTime) -> HouseResult<()> {
        let kind = self.sequencer.kind();
        let out = self.state.outputs();
        house.apply_equipment(kind, out.fan, out.element)?;
        house.units.get_mut(kind).publish_state(self.state);
        debug!(
            unit = ?kind,
            state = self.state.name(),
            fan = out.fan,
            element = out.element,
            t_s = now.seconds,
            "equipment outputs"
        );
        Ok(())
    }

    fn exit(&mut self, house: &mut House, _now: &SimTime) -> HouseResult<Transition> {
        let kind = self.sequencer.kind();
        let command = house.units.get(kind).command();
        let duct_f = house.duct_temperature(kind)?;
        let next = self.sequencer.next(self.state, command, duct_f);
        Ok(if next == self.state {
            Transition::Stay
        } else {
            Transition::Goto(next.index())
        })
    }
}

/// Off/Pre/On/Post task for `kind`; state indices follow
/// [`EquipmentState::index`].
pub fn equipment_task(
    kind: UnitKind,
    sequencer: EquipmentSequencer,
    period_s: f64,
) -> HouseResult<HouseTask> {
    let states = EquipmentState::ALL
        .iter()
        .map(|&state| {
            Box::new(Sequencing {
                state,
                sequencer: sequencer.clone(),
            }) as BoxedState
        })
        .collect();
    Ok(Task::new(
        super::equipment_name(kind),
        Cadence::periodic(period_s)?,
        states,
    )?)
}
