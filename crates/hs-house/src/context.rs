//! Shared data handed to every task on each scheduler pass.
//!
//! Tasks never hold references to each other. Everything one task publishes
//! for another lives in [`House`], and the fixed registration order decides
//! who sees what within a pass.

use std::collections::VecDeque;

use hs_controls::{
    ControlLaw, EquipmentCommand, EquipmentState, SetpointSchedule, ThermostatMode, UnitKind,
};
use hs_core::{NodeId, SimTime};
use hs_runtime::CommandSlot;
use hs_sim::ThermalSimulator;
use hs_thermal::HouseLayout;

use crate::error::HouseResult;

/// One value per HVAC unit.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UnitPair<T> {
    pub heater: T,
    pub cooler: T,
}

impl<T> UnitPair<T> {
    pub fn get(&self, kind: UnitKind) -> &T {
        match kind {
            UnitKind::Heater => &self.heater,
            UnitKind::Cooler => &self.cooler,
        }
    }

    pub fn get_mut(&mut self, kind: UnitKind) -> &mut T {
        match kind {
            UnitKind::Heater => &mut self.heater,
            UnitKind::Cooler => &mut self.cooler,
        }
    }
}

/// Command input and state readback of one equipment sequencer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquipmentPort {
    command: CommandSlot<EquipmentCommand>,
    state: EquipmentState,
}

impl Default for EquipmentPort {
    fn default() -> Self {
        Self {
            command: CommandSlot::new(EquipmentCommand::TurnOff),
            state: EquipmentState::Off,
        }
    }
}

impl EquipmentPort {
    pub fn set_command(&mut self, command: EquipmentCommand) {
        self.command.set(command);
    }

    pub fn command(&self) -> EquipmentCommand {
        self.command.get()
    }

    pub fn state(&self) -> EquipmentState {
        self.state
    }

    pub(crate) fn publish_state(&mut self, state: EquipmentState) {
        self.state = state;
    }

    /// True while conditioning the coil or the room.
    pub fn is_on(&self) -> bool {
        self.state.is_on()
    }
}

/// Values shared between the coordinator and the control-law tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlBus {
    pub mode: ThermostatMode,
    /// Law the coordinator should switch to.
    pub requested_law: ControlLaw,
    /// Law and unit whose control tasks are enabled.
    pub active: Option<(ControlLaw, UnitKind)>,
    /// Setpoint delivered by the supervisor, before demand-response offsets.
    pub base_setpoint_f: f64,
    /// Setpoint the control laws regulate to.
    pub setpoint_f: f64,
    pub filtered_inside_f: Option<f64>,
    /// Latest PID output per unit, `None` until the law has sampled.
    pub duty: UnitPair<Option<f64>>,
}

impl ControlBus {
    pub fn new(mode: ThermostatMode, law: ControlLaw, setpoint_f: f64) -> Self {
        Self {
            mode,
            requested_law: law,
            active: None,
            base_setpoint_f: setpoint_f,
            setpoint_f,
            filtered_inside_f: None,
            duty: UnitPair::default(),
        }
    }

    pub fn is_enabled(&self, law: ControlLaw, kind: UnitKind) -> bool {
        self.active == Some((law, kind))
    }

    /// True when some law currently drives `kind`.
    pub fn drives(&self, kind: UnitKind) -> bool {
        self.active.is_some_and(|(_, k)| k == kind)
    }
}

/// Supervisor state and the requests it accepts.
#[derive(Debug, Clone, PartialEq)]
pub struct SetpointBus {
    pub schedule: SetpointSchedule,
    setpoint_f: f64,
    new_setpoint: bool,
    hold: bool,
    override_f: Option<f64>,
}

impl SetpointBus {
    pub fn new(schedule: SetpointSchedule, start: &SimTime, hold: bool) -> Self {
        let setpoint_f = schedule
            .setpoint_at(start.weekday(), start.seconds_of_day())
            .setpoint_f;
        Self {
            schedule,
            setpoint_f,
            new_setpoint: false,
            hold,
            override_f: None,
        }
    }

    pub fn setpoint_f(&self) -> f64 {
        self.setpoint_f
    }

    pub fn is_hold(&self) -> bool {
        self.hold
    }

    pub fn request_hold(&mut self, hold: bool) {
        self.hold = hold;
    }

    /// Ask the supervisor to use `setpoint_f` until the schedule moves on.
    pub fn request_override(&mut self, setpoint_f: f64) {
        self.override_f = Some(setpoint_f);
    }

    pub fn has_override(&self) -> bool {
        self.override_f.is_some()
    }

    pub(crate) fn take_override(&mut self) -> Option<f64> {
        self.override_f.take()
    }

    pub(crate) fn publish(&mut self, setpoint_f: f64) {
        self.setpoint_f = setpoint_f;
        self.new_setpoint = true;
    }

    pub(crate) fn flag_new(&mut self) {
        self.new_setpoint = true;
    }

    /// The setpoint, if it changed (or was re-announced) since the last call.
    pub fn take_new_setpoint(&mut self) -> Option<f64> {
        if self.new_setpoint {
            self.new_setpoint = false;
            Some(self.setpoint_f)
        } else {
            None
        }
    }
}

/// Operator-facing thermostat panel: pending requests plus the values it
/// displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPanel {
    setpoint_delta_f: f64,
    hold_toggle: bool,
    mode: Option<ThermostatMode>,
    law: Option<ControlLaw>,
    shutdown: bool,
    pub display: PanelDisplay,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PanelDisplay {
    pub inside_f: f64,
    pub setpoint_f: f64,
    pub hold: bool,
    pub heater_on: bool,
    pub cooler_on: bool,
    pub demand_response: bool,
}

impl UserPanel {
    /// Nudge the setpoint by `delta_f`. Repeated presses accumulate until
    /// the goal seeker picks them up.
    pub fn modify_setpoint(&mut self, delta_f: f64) {
        if delta_f.is_finite() {
            self.setpoint_delta_f += delta_f;
        }
    }

    pub fn toggle_hold(&mut self) {
        self.hold_toggle = !self.hold_toggle;
    }

    pub fn set_mode(&mut self, mode: ThermostatMode) {
        self.mode = Some(mode);
    }

    pub fn set_law(&mut self, law: ControlLaw) {
        self.law = Some(law);
    }

    pub fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    pub(crate) fn take_setpoint_delta(&mut self) -> Option<f64> {
        let delta = std::mem::take(&mut self.setpoint_delta_f);
        (delta != 0.0).then_some(delta)
    }

    pub(crate) fn take_hold_toggle(&mut self) -> bool {
        std::mem::take(&mut self.hold_toggle)
    }

    pub(crate) fn take_mode(&mut self) -> Option<ThermostatMode> {
        self.mode.take()
    }

    pub(crate) fn take_law(&mut self) -> Option<ControlLaw> {
        self.law.take()
    }
}

/// Utility request to shed load between `start_s` and `until_s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandResponseEvent {
    pub start_s: f64,
    pub until_s: f64,
    pub offset_f: f64,
    pub allow_override: bool,
}

/// Demand-response events announced by the utility, in start order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UtilityPort {
    pending: VecDeque<DemandResponseEvent>,
}

impl UtilityPort {
    pub fn announce(&mut self, event: DemandResponseEvent) {
        let at = self
            .pending
            .partition_point(|e| e.start_s <= event.start_s);
        self.pending.insert(at, event);
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn is_due(&self, now_s: f64) -> bool {
        self.pending.front().is_some_and(|e| e.start_s <= now_s)
    }

    /// Next event that has started by `now_s`. Events that already ended
    /// are discarded.
    pub(crate) fn take_due(&mut self, now_s: f64) -> Option<DemandResponseEvent> {
        while let Some(event) = self.pending.front().copied() {
            if event.start_s > now_s {
                return None;
            }
            self.pending.pop_front();
            if event.until_s > now_s {
                return Some(event);
            }
        }
        None
    }
}

/// Everything the house tasks share.
#[derive(Debug)]
pub struct House {
    pub sim: ThermalSimulator,
    pub layout: HouseLayout,
    pub units: UnitPair<EquipmentPort>,
    pub control: ControlBus,
    pub supervisor: SetpointBus,
    pub panel: UserPanel,
    pub utility: UtilityPort,
}

impl House {
    pub fn node(&self, kind: UnitKind) -> NodeId {
        match kind {
            UnitKind::Heater => self.layout.heater,
            UnitKind::Cooler => self.layout.cooler,
        }
    }

    pub fn inside_temperature(&self) -> HouseResult<f64> {
        Ok(self.sim.network().temperature(self.layout.air)?)
    }

    pub fn outside_temperature(&self) -> f64 {
        self.sim.network().inputs().outside_f
    }

    /// Electrical draw of the whole house at the last refresh (W).
    pub fn power_w(&self) -> f64 {
        self.sim.network().total_power_w()
    }

    pub fn setpoint(&self) -> f64 {
        self.control.setpoint_f
    }

    pub fn duct_temperature(&self, kind: UnitKind) -> HouseResult<f64> {
        Ok(self.sim.network().probe(self.node(kind))?.duct_temp_f)
    }

    /// Switch the fan and element of a unit and refresh the network outputs.
    pub fn apply_equipment(&mut self, kind: UnitKind, fan: bool, element: bool) -> HouseResult<()> {
        let node = self.node(kind);
        let network = self.sim.network_mut();
        let hvac = network.hvac_mut(node)?;
        hvac.set_fan(fan);
        hvac.set_element(element);
        network.refresh();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start_s: f64, until_s: f64) -> DemandResponseEvent {
        DemandResponseEvent {
            start_s,
            until_s,
            offset_f: 2.0,
            allow_override: false,
        }
    }

    #[test]
    fn utility_releases_events_in_start_order() {
        let mut port = UtilityPort::default();
        port.announce(event(500.0, 600.0));
        port.announce(event(100.0, 200.0));
        assert!(!port.is_due(50.0));
        assert_eq!(port.take_due(150.0), Some(event(100.0, 200.0)));
        assert_eq!(port.take_due(150.0), None);
        assert_eq!(port.pending(), 1);
    }

    #[test]
    fn expired_events_are_skipped() {
        let mut port = UtilityPort::default();
        port.announce(event(0.0, 10.0));
        port.announce(event(20.0, 100.0));
        assert_eq!(port.take_due(50.0), Some(event(20.0, 100.0)));
        assert_eq!(port.pending(), 0);
    }

    #[test]
    fn panel_requests_are_consumed_once() {
        let mut panel = UserPanel::default();
        panel.modify_setpoint(1.0);
        panel.modify_setpoint(0.5);
        panel.modify_setpoint(f64::NAN);
        assert_eq!(panel.take_setpoint_delta(), Some(1.5));
        assert_eq!(panel.take_setpoint_delta(), None);
        panel.toggle_hold();
        assert!(panel.take_hold_toggle());
        assert!(!panel.take_hold_toggle());
    }

    #[test]
    fn new_setpoint_flag_clears_on_read() {
        let start = SimTime::new(hs_project::default_start(), 7.0 * 3600.0);
        let mut bus = SetpointBus::new(SetpointSchedule::default(), &start, false);
        assert_eq!(bus.setpoint_f(), 75.0);
        assert_eq!(bus.take_new_setpoint(), None);
        bus.publish(72.0);
        assert_eq!(bus.take_new_setpoint(), Some(72.0));
        assert_eq!(bus.take_new_setpoint(), None);
    }
}
