//! Four-state HVAC equipment sequencer.
//!
//! ```text
//! Off  --TURN_ON-->  Pre  --duct past fan-on threshold-->  On
//!  ^                  |  \                                 |
//!  |              TURN_OFF \--------TURN_ON-------+     TURN_OFF
//!  |                  v                           |        v
//!  +----duct past fan-off threshold----------- Post <------+
//! ```
//!
//! Pre energizes the element with the fan off so the coil is conditioned
//! before air is blown across it. Post keeps the fan running with the
//! element off to recover the energy left in the coil. Thresholds compare in
//! opposite directions for heaters and coolers.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::kind::UnitKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentState {
    Off,
    Pre,
    On,
    Post,
}

impl EquipmentState {
    pub const ALL: [EquipmentState; 4] = [
        EquipmentState::Off,
        EquipmentState::Pre,
        EquipmentState::On,
        EquipmentState::Post,
    ];

    pub fn index(self) -> usize {
        match self {
            EquipmentState::Off => 0,
            EquipmentState::Pre => 1,
            EquipmentState::On => 2,
            EquipmentState::Post => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EquipmentState::Off => "off",
            EquipmentState::Pre => "pre",
            EquipmentState::On => "on",
            EquipmentState::Post => "post",
        }
    }

    /// The unit counts as running while conditioning the coil or the room.
    pub fn is_on(self) -> bool {
        matches!(self, EquipmentState::Pre | EquipmentState::On)
    }

    /// Fan and element settings applied when the state is entered.
    pub fn outputs(self) -> EquipmentOutputs {
        let (fan, element) = match self {
            EquipmentState::Off => (false, false),
            EquipmentState::Pre => (false, true),
            EquipmentState::On => (true, true),
            EquipmentState::Post => (true, false),
        };
        EquipmentOutputs { fan, element }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentCommand {
    #[default]
    TurnOff,
    TurnOn,
}

impl From<bool> for EquipmentCommand {
    fn from(on: bool) -> Self {
        if on {
            EquipmentCommand::TurnOn
        } else {
            EquipmentCommand::TurnOff
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentOutputs {
    pub fan: bool,
    pub element: bool,
}

/// Duct temperatures (°F) at which the fan starts and stops.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanThresholds {
    pub fan_on_f: f64,
    pub fan_off_f: f64,
}

impl FanThresholds {
    pub fn baseline(kind: UnitKind) -> Self {
        match kind {
            UnitKind::Heater => Self {
                fan_on_f: 90.0,
                fan_off_f: 90.0,
            },
            UnitKind::Cooler => Self {
                fan_on_f: 60.0,
                fan_off_f: 60.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentSequencer {
    kind: UnitKind,
    thresholds: FanThresholds,
}

impl EquipmentSequencer {
    pub fn new(kind: UnitKind, thresholds: FanThresholds) -> ControlResult<Self> {
        if !thresholds.fan_on_f.is_finite() || !thresholds.fan_off_f.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "fan thresholds must be finite",
            });
        }
        Ok(Self { kind, thresholds })
    }

    pub fn kind(&self) -> UnitKind {
        self.kind
    }

    pub fn thresholds(&self) -> FanThresholds {
        self.thresholds
    }

    /// Transition out of `state` given the latest command and duct
    /// temperature. A command always overrides a threshold crossing.
    pub fn next(
        &self,
        state: EquipmentState,
        command: EquipmentCommand,
        duct_f: f64,
    ) -> EquipmentState {
        // Positive once the duct has crossed the threshold in the direction
        // this unit drives it.
        let past = |threshold: f64| self.kind.sign() * (duct_f - threshold) > 0.0;
        match (state, command) {
            (EquipmentState::Off, EquipmentCommand::TurnOn) => EquipmentState::Pre,
            (EquipmentState::Off, EquipmentCommand::TurnOff) => EquipmentState::Off,
            (EquipmentState::Pre, EquipmentCommand::TurnOff) => EquipmentState::Post,
            (EquipmentState::Pre, EquipmentCommand::TurnOn) => {
                if past(self.thresholds.fan_on_f) {
                    EquipmentState::On
                } else {
                    EquipmentState::Pre
                }
            }
            (EquipmentState::On, EquipmentCommand::TurnOff) => EquipmentState::Post,
            (EquipmentState::On, EquipmentCommand::TurnOn) => EquipmentState::On,
            (EquipmentState::Post, EquipmentCommand::TurnOn) => EquipmentState::Pre,
            (EquipmentState::Post, EquipmentCommand::TurnOff) => {
                if past(self.thresholds.fan_off_f) {
                    EquipmentState::Post
                } else {
                    EquipmentState::Off
                }
            }
        }
    }
}
