use serde::{Deserialize, Serialize};

/// Which way a piece of equipment moves the room temperature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Heater,
    Cooler,
}

impl UnitKind {
    /// +1 for heating, -1 for cooling.
    pub fn sign(self) -> f64 {
        match self {
            UnitKind::Heater => 1.0,
            UnitKind::Cooler => -1.0,
        }
    }

    /// Duty-ratio range requested from the PID law.
    pub fn duty_range(self) -> (f64, f64) {
        match self {
            UnitKind::Heater => (0.0, 1.0),
            UnitKind::Cooler => (-1.0, 0.0),
        }
    }
}

/// Control law selected by the coordinator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlLaw {
    #[default]
    Hysteresis,
    Pid,
}

/// Thermostat system switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThermostatMode {
    Off,
    Heating,
    #[default]
    Cooling,
}

impl ThermostatMode {
    /// Unit driven in this mode, if any.
    pub fn unit(self) -> Option<UnitKind> {
        match self {
            ThermostatMode::Off => None,
            ThermostatMode::Heating => Some(UnitKind::Heater),
            ThermostatMode::Cooling => Some(UnitKind::Cooler),
        }
    }
}
