//! Project schema definitions.
//!
//! Every section has a default so an empty document describes the baseline
//! house: 100 °F outside, cooling to 75 °F under hysteresis control.

use chrono::{NaiveDate, NaiveDateTime};
use hs_controls::{ControlLaw, FanThresholds, PidGains, SetpointSchedule, ThermostatMode, UnitKind};
use hs_sim::SolverOptions;
use hs_thermal::ThermalParams;
use serde::{Deserialize, Serialize};

use crate::migrate::LATEST_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Project {
    pub version: u32,
    pub name: String,
    /// Calendar time at t = 0.
    pub start: NaiveDateTime,
    pub thermal: ThermalParams,
    pub equipment: EquipmentDef,
    pub thermostat: ThermostatDef,
    pub solver: SolverOptions,
    pub environment: EnvironmentDef,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub demand_response: Vec<DemandResponseDef>,
    pub run: RunDef,
}

/// Monday 2024-07-01, midnight.
pub fn default_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 7, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl Default for Project {
    fn default() -> Self {
        Self {
            version: LATEST_VERSION,
            name: "baseline".to_string(),
            start: default_start(),
            thermal: ThermalParams::default(),
            equipment: EquipmentDef::default(),
            thermostat: ThermostatDef::default(),
            solver: SolverOptions::default(),
            environment: EnvironmentDef::default(),
            demand_response: Vec::new(),
            run: RunDef::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EquipmentDef {
    /// Sequencer period (s).
    pub period_s: f64,
    pub heater: FanThresholds,
    pub cooler: FanThresholds,
}

impl Default for EquipmentDef {
    fn default() -> Self {
        Self {
            period_s: 1.0,
            heater: FanThresholds::baseline(UnitKind::Heater),
            cooler: FanThresholds::baseline(UnitKind::Cooler),
        }
    }
}

impl EquipmentDef {
    pub fn thresholds(&self, kind: UnitKind) -> FanThresholds {
        match kind {
            UnitKind::Heater => self.heater,
            UnitKind::Cooler => self.cooler,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThermostatDef {
    pub law: ControlLaw,
    pub mode: ThermostatMode,
    /// Start in hold with the schedule's current value.
    pub hold: bool,
    /// Period of the control-law, coordinator and supervisor tasks (s).
    pub control_dt_s: f64,
    pub hysteresis: HysteresisDef,
    pub pid: PidGains,
    /// PWM cycle length (s).
    pub pwm_period_s: f64,
    /// Boxcar window applied to the inside temperature (s).
    pub filter_window_s: f64,
    pub schedule: SetpointSchedule,
}

impl Default for ThermostatDef {
    fn default() -> Self {
        Self {
            law: ControlLaw::Hysteresis,
            mode: ThermostatMode::Cooling,
            hold: false,
            control_dt_s: 5.0,
            hysteresis: HysteresisDef::default(),
            pid: PidGains::default(),
            pwm_period_s: 15.0 * 60.0,
            filter_window_s: 60.0,
            schedule: SetpointSchedule::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HysteresisDef {
    pub band_f: f64,
    pub anticipator_f: f64,
}

impl Default for HysteresisDef {
    fn default() -> Self {
        Self {
            band_f: 0.6,
            anticipator_f: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum EnvironmentDef {
    Constant {
        #[serde(default = "default_outside_f")]
        outside_f: f64,
        #[serde(default)]
        solar: f64,
        #[serde(default = "default_environment_period")]
        period_s: f64,
    },
    /// Piecewise-linear weather table, clamped outside its time range.
    Table {
        rows: Vec<WeatherRow>,
        #[serde(default = "default_environment_period")]
        period_s: f64,
    },
}

fn default_outside_f() -> f64 {
    100.0
}

fn default_environment_period() -> f64 {
    60.0
}

impl Default for EnvironmentDef {
    fn default() -> Self {
        EnvironmentDef::Constant {
            outside_f: default_outside_f(),
            solar: 0.0,
            period_s: default_environment_period(),
        }
    }
}

impl EnvironmentDef {
    pub fn period_s(&self) -> f64 {
        match self {
            EnvironmentDef::Constant { period_s, .. } | EnvironmentDef::Table { period_s, .. } => {
                *period_s
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeatherRow {
    pub t_s: f64,
    pub outside_f: f64,
    /// Solar radiation on the windows (BTU/(hr·ft²)).
    #[serde(default)]
    pub solar: f64,
}

/// Utility demand-response event delivered to the goal seeker.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct DemandResponseDef {
    pub start_s: f64,
    pub until_s: f64,
    /// Setpoint relaxation (°F), applied in the energy-saving direction.
    pub offset_f: f64,
    /// Forward user setpoint changes that cost energy during the event.
    #[serde(default)]
    pub allow_override: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunDef {
    /// Driver tick (s).
    pub dt_s: f64,
    pub t_end_s: f64,
    /// Inside-temperature extremes are only tracked after this time (s).
    pub settle_s: f64,
}

impl Default for RunDef {
    fn default() -> Self {
        Self {
            dt_s: 5.0,
            t_end_s: 5.0 * 3600.0,
            settle_s: 2.0 * 3600.0,
        }
    }
}
