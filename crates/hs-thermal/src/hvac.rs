//! Heater and cooler model.
//!
//! Both kinds share one lumped coil model and differ only in their constants
//! and in how the element's heat input turns into delivered heat and
//! electrical power.
//!
//! ## Model
//!
//! ```text
//! fan on:   Q_air = k1 (Tc - Ti) (1 + k3 (exp(-1/k3) - 1))
//!           T_out = Ti + (Tc - Ti) (1 - exp(-1/k3))
//! fan off:  Q_air = 0,  T_out = Tc
//! Q_amb = (Tc - T_amb) k2
//! dTc/dt = (Q_out - Q_amb - Q_air) / (cp m)
//! ```

use hs_core::{NodeId, btu_per_s_to_watts};
use hs_core::units::BTU_PER_WATT_HOUR;

use crate::error::{ThermalError, ThermalResult};
use crate::params::HvacParams;

/// Specific heat of the coil (aluminium), BTU/(lb·°F).
pub const COIL_CP: f64 = 0.2;

/// Outdoor temperature (°F) at which the cooler's SEER is rated.
pub const COOLING_REFERENCE_F: f64 = 82.0;

// Capacity and COP correction curves for the cooler.
const CAP_SLOPE: f64 = -0.0064;
const CAP_INTERCEPT: f64 = 1.61;
const COP_SLOPE: f64 = -0.015;
const COP_INTERCEPT: f64 = 2.43;
/// Cycling degradation coefficient.
const CYCLING_DEGRADATION: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HvacKind {
    Heater,
    Cooler,
}

impl HvacKind {
    pub fn label(self) -> &'static str {
        match self {
            HvacKind::Heater => "heater",
            HvacKind::Cooler => "cooler",
        }
    }
}

/// Values computed from the current state before any derivative is taken.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HvacFlows {
    pub duct_temp_f: f64,
    pub fan_flow_lbps: f64,
    pub q_to_air: f64,
    pub q_to_ambient: f64,
    pub q_out: f64,
    pub power_w: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HvacUnit {
    pub kind: HvacKind,
    pub mass_lb: f64,
    pub k1: f64,
    pub k2: f64,
    pub k3: f64,
    /// Temperature around the cabinet (°F).
    pub ambient_f: f64,
    pub fan_max_lbps: f64,
    pub capacity_btu_per_s: f64,
    pub efficiency: f64,
    /// Node the fan draws its air from.
    pub inlet: NodeId,
    fan_on: bool,
    element_on: bool,
}

impl HvacUnit {
    pub fn heater(params: &HvacParams, inlet: NodeId) -> ThermalResult<Self> {
        validate(params)?;
        if params.capacity_btu_per_s < 0.0 {
            return Err(ThermalError::InvalidArg {
                what: "heater capacity must be non-negative",
            });
        }
        Ok(Self::build(
            HvacKind::Heater,
            params,
            inlet,
            params.capacity_btu_per_s / 10.0,
            0.05,
            1.0,
        ))
    }

    pub fn cooler(params: &HvacParams, inlet: NodeId) -> ThermalResult<Self> {
        validate(params)?;
        if params.capacity_btu_per_s > 0.0 {
            return Err(ThermalError::InvalidArg {
                what: "cooler capacity must be non-positive",
            });
        }
        Ok(Self::build(
            HvacKind::Cooler,
            params,
            inlet,
            params.capacity_btu_per_s.abs() / 16.0,
            0.01,
            0.6,
        ))
    }

    fn build(
        kind: HvacKind,
        params: &HvacParams,
        inlet: NodeId,
        k1: f64,
        k2: f64,
        k3: f64,
    ) -> Self {
        Self {
            kind,
            mass_lb: params.mass_lb,
            k1,
            k2,
            k3,
            ambient_f: 90.0,
            fan_max_lbps: params.fan_max_lbps,
            capacity_btu_per_s: params.capacity_btu_per_s,
            efficiency: params.efficiency,
            inlet,
            fan_on: false,
            element_on: false,
        }
    }

    pub fn set_fan(&mut self, on: bool) {
        self.fan_on = on;
    }

    pub fn set_element(&mut self, on: bool) {
        self.element_on = on;
    }

    pub fn fan_on(&self) -> bool {
        self.fan_on
    }

    pub fn element_on(&self) -> bool {
        self.element_on
    }

    pub fn fan_flow(&self) -> f64 {
        if self.fan_on { self.fan_max_lbps } else { 0.0 }
    }

    pub fn heat_input(&self) -> f64 {
        if self.element_on {
            self.capacity_btu_per_s
        } else {
            0.0
        }
    }

    /// Evaluate heat flows for coil temperature `core_f`, fan inlet
    /// temperature `inlet_f` and outdoor temperature `outside_f`.
    pub fn flows(&self, core_f: f64, inlet_f: f64, outside_f: f64) -> HvacFlows {
        let fan_flow = self.fan_flow();
        let (q_to_air, duct_temp_f) = if fan_flow > 0.0 {
            let decay = (-1.0 / self.k3).exp();
            (
                self.k1 * (core_f - inlet_f) * (1.0 + self.k3 * (decay - 1.0)),
                inlet_f + (core_f - inlet_f) * (1.0 - decay),
            )
        } else {
            (0.0, core_f)
        };
        let q_to_ambient = (core_f - self.ambient_f) * self.k2;

        let heat_input = self.heat_input();
        let (q_out, power_w) = match self.kind {
            HvacKind::Heater => (heat_input * self.efficiency, btu_per_s_to_watts(heat_input)),
            HvacKind::Cooler => cooler_output(heat_input, self.efficiency, outside_f, inlet_f),
        };
        let power_w = if self.element_on { power_w } else { 0.0 };

        HvacFlows {
            duct_temp_f,
            fan_flow_lbps: fan_flow,
            q_to_air,
            q_to_ambient,
            q_out,
            power_w,
        }
    }

    pub fn derivative(&self, flows: &HvacFlows) -> f64 {
        (flows.q_out - flows.q_to_ambient - flows.q_to_air) / (COIL_CP * self.mass_lb)
    }
}

fn validate(params: &HvacParams) -> ThermalResult<()> {
    hs_core::ensure_positive(params.mass_lb, "HVAC mass")?;
    hs_core::ensure_finite(params.capacity_btu_per_s, "HVAC capacity")?;
    hs_core::ensure_finite(params.efficiency, "HVAC efficiency")?;
    if !params.fan_max_lbps.is_finite() || params.fan_max_lbps < 0.0 {
        return Err(ThermalError::InvalidArg {
            what: "fan flow must be non-negative",
        });
    }
    if params.capacity_btu_per_s == 0.0 {
        return Err(ThermalError::InvalidArg {
            what: "HVAC capacity must be non-zero",
        });
    }
    Ok(())
}

/// Delivered heat (BTU/s) and electrical power (W) of a cooler.
///
/// The rated SEER is corrected by linear curves in outdoor and indoor
/// temperature. A corrected COP of exactly zero yields `+inf` power.
pub fn cooler_output(heat_input: f64, seer: f64, outside_f: f64, inside_f: f64) -> (f64, f64) {
    let cfo = CAP_SLOPE * outside_f + CAP_INTERCEPT;
    let cfi = CAP_SLOPE * inside_f + CAP_INTERCEPT;
    let q_out = heat_input * cfo * cfi;

    let cop_rated = seer / (BTU_PER_WATT_HOUR * (1.0 - 0.5 * CYCLING_DEGRADATION));
    let cop_reference = cop_rated / (COP_SLOPE * COOLING_REFERENCE_F + COP_INTERCEPT);
    let cop = cop_reference * cfi * cfo;
    let power_w = if cop != 0.0 {
        (-q_out / (cop * BTU_PER_WATT_HOUR)) * 3600.0
    } else {
        f64::INFINITY
    };
    (q_out, power_w)
}
