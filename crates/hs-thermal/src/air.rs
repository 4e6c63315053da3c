//! Room air node.
//!
//! Gains, all in BTU/s:
//! - infiltration: `m_inf cp (T_out - T)`
//! - solar through windows plus a constant internal load
//! - supply air from each HVAC duct: `m_fan cp (T_duct - T)`
//! - conduction into each wall (subtracted)

use hs_core::NodeId;

use crate::error::ThermalResult;
use crate::params::AirParams;

/// Specific heat of air, BTU/(lb·°F).
pub const AIR_CP: f64 = 0.24;

#[derive(Clone, Debug, PartialEq)]
pub struct AirUnit {
    pub mass_lb: f64,
    pub window_area_ft2: f64,
    pub internal_load_btu_per_s: f64,
    pub infiltration_lbps: f64,
    /// HVAC units blowing into the room.
    pub ducts: Vec<NodeId>,
    /// Walls exchanging heat with the room.
    pub walls: Vec<NodeId>,
}

/// Per-source breakdown of the heat entering the air (BTU/s).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AirGains {
    pub infiltration: f64,
    pub solar_and_internal: f64,
    pub ducts: f64,
    pub walls: f64,
}

impl AirGains {
    pub fn total(&self) -> f64 {
        self.infiltration + self.solar_and_internal + self.ducts + self.walls
    }
}

impl AirUnit {
    pub fn new(params: &AirParams, ducts: Vec<NodeId>, walls: Vec<NodeId>) -> ThermalResult<Self> {
        hs_core::ensure_positive(params.mass_lb, "air mass")?;
        hs_core::ensure_finite(params.window_area_ft2, "window area")?;
        hs_core::ensure_finite(params.internal_load_btu_per_s, "internal load")?;
        hs_core::ensure_finite(params.infiltration_lbps, "infiltration flow")?;
        Ok(Self {
            mass_lb: params.mass_lb,
            window_area_ft2: params.window_area_ft2,
            internal_load_btu_per_s: params.internal_load_btu_per_s,
            infiltration_lbps: params.infiltration_lbps,
            ducts,
            walls,
        })
    }

    pub fn infiltration_gain(&self, air_f: f64, outside_f: f64) -> f64 {
        self.infiltration_lbps * AIR_CP * (outside_f - air_f)
    }

    /// `solar` is irradiance in BTU/(hr·ft²).
    pub fn solar_and_internal_gain(&self, solar: f64) -> f64 {
        solar * self.window_area_ft2 / 3600.0 + self.internal_load_btu_per_s
    }

    pub fn duct_gain(air_f: f64, fan_flow_lbps: f64, duct_f: f64) -> f64 {
        fan_flow_lbps * AIR_CP * (duct_f - air_f)
    }

    pub fn derivative(&self, gains: &AirGains) -> f64 {
        gains.total() / (AIR_CP * self.mass_lb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ThermalParams;

    #[test]
    fn solar_gain_scales_with_window_area() {
        let air = AirUnit::new(&ThermalParams::default().air, vec![], vec![]).unwrap();
        let g0 = air.solar_and_internal_gain(0.0);
        let g1 = air.solar_and_internal_gain(3600.0);
        assert!((g0 - 0.8).abs() < 1e-12);
        assert!((g1 - g0 - 225.0).abs() < 1e-9);
    }

    #[test]
    fn no_mixing_without_flow() {
        assert_eq!(AirUnit::duct_gain(75.0, 0.0, 40.0), 0.0);
        assert!(AirUnit::duct_gain(75.0, 3.0, 50.0) < 0.0);
    }
}
