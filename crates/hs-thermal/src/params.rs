//! Physical parameters of the simulated house.
//!
//! Imperial units throughout: °F, lb, BTU/s, lb/s, ft².

use serde::{Deserialize, Serialize};

/// Density of air, lb/ft³.
const AIR_DENSITY: f64 = 0.075;

/// Parameters shared by the heater and cooler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HvacParams {
    /// Coil and cabinet mass (lb).
    pub mass_lb: f64,
    /// Fan mass flow when running (lb/s).
    pub fan_max_lbps: f64,
    /// Element heat input when energized (BTU/s). Negative for a cooler.
    pub capacity_btu_per_s: f64,
    /// COP for a heater, SEER for a cooler.
    pub efficiency: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WallParams {
    pub mass_lb: f64,
    /// Conductance to room air (BTU/(s·°F)).
    pub k_air: f64,
    /// Conductance to outside air (BTU/(s·°F)). Zero for interior walls.
    pub k_ambient: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AirParams {
    pub mass_lb: f64,
    pub window_area_ft2: f64,
    /// Constant gain from appliances and occupants (BTU/s).
    pub internal_load_btu_per_s: f64,
    /// Outside air leaking in (lb/s).
    pub infiltration_lbps: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThermalParams {
    /// Starting temperature of every node (°F).
    pub initial_temp_f: f64,
    pub heater: HvacParams,
    pub cooler: HvacParams,
    pub air: AirParams,
    pub interior_wall: WallParams,
    pub exterior_wall: WallParams,
}

impl Default for ThermalParams {
    /// Baseline single-family house with a gas furnace and a 4 ton AC.
    fn default() -> Self {
        let fan_max = (2400.0 * AIR_DENSITY) / 60.0;
        Self {
            initial_temp_f: 76.6,
            heater: HvacParams {
                mass_lb: 30.0,
                fan_max_lbps: fan_max,
                capacity_btu_per_s: 70_000.0 / 3600.0,
                efficiency: 0.95 * 55.0,
            },
            cooler: HvacParams {
                mass_lb: 100.0,
                fan_max_lbps: fan_max,
                capacity_btu_per_s: -(4.0 * 12_000.0) / 3600.0,
                efficiency: 14.0,
            },
            air: AirParams {
                mass_lb: 1476.67 * 9.0 * AIR_DENSITY,
                window_area_ft2: 225.0,
                internal_load_btu_per_s: 2880.0 / 3600.0,
                infiltration_lbps: (8325.0 * AIR_DENSITY) / 3600.0,
            },
            interior_wall: WallParams {
                mass_lb: (740.0 + 2.0 * 13_290.0) * 0.5 * 5.0,
                k_air: 500.0,
                k_ambient: 0.0,
            },
            exterior_wall: WallParams {
                mass_lb: 1581.0 * 0.8 * 17.0,
                k_air: 0.6475,
                k_ambient: 0.6475,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_signs() {
        let p = ThermalParams::default();
        assert!(p.heater.capacity_btu_per_s > 0.0);
        assert!(p.cooler.capacity_btu_per_s < 0.0);
        assert_eq!(p.interior_wall.k_ambient, 0.0);
        assert!((p.heater.fan_max_lbps - 3.0).abs() < 1e-12);
        assert!((p.air.internal_load_btu_per_s - 0.8).abs() < 1e-12);
    }

    #[test]
    fn empty_document_is_baseline() {
        let p: ThermalParams = serde_json::from_str("{}").unwrap();
        assert_eq!(p, ThermalParams::default());
    }
}
