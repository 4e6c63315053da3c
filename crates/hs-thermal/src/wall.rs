//! Conductive wall node.

use hs_core::NodeId;

use crate::error::ThermalResult;
use crate::params::WallParams;

/// Specific heat of wall material, BTU/(lb·°F).
pub const WALL_CP: f64 = 0.29;

#[derive(Clone, Debug, PartialEq)]
pub struct WallUnit {
    pub mass_lb: f64,
    pub k_air: f64,
    pub k_ambient: f64,
    /// Node on the conditioned side of the wall.
    pub neighbor: NodeId,
}

impl WallUnit {
    pub fn new(params: &WallParams, neighbor: NodeId) -> ThermalResult<Self> {
        hs_core::ensure_positive(params.mass_lb, "wall mass")?;
        let k_air = non_negative(params.k_air, "wall air conductance")?;
        let k_ambient = non_negative(params.k_ambient, "wall ambient conductance")?;
        Ok(Self {
            mass_lb: params.mass_lb,
            k_air,
            k_ambient,
            neighbor,
        })
    }

    /// Interior wall: no path to outside air.
    pub fn interior(params: &WallParams, neighbor: NodeId) -> ThermalResult<Self> {
        let mut wall = Self::new(params, neighbor)?;
        wall.k_ambient = 0.0;
        Ok(wall)
    }

    /// Heat flowing from the neighbor into the wall (BTU/s).
    pub fn q_from_air(&self, wall_f: f64, neighbor_f: f64) -> f64 {
        (neighbor_f - wall_f) * self.k_air
    }

    pub fn derivative(&self, wall_f: f64, neighbor_f: f64, outside_f: f64) -> f64 {
        let q_amb = (outside_f - wall_f) * self.k_ambient;
        (self.q_from_air(wall_f, neighbor_f) + q_amb) / (WALL_CP * self.mass_lb)
    }
}

fn non_negative(v: f64, what: &'static str) -> ThermalResult<f64> {
    let v = hs_core::ensure_finite(v, what)?;
    if v < 0.0 {
        return Err(crate::ThermalError::InvalidArg { what });
    }
    Ok(v)
}
