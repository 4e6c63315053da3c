//! Outdoor conditions driving the house.

use hs_core::SimTime;
use hs_project::{EnvironmentDef, WeatherRow};

/// Outdoor values pushed into the thermal network.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conditions {
    pub outside_f: f64,
    /// Solar radiation on the windows (BTU/(hr·ft²)).
    pub solar: f64,
}

pub trait Environment: std::fmt::Debug {
    fn conditions(&self, now: &SimTime) -> Conditions;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantEnvironment {
    pub conditions: Conditions,
}

impl Default for ConstantEnvironment {
    fn default() -> Self {
        Self {
            conditions: Conditions {
                outside_f: 100.0,
                solar: 0.0,
            },
        }
    }
}

impl Environment for ConstantEnvironment {
    fn conditions(&self, _now: &SimTime) -> Conditions {
        self.conditions
    }
}

/// Piecewise-linear weather table keyed by simulated seconds. Values are
/// held at the first and last rows outside the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEnvironment {
    rows: Vec<WeatherRow>,
}

impl TableEnvironment {
    /// Rows must be non-empty and strictly increasing in time; project
    /// validation guarantees both.
    pub fn new(rows: Vec<WeatherRow>) -> Self {
        Self { rows }
    }

    fn lerp(a: f64, b: f64, w: f64) -> f64 {
        a + (b - a) * w
    }
}

impl Environment for TableEnvironment {
    fn conditions(&self, now: &SimTime) -> Conditions {
        let t = now.seconds;
        let (first, last) = match (self.rows.first(), self.rows.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return ConstantEnvironment::default().conditions,
        };
        let row = if t <= first.t_s {
            *first
        } else if t >= last.t_s {
            *last
        } else {
            let hi = self.rows.partition_point(|r| r.t_s <= t);
            let (a, b) = (self.rows[hi - 1], self.rows[hi]);
            let w = (t - a.t_s) / (b.t_s - a.t_s);
            WeatherRow {
                t_s: t,
                outside_f: Self::lerp(a.outside_f, b.outside_f, w),
                solar: Self::lerp(a.solar, b.solar, w),
            }
        };
        Conditions {
            outside_f: row.outside_f,
            solar: row.solar,
        }
    }
}

pub fn from_def(def: &EnvironmentDef) -> Box<dyn Environment> {
    match def {
        EnvironmentDef::Constant {
            outside_f, solar, ..
        } => Box::new(ConstantEnvironment {
            conditions: Conditions {
                outside_f: *outside_f,
                solar: *solar,
            },
        }),
        EnvironmentDef::Table { rows, .. } => Box::new(TableEnvironment::new(rows.clone())),
    }
}
