//! Project validation logic.

use hs_controls::{
    BoxcarFilter, EquipmentSequencer, Hysteresis, PIDController, PwmModulator, UnitKind,
};
use hs_thermal::{HvacParams, ThermalParams, WallParams};

use crate::schema::{EnvironmentDef, Project, RunDef};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Invalid {section}: {reason}")]
    InvalidSection { section: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: &str, value: f64, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn section(section: &str, err: impl std::fmt::Display) -> ValidationError {
    ValidationError::InvalidSection {
        section: section.to_string(),
        reason: err.to_string(),
    }
}

fn positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn non_negative(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be non-negative"))
    }
}

fn finite(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be finite"))
    }
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    validate_thermal(&project.thermal)?;
    project
        .solver
        .validate()
        .map_err(|e| section("solver", e))?;

    positive("equipment.period_s", project.equipment.period_s)?;
    for kind in [UnitKind::Heater, UnitKind::Cooler] {
        EquipmentSequencer::new(kind, project.equipment.thresholds(kind))
            .map_err(|e| section("equipment", e))?;
    }

    let t = &project.thermostat;
    positive("thermostat.control_dt_s", t.control_dt_s)?;
    for kind in [UnitKind::Heater, UnitKind::Cooler] {
        Hysteresis::new(kind, t.hysteresis.band_f, t.hysteresis.anticipator_f)
            .map_err(|e| section("thermostat.hysteresis", e))?;
        PIDController::for_unit(kind, t.pid).map_err(|e| section("thermostat.pid", e))?;
        PwmModulator::new(kind, t.pwm_period_s).map_err(|e| section("thermostat", e))?;
    }
    BoxcarFilter::for_window(t.filter_window_s, t.control_dt_s)
        .map_err(|e| section("thermostat", e))?;

    validate_environment(&project.environment)?;

    for (i, event) in project.demand_response.iter().enumerate() {
        let field = |name: &str| format!("demand_response[{i}].{name}");
        non_negative(&field("start_s"), event.start_s)?;
        finite(&field("offset_f"), event.offset_f)?;
        if !(event.until_s.is_finite() && event.until_s > event.start_s) {
            return Err(invalid(
                &field("until_s"),
                event.until_s,
                "must be after start_s",
            ));
        }
    }

    validate_run(&project.run)
}

fn validate_hvac(name: &str, p: &HvacParams, sign: f64) -> Result<(), ValidationError> {
    positive(&format!("thermal.{name}.mass_lb"), p.mass_lb)?;
    non_negative(&format!("thermal.{name}.fan_max_lbps"), p.fan_max_lbps)?;
    non_negative(&format!("thermal.{name}.efficiency"), p.efficiency)?;
    let cap = p.capacity_btu_per_s;
    if !(cap.is_finite() && sign * cap > 0.0) {
        let reason = if sign > 0.0 {
            "heater capacity must be positive"
        } else {
            "cooler capacity must be negative"
        };
        return Err(invalid(
            &format!("thermal.{name}.capacity_btu_per_s"),
            cap,
            reason,
        ));
    }
    Ok(())
}

fn validate_wall(name: &str, p: &WallParams) -> Result<(), ValidationError> {
    positive(&format!("thermal.{name}.mass_lb"), p.mass_lb)?;
    non_negative(&format!("thermal.{name}.k_air"), p.k_air)?;
    non_negative(&format!("thermal.{name}.k_ambient"), p.k_ambient)
}

fn validate_thermal(p: &ThermalParams) -> Result<(), ValidationError> {
    finite("thermal.initial_temp_f", p.initial_temp_f)?;
    validate_hvac("heater", &p.heater, 1.0)?;
    validate_hvac("cooler", &p.cooler, -1.0)?;
    positive("thermal.air.mass_lb", p.air.mass_lb)?;
    non_negative("thermal.air.window_area_ft2", p.air.window_area_ft2)?;
    finite(
        "thermal.air.internal_load_btu_per_s",
        p.air.internal_load_btu_per_s,
    )?;
    non_negative("thermal.air.infiltration_lbps", p.air.infiltration_lbps)?;
    validate_wall("interior_wall", &p.interior_wall)?;
    if p.interior_wall.k_ambient != 0.0 {
        return Err(invalid(
            "thermal.interior_wall.k_ambient",
            p.interior_wall.k_ambient,
            "interior walls have no ambient coupling",
        ));
    }
    validate_wall("exterior_wall", &p.exterior_wall)
}

fn validate_environment(env: &EnvironmentDef) -> Result<(), ValidationError> {
    positive("environment.period_s", env.period_s())?;
    match env {
        EnvironmentDef::Constant {
            outside_f, solar, ..
        } => {
            finite("environment.outside_f", *outside_f)?;
            non_negative("environment.solar", *solar)
        }
        EnvironmentDef::Table { rows, .. } => {
            if rows.is_empty() {
                return Err(section("environment", "weather table has no rows"));
            }
            for (i, row) in rows.iter().enumerate() {
                finite(&format!("environment.rows[{i}].t_s"), row.t_s)?;
                finite(&format!("environment.rows[{i}].outside_f"), row.outside_f)?;
                non_negative(&format!("environment.rows[{i}].solar"), row.solar)?;
            }
            if let Some(i) = rows.windows(2).position(|w| w[1].t_s <= w[0].t_s) {
                return Err(invalid(
                    &format!("environment.rows[{}].t_s", i + 1),
                    rows[i + 1].t_s,
                    "rows must be strictly increasing in time",
                ));
            }
            Ok(())
        }
    }
}

fn validate_run(run: &RunDef) -> Result<(), ValidationError> {
    positive("run.dt_s", run.dt_s)?;
    non_negative("run.t_end_s", run.t_end_s)?;
    non_negative("run.settle_s", run.settle_s)
}
