//! PID law producing an equipment duty ratio.
//!
//! Sampled operation with:
//! - first-order filtered derivative
//! - output clamped to the unit's duty range
//! - anti-windup (integral frozen while saturated)

use crate::error::{ControlError, ControlResult};
use crate::kind::UnitKind;
use serde::{Deserialize, Serialize};

/// Tunable gains, stored in the project file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PidGains {
    /// Proportional gain (duty per °F).
    pub kp: f64,
    /// Integral time constant (seconds).
    pub ti: f64,
    /// Derivative time constant (seconds).
    pub td: f64,
    /// Derivative filter time constant (seconds).
    pub td_filter: f64,
}

impl Default for PidGains {
    fn default() -> Self {
        Self {
            kp: 1.0,
            ti: 1800.0,
            td: 0.0,
            td_filter: 60.0,
        }
    }
}

/// PID controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PIDController {
    pub kp: f64,
    pub ti: f64,
    pub td: f64,
    pub td_filter: f64,
    pub out_min: f64,
    pub out_max: f64,
}

impl PIDController {
    pub fn new(
        kp: f64,
        ti: f64,
        td: f64,
        td_filter: f64,
        out_min: f64,
        out_max: f64,
    ) -> ControlResult<Self> {
        if !kp.is_finite() {
            return Err(ControlError::InvalidArg {
                what: "kp must be finite",
            });
        }
        if !(ti.is_finite() && ti > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "ti must be positive",
            });
        }
        if !(td.is_finite() && td >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "td must be non-negative",
            });
        }
        if !(td_filter.is_finite() && td_filter >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "td_filter must be non-negative",
            });
        }
        if out_min >= out_max {
            return Err(ControlError::InvalidArg {
                what: "out_min must be less than out_max",
            });
        }
        Ok(Self {
            kp,
            ti,
            td,
            td_filter,
            out_min,
            out_max,
        })
    }

    /// Controller whose output is clamped to the duty range of `kind`:
    /// `[0, 1]` for heating, `[-1, 0]` for cooling.
    pub fn for_unit(kind: UnitKind, gains: PidGains) -> ControlResult<Self> {
        let (lo, hi) = kind.duty_range();
        Self::new(gains.kp, gains.ti, gains.td, gains.td_filter, lo, hi)
    }

    /// Compute the next output for process variable `pv` and setpoint `sp`.
    ///
    /// Returns the updated state and the clamped output. A non-positive `dt`
    /// leaves the state untouched and returns the proportional term only.
    pub fn update(
        &self,
        state: &PIDControllerState,
        pv: f64,
        sp: f64,
        dt: f64,
    ) -> (PIDControllerState, f64) {
        let error = sp - pv;
        let p_term = self.kp * error;
        let ki = self.kp / self.ti;

        if dt <= 0.0 {
            let output = (p_term + ki * state.integral).clamp(self.out_min, self.out_max);
            return (state.clone(), output);
        }

        let new_integral = state.integral + error * dt;
        let i_term = ki * new_integral;

        // The first sample seeds the filter so there is no derivative kick.
        let previous = if state.primed {
            state.filtered_error
        } else {
            error
        };
        let alpha = self.td_filter / (self.td_filter + dt);
        let filtered_error = alpha * previous + (1.0 - alpha) * error;
        let d_term = self.kp * self.td * (filtered_error - previous) / dt;

        let output_raw = p_term + i_term + d_term;
        let output = output_raw.clamp(self.out_min, self.out_max);

        let integral = if output == output_raw {
            new_integral
        } else {
            state.integral
        };

        let new_state = PIDControllerState {
            integral,
            filtered_error,
            primed: true,
        };
        (new_state, output)
    }
}

/// PID controller state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PIDControllerState {
    /// Integral accumulator (°F·s).
    pub integral: f64,
    /// Filtered error for the derivative term.
    pub filtered_error: f64,
    primed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn heating_output_is_positive_below_setpoint() {
        let pid = PIDController::for_unit(UnitKind::Heater, PidGains::default()).unwrap();
        let (_, out) = pid.update(&PIDControllerState::default(), 74.5, 75.0, 5.0);
        assert!(out > 0.0 && out <= 1.0);
        let (_, out) = pid.update(&PIDControllerState::default(), 76.0, 75.0, 5.0);
        assert_eq!(out, 0.0);
    }

    #[test]
    fn cooling_output_is_negative_above_setpoint() {
        let pid = PIDController::for_unit(UnitKind::Cooler, PidGains::default()).unwrap();
        let (_, out) = pid.update(&PIDControllerState::default(), 75.5, 75.0, 5.0);
        assert!((out + 0.5).abs() < 0.01);
        let (_, out) = pid.update(&PIDControllerState::default(), 80.0, 75.0, 5.0);
        assert_eq!(out, -1.0);
    }

    #[test]
    fn integral_accumulates_while_unsaturated() {
        let pid = PIDController::new(0.1, 10.0, 0.0, 0.0, -10.0, 10.0).unwrap();
        let mut state = PIDControllerState::default();
        for _ in 0..10 {
            state = pid.update(&state, 0.0, 1.0, 0.1).0;
        }
        assert!((state.integral - 1.0).abs() < 1e-9);
    }

    #[test]
    fn saturation_freezes_integral() {
        let pid = PIDController::for_unit(UnitKind::Heater, PidGains::default()).unwrap();
        let mut state = PIDControllerState::default();
        for _ in 0..100 {
            state = pid.update(&state, 60.0, 75.0, 5.0).0;
        }
        assert_eq!(state.integral, 0.0);
    }

    #[test]
    fn first_sample_has_no_derivative_kick() {
        let gains = PidGains {
            td: 100.0,
            ..PidGains::default()
        };
        let pid = PIDController::new(gains.kp, gains.ti, gains.td, gains.td_filter, -100.0, 100.0)
            .unwrap();
        let (_, out) = pid.update(&PIDControllerState::default(), 74.0, 75.0, 1.0);
        let expected = 1.0 + 1.0 / 1800.0;
        assert!((out - expected).abs() < 1e-9);
    }

    #[test]
    fn invalid_params() {
        assert!(PIDController::new(1.0, -1.0, 0.0, 0.0, 0.0, 1.0).is_err());
        assert!(PIDController::new(1.0, 1.0, 0.0, 0.0, 1.0, 0.0).is_err());
        assert!(PIDController::new(1.0, 1.0, -0.5, 0.1, 0.0, 1.0).is_err());
        assert!(PIDController::new(f64::NAN, 1.0, 0.0, 0.1, 0.0, 1.0).is_err());
    }

    proptest! {
        #[test]
        fn output_stays_in_duty_range(
            pv in 40.0_f64..110.0,
            sp in 55.0_f64..90.0,
            integral in -1e5_f64..1e5,
            heater in any::<bool>(),
        ) {
            let kind = if heater { UnitKind::Heater } else { UnitKind::Cooler };
            let pid = PIDController::for_unit(kind, PidGains::default()).unwrap();
            let state = PIDControllerState { integral, ..PIDControllerState::default() };
            let (_, out) = pid.update(&state, pv, sp, 5.0);
            let (lo, hi) = kind.duty_range();
            prop_assert!(out >= lo && out <= hi);
        }
    }
}
