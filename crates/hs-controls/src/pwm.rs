//! Fixed-period pulse-width modulation of a duty ratio.

use crate::error::{ControlError, ControlResult};
use crate::kind::UnitKind;

/// Converts a duty ratio into an on/off signal with a fixed cycle period.
///
/// The duty is latched at the start of each cycle so a mid-cycle change
/// takes effect on the next one. Cycle boundaries stay on the initial
/// phase grid even if samples arrive late.
#[derive(Debug, Clone, PartialEq)]
pub struct PwmModulator {
    kind: UnitKind,
    period: f64,
    requested: f64,
    latched: f64,
    cycle_start: Option<f64>,
}

impl PwmModulator {
    pub fn new(kind: UnitKind, period: f64) -> ControlResult<Self> {
        if !(period.is_finite() && period > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "pwm period must be positive",
            });
        }
        Ok(Self {
            kind,
            period,
            requested: 0.0,
            latched: 0.0,
            cycle_start: None,
        })
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    /// Request a new signed duty ratio. Heaters use the positive part,
    /// coolers the negative part; out-of-range values are clamped.
    pub fn set_duty(&mut self, duty: f64) {
        self.requested = if duty.is_nan() { 0.0 } else { duty };
    }

    /// Duty fraction in `[0, 1]` applied during the current cycle.
    pub fn active_fraction(&self) -> f64 {
        self.latched
    }

    fn fraction(&self) -> f64 {
        (self.kind.sign() * self.requested).clamp(0.0, 1.0)
    }

    /// Start a fresh cycle at the next sample.
    pub fn reset(&mut self) {
        self.cycle_start = None;
        self.latched = 0.0;
    }

    /// Output at time `t` (seconds).
    pub fn output(&mut self, t: f64) -> bool {
        let start = match self.cycle_start {
            None => {
                self.latched = self.fraction();
                t
            }
            Some(start) if t >= start + self.period => {
                let cycles = ((t - start) / self.period).floor();
                self.latched = self.fraction();
                start + cycles * self.period
            }
            Some(start) => start,
        };
        self.cycle_start = Some(start);
        t - start < self.latched * self.period
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn on_time(pwm: &mut PwmModulator, from: f64, to: f64, dt: f64) -> f64 {
        let mut t = from;
        let mut on = 0.0;
        while t < to {
            if pwm.output(t) {
                on += dt;
            }
            t += dt;
        }
        on
    }

    #[test]
    fn heater_duty_sets_on_fraction() {
        let mut pwm = PwmModulator::new(UnitKind::Heater, 100.0).unwrap();
        pwm.set_duty(0.3);
        let on = on_time(&mut pwm, 0.0, 1000.0, 1.0);
        assert!((on - 300.0).abs() < 1e-9);
    }

    #[test]
    fn cooler_uses_negative_duty() {
        let mut pwm = PwmModulator::new(UnitKind::Cooler, 100.0).unwrap();
        pwm.set_duty(0.5);
        assert!(!pwm.output(0.0));
        pwm.reset();
        pwm.set_duty(-0.25);
        let on = on_time(&mut pwm, 0.0, 400.0, 1.0);
        assert!((on - 100.0).abs() < 1e-9);
    }

    #[test]
    fn out_of_range_duty_is_clamped() {
        let mut pwm = PwmModulator::new(UnitKind::Heater, 10.0).unwrap();
        pwm.set_duty(3.0);
        assert!(pwm.output(0.0));
        assert!(pwm.output(9.9));
        assert_eq!(pwm.active_fraction(), 1.0);
        pwm.set_duty(-2.0);
        assert!(!pwm.output(10.0));
        assert_eq!(pwm.active_fraction(), 0.0);
    }

    #[test]
    fn duty_change_waits_for_next_cycle() {
        let mut pwm = PwmModulator::new(UnitKind::Heater, 100.0).unwrap();
        pwm.set_duty(0.2);
        assert!(pwm.output(0.0));
        pwm.set_duty(0.9);
        assert!(!pwm.output(50.0));
        assert!(pwm.output(150.0));
    }

    #[test]
    fn late_sample_keeps_phase() {
        let mut pwm = PwmModulator::new(UnitKind::Heater, 100.0).unwrap();
        pwm.set_duty(0.1);
        assert!(pwm.output(0.0));
        // Cycle boundary is at 300, so 305 is inside the on window.
        assert!(pwm.output(305.0));
        assert!(!pwm.output(311.0));
    }

    #[test]
    fn rejects_bad_period() {
        assert!(PwmModulator::new(UnitKind::Heater, 0.0).is_err());
        assert!(PwmModulator::new(UnitKind::Heater, f64::INFINITY).is_err());
    }
}
