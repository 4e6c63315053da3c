//! Dead-band thermostat law.

use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};
use crate::kind::UnitKind;

/// Dead-band on/off controller.
///
/// The error is measured in the direction the unit pushes the room
/// (`sp - pv` for heating, `pv - sp` for cooling). While active the
/// anticipator is subtracted so the unit shuts off a little early and the
/// stored heat in the coil finishes the job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hysteresis {
    pub kind: UnitKind,
    /// Half-width of the dead band (°F).
    pub band: f64,
    /// Offset subtracted from the error while active (°F).
    pub anticipator: f64,
}

impl Hysteresis {
    pub fn new(kind: UnitKind, band: f64, anticipator: f64) -> ControlResult<Self> {
        if !(band.is_finite() && band > 0.0) {
            return Err(ControlError::InvalidArg {
                what: "hysteresis band must be positive",
            });
        }
        if !(anticipator.is_finite() && anticipator >= 0.0) {
            return Err(ControlError::InvalidArg {
                what: "anticipator must be non-negative",
            });
        }
        if anticipator >= band {
            return Err(ControlError::InvalidArg {
                what: "anticipator must be smaller than the band",
            });
        }
        Ok(Self {
            kind,
            band,
            anticipator,
        })
    }

    pub fn error(&self, sp: f64, pv: f64) -> f64 {
        self.kind.sign() * (sp - pv)
    }

    /// Next activation given the current one.
    pub fn update(&self, active: bool, sp: f64, pv: f64) -> bool {
        let e = self.error(sp, pv);
        if active {
            e - self.anticipator > -self.band
        } else {
            e > self.band
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn heating() -> Hysteresis {
        Hysteresis::new(UnitKind::Heater, 0.6, 0.1).unwrap()
    }

    #[test]
    fn heater_switches_at_band_edges() {
        let h = heating();
        assert!(!h.update(false, 75.0, 74.5));
        assert!(h.update(false, 75.0, 74.3));
        // On: stays on until pv - sp reaches band - anticipator.
        assert!(h.update(true, 75.0, 75.4));
        assert!(!h.update(true, 75.0, 75.6));
    }

    #[test]
    fn cooler_error_is_flipped() {
        let c = Hysteresis::new(UnitKind::Cooler, 0.6, 0.1).unwrap();
        assert!(c.update(false, 75.0, 75.7));
        assert!(!c.update(false, 75.0, 74.0));
        assert!(c.update(true, 75.0, 74.6));
        assert!(!c.update(true, 75.0, 74.4));
    }

    #[test]
    fn rejects_anticipator_wider_than_band() {
        assert!(Hysteresis::new(UnitKind::Heater, 0.5, 0.5).is_err());
        assert!(Hysteresis::new(UnitKind::Heater, 0.0, 0.0).is_err());
        assert!(Hysteresis::new(UnitKind::Heater, 0.5, -0.1).is_err());
    }

    proptest! {
        #[test]
        fn holds_steady_for_constant_input(
            pv in 60.0_f64..90.0,
            active in any::<bool>(),
            heater in any::<bool>(),
        ) {
            let kind = if heater { UnitKind::Heater } else { UnitKind::Cooler };
            let h = Hysteresis::new(kind, 0.6, 0.1).unwrap();
            let first = h.update(active, 75.0, pv);
            let mut state = first;
            for _ in 0..5 {
                state = h.update(state, 75.0, pv);
                prop_assert_eq!(state, first);
            }
        }

        #[test]
        fn monotone_sweep_switches_at_most_once_per_leg(
            start in 70.0_f64..80.0,
            rises in prop::collection::vec(0.0_f64..0.5, 1..40),
            falls in prop::collection::vec(0.0_f64..0.5, 1..40),
            heater in any::<bool>(),
        ) {
            let kind = if heater { UnitKind::Heater } else { UnitKind::Cooler };
            let h = Hysteresis::new(kind, 0.6, 0.1).unwrap();
            let mut pv = start;
            let mut on = h.update(false, 75.0, pv);
            let mut changes = 0;
            let mut step = |pv: f64, on: &mut bool, pv_rising: bool| -> Result<(), TestCaseError> {
                let next = h.update(*on, 75.0, pv);
                if next != *on {
                    // Rising pv lowers a heater's error and raises a cooler's.
                    let error_rising = pv_rising != heater;
                    prop_assert_eq!(next, error_rising, "switched against the sweep at {}", pv);
                    changes += 1;
                }
                *on = next;
                Ok(())
            };
            for d in &rises {
                pv += d;
                step(pv, &mut on, true)?;
            }
            for d in &falls {
                pv -= d;
                step(pv, &mut on, false)?;
            }
            prop_assert!(changes <= 2, "{} changes", changes);
        }
    }
}
