//! Simulated time.
//!
//! `SimClock` is owned by the driver loop and only ever moves forward.
//! `SimTime` is the read-only snapshot handed to tasks on each scheduler pass.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike, Weekday};

use crate::error::{HsError, HsResult};

/// Snapshot of simulated time: seconds since start plus the calendar origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimTime {
    pub seconds: f64,
    pub start: NaiveDateTime,
}

impl SimTime {
    pub fn new(start: NaiveDateTime, seconds: f64) -> Self {
        Self { seconds, start }
    }

    /// Wall-clock calendar at this instant (millisecond resolution).
    pub fn calendar(&self) -> NaiveDateTime {
        let ms = (self.seconds * 1000.0).round() as i64;
        self.start + Duration::milliseconds(ms)
    }

    pub fn weekday(&self) -> Weekday {
        self.calendar().weekday()
    }

    /// Seconds elapsed since local midnight.
    pub fn seconds_of_day(&self) -> u32 {
        self.calendar().num_seconds_from_midnight()
    }
}

#[derive(Clone, Debug)]
pub struct SimClock {
    start: NaiveDateTime,
    elapsed_s: f64,
}

impl SimClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            elapsed_s: 0.0,
        }
    }

    pub fn now(&self) -> SimTime {
        SimTime::new(self.start, self.elapsed_s)
    }

    pub fn elapsed_s(&self) -> f64 {
        self.elapsed_s
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Move the clock forward by `dt` seconds.
    pub fn advance(&mut self, dt: f64) -> HsResult<SimTime> {
        if !dt.is_finite() {
            return Err(HsError::NonFinite {
                what: "clock step",
                value: dt,
            });
        }
        if dt < 0.0 {
            return Err(HsError::TimeReversed {
                from_s: self.elapsed_s,
                to_s: self.elapsed_s + dt,
            });
        }
        self.elapsed_s += dt;
        Ok(self.now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn monday_midnight() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn calendar_follows_elapsed_seconds() {
        let mut clock = SimClock::new(monday_midnight());
        clock.advance(6.0 * 3600.0 + 30.0).unwrap();
        let now = clock.now();
        assert_eq!(now.weekday(), Weekday::Mon);
        assert_eq!(now.seconds_of_day(), 6 * 3600 + 30);

        clock.advance(18.0 * 3600.0).unwrap();
        assert_eq!(clock.now().weekday(), Weekday::Tue);
    }

    #[test]
    fn negative_step_is_rejected() {
        let mut clock = SimClock::new(monday_midnight());
        clock.advance(5.0).unwrap();
        let err = clock.advance(-1.0).unwrap_err();
        assert!(matches!(err, HsError::TimeReversed { .. }));
        assert_eq!(clock.elapsed_s(), 5.0);
    }

    #[test]
    fn nan_step_is_rejected() {
        let mut clock = SimClock::new(monday_midnight());
        assert!(clock.advance(f64::NAN).is_err());
    }
}
