//! Weekly thermostat setpoint table.

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{ControlError, ControlResult};

const SECONDS_PER_DAY: u32 = 86_400;

/// One row of the table. `day: None` applies the row to every weekday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<Weekday>,
    pub at: NaiveTime,
    pub setpoint_f: f64,
}

/// Setpoint in force at a given weekday and time of day.
///
/// Before the first row of a day, the last row of the previous day applies
/// (wrapping from Monday back to Sunday).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ScheduleEntry>", into = "Vec<ScheduleEntry>")]
pub struct SetpointSchedule {
    entries: Vec<ScheduleEntry>,
    /// (second of week, setpoint), sorted by time.
    points: Vec<(u32, f64)>,
}

/// Setpoint lookup result. `slot` identifies the row in force so callers
/// can tell when the schedule moves on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledSetpoint {
    pub slot: usize,
    pub setpoint_f: f64,
}

fn second_of_week(day: Weekday, seconds_of_day: u32) -> u32 {
    day.num_days_from_monday() * SECONDS_PER_DAY + seconds_of_day.min(SECONDS_PER_DAY - 1)
}

impl SetpointSchedule {
    pub fn new(entries: Vec<ScheduleEntry>) -> ControlResult<Self> {
        if entries.is_empty() {
            return Err(ControlError::Schedule {
                what: "schedule has no entries".to_string(),
            });
        }
        let mut points = Vec::new();
        for entry in &entries {
            if !entry.setpoint_f.is_finite() {
                return Err(ControlError::Schedule {
                    what: format!("setpoint at {} is not finite", entry.at),
                });
            }
            let sod = entry.at.num_seconds_from_midnight();
            match entry.day {
                Some(day) => points.push((second_of_week(day, sod), entry.setpoint_f)),
                None => {
                    for d in 0..7 {
                        points.push((d * SECONDS_PER_DAY + sod, entry.setpoint_f));
                    }
                }
            }
        }
        points.sort_by_key(|&(t, _)| t);
        if let Some(w) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            let day = w[0].0 / SECONDS_PER_DAY;
            let sod = w[0].0 % SECONDS_PER_DAY;
            return Err(ControlError::Schedule {
                what: format!(
                    "two entries at day {} second {} (day 0 is Monday)",
                    day, sod
                ),
            });
        }
        Ok(Self { entries, points })
    }

    /// 75 °F from 06:00 every day.
    pub fn baseline() -> Self {
        let at = NaiveTime::from_hms_opt(6, 0, 0).unwrap_or(NaiveTime::MIN);
        let points = (0..7)
            .map(|d| (d * SECONDS_PER_DAY + at.num_seconds_from_midnight(), 75.0))
            .collect();
        Self {
            entries: vec![ScheduleEntry {
                day: None,
                at,
                setpoint_f: 75.0,
            }],
            points,
        }
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn setpoint_at(&self, day: Weekday, seconds_of_day: u32) -> ScheduledSetpoint {
        let now = second_of_week(day, seconds_of_day);
        let after = self.points.partition_point(|&(t, _)| t <= now);
        // `points` is never empty, so wrapping to the last row is always valid.
        let slot = if after == 0 {
            self.points.len() - 1
        } else {
            after - 1
        };
        ScheduledSetpoint {
            slot,
            setpoint_f: self.points[slot].1,
        }
    }
}

impl Default for SetpointSchedule {
    fn default() -> Self {
        Self::baseline()
    }
}

impl TryFrom<Vec<ScheduleEntry>> for SetpointSchedule {
    type Error = ControlError;

    fn try_from(entries: Vec<ScheduleEntry>) -> ControlResult<Self> {
        Self::new(entries)
    }
}

impl From<SetpointSchedule> for Vec<ScheduleEntry> {
    fn from(schedule: SetpointSchedule) -> Self {
        schedule.entries
    }
}
