//! Fixed-period due-time tracking.
//!
//! A task is due once simulated time reaches its next scheduled time. When it
//! runs, the next time advances by exactly one period from the previous
//! scheduled time, never from `now`, so a late pass does not shift the phase
//! of every later pass.

use crate::error::{RuntimeError, RuntimeResult};

/// Slack (relative to the period) for accumulated float error in due checks.
const DUE_EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PeriodicClock {
    dt: f64,
    next_due: f64,
}

impl PeriodicClock {
    /// Create a clock whose first run is due at `first_due`.
    pub fn new(dt: f64, first_due: f64) -> RuntimeResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(RuntimeError::InvalidArg {
                what: "task period must be positive and finite",
            });
        }
        if !first_due.is_finite() {
            return Err(RuntimeError::InvalidArg {
                what: "first due time must be finite",
            });
        }
        Ok(Self {
            dt,
            next_due: first_due,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn next_due(&self) -> f64 {
        self.next_due
    }

    pub fn is_due(&self, now: f64) -> bool {
        now + DUE_EPS * self.dt >= self.next_due
    }

    /// Due check with rearm: returns true at most once per call.
    pub fn run_now(&mut self, now: f64) -> bool {
        if self.is_due(now) {
            self.next_due += self.dt;
            true
        } else {
            false
        }
    }

    /// Drop any backlog and make the clock due at `now`.
    pub fn reset(&mut self, now: f64) {
        self.next_due = now;
    }
}

/// How often a task is considered for execution.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Cadence {
    Periodic(PeriodicClock),
    /// Runs on every scheduler pass.
    EveryPass,
}

impl Cadence {
    pub fn periodic(dt: f64) -> RuntimeResult<Self> {
        Ok(Cadence::Periodic(PeriodicClock::new(dt, 0.0)?))
    }

    pub fn run_now(&mut self, now: f64) -> bool {
        match self {
            Cadence::Periodic(clock) => clock.run_now(now),
            Cadence::EveryPass => true,
        }
    }

    pub fn reset(&mut self, now: f64) {
        if let Cadence::Periodic(clock) = self {
            clock.reset(now);
        }
    }
}
