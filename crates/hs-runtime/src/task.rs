//! Tasks: a cadence plus a set of states, one of which is current.

use hs_core::SimTime;
use tracing::debug;

use crate::clock::Cadence;
use crate::error::{RuntimeError, RuntimeResult};
use crate::state::{State, Transition};

/// Result of running a task for one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskStatus {
    Continue,
    Stop,
}

pub struct Task<C, E = RuntimeError> {
    name: String,
    cadence: Cadence,
    states: Vec<Box<dyn State<C, E>>>,
    current: usize,
    run_entry: bool,
    active: bool,
    resync: bool,
    ticks: u64,
}

impl<C, E> Task<C, E>
where
    E: From<RuntimeError>,
{
    /// Create an active task starting in state 0.
    pub fn new(
        name: impl Into<String>,
        cadence: Cadence,
        states: Vec<Box<dyn State<C, E>>>,
    ) -> RuntimeResult<Self> {
        if states.is_empty() {
            return Err(RuntimeError::InvalidArg {
                what: "task needs at least one state",
            });
        }
        Ok(Self {
            name: name.into(),
            cadence,
            states,
            current: 0,
            run_entry: true,
            active: true,
            resync: false,
            ticks: 0,
        })
    }

    /// Select the initial state. Its `entry` runs on the first tick.
    pub fn with_initial_state(mut self, index: usize) -> RuntimeResult<Self> {
        self.check_index(index)?;
        self.current = index;
        self.run_entry = true;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn current_state(&self) -> usize {
        self.current
    }

    pub fn current_state_name(&self) -> &str {
        self.states[self.current].name()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enable or disable the task. A re-enabled periodic task runs on the
    /// next pass and keeps its period from there, without replaying the
    /// slots it missed while disabled.
    pub fn set_active(&mut self, active: bool) {
        if active && !self.active {
            self.resync = true;
        }
        self.active = active;
    }

    /// Due check. Rearms the cadence when it returns true.
    pub fn run_now(&mut self, now: &SimTime) -> bool {
        if !self.active {
            return false;
        }
        if self.resync {
            self.cadence.reset(now.seconds);
            self.resync = false;
        }
        self.cadence.run_now(now.seconds)
    }

    /// Run the current state for one tick and apply its transition.
    pub fn run(&mut self, ctx: &mut C, now: &SimTime) -> Result<TaskStatus, E> {
        self.ticks += 1;
        let state = &mut self.states[self.current];
        if self.run_entry {
            self.run_entry = false;
            state.entry(ctx, now)?;
        }
        state.action(ctx, now)?;
        match state.exit(ctx, now)? {
            Transition::Stay => Ok(TaskStatus::Continue),
            Transition::Goto(next) => {
                self.check_index(next)?;
                debug!(
                    task = %self.name,
                    from = self.states[self.current].name(),
                    to = self.states[next].name(),
                    t_s = now.seconds,
                    "state transition"
                );
                self.current = next;
                self.run_entry = true;
                Ok(TaskStatus::Continue)
            }
            Transition::Stop => Ok(TaskStatus::Stop),
        }
    }

    fn check_index(&self, index: usize) -> RuntimeResult<()> {
        if index < self.states.len() {
            Ok(())
        } else {
            Err(RuntimeError::StateOob {
                task: self.name.clone(),
                index,
                len: self.states.len(),
            })
        }
    }
}

impl<C, E> core::fmt::Debug for Task<C, E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("cadence", &self.cadence)
            .field("current", &self.current)
            .field("active", &self.active)
            .field("ticks", &self.ticks)
            .finish()
    }
}
