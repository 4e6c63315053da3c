//! Cooperative scheduler.
//!
//! Tasks run in registration order on a single thread. Each pass considers
//! every active task once; a task that is due runs one tick of its current
//! state. Tasks share data only through the context `C` handed to them.

use hs_core::{SimTime, TaskId};
use tracing::info;

use crate::error::RuntimeError;
use crate::task::{Task, TaskStatus};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Stopped,
}

pub struct Scheduler<C, E = RuntimeError> {
    tasks: Vec<Task<C, E>>,
    last_time: Option<f64>,
    passes: u64,
    stopped_by: Option<TaskId>,
}

impl<C, E> Default for Scheduler<C, E>
where
    E: From<RuntimeError>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<C, E> Scheduler<C, E>
where
    E: From<RuntimeError>,
{
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            last_time: None,
            passes: 0,
            stopped_by: None,
        }
    }

    /// Register a task. Tasks run in the order they were added.
    pub fn add_task(&mut self, task: Task<C, E>) -> TaskId {
        let id = TaskId::from_index(self.tasks.len());
        self.tasks.push(task);
        id
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn task(&self, id: TaskId) -> Result<&Task<C, E>, E> {
        self.tasks
            .get(id.index())
            .ok_or_else(|| RuntimeError::UnknownTask { index: id.index() }.into())
    }

    pub fn task_mut(&mut self, id: TaskId) -> Result<&mut Task<C, E>, E> {
        self.tasks
            .get_mut(id.index())
            .ok_or_else(|| RuntimeError::UnknownTask { index: id.index() }.into())
    }

    pub fn find(&self, name: &str) -> Option<TaskId> {
        self.tasks
            .iter()
            .position(|t| t.name() == name)
            .map(TaskId::from_index)
    }

    pub fn set_active(&mut self, id: TaskId, active: bool) -> Result<(), E> {
        self.task_mut(id)?.set_active(active);
        Ok(())
    }

    /// Task that requested the stop, if any.
    pub fn stopped_by(&self) -> Option<TaskId> {
        self.stopped_by
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_by.is_some()
    }

    /// Run one pass at time `now`.
    ///
    /// `now` must not be earlier than the previous pass. A task returning a
    /// stop ends the pass immediately; the remaining tasks are skipped and
    /// every later call reports `Stopped` without running anything.
    pub fn advance(&mut self, ctx: &mut C, now: &SimTime) -> Result<RunStatus, E> {
        if self.stopped_by.is_some() {
            return Ok(RunStatus::Stopped);
        }
        if !now.seconds.is_finite() {
            return Err(RuntimeError::InvalidArg {
                what: "scheduler time must be finite",
            }
            .into());
        }
        if let Some(last) = self.last_time {
            if now.seconds < last {
                return Err(RuntimeError::TimeReversed {
                    from_s: last,
                    to_s: now.seconds,
                }
                .into());
            }
        }
        self.last_time = Some(now.seconds);
        self.passes += 1;

        for (index, task) in self.tasks.iter_mut().enumerate() {
            if !task.run_now(now) {
                continue;
            }
            if task.run(ctx, now)? == TaskStatus::Stop {
                info!(task = task.name(), t_s = now.seconds, "stop requested");
                self.stopped_by = Some(TaskId::from_index(index));
                return Ok(RunStatus::Stopped);
            }
        }
        Ok(RunStatus::Running)
    }
}
