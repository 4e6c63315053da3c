//! State capability used by compound tasks.

use hs_core::SimTime;

use crate::error::RuntimeError;

/// Decision returned by a state's `exit` on every tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Remain in the current state.
    Stay,
    /// Move to the state at this index. Re-entering the current index runs
    /// its `entry` again.
    Goto(usize),
    /// Ask the scheduler to halt the run after this pass.
    Stop,
}

/// One state of a task.
///
/// On each tick the owning task calls `entry` (first tick in the state
/// only), then `action`, then `exit`. `exit` sees the values written by
/// `action` on the same tick.
pub trait State<C, E = RuntimeError> {
    fn name(&self) -> &str;

    fn entry(&mut self, _ctx: &mut C, _now: &SimTime) -> Result<(), E> {
        Ok(())
    }

    fn action(&mut self, _ctx: &mut C, _now: &SimTime) -> Result<(), E> {
        Ok(())
    }

    fn exit(&mut self, ctx: &mut C, now: &SimTime) -> Result<Transition, E>;
}
