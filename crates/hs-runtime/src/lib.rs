//! hs-runtime: cooperative task runtime.
//!
//! A [`Scheduler`] owns tasks and runs them in registration order. A
//! [`Task`] owns a list of [`State`]s and a [`Cadence`]; on each due tick it
//! runs the current state's entry/action/exit sequence and applies the
//! returned [`Transition`]. Tasks communicate through the context type `C`
//! passed by `&mut` on every call.

pub mod clock;
pub mod command;
pub mod error;
pub mod scheduler;
pub mod state;
pub mod task;

pub use clock::{Cadence, PeriodicClock};
pub use command::CommandSlot;
pub use error::{RuntimeError, RuntimeResult};
pub use scheduler::{RunStatus, Scheduler};
pub use state::{State, Transition};
pub use task::{Task, TaskStatus};
