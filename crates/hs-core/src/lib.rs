//! hs-core: stable foundation for housesim.
//!
//! Contains:
//! - units (uom types + imperial/SI constructors)
//! - numeric (Real + finite/positive argument checks)
//! - ids (stable compact IDs for thermal nodes and scheduler tasks)
//! - time (simulated time with an attached wall-clock calendar)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod time;
pub mod units;

pub use error::{HsError, HsResult};
pub use ids::*;
pub use numeric::*;
pub use time::{SimClock, SimTime};
pub use units::*;
