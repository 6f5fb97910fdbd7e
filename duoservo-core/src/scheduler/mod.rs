//! Tick scheduler and operator command routing
//!
//! The scheduler is the only entry point that mutates servo state. It is
//! driven by a fixed 100 ms tick and by operator commands posted between
//! ticks.

pub mod executor;
pub mod router;

pub use executor::{Scheduler, TickReport, MAX_TICK_EFFECTS};
pub use router::{route, Mailbox, Routed};
