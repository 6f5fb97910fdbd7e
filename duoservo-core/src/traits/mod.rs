//! Hardware abstraction traits
//!
//! These traits define the interface between the scheduler and
//! hardware-specific implementations.

pub mod output;

pub use output::{ServoOutput, StatusIndicator};
