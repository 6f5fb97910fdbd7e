//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod controller;
pub mod operator_rx;
pub mod status_tx;
pub mod tick;

pub use controller::{controller_task, Indicator, ServoBank};
pub use operator_rx::operator_rx_task;
pub use status_tx::status_tx_task;
pub use tick::tick_task;
