//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use duoservo_core::servo::Diagnostic;
use duoservo_protocol::{OperatorInput, ParseError};

/// Channel capacity for operator input lines
const INPUT_CHANNEL_SIZE: usize = 4;

/// Channel capacity for status lines
const STATUS_CHANNEL_SIZE: usize = 8;

/// Something to print on the operator terminal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusMessage {
    /// Startup banner and key help
    Banner,
    /// Diagnostic from the scheduler
    Diagnostic(Diagnostic),
    /// Input line rejected
    InputError(ParseError),
}

/// Parsed operator lines from the terminal
pub static INPUT_CHANNEL: Channel<CriticalSectionRawMutex, OperatorInput, INPUT_CHANNEL_SIZE> =
    Channel::new();

/// Lines for the status TX task
pub static STATUS_CHANNEL: Channel<CriticalSectionRawMutex, StatusMessage, STATUS_CHANNEL_SIZE> =
    Channel::new();

/// Tick notification
pub static TICK_SIGNAL: Signal<CriticalSectionRawMutex, ()> = Signal::new();
