//! Output traits
//!
//! The scheduler never touches hardware. It hands [`PwmRequest`]s and
//! [`Diagnostic`]s to implementations of these traits.

use crate::servo::{Diagnostic, PwmRequest, ServoId};

/// PWM output for the two servo channels
///
/// Duty values are in PWM period ticks, straight from the configured
/// position table.
pub trait ServoOutput {
    /// Error type for the underlying PWM peripheral
    type Error;

    /// Set a channel's duty and enable it
    fn drive(&mut self, servo: ServoId, duty: u8) -> Result<(), Self::Error>;

    /// Disable one channel
    fn disable(&mut self, servo: ServoId) -> Result<(), Self::Error>;

    /// Disable the whole PWM block
    fn disable_all(&mut self) -> Result<(), Self::Error> {
        for servo in ServoId::ALL {
            self.disable(servo)?;
        }
        Ok(())
    }

    /// Check if a channel is enabled
    fn is_enabled(&self, servo: ServoId) -> bool;

    /// Apply one request from a tick report
    fn apply(&mut self, request: PwmRequest) -> Result<(), Self::Error> {
        match request {
            PwmRequest::Drive { servo, duty } => self.drive(servo, duty),
            PwmRequest::Disable(servo) => self.disable(servo),
            PwmRequest::DisableAll => self.disable_all(),
        }
    }
}

/// Sink for diagnostics (status LEDs, terminal line, log)
pub trait StatusIndicator {
    /// Report one diagnostic
    fn indicate(&mut self, diagnostic: Diagnostic);
}
