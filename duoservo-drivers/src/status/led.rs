//! Error indicator LEDs
//!
//! One LED per servo. It lights on any error diagnostic for that servo
//! and goes dark when a restart clears the error.

use duoservo_core::servo::{Diagnostic, DiagnosticKind, ServoId};
use duoservo_core::traits::StatusIndicator;
use embedded_hal::digital::OutputPin;

/// Error LEDs for servo A and servo B
pub struct ErrorLeds<P> {
    pins: [P; 2],
    /// If true, LED on = pin LOW
    inverted: bool,
    lit: [bool; 2],
}

impl<P: OutputPin> ErrorLeds<P> {
    /// Create with both LEDs off
    pub fn new(a: P, b: P, inverted: bool) -> Self {
        let mut leds = Self {
            pins: [a, b],
            inverted,
            lit: [false; 2],
        };
        for servo in ServoId::ALL {
            leds.set(servo, false);
        }
        leds
    }

    /// Check if a servo's LED is lit
    pub fn is_lit(&self, servo: ServoId) -> bool {
        self.lit[servo.index()]
    }

    fn set(&mut self, servo: ServoId, on: bool) {
        let pin = &mut self.pins[servo.index()];
        // A stuck LED must not stop the controller
        let _ = if on != self.inverted {
            pin.set_high()
        } else {
            pin.set_low()
        };
        self.lit[servo.index()] = on;
    }
}

impl<P: OutputPin> StatusIndicator for ErrorLeds<P> {
    fn indicate(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.set(diagnostic.servo, true);
        } else if diagnostic.kind == DiagnosticKind::ErrorCleared {
            self.set(diagnostic.servo, false);
        }
    }
}
