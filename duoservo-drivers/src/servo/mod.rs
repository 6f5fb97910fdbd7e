//! Servo PWM outputs

pub mod pwm;

pub use pwm::{PwmServoBank, ServoPwmError};
