//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the output traits
//! defined in duoservo-core, on top of `embedded-hal` 1.0:
//!
//! - Servo PWM bank (two `SetDutyCycle` channels sharing one period)
//! - Error indicator LEDs (one `OutputPin` per servo)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod servo;
pub mod status;
