//! Two-channel servo PWM bank
//!
//! Both servos share one PWM block and one frame period. Duty values from
//! the scheduler are expressed in ticks of that period (250 ticks per
//! 20 ms frame by default) and are scaled onto each channel's native
//! resolution with `set_duty_cycle_fraction`.
//!
//! A disabled channel is held fully off, so the servo stops receiving
//! pulses and goes limp.

use duoservo_core::servo::ServoId;
use duoservo_core::traits::ServoOutput;
use embedded_hal::pwm::{Error as _, ErrorKind, SetDutyCycle};

/// Servo PWM errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoPwmError {
    /// Frame period of zero ticks
    ZeroPeriod,
    /// Duty longer than the frame period
    DutyBeyondPeriod(u8),
    /// The PWM peripheral rejected the write
    Channel {
        /// Channel that failed
        servo: ServoId,
        /// Error reported by the HAL
        kind: ErrorKind,
    },
}

/// PWM bank driving servo A and servo B
pub struct PwmServoBank<A, B> {
    a: A,
    b: B,
    /// Frame period in duty ticks
    period: u8,
    enabled: [bool; 2],
}

impl<A: SetDutyCycle, B: SetDutyCycle> PwmServoBank<A, B> {
    /// Create a bank with both channels off
    pub fn new(a: A, b: B, period: u8) -> Result<Self, ServoPwmError> {
        if period == 0 {
            return Err(ServoPwmError::ZeroPeriod);
        }
        let mut bank = Self {
            a,
            b,
            period,
            enabled: [false; 2],
        };
        bank.disable_all()?;
        Ok(bank)
    }

    /// Release the channels
    pub fn release(self) -> (A, B) {
        (self.a, self.b)
    }

    fn write(&mut self, servo: ServoId, duty: Option<u8>) -> Result<(), ServoPwmError> {
        let period = self.period as u16;
        let result = match (servo, duty) {
            (ServoId::A, Some(d)) => self
                .a
                .set_duty_cycle_fraction(d as u16, period)
                .map_err(|e| e.kind()),
            (ServoId::A, None) => self.a.set_duty_cycle_fully_off().map_err(|e| e.kind()),
            (ServoId::B, Some(d)) => self
                .b
                .set_duty_cycle_fraction(d as u16, period)
                .map_err(|e| e.kind()),
            (ServoId::B, None) => self.b.set_duty_cycle_fully_off().map_err(|e| e.kind()),
        };
        result.map_err(|kind| ServoPwmError::Channel { servo, kind })
    }
}

impl<A: SetDutyCycle, B: SetDutyCycle> ServoOutput for PwmServoBank<A, B> {
    type Error = ServoPwmError;

    fn drive(&mut self, servo: ServoId, duty: u8) -> Result<(), Self::Error> {
        if duty > self.period {
            return Err(ServoPwmError::DutyBeyondPeriod(duty));
        }
        self.write(servo, Some(duty))?;
        self.enabled[servo.index()] = true;
        Ok(())
    }

    fn disable(&mut self, servo: ServoId) -> Result<(), Self::Error> {
        self.write(servo, None)?;
        self.enabled[servo.index()] = false;
        Ok(())
    }

    fn is_enabled(&self, servo: ServoId) -> bool {
        self.enabled[servo.index()]
    }
}
