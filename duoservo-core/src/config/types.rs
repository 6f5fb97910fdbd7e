//! Configuration type definitions
//!
//! These types represent the controller configuration. Configuration can be
//! stored in flash as postcard-serialized binary data.

use crate::servo::Position;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scheduler tick period
pub const TICK_MS: u16 = 100;

/// Time to travel one position
pub const MOVE_MS_PER_POSITION: u16 = 200;

/// Time per `WAIT` argument unit
pub const WAIT_QUANTUM_MS: u16 = 100;

/// PWM period in PWM clock ticks (20 ms frame)
pub const PWM_PERIOD_TICKS: u8 = 250;

/// Default position → duty table (PWM clock ticks, ~10° per tick)
pub const DEFAULT_POSITION_DUTY: [u8; Position::COUNT] = [0x05, 0x09, 0x0C, 0x0F, 0x14, 0x18];

/// Maximum serialized config size (binary)
pub const MAX_CONFIG_SIZE: usize = 32;

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Duty table is not increasing or exceeds the PWM period
    InvalidTable,
    /// A period or quantum is zero
    InvalidTiming,
}

/// What the interpreter does with a bad argument or undefined opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FaultPolicy {
    /// Leave the cursor in place and retry next tick
    #[default]
    Stall,
    /// Put the servo into Error until restarted
    Escalate,
}

/// Servo controller configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServoConfig {
    /// Duty for each position, in PWM clock ticks
    pub position_duty: [u8; Position::COUNT],
    /// PWM period in PWM clock ticks
    pub pwm_period: u8,
    /// Travel time per position of distance
    pub move_ms_per_position: u16,
    /// Wait time per `WAIT` argument unit
    pub wait_quantum_ms: u16,
    /// Scheduler tick period
    pub tick_ms: u16,
    /// Handling of invalid arguments and undefined opcodes
    pub fault_policy: FaultPolicy,
}

impl Default for ServoConfig {
    fn default() -> Self {
        Self {
            position_duty: DEFAULT_POSITION_DUTY,
            pwm_period: PWM_PERIOD_TICKS,
            move_ms_per_position: MOVE_MS_PER_POSITION,
            wait_quantum_ms: WAIT_QUANTUM_MS,
            tick_ms: TICK_MS,
            fault_policy: FaultPolicy::Stall,
        }
    }
}

impl ServoConfig {
    /// Duty for a position
    pub fn duty_for(&self, position: Position) -> u8 {
        self.position_duty[position.value() as usize]
    }

    /// Check the duty table and timing values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let timing = [self.move_ms_per_position, self.wait_quantum_ms, self.tick_ms];
        if self.pwm_period == 0 || timing.contains(&0) {
            return Err(ConfigError::InvalidTiming);
        }
        let increasing = self.position_duty.windows(2).all(|w| w[0] < w[1]);
        let in_period = self.position_duty.iter().all(|&d| d <= self.pwm_period);
        if !increasing || !in_period {
            return Err(ConfigError::InvalidTable);
        }
        Ok(())
    }

    /// Serialize to a postcard blob
    #[cfg(feature = "serde")]
    pub fn to_bytes<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buffer).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate a postcard blob
    #[cfg(feature = "serde")]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: ServoConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServoConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.duty_for(Position::MIN), 0x05);
        assert_eq!(config.duty_for(Position::MAX), 0x18);
    }

    #[test]
    fn test_non_monotonic_table_rejected() {
        let config = ServoConfig {
            position_duty: [0x05, 0x09, 0x09, 0x0F, 0x14, 0x18],
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTable));
    }

    #[test]
    fn test_duty_beyond_period_rejected() {
        let config = ServoConfig {
            pwm_period: 0x10,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTable));
    }

    #[test]
    fn test_zero_tick_rejected() {
        let config = ServoConfig {
            tick_ms: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::InvalidTiming));
    }

    #[test]
    fn test_zero_quanta_rejected() {
        let no_wait = ServoConfig {
            wait_quantum_ms: 0,
            ..Default::default()
        };
        assert_eq!(no_wait.validate(), Err(ConfigError::InvalidTiming));

        let no_travel = ServoConfig {
            move_ms_per_position: 0,
            ..Default::default()
        };
        assert_eq!(no_travel.validate(), Err(ConfigError::InvalidTiming));

        let no_period = ServoConfig {
            pwm_period: 0,
            ..Default::default()
        };
        assert_eq!(no_period.validate(), Err(ConfigError::InvalidTiming));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_roundtrip() {
        let config = ServoConfig {
            fault_policy: FaultPolicy::Escalate,
            ..Default::default()
        };
        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let bytes = config.to_bytes(&mut buffer).unwrap();
        assert_eq!(ServoConfig::from_bytes(bytes), Ok(config));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_postcard_garbage_rejected() {
        assert_eq!(
            ServoConfig::from_bytes(&[0xFF]),
            Err(ConfigError::Deserialize)
        );
    }
}
