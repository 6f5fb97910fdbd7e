//! Recipe opcode encoding and decoding
//!
//! Opcode format (one byte per instruction):
//! - CLASS (bits 7-5): command class
//! - ARG (bits 4-0): class-specific argument (0-31)
//!
//! ```text
//! ┌───┬───┬───┬───┬───┬───┬───┬───┐
//! │ 7 │ 6 │ 5 │ 4 │ 3 │ 2 │ 1 │ 0 │
//! ├───┴───┴───┼───┴───┴───┴───┴───┤
//! │   CLASS   │        ARG        │
//! └───────────┴───────────────────┘
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Mask selecting the argument bits
pub const ARG_MASK: u8 = 0x1F;

/// Mask selecting the class bits
pub const CLASS_MASK: u8 = 0xE0;

/// Bit offset of the class field
pub const CLASS_SHIFT: u8 = 5;

/// Largest encodable argument
pub const MAX_ARG: u8 = ARG_MASK;

/// Recipe terminator byte
pub const RECIPE_END: u8 = 0x00;

// Class field values
const CLASS_RECIPE_END: u8 = 0;
const CLASS_MOV: u8 = 1;
const CLASS_WAIT: u8 = 2;
const CLASS_BREAK_LOOP: u8 = 3;
const CLASS_LOOP_START: u8 = 4;
const CLASS_END_LOOP: u8 = 5;

/// Command class carried in the top three bits of an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CommandClass {
    /// End of recipe
    RecipeEnd,
    /// Move to position ARG (0-5)
    Mov,
    /// Wait ARG × 100 ms
    Wait,
    /// Leave the active loop
    BreakLoop,
    /// Open a loop whose body runs ARG + 1 times
    LoopStart,
    /// Close the active loop
    EndLoop,
    /// Reserved class bits (6 or 7)
    Unknown(u8),
}

impl CommandClass {
    /// Map class bits (already shifted down) to a command class
    pub const fn from_bits(bits: u8) -> Self {
        match bits {
            CLASS_RECIPE_END => CommandClass::RecipeEnd,
            CLASS_MOV => CommandClass::Mov,
            CLASS_WAIT => CommandClass::Wait,
            CLASS_BREAK_LOOP => CommandClass::BreakLoop,
            CLASS_LOOP_START => CommandClass::LoopStart,
            CLASS_END_LOOP => CommandClass::EndLoop,
            other => CommandClass::Unknown(other),
        }
    }

    /// Class bits for this command class (not shifted)
    pub const fn bits(self) -> u8 {
        match self {
            CommandClass::RecipeEnd => CLASS_RECIPE_END,
            CommandClass::Mov => CLASS_MOV,
            CommandClass::Wait => CLASS_WAIT,
            CommandClass::BreakLoop => CLASS_BREAK_LOOP,
            CommandClass::LoopStart => CLASS_LOOP_START,
            CommandClass::EndLoop => CLASS_END_LOOP,
            CommandClass::Unknown(bits) => bits,
        }
    }
}

/// Errors that can occur while encoding an opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EncodeError {
    /// Argument does not fit in five bits
    ArgumentOutOfRange,
    /// Class bits do not fit in three bits
    InvalidClass,
}

/// A decoded opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Opcode {
    /// Command class
    pub class: CommandClass,
    /// Argument (0-31)
    pub arg: u8,
}

impl Opcode {
    /// Decode a raw recipe byte
    pub const fn decode(byte: u8) -> Self {
        Self {
            class: CommandClass::from_bits((byte & CLASS_MASK) >> CLASS_SHIFT),
            arg: byte & ARG_MASK,
        }
    }
}

/// Decode one recipe byte into its command class and argument
///
/// Never fails: reserved class bits decode to [`CommandClass::Unknown`].
pub const fn decode(byte: u8) -> (CommandClass, u8) {
    let op = Opcode::decode(byte);
    (op.class, op.arg)
}

/// Encode a command class and argument into a recipe byte
pub fn encode(class: CommandClass, arg: u8) -> Result<u8, EncodeError> {
    if arg > MAX_ARG {
        return Err(EncodeError::ArgumentOutOfRange);
    }
    let bits = class.bits();
    if bits > (CLASS_MASK >> CLASS_SHIFT) {
        return Err(EncodeError::InvalidClass);
    }
    Ok((bits << CLASS_SHIFT) | arg)
}

/// `MOV position` (argument bits beyond five are discarded)
pub const fn mov(position: u8) -> u8 {
    (CLASS_MOV << CLASS_SHIFT) | (position & ARG_MASK)
}

/// `WAIT ticks` (argument bits beyond five are discarded)
pub const fn wait(ticks: u8) -> u8 {
    (CLASS_WAIT << CLASS_SHIFT) | (ticks & ARG_MASK)
}

/// `LOOP_START repeats`
pub const fn loop_start(repeats: u8) -> u8 {
    (CLASS_LOOP_START << CLASS_SHIFT) | (repeats & ARG_MASK)
}

/// `END_LOOP`
pub const fn end_loop() -> u8 {
    CLASS_END_LOOP << CLASS_SHIFT
}

/// `BREAK_LOOP`
pub const fn break_loop() -> u8 {
    CLASS_BREAK_LOOP << CLASS_SHIFT
}

/// `RECIPE_END`
pub const fn recipe_end() -> u8 {
    RECIPE_END
}
