//! Recipes
//!
//! A recipe is an immutable byte sequence of opcodes terminated by
//! `RECIPE_END`. Servos never own recipe bytes; they hold a [`Cursor`] naming
//! a recipe and an index into it.

pub mod opcode;

pub use opcode::{decode, encode, CommandClass, EncodeError, Opcode, RECIPE_END};

/// Opcode builders for writing recipes as const arrays
pub mod op {
    pub use super::opcode::{break_loop, end_loop, loop_start, mov, recipe_end, wait};
}

/// Longest recipe a cursor can address
pub const MAX_RECIPE_LEN: usize = u8::MAX as usize;

/// Errors that can occur when loading a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecipeError {
    /// Recipe has no bytes
    Empty,
    /// Recipe exceeds [`MAX_RECIPE_LEN`]
    TooLong,
    /// Last byte is not a `RECIPE_END`
    Unterminated,
}

/// Identifies one of the scheduler's recipes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RecipeId(pub u8);

impl RecipeId {
    /// Index into the scheduler's recipe table
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Read position within a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    /// Recipe being played
    pub recipe: RecipeId,
    /// Byte index of the next instruction
    pub index: u8,
}

impl Cursor {
    /// Cursor at the first instruction of a recipe
    pub const fn start(recipe: RecipeId) -> Self {
        Self { recipe, index: 0 }
    }

    /// Cursor at another index of the same recipe
    pub const fn at(self, index: u8) -> Self {
        Self {
            recipe: self.recipe,
            index,
        }
    }

    /// Cursor one instruction further on
    pub const fn next(self) -> Self {
        self.at(self.index.saturating_add(1))
    }
}

/// Where a forward `END_LOOP` scan stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoopExit {
    /// Index of the first `END_LOOP` byte found
    EndLoop(u8),
    /// No `END_LOOP` before the terminator at this index
    RecipeEnd(u8),
}

/// An immutable, terminated opcode sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe<'r> {
    bytes: &'r [u8],
}

impl<'r> Recipe<'r> {
    /// Wrap a byte sequence, checking that it is terminated
    pub fn new(bytes: &'r [u8]) -> Result<Self, RecipeError> {
        let last = *bytes.last().ok_or(RecipeError::Empty)?;
        if bytes.len() > MAX_RECIPE_LEN {
            return Err(RecipeError::TooLong);
        }
        if decode(last).0 != CommandClass::RecipeEnd {
            return Err(RecipeError::Unterminated);
        }
        Ok(Self { bytes })
    }

    /// Raw opcode bytes
    pub fn bytes(&self) -> &'r [u8] {
        self.bytes
    }

    /// Number of opcode bytes, terminator included
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false; recipes hold at least their terminator
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the instruction at `index`
    ///
    /// Indices past the end read as `RECIPE_END`.
    pub fn opcode_at(&self, index: u8) -> Opcode {
        Opcode::decode(self.bytes.get(index as usize).copied().unwrap_or(RECIPE_END))
    }

    /// Check if the instruction at `index` ends the recipe
    pub fn is_end_at(&self, index: u8) -> bool {
        self.opcode_at(index).class == CommandClass::RecipeEnd
    }

    /// Scan raw bytes forward from `from` for the first `END_LOOP`
    ///
    /// Nesting is not tracked: the first `END_LOOP`-class byte wins.
    pub fn scan_end_loop(&self, from: u8) -> LoopExit {
        let mut index = from;
        loop {
            match self.opcode_at(index).class {
                CommandClass::EndLoop => return LoopExit::EndLoop(index),
                CommandClass::RecipeEnd => return LoopExit::RecipeEnd(index),
                _ => index = index.saturating_add(1),
            }
        }
    }
}
