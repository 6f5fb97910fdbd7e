//! Board-agnostic core logic for the duoservo controller
//!
//! This crate contains everything that does not depend on specific
//! hardware:
//!
//! - Recipe opcode codec and recipe validation
//! - Servo control blocks and the instruction interpreter
//! - Tick scheduler and operator command router
//! - Output traits implemented by the drivers crate
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod config;
pub mod recipe;
pub mod scheduler;
pub mod servo;
pub mod traits;

pub use config::{FaultPolicy, ServoConfig};
pub use recipe::{Cursor, Recipe, RecipeId};
pub use scheduler::{Scheduler, TickReport};
pub use servo::{Diagnostic, DiagnosticKind, Position, PwmRequest, ServoId, ServoStatus};
