//! Operator Terminal Protocol
//!
//! This crate defines the serial protocol between an operator terminal and
//! the servo controller. The protocol is deliberately human-typable: each
//! input line carries one command letter per servo.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌──────────┬──────────┬─────────┐
//! │ SERVO A  │ SERVO B  │ EOL     │
//! │ 1 char   │ 0-1 char │ CR / LF │
//! └──────────┴──────────┴─────────┘
//! ```
//!
//! Letters are case-insensitive. `X` anywhere on the line discards what has
//! been typed so far. The controller only sees complete, validated lines.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod line;

pub use command::OperatorCommand;
pub use line::{LineParser, OperatorInput, ParseError, MAX_LINE_LEN};
