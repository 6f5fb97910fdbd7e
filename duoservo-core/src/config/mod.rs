//! Configuration types
//!
//! Board-agnostic configuration structures, optionally stored as postcard
//! binary data.

pub mod types;

pub use types::*;
