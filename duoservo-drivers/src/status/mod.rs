//! Status indicators

pub mod led;

pub use led::ErrorLeds;
