//! Servo control blocks and the recipe interpreter

pub mod events;
pub mod interpreter;
pub mod state;

pub use events::{Diagnostic, DiagnosticKind, PwmRequest};
pub use interpreter::{execute, step, ExecContext, Execution, Outcome};
pub use state::{LoopContext, Position, ServoId, ServoState, ServoStatus, SERVO_COUNT};
