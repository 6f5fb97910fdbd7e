//! Side effects produced by the interpreter and router

use super::state::ServoId;

/// PWM change requested for the hardware layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmRequest {
    /// Set the servo's duty (in PWM period ticks) and enable its channel
    Drive { servo: ServoId, duty: u8 },
    /// Disable only this servo's channel (sibling still active)
    Disable(ServoId),
    /// Disable the shared PWM block
    DisableAll,
}

/// Kinds of diagnostic reported to the status layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DiagnosticKind {
    /// `RECIPE_END` dispatched
    RecipeComplete,
    /// `LOOP_START` inside an open loop
    NestedLoop,
    /// Reserved class bits in the opcode at the cursor
    UndefinedCommand(u8),
    /// `MOV`/`WAIT` argument out of range (escalating fault policy only)
    InvalidArgument(u8),
    /// Operator paused the servo
    Paused,
    /// Restart cleared an error
    ErrorCleared,
}

/// A diagnostic tagged with the servo it concerns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Diagnostic {
    /// Servo the diagnostic refers to
    pub servo: ServoId,
    /// What happened
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a diagnostic
    pub const fn new(servo: ServoId, kind: DiagnosticKind) -> Self {
        Self { servo, kind }
    }

    /// Check if this diagnostic reports a fault
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            DiagnosticKind::NestedLoop
                | DiagnosticKind::UndefinedCommand(_)
                | DiagnosticKind::InvalidArgument(_)
        )
    }

    /// Short text for the status line
    pub fn message(&self) -> &'static str {
        match self.kind {
            DiagnosticKind::RecipeComplete => "recipe complete",
            DiagnosticKind::NestedLoop => "nested loop error",
            DiagnosticKind::UndefinedCommand(_) => "undefined command",
            DiagnosticKind::InvalidArgument(_) => "invalid argument",
            DiagnosticKind::Paused => "paused",
            DiagnosticKind::ErrorCleared => "error cleared",
        }
    }
}
