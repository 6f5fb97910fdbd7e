//! Operator command routing
//!
//! Each servo has a one-slot mailbox. The terminal side may overwrite the
//! slot any number of times between ticks; the scheduler drains it once per
//! tick, so only the most recent command survives.

use duoservo_protocol::OperatorCommand;

use crate::config::ServoConfig;
use crate::recipe::{CommandClass, Recipe};
use crate::servo::{
    execute, Diagnostic, DiagnosticKind, ExecContext, PwmRequest, ServoId, ServoState,
    ServoStatus, SERVO_COUNT,
};

/// Single-slot, last-write-wins command mailbox
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mailbox {
    slot: Option<OperatorCommand>,
}

impl Mailbox {
    /// Create an empty mailbox
    pub const fn new() -> Self {
        Self { slot: None }
    }

    /// Store a command, returning the undrained one it replaced
    pub fn post(&mut self, command: OperatorCommand) -> Option<OperatorCommand> {
        self.slot.replace(command)
    }

    /// Remove the pending command
    pub fn take(&mut self) -> Option<OperatorCommand> {
        self.slot.take()
    }

    /// Pending command, if any
    pub fn peek(&self) -> Option<OperatorCommand> {
        self.slot
    }

    /// Check if no command is pending
    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }
}

/// Effects of routing one operator command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Routed {
    /// False if a guard rejected the command
    pub applied: bool,
    /// PWM change from a jog
    pub pwm: Option<PwmRequest>,
    /// Pause indicator or cleared error
    pub diagnostic: Option<Diagnostic>,
}

impl Routed {
    fn applied() -> Self {
        Self {
            applied: true,
            ..Default::default()
        }
    }

    fn with_diagnostic(servo: ServoId, kind: DiagnosticKind) -> Self {
        Self {
            applied: true,
            pwm: None,
            diagnostic: Some(Diagnostic::new(servo, kind)),
        }
    }
}

/// Apply one operator command to a servo
pub fn route(
    servos: &mut [ServoState; SERVO_COUNT],
    id: ServoId,
    command: OperatorCommand,
    recipes: &[Recipe<'_>; SERVO_COUNT],
    config: &ServoConfig,
) -> Routed {
    let sibling = &servos[id.sibling().index()];
    let sibling_cursor = sibling.cursor;
    let sibling_loop = sibling.loop_ctx;
    let sibling_active = sibling.is_active();

    let servo = &mut servos[id.index()];
    let recipe = &recipes[servo.cursor.recipe.index()];
    let at_end = recipe.is_end_at(servo.cursor.index);
    let errored = servo.status == ServoStatus::Error;

    match command {
        OperatorCommand::Continue if !errored && !at_end => {
            servo.status = ServoStatus::Ready;
            servo.resume_status = None;
            Routed::applied()
        }
        OperatorCommand::Pause if !errored && !at_end => {
            servo.status = ServoStatus::Paused;
            servo.resume_status = None;
            Routed::with_diagnostic(id, DiagnosticKind::Paused)
        }
        OperatorCommand::Restart => {
            if servo.restart() {
                Routed::with_diagnostic(id, DiagnosticKind::ErrorCleared)
            } else {
                Routed::applied()
            }
        }
        OperatorCommand::NoOp if !errored => {
            let resume = resume_status(servo);
            servo.skip_tick(resume);
            Routed::applied()
        }
        OperatorCommand::JogRight | OperatorCommand::JogLeft if !errored => {
            let ctx = ExecContext {
                recipe,
                config,
                sibling_active,
            };
            jog(servo, command.jog_delta(), &ctx)
        }
        OperatorCommand::Swap => {
            servo.cursor = sibling_cursor;
            servo.loop_ctx = sibling_loop;
            Routed::applied()
        }
        _ => Routed::default(),
    }
}

/// Status to return to after an Idle skip
fn resume_status(servo: &ServoState) -> ServoStatus {
    match servo.status {
        ServoStatus::Idle => servo.resume_status.unwrap_or(ServoStatus::Ready),
        other => other,
    }
}

/// One-shot move outside the recipe, committed immediately
fn jog(servo: &mut ServoState, delta: i8, ctx: &ExecContext<'_, '_>) -> Routed {
    let Some(next) = servo.current_position.and_then(|p| p.step(delta)) else {
        return Routed::default();
    };

    // A jog supersedes any move in flight
    let resume = match resume_status(servo) {
        ServoStatus::Running => ServoStatus::Ready,
        other => other,
    };
    let cursor = servo.cursor;

    let exec = execute(servo, CommandClass::Mov, next.value(), ctx);

    servo.cursor = cursor;
    servo.complete();
    servo.skip_tick(resume);

    Routed {
        applied: true,
        pwm: exec.pwm,
        diagnostic: None,
    }
}
