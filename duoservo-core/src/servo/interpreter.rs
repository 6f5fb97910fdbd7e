//! Recipe instruction interpreter
//!
//! Executes one decoded opcode against a servo's control block. The
//! interpreter only mutates the servo it is given; hardware effects and
//! diagnostics are returned to the caller in an [`Execution`].
//!
//! # Instruction semantics
//!
//! | Class        | Effect                                                   |
//! |--------------|----------------------------------------------------------|
//! | `RECIPE_END` | finish, release PWM channel, cursor stays                |
//! | `MOV p`      | drive to `p`, run for distance × 200 ms                  |
//! | `WAIT n`     | run for `n` × 100 ms                                     |
//! | `LOOP_START n` | open a loop whose body runs `n + 1` times              |
//! | `END_LOOP`   | jump back to the body while repetitions remain           |
//! | `BREAK_LOOP` | skip past the next `END_LOOP` byte and close the loop    |

use crate::config::{FaultPolicy, ServoConfig};
use crate::recipe::opcode::MAX_ARG;
use crate::recipe::{CommandClass, LoopExit, Recipe};

use super::events::{Diagnostic, DiagnosticKind, PwmRequest};
use super::state::{LoopContext, Position, ServoState, ServoStatus};

/// Result of executing one instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Cursor moved to the next instruction
    Advanced,
    /// Cursor moved somewhere other than the next instruction
    Jumped,
    /// Recipe finished
    Finished,
    /// Argument out of range; instruction ignored, cursor unchanged
    Dropped,
    /// Undefined opcode; cursor unchanged
    Stalled,
    /// Servo put into Error
    Faulted,
}

impl Outcome {
    /// Check if the cursor stayed on the same instruction
    pub fn is_stuck(&self) -> bool {
        matches!(self, Outcome::Dropped | Outcome::Stalled | Outcome::Faulted)
    }
}

/// Everything an instruction produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Execution {
    /// What happened to the cursor
    pub outcome: Outcome,
    /// PWM change for the hardware layer
    pub pwm: Option<PwmRequest>,
    /// Diagnostic for the status layer
    pub diagnostic: Option<Diagnostic>,
}

impl Execution {
    fn quiet(outcome: Outcome) -> Self {
        Self {
            outcome,
            pwm: None,
            diagnostic: None,
        }
    }
}

/// Read-only context for one execution
#[derive(Debug, Clone, Copy)]
pub struct ExecContext<'a, 'r> {
    /// Recipe the servo's cursor points into
    pub recipe: &'a Recipe<'r>,
    /// Timing, duty table and fault policy
    pub config: &'a ServoConfig,
    /// Whether the sibling servo still needs the shared PWM block
    pub sibling_active: bool,
}

/// Fetch, decode and execute the instruction at the servo's cursor
pub fn step(servo: &mut ServoState, ctx: &ExecContext<'_, '_>) -> Execution {
    let op = ctx.recipe.opcode_at(servo.cursor.index);
    execute(servo, op.class, op.arg, ctx)
}

/// Execute one instruction
pub fn execute(
    servo: &mut ServoState,
    class: CommandClass,
    arg: u8,
    ctx: &ExecContext<'_, '_>,
) -> Execution {
    match class {
        CommandClass::RecipeEnd => exec_recipe_end(servo, ctx),
        CommandClass::Mov => exec_mov(servo, arg, ctx),
        CommandClass::Wait => exec_wait(servo, arg, ctx),
        CommandClass::LoopStart => exec_loop_start(servo, arg),
        CommandClass::EndLoop => exec_end_loop(servo),
        CommandClass::BreakLoop => exec_break_loop(servo, ctx),
        CommandClass::Unknown(bits) => {
            fault(servo, DiagnosticKind::UndefinedCommand(bits), ctx, Outcome::Stalled)
        }
    }
}

fn exec_recipe_end(servo: &mut ServoState, ctx: &ExecContext<'_, '_>) -> Execution {
    servo.finished = true;
    let pwm = if ctx.sibling_active {
        PwmRequest::Disable(servo.id())
    } else {
        PwmRequest::DisableAll
    };
    Execution {
        outcome: Outcome::Finished,
        pwm: Some(pwm),
        diagnostic: Some(Diagnostic::new(servo.id(), DiagnosticKind::RecipeComplete)),
    }
}

fn exec_mov(servo: &mut ServoState, arg: u8, ctx: &ExecContext<'_, '_>) -> Execution {
    let Some(target) = Position::new(arg) else {
        return invalid_argument(servo, arg, ctx);
    };

    let distance = match servo.current_position {
        Some(current) => current.distance(target),
        None => target.value(),
    };

    servo.target_position = Some(target);
    servo.time_remaining_ms = distance as i32 * ctx.config.move_ms_per_position as i32;
    servo.status = ServoStatus::Running;
    servo.cursor = servo.cursor.next();

    Execution {
        outcome: Outcome::Advanced,
        pwm: Some(PwmRequest::Drive {
            servo: servo.id(),
            duty: ctx.config.duty_for(target),
        }),
        diagnostic: None,
    }
}

fn exec_wait(servo: &mut ServoState, arg: u8, ctx: &ExecContext<'_, '_>) -> Execution {
    if arg > MAX_ARG {
        return invalid_argument(servo, arg, ctx);
    }

    servo.time_remaining_ms = arg as i32 * ctx.config.wait_quantum_ms as i32;
    servo.status = ServoStatus::Running;
    servo.cursor = servo.cursor.next();
    Execution::quiet(Outcome::Advanced)
}

fn exec_loop_start(servo: &mut ServoState, repeats: u8) -> Execution {
    if servo.loop_ctx.is_some() {
        servo.status = ServoStatus::Error;
        return Execution {
            outcome: Outcome::Faulted,
            pwm: None,
            diagnostic: Some(Diagnostic::new(servo.id(), DiagnosticKind::NestedLoop)),
        };
    }

    let body = servo.cursor.next();
    servo.loop_ctx = Some(LoopContext {
        remaining: repeats,
        body_start: body.index,
    });
    servo.cursor = body;
    Execution::quiet(Outcome::Advanced)
}

fn exec_end_loop(servo: &mut ServoState) -> Execution {
    match servo.loop_ctx.as_mut() {
        Some(ctx) if ctx.remaining > 0 => {
            ctx.remaining -= 1;
            servo.cursor = servo.cursor.at(ctx.body_start);
            Execution::quiet(Outcome::Jumped)
        }
        _ => {
            servo.loop_ctx = None;
            servo.cursor = servo.cursor.next();
            Execution::quiet(Outcome::Advanced)
        }
    }
}

fn exec_break_loop(servo: &mut ServoState, ctx: &ExecContext<'_, '_>) -> Execution {
    servo.loop_ctx = None;
    servo.cursor = match ctx.recipe.scan_end_loop(servo.cursor.index) {
        LoopExit::EndLoop(index) => servo.cursor.at(index).next(),
        LoopExit::RecipeEnd(index) => servo.cursor.at(index),
    };
    Execution::quiet(Outcome::Jumped)
}

fn invalid_argument(servo: &mut ServoState, arg: u8, ctx: &ExecContext<'_, '_>) -> Execution {
    match ctx.config.fault_policy {
        FaultPolicy::Stall => Execution::quiet(Outcome::Dropped),
        FaultPolicy::Escalate => {
            fault(servo, DiagnosticKind::InvalidArgument(arg), ctx, Outcome::Dropped)
        }
    }
}

/// Report a fault; escalate to Error if the policy says so
fn fault(
    servo: &mut ServoState,
    kind: DiagnosticKind,
    ctx: &ExecContext<'_, '_>,
    stall_outcome: Outcome,
) -> Execution {
    servo.fault_reported = true;
    let outcome = match ctx.config.fault_policy {
        FaultPolicy::Stall => stall_outcome,
        FaultPolicy::Escalate => {
            servo.status = ServoStatus::Error;
            Outcome::Faulted
        }
    };
    Execution {
        outcome,
        pwm: None,
        diagnostic: Some(Diagnostic::new(servo.id(), kind)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::op::*;
    use crate::recipe::{Cursor, RecipeId};
    use crate::servo::ServoId;

    fn ready_servo() -> ServoState {
        let mut servo = ServoState::new(ServoId::A);
        servo.status = ServoStatus::Ready;
        servo
    }

    fn ctx<'a, 'r>(recipe: &'a Recipe<'r>, config: &'a ServoConfig) -> ExecContext<'a, 'r> {
        ExecContext {
            recipe,
            config,
            sibling_active: true,
        }
    }

    #[test]
    fn test_mov_from_unset() {
        let bytes = [mov(3), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let mut servo = ready_servo();

        let exec = step(&mut servo, &ctx(&recipe, &config));

        assert_eq!(exec.outcome, Outcome::Advanced);
        assert_eq!(servo.status(), ServoStatus::Running);
        assert_eq!(servo.time_remaining_ms(), 600);
        assert_eq!(servo.target_position, Position::new(3));
        assert!(servo.current_position().is_none());
        assert_eq!(servo.cursor().index, 1);
        assert_eq!(
            exec.pwm,
            Some(PwmRequest::Drive {
                servo: ServoId::A,
                duty: 0x0F
            })
        );
    }

    #[test]
    fn test_mov_invalid_position_dropped() {
        let bytes = [mov(6), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let mut servo = ready_servo();

        let exec = step(&mut servo, &ctx(&recipe, &config));

        assert_eq!(exec, Execution::quiet(Outcome::Dropped));
        assert_eq!(servo.cursor().index, 0);
        assert_eq!(servo.status(), ServoStatus::Ready);
        assert!(servo.target_position.is_none());
    }

    #[test]
    fn test_mov_invalid_position_escalates() {
        let bytes = [mov(9), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig {
            fault_policy: FaultPolicy::Escalate,
            ..Default::default()
        };
        let mut servo = ready_servo();

        let exec = step(&mut servo, &ctx(&recipe, &config));

        assert_eq!(exec.outcome, Outcome::Faulted);
        assert_eq!(servo.status(), ServoStatus::Error);
        assert_eq!(
            exec.diagnostic,
            Some(Diagnostic::new(ServoId::A, DiagnosticKind::InvalidArgument(9)))
        );
        assert_eq!(servo.cursor().index, 0);
    }

    #[test]
    fn test_wait_sets_timer() {
        let bytes = [wait(31), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let mut servo = ready_servo();

        let exec = step(&mut servo, &ctx(&recipe, &config));

        assert_eq!(exec.outcome, Outcome::Advanced);
        assert!(exec.pwm.is_none());
        assert_eq!(servo.time_remaining_ms(), 3100);
        assert_eq!(servo.status(), ServoStatus::Running);
    }

    #[test]
    fn test_wait_out_of_range_dropped() {
        let bytes = [recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let mut servo = ready_servo();

        let exec = execute(&mut servo, CommandClass::Wait, 32, &ctx(&recipe, &config));
        assert_eq!(exec.outcome, Outcome::Dropped);
        assert_eq!(servo.status(), ServoStatus::Ready);
    }

    #[test]
    fn test_recipe_end_shared_channel() {
        let bytes = [recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();

        let mut servo = ready_servo();
        let exec = step(&mut servo, &ctx(&recipe, &config));
        assert_eq!(exec.outcome, Outcome::Finished);
        assert_eq!(exec.pwm, Some(PwmRequest::Disable(ServoId::A)));
        assert_eq!(
            exec.diagnostic,
            Some(Diagnostic::new(ServoId::A, DiagnosticKind::RecipeComplete))
        );
        assert!(servo.is_finished());
        assert_eq!(servo.cursor().index, 0);

        let mut servo = ready_servo();
        let alone = ExecContext {
            sibling_active: false,
            ..ctx(&recipe, &config)
        };
        let exec = step(&mut servo, &alone);
        assert_eq!(exec.pwm, Some(PwmRequest::DisableAll));
    }

    #[test]
    fn test_loop_start_and_end() {
        let bytes = [loop_start(1), wait(1), end_loop(), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let c = ctx(&recipe, &config);
        let mut servo = ready_servo();

        step(&mut servo, &c);
        assert_eq!(
            servo.loop_context(),
            Some(LoopContext {
                remaining: 1,
                body_start: 1
            })
        );
        assert_eq!(servo.cursor().index, 1);

        // Body, then END_LOOP jumps back once
        step(&mut servo, &c);
        assert_eq!(step(&mut servo, &c).outcome, Outcome::Jumped);
        assert_eq!(servo.cursor().index, 1);

        // Body again, then END_LOOP falls through
        step(&mut servo, &c);
        assert_eq!(step(&mut servo, &c).outcome, Outcome::Advanced);
        assert_eq!(servo.cursor().index, 3);
        assert!(!servo.loop_active());
    }

    #[test]
    fn test_nested_loop_is_error() {
        let bytes = [loop_start(2), loop_start(1), end_loop(), end_loop(), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let c = ctx(&recipe, &config);
        let mut servo = ready_servo();

        step(&mut servo, &c);
        let exec = step(&mut servo, &c);

        assert_eq!(exec.outcome, Outcome::Faulted);
        assert_eq!(servo.status(), ServoStatus::Error);
        assert_eq!(servo.cursor().index, 1);
        assert_eq!(
            exec.diagnostic,
            Some(Diagnostic::new(ServoId::A, DiagnosticKind::NestedLoop))
        );
    }

    #[test]
    fn test_break_loop_lands_past_end_loop() {
        let bytes = [loop_start(5), break_loop(), mov(1), end_loop(), wait(2), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let c = ctx(&recipe, &config);
        let mut servo = ready_servo();

        step(&mut servo, &c);
        assert_eq!(step(&mut servo, &c).outcome, Outcome::Jumped);
        assert_eq!(servo.cursor().index, 4);
        assert!(!servo.loop_active());
    }

    #[test]
    fn test_break_without_end_loop_rests_on_terminator() {
        let bytes = [break_loop(), mov(1), recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let mut servo = ready_servo();

        step(&mut servo, &ctx(&recipe, &config));
        assert_eq!(servo.cursor().index, 2);
    }

    #[test]
    fn test_undefined_command_stalls() {
        let bytes = [0xC3, recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig::default();
        let mut servo = ready_servo();

        let exec = step(&mut servo, &ctx(&recipe, &config));

        assert_eq!(exec.outcome, Outcome::Stalled);
        assert_eq!(servo.status(), ServoStatus::Ready);
        assert_eq!(servo.cursor(), Cursor::start(RecipeId(0)));
        assert_eq!(
            exec.diagnostic,
            Some(Diagnostic::new(ServoId::A, DiagnosticKind::UndefinedCommand(6)))
        );
        assert!(exec.outcome.is_stuck());
        assert!(servo.fault_reported());
    }

    #[test]
    fn test_undefined_command_escalates() {
        let bytes = [0xE0, recipe_end()];
        let recipe = Recipe::new(&bytes).unwrap();
        let config = ServoConfig {
            fault_policy: FaultPolicy::Escalate,
            ..Default::default()
        };
        let mut servo = ready_servo();

        let exec = step(&mut servo, &ctx(&recipe, &config));
        assert_eq!(exec.outcome, Outcome::Faulted);
        assert_eq!(servo.status(), ServoStatus::Error);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn mov_time_is_distance_times_200(from in 0u8..6, to in 0u8..6) {
                let bytes = [recipe_end()];
                let recipe = Recipe::new(&bytes).unwrap();
                let config = ServoConfig::default();
                let mut servo = ready_servo();
                servo.current_position = Position::new(from);

                execute(&mut servo, CommandClass::Mov, to, &ctx(&recipe, &config));
                prop_assert_eq!(servo.time_remaining_ms(), from.abs_diff(to) as i32 * 200);
            }

            #[test]
            fn mov_from_unset_is_target_times_200(to in 0u8..6) {
                let bytes = [recipe_end()];
                let recipe = Recipe::new(&bytes).unwrap();
                let config = ServoConfig::default();
                let mut servo = ready_servo();

                execute(&mut servo, CommandClass::Mov, to, &ctx(&recipe, &config));
                prop_assert_eq!(servo.time_remaining_ms(), to as i32 * 200);
            }

            #[test]
            fn wait_time_is_arg_times_100(arg in 0u8..32) {
                let bytes = [recipe_end()];
                let recipe = Recipe::new(&bytes).unwrap();
                let config = ServoConfig::default();
                let mut servo = ready_servo();

                execute(&mut servo, CommandClass::Wait, arg, &ctx(&recipe, &config));
                prop_assert_eq!(servo.time_remaining_ms(), arg as i32 * 100);
            }
        }
    }
}
