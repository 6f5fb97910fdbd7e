//! Tick scheduler
//!
//! Owns both servos, their recipes and their mailboxes. Each call to
//! [`Scheduler::tick`] runs to completion:
//!
//! 1. Servos that skipped the previous tick return to their prior status.
//! 2. Pending operator commands are applied, A then B.
//! 3. Each servo (A then B) either dispatches its next instruction or counts
//!    down the one in flight.

use duoservo_protocol::{OperatorCommand, OperatorInput};
use heapless::Vec;

use super::router::{route, Mailbox};
use crate::config::ServoConfig;
use crate::recipe::Recipe;
use crate::servo::{
    step, Diagnostic, ExecContext, Execution, Outcome, PwmRequest, ServoId, ServoState,
    ServoStatus, SERVO_COUNT,
};
use crate::traits::{ServoOutput, StatusIndicator};

/// Maximum effects of one kind a single tick can produce
///
/// Per servo: one from the router, one from dispatch.
pub const MAX_TICK_EFFECTS: usize = 2 * SERVO_COUNT;

/// Everything one tick produced, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Tick number (first tick is 1)
    pub tick: u32,
    /// PWM changes for the hardware layer
    pub pwm: Vec<PwmRequest, MAX_TICK_EFFECTS>,
    /// Diagnostics for the status layer
    pub diagnostics: Vec<Diagnostic, MAX_TICK_EFFECTS>,
    /// Dispatch outcome per servo, if it dispatched this tick
    pub outcomes: [Option<Outcome>; SERVO_COUNT],
}

impl TickReport {
    /// Dispatch outcome for one servo
    pub fn outcome(&self, id: ServoId) -> Option<Outcome> {
        self.outcomes[id.index()]
    }

    /// Check if the tick changed nothing outside the servos
    pub fn is_quiet(&self) -> bool {
        self.pwm.is_empty() && self.diagnostics.is_empty()
    }

    /// Forward PWM requests and diagnostics to the hardware
    pub fn apply<O, S>(&self, output: &mut O, status: &mut S) -> Result<(), O::Error>
    where
        O: ServoOutput,
        S: StatusIndicator,
    {
        for diagnostic in &self.diagnostics {
            status.indicate(*diagnostic);
        }
        for request in &self.pwm {
            output.apply(*request)?;
        }
        Ok(())
    }

    fn record(&mut self, pwm: Option<PwmRequest>, diagnostic: Option<Diagnostic>) {
        // Capacity covers the worst case; a push can't fail
        if let Some(request) = pwm {
            let _ = self.pwm.push(request);
        }
        if let Some(diagnostic) = diagnostic {
            let _ = self.diagnostics.push(diagnostic);
        }
    }
}

/// Two-servo recipe scheduler
#[derive(Debug)]
pub struct Scheduler<'r> {
    config: ServoConfig,
    recipes: [Recipe<'r>; SERVO_COUNT],
    servos: [ServoState; SERVO_COUNT],
    mailboxes: [Mailbox; SERVO_COUNT],
    ticks: u32,
}

impl<'r> Scheduler<'r> {
    /// Create a scheduler; servo A's home recipe is `recipes[0]`
    ///
    /// Both servos start Paused with an unknown position.
    pub fn new(config: ServoConfig, recipes: [Recipe<'r>; SERVO_COUNT]) -> Self {
        Self {
            config,
            recipes,
            servos: [ServoState::new(ServoId::A), ServoState::new(ServoId::B)],
            mailboxes: [Mailbox::new(); SERVO_COUNT],
            ticks: 0,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &ServoConfig {
        &self.config
    }

    /// Servo control block
    pub fn servo(&self, id: ServoId) -> &ServoState {
        &self.servos[id.index()]
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u32 {
        self.ticks
    }

    /// Pending command for a servo
    pub fn pending(&self, id: ServoId) -> Option<OperatorCommand> {
        self.mailboxes[id.index()].peek()
    }

    /// Post an operator command; returns the undrained command it replaced
    pub fn post(&mut self, id: ServoId, command: OperatorCommand) -> Option<OperatorCommand> {
        self.mailboxes[id.index()].post(command)
    }

    /// Post a parsed input line
    ///
    /// Returns, per servo, the undrained command each post replaced.
    pub fn post_input(
        &mut self,
        input: OperatorInput,
    ) -> [Option<OperatorCommand>; SERVO_COUNT] {
        let mut replaced = [None; SERVO_COUNT];
        for (id, command) in ServoId::ALL.into_iter().zip(input.commands()) {
            if let Some(command) = command {
                replaced[id.index()] = self.post(id, command);
            }
        }
        replaced
    }

    /// Check if no servo can make progress without operator input
    pub fn is_quiescent(&self) -> bool {
        self.servos.iter().all(|servo| {
            servo.is_finished()
                || matches!(servo.status(), ServoStatus::Error | ServoStatus::Paused)
        })
    }

    /// Run one scheduling quantum
    pub fn tick(&mut self) -> TickReport {
        self.ticks = self.ticks.wrapping_add(1);
        let mut report = TickReport {
            tick: self.ticks,
            ..Default::default()
        };

        for servo in &mut self.servos {
            servo.end_skip();
        }

        for id in ServoId::ALL {
            if let Some(command) = self.mailboxes[id.index()].take() {
                let routed = route(&mut self.servos, id, command, &self.recipes, &self.config);
                report.record(routed.pwm, routed.diagnostic);
            }
        }

        for id in ServoId::ALL {
            if let Some(exec) = self.service(id) {
                report.outcomes[id.index()] = Some(exec.outcome);
                report.record(exec.pwm, exec.diagnostic);
            }
        }

        report
    }

    /// Dispatch or count down one servo
    fn service(&mut self, id: ServoId) -> Option<Execution> {
        let sibling_active = self.servos[id.sibling().index()].is_active();
        let servo = &mut self.servos[id.index()];

        if servo.is_dispatchable() {
            let ctx = ExecContext {
                recipe: &self.recipes[servo.cursor().recipe.index()],
                config: &self.config,
                sibling_active,
            };
            let exec = step(servo, &ctx);
            // Zero-length instructions finish on their dispatch tick
            if servo.status() == ServoStatus::Running && servo.time_remaining_ms() <= 0 {
                servo.complete();
            }
            return Some(exec);
        }

        if servo.status() == ServoStatus::Running {
            servo.count_down(self.config.tick_ms);
        }
        None
    }
}
