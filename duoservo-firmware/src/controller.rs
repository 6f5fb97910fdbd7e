//! Controller
//!
//! Owns the scheduler and the hardware outputs. Operator lines are posted
//! to the scheduler's mailboxes as they arrive; each tick runs the
//! scheduler once and pushes its report out to the PWM bank and the
//! status indicators.

use defmt::*;

use duoservo_core::scheduler::{Scheduler, TickReport};
use duoservo_core::servo::{Diagnostic, ServoId};
use duoservo_core::traits::{ServoOutput, StatusIndicator};
use duoservo_protocol::OperatorInput;

use crate::channels::{StatusMessage, STATUS_CHANNEL};

/// Status indicator that also reports to the terminal
pub struct StatusForwarder<L> {
    leds: L,
}

impl<L: StatusIndicator> StatusForwarder<L> {
    /// Wrap an LED indicator
    pub fn new(leds: L) -> Self {
        Self { leds }
    }
}

impl<L: StatusIndicator> StatusIndicator for StatusForwarder<L> {
    fn indicate(&mut self, diagnostic: Diagnostic) {
        self.leds.indicate(diagnostic);
        if STATUS_CHANNEL
            .try_send(StatusMessage::Diagnostic(diagnostic))
            .is_err()
        {
            warn!("Status channel full, dropping {:?}", diagnostic);
        }
    }
}

/// Scheduler plus its outputs
pub struct Controller<'r, O, S> {
    scheduler: Scheduler<'r>,
    output: O,
    status: S,
}

impl<'r, O, S> Controller<'r, O, S>
where
    O: ServoOutput,
    O::Error: Format,
    S: StatusIndicator,
{
    /// Create a new controller
    pub fn new(scheduler: Scheduler<'r>, output: O, status: S) -> Self {
        Self {
            scheduler,
            output,
            status,
        }
    }

    /// Queue an operator line for the next tick
    pub fn post_input(&mut self, input: OperatorInput) {
        let replaced = self.scheduler.post_input(input);
        for (servo, lost) in ServoId::ALL.into_iter().zip(replaced) {
            if let Some(lost) = lost {
                debug!("Servo {:?}: {:?} replaced before the tick", servo, lost);
            }
        }
    }

    /// Run one tick and drive the outputs
    pub fn tick(&mut self) -> TickReport {
        let report = self.scheduler.tick();

        for servo in ServoId::ALL {
            if let Some(outcome) = report.outcome(servo) {
                if outcome.is_stuck() {
                    warn!("Tick {}: servo {:?} {:?}", report.tick, servo, outcome);
                    continue;
                }
                debug!(
                    "Tick {}: servo {:?} {:?} -> {:?}",
                    report.tick,
                    servo,
                    outcome,
                    self.scheduler.servo(servo).status()
                );
            }
        }

        if let Err(e) = report.apply(&mut self.output, &mut self.status) {
            warn!("PWM update failed: {:?}", e);
        }

        if self.scheduler.is_quiescent() && !report.is_quiet() {
            info!("Both servos waiting for the operator");
        }
        trace!("Tick {} done", report.tick);
        report
    }
}
