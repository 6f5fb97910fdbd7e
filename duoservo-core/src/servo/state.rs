//! Per-servo control block

use crate::recipe::{Cursor, RecipeId};

/// Number of servos driven by the scheduler
pub const SERVO_COUNT: usize = 2;

/// Servo identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoId {
    /// First servo (PWM channel 0)
    A,
    /// Second servo (PWM channel 1)
    B,
}

impl ServoId {
    /// All servos in service order
    pub const ALL: [ServoId; SERVO_COUNT] = [ServoId::A, ServoId::B];

    /// Table index for this servo
    pub const fn index(self) -> usize {
        match self {
            ServoId::A => 0,
            ServoId::B => 1,
        }
    }

    /// The other servo
    pub const fn sibling(self) -> Self {
        match self {
            ServoId::A => ServoId::B,
            ServoId::B => ServoId::A,
        }
    }

    /// Recipe this servo is created with
    pub const fn home_recipe(self) -> RecipeId {
        RecipeId(self.index() as u8)
    }

    /// Label used on the terminal
    pub const fn letter(self) -> char {
        match self {
            ServoId::A => 'A',
            ServoId::B => 'B',
        }
    }
}

/// Servo execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ServoStatus {
    /// Waiting to dispatch the next instruction
    Ready,
    /// Timed instruction in progress
    Running,
    /// Held by the operator
    Paused,
    /// Faulted; only a restart recovers
    Error,
    /// Skipping the current tick
    Idle,
}

/// Discretized servo position (0-5)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Position(u8);

impl Position {
    /// Rightmost position
    pub const MIN: Position = Position(0);
    /// Leftmost position
    pub const MAX: Position = Position(5);
    /// Number of discrete positions
    pub const COUNT: usize = 6;

    /// Create a position, or None if out of range
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX.0 {
            Some(Position(value))
        } else {
            None
        }
    }

    /// Raw position value
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Number of positions between two positions
    pub const fn distance(self, other: Position) -> u8 {
        self.0.abs_diff(other.0)
    }

    /// Position one step away, or None at the bound
    pub fn step(self, delta: i8) -> Option<Self> {
        let next = self.0 as i16 + delta as i16;
        u8::try_from(next).ok().and_then(Position::new)
    }
}

/// Active loop bookkeeping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopContext {
    /// Further repetitions of the body
    pub remaining: u8,
    /// Index of the first body instruction
    pub body_start: u8,
}

/// Control block for one servo
///
/// Created once at startup and reset in place; never reallocated.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoState {
    id: ServoId,
    home: RecipeId,
    pub(crate) status: ServoStatus,
    pub(crate) cursor: Cursor,
    pub(crate) finished: bool,
    /// At most one loop may be open
    pub(crate) loop_ctx: Option<LoopContext>,
    /// None until the first move completes
    pub(crate) current_position: Option<Position>,
    pub(crate) target_position: Option<Position>,
    /// Only meaningful while Running
    pub(crate) time_remaining_ms: i32,
    /// Status restored when an Idle skip ends
    pub(crate) resume_status: Option<ServoStatus>,
    /// A fault diagnostic went out since the last restart
    pub(crate) fault_reported: bool,
}

impl ServoState {
    /// Create a paused servo at the start of its home recipe
    pub fn new(id: ServoId) -> Self {
        let home = id.home_recipe();
        Self {
            id,
            home,
            status: ServoStatus::Paused,
            cursor: Cursor::start(home),
            finished: false,
            loop_ctx: None,
            current_position: None,
            target_position: None,
            time_remaining_ms: 0,
            resume_status: None,
            fault_reported: false,
        }
    }

    /// Servo identity
    pub fn id(&self) -> ServoId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> ServoStatus {
        self.status
    }

    /// Current read position
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Recipe a restart returns to
    pub fn home_recipe(&self) -> RecipeId {
        self.home
    }

    /// Check if `RECIPE_END` has been dispatched
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Active loop, if any
    pub fn loop_context(&self) -> Option<LoopContext> {
        self.loop_ctx
    }

    /// Check if a loop is open
    pub fn loop_active(&self) -> bool {
        self.loop_ctx.is_some()
    }

    /// Last committed position (None before the first move)
    pub fn current_position(&self) -> Option<Position> {
        self.current_position
    }

    /// Time left on the running instruction
    pub fn time_remaining_ms(&self) -> i32 {
        self.time_remaining_ms
    }

    /// Check if the scheduler should dispatch this tick
    pub fn is_dispatchable(&self) -> bool {
        self.status == ServoStatus::Ready && !self.finished
    }

    /// Check if this servo still needs its PWM channel
    pub fn is_active(&self) -> bool {
        !self.finished && self.status != ServoStatus::Error
    }

    /// Check if a fault was reported since the last restart
    ///
    /// Stalled faults leave the status alone, so this can be true while
    /// the servo is Ready.
    pub fn fault_reported(&self) -> bool {
        self.fault_reported
    }

    /// Rewind to the home recipe and clear all run state
    ///
    /// Returns true if an error or a reported fault was cleared. Positions
    /// are kept: the horn has not moved.
    pub fn restart(&mut self) -> bool {
        let was_error = self.status == ServoStatus::Error || self.fault_reported;
        self.status = ServoStatus::Ready;
        self.cursor = Cursor::start(self.home);
        self.finished = false;
        self.loop_ctx = None;
        self.time_remaining_ms = 0;
        self.resume_status = None;
        self.fault_reported = false;
        was_error
    }

    /// Skip the current tick, returning to `resume` on the next one
    pub(crate) fn skip_tick(&mut self, resume: ServoStatus) {
        self.resume_status = Some(resume);
        self.status = ServoStatus::Idle;
    }

    /// End an Idle skip
    pub(crate) fn end_skip(&mut self) {
        if self.status == ServoStatus::Idle {
            self.status = self.resume_status.take().unwrap_or(ServoStatus::Ready);
        }
    }

    /// Commit the pending move and become Ready
    pub(crate) fn complete(&mut self) {
        if self.target_position.is_some() {
            self.current_position = self.target_position;
        }
        self.status = ServoStatus::Ready;
    }

    /// Count down one tick; returns true when the instruction completed
    pub(crate) fn count_down(&mut self, quantum_ms: u16) -> bool {
        self.time_remaining_ms -= quantum_ms as i32;
        if self.time_remaining_ms <= 0 {
            self.complete();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_servo_identity() {
        assert_eq!(ServoId::A.sibling(), ServoId::B);
        assert_eq!(ServoId::B.sibling(), ServoId::A);
        assert_eq!(ServoId::B.index(), 1);
        assert_eq!(ServoId::A.home_recipe(), RecipeId(0));
    }

    #[test]
    fn test_position_bounds() {
        assert_eq!(Position::new(5), Some(Position::MAX));
        assert!(Position::new(6).is_none());
        assert_eq!(Position::MIN.step(-1), None);
        assert_eq!(Position::MAX.step(1), None);
        assert_eq!(Position::MIN.step(1).map(Position::value), Some(1));
        assert_eq!(Position::MAX.distance(Position::MIN), 5);
    }

    #[test]
    fn test_initial_state() {
        let servo = ServoState::new(ServoId::B);
        assert_eq!(servo.status(), ServoStatus::Paused);
        assert_eq!(servo.cursor(), Cursor::start(RecipeId(1)));
        assert!(servo.current_position().is_none());
        assert!(!servo.is_dispatchable());
        assert!(servo.is_active());
    }

    #[test]
    fn test_restart_clears_everything_together() {
        let mut servo = ServoState::new(ServoId::A);
        servo.status = ServoStatus::Error;
        servo.cursor = Cursor::start(RecipeId(1)).at(4);
        servo.finished = true;
        servo.loop_ctx = Some(LoopContext {
            remaining: 2,
            body_start: 1,
        });
        servo.current_position = Position::new(3);

        assert!(servo.restart());
        assert_eq!(servo.status(), ServoStatus::Ready);
        assert_eq!(servo.cursor(), Cursor::start(RecipeId(0)));
        assert!(!servo.is_finished());
        assert!(!servo.loop_active());
        assert_eq!(servo.current_position(), Position::new(3));

        // Second restart has no error to clear
        assert!(!servo.restart());
    }

    #[test]
    fn test_restart_clears_stalled_fault() {
        let mut servo = ServoState::new(ServoId::A);
        servo.status = ServoStatus::Ready;
        servo.fault_reported = true;

        assert!(servo.restart());
        assert!(!servo.fault_reported());
        assert!(!servo.restart());
    }

    #[test]
    fn test_count_down_commits_position() {
        let mut servo = ServoState::new(ServoId::A);
        servo.status = ServoStatus::Running;
        servo.target_position = Position::new(2);
        servo.time_remaining_ms = 200;

        assert!(!servo.count_down(100));
        assert_eq!(servo.status(), ServoStatus::Running);
        assert!(servo.current_position().is_none());

        assert!(servo.count_down(100));
        assert_eq!(servo.status(), ServoStatus::Ready);
        assert_eq!(servo.current_position(), Position::new(2));
    }

    #[test]
    fn test_skip_tick_resumes() {
        let mut servo = ServoState::new(ServoId::A);
        servo.status = ServoStatus::Running;
        servo.skip_tick(ServoStatus::Running);
        assert_eq!(servo.status(), ServoStatus::Idle);

        servo.end_skip();
        assert_eq!(servo.status(), ServoStatus::Running);
    }
}
