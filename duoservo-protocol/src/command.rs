//! Operator command alphabet

/// A single operator command addressed to one servo
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatorCommand {
    /// Resume recipe dispatch
    Continue,
    /// Suspend recipe dispatch
    Pause,
    /// Rewind to the start of the servo's own recipe, clearing any error
    Restart,
    /// Skip one tick
    NoOp,
    /// Step one position towards 0
    JogRight,
    /// Step one position towards 5
    JogLeft,
    /// Take over the sibling servo's playback cursor
    Swap,
}

// Wire format values (upper case; parsing accepts either case)
const CMD_CONTINUE: u8 = b'C';
const CMD_PAUSE: u8 = b'P';
const CMD_RESTART: u8 = b'B';
const CMD_NOOP: u8 = b'N';
const CMD_JOG_RIGHT: u8 = b'R';
const CMD_JOG_LEFT: u8 = b'L';
const CMD_SWAP: u8 = b'S';

impl OperatorCommand {
    /// All commands, in alphabet order
    pub const ALL: [OperatorCommand; 7] = [
        OperatorCommand::Continue,
        OperatorCommand::Pause,
        OperatorCommand::Restart,
        OperatorCommand::NoOp,
        OperatorCommand::JogRight,
        OperatorCommand::JogLeft,
        OperatorCommand::Swap,
    ];

    /// Parse a command from its terminal character (case-insensitive)
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte.to_ascii_uppercase() {
            CMD_CONTINUE => Some(OperatorCommand::Continue),
            CMD_PAUSE => Some(OperatorCommand::Pause),
            CMD_RESTART => Some(OperatorCommand::Restart),
            CMD_NOOP => Some(OperatorCommand::NoOp),
            CMD_JOG_RIGHT => Some(OperatorCommand::JogRight),
            CMD_JOG_LEFT => Some(OperatorCommand::JogLeft),
            CMD_SWAP => Some(OperatorCommand::Swap),
            _ => None,
        }
    }

    /// Convert to terminal character
    pub fn to_byte(self) -> u8 {
        match self {
            OperatorCommand::Continue => CMD_CONTINUE,
            OperatorCommand::Pause => CMD_PAUSE,
            OperatorCommand::Restart => CMD_RESTART,
            OperatorCommand::NoOp => CMD_NOOP,
            OperatorCommand::JogRight => CMD_JOG_RIGHT,
            OperatorCommand::JogLeft => CMD_JOG_LEFT,
            OperatorCommand::Swap => CMD_SWAP,
        }
    }

    /// Position delta requested by a jog (-1, 0, or +1)
    pub fn jog_delta(&self) -> i8 {
        match self {
            OperatorCommand::JogRight => -1,
            OperatorCommand::JogLeft => 1,
            _ => 0,
        }
    }
}
