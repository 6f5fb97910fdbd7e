//! Line assembly for operator terminal input
//!
//! Line format:
//! - COMMAND A (1 char): command for servo A
//! - COMMAND B (0-1 char): command for servo B
//! - EOL: CR or LF (CRLF is accepted, the empty line it leaves is ignored)
//!
//! Spaces and tabs are ignored. `X` cancels the line being typed.

use heapless::Vec;

use crate::command::OperatorCommand;

/// Maximum number of command letters on one line (one per servo)
pub const MAX_LINE_LEN: usize = 2;

const LINE_CANCEL: u8 = b'X';

/// Errors that can occur while assembling an input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Byte is not part of the command alphabet
    InvalidCommand(u8),
    /// More command letters than servos
    LineTooLong,
}

/// A complete operator input line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatorInput {
    /// Command for servo A
    pub a: OperatorCommand,
    /// Command for servo B, if one was typed
    pub b: Option<OperatorCommand>,
}

impl OperatorInput {
    /// Commands indexed by servo (A first)
    pub fn commands(&self) -> [Option<OperatorCommand>; MAX_LINE_LEN] {
        [Some(self.a), self.b]
    }
}

/// Incremental parser for operator input lines
#[derive(Debug, Clone, Default)]
pub struct LineParser {
    letters: Vec<OperatorCommand, MAX_LINE_LEN>,
    /// Set after an error; bytes are dropped until the next EOL
    discarding: bool,
}

impl LineParser {
    /// Create a new line parser
    pub fn new() -> Self {
        Self {
            letters: Vec::new(),
            discarding: false,
        }
    }

    /// Reset the parser state
    pub fn reset(&mut self) {
        self.letters.clear();
        self.discarding = false;
    }

    /// Number of command letters typed on the current line
    pub fn pending(&self) -> usize {
        self.letters.len()
    }

    /// Feed a single byte to the parser
    ///
    /// Returns `Ok(Some(input))` when a line is complete, `Ok(None)` when more
    /// bytes are needed, or `Err` on the first bad byte of a line. After an
    /// error the rest of that line is ignored.
    pub fn feed(&mut self, byte: u8) -> Result<Option<OperatorInput>, ParseError> {
        match byte {
            b'\r' | b'\n' => {
                let input = if self.discarding {
                    None
                } else {
                    self.take_line()
                };
                self.reset();
                Ok(input)
            }
            _ if self.discarding => Ok(None),
            b' ' | b'\t' => Ok(None),
            _ if byte.to_ascii_uppercase() == LINE_CANCEL => {
                self.reset();
                Ok(None)
            }
            _ => {
                let cmd = match OperatorCommand::from_byte(byte) {
                    Some(cmd) => cmd,
                    None => {
                        self.letters.clear();
                        self.discarding = true;
                        return Err(ParseError::InvalidCommand(byte));
                    }
                };
                if self.letters.push(cmd).is_err() {
                    self.letters.clear();
                    self.discarding = true;
                    return Err(ParseError::LineTooLong);
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the parser
    ///
    /// Returns the first complete line found, if any.
    /// Remaining bytes after a complete line are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<OperatorInput>, ParseError> {
        for &byte in bytes {
            if let Some(input) = self.feed(byte)? {
                return Ok(Some(input));
            }
        }
        Ok(None)
    }

    fn take_line(&self) -> Option<OperatorInput> {
        let a = *self.letters.first()?;
        Some(OperatorInput {
            a,
            b: self.letters.get(1).copied(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_servo_line() {
        let mut parser = LineParser::new();
        let input = parser.feed_bytes(b"pc\r").unwrap().unwrap();

        assert_eq!(input.a, OperatorCommand::Pause);
        assert_eq!(input.b, Some(OperatorCommand::Continue));
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_single_letter_addresses_a() {
        let mut parser = LineParser::new();
        let input = parser.feed_bytes(b"R\n").unwrap().unwrap();

        assert_eq!(input.a, OperatorCommand::JogRight);
        assert_eq!(input.b, None);
        assert_eq!(input.commands(), [Some(OperatorCommand::JogRight), None]);
    }

    #[test]
    fn test_crlf_and_blank_lines_ignored() {
        let mut parser = LineParser::new();
        assert_eq!(parser.feed_bytes(b"\r\n\r\n"), Ok(None));

        let input = parser.feed_bytes(b"ns\r\n").unwrap().unwrap();
        assert_eq!(input.a, OperatorCommand::NoOp);
        assert_eq!(input.b, Some(OperatorCommand::Swap));

        // Trailing LF of the CRLF pair produces nothing
        assert_eq!(parser.feed(b'\n'), Ok(None));
    }

    #[test]
    fn test_cancel_discards_line() {
        let mut parser = LineParser::new();
        assert_eq!(parser.feed_bytes(b"px"), Ok(None));
        assert_eq!(parser.pending(), 0);

        let input = parser.feed_bytes(b"bb\r").unwrap().unwrap();
        assert_eq!(input.a, OperatorCommand::Restart);
        assert_eq!(input.b, Some(OperatorCommand::Restart));
    }

    #[test]
    fn test_whitespace_ignored() {
        let mut parser = LineParser::new();
        let input = parser.feed_bytes(b" l \t r\r").unwrap().unwrap();
        assert_eq!(input.a, OperatorCommand::JogLeft);
        assert_eq!(input.b, Some(OperatorCommand::JogRight));
    }

    #[test]
    fn test_invalid_letter_drops_rest_of_line() {
        let mut parser = LineParser::new();
        assert_eq!(parser.feed(b'q'), Err(ParseError::InvalidCommand(b'q')));

        // The remainder of the bad line is ignored, including its EOL
        assert_eq!(parser.feed_bytes(b"p\r"), Ok(None));

        // The next line parses normally
        let input = parser.feed_bytes(b"p\r").unwrap().unwrap();
        assert_eq!(input.a, OperatorCommand::Pause);
    }

    #[test]
    fn test_line_too_long() {
        let mut parser = LineParser::new();
        assert_eq!(parser.feed_bytes(b"pcp"), Err(ParseError::LineTooLong));
        assert_eq!(parser.feed(b'\r'), Ok(None));
        assert_eq!(parser.pending(), 0);
    }

    #[test]
    fn test_remaining_bytes_not_consumed() {
        let mut parser = LineParser::new();
        let data = b"c\rp";
        let input = parser.feed_bytes(data).unwrap().unwrap();
        assert_eq!(input.a, OperatorCommand::Continue);
        assert_eq!(parser.pending(), 0);
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_valid_pair_parses(a in 0usize..7, b in 0usize..7, lower in any::<bool>()) {
                let ca = OperatorCommand::ALL[a];
                let cb = OperatorCommand::ALL[b];
                let fold = |c: OperatorCommand| if lower { c.to_byte().to_ascii_lowercase() } else { c.to_byte() };

                let mut parser = LineParser::new();
                let line = [fold(ca), fold(cb), b'\r'];
                let input = parser.feed_bytes(&line).unwrap().unwrap();
                prop_assert_eq!(input.a, ca);
                prop_assert_eq!(input.b, Some(cb));
            }

            #[test]
            fn parser_never_panics(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
                let mut parser = LineParser::new();
                for byte in bytes {
                    let _ = parser.feed(byte);
                    prop_assert!(parser.pending() <= MAX_LINE_LEN);
                }
            }
        }
    }
}
