//! Status UART transmit task
//!
//! Prints diagnostics and input errors on the operator terminal, one line
//! each.

use core::fmt::Write as _;

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;
use heapless::String;

use duoservo_core::servo::{Diagnostic, DiagnosticKind};
use duoservo_protocol::ParseError;

use crate::channels::{StatusMessage, STATUS_CHANNEL};

/// Longest status line, CRLF included
const LINE_LEN: usize = 80;

const BANNER: &str = "\r\nduoservo ready\r\n\
    keys per servo (A then B, Enter to send, X to cancel):\r\n\
    C continue  P pause  B restart  N skip  R/L jog  S swap\r\n";

/// Status TX task - writes terminal lines
#[embassy_executor::task]
pub async fn status_tx_task(mut tx: BufferedUartTx) {
    info!("Status TX task started");

    loop {
        let message = STATUS_CHANNEL.receive().await;

        let result = match message {
            StatusMessage::Banner => tx.write_all(BANNER.as_bytes()).await,
            StatusMessage::Diagnostic(diagnostic) => {
                tx.write_all(diagnostic_line(&diagnostic).as_bytes()).await
            }
            StatusMessage::InputError(error) => {
                tx.write_all(input_error_line(error).as_bytes()).await
            }
        };

        if let Err(e) = result {
            warn!("Failed to send status line: {:?}", e);
        }
    }
}

/// `A: undefined command (0xC1)` style line
fn diagnostic_line(diagnostic: &Diagnostic) -> String<LINE_LEN> {
    let mut line = String::new();
    let _ = write!(line, "{}: {}", diagnostic.servo.letter(), diagnostic.message());
    let _ = match diagnostic.kind {
        DiagnosticKind::UndefinedCommand(class) => write!(line, " (class {})", class),
        DiagnosticKind::InvalidArgument(arg) => write!(line, " ({})", arg),
        _ => Ok(()),
    };
    let _ = line.push_str("\r\n");
    line
}

fn input_error_line(error: ParseError) -> String<LINE_LEN> {
    let mut line = String::new();
    let _ = match error {
        ParseError::InvalidCommand(byte) if byte.is_ascii_graphic() => {
            write!(line, "? unknown key '{}'\r\n", byte as char)
        }
        ParseError::InvalidCommand(byte) => write!(line, "? unknown byte 0x{:02X}\r\n", byte),
        ParseError::LineTooLong => write!(line, "? one key per servo\r\n"),
    };
    line
}
