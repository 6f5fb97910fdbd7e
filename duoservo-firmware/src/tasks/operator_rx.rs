//! Operator UART receive task
//!
//! Assembles terminal bytes into command lines and forwards them to the
//! controller.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use duoservo_protocol::LineParser;

use crate::channels::{StatusMessage, INPUT_CHANNEL, STATUS_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Operator RX task - parses command lines from the terminal
#[embassy_executor::task]
pub async fn operator_rx_task(mut rx: BufferedUartRx) {
    info!("Operator RX task started");

    let mut parser = LineParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(input)) => {
                            debug!("Operator line: {:?}", input);
                            if INPUT_CHANNEL.try_send(input).is_err() {
                                warn!("Input channel full, dropping line");
                            }
                        }
                        Ok(None) => {}
                        Err(e) => {
                            warn!("Operator input error: {:?}", e);
                            let _ = STATUS_CHANNEL.try_send(StatusMessage::InputError(e));
                        }
                    }
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
                parser.reset();
            }
        }
    }
}
