//! Main controller task
//!
//! Waits for operator lines and ticks and hands both to the controller, so
//! all servo state changes happen in this one task.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::Output;
use embassy_rp::pwm::PwmOutput;

use duoservo_drivers::servo::PwmServoBank;
use duoservo_drivers::status::ErrorLeds;

use crate::channels::{StatusMessage, INPUT_CHANNEL, STATUS_CHANNEL, TICK_SIGNAL};
use crate::controller::{Controller, StatusForwarder};

/// PWM bank on one RP2040 slice
pub type ServoBank = PwmServoBank<PwmOutput<'static>, PwmOutput<'static>>;

/// Error LEDs plus terminal reporting
pub type Indicator = StatusForwarder<ErrorLeds<Output<'static>>>;

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(mut controller: Controller<'static, ServoBank, Indicator>) {
    info!("Controller task started");

    let _ = STATUS_CHANNEL.try_send(StatusMessage::Banner);

    loop {
        match select(INPUT_CHANNEL.receive(), TICK_SIGNAL.wait()).await {
            Either::First(input) => {
                debug!("Input: {:?}", input);
                controller.post_input(input);
            }
            Either::Second(()) => {
                controller.tick();
            }
        }
    }
}
