//! duoservo - Dual Servo Recipe Controller Firmware
//!
//! Main firmware binary for RP2040 boards. Two hobby servos each play a
//! built-in recipe on a 100 ms tick while an operator steers them from a
//! serial terminal.
//!
//! Pins:
//! - GPIO0/1: UART0 TX/RX to the operator terminal (115200 8N1)
//! - GPIO2/3: PWM slice 1 A/B to servo A and servo B
//! - GPIO14/15: error LEDs for servo A and servo B

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::peripherals::UART0;
use embassy_rp::pwm::{Config as PwmConfig, Pwm};
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use duoservo_core::config::ServoConfig;
use duoservo_core::scheduler::Scheduler;
use duoservo_drivers::servo::PwmServoBank;
use duoservo_drivers::status::ErrorLeds;

use crate::controller::{Controller, StatusForwarder};

mod channels;
mod controller;
mod recipes;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Servo frame rate
const SERVO_FRAME_HZ: u32 = 50;

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("duoservo firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    let config = ServoConfig::default();
    if let Err(e) = config.validate() {
        error!("Servo configuration invalid: {:?}", e);
        return;
    }

    let recipes = match recipes::load() {
        Ok(recipes) => recipes,
        Err(e) => {
            error!("Built-in recipe invalid: {:?}", e);
            return;
        }
    };
    info!(
        "Recipes loaded: A={} bytes, B={} bytes",
        recipes[0].len(),
        recipes[1].len()
    );

    // Operator terminal
    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, UartConfig::default());
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for operator terminal");

    // One PWM slice for both servos. Smallest divider that fits a 20 ms
    // frame in the 16-bit counter; duty ticks are scaled onto `top`.
    let clk_hz = embassy_rp::clocks::clk_sys_freq();
    let divider = (clk_hz / (SERVO_FRAME_HZ * 65_536) + 1).clamp(1, 255) as u8;
    let mut pwm_config = PwmConfig::default();
    pwm_config.divider = divider.into();
    pwm_config.top = (clk_hz / (SERVO_FRAME_HZ * divider as u32))
        .saturating_sub(1)
        .min(u16::MAX as u32) as u16;

    let pwm = Pwm::new_output_ab(p.PWM_SLICE1, p.PIN_2, p.PIN_3, pwm_config);
    let (Some(pwm_a), Some(pwm_b)) = pwm.split() else {
        error!("PWM slice split failed");
        return;
    };

    let servos = match PwmServoBank::new(pwm_a, pwm_b, config.pwm_period) {
        Ok(bank) => bank,
        Err(e) => {
            error!("Servo PWM init failed: {:?}", e);
            return;
        }
    };

    info!(
        "PWM initialized: divider={}, top={}",
        divider, pwm_config.top
    );

    let leds = ErrorLeds::new(
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::Low),
        false,
    );

    let tick_ms = config.tick_ms;
    let scheduler = Scheduler::new(config, recipes);
    let controller = Controller::new(scheduler, servos, StatusForwarder::new(leds));

    // Spawn tasks
    spawner.spawn(tasks::tick_task(tick_ms)).unwrap();
    spawner.spawn(tasks::operator_rx_task(rx)).unwrap();
    spawner.spawn(tasks::status_tx_task(tx)).unwrap();
    spawner.spawn(tasks::controller_task(controller)).unwrap();

    info!("All tasks spawned, servos paused until the operator continues");
}
