//! Tick task
//!
//! Paces the scheduler and warns when the controller falls a tick behind.
//! An unconsumed tick is overwritten, not queued.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::channels::TICK_SIGNAL;

/// Tick task - signals the controller every `period_ms`
#[embassy_executor::task]
pub async fn tick_task(period_ms: u16) {
    info!("Tick task started ({} ms)", period_ms);

    let mut ticker = Ticker::every(Duration::from_millis(period_ms as u64));
    let mut overruns: u32 = 0;

    loop {
        ticker.next().await;

        if TICK_SIGNAL.signaled() {
            overruns = overruns.wrapping_add(1);
            warn!("Controller missed a tick ({} so far)", overruns);
        }
        TICK_SIGNAL.signal(());
    }
}
