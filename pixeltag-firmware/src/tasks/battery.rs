//! Battery sampling task

use defmt::*;
use embassy_time::{Duration, Ticker};

use pixeltag_core::lifecycle::battery_percent;
use pixeltag_hal_rp2040::battery::BatteryMonitor;

use crate::channels::BATTERY_READING;
use crate::config::BADGE_CONFIG;

/// Samples VSYS once per notification period
#[embassy_executor::task]
pub async fn battery_task(mut monitor: BatteryMonitor<'static>) {
    info!("Battery task started");

    let mut ticker = Ticker::every(Duration::from_millis(
        BADGE_CONFIG.battery_notify_ms as u64,
    ));

    loop {
        match monitor.read_millivolts().await {
            Some(mv) => {
                debug!("Battery: {} mV ({}%)", mv, battery_percent(mv));
                BATTERY_READING.signal(mv);
            }
            None => warn!("Battery ADC read failed"),
        }
        ticker.next().await;
    }
}
