//! Minute tick
//!
//! Runs on the high-priority interrupt executor, so a busy core cannot
//! delay it. The only effect is adding one increment to the target.

use defmt::*;
use embassy_time::{Duration, Ticker};

use radioclock_core::motion::TimeBase;

/// Advance the position target once per interval, forever
#[embassy_executor::task]
pub async fn time_base_task(time_base: TimeBase<'static>, interval: Duration) -> ! {
    info!(
        "Time base armed: +{} steps every {}s",
        time_base.increment().steps(),
        interval.as_secs()
    );

    let mut ticker = Ticker::every(interval);

    loop {
        ticker.next().await;
        time_base.on_tick();
    }
}
