//! Hand motion task (core 1)

use defmt::*;
use embassy_rp::gpio::Output;
use embassy_time::Instant;

use radioclock_core::motion::MotionController;
use radioclock_core::runtime::run_motion;
use radioclock_core::traits::Monotonic;
use radioclock_drivers::stepper::Uln2003;

use crate::shared::{MOTION_BEAT, RUN_FLAG};

/// ULN2003 board on four GPIOs
pub type HandStepper = Uln2003<Output<'static>>;

/// Microsecond clock backed by the embassy time driver
pub struct EmbassyClock;

impl Monotonic for EmbassyClock {
    fn now_us(&self) -> u64 {
        Instant::now().as_micros()
    }
}

/// Chase the position target for the life of the process
#[embassy_executor::task]
pub async fn motion_task(mut controller: MotionController<'static, HandStepper>) {
    info!(
        "Motion task started at position {}, max {} steps/s",
        controller.position(),
        controller.profile().max_speed
    );

    run_motion(&mut controller, &EmbassyClock, &RUN_FLAG, &MOTION_BEAT).await;

    warn!("Motion loop stopped at position {}", controller.position());
}
