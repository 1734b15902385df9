//! Radio playback task (core 0)

use defmt::*;

use radioclock_core::audio::AudioPump;
use radioclock_core::runtime::run_audio;

use crate::shared::{AUDIO_BEAT, RUN_FLAG};
use crate::stream::RadioStream;

/// Pump the radio stream for the life of the process
#[embassy_executor::task]
pub async fn audio_task(stream: &'static mut RadioStream) {
    info!("Audio task started");

    let mut pump = AudioPump::new(stream);
    run_audio(&mut pump, &RUN_FLAG, &AUDIO_BEAT, |state| {
        info!("Stream state: {:?}", state)
    })
    .await;

    warn!("Audio loop stopped after {} pumps", pump.pumps());
}
