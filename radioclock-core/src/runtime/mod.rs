//! Startup sequencing and the continuous run loops

pub mod bootstrap;
pub mod loops;
pub mod signals;

pub use bootstrap::{bootstrap, BootReport};
pub use loops::{run_audio, run_motion};
pub use signals::{Heartbeat, RunFlag};

#[cfg(test)]
mod tests {
    extern crate std;

    use super::signals::StopOnDrop;
    use super::*;
    use crate::audio::AudioPump;
    use crate::motion::{MotionController, MotionProfile, PositionTarget, StepIncrement, TimeBase};
    use crate::time::UnixTime;
    use crate::traits::{
        AudioStream, Monotonic, ProvisionError, Provisioner, StepOutput, StreamState, TimeSource,
        TimeSyncError,
    };
    use embassy_futures::block_on;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::thread;
    use std::time::{Duration, Instant};

    struct StdClock(Instant);

    impl Monotonic for StdClock {
        fn now_us(&self) -> u64 {
            self.0.elapsed().as_micros() as u64
        }
    }

    /// Gives up after a (shortened) provisioning timeout
    struct OfflineProvisioner {
        timeout: Duration,
    }

    impl Provisioner for OfflineProvisioner {
        async fn provision(&mut self) -> Result<(), ProvisionError> {
            thread::sleep(self.timeout);
            Err(ProvisionError::Timeout)
        }
    }

    struct UnreachableTimeSource;

    impl TimeSource for UnreachableTimeSource {
        async fn sync(&mut self) -> Result<UnixTime, TimeSyncError> {
            panic!("time sync attempted without network");
        }
    }

    /// Keeps failing to connect
    struct OfflineStream;

    impl AudioStream for OfflineStream {
        async fn pump(&mut self) -> StreamState {
            StreamState::Recovering
        }
    }

    struct TrackingOutput<'a>(&'a AtomicU32);

    impl StepOutput for TrackingOutput<'_> {
        fn step(&mut self, position: u32) {
            self.0.store(position, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_offline_boot_still_runs_clock_and_audio() {
        let target = PositionTarget::new(0);
        let time_base = TimeBase::new(&target, StepIncrement::new(4096, 60));
        let flag = RunFlag::new();
        let motion_beat = Heartbeat::new();
        let audio_beat = Heartbeat::new();
        let reached = AtomicU32::new(0);

        let report = block_on(bootstrap(
            &mut OfflineProvisioner {
                timeout: Duration::from_millis(50),
            },
            &mut UnreachableTimeSource,
        ));
        assert!(report.is_degraded());
        assert_eq!(report.time, Err(TimeSyncError::NoNetwork));

        let controller = MotionController::new(
            &target,
            TrackingOutput(&reached),
            MotionProfile::default(),
        );

        thread::scope(|s| {
            let _stop = StopOnDrop(&flag);

            s.spawn(|| {
                let mut controller = controller;
                let clock = StdClock(Instant::now());
                block_on(run_motion(&mut controller, &clock, &flag, &motion_beat));
            });
            s.spawn(|| {
                let mut pump = AudioPump::new(OfflineStream);
                block_on(run_audio(&mut pump, &flag, &audio_beat, |_| {}));
            });

            // Armed after bootstrap: one tick
            time_base.on_tick();

            let deadline = Instant::now() + Duration::from_secs(10);
            while reached.load(Ordering::Relaxed) < 68 {
                assert!(Instant::now() < deadline, "hand never arrived");
                thread::yield_now();
            }
            while audio_beat.count() < 1_000 {
                assert!(Instant::now() < deadline, "audio loop stalled");
                thread::yield_now();
            }
        });

        assert_eq!(reached.load(Ordering::Relaxed), 68);
        assert!(motion_beat.count() > 0);
    }
}
