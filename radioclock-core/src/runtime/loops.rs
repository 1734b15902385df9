//! The two continuous run loops
//!
//! Each loop does one bounded unit of work per iteration, records a
//! heartbeat and yields. Neither waits on the other; the only data they
//! could share is the position target, and the audio loop never touches
//! it.

use embassy_futures::yield_now;

use super::signals::{Heartbeat, RunFlag};
use crate::audio::AudioPump;
use crate::motion::MotionController;
use crate::traits::{AudioStream, Monotonic, StepOutput, StreamState};

/// Run the motion controller until `flag` is cleared
pub async fn run_motion<S, C>(
    controller: &mut MotionController<'_, S>,
    clock: &C,
    flag: &RunFlag,
    beat: &Heartbeat,
) where
    S: StepOutput,
    C: Monotonic,
{
    while flag.is_running() {
        controller.advance(clock.now_us());
        beat.beat();
        yield_now().await;
    }
}

/// Run the audio pump until `flag` is cleared
///
/// `on_change` sees every stream state transition.
pub async fn run_audio<S, F>(
    pump: &mut AudioPump<S>,
    flag: &RunFlag,
    beat: &Heartbeat,
    mut on_change: F,
) where
    S: AudioStream,
    F: FnMut(StreamState),
{
    while flag.is_running() {
        if let Some(state) = pump.pump().await {
            on_change(state);
        }
        beat.beat();
        yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::motion::{MotionProfile, PositionTarget};
    use crate::runtime::signals::StopOnDrop;
    use embassy_futures::block_on;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::mpsc::{channel, Receiver, Sender};
    use std::thread;
    use std::time::{Duration, Instant};

    struct StdClock(Instant);

    impl Monotonic for StdClock {
        fn now_us(&self) -> u64 {
            self.0.elapsed().as_micros() as u64
        }
    }

    /// Blocks inside `step` until released
    struct StallingOutput {
        entered: Sender<()>,
        release: Receiver<()>,
    }

    impl StepOutput for StallingOutput {
        fn step(&mut self, _position: u32) {
            let _ = self.entered.send(());
            let _ = self.release.recv();
        }
    }

    /// Blocks inside `pump` until released
    struct StallingStream {
        entered: Sender<()>,
        release: Receiver<()>,
    }

    impl AudioStream for StallingStream {
        async fn pump(&mut self) -> StreamState {
            let _ = self.entered.send(());
            let _ = self.release.recv();
            StreamState::Recovering
        }
    }

    struct SilentStream;

    impl AudioStream for SilentStream {
        async fn pump(&mut self) -> StreamState {
            StreamState::Playing
        }
    }

    struct NullOutput;

    /// Publishes the latest position
    struct TrackingOutput<'a>(&'a AtomicU32);

    impl StepOutput for TrackingOutput<'_> {
        fn step(&mut self, position: u32) {
            self.0.store(position, Ordering::Relaxed);
        }
    }

    impl StepOutput for NullOutput {
        fn step(&mut self, _position: u32) {}
    }

    /// Spin until `beat` has advanced by `count`, or panic after a while
    fn wait_for_beats(beat: &Heartbeat, count: u32) {
        let start = beat.count();
        let deadline = Instant::now() + Duration::from_secs(10);
        while beat.count().wrapping_sub(start) < count {
            assert!(Instant::now() < deadline, "loop made no progress");
            thread::yield_now();
        }
    }

    #[test]
    fn test_audio_keeps_running_while_motion_stalls() {
        let target = PositionTarget::new(0);
        let flag = RunFlag::new();
        let motion_beat = Heartbeat::new();
        let audio_beat = Heartbeat::new();

        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();
        let output = StallingOutput {
            entered: entered_tx,
            release: release_rx,
        };

        // At rest at 0, so the tick below leaves a move to make
        let controller = MotionController::new(&target, output, MotionProfile::default());
        target.advance(68);

        thread::scope(|s| {
            let _release = release_tx;
            let _stop = StopOnDrop(&flag);

            s.spawn(|| {
                let mut controller = controller;
                let clock = StdClock(Instant::now());
                block_on(run_motion(&mut controller, &clock, &flag, &motion_beat));
            });
            s.spawn(|| {
                let mut pump = AudioPump::new(SilentStream);
                block_on(run_audio(&mut pump, &flag, &audio_beat, |_| {}));
            });

            // Motion is now stuck inside its first step
            entered_rx
                .recv_timeout(Duration::from_secs(10))
                .expect("motion never stepped");
            let stalled_at = motion_beat.count();

            wait_for_beats(&audio_beat, 10_000);
            assert_eq!(motion_beat.count(), stalled_at);
        });
    }

    #[test]
    fn test_motion_keeps_running_while_audio_stalls() {
        let target = PositionTarget::new(0);
        let flag = RunFlag::new();
        let motion_beat = Heartbeat::new();
        let audio_beat = Heartbeat::new();
        let reached = AtomicU32::new(0);

        let (entered_tx, entered_rx) = channel();
        let (release_tx, release_rx) = channel();
        let stream = StallingStream {
            entered: entered_tx,
            release: release_rx,
        };
        let controller = MotionController::new(
            &target,
            TrackingOutput(&reached),
            MotionProfile::default(),
        );

        thread::scope(|s| {
            let _release = release_tx;
            let _stop = StopOnDrop(&flag);

            s.spawn(|| {
                let mut controller = controller;
                let clock = StdClock(Instant::now());
                block_on(run_motion(&mut controller, &clock, &flag, &motion_beat));
            });
            s.spawn(|| {
                let mut pump = AudioPump::new(stream);
                block_on(run_audio(&mut pump, &flag, &audio_beat, |_| {}));
            });

            entered_rx
                .recv_timeout(Duration::from_secs(10))
                .expect("audio never pumped");
            let stalled_at = audio_beat.count();

            // A tick arrives while audio is stuck; the hand still gets there
            target.advance(68);
            let deadline = Instant::now() + Duration::from_secs(10);
            while reached.load(Ordering::Relaxed) < 68 {
                assert!(Instant::now() < deadline, "hand never arrived");
                thread::yield_now();
            }
            wait_for_beats(&motion_beat, 1_000);
            assert_eq!(audio_beat.count(), stalled_at);
        });

        assert_eq!(reached.load(Ordering::Relaxed), 68);
    }

    #[test]
    fn test_state_changes_reported() {
        let flag = RunFlag::new();
        let beat = Heartbeat::new();
        let mut pump = AudioPump::new(SilentStream);
        let mut seen = 0;

        // Stop after the first transition
        block_on(run_audio(&mut pump, &flag, &beat, |state| {
            assert_eq!(state, StreamState::Playing);
            seen += 1;
            flag.stop();
        }));

        assert_eq!(seen, 1);
        assert_eq!(beat.count(), 1);
    }

    #[test]
    fn test_stopped_flag_runs_nothing() {
        let target = PositionTarget::new(0);
        let flag = RunFlag::new();
        let beat = Heartbeat::new();
        flag.stop();

        let clock = StdClock(Instant::now());
        let mut controller = MotionController::new(&target, NullOutput, MotionProfile::default());
        block_on(run_motion(&mut controller, &clock, &flag, &beat));
        assert_eq!(beat.count(), 0);
    }
}
