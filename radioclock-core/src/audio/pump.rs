//! Audio pump
//!
//! Drives an [`AudioStream`] one quantum at a time and keeps track of how
//! often it ran and which state it last reported.

use crate::traits::{AudioStream, StreamState};

/// Counts pumps and detects stream state changes
pub struct AudioPump<S> {
    stream: S,
    pumps: u64,
    state: Option<StreamState>,
}

impl<S: AudioStream> AudioPump<S> {
    /// Wrap a stream
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            pumps: 0,
            state: None,
        }
    }

    /// Advance the stream by one unit of work
    ///
    /// Returns the new state if it differs from the previous one.
    pub async fn pump(&mut self) -> Option<StreamState> {
        let state = self.stream.pump().await;
        self.pumps = self.pumps.wrapping_add(1);

        if self.state == Some(state) {
            None
        } else {
            self.state = Some(state);
            Some(state)
        }
    }

    /// Number of completed pumps
    pub fn pumps(&self) -> u64 {
        self.pumps
    }

    /// Last reported state, `None` before the first pump
    pub fn state(&self) -> Option<StreamState> {
        self.state
    }

    /// Borrow the wrapped stream
    pub fn stream(&self) -> &S {
        &self.stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;

    /// Replays a fixed sequence of states, then keeps playing
    struct Scripted {
        script: &'static [StreamState],
        calls: usize,
    }

    impl AudioStream for Scripted {
        async fn pump(&mut self) -> StreamState {
            let state = self
                .script
                .get(self.calls)
                .copied()
                .unwrap_or(StreamState::Playing);
            self.calls += 1;
            state
        }
    }

    #[test]
    fn test_reports_transitions_only() {
        use StreamState::*;

        let mut pump = AudioPump::new(Scripted {
            script: &[Connecting, Connecting, Buffering, Playing, Playing, Recovering],
            calls: 0,
        });

        assert_eq!(pump.state(), None);
        let changes: [Option<StreamState>; 7] =
            core::array::from_fn(|_| block_on(pump.pump()));

        assert_eq!(
            changes,
            [
                Some(Connecting),
                None,
                Some(Buffering),
                Some(Playing),
                None,
                Some(Recovering),
                Some(Playing),
            ]
        );
        assert_eq!(pump.pumps(), 7);
        assert_eq!(pump.stream().calls, 7);
        assert_eq!(pump.state(), Some(Playing));
    }
}
