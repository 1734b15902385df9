//! Audio stream trait
//!
//! The stream owns its whole state (connection, decoder, buffers). The
//! core only ever asks it to do one more unit of work.

/// Coarse state reported by an audio stream after each unit of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamState {
    /// Resolving the stream address or opening the connection
    Connecting,
    /// Connected, filling the decode buffer
    Buffering,
    /// Decoded audio is being written to the output
    Playing,
    /// An error occurred; backing off before reconnecting
    Recovering,
}

/// Trait for audio stream collaborators
///
/// `pump` must return after a bounded amount of work so the executor can
/// schedule other tasks. Errors are handled internally: a failing stream
/// reports [`StreamState::Recovering`] and retries on later calls.
#[allow(async_fn_in_trait)]
pub trait AudioStream {
    /// Perform one scheduling quantum of stream work
    async fn pump(&mut self) -> StreamState;
}

impl<S: AudioStream + ?Sized> AudioStream for &mut S {
    async fn pump(&mut self) -> StreamState {
        (**self).pump().await
    }
}
