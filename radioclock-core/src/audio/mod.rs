//! Internet radio playback
//!
//! The pump and the pure pieces of the stream client: address and
//! playlist parsing, the HTTP/ICY framing and PCM post-processing. The
//! socket, decoder and I2S output live in the firmware.

pub mod backoff;
pub mod http;
pub mod icy;
pub mod pcm;
pub mod playlist;
pub mod pump;
pub mod url;

pub use backoff::Backoff;
pub use http::{Disposition, HttpError, ResponseHead};
pub use icy::IcyFilter;
pub use pcm::Volume;
pub use playlist::{PlaylistError, PlaylistKind};
pub use pump::AudioPump;
pub use url::{own_address, Url, UrlError};

/// Errors that interrupt a stream and trigger a reconnect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StreamError {
    /// Network is not up
    NoNetwork,
    /// Host name lookup failed
    Dns,
    /// TCP connection could not be opened
    Connect,
    /// Read or write on the connection failed
    Io,
    /// Server closed the connection
    Closed,
    /// No data arrived within the read timeout
    Timeout,
    /// Decoder made no progress on a full buffer
    Decode,
    Url(UrlError),
    Http(HttpError),
    Playlist(PlaylistError),
}

impl From<UrlError> for StreamError {
    fn from(e: UrlError) -> Self {
        StreamError::Url(e)
    }
}

impl From<HttpError> for StreamError {
    fn from(e: HttpError) -> Self {
        StreamError::Http(e)
    }
}

impl From<PlaylistError> for StreamError {
    fn from(e: PlaylistError) -> Self {
        StreamError::Playlist(e)
    }
}
