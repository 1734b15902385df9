//! Internet radio stream
//!
//! HTTP client, ICY demultiplexer, MP3 decoder and I2S output in one
//! state machine. Each pump does one step: open the connection (following
//! playlists and redirects), decode and play one frame, or sit out the
//! back-off after an error.

use defmt::*;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use embassy_net::Stack;
use embassy_rp::peripherals::PIO1;
use embassy_rp::pio_programs::i2s::PioI2sOut;
use embassy_time::{with_timeout, Duration, Instant, Timer};
use embedded_io_async::Write as _;
use heapless::String;

use radioclock_core::audio::http::{self, find_head_end, MAX_HEAD_LEN, MAX_REDIRECTS};
use radioclock_core::audio::pcm::{self, Volume};
use radioclock_core::audio::{
    own_address, Backoff, Disposition, HttpError, IcyFilter, PlaylistKind, ResponseHead,
    StreamError, Url,
};
use radioclock_core::config::{AudioConfig, MAX_URL_LEN};
use radioclock_core::traits::{AudioStream, StreamState};

/// I2S sample rate; streams at other rates play at the wrong pitch
pub const SAMPLE_RATE: u32 = 44_100;

/// I2S sample width
pub const BIT_DEPTH: u32 = 16;

/// TCP receive window
pub const RX_BUF_LEN: usize = 8 * 1024;

/// TCP transmit buffer, only ever holds a request
pub const TX_BUF_LEN: usize = 1024;

/// Compressed audio waiting for the decoder
const MP3_BUF_LEN: usize = 16 * 1024;

/// Longest wait for any single socket operation
const IO_TIMEOUT: Duration = Duration::from_secs(10);

enum Phase {
    Connecting,
    Streaming,
    Recovering(Instant),
}

/// Shoutcast/Icecast MP3 stream played through a PIO I2S output
pub struct RadioStream {
    stack: Stack<'static>,
    socket: TcpSocket<'static>,
    i2s: PioI2sOut<'static, PIO1, 0>,
    station: &'static str,
    user_agent: &'static str,
    mono: bool,
    volume: Volume,
    phase: Phase,
    backoff: Backoff,
    address: String<MAX_URL_LEN>,
    icy: IcyFilter,
    decoder: nanomp3::Decoder,
    mp3: [u8; MP3_BUF_LEN],
    mp3_len: usize,
    pcm: [f32; nanomp3::MAX_SAMPLES_PER_FRAME],
    out: [u32; nanomp3::MAX_SAMPLES_PER_FRAME],
    rate_warned: bool,
}

impl RadioStream {
    /// Create a stream and start the I2S clocks
    pub fn new(
        stack: Stack<'static>,
        mut socket: TcpSocket<'static>,
        mut i2s: PioI2sOut<'static, PIO1, 0>,
        config: &'static AudioConfig,
        user_agent: &'static str,
    ) -> Self {
        socket.set_timeout(Some(IO_TIMEOUT));
        i2s.start();

        Self {
            stack,
            socket,
            i2s,
            station: config.stream.as_str(),
            user_agent,
            mono: config.mono,
            volume: Volume::new(config.volume),
            phase: Phase::Connecting,
            backoff: Backoff::default(),
            address: String::new(),
            icy: IcyFilter::new(None),
            decoder: nanomp3::Decoder::new(),
            mp3: [0; MP3_BUF_LEN],
            mp3_len: 0,
            pcm: [0.0; nanomp3::MAX_SAMPLES_PER_FRAME],
            out: [0; nanomp3::MAX_SAMPLES_PER_FRAME],
            rate_warned: false,
        }
    }

    /// Connect to the station, resolving playlists and redirects, and
    /// leave the first audio bytes in the decode buffer
    async fn open(&mut self) -> Result<(), StreamError> {
        if !self.stack.is_config_up() {
            return Err(StreamError::NoNetwork);
        }

        self.address = own_address(self.station)?;

        for _ in 0..=MAX_REDIRECTS {
            let url = Url::parse(&self.address)?;
            let listed = PlaylistKind::from_file_name(url.file_name());
            info!("Opening {}", self.address.as_str());

            connect(&mut self.socket, self.stack, &url).await?;
            let request = http::write_request(&url, self.user_agent)?;
            send(&mut self.socket, request.as_bytes()).await?;

            let (head_len, read) = read_head(&mut self.socket, &mut self.mp3).await?;
            self.mp3_len = read;
            let head = ResponseHead::parse(&self.mp3[..head_len])?;

            if let Disposition::Redirect(location) = head.disposition()? {
                info!("Redirected to {}", location);
                self.address = url.join(location)?;
                self.socket.abort();
                continue;
            }

            let playlist = head
                .content_type
                .and_then(PlaylistKind::from_content_type)
                .or(listed);

            if let Some(kind) = playlist {
                self.mp3_len = read_to_end(&mut self.socket, &mut self.mp3, read).await?;
                self.socket.abort();
                let entry = kind.first_entry(&self.mp3[head_len..self.mp3_len])?;
                info!("Playlist {:?} points to {}", kind, entry);
                self.address = url.join(entry)?;
                continue;
            }

            if let Some(name) = head.name {
                info!("Station: {}", name);
            }
            self.icy = IcyFilter::new(head.metaint);

            self.mp3.copy_within(head_len..self.mp3_len, 0);
            self.mp3_len -= head_len;
            self.mp3_len = self.icy.filter(&mut self.mp3[..self.mp3_len]);
            self.decoder = nanomp3::Decoder::new();
            return Ok(());
        }

        Err(HttpError::TooManyRedirects.into())
    }

    /// Decode and play one frame; `false` means more data was needed
    async fn play_frame(&mut self) -> Result<bool, StreamError> {
        let (consumed, info) = self
            .decoder
            .decode(&self.mp3[..self.mp3_len], &mut self.pcm);
        self.mp3.copy_within(consumed..self.mp3_len, 0);
        self.mp3_len -= consumed;

        let Some(info) = info else {
            if consumed == 0 {
                if self.mp3_len == MP3_BUF_LEN {
                    return Err(StreamError::Decode);
                }
                self.fill().await?;
            }
            return Ok(false);
        };

        if info.sample_rate != SAMPLE_RATE && !self.rate_warned {
            warn!(
                "Stream is {} Hz, output runs at {} Hz",
                info.sample_rate, SAMPLE_RATE
            );
            self.rate_warned = true;
        }

        let channels = match info.channels {
            nanomp3::Channels::Mono => 1,
            nanomp3::Channels::Stereo => 2,
        };
        let samples = (info.samples_produced * channels).min(self.pcm.len());
        let words = pcm::render(
            &self.pcm[..samples],
            channels,
            self.mono,
            self.volume,
            &mut self.out,
        );

        self.i2s.write(&self.out[..words]).await;
        Ok(true)
    }

    /// Read more of the body into the decode buffer
    async fn fill(&mut self) -> Result<(), StreamError> {
        let start = self.mp3_len;
        let n = read_some(&mut self.socket, &mut self.mp3[start..]).await?;
        self.mp3_len += self.icy.filter(&mut self.mp3[start..start + n]);

        if let Some(title) = self.icy.take_title() {
            info!("Now playing: {}", title);
        }
        Ok(())
    }

    fn fail(&mut self, error: StreamError) -> StreamState {
        self.socket.abort();
        self.mp3_len = 0;

        let delay = self.backoff.next_delay_ms();
        warn!("Stream error {:?}, retrying in {} ms", error, delay);
        self.phase = Phase::Recovering(Instant::now() + Duration::from_millis(u64::from(delay)));
        StreamState::Recovering
    }
}

impl AudioStream for RadioStream {
    async fn pump(&mut self) -> StreamState {
        match self.phase {
            Phase::Recovering(until) => {
                Timer::at(until).await;
                self.phase = Phase::Connecting;
                StreamState::Connecting
            }
            Phase::Connecting => match self.open().await {
                Ok(()) => {
                    self.phase = Phase::Streaming;
                    StreamState::Buffering
                }
                Err(e) => self.fail(e),
            },
            Phase::Streaming => match self.play_frame().await {
                Ok(true) => {
                    self.backoff.reset();
                    StreamState::Playing
                }
                Ok(false) => StreamState::Buffering,
                Err(e) => self.fail(e),
            },
        }
    }
}

async fn connect(
    socket: &mut TcpSocket<'static>,
    stack: Stack<'static>,
    url: &Url<'_>,
) -> Result<(), StreamError> {
    let addrs = stack
        .dns_query(url.host, DnsQueryType::A)
        .await
        .map_err(|_| StreamError::Dns)?;
    let addr = *addrs.first().ok_or(StreamError::Dns)?;

    socket.abort();
    with_timeout(IO_TIMEOUT, socket.connect((addr, url.port)))
        .await
        .map_err(|_| StreamError::Timeout)?
        .map_err(|e| {
            warn!("TCP connect to {} failed: {:?}", addr, e);
            StreamError::Connect
        })
}

async fn send(socket: &mut TcpSocket<'static>, bytes: &[u8]) -> Result<(), StreamError> {
    socket.write_all(bytes).await.map_err(|_| StreamError::Io)?;
    socket.flush().await.map_err(|_| StreamError::Io)
}

async fn read_some(socket: &mut TcpSocket<'static>, buf: &mut [u8]) -> Result<usize, StreamError> {
    match with_timeout(IO_TIMEOUT, socket.read(buf)).await {
        Err(_) => Err(StreamError::Timeout),
        Ok(Err(_)) => Err(StreamError::Io),
        Ok(Ok(0)) => Err(StreamError::Closed),
        Ok(Ok(n)) => Ok(n),
    }
}

/// Read until the response head is complete
///
/// Returns the head length and how many bytes were read in total; body
/// bytes that arrived with the head follow it in `buf`.
async fn read_head(
    socket: &mut TcpSocket<'static>,
    buf: &mut [u8],
) -> Result<(usize, usize), StreamError> {
    let limit = MAX_HEAD_LEN.min(buf.len());
    let mut len = 0;

    loop {
        if let Some(end) = find_head_end(&buf[..len]) {
            return Ok((end, len));
        }
        if len == limit {
            return Err(HttpError::HeadTooLarge.into());
        }
        len += read_some(socket, &mut buf[len..limit]).await?;
    }
}

/// Read a short body until the server closes or `buf` is full
async fn read_to_end(
    socket: &mut TcpSocket<'static>,
    buf: &mut [u8],
    mut len: usize,
) -> Result<usize, StreamError> {
    while len < buf.len() {
        match read_some(socket, &mut buf[len..]).await {
            Ok(n) => len += n,
            Err(StreamError::Closed) => break,
            Err(e) => return Err(e),
        }
    }
    Ok(len)
}
