//! Configuration type definitions
//!
//! Everything here is fixed for the lifetime of the process. Defaults are
//! the values the clock ships with.

use heapless::String;

use super::parse::ParseError;
use crate::motion::{MotionProfile, StepIncrement};

/// Maximum device name length
pub const MAX_NAME_LEN: usize = 32;

/// Maximum Wi-Fi SSID length
pub const MAX_SSID_LEN: usize = 32;

/// Maximum Wi-Fi passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Maximum stream URL length
pub const MAX_URL_LEN: usize = 128;

/// Maximum time server host length
pub const MAX_HOST_LEN: usize = 64;

/// Highest volume level
pub const MAX_VOLUME: u8 = 21;

/// Highest accepted speed limit in steps per second
pub const MAX_SPEED_LIMIT: u32 = 100_000;

/// Highest accepted acceleration limit in steps per second squared
pub const MAX_ACCELERATION_LIMIT: u32 = 1_000_000;

/// Copy `s` into a bounded string, truncating at capacity
pub(crate) fn bounded<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Amplifier gain stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputGain {
    /// 6 dB, GAIN pin driven high
    #[default]
    Db6,
    /// 12 dB, GAIN pin driven low
    Db12,
}

/// Device identity
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Name announced during provisioning and used as DHCP hostname
    pub name: String<MAX_NAME_LEN>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: bounded("Elac RD100"),
        }
    }
}

impl DeviceConfig {
    /// Name as a DHCP hostname: lowercase ASCII letters, digits and '-'
    pub fn hostname(&self) -> String<MAX_NAME_LEN> {
        let mut host = String::new();
        for c in self.name.trim().chars() {
            let c = if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '-'
            };
            // Same capacity as the name, cannot overflow
            let _ = host.push(c);
        }
        if host.is_empty() {
            let _ = host.push_str("radioclock");
        }
        host
    }
}

/// Network provisioning
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    /// Access point name; empty means no network is configured
    pub ssid: String<MAX_SSID_LEN>,
    /// Access point passphrase; empty for open networks
    pub password: String<MAX_PASSWORD_LEN>,
    /// Timeout for a single join attempt (seconds)
    pub connect_timeout_s: u16,
    /// Join attempts after the first one fails
    pub connect_retries: u8,
    /// Upper bound on the whole provisioning sequence (seconds)
    pub provision_timeout_s: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            connect_timeout_s: 10,
            connect_retries: 2,
            provision_timeout_s: 180,
        }
    }
}

impl NetworkConfig {
    /// Check if credentials are present
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

/// Audio playback
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AudioConfig {
    /// Stream or playlist URL
    pub stream: String<MAX_URL_LEN>,
    /// Volume level, 0..=21
    pub volume: u8,
    /// Amplifier gain
    pub gain: OutputGain,
    /// Mix stereo streams down to mono
    pub mono: bool,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            stream: bounded("http://www.byte.fm/stream/bytefm.m3u"),
            volume: 16,
            gain: OutputGain::Db6,
            mono: true,
        }
    }
}

/// Hand motion and time base
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Speed limit (half-steps per second)
    pub max_speed: u32,
    /// Acceleration limit (half-steps per second squared)
    pub max_acceleration: u32,
    /// Half-steps for one turn of the hand
    pub steps_per_revolution: u32,
    /// Time base ticks for one turn of the hand
    pub ticks_per_revolution: u32,
    /// Time base period (seconds)
    pub tick_interval_s: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 800,
            max_acceleration: 800,
            steps_per_revolution: 4096,
            ticks_per_revolution: 60,
            tick_interval_s: 60,
        }
    }
}

impl MotionConfig {
    /// Speed and acceleration limits for the controller
    pub fn profile(&self) -> MotionProfile {
        MotionProfile::new(self.max_speed, self.max_acceleration)
    }

    /// Steps credited per time base tick
    pub fn increment(&self) -> StepIncrement {
        StepIncrement::new(self.steps_per_revolution, self.ticks_per_revolution)
    }
}

/// Network time
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeConfig {
    /// SNTP server, IPv4 literal or host name
    pub ntp_server: String<MAX_HOST_LEN>,
    /// Offset from UTC (seconds)
    pub gmt_offset_s: i32,
    /// Additional daylight saving offset (seconds)
    pub daylight_offset_s: i32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            ntp_server: bounded("192.168.1.1"),
            gmt_offset_s: 1,
            daylight_offset_s: 3600,
        }
    }
}

impl TimeConfig {
    /// Total offset applied to UTC for display
    pub fn local_offset_s(&self) -> i32 {
        self.gmt_offset_s.saturating_add(self.daylight_offset_s)
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Configuration text could not be parsed
    Parse(ParseError),
    /// Volume above the highest level
    VolumeOutOfRange,
    /// Speed limit zero or too high
    SpeedOutOfRange,
    /// Acceleration limit zero or too high
    AccelerationOutOfRange,
    /// Zero ticks per revolution
    InvalidTicks,
    /// Fewer steps than ticks per revolution
    InvalidStepsPerRevolution,
    /// Zero tick interval
    InvalidTickInterval,
    /// Empty stream URL
    MissingStream,
    /// Empty time server
    MissingTimeServer,
}

impl From<ParseError> for ConfigError {
    fn from(e: ParseError) -> Self {
        ConfigError::Parse(e)
    }
}

/// Complete clock configuration
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockConfig {
    pub device: DeviceConfig,
    pub network: NetworkConfig,
    pub audio: AudioConfig,
    pub motion: MotionConfig,
    pub time: TimeConfig,
}

impl ClockConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.volume > MAX_VOLUME {
            return Err(ConfigError::VolumeOutOfRange);
        }
        if self.audio.stream.is_empty() {
            return Err(ConfigError::MissingStream);
        }

        let motion = &self.motion;
        if !(1..=MAX_SPEED_LIMIT).contains(&motion.max_speed) {
            return Err(ConfigError::SpeedOutOfRange);
        }
        if !(1..=MAX_ACCELERATION_LIMIT).contains(&motion.max_acceleration) {
            return Err(ConfigError::AccelerationOutOfRange);
        }
        if motion.ticks_per_revolution == 0 {
            return Err(ConfigError::InvalidTicks);
        }
        if motion.steps_per_revolution < motion.ticks_per_revolution {
            return Err(ConfigError::InvalidStepsPerRevolution);
        }
        if motion.tick_interval_s == 0 {
            return Err(ConfigError::InvalidTickInterval);
        }

        if self.time.ntp_server.is_empty() {
            return Err(ConfigError::MissingTimeServer);
        }

        Ok(())
    }
}
