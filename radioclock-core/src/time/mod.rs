//! Wall-clock time
//!
//! Absolute time is only used for the diagnostic timestamp logged after
//! boot. The hand itself is driven purely by the time base.

pub mod civil;
pub mod sntp;

pub use civil::{DateTime, Month, Weekday};
pub use sntp::SntpError;

/// Seconds since 1970-01-01T00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UnixTime(u64);

impl UnixTime {
    /// Create from seconds since the Unix epoch
    pub const fn from_secs(secs: u64) -> Self {
        Self(secs)
    }

    /// Seconds since the Unix epoch
    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Shift by a signed number of seconds, clamping at the epoch
    pub fn offset(self, secs: i32) -> Self {
        Self(self.0.saturating_add_signed(i64::from(secs)))
    }

    /// Calendar breakdown of this instant
    pub fn to_datetime(self) -> DateTime {
        DateTime::from_unix(self)
    }
}
