//! SNTP (RFC 4330) client packets
//!
//! Only the two operations a one-shot query needs: build a client request
//! and extract the server's transmit timestamp from the reply.

use super::UnixTime;
use crate::traits::TimeSyncError;

/// SNTP server port
pub const NTP_PORT: u16 = 123;

/// Size of a packet without extensions
pub const PACKET_LEN: usize = 48;

/// Seconds from 1900-01-01 (NTP era 0) to 1970-01-01
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// Length of one NTP era (2^32 seconds)
const NTP_ERA_SECS: u64 = 1 << 32;

/// Leap indicator value for an unsynchronised clock
const LI_ALARM: u8 = 3;

const MODE_CLIENT: u8 = 3;
const MODE_SERVER: u8 = 4;
const VERSION: u8 = 4;

/// Offset of the transmit timestamp seconds field
const TRANSMIT_SECS: usize = 40;

/// Reply validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SntpError {
    /// Shorter than a full packet
    TooShort,
    /// Mode is not "server"
    NotServer,
    /// Server reports its own clock as unsynchronised
    Unsynchronized,
    /// Stratum 0 (kiss-of-death) reply
    KissOfDeath,
    /// Transmit timestamp is zero
    ZeroTimestamp,
}

impl From<SntpError> for TimeSyncError {
    fn from(_: SntpError) -> Self {
        TimeSyncError::InvalidResponse
    }
}

/// Build a client request (LI 0, version 4, mode 3)
pub fn request() -> [u8; PACKET_LEN] {
    let mut packet = [0u8; PACKET_LEN];
    packet[0] = (VERSION << 3) | MODE_CLIENT;
    packet
}

/// Extract the server's transmit time from a reply
///
/// Timestamps before 1970 in era 0 are taken to be in era 1 (after
/// February 2036).
pub fn parse_response(packet: &[u8]) -> Result<UnixTime, SntpError> {
    if packet.len() < PACKET_LEN {
        return Err(SntpError::TooShort);
    }

    let leap = packet[0] >> 6;
    let mode = packet[0] & 0x07;
    let stratum = packet[1];

    if mode != MODE_SERVER {
        return Err(SntpError::NotServer);
    }
    if leap == LI_ALARM {
        return Err(SntpError::Unsynchronized);
    }
    if stratum == 0 {
        return Err(SntpError::KissOfDeath);
    }

    let secs = u32::from_be_bytes([
        packet[TRANSMIT_SECS],
        packet[TRANSMIT_SECS + 1],
        packet[TRANSMIT_SECS + 2],
        packet[TRANSMIT_SECS + 3],
    ]);
    if secs == 0 {
        return Err(SntpError::ZeroTimestamp);
    }

    let secs = u64::from(secs);
    let unix = if secs >= NTP_UNIX_OFFSET {
        secs - NTP_UNIX_OFFSET
    } else {
        secs + NTP_ERA_SECS - NTP_UNIX_OFFSET
    };

    Ok(UnixTime::from_secs(unix))
}
