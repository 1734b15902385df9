//! Minimal TOML parser for the clock configuration
//!
//! Handles only the subset the configuration file uses. It does NOT
//! support the full TOML language.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...), including after a value
//!
//! NOT supported:
//! - Escape sequences in strings
//! - Arrays and tables
//! - Multi-line strings
//!
//! Unknown keys are ignored; unknown sections are an error.

use heapless::String;

use super::types::{bounded, ClockConfig, OutputGain};

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Invalid or unknown section header
    InvalidSection,
    /// Value has the wrong type or does not fit its field
    InvalidValue,
    /// String value exceeds the field's capacity
    ValueTooLong,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Device,
    Network,
    Audio,
    Motion,
    Time,
}

/// Parse TOML text into a [`ClockConfig`]
///
/// Keys that are not present keep their default values. The result is
/// not range-checked; see [`ClockConfig::validate`].
pub fn parse_config(input: &str) -> Result<ClockConfig, ParseError> {
    let mut config = ClockConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    Ok(config)
}

/// Parse section header like "audio"
fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "device" => Ok(Section::Device),
        "network" => Ok(Section::Network),
        "audio" => Ok(Section::Audio),
        "motion" => Ok(Section::Motion),
        "time" => Ok(Section::Time),
        _ => Err(ParseError::InvalidSection),
    }
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(s: &str) -> &str {
    let mut in_string = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return s[..i].trim(),
            _ => {}
        }
    }
    s
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        // Allow unquoted strings for simple values
        value
    }
}

/// Parse a string value into a bounded field
fn parse_bounded<const N: usize>(value: &str) -> Result<String<N>, ParseError> {
    let value = parse_string(value);
    if value.len() > N {
        return Err(ParseError::ValueTooLong);
    }
    Ok(bounded(value))
}

/// Parse an integer value
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    value.parse().map_err(|_| ParseError::InvalidValue)
}

/// Parse a boolean value
fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Parse amplifier gain
fn parse_gain(value: &str) -> Result<OutputGain, ParseError> {
    match parse_string(value) {
        "6db" | "6dB" | "high" => Ok(OutputGain::Db6),
        "12db" | "12dB" | "low" => Ok(OutputGain::Db12),
        _ => Err(ParseError::InvalidValue),
    }
}

/// Apply a parsed value to the appropriate config field
fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut ClockConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Device => {
            if key == "name" {
                config.device.name = parse_bounded(value)?;
            }
        }
        Section::Network => {
            let n = &mut config.network;
            match key {
                "ssid" => n.ssid = parse_bounded(value)?,
                "password" => n.password = parse_bounded(value)?,
                "connect_timeout_s" => n.connect_timeout_s = parse_int(value)?,
                "connect_retries" => n.connect_retries = parse_int(value)?,
                "provision_timeout_s" => n.provision_timeout_s = parse_int(value)?,
                _ => {}
            }
        }
        Section::Audio => {
            let a = &mut config.audio;
            match key {
                "stream" => a.stream = parse_bounded(value)?,
                "volume" => a.volume = parse_int(value)?,
                "gain" => a.gain = parse_gain(value)?,
                "mono" => a.mono = parse_bool(value)?,
                _ => {}
            }
        }
        Section::Motion => {
            let m = &mut config.motion;
            match key {
                "max_speed" => m.max_speed = parse_int(value)?,
                "max_acceleration" => m.max_acceleration = parse_int(value)?,
                "steps_per_revolution" => m.steps_per_revolution = parse_int(value)?,
                "ticks_per_revolution" => m.ticks_per_revolution = parse_int(value)?,
                "tick_interval_s" => m.tick_interval_s = parse_int(value)?,
                _ => {}
            }
        }
        Section::Time => {
            let t = &mut config.time;
            match key {
                "ntp_server" => t.ntp_server = parse_bounded(value)?,
                "gmt_offset_s" => t.gmt_offset_s = parse_int(value)?,
                "daylight_offset_s" => t.daylight_offset_s = parse_int(value)?,
                _ => {}
            }
        }
        Section::Root => {
            // No root-level keys
        }
    }

    Ok(())
}
