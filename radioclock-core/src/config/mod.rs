//! Configuration types and parsing
//!
//! The configuration is a small TOML file embedded in the firmware image
//! and parsed at boot with a no-alloc parser.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;

/// Parse and validate configuration text
pub fn load_config(input: &str) -> Result<ClockConfig, ConfigError> {
    let config = parse_config(input)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_valid_config() {
        let config = load_config("[audio]\nvolume = 21\n").unwrap();
        assert_eq!(config.audio.volume, 21);
    }

    #[test]
    fn test_load_reports_parse_errors() {
        assert_eq!(
            load_config("[bogus]\n").unwrap_err(),
            ConfigError::Parse(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_load_reports_range_errors() {
        assert_eq!(
            load_config("[audio]\nvolume = 22\n").unwrap_err(),
            ConfigError::VolumeOutOfRange
        );
    }
}
