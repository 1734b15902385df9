//! Boot-time configuration
//!
//! clock.toml is compiled into the image and checked by build.rs, so a
//! parse failure here means the two parsers disagree. The clock still
//! has to run, so it falls back to the built-in defaults.

use defmt::*;

use radioclock_core::config::{load_config, ClockConfig};

/// Embedded configuration (compiled into firmware)
/// Edit clock.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../clock.toml");

/// Load the embedded configuration or fall back to defaults
pub fn load() -> ClockConfig {
    match load_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!("Loaded configuration from clock.toml");
            config
        }
        Err(e) => {
            warn!("Invalid clock.toml ({:?}), using defaults", e);
            ClockConfig::default()
        }
    }
}

/// Log the settings that matter when reading a boot trace
pub fn log_summary(config: &ClockConfig) {
    info!("Device: {}", config.device.name.as_str());

    if config.network.is_configured() {
        info!(
            "Wi-Fi: ssid={}, {} retries, {}s per attempt",
            config.network.ssid.as_str(),
            config.network.connect_retries,
            config.network.connect_timeout_s
        );
    } else {
        warn!("No Wi-Fi configured, running offline");
    }

    info!(
        "Audio: {} volume={} gain={:?} mono={}",
        config.audio.stream.as_str(),
        config.audio.volume,
        config.audio.gain,
        config.audio.mono
    );

    let motion = &config.motion;
    let increment = motion.increment();
    info!(
        "Motion: {} steps/tick every {}s, max {} steps/s, {} steps/s²",
        increment.steps(),
        motion.tick_interval_s,
        motion.max_speed,
        motion.max_acceleration
    );
    if increment.drift_per_revolution() != 0 {
        warn!(
            "Hand drifts {} steps per revolution",
            increment.drift_per_revolution()
        );
    }
}
