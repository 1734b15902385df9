//! Build script for radioclock-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates clock.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const SECTIONS: [&str; 5] = ["device", "network", "audio", "motion", "time"];

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate clock.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=clock.toml");

    let config_path = Path::new("clock.toml");

    if !config_path.exists() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: clock.toml not found!                                    ║\n\
            ║                                                                  ║\n\
            ║  The firmware embeds clock.toml from the radioclock-firmware     ║\n\
            ║  directory. Restore it or create a new one.                      ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n"
        );
    }

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read clock.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in clock.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                ║                                                                  ║\n\
                {}\n\
                ║                                                                  ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_network(&config, &mut errors);
    validate_audio(&config, &mut errors);
    validate_motion(&config, &mut errors);
    validate_time(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid configuration in clock.toml                      ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    let ssid = config
        .get("network")
        .and_then(|n| n.get("ssid"))
        .and_then(|s| s.as_str())
        .unwrap_or("");
    if ssid.is_empty() {
        println!("cargo:warning=clock.toml has no Wi-Fi ssid, the clock will run offline");
    }

    println!("cargo:warning=clock.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The runtime parser rejects unknown sections and nested tables
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
            continue;
        }
        match value.as_table() {
            Some(table) => {
                for (key, value) in table {
                    if value.is_table() || value.is_array() {
                        errors.push(format!("[{}] {} must be a plain value", name, key));
                    }
                }
            }
            None => errors.push(format!("[{}] must be a table", name)),
        }
    }
}

fn get<'a>(config: &'a toml::Value, section: &str, key: &str) -> Option<&'a toml::Value> {
    config.get(section).and_then(|s| s.get(key))
}

fn check_int(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match get(config, section, key) {
        None => {}
        Some(toml::Value::Integer(v)) if (min..=max).contains(v) => {}
        Some(toml::Value::Integer(_)) => {
            errors.push(format!("[{}] {} must be {}-{}", section, key, min, max))
        }
        Some(_) => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn check_str(
    config: &toml::Value,
    section: &str,
    key: &str,
    max_len: usize,
    errors: &mut Vec<String>,
) -> Option<String> {
    match get(config, section, key) {
        None => None,
        Some(toml::Value::String(s)) if s.len() <= max_len => Some(s.clone()),
        Some(toml::Value::String(_)) => {
            errors.push(format!("[{}] {} longer than {} bytes", section, key, max_len));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be a string", section, key));
            None
        }
    }
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    check_str(config, "device", "name", 32, errors);
    check_str(config, "network", "ssid", 32, errors);
    check_str(config, "network", "password", 64, errors);
    check_int(config, "network", "connect_timeout_s", 1, 65_535, errors);
    check_int(config, "network", "connect_retries", 0, 255, errors);
    check_int(config, "network", "provision_timeout_s", 1, 65_535, errors);
}

fn validate_audio(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(stream) = check_str(config, "audio", "stream", 128, errors) {
        if !stream.to_ascii_lowercase().starts_with("http://") {
            errors.push("[audio] stream must be a plain http:// address".to_string());
        }
    }
    check_int(config, "audio", "volume", 0, 21, errors);

    if let Some(gain) = get(config, "audio", "gain") {
        let valid = gain
            .as_str()
            .is_some_and(|g| ["6db", "6dB", "high", "12db", "12dB", "low"].contains(&g));
        if !valid {
            errors.push("[audio] gain must be \"6db\" or \"12db\"".to_string());
        }
    }

    if let Some(mono) = get(config, "audio", "mono") {
        if !mono.is_bool() {
            errors.push("[audio] mono must be true or false".to_string());
        }
    }
}

fn validate_motion(config: &toml::Value, errors: &mut Vec<String>) {
    check_int(config, "motion", "max_speed", 1, 100_000, errors);
    check_int(config, "motion", "max_acceleration", 1, 1_000_000, errors);
    check_int(config, "motion", "steps_per_revolution", 1, u32::MAX as i64, errors);
    check_int(config, "motion", "ticks_per_revolution", 1, u32::MAX as i64, errors);
    check_int(config, "motion", "tick_interval_s", 1, u32::MAX as i64, errors);

    let steps = get(config, "motion", "steps_per_revolution").and_then(|v| v.as_integer());
    let ticks = get(config, "motion", "ticks_per_revolution").and_then(|v| v.as_integer());
    let (steps, ticks) = (steps.unwrap_or(4096), ticks.unwrap_or(60));
    if steps < ticks {
        errors.push("[motion] steps_per_revolution below ticks_per_revolution".to_string());
    } else if ticks > 0 && steps % ticks != 0 {
        println!(
            "cargo:warning=[motion] {} steps do not divide into {} ticks, the hand loses {} steps per revolution",
            steps,
            ticks,
            steps % ticks
        );
    }
}

fn validate_time(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(server) = check_str(config, "time", "ntp_server", 64, errors) {
        if server.is_empty() {
            errors.push("[time] ntp_server cannot be empty".to_string());
        }
    }
    check_int(config, "time", "gmt_offset_s", -86_400, 86_400, errors);
    check_int(config, "time", "daylight_offset_s", -86_400, 86_400, errors);
}
