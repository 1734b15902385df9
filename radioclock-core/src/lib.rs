//! Board-agnostic core logic for the radio clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Shared position target and the minute time base that feeds it
//! - Step-by-step trapezoidal motion planning for the clock hand
//! - The audio pump and the stream helpers it relies on
//! - Bootstrap sequencing and the two continuous run loops
//! - SNTP packet handling and calendar formatting for diagnostics
//! - Configuration types and the embedded TOML parser
//! - Hardware abstraction traits (step output, audio stream, network)

#![no_std]
#![deny(unsafe_code)]

pub mod audio;
pub mod config;
pub mod motion;
pub mod runtime;
pub mod time;
pub mod traits;
