//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in radioclock-core for the clock's hardware:
//!
//! - ULN2003 four-wire unipolar stepper (28BYJ-48 hand motor)
//! - MAX98357 I2S class-D amplifier control pins

#![no_std]
#![deny(unsafe_code)]

pub mod amp;
pub mod stepper;
