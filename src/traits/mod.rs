//! Trait definitions for hardware and network abstraction.
//!
//! This module defines the core abstractions that allow rs-pantilt to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Use different MQTT client implementations
//! - Run the motion code against virtual time in tests
//!
//! # Submodules
//!
//! - `hardware`: GPIO lines, clock, blocking delay
//! - `network`: MQTT client trait
//!
//! # Hardware Abstraction
//!
//! - [`Gpio`]: shift bus outputs, indicator, end-stop inputs
//! - [`Clock`]: time source for `no_std` environments
//! - [`Delay`]: pulse and settle timing

pub mod hardware;
pub mod network;

pub use hardware::*;
pub use network::*;
