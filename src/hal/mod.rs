//! Hardware Abstraction Layer implementations.
//!
//! This module contains concrete implementations of the traits
//! defined in [`crate::traits`] for various platforms.
//!
//! # Available Implementations
//!
//! - `mock`: Test implementations for desktop development
//! - `std_time`: Desktop clock and delay (requires `std`)
//! - `embedded`: Adapter over `embedded-hal` 1.0 pins and delays (requires `embedded-hal`)
//! - `esp32`: ESP32 clock, WiFi and MQTT (requires `esp32`)

pub mod mock;

#[cfg(feature = "std")]
pub mod std_time;

#[cfg(feature = "embedded-hal")]
pub mod embedded;

#[cfg(feature = "esp32")]
pub mod esp32;

pub use mock::*;

#[cfg(feature = "std")]
pub use std_time::*;

#[cfg(feature = "embedded-hal")]
pub use embedded::*;

#[cfg(feature = "esp32")]
pub use esp32::*;
