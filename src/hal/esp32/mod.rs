//! ESP32 hardware support for the pan/tilt rig.
//!
//! GPIO goes through the generic `embedded-hal` adapter
//! ([`HalGpio`](crate::hal::HalGpio)) over `esp-idf-hal` pin drivers, and
//! pulse timing through [`HalDelay`](crate::hal::HalDelay) over `Ets`.
//! This module adds the time source and the network side.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 (Xtensa dual core)
//! - **Outputs**: 74HC595 shift register driving two step/dir stepper drivers
//! - **Inputs**: two end-stop switches, low when triggered
//!
//! # Pin Assignments
//!
//! See the [`pins`] module.

mod clock;

pub use clock::Esp32Clock;

#[cfg(feature = "wifi")]
mod wifi;
#[cfg(feature = "wifi")]
pub use wifi::Esp32Wifi;

#[cfg(feature = "esp32-mqtt")]
mod mqtt;
#[cfg(feature = "esp32-mqtt")]
pub use mqtt::{Esp32Mqtt, Esp32MqttError};

/// Pin assignments of the rig's controller board.
pub mod pins {
    // =========================================================================
    // Shift register (74HC595)
    // =========================================================================

    /// Serial data (SER)
    pub const SER: i32 = 21;

    /// Storage latch (RCLK)
    pub const RCLK: i32 = 17;

    /// Shift clock (SRCLK)
    pub const SRCLK: i32 = 16;

    // =========================================================================
    // Direct lines
    // =========================================================================

    /// Status LED
    pub const LED: i32 = 22;

    /// Pan end-stop (input-only pin)
    pub const PAN_ENDSTOP: i32 = 36;

    /// Tilt end-stop (input-only pin)
    pub const TILT_ENDSTOP: i32 = 35;
}
