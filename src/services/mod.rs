//! Network services feeding the controller.
//!
//! - [`PositionFeed`]: platform-agnostic reconnect loop and message poll over
//!   any [`MqttClient`](crate::traits::MqttClient)
//! - `mqtt` feature: `RumqttcClient`, a desktop client on `rumqttc`
//!
//! On ESP32 the feed runs over `hal::esp32::Esp32Mqtt` instead.

pub mod position_feed;

#[cfg(feature = "mqtt")]
pub mod mqtt;

pub use position_feed::*;

#[cfg(feature = "mqtt")]
pub use mqtt::*;
