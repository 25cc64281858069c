//! Network abstraction for the MQTT position feed.
//!
//! The rig listens on a single topic. Each payload is `<pan>/<tilt>` in
//! ASCII decimal, e.g. `3850/2100`.
//!
//! ```text
//! <user>/feeds/stepper.position  - Position command "<pan>/<tilt>"
//! ```

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

/// MQTT client trait for the position feed.
///
/// Sync-first: works with blocking ESP-IDF clients and with desktop
/// clients that drive an async runtime internally.
///
/// # Implementation Notes
///
/// - `connect` is blocking and returns once the broker accepted (or refused)
///   the session
/// - `try_recv` is non-blocking for polling patterns
/// - Subscriptions are not assumed to survive a reconnect; callers
///   re-subscribe after every successful `connect`
pub trait MqttClient {
    /// Error type for MQTT operations.
    type Error: core::fmt::Debug;

    /// Open a session with the broker (blocking).
    fn connect(&mut self) -> Result<(), Self::Error>;

    /// Subscribe to a topic (blocking).
    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error>;

    /// Try to receive the next message (non-blocking).
    ///
    /// Returns `None` if no message is available. This should never block.
    fn try_recv(&mut self) -> Option<MqttMessage>;

    /// Check if connected to broker.
    fn is_connected(&self) -> bool;
}

/// An MQTT message received from a subscription.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MqttMessage {
    /// Topic the message was published to.
    pub topic: String,
    /// Message payload as raw bytes.
    pub payload: Vec<u8>,
}

impl MqttMessage {
    /// Create a new MQTT message.
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}
