//! Position feed: keeps the broker session alive and hands payloads to the
//! controller.
//!
//! Works with any [`MqttClient`] implementation, blocking ESP-IDF clients
//! and desktop clients alike.
//!
//! # Example
//!
//! ```rust
//! use rs_pantilt::{CommandOutcome, Config, RigController};
//! use rs_pantilt::axis::PanTilt;
//! use rs_pantilt::config::MqttConfig;
//! use rs_pantilt::hal::{MockClock, MockGpio, MockMqtt};
//! use rs_pantilt::services::PositionFeed;
//!
//! let clock = MockClock::new();
//! let mut rig = RigController::new(MockGpio::new(), clock.clone(), clock.clone(), Config::default()).unwrap();
//!
//! let config = MqttConfig::default();
//! let mut feed = PositionFeed::new(MockMqtt::disconnected(), &config);
//!
//! feed.ensure_connected(rig.delay_mut());
//! assert!(feed.client().is_subscribed(&config.position_topic));
//!
//! feed.client_mut().queue_message(config.position_topic.as_str(), "250/125");
//! let outcome = feed.poll(&mut rig).unwrap();
//! assert_eq!(outcome, Some(CommandOutcome::TargetSet(PanTilt::new(250, 125))));
//! ```

extern crate alloc;
use alloc::string::String;

use tracing::{debug, info, warn};

use crate::command::CommandOutcome;
use crate::config::MqttConfig;
use crate::controller::RigController;
use crate::error::RigError;
use crate::traits::{Clock, Delay, Gpio, MqttClient};

/// Subscription to the position topic with a blocking reconnect loop.
pub struct PositionFeed<M: MqttClient> {
    client: M,
    topic: String,
    reconnect_interval_ms: u32,
}

impl<M: MqttClient> PositionFeed<M> {
    /// Wrap a client. Nothing is sent until [`ensure_connected`](Self::ensure_connected).
    pub fn new(client: M, config: &MqttConfig) -> Self {
        Self {
            client,
            topic: String::from(config.position_topic.as_str()),
            reconnect_interval_ms: config.reconnect_interval_ms,
        }
    }

    /// Get a reference to the MQTT client.
    pub fn client(&self) -> &M {
        &self.client
    }

    /// Get a mutable reference to the MQTT client.
    pub fn client_mut(&mut self) -> &mut M {
        &mut self.client
    }

    /// Topic the feed listens on.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Block until the client is connected and subscribed.
    ///
    /// Failed attempts wait the reconnect interval before retrying. Returns
    /// the number of connection attempts made, zero if already connected.
    pub fn ensure_connected<D: Delay>(&mut self, delay: &mut D) -> u32 {
        let mut attempts = 0;
        while !self.client.is_connected() {
            attempts += 1;
            info!(attempt = attempts, "attempting MQTT connection");
            match self.client.connect() {
                Ok(()) => {
                    info!("MQTT connected");
                    if let Err(e) = self.client.subscribe(&self.topic) {
                        warn!(error = ?e, topic = %self.topic, "subscribe failed");
                    }
                    break;
                }
                Err(e) => {
                    warn!(
                        error = ?e,
                        retry_ms = self.reconnect_interval_ms,
                        "MQTT connection failed, retrying"
                    );
                    delay.delay_ms(self.reconnect_interval_ms);
                }
            }
        }
        attempts
    }

    /// Handle at most one pending message.
    ///
    /// Messages on other topics are dropped. Returns `None` when nothing was
    /// pending.
    pub fn poll<G, C, D>(
        &mut self,
        controller: &mut RigController<G, C, D>,
    ) -> Result<Option<CommandOutcome>, RigError<G::Error>>
    where
        G: Gpio,
        C: Clock,
        D: Delay,
    {
        let Some(msg) = self.client.try_recv() else {
            return Ok(None);
        };
        if msg.topic != self.topic {
            debug!(topic = %msg.topic, "message on unexpected topic");
            return Ok(Some(CommandOutcome::Ignored));
        }

        let payload = String::from_utf8_lossy(&msg.payload);
        debug!(payload = %payload, "position message");
        controller.apply_message(&payload).map(Some)
    }
}
