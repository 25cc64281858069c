//! MQTT client for the ESP32.
//!
//! Wraps the ESP-IDF MQTT client behind the blocking [`MqttClient`] trait.
//! A background thread drains the connection's events: it tracks the
//! connected flag and forwards received publishes to a channel that
//! `try_recv` polls.
//!
//! # Example
//!
//! ```ignore
//! use rs_pantilt::hal::esp32::Esp32Mqtt;
//! use rs_pantilt::config::MqttConfig;
//! use rs_pantilt::traits::MqttClient;
//!
//! let config = MqttConfig::default()
//!     .with_host("io.adafruit.com")
//!     .with_auth("user", "aio_key");
//!
//! let mut mqtt = Esp32Mqtt::new(&config);
//! mqtt.connect()?;
//! mqtt.subscribe(config.position_topic.as_str())?;
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use esp_idf_svc::mqtt::client::{
    EspMqttClient, EspMqttConnection, EventPayload, MqttClientConfiguration, QoS,
};
use tracing::{debug, warn};

use crate::config::MqttConfig;
use crate::traits::{MqttClient, MqttMessage};

/// Error type for ESP32 MQTT operations.
#[derive(Debug, thiserror::Error)]
#[error("MQTT error: {0}")]
pub struct Esp32MqttError(pub String);

/// ESP-IDF MQTT client for the position feed.
pub struct Esp32Mqtt {
    config: MqttConfig,
    client: Option<EspMqttClient<'static>>,
    message_rx: Option<Receiver<MqttMessage>>,
    connected: Arc<AtomicBool>,
    connect_timeout: Duration,
}

impl Esp32Mqtt {
    /// Create a client. Nothing is opened until `connect`.
    pub fn new(config: &MqttConfig) -> Self {
        Self {
            config: config.clone(),
            client: None,
            message_rx: None,
            connected: Arc::new(AtomicBool::new(false)),
            connect_timeout: Duration::from_secs(10),
        }
    }

    fn open(&mut self) -> Result<(), Esp32MqttError> {
        let broker_url = format!(
            "mqtt://{}:{}",
            self.config.host.as_str(),
            self.config.port
        );
        let has_auth = self.config.has_auth();
        let mqtt_config = MqttClientConfiguration {
            client_id: Some(self.config.client_id.as_str()),
            username: has_auth.then_some(self.config.username.as_str()),
            password: has_auth.then_some(self.config.password.as_str()),
            keep_alive_interval: Some(Duration::from_secs(self.config.keep_alive_secs as u64)),
            ..Default::default()
        };

        let (client, mut connection) = EspMqttClient::new(&broker_url, &mqtt_config)
            .map_err(|e| Esp32MqttError(format!("{e:?}")))?;

        let (message_tx, message_rx) = channel::<MqttMessage>();
        let connected = Arc::clone(&self.connected);
        thread::Builder::new()
            .name("mqtt-events".into())
            .stack_size(6 * 1024)
            .spawn(move || handle_mqtt_events(&mut connection, message_tx, connected))
            .map_err(|e| Esp32MqttError(e.to_string()))?;

        self.client = Some(client);
        self.message_rx = Some(message_rx);
        Ok(())
    }
}

impl MqttClient for Esp32Mqtt {
    type Error = Esp32MqttError;

    fn connect(&mut self) -> Result<(), Self::Error> {
        // The ESP-IDF client reconnects on its own once created
        if self.client.is_none() {
            self.open()?;
        }

        let start = Instant::now();
        while !self.connected.load(Ordering::SeqCst) {
            if start.elapsed() >= self.connect_timeout {
                return Err(Esp32MqttError("connect timed out".into()));
            }
            thread::sleep(Duration::from_millis(50));
        }
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), Self::Error> {
        let client = self
            .client
            .as_mut()
            .ok_or_else(|| Esp32MqttError("not connected".into()))?;
        client
            .subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| Esp32MqttError(format!("{e:?}")))?;
        Ok(())
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        self.message_rx.as_ref()?.try_recv().ok()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

fn handle_mqtt_events(
    connection: &mut EspMqttConnection,
    message_tx: Sender<MqttMessage>,
    connected: Arc<AtomicBool>,
) {
    loop {
        match connection.next() {
            Err(e) => {
                warn!(error = ?e, "MQTT event loop ended");
                connected.store(false, Ordering::SeqCst);
                break;
            }
            Ok(event) => match event.payload() {
                EventPayload::Connected(_) => {
                    debug!("MQTT session up");
                    connected.store(true, Ordering::SeqCst);
                }
                EventPayload::Disconnected => {
                    warn!("MQTT disconnected");
                    connected.store(false, Ordering::SeqCst);
                }
                EventPayload::Received {
                    topic: Some(topic),
                    data,
                    ..
                } => {
                    let _ = message_tx.send(MqttMessage::new(topic, data.to_vec()));
                }
                _ => {}
            },
        }
    }
}
