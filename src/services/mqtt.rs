//! Desktop MQTT client on `rumqttc`.
//!
//! [`RumqttcClient`] implements the blocking [`MqttClient`] trait on top of
//! `rumqttc::AsyncClient`. It owns a small `tokio` runtime: `connect` blocks
//! on the handshake, then the event loop is spawned onto the runtime and
//! forwards publishes through a channel that `try_recv` drains.
//!
//! ```text
//! connect() ── block_on(ConnAck) ──▶ spawn(event loop) ──▶ mpsc ──▶ try_recv()
//!                                          │
//!                                          └─ error/disconnect ─▶ connected = false
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, Event, MqttOptions, Packet, QoS};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::MqttConfig;
use crate::traits::{MqttClient, MqttMessage};

/// Errors from the desktop MQTT client.
#[derive(Debug, thiserror::Error)]
pub enum MqttError {
    /// The tokio runtime could not be created.
    #[error("MQTT runtime error: {0}")]
    Runtime(#[from] std::io::Error),
    /// Connecting to the broker failed.
    #[error("MQTT connect error: {0}")]
    Connect(String),
    /// No ConnAck within the connect timeout.
    #[error("MQTT connect timed out")]
    Timeout,
    /// Subscribing failed.
    #[error("MQTT subscribe error: {0}")]
    Subscribe(String),
    /// Operation needs an open session.
    #[error("MQTT client not connected")]
    NotConnected,
}

/// Blocking [`MqttClient`] backed by `rumqttc`.
pub struct RumqttcClient {
    runtime: Runtime,
    options: MqttOptions,
    connect_timeout: Duration,
    client: Option<AsyncClient>,
    incoming: Option<mpsc::UnboundedReceiver<MqttMessage>>,
    event_loop: Option<JoinHandle<()>>,
    connected: Arc<AtomicBool>,
}

impl RumqttcClient {
    /// Build a client from the shared MQTT configuration. Does not connect.
    pub fn new(config: &MqttConfig) -> Result<Self, MqttError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("mqtt")
            .enable_all()
            .build()?;

        let mut options = MqttOptions::new(
            config.client_id.as_str(),
            config.host.as_str(),
            config.port,
        );
        options.set_keep_alive(Duration::from_secs(config.keep_alive_secs as u64));
        options.set_clean_session(true);
        if config.has_auth() {
            options.set_credentials(config.username.as_str(), config.password.as_str());
        }

        Ok(Self {
            runtime,
            options,
            connect_timeout: Duration::from_secs(10),
            client: None,
            incoming: None,
            event_loop: None,
            connected: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Builder: how long `connect` waits for the broker's ConnAck.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Broker address this client connects to.
    pub fn broker(&self) -> (String, u16) {
        self.options.broker_address()
    }

    fn teardown(&mut self) {
        if let Some(task) = self.event_loop.take() {
            task.abort();
        }
        self.client = None;
        self.incoming = None;
        self.connected.store(false, Ordering::SeqCst);
    }
}

impl MqttClient for RumqttcClient {
    type Error = MqttError;

    fn connect(&mut self) -> Result<(), MqttError> {
        self.teardown();
        let (client, mut eventloop) = AsyncClient::new(self.options.clone(), 10);

        let timeout = self.connect_timeout;
        self.runtime.block_on(async {
            let handshake = async {
                loop {
                    match eventloop.poll().await {
                        Ok(Event::Incoming(Packet::ConnAck(ack))) => {
                            return match ack.code {
                                ConnectReturnCode::Success => Ok(()),
                                code => Err(MqttError::Connect(format!("{code:?}"))),
                            };
                        }
                        Ok(_) => {}
                        Err(e) => return Err(MqttError::Connect(e.to_string())),
                    }
                }
            };
            match tokio::time::timeout(timeout, handshake).await {
                Ok(result) => result,
                Err(_) => Err(MqttError::Timeout),
            }
        })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let connected = Arc::clone(&self.connected);
        connected.store(true, Ordering::SeqCst);

        let task = self.runtime.spawn(async move {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::Publish(publish))) => {
                        let msg = MqttMessage::new(publish.topic, publish.payload.to_vec());
                        if tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Ok(Event::Incoming(Packet::Disconnect)) => {
                        debug!("broker closed the session");
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "MQTT connection lost");
                        break;
                    }
                }
            }
            connected.store(false, Ordering::SeqCst);
        });

        self.client = Some(client);
        self.incoming = Some(rx);
        self.event_loop = Some(task);
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), MqttError> {
        let client = self.client.as_ref().ok_or(MqttError::NotConnected)?;
        client
            .try_subscribe(topic, QoS::AtLeastOnce)
            .map_err(|e| MqttError::Subscribe(e.to_string()))
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        self.incoming.as_mut()?.try_recv().ok()
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl Drop for RumqttcClient {
    fn drop(&mut self) {
        self.teardown();
    }
}
