//! Desktop simulator.
//!
//! Runs the real control loop against a simulated rig (the mock GPIO
//! decodes the shift register and models both axes and end-stops) and a
//! real MQTT broker. Publish `<pan>/<tilt>` to the position topic and watch
//! the log.
//!
//! ```bash
//! MQTT_HOST=localhost MQTT_TOPIC=stepper/position RUST_LOG=rs_pantilt=debug \
//!     cargo run --features mqtt --bin desktop_sim
//! mosquitto_pub -t stepper/position -m 3850/2100
//! ```
//!
//! Environment:
//! - `MQTT_HOST`, `MQTT_PORT`, `MQTT_USER`, `MQTT_PASS`, `MQTT_TOPIC`
//! - `MQTT_CONNECT_TIMEOUT_SECS`: wait for the broker's ConnAck (default 10)
//! - `SIM_PAN`, `SIM_TILT`: simulated start position (default 1200/800)

use std::env;
use std::time::Duration;

use rs_pantilt::config::{MotionConfig, MqttConfig};
use rs_pantilt::hal::{MockGpio, StdClock, StdDelay};
use rs_pantilt::services::{PositionFeed, RumqttcClient};
use rs_pantilt::{Config, RigController, Scheduler};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn config() -> Config {
    let mut mqtt = MqttConfig::default()
        .with_host(&env::var("MQTT_HOST").unwrap_or_else(|_| "localhost".into()))
        .with_port(env_or("MQTT_PORT", 1883))
        .with_client_id("rs-pantilt-sim");
    if let (Ok(user), Ok(pass)) = (env::var("MQTT_USER"), env::var("MQTT_PASS")) {
        mqtt = mqtt.with_auth(&user, &pass);
    }
    if let Ok(topic) = env::var("MQTT_TOPIC") {
        mqtt = mqtt.with_position_topic(&topic);
    }

    Config::default()
        .with_mqtt(mqtt)
        // no real shift register to settle
        .with_motion(MotionConfig::default().with_bus_settle_us(0))
}

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(Level::INFO.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();

    let config = config();
    let gpio = MockGpio::new()
        .with_physical_position(env_or("SIM_PAN", 1200), env_or("SIM_TILT", 800));

    let client = RumqttcClient::new(&config.mqtt)?
        .with_connect_timeout(Duration::from_secs(env_or("MQTT_CONNECT_TIMEOUT_SECS", 10)));
    let (host, port) = client.broker();
    info!(%host, port, topic = config.mqtt.position_topic.as_str(), "simulator starting");

    let feed = PositionFeed::new(client, &config.mqtt);
    let rig = RigController::new(gpio, StdClock::new(), StdDelay, config)?;
    let mut scheduler = Scheduler::new(rig, feed);

    scheduler.startup()?;
    loop {
        let iteration = scheduler.iterate()?;
        if iteration.tick.moved() || iteration.tick.rehomed {
            let rig = scheduler.controller();
            info!(
                believed = ?rig.position(),
                physical = ?rig.gpio().physical_position(),
                "move complete"
            );
        }
    }
}
