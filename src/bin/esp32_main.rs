//! ESP32 pan/tilt rig firmware.
//!
//! Boot sequence:
//! - Release the motor drivers (output word re-initialised)
//! - Join WiFi (retries until associated)
//! - Home both axes against their end-stops
//! - Run the control loop: keep MQTT up, take one position message, move
//!
//! Credentials are baked in at build time:
//!
//! ```bash
//! WIFI_SSID=... WIFI_PASSWORD=... \
//! MQTT_HOST=io.adafruit.com MQTT_USER=... MQTT_PASS=... \
//! MQTT_FEED_POSITION=user/feeds/stepper.position \
//!     cargo build --release --features esp32-mqtt --bin esp32_main
//! ```

use esp_idf_hal::delay::Ets;
use esp_idf_hal::gpio::PinDriver;
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use rs_pantilt::config::{MqttConfig, WifiConfig};
use rs_pantilt::hal::esp32::{Esp32Clock, Esp32Mqtt, Esp32Wifi};
use rs_pantilt::hal::{HalDelay, HalGpio};
use rs_pantilt::services::PositionFeed;
use rs_pantilt::{Config, RigController, Scheduler};
use tracing::{error, info};

fn config() -> Config {
    let mut mqtt = MqttConfig::default()
        .with_host(option_env!("MQTT_HOST").unwrap_or("io.adafruit.com"))
        .with_auth(
            option_env!("MQTT_USER").unwrap_or(""),
            option_env!("MQTT_PASS").unwrap_or(""),
        );
    if let Some(port) = option_env!("MQTT_PORT").and_then(|p| p.parse().ok()) {
        mqtt = mqtt.with_port(port);
    }
    if let Some(topic) = option_env!("MQTT_FEED_POSITION") {
        mqtt = mqtt.with_position_topic(topic);
    }

    Config::default()
        .with_wifi(
            WifiConfig::default()
                .with_ssid(option_env!("WIFI_SSID").unwrap_or(""))
                .with_password(option_env!("WIFI_PASSWORD").unwrap_or("")),
        )
        .with_mqtt(mqtt)
}

fn main() -> anyhow::Result<()> {
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let config = config();
    info!(device = config.device.name.as_str(), "starting");

    let peripherals = Peripherals::take()?;
    let pins = peripherals.pins;

    // Drivers are released before anything slow happens
    let gpio = HalGpio::new(
        PinDriver::output(pins.gpio21)?,
        PinDriver::output(pins.gpio16)?,
        PinDriver::output(pins.gpio17)?,
        PinDriver::output(pins.gpio22)?,
        PinDriver::input(pins.gpio36)?,
        PinDriver::input(pins.gpio35)?,
    );
    let rig = RigController::new(gpio, Esp32Clock::new(), HalDelay::new(Ets), config.clone())?;
    info!("outputs initialised, motors released");

    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;
    let _wifi = Esp32Wifi::connect(peripherals.modem, sysloop, Some(nvs), &config.wifi)?;

    let feed = PositionFeed::new(Esp32Mqtt::new(&config.mqtt), &config.mqtt);
    info!(topic = feed.topic(), "position feed ready");

    let scheduler = Scheduler::new(rig, feed);
    match scheduler.run() {
        Ok(never) => match never {},
        Err(e) => {
            error!(error = %e, "control loop stopped");
            Err(e.into())
        }
    }
}
