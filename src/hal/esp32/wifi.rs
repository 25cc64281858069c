//! WiFi station connection for the ESP32.
//!
//! # Example
//!
//! ```ignore
//! use rs_pantilt::hal::esp32::Esp32Wifi;
//! use rs_pantilt::config::WifiConfig;
//!
//! let config = WifiConfig::default()
//!     .with_ssid("MyNetwork")
//!     .with_password("secret123");
//!
//! let wifi = Esp32Wifi::connect(modem, sysloop, nvs, &config)?;
//! // WiFi is now connected and has an IP address
//! ```

use std::net::Ipv4Addr;

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, ClientConfiguration, Configuration, EspWifi};
use tracing::{info, warn};

use crate::config::WifiConfig;

/// Station-mode WiFi connection, kept for the lifetime of this struct.
pub struct Esp32Wifi<'a> {
    wifi: BlockingWifi<EspWifi<'a>>,
}

impl<'a> Esp32Wifi<'a> {
    /// Bring the station up and block until it has an address.
    ///
    /// Association is retried every `poll_interval_ms` until it succeeds;
    /// driver initialisation errors are returned.
    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        config: &WifiConfig,
    ) -> anyhow::Result<Self> {
        let esp_wifi = EspWifi::new(modem, sysloop.clone(), nvs)?;
        let mut wifi = BlockingWifi::wrap(esp_wifi, sysloop)?;

        let mut ssid: heapless::String<32> = heapless::String::new();
        let _ = ssid.push_str(config.ssid.as_str());
        let mut password: heapless::String<64> = heapless::String::new();
        let _ = password.push_str(config.password.as_str());

        wifi.set_configuration(&Configuration::Client(ClientConfiguration {
            ssid,
            password,
            ..Default::default()
        }))?;
        wifi.start()?;

        info!(ssid = config.ssid.as_str(), "connecting to WiFi");
        let mut attempts = 0u32;
        while let Err(e) = wifi.connect() {
            attempts += 1;
            warn!(attempt = attempts, error = ?e, "WiFi not connected yet");
            FreeRtos::delay_ms(config.poll_interval_ms);
        }
        wifi.wait_netif_up()?;

        let this = Self { wifi };
        if let Some(ip) = this.ip_addr() {
            info!(%ip, "WiFi connected");
        }
        Ok(this)
    }

    /// Get the current IP address, if connected.
    pub fn ip_addr(&self) -> Option<Ipv4Addr> {
        self.wifi
            .wifi()
            .sta_netif()
            .get_ip_info()
            .ok()
            .map(|info| info.ip)
    }

    /// Check if WiFi is connected.
    pub fn is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}
