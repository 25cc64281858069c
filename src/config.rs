//! Shared configuration system for desktop and ESP32.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`.
//!
//! # Example
//!
//! ```rust
//! use rs_pantilt::config::{Config, MotionConfig, MqttConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.motion.pan_max_steps, 7700);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_mqtt(MqttConfig::default().with_host("192.168.1.100"))
//!     .with_motion(MotionConfig::default().with_engage_hold_ms(30_000));
//! ```

use heapless::String as HString;

/// Maximum length for short config strings (hostnames, client IDs)
pub const MAX_SHORT_STRING: usize = 64;

/// Maximum length for longer config strings (topics)
pub const MAX_LONG_STRING: usize = 128;

/// Type alias for short config strings
pub type ShortString = HString<MAX_SHORT_STRING>;

/// Type alias for longer config strings
pub type LongString = HString<MAX_LONG_STRING>;

// ============================================================================
// Helper for creating heapless strings
// ============================================================================

fn truncated<const N: usize>(s: &str) -> HString<N> {
    let mut hs = HString::new();
    let valid_end = s
        .char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .take_while(|end| *end <= N)
        .last()
        .unwrap_or(0);
    let _ = hs.push_str(&s[..valid_end]);
    hs
}

/// Create a ShortString from a &str, truncating if too long
pub fn short_string(s: &str) -> ShortString {
    truncated(s)
}

/// Create a LongString from a &str, truncating if too long
pub fn long_string(s: &str) -> LongString {
    truncated(s)
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete application configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// WiFi connection configuration
    pub wifi: WifiConfig,
    /// MQTT client configuration
    pub mqtt: MqttConfig,
    /// Stepper timing, travel limits and engagement policy
    pub motion: MotionConfig,
    /// Status indicator timing
    pub indicator: IndicatorConfig,
    /// Device identification
    pub device: DeviceConfig,
}

impl Config {
    /// Set WiFi configuration
    pub fn with_wifi(mut self, wifi: WifiConfig) -> Self {
        self.wifi = wifi;
        self
    }

    /// Set MQTT configuration
    pub fn with_mqtt(mut self, mqtt: MqttConfig) -> Self {
        self.mqtt = mqtt;
        self
    }

    /// Set motion configuration
    pub fn with_motion(mut self, motion: MotionConfig) -> Self {
        self.motion = motion;
        self
    }

    /// Set indicator configuration
    pub fn with_indicator(mut self, indicator: IndicatorConfig) -> Self {
        self.indicator = indicator;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Motion Config
// ============================================================================

/// Stepper motion configuration.
///
/// Step delays are the half-period of the step pulse: the step line is held
/// high for one delay and low for one delay.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionConfig {
    /// Pan travel in steps from the end-stop (X axis)
    pub pan_max_steps: i32,
    /// Tilt travel in steps from the end-stop (Y axis)
    pub tilt_max_steps: i32,
    /// Step delay used for long moves and homing (microseconds)
    pub fast_step_delay_us: u32,
    /// Step delay used for short moves (microseconds)
    pub slow_step_delay_us: u32,
    /// Moves longer than this many steps use the fast delay
    pub fast_move_threshold: u32,
    /// How long the driver stays energized after a move (milliseconds)
    pub engage_hold_ms: u64,
    /// Settle time after each shift clock edge (microseconds)
    pub bus_settle_us: u32,
    /// Idle wait when a scheduler iteration made no move (milliseconds)
    pub idle_ms: u32,
    /// Pulses per homing phase before giving up (`None` = wait forever)
    pub homing_step_limit: Option<u32>,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            pan_max_steps: 7700,
            tilt_max_steps: 4200,
            fast_step_delay_us: 300,
            slow_step_delay_us: 3000,
            fast_move_threshold: 400,
            engage_hold_ms: 60_000,
            bus_settle_us: 10,
            idle_ms: 10,
            homing_step_limit: None,
        }
    }
}

impl MotionConfig {
    /// Set the travel limits in steps (negative values become 0)
    pub fn with_max_steps(mut self, pan: i32, tilt: i32) -> Self {
        self.pan_max_steps = pan.max(0);
        self.tilt_max_steps = tilt.max(0);
        self
    }

    /// Set the fast and slow step delays
    pub fn with_step_delays_us(mut self, fast: u32, slow: u32) -> Self {
        self.fast_step_delay_us = fast;
        self.slow_step_delay_us = slow;
        self
    }

    /// Set the step count above which moves run fast
    pub fn with_fast_move_threshold(mut self, steps: u32) -> Self {
        self.fast_move_threshold = steps;
        self
    }

    /// Set the engagement hold duration
    pub fn with_engage_hold_ms(mut self, ms: u64) -> Self {
        self.engage_hold_ms = ms;
        self
    }

    /// Set the shift bus settle time
    pub fn with_bus_settle_us(mut self, us: u32) -> Self {
        self.bus_settle_us = us;
        self
    }

    /// Set the idle wait
    pub fn with_idle_ms(mut self, ms: u32) -> Self {
        self.idle_ms = ms;
        self
    }

    /// Bound each homing phase to `steps` pulses
    pub fn with_homing_step_limit(mut self, steps: Option<u32>) -> Self {
        self.homing_step_limit = steps;
        self
    }
}

// ============================================================================
// Indicator Config
// ============================================================================

/// Status LED timing
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorConfig {
    /// How long the LED stays active after motion starts (milliseconds)
    pub on_duration_ms: u64,
    /// Half period of the post-motion blink (milliseconds)
    pub blink_half_period_ms: u64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            on_duration_ms: 60_000,
            blink_half_period_ms: 300,
        }
    }
}

impl IndicatorConfig {
    /// Set the active duration
    pub fn with_on_duration_ms(mut self, ms: u64) -> Self {
        self.on_duration_ms = ms;
        self
    }

    /// Set the blink half period (values below 1ms become 1ms)
    pub fn with_blink_half_period_ms(mut self, ms: u64) -> Self {
        self.blink_half_period_ms = ms.max(1);
        self
    }
}

// ============================================================================
// MQTT Config
// ============================================================================

/// MQTT client configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MqttConfig {
    /// Broker hostname or IP
    pub host: ShortString,
    /// Broker port
    pub port: u16,
    /// Client ID presented to the broker
    pub client_id: ShortString,
    /// Username for authentication (empty = no auth)
    pub username: ShortString,
    /// Password for authentication
    pub password: ShortString,
    /// Topic carrying `<pan>/<tilt>` position commands
    pub position_topic: LongString,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
    /// Wait between reconnect attempts in milliseconds
    pub reconnect_interval_ms: u32,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            host: short_string("io.adafruit.com"),
            port: 1883,
            client_id: short_string("ESP32_Client"),
            username: ShortString::new(),
            password: ShortString::new(),
            position_topic: long_string("stepper/position"),
            keep_alive_secs: 15,
            reconnect_interval_ms: 5_000,
        }
    }
}

impl MqttConfig {
    /// Set the broker host
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = short_string(host);
        self
    }

    /// Set the broker port
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the client ID
    pub fn with_client_id(mut self, id: &str) -> Self {
        self.client_id = short_string(id);
        self
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, username: &str, password: &str) -> Self {
        self.username = short_string(username);
        self.password = short_string(password);
        self
    }

    /// Set the position topic
    pub fn with_position_topic(mut self, topic: &str) -> Self {
        self.position_topic = long_string(topic);
        self
    }

    /// Set the reconnect interval
    pub fn with_reconnect_interval_ms(mut self, ms: u32) -> Self {
        self.reconnect_interval_ms = ms;
        self
    }

    /// Check if authentication is configured
    pub fn has_auth(&self) -> bool {
        !self.username.is_empty()
    }
}

// ============================================================================
// WiFi Config
// ============================================================================

/// WiFi connection configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WifiConfig {
    /// WiFi network SSID
    pub ssid: ShortString,
    /// WiFi password
    pub password: ShortString,
    /// Wait between connection checks while joining (milliseconds)
    pub poll_interval_ms: u32,
}

impl Default for WifiConfig {
    fn default() -> Self {
        Self {
            ssid: ShortString::new(),
            password: ShortString::new(),
            poll_interval_ms: 500,
        }
    }
}

impl WifiConfig {
    /// Set the SSID
    pub fn with_ssid(mut self, ssid: &str) -> Self {
        self.ssid = short_string(ssid);
        self
    }

    /// Set the password
    pub fn with_password(mut self, password: &str) -> Self {
        self.password = short_string(password);
        self
    }

    /// Set the join poll interval
    pub fn with_poll_interval_ms(mut self, ms: u32) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Check if WiFi credentials are configured
    pub fn is_configured(&self) -> bool {
        !self.ssid.is_empty()
    }
}

// ============================================================================
// Device Config
// ============================================================================

/// Device identification configuration
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Human-readable device name
    pub name: ShortString,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name: short_string("rs-pantilt"),
        }
    }
}

impl DeviceConfig {
    /// Set the device name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = short_string(name);
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
