//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and network traits,
//! enabling development and testing on desktop without the rig attached.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockGpio`] | [`Gpio`] | Decodes the shift bus and simulates the rig |
//! | [`MockClock`] | [`Clock`], [`Delay`] | Shared, controllable time source |
//! | [`MockMqtt`] | [`MqttClient`] | Queued messages, scripted connect failures |
//!
//! # Example
//!
//! ```rust
//! use rs_pantilt::{Config, RigController};
//! use rs_pantilt::hal::{MockClock, MockGpio};
//!
//! let clock = MockClock::new();
//! let gpio = MockGpio::new().with_physical_position(120, 80);
//! let mut rig = RigController::new(gpio, clock.clone(), clock.clone(), Config::default()).unwrap();
//!
//! rig.apply_message("1000/500").unwrap();
//! rig.tick().unwrap();
//!
//! // The simulated platform ended up where the controller believes it is
//! assert_eq!(rig.gpio().physical_position(), rig.position());
//! ```
//!
//! [`Gpio`]: crate::traits::Gpio
//! [`Clock`]: crate::traits::Clock
//! [`Delay`]: crate::traits::Delay
//! [`MqttClient`]: crate::traits::MqttClient

extern crate alloc;
use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::axis::{Axis, PanTilt};
use crate::output::OutputBits;
use crate::traits::{Clock, Delay, Gpio, InputLine, Level, MqttClient, MqttMessage, OutputLine};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// Mock GPIO that behaves like the real board.
///
/// Decodes the serial protocol the way a 74HC595 does: the data line is
/// sampled on every rising edge of the shift clock, and the shifted word
/// is committed on the rising edge of the latch. Each committed word drives
/// a simulated rig:
///
/// - a rising pan step moves the pan axis one step in the pan direction and
///   drags the tilt axis with it
/// - a rising tilt step moves the tilt axis one step in the tilt direction
/// - step edges are ignored while the disable line is high
///
/// End-stops read [`Level::Low`] once the simulated axis is at or below
/// zero, unless jammed with [`with_jammed_endstop`](Self::with_jammed_endstop).
///
/// # Example
///
/// ```rust
/// use rs_pantilt::hal::MockGpio;
/// use rs_pantilt::traits::{Gpio, Level, OutputLine};
///
/// let mut gpio = MockGpio::new();
/// for bit in [true, false, false, false, false, false, false, true] {
///     gpio.set_output(OutputLine::RegisterClock, Level::Low).unwrap();
///     gpio.set_output(OutputLine::SerialData, Level::from(bit)).unwrap();
///     gpio.set_output(OutputLine::RegisterClock, Level::High).unwrap();
/// }
/// // Nothing reaches the outputs until the latch rises
/// assert_eq!(gpio.latched(), 0);
///
/// gpio.set_output(OutputLine::Latch, Level::Low).unwrap();
/// gpio.set_output(OutputLine::Latch, Level::High).unwrap();
/// assert_eq!(gpio.latched(), 0b1000_0001);
/// ```
#[derive(Debug, Default)]
pub struct MockGpio {
    serial: Level,
    shift_clock: Level,
    latch: Level,
    shift: u8,
    latched: u8,
    indicator: Level,
    sampled: Vec<bool>,
    history: Vec<u8>,
    physical: PanTilt,
    motor_steps: (u32, u32),
    pan_jammed: bool,
    tilt_jammed: bool,
}

impl MockGpio {
    /// Creates a rig sitting on both end-stops with all outputs low.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: place the simulated platform away from the end-stops.
    pub fn with_physical_position(mut self, pan: i32, tilt: i32) -> Self {
        self.physical = PanTilt::new(pan, tilt);
        self
    }

    /// Builder: the end-stop for `axis` never reports reached.
    pub fn with_jammed_endstop(mut self, axis: Axis) -> Self {
        match axis {
            Axis::Pan => self.pan_jammed = true,
            Axis::Tilt => self.tilt_jammed = true,
        }
        self
    }

    /// Word currently on the parallel outputs.
    pub fn latched(&self) -> u8 {
        self.latched
    }

    /// Every word latched so far, oldest first.
    pub fn latch_history(&self) -> &[u8] {
        &self.history
    }

    /// Every data bit sampled by the shift clock, oldest first.
    pub fn sampled_bits(&self) -> &[bool] {
        &self.sampled
    }

    /// Where the simulated platform actually is.
    pub fn physical_position(&self) -> PanTilt {
        self.physical
    }

    /// Step pulses accepted by the (pan, tilt) motors.
    pub fn motor_steps(&self) -> (u32, u32) {
        self.motor_steps
    }

    /// Whether the indicator LED is lit.
    pub fn indicator_on(&self) -> bool {
        self.indicator.is_high()
    }

    /// Forget recorded history, keeping the simulated position.
    pub fn clear_history(&mut self) {
        self.history.clear();
        self.sampled.clear();
        self.motor_steps = (0, 0);
    }

    fn commit(&mut self) {
        let prev = OutputBits::from_bits_retain(self.latched);
        let next = OutputBits::from_bits_retain(self.shift);
        self.latched = self.shift;
        self.history.push(self.shift);

        if next.contains(OutputBits::MOTOR_DISABLE) {
            return;
        }
        let rising = |bit: OutputBits| next.contains(bit) && !prev.contains(bit);
        let sign = |dir: OutputBits| if next.contains(dir) { 1 } else { -1 };

        if rising(OutputBits::PAN_STEP) {
            let d = sign(OutputBits::PAN_DIR);
            self.physical.pan += d;
            self.physical.tilt += d;
            self.motor_steps.0 += 1;
        }
        if rising(OutputBits::TILT_STEP) {
            self.physical.tilt += sign(OutputBits::TILT_DIR);
            self.motor_steps.1 += 1;
        }
    }

    fn endstop(&self, axis: Axis) -> Level {
        let jammed = match axis {
            Axis::Pan => self.pan_jammed,
            Axis::Tilt => self.tilt_jammed,
        };
        Level::from(jammed || self.physical.get(axis) > 0)
    }
}

impl Gpio for MockGpio {
    type Error = ();

    fn set_output(&mut self, line: OutputLine, level: Level) -> Result<(), ()> {
        match line {
            OutputLine::SerialData => self.serial = level,
            OutputLine::RegisterClock => {
                if level.is_high() && !self.shift_clock.is_high() {
                    self.shift = (self.shift << 1) | self.serial.is_high() as u8;
                    self.sampled.push(self.serial.is_high());
                }
                self.shift_clock = level;
            }
            OutputLine::Latch => {
                if level.is_high() && !self.latch.is_high() {
                    self.commit();
                }
                self.latch = level;
            }
            OutputLine::Indicator => self.indicator = level,
        }
        Ok(())
    }

    fn read_input(&mut self, line: InputLine) -> Result<Level, ()> {
        Ok(match line {
            InputLine::PanEndstop => self.endstop(Axis::Pan),
            InputLine::TiltEndstop => self.endstop(Axis::Tilt),
        })
    }
}

/// Mock clock for testing time-dependent behavior.
///
/// Clones share the same time, so one handle can be given to the
/// controller as its [`Clock`], another as its [`Delay`], and a third kept
/// by the test. Delays advance the shared time instead of sleeping.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::hal::MockClock;
/// use rs_pantilt::traits::{Clock, Delay};
///
/// let clock = MockClock::new();
/// let mut delay = clock.clone();
///
/// delay.delay_us(1_500);
/// assert_eq!(clock.now_us(), 1_500);
/// assert_eq!(clock.now_ms(), 1);
///
/// clock.advance(99);
/// assert_eq!(clock.now_ms(), 100);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MockClock {
    now_us: Rc<Cell<u64>>,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.now_us.set(ms * 1_000);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        self.now_us.set(self.now_us.get() + ms * 1_000);
    }

    /// Current time in microseconds.
    pub fn now_us(&self) -> u64 {
        self.now_us.get()
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.now_us.get() / 1_000
    }
}

impl Delay for MockClock {
    fn delay_us(&mut self, us: u32) {
        self.now_us.set(self.now_us.get() + us as u64);
    }
}

// ============================================================================
// Network Mocks
// ============================================================================

/// Mock MQTT client for testing.
///
/// Allows injecting incoming messages and scripting connection failures.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::hal::MockMqtt;
/// use rs_pantilt::traits::MqttClient;
///
/// let mut mqtt = MockMqtt::disconnected().with_failing_connects(1);
///
/// assert!(mqtt.connect().is_err());
/// assert!(mqtt.connect().is_ok());
/// assert_eq!(mqtt.connect_attempts, 2);
///
/// mqtt.subscribe("stepper/position").unwrap();
/// assert!(mqtt.is_subscribed("stepper/position"));
///
/// mqtt.queue_message("stepper/position", "100/200");
/// assert_eq!(mqtt.try_recv().unwrap().payload, b"100/200");
/// ```
#[derive(Debug, Default)]
pub struct MockMqtt {
    /// Topics that have been subscribed to.
    pub subscriptions: Vec<String>,
    /// Queue of incoming messages to be returned by `try_recv()`.
    pub incoming: VecDeque<MqttMessage>,
    /// Whether the client is connected.
    pub connected: bool,
    /// Number of upcoming `connect()` calls that fail.
    pub failing_connects: u32,
    /// Number of `connect()` calls made.
    pub connect_attempts: u32,
}

impl MockMqtt {
    /// Creates a new mock MQTT client in connected state.
    pub fn new() -> Self {
        Self {
            connected: true,
            ..Default::default()
        }
    }

    /// Creates a client that has not connected yet.
    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Builder: the next `n` connection attempts are refused.
    pub fn with_failing_connects(mut self, n: u32) -> Self {
        self.failing_connects = n;
        self
    }

    /// Queue an incoming message
    pub fn queue_message(&mut self, topic: impl Into<String>, payload: impl Into<Vec<u8>>) {
        self.incoming.push_back(MqttMessage::new(topic, payload));
    }

    /// Check if a topic was subscribed to
    pub fn is_subscribed(&self, topic: &str) -> bool {
        self.subscriptions.iter().any(|t| t == topic)
    }

    /// Simulate the broker dropping the session.
    pub fn drop_connection(&mut self) {
        self.connected = false;
        self.subscriptions.clear();
    }
}

impl MqttClient for MockMqtt {
    type Error = ();

    fn connect(&mut self) -> Result<(), ()> {
        self.connect_attempts += 1;
        if self.failing_connects > 0 {
            self.failing_connects -= 1;
            self.connected = false;
            return Err(());
        }
        self.connected = true;
        Ok(())
    }

    fn subscribe(&mut self, topic: &str) -> Result<(), ()> {
        if !self.connected {
            return Err(());
        }
        self.subscriptions.push(topic.into());
        Ok(())
    }

    fn try_recv(&mut self) -> Option<MqttMessage> {
        self.incoming.pop_front()
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}
