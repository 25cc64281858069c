//! Hardware abstraction traits for the shift bus, end-stops, and timing.
//!
//! The controller never references concrete pin numbers. Platforms map the
//! logical lines below onto whatever GPIOs they wire up.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Gpio`] | Drive the shift bus and indicator, read the end-stops |
//! | [`Clock`] | Monotonic millisecond time source |
//! | [`Delay`] | Blocking microsecond/millisecond waits |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the `embedded-hal`
//! adapter in `hal::embedded` with ESP-IDF pin drivers (requires `esp32`).
//!
//! # Example
//!
//! ```rust
//! use rs_pantilt::traits::{Gpio, InputLine, Level, OutputLine};
//! use rs_pantilt::hal::MockGpio;
//!
//! let mut gpio = MockGpio::new().with_physical_position(10, 0);
//! gpio.set_output(OutputLine::Indicator, Level::High).unwrap();
//! assert!(gpio.indicator_on());
//!
//! // Pan is away from its end-stop, tilt is sitting on it
//! assert_eq!(gpio.read_input(InputLine::PanEndstop).unwrap(), Level::High);
//! assert_eq!(gpio.read_input(InputLine::TiltEndstop).unwrap(), Level::Low);
//! ```

/// Logic level of a digital line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Level {
    /// Logic low.
    #[default]
    Low,
    /// Logic high.
    High,
}

impl Level {
    /// Returns `true` for [`Level::High`].
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    #[inline]
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Output lines driven by the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputLine {
    /// Serial data presented to the shift register (SER).
    SerialData,
    /// Shift clock; data is sampled on its rising edge (SRCLK).
    RegisterClock,
    /// Storage latch; outputs update on its rising edge (RCLK).
    Latch,
    /// Status indicator LED.
    Indicator,
}

/// Input lines read by the controller.
///
/// End-stops read [`Level::High`] while the axis is away from the switch
/// and [`Level::Low`] once the switch is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InputLine {
    /// Pan axis end-stop.
    PanEndstop,
    /// Tilt axis end-stop.
    TiltEndstop,
}

/// GPIO capability used by the controller.
///
/// Every actuator change goes through the shift bus lines; the indicator
/// and the two end-stops are wired directly.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_pantilt::traits::{Gpio, InputLine, Level, OutputLine};
///
/// struct MyBoard { /* pin handles */ }
///
/// impl Gpio for MyBoard {
///     type Error = ();
///
///     fn set_output(&mut self, line: OutputLine, level: Level) -> Result<(), ()> {
///         // Look up the pin for `line` and write `level`...
///         Ok(())
///     }
///
///     fn read_input(&mut self, line: InputLine) -> Result<Level, ()> {
///         Ok(Level::High)
///     }
/// }
/// ```
pub trait Gpio {
    /// Error type for pin operations.
    type Error;

    /// Drive an output line to the given level.
    fn set_output(&mut self, line: OutputLine, level: Level) -> Result<(), Self::Error>;

    /// Sample an input line.
    fn read_input(&mut self, line: InputLine) -> Result<Level, Self::Error>;
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for the engagement window and
/// indicator timing. On desktop, this can wrap `std::time::Instant`. On
/// embedded, use a hardware timer.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::traits::Clock;
/// use rs_pantilt::hal::MockClock;
///
/// let clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

/// Blocking delay trait.
///
/// Step pulses are timed with these waits, so implementations must not
/// yield for much longer than requested.
pub trait Delay {
    /// Block for the specified number of microseconds.
    fn delay_us(&mut self, us: u32);

    /// Block for the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32) {
        for _ in 0..ms {
            self.delay_us(1_000);
        }
    }
}

impl<T: Delay + ?Sized> Delay for &mut T {
    fn delay_us(&mut self, us: u32) {
        (**self).delay_us(us)
    }

    fn delay_ms(&mut self, ms: u32) {
        (**self).delay_ms(ms)
    }
}
