//! `embedded-hal` 1.0 adapters.
//!
//! [`HalGpio`] maps the logical lines onto any six pins implementing
//! `OutputPin`/`InputPin`, and [`HalDelay`] wraps any `DelayNs`. Pin errors
//! are reduced to [`ErrorKind`] so the controller error type stays small.
//!
//! # Example
//!
//! ```rust,ignore
//! use esp_idf_hal::delay::Ets;
//! use esp_idf_hal::gpio::PinDriver;
//! use rs_pantilt::hal::{HalDelay, HalGpio};
//!
//! let gpio = HalGpio::new(
//!     PinDriver::output(p.pins.gpio21)?, // SER
//!     PinDriver::output(p.pins.gpio16)?, // SRCLK
//!     PinDriver::output(p.pins.gpio17)?, // RCLK
//!     PinDriver::output(p.pins.gpio22)?, // LED
//!     PinDriver::input(p.pins.gpio36)?,  // pan end-stop
//!     PinDriver::input(p.pins.gpio35)?,  // tilt end-stop
//! );
//! let delay = HalDelay::new(Ets);
//! ```

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{Error as _, ErrorKind, InputPin, OutputPin};

use crate::traits::{Delay, Gpio, InputLine, Level, OutputLine};

/// GPIO capability over six `embedded-hal` pins.
pub struct HalGpio<Ser, Srclk, Rclk, Led, PanEs, TiltEs> {
    serial: Ser,
    shift_clock: Srclk,
    latch: Rclk,
    indicator: Led,
    pan_endstop: PanEs,
    tilt_endstop: TiltEs,
}

impl<Ser, Srclk, Rclk, Led, PanEs, TiltEs> HalGpio<Ser, Srclk, Rclk, Led, PanEs, TiltEs>
where
    Ser: OutputPin,
    Srclk: OutputPin,
    Rclk: OutputPin,
    Led: OutputPin,
    PanEs: InputPin,
    TiltEs: InputPin,
{
    /// Bundle the pins.
    pub fn new(
        serial: Ser,
        shift_clock: Srclk,
        latch: Rclk,
        indicator: Led,
        pan_endstop: PanEs,
        tilt_endstop: TiltEs,
    ) -> Self {
        Self {
            serial,
            shift_clock,
            latch,
            indicator,
            pan_endstop,
            tilt_endstop,
        }
    }
}

fn drive<P: OutputPin>(pin: &mut P, level: Level) -> Result<(), ErrorKind> {
    match level {
        Level::High => pin.set_high(),
        Level::Low => pin.set_low(),
    }
    .map_err(|e| e.kind())
}

fn sample<P: InputPin>(pin: &mut P) -> Result<Level, ErrorKind> {
    pin.is_high().map(Level::from).map_err(|e| e.kind())
}

impl<Ser, Srclk, Rclk, Led, PanEs, TiltEs> Gpio for HalGpio<Ser, Srclk, Rclk, Led, PanEs, TiltEs>
where
    Ser: OutputPin,
    Srclk: OutputPin,
    Rclk: OutputPin,
    Led: OutputPin,
    PanEs: InputPin,
    TiltEs: InputPin,
{
    type Error = ErrorKind;

    fn set_output(&mut self, line: OutputLine, level: Level) -> Result<(), ErrorKind> {
        match line {
            OutputLine::SerialData => drive(&mut self.serial, level),
            OutputLine::RegisterClock => drive(&mut self.shift_clock, level),
            OutputLine::Latch => drive(&mut self.latch, level),
            OutputLine::Indicator => drive(&mut self.indicator, level),
        }
    }

    fn read_input(&mut self, line: InputLine) -> Result<Level, ErrorKind> {
        match line {
            InputLine::PanEndstop => sample(&mut self.pan_endstop),
            InputLine::TiltEndstop => sample(&mut self.tilt_endstop),
        }
    }
}

/// [`Delay`] over an `embedded-hal` `DelayNs`.
pub struct HalDelay<D>(D);

impl<D: DelayNs> HalDelay<D> {
    /// Wrap a delay provider.
    pub fn new(delay: D) -> Self {
        Self(delay)
    }
}

impl<D: DelayNs> Delay for HalDelay<D> {
    #[inline]
    fn delay_us(&mut self, us: u32) {
        self.0.delay_us(us);
    }

    #[inline]
    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}
