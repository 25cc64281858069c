//! Serial-to-parallel output driver (74HC595-style shift register).
//!
//! An 8-bit word is clocked out most-significant bit first on the serial
//! data line, then committed to the parallel outputs with one rising edge
//! of the latch line:
//!
//! ```text
//! LATCH  ‾‾\____________________________________/‾‾‾
//! SRCLK  ‾‾‾‾\__/‾‾‾\__/‾‾‾  ...  \__/‾‾‾
//! SER        < b7 >  < b6 >  ...  < b0 >
//! ```

use crate::error::RigError;
use crate::traits::{Delay, Gpio, Level, OutputLine};

/// Shift register driver owning the GPIO and delay capabilities.
///
/// Every physical output change goes through [`flush`](Self::flush).
/// The GPIO is also reachable through [`gpio_mut`](Self::gpio_mut) for the
/// direct lines (indicator, end-stops).
pub struct ShiftRegister<G, D> {
    gpio: G,
    delay: D,
    settle_us: u32,
}

impl<G: Gpio, D: Delay> ShiftRegister<G, D> {
    /// Create a driver. `settle_us` is waited after every shift clock edge.
    pub fn new(gpio: G, delay: D, settle_us: u32) -> Self {
        Self {
            gpio,
            delay,
            settle_us,
        }
    }

    /// Shift `word` out and latch it onto the parallel outputs.
    pub fn flush(&mut self, word: u8) -> Result<(), RigError<G::Error>> {
        self.write(OutputLine::Latch, Level::Low)?;
        for bit in (0..8).rev() {
            self.write(OutputLine::RegisterClock, Level::Low)?;
            self.write(OutputLine::SerialData, Level::from((word >> bit) & 1 == 1))?;
            self.write(OutputLine::RegisterClock, Level::High)?;
            self.delay.delay_us(self.settle_us);
        }
        self.write(OutputLine::Latch, Level::High)
    }

    #[inline]
    fn write(&mut self, line: OutputLine, level: Level) -> Result<(), RigError<G::Error>> {
        self.gpio.set_output(line, level).map_err(RigError::Gpio)
    }

    /// Direct access to the GPIO capability.
    #[inline]
    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    /// Mutable access to the GPIO capability.
    #[inline]
    pub fn gpio_mut(&mut self) -> &mut G {
        &mut self.gpio
    }

    /// Mutable access to the delay capability.
    #[inline]
    pub fn delay_mut(&mut self) -> &mut D {
        &mut self.delay
    }
}
