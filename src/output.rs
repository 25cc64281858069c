//! In-memory mirror of the eight shift register outputs.
//!
//! [`OutputRegister`] is the only mutation path for the physical outputs:
//! every change is flushed to the bus before the call returns.

use bitflags::bitflags;

use crate::error::RigError;
use crate::shift::ShiftRegister;
use crate::traits::{Delay, Gpio};

bitflags! {
    /// Output lines behind the shift register, one bit per line.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct OutputBits: u8 {
        /// Motor driver disable (high = de-energized).
        const MOTOR_DISABLE = 1 << 0;
        /// Pan motor step.
        const PAN_STEP = 1 << 1;
        /// Pan motor direction.
        const PAN_DIR = 1 << 2;
        /// Unused.
        const RESERVED_3 = 1 << 3;
        /// Unused.
        const RESERVED_4 = 1 << 4;
        /// Tilt motor step.
        const TILT_STEP = 1 << 5;
        /// Tilt motor direction.
        const TILT_DIR = 1 << 6;
        /// Beeper, wired but not driven.
        const BEEPER = 1 << 7;
    }
}

/// Bit-state register: the current output word plus the driver it feeds.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::output::{OutputBits, OutputRegister};
/// use rs_pantilt::shift::ShiftRegister;
/// use rs_pantilt::hal::{MockClock, MockGpio};
///
/// let driver = ShiftRegister::new(MockGpio::new(), MockClock::new(), 10);
/// let mut register = OutputRegister::new(driver);
///
/// register.set_bit(OutputBits::PAN_DIR, true).unwrap();
/// assert_eq!(register.driver().gpio().latched(), 0b0000_0100);
/// ```
pub struct OutputRegister<G, D> {
    driver: ShiftRegister<G, D>,
    state: OutputBits,
}

impl<G: Gpio, D: Delay> OutputRegister<G, D> {
    /// Wrap a driver. The mirror starts at all-low and nothing is flushed.
    pub fn new(driver: ShiftRegister<G, D>) -> Self {
        Self {
            driver,
            state: OutputBits::empty(),
        }
    }

    /// Set or clear one line and flush the new word.
    #[inline]
    pub fn set_bit(&mut self, bit: OutputBits, on: bool) -> Result<(), RigError<G::Error>> {
        self.set_bits(bit, on)
    }

    /// Set or clear several lines with a single flush.
    ///
    /// Used where lines must change in the same latch, such as both step
    /// lines of a coupled pan pulse.
    pub fn set_bits(&mut self, bits: OutputBits, on: bool) -> Result<(), RigError<G::Error>> {
        self.state.set(bits, on);
        self.driver.flush(self.state.bits())
    }

    /// Overwrite the whole word and flush it.
    pub fn reset(&mut self, state: OutputBits) -> Result<(), RigError<G::Error>> {
        self.state = state;
        self.driver.flush(self.state.bits())
    }

    /// Energize (`true`) or de-energize (`false`) the motor drivers.
    #[inline]
    pub fn set_motor_enabled(&mut self, enabled: bool) -> Result<(), RigError<G::Error>> {
        self.set_bit(OutputBits::MOTOR_DISABLE, !enabled)
    }

    /// Current output word.
    #[inline]
    pub fn state(&self) -> OutputBits {
        self.state
    }

    /// Whether the motor drivers are currently energized.
    #[inline]
    pub fn motor_enabled(&self) -> bool {
        !self.state.contains(OutputBits::MOTOR_DISABLE)
    }

    /// The underlying driver.
    #[inline]
    pub fn driver(&self) -> &ShiftRegister<G, D> {
        &self.driver
    }

    /// Mutable access to the underlying driver.
    #[inline]
    pub fn driver_mut(&mut self) -> &mut ShiftRegister<G, D> {
        &mut self.driver
    }
}
