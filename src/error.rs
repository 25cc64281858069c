//! Error type shared by the motion, homing and scheduler code.

use crate::axis::Axis;

/// Failure raised while driving the rig.
///
/// Generic over the GPIO error so platform errors pass through unchanged.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RigError<E> {
    /// A GPIO write or read failed.
    #[error("gpio error: {0:?}")]
    Gpio(E),

    /// An end-stop did not trigger within the configured homing step limit.
    ///
    /// The motor driver has been disabled; the stored position is unknown.
    #[error("{axis:?} end-stop not reached after {steps} steps")]
    EndstopNotReached {
        /// Axis whose end-stop never triggered.
        axis: Axis,
        /// Pulses issued before giving up.
        steps: u32,
    },
}

impl<E> RigError<E> {
    /// Returns `true` for hardware faults detected during homing.
    pub fn is_homing_fault(&self) -> bool {
        matches!(self, RigError::EndstopNotReached { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    extern crate alloc;
    use alloc::string::ToString;

    #[test]
    fn display_messages() {
        let e: RigError<()> = RigError::EndstopNotReached {
            axis: Axis::Pan,
            steps: 12,
        };
        assert_eq!(e.to_string(), "Pan end-stop not reached after 12 steps");

        let e: RigError<u8> = RigError::Gpio(3);
        assert_eq!(e.to_string(), "gpio error: 3");
    }

    #[test]
    fn homing_fault_detection() {
        let e: RigError<()> = RigError::EndstopNotReached {
            axis: Axis::Tilt,
            steps: 1,
        };
        assert!(e.is_homing_fault());
        assert!(!RigError::Gpio(()).is_homing_fault());
    }
}
