//! Step pulse trains and the two coupled-axis movers.
//!
//! The pan axis is a differential of both motors: a pure pan steps the pan
//! and tilt motors in lockstep with the tilt motor counter-rotating. A tilt
//! move only steps the tilt motor.
//!
//! Motion is constant speed. The step delay is picked once per move:
//!
//! | Steps | Delay |
//! |-------|-------|
//! | `> fast_move_threshold` (400) | `fast_step_delay_us` (300µs) |
//! | otherwise | `slow_step_delay_us` (3000µs) |
//!
//! # Example
//!
//! ```rust
//! use rs_pantilt::config::MotionConfig;
//! use rs_pantilt::motion::{move_pan, SpeedTier};
//! use rs_pantilt::output::OutputRegister;
//! use rs_pantilt::shift::ShiftRegister;
//! use rs_pantilt::hal::{MockClock, MockGpio};
//!
//! let config = MotionConfig::default();
//! let driver = ShiftRegister::new(MockGpio::new(), MockClock::new(), 0);
//! let mut register = OutputRegister::new(driver);
//! register.set_motor_enabled(true).unwrap();
//!
//! let mut pan = 0;
//! let report = move_pan(&mut register, &mut pan, 500, &config).unwrap();
//! assert_eq!(pan, 500);
//! assert_eq!(report.tier, SpeedTier::Fast);
//! assert_eq!(register.driver().gpio().physical_position().pan, 500);
//! ```

use tracing::debug;

use crate::axis::Axis;
use crate::config::MotionConfig;
use crate::error::RigError;
use crate::output::{OutputBits, OutputRegister};
use crate::traits::{Delay, Gpio};

/// Speed tier selected for a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SpeedTier {
    /// Long moves and homing.
    Fast,
    /// Short moves, more torque margin.
    Slow,
}

impl SpeedTier {
    /// Pick the tier for a move of `steps` steps.
    #[inline]
    pub fn for_steps(steps: u32, config: &MotionConfig) -> Self {
        if steps > config.fast_move_threshold {
            SpeedTier::Fast
        } else {
            SpeedTier::Slow
        }
    }

    /// Step half-period for this tier in microseconds.
    #[inline]
    pub fn delay_us(self, config: &MotionConfig) -> u32 {
        match self {
            SpeedTier::Fast => config.fast_step_delay_us,
            SpeedTier::Slow => config.slow_step_delay_us,
        }
    }
}

/// Summary of a completed move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveReport {
    /// Axis that moved.
    pub axis: Axis,
    /// Position before the move.
    pub from: i32,
    /// Position after the move.
    pub to: i32,
    /// Pulses issued, always `|to - from|`.
    pub steps: u32,
    /// Speed tier used.
    pub tier: SpeedTier,
}

/// Issue `count` step pulses on `step_bits`.
///
/// Each pulse sets the bits, waits `delay_us`, clears them and waits again.
/// When `step_bits` holds more than one line they switch in the same latch.
pub fn pulse_axis<G: Gpio, D: Delay>(
    register: &mut OutputRegister<G, D>,
    step_bits: OutputBits,
    count: u32,
    delay_us: u32,
) -> Result<(), RigError<G::Error>> {
    for _ in 0..count {
        single_pulse(register, step_bits, delay_us)?;
    }
    Ok(())
}

/// One high/low step pulse.
#[inline]
pub(crate) fn single_pulse<G: Gpio, D: Delay>(
    register: &mut OutputRegister<G, D>,
    step_bits: OutputBits,
    delay_us: u32,
) -> Result<(), RigError<G::Error>> {
    register.set_bits(step_bits, true)?;
    register.driver_mut().delay_mut().delay_us(delay_us);
    register.set_bits(step_bits, false)?;
    register.driver_mut().delay_mut().delay_us(delay_us);
    Ok(())
}

fn plan(current: i32, target: i32, config: &MotionConfig) -> (bool, u32, SpeedTier) {
    let forward = target > current;
    let steps = target.abs_diff(current);
    (forward, steps, SpeedTier::for_steps(steps, config))
}

/// Move the tilt axis from `*current` to `target` using the tilt motor.
///
/// `*current` is set to `target` once the pulses are issued; slip is not
/// detected mid-move.
pub fn move_tilt<G: Gpio, D: Delay>(
    register: &mut OutputRegister<G, D>,
    current: &mut i32,
    target: i32,
    config: &MotionConfig,
) -> Result<MoveReport, RigError<G::Error>> {
    let (forward, steps, tier) = plan(*current, target, config);
    debug!(from = *current, to = target, steps, ?tier, "tilt move");

    register.set_bit(OutputBits::TILT_DIR, forward)?;
    pulse_axis(register, OutputBits::TILT_STEP, steps, tier.delay_us(config))?;

    let report = MoveReport {
        axis: Axis::Tilt,
        from: *current,
        to: target,
        steps,
        tier,
    };
    *current = target;
    Ok(report)
}

/// Move the pan axis from `*current` to `target` using both motors.
///
/// The tilt direction line is driven to the complement of the pan
/// direction so the platform pans without tilting, and both step lines
/// pulse together.
pub fn move_pan<G: Gpio, D: Delay>(
    register: &mut OutputRegister<G, D>,
    current: &mut i32,
    target: i32,
    config: &MotionConfig,
) -> Result<MoveReport, RigError<G::Error>> {
    let (forward, steps, tier) = plan(*current, target, config);
    debug!(from = *current, to = target, steps, ?tier, "pan move");

    register.set_bit(OutputBits::PAN_DIR, forward)?;
    register.set_bit(OutputBits::TILT_DIR, !forward)?;
    pulse_axis(
        register,
        OutputBits::PAN_STEP | OutputBits::TILT_STEP,
        steps,
        tier.delay_us(config),
    )?;

    let report = MoveReport {
        axis: Axis::Pan,
        from: *current,
        to: target,
        steps,
        tier,
    };
    *current = target;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::PanTilt;
    use crate::hal::{MockClock, MockGpio};
    use crate::shift::ShiftRegister;
    use crate::traits::Clock;

    fn enabled_register(clock: &MockClock) -> OutputRegister<MockGpio, MockClock> {
        let mut reg = OutputRegister::new(ShiftRegister::new(MockGpio::new(), clock.clone(), 0));
        reg.set_motor_enabled(true).unwrap();
        reg
    }

    #[test]
    fn speed_tier_threshold() {
        let config = MotionConfig::default();
        assert_eq!(SpeedTier::for_steps(0, &config), SpeedTier::Slow);
        assert_eq!(SpeedTier::for_steps(400, &config), SpeedTier::Slow);
        assert_eq!(SpeedTier::for_steps(401, &config), SpeedTier::Fast);
        assert_eq!(SpeedTier::Fast.delay_us(&config), 300);
        assert_eq!(SpeedTier::Slow.delay_us(&config), 3000);
    }

    #[test]
    fn pulse_axis_timing() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        let start = clock.now_us();

        pulse_axis(&mut reg, OutputBits::TILT_STEP, 4, 300).unwrap();

        assert_eq!(clock.now_us() - start, 4 * 2 * 300);
        // enable + 4 * (high, low)
        assert_eq!(reg.driver().gpio().latch_history().len(), 1 + 8);
    }

    #[test]
    fn pulse_axis_zero_count_is_noop() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        pulse_axis(&mut reg, OutputBits::PAN_STEP, 0, 300).unwrap();
        assert_eq!(reg.driver().gpio().latch_history().len(), 1);
    }

    #[test]
    fn tilt_move_up_and_down() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        let config = MotionConfig::default();
        let mut tilt = 0;

        let report = move_tilt(&mut reg, &mut tilt, 120, &config).unwrap();
        assert_eq!(tilt, 120);
        assert_eq!(report.steps, 120);
        assert_eq!(report.tier, SpeedTier::Slow);
        assert_eq!(reg.driver().gpio().physical_position(), PanTilt::new(0, 120));

        let report = move_tilt(&mut reg, &mut tilt, 20, &config).unwrap();
        assert_eq!(tilt, 20);
        assert_eq!(report.steps, 100);
        assert_eq!(report.from, 120);
        assert!(!reg.state().contains(OutputBits::TILT_DIR));
        assert_eq!(reg.driver().gpio().physical_position(), PanTilt::new(0, 20));
    }

    #[test]
    fn tilt_move_never_touches_pan_step() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        let mut tilt = 0;
        move_tilt(&mut reg, &mut tilt, 10, &MotionConfig::default()).unwrap();

        assert!(reg
            .driver()
            .gpio()
            .latch_history()
            .iter()
            .all(|w| w & OutputBits::PAN_STEP.bits() == 0));
    }

    #[test]
    fn pan_move_steps_both_motors_together() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        let mut pan = 0;
        move_pan(&mut reg, &mut pan, 30, &MotionConfig::default()).unwrap();

        let both = (OutputBits::PAN_STEP | OutputBits::TILT_STEP).bits();
        for word in reg.driver().gpio().latch_history() {
            let steps = word & both;
            assert!(steps == 0 || steps == both, "word {word:#010b}");
        }
        assert_eq!(reg.driver().gpio().motor_steps(), (30, 30));
    }

    #[test]
    fn pan_move_counter_rotates_tilt_motor() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        let config = MotionConfig::default();
        let mut pan = 0;

        move_pan(&mut reg, &mut pan, 50, &config).unwrap();
        assert!(reg.state().contains(OutputBits::PAN_DIR));
        assert!(!reg.state().contains(OutputBits::TILT_DIR));

        move_pan(&mut reg, &mut pan, 10, &config).unwrap();
        assert!(!reg.state().contains(OutputBits::PAN_DIR));
        assert!(reg.state().contains(OutputBits::TILT_DIR));

        // pure pan, tilt unchanged
        assert_eq!(reg.driver().gpio().physical_position(), PanTilt::new(10, 0));
    }

    #[test]
    fn long_move_uses_fast_tier_timing() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        let mut pan = 0;
        let start = clock.now_us();

        let report = move_pan(&mut reg, &mut pan, 1000, &MotionConfig::default()).unwrap();

        assert_eq!(report.tier, SpeedTier::Fast);
        assert_eq!(clock.now_us() - start, 1000 * 2 * 300);
    }

    #[test]
    fn zero_length_move_updates_nothing_physical() {
        let clock = MockClock::new();
        let mut reg = enabled_register(&clock);
        let mut tilt = 42;
        let report = move_tilt(&mut reg, &mut tilt, 42, &MotionConfig::default()).unwrap();
        assert_eq!(report.steps, 0);
        assert_eq!(tilt, 42);
        assert_eq!(reg.driver().gpio().motor_steps(), (0, 0));
    }
}
