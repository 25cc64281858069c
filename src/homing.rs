//! Homing (calibration) against the end-stop switches.
//!
//! The sequence is a small state machine advanced one pulse at a time:
//!
//! ```text
//! Engage ──▶ SeekPan ──(pan end-stop)──▶ SeekTilt ──(tilt end-stop)──▶ Release ──▶ Done
//! ```
//!
//! - **Engage**: enable the drivers, set pan direction toward the end-stop
//!   and the tilt direction to the complement so the pulse train pans only.
//! - **SeekPan**: pulse both motors at the fast delay until the pan
//!   end-stop reads low, then zero the pan position.
//! - **SeekTilt**: reverse the tilt direction and pulse the tilt motor alone
//!   until the tilt end-stop reads low, then zero the tilt position.
//! - **Release**: disable the drivers.
//!
//! Without a step limit a dead end-stop keeps the sequence seeking forever.
//! With [`MotionConfig::homing_step_limit`] set, the drivers are disabled
//! and [`RigError::EndstopNotReached`] is returned instead.

use tracing::{debug, info, warn};

use crate::axis::{Axis, PanTilt};
use crate::config::MotionConfig;
use crate::error::RigError;
use crate::motion::single_pulse;
use crate::output::{OutputBits, OutputRegister};
use crate::traits::{Delay, Gpio, InputLine, Level};

/// Phase of the homing sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HomingPhase {
    /// Drivers about to be enabled and directions set.
    Engage,
    /// Driving toward the pan end-stop.
    SeekPan,
    /// Driving toward the tilt end-stop.
    SeekTilt,
    /// Both axes zeroed, drivers about to be released.
    Release,
    /// Sequence finished.
    Done,
}

/// Result of a completed homing run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HomingReport {
    /// Pulses issued while seeking the pan end-stop.
    pub pan_steps: u32,
    /// Pulses issued while seeking the tilt end-stop.
    pub tilt_steps: u32,
}

/// Homing state machine.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::axis::PanTilt;
/// use rs_pantilt::config::MotionConfig;
/// use rs_pantilt::homing::{Homing, HomingPhase};
/// use rs_pantilt::output::OutputRegister;
/// use rs_pantilt::shift::ShiftRegister;
/// use rs_pantilt::hal::{MockClock, MockGpio};
///
/// let gpio = MockGpio::new().with_physical_position(25, 40);
/// let mut register = OutputRegister::new(ShiftRegister::new(gpio, MockClock::new(), 0));
/// let mut position = PanTilt::new(999, 999);
///
/// let mut homing = Homing::new(&MotionConfig::default());
/// let report = homing.run(&mut register, &mut position).unwrap();
///
/// assert_eq!(homing.phase(), HomingPhase::Done);
/// assert_eq!(position, PanTilt::ZERO);
/// assert_eq!(report.pan_steps, 25);
/// assert_eq!(report.tilt_steps, 40);
/// assert!(!register.motor_enabled());
/// ```
#[derive(Clone, Debug)]
pub struct Homing {
    phase: HomingPhase,
    delay_us: u32,
    step_limit: Option<u32>,
    report: HomingReport,
}

impl Homing {
    /// Create a sequence using the fast step delay from `config`.
    pub fn new(config: &MotionConfig) -> Self {
        Self {
            phase: HomingPhase::Engage,
            delay_us: config.fast_step_delay_us,
            step_limit: config.homing_step_limit,
            report: HomingReport::default(),
        }
    }

    /// Current phase.
    #[inline]
    pub fn phase(&self) -> HomingPhase {
        self.phase
    }

    /// Run the sequence to completion (blocking).
    pub fn run<G: Gpio, D: Delay>(
        &mut self,
        register: &mut OutputRegister<G, D>,
        position: &mut PanTilt,
    ) -> Result<HomingReport, RigError<G::Error>> {
        info!("homing started");
        while self.phase != HomingPhase::Done {
            self.step(register, position)?;
        }
        info!(
            pan_steps = self.report.pan_steps,
            tilt_steps = self.report.tilt_steps,
            "homing complete"
        );
        Ok(self.report)
    }

    /// Advance by one action: a phase transition or a single pulse.
    ///
    /// Returns the phase after the action.
    pub fn step<G: Gpio, D: Delay>(
        &mut self,
        register: &mut OutputRegister<G, D>,
        position: &mut PanTilt,
    ) -> Result<HomingPhase, RigError<G::Error>> {
        match self.phase {
            HomingPhase::Engage => {
                register.set_motor_enabled(true)?;
                register.set_bit(OutputBits::PAN_DIR, false)?;
                register.set_bit(OutputBits::TILT_DIR, true)?;
                self.phase = HomingPhase::SeekPan;
            }
            HomingPhase::SeekPan => {
                if endstop_reached(register, InputLine::PanEndstop)? {
                    position.pan = 0;
                    debug!(steps = self.report.pan_steps, "pan end-stop reached");
                    register.set_bit(OutputBits::TILT_DIR, false)?;
                    self.phase = HomingPhase::SeekTilt;
                } else {
                    self.check_limit(register, Axis::Pan, self.report.pan_steps)?;
                    single_pulse(
                        register,
                        OutputBits::PAN_STEP | OutputBits::TILT_STEP,
                        self.delay_us,
                    )?;
                    self.report.pan_steps = self.report.pan_steps.saturating_add(1);
                }
            }
            HomingPhase::SeekTilt => {
                if endstop_reached(register, InputLine::TiltEndstop)? {
                    position.tilt = 0;
                    debug!(steps = self.report.tilt_steps, "tilt end-stop reached");
                    self.phase = HomingPhase::Release;
                } else {
                    self.check_limit(register, Axis::Tilt, self.report.tilt_steps)?;
                    single_pulse(register, OutputBits::TILT_STEP, self.delay_us)?;
                    self.report.tilt_steps = self.report.tilt_steps.saturating_add(1);
                }
            }
            HomingPhase::Release => {
                register.set_motor_enabled(false)?;
                self.phase = HomingPhase::Done;
            }
            HomingPhase::Done => {}
        }
        Ok(self.phase)
    }

    fn check_limit<G: Gpio, D: Delay>(
        &mut self,
        register: &mut OutputRegister<G, D>,
        axis: Axis,
        steps: u32,
    ) -> Result<(), RigError<G::Error>> {
        match self.step_limit {
            Some(limit) if steps >= limit => {
                warn!(axis = axis.as_str(), steps, "end-stop not reached, giving up");
                register.set_motor_enabled(false)?;
                self.phase = HomingPhase::Done;
                Err(RigError::EndstopNotReached { axis, steps })
            }
            _ => Ok(()),
        }
    }
}

/// End-stops read high until the switch is reached.
fn endstop_reached<G: Gpio, D: Delay>(
    register: &mut OutputRegister<G, D>,
    line: InputLine,
) -> Result<bool, RigError<G::Error>> {
    let level = register
        .driver_mut()
        .gpio_mut()
        .read_input(line)
        .map_err(RigError::Gpio)?;
    Ok(level == Level::Low)
}
