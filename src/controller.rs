//! Main rig controller that ties everything together.
//!
//! This module provides [`RigController`], the context object that owns the
//! believed position, the commanded target, the output word, the engagement
//! window and the indicator.
//!
//! # Overview
//!
//! Each [`tick`](RigController::tick):
//! 1. Updates the indicator (solid while any axis differs from its target)
//! 2. Moves tilt, then pan, toward their targets, re-homing first when the
//!    engagement window has expired
//! 3. Releases the drivers once the engagement window expires
//! 4. Idles briefly when nothing moved
//!
//! Moves and homing block until the motion is complete.
//!
//! # Example
//!
//! ```rust
//! use rs_pantilt::{CommandOutcome, Config, RigController};
//! use rs_pantilt::axis::PanTilt;
//! use rs_pantilt::hal::{MockClock, MockGpio};
//!
//! let clock = MockClock::new();
//! let mut rig = RigController::new(MockGpio::new(), clock.clone(), clock.clone(), Config::default()).unwrap();
//! rig.home().unwrap();
//!
//! let outcome = rig.apply_message("3850/2100").unwrap();
//! assert_eq!(outcome, CommandOutcome::TargetSet(PanTilt::new(3850, 2100)));
//!
//! let report = rig.tick().unwrap();
//! assert!(report.moved());
//! assert_eq!(rig.position(), PanTilt::new(3850, 2100));
//! assert!(rig.motor_enabled());
//! ```

use tracing::{debug, info};

use crate::axis::{AxisLimits, PanTilt};
use crate::command::{CommandOutcome, PositionCommand};
use crate::config::Config;
use crate::engagement::EngagementWindow;
use crate::error::RigError;
use crate::homing::{Homing, HomingReport};
use crate::indicator::Indicator;
use crate::motion::{move_pan, move_tilt, MoveReport};
use crate::output::{OutputBits, OutputRegister};
use crate::shift::ShiftRegister;
use crate::traits::{Clock, Delay, Gpio, Level, OutputLine};

/// Main rig controller.
///
/// # Type Parameters
///
/// - `G`: GPIO capability ([`Gpio`])
/// - `C`: time source ([`Clock`])
/// - `D`: blocking delay ([`Delay`]) used for pulse timing
///
/// The controller is single-threaded; moves run to completion before the
/// next command is looked at.
pub struct RigController<G: Gpio, C: Clock, D: Delay> {
    register: OutputRegister<G, D>,
    clock: C,
    config: Config,
    limits: AxisLimits,
    position: PanTilt,
    target: PanTilt,
    engagement: EngagementWindow,
    indicator: Indicator,
}

impl<G: Gpio, C: Clock, D: Delay> RigController<G, C, D> {
    /// Create a controller and re-initialise the outputs with the motor
    /// drivers released.
    pub fn new(gpio: G, clock: C, delay: D, config: Config) -> Result<Self, RigError<G::Error>> {
        let driver = ShiftRegister::new(gpio, delay, config.motion.bus_settle_us);
        let mut register = OutputRegister::new(driver);
        register.reset(OutputBits::MOTOR_DISABLE)?;

        Ok(Self {
            register,
            clock,
            limits: AxisLimits::from(&config.motion),
            engagement: EngagementWindow::new(config.motion.engage_hold_ms),
            indicator: Indicator::new(config.indicator.clone()),
            position: PanTilt::ZERO,
            target: PanTilt::ZERO,
            config,
        })
    }

    /// Drive both axes to their end-stops and zero the position.
    ///
    /// Leaves the drivers released and the indicator off. Blocks until both
    /// end-stops trigger, or until the configured step limit is exceeded.
    pub fn home(&mut self) -> Result<HomingReport, RigError<G::Error>> {
        let result = Homing::new(&self.config.motion).run(&mut self.register, &mut self.position);
        self.indicator.force_low();
        self.write_indicator(Level::Low)?;
        result
    }

    /// Parse and apply a `<pan>/<tilt>` payload.
    ///
    /// Payloads without a separator are ignored. A command that clamps to
    /// `0/0` re-homes immediately.
    pub fn apply_message(&mut self, payload: &str) -> Result<CommandOutcome, RigError<G::Error>> {
        match PositionCommand::parse(payload, &self.limits) {
            Some(cmd) => self.set_targets(cmd),
            None => {
                debug!(payload, "ignoring malformed position payload");
                Ok(CommandOutcome::Ignored)
            }
        }
    }

    /// Store new targets from an already parsed command, clamped again to
    /// the travel range.
    pub fn set_targets(
        &mut self,
        cmd: PositionCommand,
    ) -> Result<CommandOutcome, RigError<G::Error>> {
        let cmd = cmd.within(&self.limits);
        if cmd.pan.was_clamped() || cmd.tilt.was_clamped() {
            debug!(?cmd, "position command clamped to travel range");
        }
        self.target = cmd.target();

        if cmd.is_unhome() {
            info!("zero target received, rehoming");
            self.home()?;
            return Ok(CommandOutcome::Rehomed);
        }
        debug!(pan = self.target.pan, tilt = self.target.tilt, "new target");
        Ok(CommandOutcome::TargetSet(self.target))
    }

    /// Run one scheduler iteration (everything except the feed).
    pub fn tick(&mut self) -> Result<TickReport, RigError<G::Error>> {
        let mut report = TickReport::default();

        let level = self
            .indicator
            .update(self.clock.now_ms(), self.position != self.target);
        self.write_indicator(level)?;

        if self.target.tilt != self.position.tilt {
            report.rehomed |= self.prepare_move()?;
            let motion = &self.config.motion;
            report.tilt = Some(move_tilt(
                &mut self.register,
                &mut self.position.tilt,
                self.target.tilt,
                motion,
            )?);
            self.engagement.extend(self.clock.now_ms());
        }

        if self.target.pan != self.position.pan {
            report.rehomed |= self.prepare_move()?;
            let motion = &self.config.motion;
            report.pan = Some(move_pan(
                &mut self.register,
                &mut self.position.pan,
                self.target.pan,
                motion,
            )?);
            self.engagement.extend(self.clock.now_ms());
        }

        if self.engagement.expired(self.clock.now_ms()) && self.register.motor_enabled() {
            info!("engagement window expired, releasing motors");
            self.register.set_motor_enabled(false)?;
            report.released = true;
        }

        if !report.moved() {
            let idle = self.config.motion.idle_ms;
            self.register.driver_mut().delay_mut().delay_ms(idle);
        }
        Ok(report)
    }

    /// Re-home if the drivers may have been released, then energize them.
    fn prepare_move(&mut self) -> Result<bool, RigError<G::Error>> {
        let rehome = self.engagement.expired(self.clock.now_ms());
        if rehome {
            info!("motors were released, rehoming before move");
            self.home()?;
        }
        self.register.set_motor_enabled(true)?;
        Ok(rehome)
    }

    fn write_indicator(&mut self, level: Level) -> Result<(), RigError<G::Error>> {
        self.register
            .driver_mut()
            .gpio_mut()
            .set_output(OutputLine::Indicator, level)
            .map_err(RigError::Gpio)
    }

    /// Get the current state snapshot
    pub fn state(&self) -> RigState {
        RigState {
            position: self.position,
            target: self.target,
            motor_enabled: self.register.motor_enabled(),
            engaged_until_ms: self.engagement.until_ms(),
            indicator_on: self.indicator.level().is_high(),
            output_word: self.register.state().bits(),
        }
    }

    /// Believed position.
    pub fn position(&self) -> PanTilt {
        self.position
    }

    /// Commanded target.
    pub fn target(&self) -> PanTilt {
        self.target
    }

    /// Current output word.
    pub fn output_state(&self) -> OutputBits {
        self.register.state()
    }

    /// Whether the motor drivers are energized.
    pub fn motor_enabled(&self) -> bool {
        self.register.motor_enabled()
    }

    /// Engagement deadline, `None` before the first move.
    pub fn engaged_until_ms(&self) -> Option<u64> {
        self.engagement.until_ms()
    }

    /// Active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The GPIO capability.
    pub fn gpio(&self) -> &G {
        self.register.driver().gpio()
    }

    /// The time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The delay capability, for blocking waits outside the controller.
    pub fn delay_mut(&mut self) -> &mut D {
        self.register.driver_mut().delay_mut()
    }
}

/// What a single [`tick`](RigController::tick) did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Tilt move, if one ran.
    pub tilt: Option<MoveReport>,
    /// Pan move, if one ran.
    pub pan: Option<MoveReport>,
    /// Homing ran before a move.
    pub rehomed: bool,
    /// The drivers were released this tick.
    pub released: bool,
}

impl TickReport {
    /// Whether any axis moved.
    pub fn moved(&self) -> bool {
        self.tilt.is_some() || self.pan.is_some()
    }
}

/// Full state snapshot for logging or remote inspection.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::{Config, RigController};
/// use rs_pantilt::axis::PanTilt;
/// use rs_pantilt::hal::{MockClock, MockGpio};
///
/// let clock = MockClock::new();
/// let rig = RigController::new(MockGpio::new(), clock.clone(), clock, Config::default()).unwrap();
///
/// let state = rig.state();
/// assert_eq!(state.position, PanTilt::ZERO);
/// assert!(!state.motor_enabled);
/// assert_eq!(state.output_word, 0b0000_0001);
/// assert_eq!(state.engaged_until_ms, None);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RigState {
    /// Believed position.
    pub position: PanTilt,
    /// Commanded target.
    pub target: PanTilt,
    /// Whether the drivers are energized.
    pub motor_enabled: bool,
    /// Engagement deadline.
    pub engaged_until_ms: Option<u64>,
    /// Indicator level computed by the last tick.
    pub indicator_on: bool,
    /// Raw output word.
    pub output_word: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Clamped;
    use crate::config::MotionConfig;
    use crate::hal::{MockClock, MockGpio};
    use crate::motion::SpeedTier;

    type MockRig = RigController<MockGpio, MockClock, MockClock>;

    fn rig_with(gpio: MockGpio, config: Config) -> (MockRig, MockClock) {
        let clock = MockClock::new();
        let rig = RigController::new(gpio, clock.clone(), clock.clone(), config).unwrap();
        (rig, clock)
    }

    fn rig() -> (MockRig, MockClock) {
        rig_with(MockGpio::new(), Config::default())
    }

    #[test]
    fn new_releases_motors() {
        let (rig, _) = rig();
        assert!(!rig.motor_enabled());
        assert_eq!(rig.gpio().latch_history(), &[0x01]);
        assert_eq!(rig.position(), PanTilt::ZERO);
        assert_eq!(rig.target(), PanTilt::ZERO);
    }

    #[test]
    fn malformed_payload_ignored() {
        let (mut rig, _) = rig();
        rig.apply_message("100/200").unwrap();
        assert_eq!(rig.apply_message("garbage").unwrap(), CommandOutcome::Ignored);
        assert_eq!(rig.target(), PanTilt::new(100, 200));
    }

    #[test]
    fn zero_command_rehomes_from_anywhere() {
        let (mut rig, _) = rig_with(
            MockGpio::new().with_physical_position(500, 300),
            Config::default(),
        );
        assert_eq!(rig.apply_message("0/0").unwrap(), CommandOutcome::Rehomed);
        assert_eq!(rig.gpio().physical_position(), PanTilt::ZERO);
        assert!(!rig.motor_enabled());
        assert!(!rig.gpio().indicator_on());
    }

    #[test]
    fn hand_built_command_is_clamped() {
        let (mut rig, _) = rig();
        let cmd = PositionCommand {
            pan: Clamped::Verbatim(20_000),
            tilt: Clamped::Verbatim(-50),
        };
        let outcome = rig.set_targets(cmd).unwrap();
        assert_eq!(outcome, CommandOutcome::TargetSet(PanTilt::new(7700, 0)));

        rig.tick().unwrap();
        assert_eq!(rig.position(), PanTilt::new(7700, 0));
        assert_eq!(rig.gpio().physical_position(), PanTilt::new(7700, 0));
    }

    #[test]
    fn hand_built_zero_after_clamp_rehomes() {
        let (mut rig, _) = rig();
        let cmd = PositionCommand {
            pan: Clamped::Verbatim(-1),
            tilt: Clamped::Verbatim(-1),
        };
        assert_eq!(rig.set_targets(cmd).unwrap(), CommandOutcome::Rehomed);
    }

    #[test]
    fn home_turns_indicator_state_off() {
        let (mut rig, _) = rig();
        rig.apply_message("10/10").unwrap();
        rig.tick().unwrap();
        assert!(rig.state().indicator_on);

        rig.home().unwrap();
        assert!(!rig.gpio().indicator_on());
        assert!(!rig.state().indicator_on);
    }

    #[test]
    fn idle_tick_sleeps() {
        let (mut rig, clock) = rig();
        let report = rig.tick().unwrap();
        assert!(!report.moved());
        assert_eq!(clock.now_ms(), 10);
    }

    #[test]
    fn first_move_rehomes() {
        let (mut rig, _) = rig_with(
            MockGpio::new().with_physical_position(40, 40),
            Config::default(),
        );
        rig.apply_message("100/50").unwrap();
        let report = rig.tick().unwrap();
        assert!(report.rehomed);
        assert_eq!(rig.position(), PanTilt::new(100, 50));
        assert_eq!(rig.gpio().physical_position(), PanTilt::new(100, 50));
    }

    #[test]
    fn tilt_moves_before_pan() {
        let (mut rig, _) = rig();
        rig.apply_message("20/30").unwrap();
        let report = rig.tick().unwrap();
        assert_eq!(report.tilt.unwrap().to, 30);
        assert_eq!(report.pan.unwrap().to, 20);
        // only the first move needed homing
        assert!(report.rehomed);

        // tilt pulses (TILT_STEP alone) precede the coupled pan pulses
        let history = rig.gpio().latch_history();
        let step = OutputBits::PAN_STEP.bits();
        let first_pan = history.iter().position(|w| w & step != 0).unwrap();
        let last_tilt_only = history
            .iter()
            .rposition(|w| w & OutputBits::TILT_STEP.bits() != 0 && w & step == 0)
            .unwrap();
        assert!(last_tilt_only < first_pan);
    }

    #[test]
    fn engagement_extended_after_move() {
        let (mut rig, clock) = rig();
        rig.apply_message("0/10").unwrap();
        rig.tick().unwrap();
        let deadline = rig.engaged_until_ms().unwrap();
        assert_eq!(deadline, clock.now_ms() + 60_000);
        assert!(rig.motor_enabled());
    }

    #[test]
    fn release_after_window() {
        let (mut rig, clock) = rig();
        rig.apply_message("0/10").unwrap();
        rig.tick().unwrap();

        clock.advance(60_000);
        assert!(!rig.tick().unwrap().released);
        assert!(rig.motor_enabled());

        clock.advance(1);
        let report = rig.tick().unwrap();
        assert!(report.released);
        assert!(!rig.motor_enabled());
        assert!(rig.output_state().contains(OutputBits::MOTOR_DISABLE));

        // only released once
        assert!(!rig.tick().unwrap().released);
    }

    #[test]
    fn move_after_release_rehomes() {
        let (mut rig, clock) = rig();
        rig.apply_message("0/10").unwrap();
        rig.tick().unwrap();
        clock.advance(70_000);
        rig.tick().unwrap();

        rig.apply_message("0/20").unwrap();
        let report = rig.tick().unwrap();
        assert!(report.rehomed);
        // homed to 0 then moved the full 20
        assert_eq!(report.tilt.unwrap().from, 0);
        assert_eq!(report.tilt.unwrap().steps, 20);
    }

    #[test]
    fn move_within_window_does_not_rehome() {
        let (mut rig, clock) = rig();
        rig.apply_message("0/10").unwrap();
        rig.tick().unwrap();
        clock.advance(30_000);

        rig.apply_message("0/25").unwrap();
        let report = rig.tick().unwrap();
        assert!(!report.rehomed);
        assert_eq!(report.tilt.unwrap().steps, 15);
    }

    #[test]
    fn long_move_is_fast() {
        let (mut rig, _) = rig();
        rig.apply_message("1000/0").unwrap();
        let report = rig.tick().unwrap();
        assert_eq!(report.pan.unwrap().tier, SpeedTier::Fast);
        assert!(report.tilt.is_none());
    }

    #[test]
    fn indicator_solid_during_move_then_blinks() {
        let (mut rig, _) = rig();
        rig.apply_message("0/10").unwrap();
        rig.tick().unwrap();
        assert!(rig.gpio().indicator_on());
        assert!(rig.state().indicator_on);

        // idle ticks are 10ms apart, so 60 of them span a full blink period
        let mut seen = (false, false);
        for _ in 0..60 {
            rig.tick().unwrap();
            if rig.gpio().indicator_on() {
                seen.0 = true;
            } else {
                seen.1 = true;
            }
        }
        assert_eq!(seen, (true, true));
    }

    #[test]
    fn jammed_endstop_surfaces_error() {
        let config = Config::default()
            .with_motion(MotionConfig::default().with_homing_step_limit(Some(100)));
        let (mut rig, _) = rig_with(
            MockGpio::new()
                .with_physical_position(500, 0)
                .with_jammed_endstop(crate::axis::Axis::Pan),
            config,
        );
        let err = rig.home().unwrap_err();
        assert!(err.is_homing_fault());
        assert!(!rig.motor_enabled());
        assert!(!rig.gpio().indicator_on());
    }
}
