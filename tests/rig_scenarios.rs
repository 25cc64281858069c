//! End-to-end rig scenarios against the simulated board

use rs_pantilt::{
    hal::{MockClock, MockGpio},
    Axis, Clock, CommandOutcome, Config, IndicatorConfig, MotionConfig, OutputBits, PanTilt,
    RigController, RigError, SpeedTier,
};

type SimRig = RigController<MockGpio, MockClock, MockClock>;

fn booted(gpio: MockGpio, config: Config) -> (SimRig, MockClock) {
    let clock = MockClock::new();
    let mut rig = RigController::new(gpio, clock.clone(), clock.clone(), config).unwrap();
    rig.home().unwrap();
    (rig, clock)
}

fn booted_default() -> (SimRig, MockClock) {
    booted(MockGpio::new(), Config::default())
}

// ============================================================================
// Homing
// ============================================================================

#[test]
fn boot_homing_finds_both_endstops() {
    let (rig, _) = booted(
        MockGpio::new().with_physical_position(2500, 1300),
        Config::default(),
    );

    assert_eq!(rig.position(), PanTilt::ZERO);
    assert_eq!(rig.gpio().physical_position(), PanTilt::ZERO);
    assert!(!rig.motor_enabled());
    assert!(!rig.gpio().indicator_on());
    assert!(OutputBits::from_bits_retain(rig.gpio().latched()).contains(OutputBits::MOTOR_DISABLE));
}

#[test]
fn homing_pan_seek_does_not_disturb_tilt() {
    let clock = MockClock::new();
    let gpio = MockGpio::new().with_physical_position(600, 250);
    let mut rig = RigController::new(gpio, clock.clone(), clock, Config::default()).unwrap();

    let report = rig.home().unwrap();
    assert_eq!(report.pan_steps, 600);
    assert_eq!(report.tilt_steps, 250);
}

#[test]
fn jammed_endstop_gives_up_at_step_limit() {
    let config = Config::default()
        .with_motion(MotionConfig::default().with_homing_step_limit(Some(50)));
    let clock = MockClock::new();
    let gpio = MockGpio::new()
        .with_physical_position(100, 0)
        .with_jammed_endstop(Axis::Pan);
    let mut rig = RigController::new(gpio, clock.clone(), clock, config).unwrap();

    let err = rig.home().unwrap_err();
    assert_eq!(
        err,
        RigError::EndstopNotReached {
            axis: Axis::Pan,
            steps: 50
        }
    );
    assert!(err.is_homing_fault());
    assert!(!rig.motor_enabled());
    assert_eq!(rig.gpio().physical_position().pan, 50);
}

// ============================================================================
// Commands
// ============================================================================

#[test]
fn full_travel_command_is_accepted_verbatim() {
    let (mut rig, _) = booted_default();

    let outcome = rig.apply_message("7700/4200").unwrap();
    assert_eq!(outcome, CommandOutcome::TargetSet(PanTilt::new(7700, 4200)));

    rig.tick().unwrap();
    assert_eq!(rig.position(), PanTilt::new(7700, 4200));
    assert_eq!(rig.gpio().physical_position(), PanTilt::new(7700, 4200));
}

#[test]
fn out_of_range_command_is_clamped() {
    let (mut rig, _) = booted_default();

    rig.apply_message("9000/-5").unwrap();
    assert_eq!(rig.target(), PanTilt::new(7700, 0));

    rig.apply_message("99999999999999999999999/4201").unwrap();
    assert_eq!(rig.target(), PanTilt::new(7700, 4200));
}

#[test]
fn missing_tilt_reads_as_zero() {
    let (mut rig, _) = booted_default();

    let outcome = rig.apply_message("100/").unwrap();
    assert_eq!(outcome, CommandOutcome::TargetSet(PanTilt::new(100, 0)));
}

#[test]
fn payload_without_separator_is_ignored() {
    let (mut rig, _) = booted_default();
    rig.apply_message("300/300").unwrap();

    for payload in ["garbage", "12 34", "", "0"] {
        assert_eq!(rig.apply_message(payload).unwrap(), CommandOutcome::Ignored);
    }
    assert_eq!(rig.target(), PanTilt::new(300, 300));
}

#[test]
fn zero_command_rehomes_from_anywhere() {
    let (mut rig, _) = booted_default();
    rig.apply_message("3000/1000").unwrap();
    rig.tick().unwrap();
    assert_eq!(rig.gpio().physical_position(), PanTilt::new(3000, 1000));

    // Negative values clamp to zero too
    let outcome = rig.apply_message("-10/0").unwrap();
    assert_eq!(outcome, CommandOutcome::Rehomed);
    assert_eq!(rig.position(), PanTilt::ZERO);
    assert_eq!(rig.target(), PanTilt::ZERO);
    assert_eq!(rig.gpio().physical_position(), PanTilt::ZERO);
    assert!(!rig.motor_enabled());

    // Nothing left to do
    assert!(!rig.tick().unwrap().moved());
}

// ============================================================================
// Motion
// ============================================================================

#[test]
fn tilt_moves_before_pan() {
    let (mut rig, _) = booted_default();
    rig.apply_message("1000/500").unwrap();

    let report = rig.tick().unwrap();
    let tilt = report.tilt.unwrap();
    let pan = report.pan.unwrap();
    assert_eq!((tilt.axis, tilt.from, tilt.to, tilt.steps), (Axis::Tilt, 0, 500, 500));
    assert_eq!((pan.axis, pan.from, pan.to, pan.steps), (Axis::Pan, 0, 1000, 1000));
}

#[test]
fn pan_drives_both_motors() {
    let (mut rig, _) = booted_default();
    rig.apply_message("1000/500").unwrap();
    rig.tick().unwrap();

    // Tilt motor: 500 for the tilt move, 1000 counter-rotating for the pan
    assert_eq!(rig.gpio().motor_steps(), (1000, 1500));
    assert_eq!(rig.gpio().physical_position(), PanTilt::new(1000, 500));

    for word in rig.gpio().latch_history() {
        let bits = OutputBits::from_bits_retain(*word);
        if bits.contains(OutputBits::PAN_STEP) {
            assert!(bits.contains(OutputBits::TILT_STEP));
            assert!(bits.contains(OutputBits::PAN_DIR));
            assert!(!bits.contains(OutputBits::TILT_DIR));
        }
    }
}

#[test]
fn moving_back_reverses_direction_lines() {
    let (mut rig, _) = booted_default();
    rig.apply_message("2000/2000").unwrap();
    rig.tick().unwrap();

    rig.apply_message("1500/1200").unwrap();
    rig.tick().unwrap();
    assert_eq!(rig.gpio().physical_position(), PanTilt::new(1500, 1200));

    let bits = rig.output_state();
    assert!(!bits.contains(OutputBits::PAN_DIR));
    assert!(bits.contains(OutputBits::TILT_DIR));
    assert!(!bits.intersects(OutputBits::PAN_STEP | OutputBits::TILT_STEP));
}

#[test]
fn speed_tier_depends_on_move_length() {
    let (mut rig, _) = booted_default();
    rig.apply_message("401/400").unwrap();

    let report = rig.tick().unwrap();
    assert_eq!(report.tilt.unwrap().tier, SpeedTier::Slow);
    assert_eq!(report.pan.unwrap().tier, SpeedTier::Fast);
}

#[test]
fn short_move_takes_slow_step_time() {
    let config = Config::default().with_motion(MotionConfig::default().with_bus_settle_us(0));
    let (mut rig, clock) = booted(MockGpio::new(), config);
    // Energize once so the measured tick is pure motion
    rig.apply_message("0/1").unwrap();
    rig.tick().unwrap();

    rig.apply_message("0/11").unwrap();
    let before = clock.now_us();
    rig.tick().unwrap();
    // 10 pulses, 3000us high and 3000us low each
    assert_eq!(clock.now_us() - before, 60_000);
}

#[test]
fn idle_tick_waits_idle_interval() {
    let (mut rig, clock) = booted_default();

    let before = clock.now_us();
    let report = rig.tick().unwrap();
    assert!(!report.moved());
    assert_eq!(clock.now_us() - before, 10_000);
}

// ============================================================================
// Engagement
// ============================================================================

#[test]
fn first_move_after_boot_rehomes() {
    let (mut rig, _) = booted_default();
    assert_eq!(rig.engaged_until_ms(), None);

    rig.apply_message("200/100").unwrap();
    let report = rig.tick().unwrap();
    assert!(report.rehomed);
    assert!(rig.motor_enabled());
    assert!(rig.engaged_until_ms().is_some());
}

#[test]
fn moves_inside_window_skip_homing() {
    let (mut rig, clock) = booted_default();
    rig.apply_message("200/100").unwrap();
    rig.tick().unwrap();

    clock.advance(30_000);
    rig.apply_message("400/100").unwrap();
    let report = rig.tick().unwrap();
    assert!(!report.rehomed);
    assert!(report.pan.is_some());
    assert!(report.tilt.is_none());
}

#[test]
fn motors_release_after_window_then_rehome_on_next_move() {
    let (mut rig, clock) = booted_default();
    rig.apply_message("1000/500").unwrap();
    rig.tick().unwrap();
    let until = rig.engaged_until_ms().unwrap();

    // Exactly at the deadline the drivers stay on
    clock.set(until);
    let report = rig.tick().unwrap();
    assert!(!report.released);
    assert!(rig.motor_enabled());

    clock.set(until + 1);
    let report = rig.tick().unwrap();
    assert!(report.released);
    assert!(!rig.motor_enabled());

    // Only released once
    assert!(!rig.tick().unwrap().released);

    rig.apply_message("2000/500").unwrap();
    let report = rig.tick().unwrap();
    assert!(report.rehomed);
    assert_eq!(rig.position(), PanTilt::new(2000, 500));
    assert_eq!(rig.gpio().physical_position(), PanTilt::new(2000, 500));
}

#[test]
fn custom_hold_time() {
    let config = Config::default().with_motion(MotionConfig::default().with_engage_hold_ms(1_000));
    let (mut rig, clock) = booted(MockGpio::new(), config);
    rig.apply_message("50/50").unwrap();
    rig.tick().unwrap();

    clock.advance(1_001);
    assert!(rig.tick().unwrap().released);
}

// ============================================================================
// Indicator
// ============================================================================

#[test]
fn indicator_solid_blink_then_off() {
    let (mut rig, clock) = booted_default();
    rig.apply_message("10/10").unwrap();

    let start = clock.now_ms();
    rig.tick().unwrap();
    assert!(rig.state().indicator_on);
    assert!(rig.gpio().indicator_on());

    clock.set(start + 300);
    rig.tick().unwrap();
    assert!(!rig.gpio().indicator_on());

    clock.set(start + 600);
    rig.tick().unwrap();
    assert!(rig.gpio().indicator_on());

    clock.set(start + 60_000);
    rig.tick().unwrap();
    assert!(!rig.gpio().indicator_on());

    // Stays dark while idle
    clock.set(start + 60_600);
    rig.tick().unwrap();
    assert!(!rig.gpio().indicator_on());
}

#[test]
fn indicator_timing_is_configurable() {
    let config = Config::default().with_indicator(
        IndicatorConfig::default()
            .with_on_duration_ms(2_000)
            .with_blink_half_period_ms(500),
    );
    let (mut rig, clock) = booted(MockGpio::new(), config);
    rig.apply_message("1/1").unwrap();

    let start = clock.now_ms();
    rig.tick().unwrap();

    clock.set(start + 500);
    rig.tick().unwrap();
    assert!(!rig.gpio().indicator_on());

    clock.set(start + 1_000);
    rig.tick().unwrap();
    assert!(rig.gpio().indicator_on());

    clock.set(start + 2_000);
    rig.tick().unwrap();
    assert!(!rig.gpio().indicator_on());
}

// ============================================================================
// State
// ============================================================================

#[test]
fn state_snapshot_tracks_rig() {
    let (mut rig, _) = booted_default();
    rig.apply_message("700/300").unwrap();
    rig.tick().unwrap();

    let state = rig.state();
    assert_eq!(state.position, PanTilt::new(700, 300));
    assert_eq!(state.target, PanTilt::new(700, 300));
    assert!(state.motor_enabled);
    assert_eq!(state.engaged_until_ms, rig.engaged_until_ms());
    assert_eq!(state.output_word & OutputBits::MOTOR_DISABLE.bits(), 0);
}
