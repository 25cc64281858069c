//! # rs-pantilt
//!
//! Controller for a two-axis pan/tilt stepper rig driven through a 74HC595
//! shift register, homed against end-stop switches, and positioned by
//! `<pan>/<tilt>` messages from an MQTT feed.
//!
//! ## Features
//!
//! - **Hardware abstraction**: GPIO, clock and delay traits; the core never sees pin numbers
//! - **Coupled kinematics**: pan drives both motors with the tilt motor counter-rotating
//! - **Homing**: end-stop calibration at boot, on `0/0`, and before any move after the motors were released
//! - **Engagement window**: drivers held for a minute after each move, then released
//! - **Virtual time**: the mock HAL simulates the rig so everything runs in tests
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! - `shift` - Serial-to-parallel output driver
//! - `output` - Mirror of the eight output lines, flushed on every change
//! - `motion` - Step pulse trains and the tilt/pan movers
//! - `homing` - End-stop calibration state machine
//! - `controller` - Context object owning position, target, outputs and timing
//! - `scheduler` - The main loop, with `services` feeding it commands
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rs_pantilt::{CommandOutcome, Config, RigController};
//! use rs_pantilt::axis::PanTilt;
//! use rs_pantilt::hal::{MockClock, MockGpio};
//!
//! // Simulated rig, somewhere off its end-stops
//! let clock = MockClock::new();
//! let gpio = MockGpio::new().with_physical_position(900, 300);
//! let mut rig = RigController::new(gpio, clock.clone(), clock.clone(), Config::default()).unwrap();
//!
//! // Boot-time homing
//! rig.home().unwrap();
//! assert_eq!(rig.gpio().physical_position(), PanTilt::ZERO);
//!
//! // Position command, then one loop iteration to execute it
//! rig.apply_message("7000/9999").unwrap();
//! assert_eq!(rig.target(), PanTilt::new(7000, 4200));
//! rig.tick().unwrap();
//! assert_eq!(rig.position(), rig.target());
//!
//! // A zero command re-homes immediately
//! assert_eq!(rig.apply_message("0/0").unwrap(), CommandOutcome::Rehomed);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Logical axes and step-count coordinates.
pub mod axis;
/// Position command parsing and clamping.
pub mod command;
/// Main controller that owns position, target, outputs and timing.
pub mod controller;
/// Motor engagement window.
pub mod engagement;
/// Error types.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// End-stop homing state machine.
pub mod homing;
/// Status LED timing.
pub mod indicator;
/// Step pulse trains and coupled-axis moves.
pub mod motion;
/// Output line mirror.
pub mod output;
/// Main control loop.
pub mod scheduler;
/// Shift register driver.
pub mod shift;
/// Core traits for hardware and network abstraction.
pub mod traits;

/// Shared configuration system for desktop and ESP32.
pub mod config;

/// Network services feeding the controller.
pub mod services;

// Re-exports for convenience
pub use axis::{Axis, AxisLimits, PanTilt};
pub use command::{Clamped, CommandOutcome, PositionCommand};
pub use controller::{RigController, RigState, TickReport};
pub use error::RigError;
pub use homing::{HomingPhase, HomingReport};
pub use motion::{MoveReport, SpeedTier};
pub use output::OutputBits;
pub use scheduler::{Iteration, Scheduler};
pub use traits::{
    // Hardware
    Clock,
    Delay,
    Gpio,
    InputLine,
    Level,
    // Network
    MqttClient,
    MqttMessage,
    OutputLine,
};

// Config re-exports
pub use config::{Config, DeviceConfig, IndicatorConfig, MotionConfig, MqttConfig, WifiConfig};
