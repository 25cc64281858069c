//! Status LED timing.
//!
//! The indicator is purely observational:
//!
//! ```text
//! target != position   ─▶ solid on (timer restarted every iteration)
//! motion stopped       ─▶ blink, (elapsed / half_period) even = on
//! elapsed >= on_duration ─▶ off until the next motion
//! ```

use crate::config::IndicatorConfig;
use crate::traits::Level;

/// Indicator state: whether it is active and when the last motion began.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::config::IndicatorConfig;
/// use rs_pantilt::indicator::Indicator;
/// use rs_pantilt::traits::Level;
///
/// let mut led = Indicator::new(IndicatorConfig::default());
/// assert_eq!(led.update(0, false), Level::Low);
///
/// // Motion pending: solid on
/// assert_eq!(led.update(1_000, true), Level::High);
///
/// // Stopped: blinking with a 600ms period
/// assert_eq!(led.update(1_100, false), Level::High);
/// assert_eq!(led.update(1_400, false), Level::Low);
///
/// // Off a full minute after the motion started
/// assert_eq!(led.update(61_000, false), Level::Low);
/// assert!(!led.is_active());
/// ```
#[derive(Clone, Debug)]
pub struct Indicator {
    config: IndicatorConfig,
    active: bool,
    started_ms: u64,
    level: Level,
}

impl Indicator {
    /// Create an inactive indicator.
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config,
            active: false,
            started_ms: 0,
            level: Level::Low,
        }
    }

    /// Advance the indicator and return the level to drive.
    ///
    /// `motion_pending` is true while either axis differs from its target.
    pub fn update(&mut self, now_ms: u64, motion_pending: bool) -> Level {
        if motion_pending {
            self.active = true;
            self.started_ms = now_ms;
            self.level = Level::High;
            return self.level;
        }
        if !self.active {
            self.level = Level::Low;
            return self.level;
        }

        let elapsed = now_ms.saturating_sub(self.started_ms);
        self.level = if elapsed >= self.config.on_duration_ms {
            self.active = false;
            Level::Low
        } else {
            let half = self.config.blink_half_period_ms.max(1);
            Level::from((elapsed / half) % 2 == 0)
        };
        self.level
    }

    /// Drive the LED low until the next [`update`](Self::update) without
    /// touching the on window.
    #[inline]
    pub fn force_low(&mut self) {
        self.level = Level::Low;
    }

    /// Whether the indicator is within its on window.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Level returned by the last [`update`](Self::update).
    #[inline]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Time the current on window started.
    #[inline]
    pub fn started_ms(&self) -> Option<u64> {
        self.active.then_some(self.started_ms)
    }
}
