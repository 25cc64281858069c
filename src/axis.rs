//! Logical axes and step-count coordinates.

use crate::config::MotionConfig;

/// One of the two logical axes of the rig.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Axis {
    /// Horizontal rotation (X). Driven by both motors together.
    Pan,
    /// Vertical rotation (Y). Driven by the tilt motor alone.
    Tilt,
}

impl Axis {
    /// Returns the axis name as a lowercase string.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Axis::Pan => "pan",
            Axis::Tilt => "tilt",
        }
    }
}

/// A pan/tilt pair of step counts, measured from the end-stops.
///
/// Used both for the believed position and for the commanded target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PanTilt {
    /// Pan step count.
    pub pan: i32,
    /// Tilt step count.
    pub tilt: i32,
}

impl PanTilt {
    /// The homed position.
    pub const ZERO: Self = Self { pan: 0, tilt: 0 };

    /// Create a new coordinate pair.
    #[inline]
    pub const fn new(pan: i32, tilt: i32) -> Self {
        Self { pan, tilt }
    }

    /// Returns the value for one axis.
    #[inline]
    pub const fn get(&self, axis: Axis) -> i32 {
        match axis {
            Axis::Pan => self.pan,
            Axis::Tilt => self.tilt,
        }
    }

    /// Returns a mutable reference to one axis.
    #[inline]
    pub fn get_mut(&mut self, axis: Axis) -> &mut i32 {
        match axis {
            Axis::Pan => &mut self.pan,
            Axis::Tilt => &mut self.tilt,
        }
    }
}

/// Inclusive travel range of both axes, `[0, max]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AxisLimits {
    /// Maximum pan step count.
    pub pan_max: i32,
    /// Maximum tilt step count.
    pub tilt_max: i32,
}

impl AxisLimits {
    /// Upper bound for one axis. A negative maximum reads as zero.
    #[inline]
    pub const fn max(&self, axis: Axis) -> i32 {
        let max = match axis {
            Axis::Pan => self.pan_max,
            Axis::Tilt => self.tilt_max,
        };
        if max < 0 {
            0
        } else {
            max
        }
    }

    /// Clamp a raw value into the range of `axis`.
    #[inline]
    pub fn clamp(&self, axis: Axis, value: i64) -> i32 {
        // bounded by i32 limits, so the cast cannot truncate
        value.clamp(0, self.max(axis) as i64) as i32
    }

    /// Returns `true` when `value` lies within the range of `axis`.
    #[inline]
    pub fn contains(&self, axis: Axis, value: i32) -> bool {
        (0..=self.max(axis)).contains(&value)
    }
}

impl From<&MotionConfig> for AxisLimits {
    fn from(config: &MotionConfig) -> Self {
        Self {
            pan_max: config.pan_max_steps,
            tilt_max: config.tilt_max_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_tilt_accessors() {
        let mut p = PanTilt::new(10, 20);
        assert_eq!(p.get(Axis::Pan), 10);
        assert_eq!(p.get(Axis::Tilt), 20);

        *p.get_mut(Axis::Tilt) = 5;
        assert_eq!(p, PanTilt::new(10, 5));
        assert_eq!(PanTilt::default(), PanTilt::ZERO);
    }

    #[test]
    fn negative_limit_collapses_range_to_zero() {
        let limits = AxisLimits {
            pan_max: -1,
            tilt_max: 4200,
        };
        assert_eq!(limits.max(Axis::Pan), 0);
        assert_eq!(limits.clamp(Axis::Pan, 5), 0);
        assert_eq!(limits.clamp(Axis::Pan, -5), 0);
        assert!(limits.contains(Axis::Pan, 0));
        assert!(!limits.contains(Axis::Pan, 1));

        let mut motion = MotionConfig::default();
        motion.tilt_max_steps = -20;
        let limits = AxisLimits::from(&motion);
        assert_eq!(limits.clamp(Axis::Tilt, 100), 0);
    }

    #[test]
    fn limits_clamp() {
        let limits = AxisLimits::from(&MotionConfig::default());
        assert_eq!(limits.clamp(Axis::Pan, -1), 0);
        assert_eq!(limits.clamp(Axis::Pan, 9000), 7700);
        assert_eq!(limits.clamp(Axis::Tilt, 9000), 4200);
        assert_eq!(limits.clamp(Axis::Tilt, 1234), 1234);
        assert_eq!(limits.clamp(Axis::Pan, i64::MAX), 7700);
    }

    #[test]
    fn limits_contains() {
        let limits = AxisLimits {
            pan_max: 100,
            tilt_max: 50,
        };
        assert!(limits.contains(Axis::Pan, 0));
        assert!(limits.contains(Axis::Pan, 100));
        assert!(!limits.contains(Axis::Pan, 101));
        assert!(!limits.contains(Axis::Tilt, -1));
        assert!(!limits.contains(Axis::Tilt, 51));
    }

    #[test]
    fn axis_names() {
        assert_eq!(Axis::Pan.as_str(), "pan");
        assert_eq!(Axis::Tilt.as_str(), "tilt");
    }
}
