//! Position commands received from the feed.
//!
//! The payload is `<pan>/<tilt>` in ASCII decimal. Parsing is lenient in
//! the way C's `atol` is: leading whitespace and a sign are accepted,
//! digits are read up to the first non-digit, and a field without digits
//! reads as zero. Values are then clamped to the axis range.
//!
//! | Payload | Result |
//! |---------|--------|
//! | `3850/2100` | pan 3850, tilt 2100 |
//! | `9000/-4` | pan clamped to 7700, tilt clamped to 0 |
//! | `100/` | pan 100, tilt 0 |
//! | `0/0` | rehome request |
//! | `1234` | ignored (no separator) |
//!
//! # Example
//!
//! ```rust
//! use rs_pantilt::axis::{AxisLimits, PanTilt};
//! use rs_pantilt::command::{Clamped, PositionCommand};
//! use rs_pantilt::config::MotionConfig;
//!
//! let limits = AxisLimits::from(&MotionConfig::default());
//!
//! let cmd = PositionCommand::parse("9000/2100", &limits).unwrap();
//! assert_eq!(cmd.target(), PanTilt::new(7700, 2100));
//! assert_eq!(cmd.pan, Clamped::Clamped { raw: 9000, value: 7700 });
//! assert_eq!(cmd.tilt, Clamped::Verbatim(2100));
//!
//! assert!(PositionCommand::parse("no separator", &limits).is_none());
//! ```

use crate::axis::{Axis, AxisLimits, PanTilt};

/// A value after range clamping, recording whether the clamp changed it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Clamped {
    /// The parsed value was already in range.
    Verbatim(i32),
    /// The parsed value was out of range and replaced.
    Clamped {
        /// Value as parsed.
        raw: i64,
        /// Value after clamping.
        value: i32,
    },
}

impl Clamped {
    /// Clamp `raw` into the range of `axis`.
    pub fn new(axis: Axis, raw: i64, limits: &AxisLimits) -> Self {
        let value = limits.clamp(axis, raw);
        if value as i64 == raw {
            Clamped::Verbatim(value)
        } else {
            Clamped::Clamped { raw, value }
        }
    }

    /// The in-range value.
    #[inline]
    pub fn value(&self) -> i32 {
        match *self {
            Clamped::Verbatim(v) => v,
            Clamped::Clamped { value, .. } => value,
        }
    }

    /// Whether clamping changed the value.
    #[inline]
    pub fn was_clamped(&self) -> bool {
        matches!(self, Clamped::Clamped { .. })
    }

    /// Re-check the value against `limits`, keeping the original raw value
    /// when it was clamped before.
    pub fn within(self, axis: Axis, limits: &AxisLimits) -> Self {
        match self {
            Clamped::Verbatim(v) => Clamped::new(axis, v as i64, limits),
            Clamped::Clamped { raw, value } => Clamped::Clamped {
                raw,
                value: limits.clamp(axis, value as i64),
            },
        }
    }
}

/// A parsed and clamped `<pan>/<tilt>` command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionCommand {
    /// Pan target.
    pub pan: Clamped,
    /// Tilt target.
    pub tilt: Clamped,
}

impl PositionCommand {
    /// Parse a payload. Returns `None` when there is no `/` separator.
    pub fn parse(payload: &str, limits: &AxisLimits) -> Option<Self> {
        let (pan, tilt) = payload.split_once('/')?;
        Some(Self {
            pan: Clamped::new(Axis::Pan, parse_int_lenient(pan), limits),
            tilt: Clamped::new(Axis::Tilt, parse_int_lenient(tilt), limits),
        })
    }

    /// The same command with both values forced into `limits`.
    ///
    /// Commands built by hand rather than through [`parse`](Self::parse)
    /// may hold out-of-range values.
    pub fn within(self, limits: &AxisLimits) -> Self {
        Self {
            pan: self.pan.within(Axis::Pan, limits),
            tilt: self.tilt.within(Axis::Tilt, limits),
        }
    }

    /// The clamped target pair.
    #[inline]
    pub fn target(&self) -> PanTilt {
        PanTilt::new(self.pan.value(), self.tilt.value())
    }

    /// `0/0` after clamping doubles as a rehome request.
    #[inline]
    pub fn is_unhome(&self) -> bool {
        self.target() == PanTilt::ZERO
    }
}

/// What the controller did with an inbound payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CommandOutcome {
    /// No separator; targets unchanged.
    Ignored,
    /// New targets stored; the scheduler moves toward them.
    TargetSet(PanTilt),
    /// Targets set to zero and homing ran immediately.
    Rehomed,
}

/// Read a leading integer the way `atol` does.
///
/// Overflow saturates instead of wrapping, so huge values still clamp to
/// the axis maximum.
pub fn parse_int_lenient(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let magnitude = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i64, |acc, b| {
            acc.saturating_mul(10).saturating_add((b - b'0') as i64)
        });

    if negative {
        -magnitude
    } else {
        magnitude
    }
}
