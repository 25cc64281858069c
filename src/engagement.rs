//! Motor engagement window.
//!
//! The mechanism is not self-locking, so the drivers stay energized for a
//! hold period after each move. Once the deadline passes the drivers are
//! released, and because the platform may have slipped while released the
//! next move must re-home first.

/// Deadline until which the motor drivers stay energized.
///
/// Starts unset, which counts as expired: nothing has been moved yet, so
/// the first move after boot re-homes.
///
/// # Example
///
/// ```rust
/// use rs_pantilt::engagement::EngagementWindow;
///
/// let mut window = EngagementWindow::new(60_000);
/// assert!(window.expired(0));
///
/// window.extend(1_000);
/// assert_eq!(window.until_ms(), Some(61_000));
/// assert!(!window.expired(61_000));
/// assert!(window.expired(61_001));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngagementWindow {
    hold_ms: u64,
    until_ms: Option<u64>,
}

impl EngagementWindow {
    /// Create an expired window with the given hold duration.
    pub const fn new(hold_ms: u64) -> Self {
        Self {
            hold_ms,
            until_ms: None,
        }
    }

    /// Restart the hold period after a completed move.
    #[inline]
    pub fn extend(&mut self, now_ms: u64) {
        self.until_ms = Some(now_ms.saturating_add(self.hold_ms));
    }

    /// Whether `now_ms` is strictly past the deadline.
    #[inline]
    pub fn expired(&self, now_ms: u64) -> bool {
        self.until_ms.map_or(true, |until| now_ms > until)
    }

    /// Current deadline, `None` before the first move.
    #[inline]
    pub fn until_ms(&self) -> Option<u64> {
        self.until_ms
    }

    /// Configured hold duration.
    #[inline]
    pub fn hold_ms(&self) -> u64 {
        self.hold_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_is_expired() {
        let w = EngagementWindow::new(10);
        assert!(w.expired(0));
        assert!(w.expired(u64::MAX));
        assert_eq!(w.until_ms(), None);
    }

    #[test]
    fn extend_moves_deadline_forward() {
        let mut w = EngagementWindow::new(60_000);
        w.extend(5_000);
        w.extend(20_000);
        assert_eq!(w.until_ms(), Some(80_000));
        assert!(!w.expired(80_000));
        assert!(w.expired(80_001));
    }

    #[test]
    fn extend_saturates() {
        let mut w = EngagementWindow::new(60_000);
        w.extend(u64::MAX - 1);
        assert_eq!(w.until_ms(), Some(u64::MAX));
        assert!(!w.expired(u64::MAX));
    }
}
