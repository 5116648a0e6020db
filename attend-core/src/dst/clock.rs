//! SimClock - Simulated Time
//!
//! TigerStyle: Deterministic, controllable time for simulation. Clones share
//! the same underlying time, so a test can hold one handle and advance the
//! clock a scheduler reads from.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::constants::{DST_TIME_ADVANCE_MS_MAX, TIME_MS_PER_SEC};

/// A simulated clock for deterministic testing.
///
/// TigerStyle:
/// - Time only moves forward
/// - All time operations are explicit
/// - No reliance on system time
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    /// Current time in milliseconds (shared between clones)
    current_ms: Arc<AtomicU64>,
}

impl SimClock {
    /// Create a new clock starting at time zero.
    ///
    /// # Example
    /// ```
    /// use attend_core::dst::SimClock;
    /// let clock = SimClock::new();
    /// assert_eq!(clock.now_ms(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::at_ms(0)
    }

    /// Create a clock starting at the given millisecond timestamp.
    #[must_use]
    pub fn at_ms(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(AtomicU64::new(start_ms)),
        }
    }

    /// Get current time in milliseconds.
    #[must_use]
    pub fn now_ms(&self) -> u64 {
        self.current_ms.load(Ordering::SeqCst)
    }

    /// Get current time in seconds (truncated).
    #[must_use]
    pub fn now_secs(&self) -> u64 {
        self.now_ms() / TIME_MS_PER_SEC
    }

    /// Advance time by the given milliseconds.
    ///
    /// # Panics
    /// Panics if ms exceeds `DST_TIME_ADVANCE_MS_MAX`.
    ///
    /// # Returns
    /// The new current time.
    pub fn advance_ms(&self, ms: u64) -> u64 {
        // Precondition
        assert!(
            ms <= DST_TIME_ADVANCE_MS_MAX,
            "advance_ms({}) exceeds max ({})",
            ms,
            DST_TIME_ADVANCE_MS_MAX
        );

        let old_time = self.current_ms.fetch_add(ms, Ordering::SeqCst);
        let new_time = old_time.saturating_add(ms);

        // Postcondition
        assert!(new_time >= old_time, "time must not go backwards");
        new_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_and_read() {
        let clock = SimClock::new();
        assert_eq!(clock.advance_ms(1500), 1500);
        assert_eq!(clock.now_ms(), 1500);
        assert_eq!(clock.now_secs(), 1);
    }

    #[test]
    fn test_clones_share_time() {
        let clock = SimClock::at_ms(10);
        let observer = clock.clone();

        clock.advance_ms(5);
        assert_eq!(observer.now_ms(), 15);
    }

    #[test]
    #[should_panic(expected = "exceeds max")]
    fn test_advance_too_far_panics() {
        let clock = SimClock::new();
        clock.advance_ms(DST_TIME_ADVANCE_MS_MAX + 1);
    }
}
