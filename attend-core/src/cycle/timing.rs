//! Where the scheduler reads "now" from.

use chrono::{DateTime, Utc};

use crate::dst::SimClock;

/// Time source for forgetting and reports.
///
/// Under [`Timing::Cycle`] one time unit is one executed cycle. The other two
/// modes count milliseconds.
#[derive(Debug, Clone, Default)]
pub enum Timing {
    /// Executed-cycle counter
    #[default]
    Cycle,
    /// Shared simulated clock, advanced by `step_ms` after each executed cycle
    Simulated {
        /// The clock (clones share time)
        clock: SimClock,
        /// Milliseconds added per executed cycle
        step_ms: u64,
    },
    /// Wall-clock milliseconds since `start`
    RealTime {
        /// Time zero
        start: DateTime<Utc>,
    },
}

impl Timing {
    /// Simulated timing on `clock`.
    #[must_use]
    pub fn simulated(clock: SimClock, step_ms: u64) -> Self {
        Timing::Simulated { clock, step_ms }
    }

    /// Real timing starting now.
    #[must_use]
    pub fn real_time() -> Self {
        Timing::RealTime { start: Utc::now() }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Timing::Cycle => "cycle",
            Timing::Simulated { .. } => "simulated",
            Timing::RealTime { .. } => "real_time",
        }
    }

    /// Current time given the number of executed cycles.
    #[must_use]
    pub fn now(&self, cycles: u64) -> u64 {
        match self {
            Timing::Cycle => cycles,
            Timing::Simulated { clock, .. } => clock.now_ms(),
            Timing::RealTime { start } => {
                let elapsed = Utc::now().signed_duration_since(*start).num_milliseconds();
                u64::try_from(elapsed).unwrap_or(0)
            }
        }
    }

    /// Called once after each executed cycle.
    pub(crate) fn tick(&self) {
        if let Timing::Simulated { clock, step_ms } = self {
            if *step_ms > 0 {
                clock.advance_ms(*step_ms);
            }
        }
    }
}
