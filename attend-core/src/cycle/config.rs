//! Scheduler configuration.

use serde::{Deserialize, Serialize};

use crate::constants::{
    CYCLE_DURATION_CYCLES_DEFAULT, CYCLE_INPUTS_COUNT_DEFAULT, CYCLE_INPUTS_COUNT_MAX,
    CYCLE_POPS_COUNT_DEFAULT, CYCLE_POPS_COUNT_MAX, FORGET_DURATIONS_COUNT_DEFAULT,
    FORGET_RELATIVE_THRESHOLD_RATIO_DEFAULT,
};

// =============================================================================
// Error Types
// =============================================================================

/// Errors from scheduler configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CycleConfigError {
    /// Pops per cycle outside (0, max]
    #[error("pops per cycle must be in [1, {max}], got {value}")]
    InvalidPops {
        /// Requested value
        value: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Inputs per cycle above the limit
    #[error("inputs per cycle {value} exceeds max {max}")]
    TooManyInputs {
        /// Requested value
        value: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Duration must be positive
    #[error("duration must be > 0")]
    ZeroDuration,

    /// Forget durations must be positive and finite
    #[error("forget durations must be finite and > 0, got {value}")]
    InvalidForgetDurations {
        /// Requested value
        value: f64,
    },

    /// Relative threshold outside [0, 1)
    #[error("relative threshold must be in [0, 1), got {value}")]
    InvalidRelativeThreshold {
        /// Requested value
        value: f64,
    },
}

/// Result type for scheduler construction.
pub type CycleResult<T> = Result<T, CycleConfigError>;

// =============================================================================
// ForgetMode
// =============================================================================

/// How much decay a processed item receives before re-insertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForgetMode {
    /// A fixed `1 / forget_durations` duration units per processing.
    #[default]
    Iterative,
    /// Elapsed time since the item was last forgotten, over a period of
    /// `duration * forget_durations` time units.
    Periodic,
}

// =============================================================================
// SchedulerConfig
// =============================================================================

/// Configuration for a [`Scheduler`](super::Scheduler).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Items popped and processed per cycle
    pub pops_per_cycle: usize,
    /// Buffered inputs admitted at the start of each cycle
    pub inputs_per_cycle: usize,
    /// Time units in one duration
    pub duration: u64,
    /// Durations over which one decay step is spread
    pub forget_durations: f64,
    /// Iterative or periodic decay
    pub forget_mode: ForgetMode,
    /// Minimum fractional priority change for a decay step to apply
    pub relative_threshold: f64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            pops_per_cycle: CYCLE_POPS_COUNT_DEFAULT,
            inputs_per_cycle: CYCLE_INPUTS_COUNT_DEFAULT,
            duration: CYCLE_DURATION_CYCLES_DEFAULT,
            forget_durations: FORGET_DURATIONS_COUNT_DEFAULT,
            forget_mode: ForgetMode::default(),
            relative_threshold: FORGET_RELATIVE_THRESHOLD_RATIO_DEFAULT,
        }
    }
}

impl SchedulerConfig {
    /// Set items popped per cycle.
    #[must_use]
    pub fn with_pops_per_cycle(mut self, pops: usize) -> Self {
        self.pops_per_cycle = pops;
        self
    }

    /// Set inputs admitted per cycle.
    #[must_use]
    pub fn with_inputs_per_cycle(mut self, inputs: usize) -> Self {
        self.inputs_per_cycle = inputs;
        self
    }

    /// Set time units per duration.
    #[must_use]
    pub fn with_duration(mut self, duration: u64) -> Self {
        self.duration = duration;
        self
    }

    /// Set durations per decay step.
    #[must_use]
    pub fn with_forget_durations(mut self, durations: f64) -> Self {
        self.forget_durations = durations;
        self
    }

    /// Set the forget mode.
    #[must_use]
    pub fn with_forget_mode(mut self, mode: ForgetMode) -> Self {
        self.forget_mode = mode;
        self
    }

    /// Set the relative no-op threshold.
    #[must_use]
    pub fn with_relative_threshold(mut self, threshold: f64) -> Self {
        self.relative_threshold = threshold;
        self
    }

    /// Duration units of decay applied per processing in iterative mode.
    #[must_use]
    pub fn iterative_step(&self) -> f64 {
        1.0 / self.forget_durations
    }

    /// Time units per duration unit of decay in periodic mode.
    #[must_use]
    pub fn forget_period(&self) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let duration = self.duration as f64;
        duration * self.forget_durations
    }

    /// Check every option against its limits.
    ///
    /// # Errors
    /// Returns the first invalid option found.
    pub fn validate(&self) -> CycleResult<()> {
        if self.pops_per_cycle == 0 || self.pops_per_cycle > CYCLE_POPS_COUNT_MAX {
            return Err(CycleConfigError::InvalidPops {
                value: self.pops_per_cycle,
                max: CYCLE_POPS_COUNT_MAX,
            });
        }
        if self.inputs_per_cycle > CYCLE_INPUTS_COUNT_MAX {
            return Err(CycleConfigError::TooManyInputs {
                value: self.inputs_per_cycle,
                max: CYCLE_INPUTS_COUNT_MAX,
            });
        }
        if self.duration == 0 {
            return Err(CycleConfigError::ZeroDuration);
        }
        if !self.forget_durations.is_finite() || self.forget_durations <= 0.0 {
            return Err(CycleConfigError::InvalidForgetDurations {
                value: self.forget_durations,
            });
        }
        if !(0.0..1.0).contains(&self.relative_threshold) {
            return Err(CycleConfigError::InvalidRelativeThreshold {
                value: self.relative_threshold,
            });
        }
        Ok(())
    }
}
