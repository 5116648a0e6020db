//! Budget - The Decaying Weight Carried By Every Item
//!
//! TigerStyle: Pure data plus arithmetic, no dependencies on the stores.
//!
//! # Components
//!
//! - **priority**: short-term activation, drives selection likelihood
//! - **durability**: resistance to decay across forgetting events
//! - **quality**: long-term reference value, the asymptote decay approaches
//!
//! Finite components are clamped to [0, 1]. Non-finite components are kept
//! as-is so the boundary check in [`Budget::validate`] can reject them.

mod forget;
mod merge;

use std::fmt;

pub use forget::{forget, forget_periodic};
pub use merge::{AverageMerge, MaxMerge, MergeKind, MergePolicy, PlusMerge};

use crate::constants::{BUDGET_PRIORITY_EPSILON, BUDGET_VALUE_MAX, BUDGET_VALUE_MIN};

// =============================================================================
// Error Types
// =============================================================================

/// Errors from the admission check on a budget.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BudgetError {
    /// Priority or durability is NaN or infinite
    #[error("budget {component} is not finite: {value}")]
    NonFinite {
        /// Name of the offending component
        component: &'static str,
        /// The offending value
        value: f64,
    },

    /// Priority is too small to be worth storing
    #[error("budget priority {priority} is at or below threshold {threshold}")]
    BelowThreshold {
        /// The rejected priority
        priority: f64,
        /// The admission threshold
        threshold: f64,
    },
}

/// Result type for budget checks.
pub type BudgetResult<T> = Result<T, BudgetError>;

// =============================================================================
// Budget
// =============================================================================

/// Priority / durability / quality triple attached to every storable item.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Budget {
    priority: f64,
    durability: f64,
    quality: f64,
    /// Time of the last applied forgetting step
    last_forget_time: Option<u64>,
}

fn clamp_unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(BUDGET_VALUE_MIN, BUDGET_VALUE_MAX)
    } else {
        value
    }
}

impl Budget {
    /// Create a budget, clamping finite components into [0, 1].
    ///
    /// # Example
    /// ```
    /// use attend_core::budget::Budget;
    /// let b = Budget::new(1.5, 0.8, 0.2);
    /// assert_eq!(b.priority(), 1.0);
    /// ```
    #[must_use]
    pub fn new(priority: f64, durability: f64, quality: f64) -> Self {
        Self {
            priority: clamp_unit(priority),
            durability: clamp_unit(durability),
            quality: clamp_unit(quality),
            last_forget_time: None,
        }
    }

    /// A budget with no quality reference (decay approaches zero).
    #[must_use]
    pub fn without_quality(priority: f64, durability: f64) -> Self {
        Self::new(priority, durability, f64::NAN)
    }

    /// A budget whose values have not been decided yet.
    ///
    /// Fails [`validate`](Self::validate) until priority and durability are set.
    #[must_use]
    pub fn undecided() -> Self {
        Self::new(f64::NAN, f64::NAN, f64::NAN)
    }

    /// Current activation weight.
    #[must_use]
    pub fn priority(&self) -> f64 {
        self.priority
    }

    /// Resistance to decay.
    #[must_use]
    pub fn durability(&self) -> f64 {
        self.durability
    }

    /// Long-term reference value (NaN when unused).
    #[must_use]
    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// The value decay approaches: quality, or zero when quality is unused.
    #[must_use]
    pub fn quality_floor(&self) -> f64 {
        if self.quality.is_finite() {
            self.quality
        } else {
            BUDGET_VALUE_MIN
        }
    }

    /// Time of the last forgetting step that changed this budget.
    #[must_use]
    pub fn last_forget_time(&self) -> Option<u64> {
        self.last_forget_time
    }

    /// Set priority (clamped).
    pub fn set_priority(&mut self, priority: f64) {
        self.priority = clamp_unit(priority);
    }

    /// Set durability (clamped).
    pub fn set_durability(&mut self, durability: f64) {
        self.durability = clamp_unit(durability);
    }

    /// Set quality (clamped; NaN marks it unused).
    pub fn set_quality(&mut self, quality: f64) {
        self.quality = clamp_unit(quality);
    }

    /// Copy of this budget with a different priority.
    #[must_use]
    pub fn with_priority(mut self, priority: f64) -> Self {
        self.set_priority(priority);
        self
    }

    /// Copy of this budget stamped with a forgetting time.
    #[must_use]
    pub fn with_last_forget_time(mut self, time: u64) -> Self {
        self.last_forget_time = Some(time);
        self
    }

    /// Boundary check: priority and durability must be finite, quality must not be infinite.
    ///
    /// # Errors
    /// Returns `BudgetError::NonFinite` naming the first malformed component.
    pub fn validate(&self) -> BudgetResult<()> {
        if !self.priority.is_finite() {
            return Err(BudgetError::NonFinite {
                component: "priority",
                value: self.priority,
            });
        }
        if !self.durability.is_finite() {
            return Err(BudgetError::NonFinite {
                component: "durability",
                value: self.durability,
            });
        }
        if self.quality.is_infinite() {
            return Err(BudgetError::NonFinite {
                component: "quality",
                value: self.quality,
            });
        }
        Ok(())
    }

    /// Whether priority exceeds the admission epsilon.
    #[must_use]
    pub fn above_threshold(&self) -> bool {
        self.priority.is_finite() && self.priority > BUDGET_PRIORITY_EPSILON
    }

    /// Full admission check: well-formed and above threshold.
    ///
    /// # Errors
    /// Returns `NonFinite` for malformed budgets, `BelowThreshold` for near-zero priority.
    pub fn check_admission(&self) -> BudgetResult<()> {
        self.validate()?;
        if !self.above_threshold() {
            return Err(BudgetError::BelowThreshold {
                priority: self.priority,
                threshold: BUDGET_PRIORITY_EPSILON,
            });
        }
        Ok(())
    }

    /// Geometric mean of the components (quality skipped when unused).
    #[must_use]
    pub fn summary(&self) -> f64 {
        if self.quality.is_finite() {
            (self.priority * self.durability * self.quality).cbrt()
        } else {
            (self.priority * self.durability).sqrt()
        }
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(0.5, 0.5, 0.5)
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "${:.2};{:.2};{:.2}$",
            self.priority, self.durability, self.quality
        )
    }
}
