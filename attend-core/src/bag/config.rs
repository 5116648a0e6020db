//! Bag configuration.
//!
//! `TigerStyle`: Sensible defaults, builder methods, validated before any item is stored.

use serde::{Deserialize, Serialize};

use crate::budget::MergeKind;
use crate::constants::{
    BAG_CAPACITY_COUNT_DEFAULT, BAG_CAPACITY_COUNT_MAX, BAG_CURVE_EXPONENT_DEFAULT,
    BAG_CURVE_EXPONENT_MAX, BAG_CURVE_EXPONENT_MIN, BAG_LEVELS_COUNT_DEFAULT,
    BAG_LEVELS_COUNT_MAX, BAG_SEED_DEFAULT,
};

// =============================================================================
// Error Types
// =============================================================================

/// Errors from bag configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BagConfigError {
    /// Capacity must be positive
    #[error("bag capacity must be > 0")]
    ZeroCapacity,

    /// Capacity above the hard limit
    #[error("bag capacity {capacity} exceeds max {max}")]
    CapacityTooLarge {
        /// Requested capacity
        capacity: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Curve exponent is not finite or outside the allowed range
    #[error("curve exponent {exponent} must be finite and in [{min}, {max}]")]
    InvalidCurveExponent {
        /// Requested exponent
        exponent: f64,
        /// Minimum allowed
        min: f64,
        /// Maximum allowed
        max: f64,
    },

    /// Level count must be positive
    #[error("level count must be > 0")]
    ZeroLevels,

    /// Level count above the hard limit
    #[error("level count {levels} exceeds max {max}")]
    TooManyLevels {
        /// Requested levels
        levels: usize,
        /// Maximum allowed
        max: usize,
    },

    /// A shaping curve was supplied to a strategy that does not sample by curve
    #[error("{strategy} strategy has no shaping curve")]
    CurveUnsupported {
        /// Name of the bag's strategy
        strategy: &'static str,
    },
}

/// Result type for bag construction.
pub type BagResult<T> = Result<T, BagConfigError>;

// =============================================================================
// Strategy
// =============================================================================

/// Which ordering structure and sampling policy a bag uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Strategy {
    /// One array sorted by priority, sampled through `1 - (1 - x)^exponent`.
    Curve {
        /// Shaping-curve exponent; larger values favour the top more strongly
        exponent: f64,
    },
    /// Priority quantised into `levels` buckets, sampled by level weight.
    Level {
        /// Number of buckets
        levels: usize,
    },
}

impl Strategy {
    /// Curve strategy with the default exponent.
    #[must_use]
    pub fn curve() -> Self {
        Strategy::Curve {
            exponent: BAG_CURVE_EXPONENT_DEFAULT,
        }
    }

    /// Level strategy with the default level count.
    #[must_use]
    pub fn level() -> Self {
        Strategy::Level {
            levels: BAG_LEVELS_COUNT_DEFAULT,
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Curve { .. } => "curve",
            Strategy::Level { .. } => "level",
        }
    }
}

impl Default for Strategy {
    fn default() -> Self {
        Self::curve()
    }
}

// =============================================================================
// BagConfig
// =============================================================================

/// Configuration for a [`Bag`](super::Bag).
///
/// # Example
///
/// ```rust
/// use attend_core::bag::{BagConfig, Strategy};
/// use attend_core::budget::MergeKind;
///
/// let config = BagConfig::new(64)
///     .with_strategy(Strategy::Level { levels: 20 })
///     .with_merge(MergeKind::Plus)
///     .with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BagConfig {
    /// Maximum number of resident items
    pub capacity: usize,
    /// Ordering structure and sampling policy
    pub strategy: Strategy,
    /// Built-in merge law for same-key insertion
    pub merge: MergeKind,
    /// Seed for the sampling RNG
    pub seed: u64,
}

impl Default for BagConfig {
    fn default() -> Self {
        Self {
            capacity: BAG_CAPACITY_COUNT_DEFAULT,
            strategy: Strategy::default(),
            merge: MergeKind::default(),
            seed: BAG_SEED_DEFAULT,
        }
    }
}

impl BagConfig {
    /// Default configuration with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Set the strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the built-in merge law.
    #[must_use]
    pub fn with_merge(mut self, merge: MergeKind) -> Self {
        self.merge = merge;
        self
    }

    /// Set the sampling seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check every option against its limits.
    ///
    /// # Errors
    /// Returns the first invalid option found.
    pub fn validate(&self) -> BagResult<()> {
        if self.capacity == 0 {
            return Err(BagConfigError::ZeroCapacity);
        }
        if self.capacity > BAG_CAPACITY_COUNT_MAX {
            return Err(BagConfigError::CapacityTooLarge {
                capacity: self.capacity,
                max: BAG_CAPACITY_COUNT_MAX,
            });
        }

        match self.strategy {
            Strategy::Curve { exponent } => {
                if !exponent.is_finite()
                    || !(BAG_CURVE_EXPONENT_MIN..=BAG_CURVE_EXPONENT_MAX).contains(&exponent)
                {
                    return Err(BagConfigError::InvalidCurveExponent {
                        exponent,
                        min: BAG_CURVE_EXPONENT_MIN,
                        max: BAG_CURVE_EXPONENT_MAX,
                    });
                }
            }
            Strategy::Level { levels } => {
                if levels == 0 {
                    return Err(BagConfigError::ZeroLevels);
                }
                if levels > BAG_LEVELS_COUNT_MAX {
                    return Err(BagConfigError::TooManyLevels {
                        levels,
                        max: BAG_LEVELS_COUNT_MAX,
                    });
                }
            }
        }

        Ok(())
    }
}
