//! TigerStyle Constants
//!
//! All limits use big-endian naming: CATEGORY_SPECIFICS_UNIT_LIMIT
//! Example: BAG_CAPACITY_COUNT_MAX (not MAX_BAG_CAPACITY)
//!
//! Every constant includes units in the name:
//! - _COUNT_MAX/DEFAULT for quantity limits
//! - _MS for milliseconds
//! - _CYCLES for scheduler time units
//! - _RATIO for dimensionless fractions

// =============================================================================
// Budget Limits
// =============================================================================

/// Lower bound of every budget component
pub const BUDGET_VALUE_MIN: f64 = 0.0;

/// Upper bound of every budget component
pub const BUDGET_VALUE_MAX: f64 = 1.0;

/// Priority at or below this is considered worthless by admission control
pub const BUDGET_PRIORITY_EPSILON: f64 = 0.001;

/// Floor reported by `priority_mean` (an empty bag reports this value)
pub const BUDGET_PRIORITY_MEAN_MIN: f64 = 0.01;

// =============================================================================
// Forgetting
// =============================================================================

/// Default minimum fractional priority change for a decay step to apply
pub const FORGET_RELATIVE_THRESHOLD_RATIO_DEFAULT: f64 = 0.01;

/// Default number of durations an item takes to decay by one e-fold
pub const FORGET_DURATIONS_COUNT_DEFAULT: f64 = 2.0;

// =============================================================================
// Bag Limits
// =============================================================================

/// Maximum capacity of a single bag
pub const BAG_CAPACITY_COUNT_MAX: usize = 1_000_000;

/// Default capacity of a bag
pub const BAG_CAPACITY_COUNT_DEFAULT: usize = 1000;

/// Default number of priority levels for the level-bucketed strategy
pub const BAG_LEVELS_COUNT_DEFAULT: usize = 100;

/// Maximum number of priority levels for the level-bucketed strategy
pub const BAG_LEVELS_COUNT_MAX: usize = 10_000;

/// Default shaping-curve exponent for the curve-sampled strategy
pub const BAG_CURVE_EXPONENT_DEFAULT: f64 = 6.0;

/// Minimum shaping-curve exponent (1.0 is uniform rank sampling)
pub const BAG_CURVE_EXPONENT_MIN: f64 = 1.0;

/// Maximum shaping-curve exponent
pub const BAG_CURVE_EXPONENT_MAX: f64 = 64.0;

/// Relative tolerance when comparing incremental mass to a full rescan
pub const BAG_MASS_EPSILON: f64 = 1.0e-6;

/// Upper bound on storage reserved up front when a bag is created
pub const BAG_PREALLOC_COUNT_MAX: usize = 4096;

/// Default seed for a bag's sampling RNG
pub const BAG_SEED_DEFAULT: u64 = 1;

/// Tombstones a level may hold before it is compacted (once they also
/// outnumber its live entries)
pub const BAG_LEVEL_TOMBSTONES_COUNT_MIN: usize = 32;

// =============================================================================
// Cycle Scheduler Limits
// =============================================================================

/// Default number of items popped per cycle
pub const CYCLE_POPS_COUNT_DEFAULT: usize = 1;

/// Maximum number of items popped per cycle
pub const CYCLE_POPS_COUNT_MAX: usize = 1024;

/// Default number of buffered inputs admitted per cycle
pub const CYCLE_INPUTS_COUNT_DEFAULT: usize = 1;

/// Maximum number of buffered inputs admitted per cycle
pub const CYCLE_INPUTS_COUNT_MAX: usize = 1024;

/// Maximum number of inputs waiting in the input buffer
pub const CYCLE_INPUT_BUFFER_COUNT_MAX: usize = 100_000;

/// Default length of one duration in time units (cycles under cycle timing)
pub const CYCLE_DURATION_CYCLES_DEFAULT: u64 = 5;

/// Maximum number of deferred effects queued during one cycle
pub const CYCLE_DEFERRED_COUNT_MAX: usize = 100_000;

/// Maximum number of worker-pool jobs waiting for execution
pub const CYCLE_LATER_JOBS_COUNT_MAX: usize = 10_000;

// =============================================================================
// DST (Deterministic Simulation Testing) Limits
// =============================================================================

/// Maximum number of simulation steps
pub const DST_SIMULATION_STEPS_MAX: u64 = 1_000_000;

/// Maximum time advance per step in milliseconds
pub const DST_TIME_ADVANCE_MS_MAX: u64 = 86_400_000; // 24 hours

/// Operations kept for the failure report of a property test
pub const DST_FAILURE_TRAIL_COUNT_MAX: usize = 16;

// =============================================================================
// Telemetry
// =============================================================================

/// Filter directive used by `init_tracing` when `RUST_LOG` is unset
pub const TELEMETRY_FILTER_DEFAULT: &str = "info";

// =============================================================================
// Time Constants
// =============================================================================

/// Milliseconds per second
pub const TIME_MS_PER_SEC: u64 = 1000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_limits_valid() {
        assert!(BUDGET_VALUE_MIN < BUDGET_VALUE_MAX);
        assert!(BUDGET_PRIORITY_EPSILON > BUDGET_VALUE_MIN);
        assert!(BUDGET_PRIORITY_MEAN_MIN < BUDGET_VALUE_MAX);
    }

    #[test]
    fn test_bag_limits_valid() {
        assert!(BAG_CAPACITY_COUNT_DEFAULT <= BAG_CAPACITY_COUNT_MAX);
        assert!(BAG_LEVELS_COUNT_DEFAULT <= BAG_LEVELS_COUNT_MAX);
        assert!(BAG_CURVE_EXPONENT_MIN <= BAG_CURVE_EXPONENT_DEFAULT);
        assert!(BAG_CURVE_EXPONENT_DEFAULT <= BAG_CURVE_EXPONENT_MAX);
    }

    #[test]
    fn test_cycle_limits_valid() {
        assert!(CYCLE_POPS_COUNT_DEFAULT <= CYCLE_POPS_COUNT_MAX);
        assert!(CYCLE_INPUTS_COUNT_DEFAULT <= CYCLE_INPUTS_COUNT_MAX);
        assert!(CYCLE_DURATION_CYCLES_DEFAULT > 0);
        assert!(FORGET_DURATIONS_COUNT_DEFAULT > 0.0);
    }
}
