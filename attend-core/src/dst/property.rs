//! Property-Based Testing for DST
//!
//! TigerStyle: Random operation sequences with invariant checking.
//!
//! A `PropertyTestable` system generates its own operations from the seeded
//! RNG, applies them against a `SimClock`, and reports invariant violations.
//! Failures carry the seed and operation index, so every failure replays.
//!
//! # Example
//!
//! ```rust
//! use attend_core::dst::{DeterministicRng, PropertyTest, PropertyTestable, SimClock};
//!
//! struct Bounded { len: usize, cap: usize }
//!
//! #[derive(Debug, Clone)]
//! enum Op { Grow, Shrink }
//!
//! impl PropertyTestable for Bounded {
//!     type Operation = Op;
//!
//!     fn generate_operation(&self, rng: &mut DeterministicRng) -> Op {
//!         if rng.next_bool(0.7) { Op::Grow } else { Op::Shrink }
//!     }
//!
//!     fn apply_operation(&mut self, op: &Op, _clock: &SimClock) {
//!         match op {
//!             Op::Grow => self.len = (self.len + 1).min(self.cap),
//!             Op::Shrink => self.len = self.len.saturating_sub(1),
//!         }
//!     }
//!
//!     fn check_invariants(&self) -> Result<(), String> {
//!         if self.len > self.cap {
//!             return Err(format!("len {} above cap {}", self.len, self.cap));
//!         }
//!         Ok(())
//!     }
//! }
//!
//! let result = PropertyTest::new(42)
//!     .with_max_operations(500)
//!     .run(Bounded { len: 0, cap: 8 });
//! assert!(result.is_success());
//! ```

use std::collections::VecDeque;
use std::fmt::Debug;

use super::clock::SimClock;
use super::rng::DeterministicRng;
use crate::constants::{DST_FAILURE_TRAIL_COUNT_MAX, DST_SIMULATION_STEPS_MAX};

/// Trait for systems that can be property-tested.
pub trait PropertyTestable {
    /// The type of operations that can be performed.
    type Operation: Debug + Clone;

    /// Generate a random operation based on current state.
    fn generate_operation(&self, rng: &mut DeterministicRng) -> Self::Operation;

    /// Apply an operation to the state.
    ///
    /// May use the clock for time-dependent operations.
    fn apply_operation(&mut self, op: &Self::Operation, clock: &SimClock);

    /// Check that all invariants hold.
    ///
    /// # Errors
    /// Returns a description of the first violated invariant.
    fn check_invariants(&self) -> Result<(), String>;

    /// Describe the current state for failure reports.
    fn describe_state(&self) -> String {
        String::from("(state description not implemented)")
    }
}

// =============================================================================
// Results
// =============================================================================

/// Outcome of one property test run.
#[derive(Debug)]
pub struct PropertyTestResult {
    /// Operations applied, including the failing one
    pub operations_executed: u64,
    /// Seed that reproduces the run
    pub seed: u64,
    /// Failure details, if any
    pub failure: Option<PropertyTestFailure>,
}

impl PropertyTestResult {
    /// No invariant was violated.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Some invariant was violated.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.failure.is_some()
    }

    /// Panic with reproduction details if the run failed.
    ///
    /// # Panics
    /// Panics if the test failed.
    pub fn unwrap(self) {
        let Some(failure) = self.failure else {
            return;
        };
        panic!(
            "property test failed\n\
             seed: {} (replay with DST_SEED={})\n\
             operation #{}: {}\n\
             violation: {}\n\
             recent operations:\n  {}\n\
             state: {}",
            self.seed,
            self.seed,
            failure.operation_index,
            failure.operation,
            failure.message,
            failure.recent_operations.join("\n  "),
            failure.state_description
        );
    }
}

/// Where and how a run failed.
#[derive(Debug)]
pub struct PropertyTestFailure {
    /// Index of the failing operation (0-based)
    pub operation_index: u64,
    /// The failing operation, `Debug`-formatted
    pub operation: String,
    /// Operations leading up to the failure, oldest first
    pub recent_operations: Vec<String>,
    /// The invariant violation message
    pub message: String,
    /// State at the moment of failure
    pub state_description: String,
}

// =============================================================================
// Time Advancement
// =============================================================================

/// How the simulated clock moves between operations.
#[derive(Debug, Clone)]
pub struct TimeAdvanceConfig {
    /// Minimum advance per operation (ms)
    pub min_ms: u64,
    /// Maximum advance per operation (ms)
    pub max_ms: u64,
    /// Probability that the clock moves before an operation
    pub probability: f64,
}

impl Default for TimeAdvanceConfig {
    fn default() -> Self {
        Self {
            min_ms: 0,
            max_ms: 1000,
            probability: 0.5,
        }
    }
}

impl TimeAdvanceConfig {
    /// Frozen clock.
    #[must_use]
    pub fn none() -> Self {
        Self {
            min_ms: 0,
            max_ms: 0,
            probability: 0.0,
        }
    }

    /// Advance by exactly `ms` before every operation.
    #[must_use]
    pub fn fixed(ms: u64) -> Self {
        Self {
            min_ms: ms,
            max_ms: ms,
            probability: 1.0,
        }
    }

    /// Milliseconds to advance before the next operation.
    fn draw(&self, rng: &mut DeterministicRng) -> u64 {
        if self.probability <= 0.0 || !rng.next_bool(self.probability) {
            return 0;
        }
        if self.min_ms >= self.max_ms {
            return self.min_ms;
        }
        self.min_ms + rng.next_u64() % (self.max_ms - self.min_ms + 1)
    }
}

// =============================================================================
// Runner
// =============================================================================

/// Seeded driver for a [`PropertyTestable`] system.
#[derive(Debug)]
pub struct PropertyTest {
    seed: u64,
    max_operations: u64,
    time_config: TimeAdvanceConfig,
}

impl PropertyTest {
    /// A run of 100 operations under `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_operations: 100,
            time_config: TimeAdvanceConfig::default(),
        }
    }

    /// Set the number of operations.
    ///
    /// # Panics
    /// Panics if max exceeds `DST_SIMULATION_STEPS_MAX`.
    #[must_use]
    pub fn with_max_operations(mut self, max: u64) -> Self {
        assert!(
            max <= DST_SIMULATION_STEPS_MAX,
            "max_operations {} exceeds DST_SIMULATION_STEPS_MAX {}",
            max,
            DST_SIMULATION_STEPS_MAX
        );
        self.max_operations = max;
        self
    }

    /// Set how the clock moves between operations.
    #[must_use]
    pub fn with_time_advance(mut self, config: TimeAdvanceConfig) -> Self {
        self.time_config = config;
        self
    }

    /// Run to completion or to the first invariant violation.
    ///
    /// Invariants are checked on the initial state and after every operation.
    #[must_use]
    pub fn run<T: PropertyTestable>(self, mut state: T) -> PropertyTestResult {
        let mut rng = DeterministicRng::new(self.seed);
        let clock = SimClock::new();
        let mut trail: VecDeque<String> = VecDeque::with_capacity(DST_FAILURE_TRAIL_COUNT_MAX);

        if let Err(msg) = state.check_invariants() {
            return self.failed(
                0,
                PropertyTestFailure {
                    operation_index: 0,
                    operation: "(initial state)".to_string(),
                    recent_operations: Vec::new(),
                    message: format!("Initial state violates invariants: {}", msg),
                    state_description: state.describe_state(),
                },
            );
        }

        for index in 0..self.max_operations {
            let advance = self.time_config.draw(&mut rng);
            if advance > 0 {
                clock.advance_ms(advance);
            }

            let op = state.generate_operation(&mut rng);
            let described = format!("{:?}", op);
            state.apply_operation(&op, &clock);

            if let Err(message) = state.check_invariants() {
                return self.failed(
                    index + 1,
                    PropertyTestFailure {
                        operation_index: index,
                        operation: described,
                        recent_operations: trail.into(),
                        message,
                        state_description: state.describe_state(),
                    },
                );
            }

            if trail.len() == DST_FAILURE_TRAIL_COUNT_MAX {
                trail.pop_front();
            }
            trail.push_back(described);
        }

        PropertyTestResult {
            operations_executed: self.max_operations,
            seed: self.seed,
            failure: None,
        }
    }

    /// Run, panicking with reproduction details on failure.
    ///
    /// # Panics
    /// Panics if any invariant is violated.
    pub fn run_and_assert<T: PropertyTestable>(self, state: T) {
        self.run(state).unwrap();
    }

    fn failed(&self, executed: u64, failure: PropertyTestFailure) -> PropertyTestResult {
        PropertyTestResult {
            operations_executed: executed,
            seed: self.seed,
            failure: Some(failure),
        }
    }
}

/// Run fresh states from `state_factory` under each seed in turn.
///
/// # Panics
/// Panics on the first failing seed.
pub fn run_property_tests<T, F>(seeds: &[u64], max_operations: u64, state_factory: F)
where
    T: PropertyTestable,
    F: Fn() -> T,
{
    for &seed in seeds {
        PropertyTest::new(seed)
            .with_max_operations(max_operations)
            .run_and_assert(state_factory());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counter that clamps into [0, cap].
    struct Gauge {
        level: u64,
        cap: u64,
        clamps: bool,
    }

    #[derive(Debug, Clone)]
    enum GaugeOp {
        Raise(u64),
        Drain,
    }

    impl PropertyTestable for Gauge {
        type Operation = GaugeOp;

        fn generate_operation(&self, rng: &mut DeterministicRng) -> Self::Operation {
            if rng.next_bool(0.8) {
                GaugeOp::Raise(rng.next_usize(1, 20) as u64)
            } else {
                GaugeOp::Drain
            }
        }

        fn apply_operation(&mut self, op: &Self::Operation, _clock: &SimClock) {
            match op {
                GaugeOp::Raise(n) if self.clamps => self.level = (self.level + n).min(self.cap),
                GaugeOp::Raise(n) => self.level += n,
                GaugeOp::Drain => self.level = 0,
            }
        }

        fn check_invariants(&self) -> Result<(), String> {
            if self.level > self.cap {
                return Err(format!("level {} exceeds cap {}", self.level, self.cap));
            }
            Ok(())
        }

        fn describe_state(&self) -> String {
            format!("Gauge {{ level: {}, cap: {} }}", self.level, self.cap)
        }
    }

    #[test]
    fn test_property_test_success() {
        let gauge = Gauge { level: 0, cap: 50, clamps: true };

        let result = PropertyTest::new(42)
            .with_max_operations(1000)
            .with_time_advance(TimeAdvanceConfig::none())
            .run(gauge);

        assert!(result.is_success());
        assert_eq!(result.operations_executed, 1000);
        assert_eq!(result.seed, 42);
    }

    #[test]
    fn test_property_test_catches_bug() {
        let gauge = Gauge { level: 0, cap: 50, clamps: false };

        let result = PropertyTest::new(42).with_max_operations(1000).run(gauge);

        assert!(result.is_failure());
        let failure = result.failure.expect("failure details");
        assert!(failure.message.contains("exceeds cap"));
    }

    #[test]
    fn test_failure_carries_recent_operations() {
        let result = PropertyTest::new(7)
            .with_max_operations(1000)
            .run(Gauge { level: 0, cap: 50, clamps: false });

        let failure = result.failure.expect("failure details");
        assert!(failure.recent_operations.len() <= DST_FAILURE_TRAIL_COUNT_MAX);
        assert_eq!(
            failure.recent_operations.len() as u64,
            failure.operation_index.min(DST_FAILURE_TRAIL_COUNT_MAX as u64)
        );
    }

    #[test]
    fn test_fixed_time_advance() {
        let mut rng = DeterministicRng::new(1);
        assert_eq!(TimeAdvanceConfig::fixed(250).draw(&mut rng), 250);
        assert_eq!(TimeAdvanceConfig::none().draw(&mut rng), 0);
    }

    #[test]
    fn test_property_test_determinism() {
        let run = || {
            PropertyTest::new(12345)
                .with_max_operations(200)
                .run(Gauge { level: 0, cap: 60, clamps: false })
                .operations_executed
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_initial_invariant_check() {
        let result = PropertyTest::new(42).run(Gauge { level: 99, cap: 10, clamps: true });

        assert!(result.is_failure());
        assert!(result
            .failure
            .expect("failure details")
            .message
            .contains("Initial state violates"));
    }

    #[test]
    fn test_run_property_tests_helper() {
        run_property_tests(&[0, 1, 42], 100, || Gauge { level: 0, cap: 10, clamps: true });
    }
}
