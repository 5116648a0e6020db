//! SimConfig - Seed Selection For Simulation Runs
//!
//! TigerStyle: A failing seed is printed, and `DST_SEED` replays it.

use std::env;

use rand::Rng;

use crate::constants::DST_SIMULATION_STEPS_MAX;

use super::property::PropertyTest;

/// Environment variable that pins the seed of a run.
pub const DST_SEED_ENV: &str = "DST_SEED";

/// Seed and operation budget for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimConfig {
    seed: u64,
    operations_max: u64,
}

impl SimConfig {
    /// Config with an explicit seed.
    ///
    /// # Example
    /// ```
    /// use attend_core::dst::SimConfig;
    /// assert_eq!(SimConfig::with_seed(12345).seed(), 12345);
    /// ```
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            operations_max: DST_SIMULATION_STEPS_MAX,
        }
    }

    /// Seed from `DST_SEED`, or a fresh random seed printed for replay.
    ///
    /// # Panics
    /// Panics if `DST_SEED` is set but is not a `u64`.
    #[must_use]
    pub fn from_env_or_random() -> Self {
        let seed = match env::var(DST_SEED_ENV) {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .unwrap_or_else(|_| panic!("{} must be a valid u64, got: {}", DST_SEED_ENV, raw)),
            Err(_) => {
                let seed = rand::thread_rng().gen::<u64>();
                eprintln!("DST: random seed {} (replay with {}={})", seed, DST_SEED_ENV, seed);
                seed
            }
        };
        Self::with_seed(seed)
    }

    /// The seed.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Maximum operations per run.
    #[must_use]
    pub fn operations_max(&self) -> u64 {
        self.operations_max
    }

    /// Same seed, different operation budget.
    ///
    /// # Panics
    /// Panics if `operations_max` is zero or above `DST_SIMULATION_STEPS_MAX`.
    #[must_use]
    pub fn with_operations_max(self, operations_max: u64) -> Self {
        // Precondition
        assert!(
            operations_max > 0 && operations_max <= DST_SIMULATION_STEPS_MAX,
            "operations_max must be in [1, {}], got {}",
            DST_SIMULATION_STEPS_MAX,
            operations_max
        );
        Self {
            operations_max,
            ..self
        }
    }

    /// A property test driven by this seed and budget.
    #[must_use]
    pub fn property_test(&self) -> PropertyTest {
        PropertyTest::new(self.seed).with_max_operations(self.operations_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_seed() {
        let config = SimConfig::with_seed(42);
        assert_eq!(config.seed(), 42);
        assert_eq!(config.operations_max(), DST_SIMULATION_STEPS_MAX);
    }

    #[test]
    fn test_with_operations_max() {
        let config = SimConfig::with_seed(7).with_operations_max(500);
        assert_eq!(config.seed(), 7);
        assert_eq!(config.operations_max(), 500);
    }

    #[test]
    #[should_panic(expected = "operations_max must be in")]
    fn test_zero_operations_panics() {
        let _ = SimConfig::with_seed(1).with_operations_max(0);
    }
}
