//! DST - Deterministic Simulation Testing
//!
//! TigerBeetle/FoundationDB-style deterministic simulation support.
//!
//! # Philosophy
//!
//! > "If you can't replay it, you can't debug it."
//!
//! Bags sample through a [`DeterministicRng`], schedulers can read time from a
//! [`SimClock`], and [`PropertyTest`] drives random operation sequences with
//! invariant checks after every step.
//!
//! ```rust
//! use attend_core::dst::{DeterministicRng, SimClock};
//!
//! let clock = SimClock::new();
//! clock.advance_ms(1000);
//! assert_eq!(clock.now_secs(), 1);
//!
//! let mut a = DeterministicRng::new(42);
//! let mut b = DeterministicRng::new(42);
//! assert_eq!(a.next_u64(), b.next_u64());
//! ```

mod clock;
mod config;
mod property;
mod rng;

pub use clock::SimClock;
pub use config::{SimConfig, DST_SEED_ENV};
pub use property::{
    run_property_tests, PropertyTest, PropertyTestFailure, PropertyTestResult, PropertyTestable,
    TimeAdvanceConfig,
};
pub use rng::DeterministicRng;
