//! Attend Core - Bounded Attention Memory with DST
//!
//! TigerStyle priority store for a reasoning engine, built simulation-first.
//!
//! # Philosophy
//!
//! > "If you can't replay it, you can't debug it."
//!
//! Every item carries a decaying budget. The store holds a bounded number of
//! items, hands them out with a bias toward high priority, and decides what is
//! forgotten when room runs out:
//! 1. All randomness flows through a seeded [`DeterministicRng`]
//! 2. Time comes from an injectable [`cycle::Timing`]
//! 3. Invariants are assertions, checked by full scan under test
//! 4. Side effects are explicit listeners, never global state
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               Attend Core                    │
//! ├─────────────────────────────────────────────┤
//! │  Scheduler            │ pop, process, decay │
//! │  Bag (curve | level)  │ bounded, sampled    │
//! │  Budget + forgetting  │ pure arithmetic     │
//! ├─────────────────────────────────────────────┤
//! │  DST Framework        │ seeded RNG, clock   │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust
//! use attend_core::bag::{Bag, BagConfig, Item, Strategy};
//! use attend_core::budget::Budget;
//!
//! #[derive(Debug)]
//! struct Concept { name: String, budget: Budget }
//!
//! impl Item for Concept {
//!     type Key = String;
//!     fn key(&self) -> &String { &self.name }
//!     fn budget(&self) -> &Budget { &self.budget }
//!     fn budget_mut(&mut self) -> &mut Budget { &mut self.budget }
//! }
//!
//! let config = BagConfig::new(1000).with_strategy(Strategy::Level { levels: 100 });
//! let mut bag = Bag::new(config).unwrap();
//! bag.put(Concept { name: "bird".into(), budget: Budget::new(0.8, 0.6, 0.4) });
//!
//! let next = bag.pop().unwrap();
//! assert_eq!(next.name, "bird");
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bag;
pub mod budget;
pub mod constants;
pub mod cycle;
pub mod dst;
pub mod telemetry;

// Re-export common types
pub use bag::{
    Admission, Bag, BagConfig, BagConfigError, BagCurve, BagStats, Item, Strategy,
};
pub use budget::{forget, forget_periodic, Budget, BudgetError, MergeKind, MergePolicy};
pub use constants::*;
pub use cycle::{
    CycleConfigError, CycleContext, CycleListener, CycleReport, ForgetMode, ForgetReason,
    PredicateIndex, Scheduler, SchedulerConfig, Store, Timing, WorkerPool,
};
pub use dst::{
    run_property_tests,
    DeterministicRng,
    // Property-based testing
    PropertyTest,
    PropertyTestFailure,
    PropertyTestResult,
    PropertyTestable,
    SimClock,
    SimConfig,
    TimeAdvanceConfig,
};
pub use telemetry::{init_tracing, TelemetryConfig, TelemetryError};
