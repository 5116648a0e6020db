//! Cycle - The Activation Scheduler
//!
//! TigerStyle: One cycle runs to completion before the next begins.
//!
//! # Cycle
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ enabled?           refuse before anything happens        │
//! │ admit              worker results, then buffered inputs  │
//! │ select             pop up to N items                     │
//! │ process            callback returns follow-on items      │
//! │ forget + restore   decay the popped item, reinsert it    │
//! │ admit follow-ons   merge/evict/reject routed to listener │
//! │ deferred effects   FIFO, after every decision is final   │
//! │ tick               advance cycle counter and clock       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use attend_core::bag::{Bag, BagConfig, Item};
//! use attend_core::budget::Budget;
//! use attend_core::cycle::{Scheduler, SchedulerConfig};
//!
//! #[derive(Debug)]
//! struct Thought { id: u32, budget: Budget }
//!
//! impl Item for Thought {
//!     type Key = u32;
//!     fn key(&self) -> &u32 { &self.id }
//!     fn budget(&self) -> &Budget { &self.budget }
//!     fn budget_mut(&mut self) -> &mut Budget { &mut self.budget }
//! }
//!
//! let bag = Bag::new(BagConfig::new(100)).unwrap();
//! let mut scheduler = Scheduler::new(SchedulerConfig::default(), bag, ()).unwrap();
//! let _ = scheduler.input(Thought { id: 1, budget: Budget::new(0.8, 0.5, 0.2) });
//!
//! let report = scheduler.cycle(|thought, _ctx| {
//!     vec![Thought { id: thought.id + 1, budget: Budget::new(0.4, 0.5, 0.1) }]
//! });
//! assert_eq!(report.popped, 1);
//! assert_eq!(scheduler.bag().len(), 2);
//! ```

mod config;
mod deferred;
mod listener;
mod pool;
mod store;
mod timing;

use std::collections::VecDeque;

pub use config::{CycleConfigError, CycleResult, ForgetMode, SchedulerConfig};
pub use listener::{CycleListener, ForgetReason, PredicateIndex};
pub use pool::WorkerPool;
pub use store::{Admitted, Store};
pub use timing::Timing;

use deferred::DeferredQueue;

use crate::bag::{Bag, Item};
use crate::budget::{forget, forget_periodic};
use crate::constants::CYCLE_INPUT_BUFFER_COUNT_MAX;

// =============================================================================
// CycleReport
// =============================================================================

/// Counters for one cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Cycle number (executed cycles before this one)
    pub cycle: u64,
    /// Time at cycle start
    pub time: u64,
    /// Refused because the scheduler was disabled
    pub skipped: bool,
    /// Buffered inputs taken this cycle
    pub inputs: usize,
    /// Worker results taken this cycle
    pub worker_results: usize,
    /// Items selected for processing
    pub popped: usize,
    /// Follow-on items produced by processing
    pub follow_ons: usize,
    /// Items stored or merged
    pub remembered: usize,
    /// Residents displaced
    pub evicted: usize,
    /// Items refused by a full bag
    pub rejected: usize,
    /// Items dropped by admission control
    pub dropped: usize,
    /// Deferred effects run
    pub deferred: usize,
}

impl CycleReport {
    fn record(&mut self, admitted: Admitted) {
        match admitted {
            Admitted::Remembered => self.remembered += 1,
            Admitted::Evicted => {
                self.remembered += 1;
                self.evicted += 1;
            }
            Admitted::Rejected => self.rejected += 1,
            Admitted::BelowThreshold | Admitted::Malformed => self.dropped += 1,
        }
    }
}

// =============================================================================
// CycleContext
// =============================================================================

/// Handed to the processing callback for each popped item.
pub struct CycleContext<'a, V: Item, L> {
    cycle: u64,
    now: u64,
    deferred: &'a mut DeferredQueue<V, L>,
    pool: &'a mut WorkerPool<V>,
}

impl<V, L> CycleContext<'_, V, L>
where
    V: Item + Send + 'static,
    L: CycleListener<V>,
{
    /// Number of the running cycle.
    #[must_use]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Time at the start of the running cycle.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Run `effect` after this cycle's selection and admission are final.
    ///
    /// Returns `false` if `CYCLE_DEFERRED_COUNT_MAX` effects are already
    /// queued and the effect was dropped.
    pub fn defer(&mut self, effect: impl FnOnce(&mut Store<V, L>) + 'static) -> bool {
        self.deferred.push(Box::new(effect))
    }

    /// Run `job` on the worker pool; its items are admitted in a later cycle.
    ///
    /// Returns `false` if the pool is full and the job was dropped.
    pub fn later(&mut self, job: impl FnOnce() -> Vec<V> + Send + 'static) -> bool {
        self.pool.submit(Box::new(job))
    }
}

// =============================================================================
// Scheduler
// =============================================================================

/// Drives pop / process / forget / reinsert cycles over one bag.
pub struct Scheduler<V: Item, L> {
    config: SchedulerConfig,
    store: Store<V, L>,
    timing: Timing,
    enabled: bool,
    /// Executed cycles
    cycles: u64,
    inputs: VecDeque<V>,
    /// Input admission resumes once `cycles` reaches this
    inputs_paused_until: u64,
    deferred: DeferredQueue<V, L>,
    pool: WorkerPool<V>,
}

impl<V, L> Scheduler<V, L>
where
    V: Item + Send + 'static,
    L: CycleListener<V>,
{
    /// Create an enabled scheduler with cycle timing and an inline pool.
    ///
    /// # Errors
    /// Returns `CycleConfigError` if the configuration is invalid.
    pub fn new(config: SchedulerConfig, bag: Bag<V>, listener: L) -> CycleResult<Self> {
        config.validate()?;

        tracing::debug!(
            pops_per_cycle = config.pops_per_cycle,
            inputs_per_cycle = config.inputs_per_cycle,
            duration = config.duration,
            forget_mode = ?config.forget_mode,
            bag = ?bag,
            "scheduler created"
        );

        Ok(Self {
            config,
            store: Store::new(bag, listener),
            timing: Timing::Cycle,
            enabled: true,
            cycles: 0,
            inputs: VecDeque::new(),
            inputs_paused_until: 0,
            deferred: DeferredQueue::new(),
            pool: WorkerPool::inline(),
        })
    }

    /// Read time from `timing`.
    #[must_use]
    pub fn with_timing(mut self, timing: Timing) -> Self {
        self.timing = timing;
        self
    }

    /// Run `later` jobs on `pool`.
    #[must_use]
    pub fn with_pool(mut self, pool: WorkerPool<V>) -> Self {
        self.pool = pool;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The configuration.
    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// The bag being scheduled.
    #[must_use]
    pub fn bag(&self) -> &Bag<V> {
        self.store.bag()
    }

    /// Bag and listener.
    #[must_use]
    pub fn store(&self) -> &Store<V, L> {
        &self.store
    }

    /// Bag and listener, for admissions and removals outside a cycle.
    pub fn store_mut(&mut self) -> &mut Store<V, L> {
        &mut self.store
    }

    /// The listener.
    #[must_use]
    pub fn listener(&self) -> &L {
        self.store.listener()
    }

    /// The timing mode.
    #[must_use]
    pub fn timing(&self) -> &Timing {
        &self.timing
    }

    /// The worker pool.
    #[must_use]
    pub fn pool(&self) -> &WorkerPool<V> {
        &self.pool
    }

    /// Executed cycles so far.
    #[must_use]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Current time under the configured timing.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.timing.now(self.cycles)
    }

    /// Whether cycles run.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Allow or refuse future cycles.
    pub fn set_enabled(&mut self, enabled: bool) {
        tracing::debug!(enabled, "scheduler enable flag changed");
        self.enabled = enabled;
    }

    /// Inputs waiting in the buffer.
    #[must_use]
    pub fn pending_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Whether input admission is paused.
    #[must_use]
    pub fn is_thinking(&self) -> bool {
        self.cycles < self.inputs_paused_until
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// Buffer an externally perceived item. Returns it back if the buffer is full.
    pub fn input(&mut self, item: V) -> Option<V> {
        if self.inputs.len() >= CYCLE_INPUT_BUFFER_COUNT_MAX {
            tracing::warn!(key = ?item.key(), "input buffer full");
            return Some(item);
        }
        self.inputs.push_back(item);
        None
    }

    /// Pause input admission for the next `cycles` executed cycles.
    pub fn think(&mut self, cycles: u64) {
        self.inputs_paused_until = self.cycles.saturating_add(cycles);
        tracing::debug!(until = self.inputs_paused_until, "thinking without input");
    }

    // =========================================================================
    // Cycle
    // =========================================================================

    /// Run one cycle.
    ///
    /// `process` receives each popped item and returns follow-on items. An
    /// empty bag means no work this cycle.
    #[tracing::instrument(level = "debug", skip_all, fields(cycle = self.cycles))]
    pub fn cycle<F>(&mut self, mut process: F) -> CycleReport
    where
        F: FnMut(&mut V, &mut CycleContext<'_, V, L>) -> Vec<V>,
    {
        let now = self.now();
        let mut report = CycleReport {
            cycle: self.cycles,
            time: now,
            ..CycleReport::default()
        };

        if !self.enabled {
            report.skipped = true;
            tracing::debug!("cycle refused, scheduler disabled");
            return report;
        }

        for item in self.pool.collect() {
            report.worker_results += 1;
            report.record(self.store.admit(item));
        }

        if !self.is_thinking() {
            for _ in 0..self.config.inputs_per_cycle {
                let Some(item) = self.inputs.pop_front() else {
                    break;
                };
                report.inputs += 1;
                report.record(self.store.admit(item));
            }
        }

        let mut selected = Vec::with_capacity(self.config.pops_per_cycle);
        for _ in 0..self.config.pops_per_cycle {
            match self.store.take_next() {
                Some(item) => selected.push(item),
                None => break,
            }
        }
        report.popped = selected.len();

        for mut item in selected {
            let follow_ons = {
                let mut ctx = CycleContext {
                    cycle: self.cycles,
                    now,
                    deferred: &mut self.deferred,
                    pool: &mut self.pool,
                };
                process(&mut item, &mut ctx)
            };

            self.decay(&mut item, now);
            report.record(self.store.restore(item));

            report.follow_ons += follow_ons.len();
            for follow_on in follow_ons {
                report.record(self.store.admit(follow_on));
            }
        }

        report.deferred = self.deferred.drain(&mut self.store);

        self.cycles += 1;
        self.timing.tick();

        tracing::debug!(
            popped = report.popped,
            remembered = report.remembered,
            evicted = report.evicted,
            rejected = report.rejected,
            dropped = report.dropped,
            deferred = report.deferred,
            size = self.store.bag().len(),
            "cycle complete"
        );

        // Postcondition
        assert!(
            self.store.bag().len() <= self.store.bag().capacity(),
            "bag over capacity after cycle"
        );
        report
    }

    /// Run `n` cycles with the same callback.
    pub fn run<F>(&mut self, n: u64, mut process: F) -> Vec<CycleReport>
    where
        F: FnMut(&mut V, &mut CycleContext<'_, V, L>) -> Vec<V>,
    {
        (0..n).map(|_| self.cycle(&mut process)).collect()
    }

    fn decay(&self, item: &mut V, now: u64) {
        let budget = *item.budget();
        // Malformed budgets are left for `restore` to report
        if budget.validate().is_err() {
            return;
        }
        let decayed = match self.config.forget_mode {
            ForgetMode::Iterative => forget(
                &budget,
                self.config.iterative_step(),
                self.config.relative_threshold,
                now,
            ),
            ForgetMode::Periodic => forget_periodic(
                &budget,
                now,
                self.config.forget_period(),
                self.config.relative_threshold,
            ),
        };
        *item.budget_mut() = decayed;
    }
}

impl<V: Item, L> std::fmt::Debug for Scheduler<V, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scheduler")
            .field("config", &self.config)
            .field("timing", &self.timing.name())
            .field("enabled", &self.enabled)
            .field("cycles", &self.cycles)
            .field("inputs", &self.inputs.len())
            .field("deferred", &self.deferred)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}
