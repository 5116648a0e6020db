//! Merge policies for same-key re-insertion.
//!
//! When a bag receives an item whose key is already resident, the two budgets
//! are combined by the bag's [`MergePolicy`]. The law is domain-specific, so it
//! is injected at construction rather than fixed in the bag.

use serde::{Deserialize, Serialize};

use super::Budget;
use crate::constants::BUDGET_VALUE_MAX;

/// Combines the budget of a resident item with the budget of an incoming one.
///
/// Implemented for any `Fn(&Budget, &Budget) -> Budget + Send + Sync`.
pub trait MergePolicy: Send + Sync {
    /// Produce the budget the merged item carries.
    fn merge(&self, existing: &Budget, incoming: &Budget) -> Budget;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> MergePolicy for F
where
    F: Fn(&Budget, &Budget) -> Budget + Send + Sync,
{
    fn merge(&self, existing: &Budget, incoming: &Budget) -> Budget {
        self(existing, incoming)
    }
}

fn later_stamp(existing: &Budget, incoming: &Budget) -> Option<u64> {
    existing.last_forget_time().max(incoming.last_forget_time())
}

fn stamped(budget: Budget, time: Option<u64>) -> Budget {
    match time {
        Some(t) => budget.with_last_forget_time(t),
        None => budget,
    }
}

/// Component-wise maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxMerge;

impl MergePolicy for MaxMerge {
    fn merge(&self, existing: &Budget, incoming: &Budget) -> Budget {
        // f64::max ignores a NaN side, so an unused quality defers to the other
        let merged = Budget::new(
            existing.priority().max(incoming.priority()),
            existing.durability().max(incoming.durability()),
            existing.quality().max(incoming.quality()),
        );
        stamped(merged, later_stamp(existing, incoming))
    }

    fn name(&self) -> &'static str {
        "max"
    }
}

/// Priorities add (clipped to 1); durability and quality take the maximum.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlusMerge;

impl MergePolicy for PlusMerge {
    fn merge(&self, existing: &Budget, incoming: &Budget) -> Budget {
        let merged = Budget::new(
            (existing.priority() + incoming.priority()).min(BUDGET_VALUE_MAX),
            existing.durability().max(incoming.durability()),
            existing.quality().max(incoming.quality()),
        );
        stamped(merged, later_stamp(existing, incoming))
    }

    fn name(&self) -> &'static str {
        "plus"
    }
}

/// Mean priority; durability and quality averaged with priority as the weight.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageMerge;

fn weighted(a: f64, wa: f64, b: f64, wb: f64) -> f64 {
    if a.is_nan() {
        return b;
    }
    if b.is_nan() {
        return a;
    }
    let total = wa + wb;
    if total > 0.0 {
        (a * wa + b * wb) / total
    } else {
        (a + b) / 2.0
    }
}

impl MergePolicy for AverageMerge {
    fn merge(&self, existing: &Budget, incoming: &Budget) -> Budget {
        let (pe, pi) = (existing.priority(), incoming.priority());
        let merged = Budget::new(
            (pe + pi) / 2.0,
            weighted(existing.durability(), pe, incoming.durability(), pi),
            weighted(existing.quality(), pe, incoming.quality(), pi),
        );
        stamped(merged, later_stamp(existing, incoming))
    }

    fn name(&self) -> &'static str {
        "average"
    }
}

/// Built-in merge laws, nameable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKind {
    /// [`MaxMerge`]
    #[default]
    Max,
    /// [`PlusMerge`]
    Plus,
    /// [`AverageMerge`]
    Average,
}

impl MergeKind {
    /// Instantiate the named policy.
    #[must_use]
    pub fn policy(self) -> Box<dyn MergePolicy> {
        match self {
            MergeKind::Max => Box::new(MaxMerge),
            MergeKind::Plus => Box::new(PlusMerge),
            MergeKind::Average => Box::new(AverageMerge),
        }
    }
}
