//! Bag - Bounded, Priority-Biased Item Store
//!
//! TigerStyle: Fixed capacity, probabilistic selection, assertions on every mutation.
//!
//! # Overview
//!
//! A bag holds at most `capacity` items keyed by [`Item::Key`]. Selection is
//! random but biased toward high priority, so low-priority items still surface
//! occasionally. When a new key arrives at a full bag, either the incoming item
//! is rejected (it is weaker than everything resident) or a low-priority
//! resident is evicted to make room.
//!
//! The ordering structure is picked by [`Strategy`]:
//!
//! - **Curve**: one sorted array, sampled through a power curve.
//! - **Level**: priority buckets, sampled by level weight.
//!
//! # Example
//!
//! ```rust
//! use attend_core::bag::{Admission, Bag, BagConfig, Item};
//! use attend_core::budget::Budget;
//!
//! #[derive(Debug)]
//! struct Note { id: u32, budget: Budget }
//!
//! impl Item for Note {
//!     type Key = u32;
//!     fn key(&self) -> &u32 { &self.id }
//!     fn budget(&self) -> &Budget { &self.budget }
//!     fn budget_mut(&mut self) -> &mut Budget { &mut self.budget }
//! }
//!
//! let mut bag = Bag::new(BagConfig::new(2)).unwrap();
//! bag.put(Note { id: 1, budget: Budget::new(0.2, 0.5, 0.5) });
//! bag.put(Note { id: 2, budget: Budget::new(0.6, 0.5, 0.5) });
//!
//! // Full: the weakest resident makes room
//! let admission = bag.insert(Note { id: 3, budget: Budget::new(0.9, 0.5, 0.5) });
//! assert!(matches!(admission, Admission::Evicted(ref n) if n.id == 1));
//! assert_eq!(bag.len(), 2);
//! ```

mod config;
mod curve;
mod level;
mod selection;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

pub use config::{BagConfig, BagConfigError, BagResult, Strategy};
pub use curve::{BagCurve, ExponentialCurve, PowerCurve};

use selection::Selection;

use crate::budget::{Budget, MergePolicy};
use crate::constants::{
    BAG_MASS_EPSILON, BAG_PREALLOC_COUNT_MAX, BUDGET_PRIORITY_MEAN_MIN, BUDGET_VALUE_MAX,
};
use crate::dst::DeterministicRng;

// =============================================================================
// Item
// =============================================================================

/// Anything a bag can hold: a stable key plus a budget.
pub trait Item {
    /// Identity of the item. Must not change while the item is resident.
    type Key: Eq + Hash + Clone + fmt::Debug;

    /// The item's key.
    fn key(&self) -> &Self::Key;

    /// The item's budget.
    fn budget(&self) -> &Budget;

    /// Mutable access to the item's budget.
    fn budget_mut(&mut self) -> &mut Budget;

    /// Shorthand for `self.budget().priority()`.
    fn priority(&self) -> f64 {
        self.budget().priority()
    }
}

/// Index entry shared by both ordering structures.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K> {
    pub(crate) key: K,
    pub(crate) priority: f64,
}

// =============================================================================
// Admission
// =============================================================================

/// What happened to an item handed to [`Bag::insert`].
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum Admission<V> {
    /// New key stored, nothing displaced
    Inserted,
    /// Key was resident; budgets merged
    Merged,
    /// New key stored; this resident was evicted to make room
    Evicted(V),
    /// Bag full and the item was weaker than every resident; returned unchanged
    Rejected(V),
}

impl<V> Admission<V> {
    /// The item that left the bag (or never entered), if any.
    pub fn into_overflow(self) -> Option<V> {
        match self {
            Admission::Evicted(v) | Admission::Rejected(v) => Some(v),
            Admission::Inserted | Admission::Merged => None,
        }
    }

    /// Whether the offered item is now resident.
    #[must_use]
    pub fn is_admitted(&self) -> bool {
        !matches!(self, Admission::Rejected(_))
    }
}

// =============================================================================
// Stats
// =============================================================================

/// Snapshot of a bag's priority distribution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BagStats {
    /// Resident item count
    pub size: usize,
    /// Configured capacity
    pub capacity: usize,
    /// Sum of resident priorities
    pub mass: f64,
    /// Mean priority (0 when empty)
    pub mean: f64,
    /// Population standard deviation of priority (0 when empty)
    pub std_dev: f64,
    /// Lowest resident priority (0 when empty)
    pub min: f64,
    /// Highest resident priority (0 when empty)
    pub max: f64,
}

// =============================================================================
// Bag
// =============================================================================

/// Bounded, priority-biased store of keyed items.
pub struct Bag<V: Item> {
    capacity: usize,
    items: HashMap<V::Key, V>,
    selection: Selection<V::Key>,
    /// Sum of resident priorities, maintained incrementally
    mass: f64,
    merge: Box<dyn MergePolicy>,
    rng: DeterministicRng,
}

impl<V: Item> Bag<V> {
    /// Create an empty bag.
    ///
    /// # Errors
    /// Returns `BagConfigError` if the configuration is invalid.
    pub fn new(config: BagConfig) -> BagResult<Self> {
        config.validate()?;

        tracing::debug!(
            capacity = config.capacity,
            strategy = config.strategy.name(),
            merge = ?config.merge,
            seed = config.seed,
            "bag created"
        );

        Ok(Self {
            capacity: config.capacity,
            items: HashMap::with_capacity(config.capacity.min(BAG_PREALLOC_COUNT_MAX)),
            selection: Selection::from_strategy(config.strategy, config.capacity),
            mass: 0.0,
            merge: config.merge.policy(),
            rng: DeterministicRng::new(config.seed),
        })
    }

    /// Curve-sampled bag with the given exponent.
    ///
    /// # Errors
    /// Returns `BagConfigError` if capacity or exponent is out of range.
    pub fn curve(capacity: usize, exponent: f64) -> BagResult<Self> {
        Self::new(BagConfig::new(capacity).with_strategy(Strategy::Curve { exponent }))
    }

    /// Level-bucketed bag with the given number of levels.
    ///
    /// # Errors
    /// Returns `BagConfigError` if capacity or level count is out of range.
    pub fn level(capacity: usize, levels: usize) -> BagResult<Self> {
        Self::new(BagConfig::new(capacity).with_strategy(Strategy::Level { levels }))
    }

    /// Replace the merge law with a custom policy.
    #[must_use]
    pub fn with_merge_policy(mut self, policy: impl MergePolicy + 'static) -> Self {
        self.merge = Box::new(policy);
        self
    }

    /// Replace the shaping curve of a curve-sampled bag.
    ///
    /// # Errors
    /// Returns `BagConfigError::CurveUnsupported` for a level-bucketed bag.
    pub fn with_curve(mut self, curve: impl BagCurve + 'static) -> BagResult<Self> {
        let name = curve.name();
        if !self.selection.set_curve(Arc::new(curve)) {
            return Err(BagConfigError::CurveUnsupported {
                strategy: self.selection.name(),
            });
        }
        tracing::debug!(curve = name, "bag curve replaced");
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Maximum number of resident items.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of resident items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the bag holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of resident priorities.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// `"curve"` or `"level"`.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.selection.name()
    }

    /// Name of the active merge policy.
    #[must_use]
    pub fn merge_policy_name(&self) -> &'static str {
        self.merge.name()
    }

    /// Name of the shaping curve; `None` for level-bucketed bags.
    #[must_use]
    pub fn curve_name(&self) -> Option<&'static str> {
        self.selection.curve_name()
    }

    /// Whether `key` is resident.
    #[must_use]
    pub fn contains(&self, key: &V::Key) -> bool {
        self.items.contains_key(key)
    }

    /// Look up a resident item without changing anything.
    #[must_use]
    pub fn get(&self, key: &V::Key) -> Option<&V> {
        self.items.get(key)
    }

    /// Lowest resident priority.
    #[must_use]
    pub fn min_priority(&self) -> Option<f64> {
        self.selection.lowest().map(|e| e.priority)
    }

    /// Highest resident priority.
    #[must_use]
    pub fn max_priority(&self) -> Option<f64> {
        self.selection.highest().map(|e| e.priority)
    }

    /// Mean priority clamped to [0.01, 1]; an empty bag reports 0.01.
    #[must_use]
    pub fn priority_mean(&self) -> f64 {
        if self.items.is_empty() {
            return BUDGET_PRIORITY_MEAN_MIN;
        }
        #[allow(clippy::cast_precision_loss)]
        let mean = self.mass / self.items.len() as f64;
        mean.clamp(BUDGET_PRIORITY_MEAN_MIN, BUDGET_VALUE_MAX)
    }

    /// Full-scan statistics over resident priorities.
    #[must_use]
    pub fn stats(&self) -> BagStats {
        let size = self.items.len();
        if size == 0 {
            return BagStats {
                capacity: self.capacity,
                ..BagStats::default()
            };
        }

        let (mut sum, mut min, mut max) = (0.0, f64::INFINITY, f64::NEG_INFINITY);
        for item in self.items.values() {
            let p = item.priority();
            sum += p;
            min = min.min(p);
            max = max.max(p);
        }
        #[allow(clippy::cast_precision_loss)]
        let n = size as f64;
        let mean = sum / n;
        let variance = self
            .items
            .values()
            .map(|item| (item.priority() - mean).powi(2))
            .sum::<f64>()
            / n;

        BagStats {
            size,
            capacity: self.capacity,
            mass: sum,
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }

    /// Resident items in descending priority order.
    ///
    /// The level strategy orders by level, oldest first within a level.
    pub fn iter(&self) -> impl Iterator<Item = &V> + '_ {
        self.selection.iter().map(move |entry| {
            self.items
                .get(&entry.key)
                .unwrap_or_else(|| panic!("bag index references missing key {:?}", entry.key))
        })
    }

    /// Resident keys, same order as [`iter`](Self::iter).
    pub fn keys(&self) -> impl Iterator<Item = &V::Key> + '_ {
        self.selection.iter().map(|entry| &entry.key)
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Offer an item to the bag.
    ///
    /// - Resident key: budgets merge, the incoming item replaces the resident
    ///   one carrying the merged budget.
    /// - New key, room left: stored.
    /// - New key, full, weaker than every resident: rejected unchanged.
    /// - New key, full otherwise: a low-priority resident is evicted.
    ///
    /// # Panics
    /// Panics if the item's budget fails [`Budget::validate`]. Callers admitting
    /// external input check it first.
    pub fn insert(&mut self, mut item: V) -> Admission<V> {
        // Precondition
        assert!(
            item.budget().validate().is_ok(),
            "bag admission requires a well-formed budget, got {}",
            item.budget()
        );

        let key = item.key().clone();

        let admission = if let Some(existing) = self.detach(&key) {
            let merged = self.merge.merge(existing.budget(), item.budget());
            assert!(
                merged.validate().is_ok(),
                "merge policy {} produced malformed budget {}",
                self.merge.name(),
                merged
            );
            *item.budget_mut() = merged;
            self.attach(item);
            Admission::Merged
        } else if self.items.len() < self.capacity {
            self.attach(item);
            Admission::Inserted
        } else {
            if !self.selection.admits(item.priority()) {
                tracing::trace!(key = ?key, priority = item.priority(), "bag rejected item");
                return Admission::Rejected(item);
            }

            let victim_key = self
                .selection
                .victim()
                .map(|e| e.key.clone())
                .expect("a full bag has an eviction victim");
            let victim = self
                .detach(&victim_key)
                .expect("eviction victim is resident");
            self.attach(item);
            tracing::trace!(key = ?key, evicted = ?victim_key, "bag evicted item");
            Admission::Evicted(victim)
        };

        // Postcondition
        assert!(
            self.items.len() <= self.capacity,
            "bag over capacity: {} > {}",
            self.items.len(),
            self.capacity
        );
        self.check_consistency();
        admission
    }

    /// Insert and return whatever overflowed: the evicted resident, or the
    /// item itself if rejected.
    pub fn put(&mut self, item: V) -> Option<V> {
        self.insert(item).into_overflow()
    }

    /// Remove a specific item.
    pub fn remove(&mut self, key: &V::Key) -> Option<V> {
        let item = self.detach(key);
        self.check_consistency();
        item
    }

    /// Remove and return a priority-biased random item.
    pub fn pop(&mut self) -> Option<V> {
        let key = self.selection.select(&mut self.rng)?.clone();
        let item = self.detach(&key);
        assert!(item.is_some(), "selected key {:?} is not resident", key);
        self.check_consistency();
        item
    }

    /// Choose a priority-biased random item without removing it.
    ///
    /// Advances the sampling RNG.
    pub fn peek_next(&mut self) -> Option<&V> {
        let key = self.selection.select(&mut self.rng)?;
        self.items.get(key)
    }

    /// Mutate a resident item in place, re-filing it if its priority moved.
    ///
    /// Returns `false` if `key` is not resident.
    ///
    /// # Panics
    /// Panics if `f` changes the item's key or leaves a malformed budget.
    pub fn update<F>(&mut self, key: &V::Key, f: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        let Some(item) = self.items.get_mut(key) else {
            return false;
        };

        let before = item.priority();
        f(item);
        assert!(item.key() == key, "update changed the key of {:?}", key);
        assert!(
            item.budget().validate().is_ok(),
            "update left a malformed budget on {:?}",
            key
        );
        let after = item.priority();

        if before.total_cmp(&after) != Ordering::Equal {
            let removed = self.selection.remove(key, before);
            assert!(removed, "bag index lost key {:?}", key);
            self.selection.insert(key.clone(), after);
            self.mass += after - before;
        }

        self.check_consistency();
        true
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.selection.clear();
        self.mass = 0.0;
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn attach(&mut self, item: V) {
        let key = item.key().clone();
        let priority = item.priority();
        self.selection.insert(key.clone(), priority);
        self.mass += priority;
        let previous = self.items.insert(key, item);
        assert!(previous.is_none(), "attach over a resident key");
    }

    fn detach(&mut self, key: &V::Key) -> Option<V> {
        let item = self.items.remove(key)?;
        let priority = item.priority();
        let removed = self.selection.remove(key, priority);
        assert!(removed, "bag index lost key {:?}", key);
        self.mass -= priority;
        if self.items.is_empty() {
            self.mass = 0.0;
        }
        Some(item)
    }

    fn check_consistency(&self) {
        #[cfg(any(test, feature = "verify"))]
        self.verify();
    }

    /// Full-scan consistency check.
    ///
    /// Runs after every mutation in tests and under the `verify` feature.
    ///
    /// # Panics
    /// Panics describing the first broken invariant.
    pub fn verify(&self) {
        assert!(
            self.items.len() <= self.capacity,
            "bag over capacity: {} > {}",
            self.items.len(),
            self.capacity
        );
        assert_eq!(
            self.items.len(),
            self.selection.len(),
            "bag index size disagrees with key map size"
        );
        if let Err(msg) = self.selection.check_order() {
            panic!("bag ordering corrupted: {}", msg);
        }

        let mut sum = 0.0;
        for entry in self.selection.iter() {
            let item = self
                .items
                .get(&entry.key)
                .unwrap_or_else(|| panic!("bag index references missing key {:?}", entry.key));
            assert!(
                item.key() == &entry.key,
                "item filed under {:?} reports key {:?}",
                entry.key,
                item.key()
            );
            assert!(
                item.priority().total_cmp(&entry.priority) == Ordering::Equal,
                "stale index priority for {:?}: filed {} actual {}",
                entry.key,
                entry.priority,
                item.priority()
            );
            sum += entry.priority;
        }

        assert!(
            (sum - self.mass).abs() <= BAG_MASS_EPSILON * (1.0 + sum),
            "bag mass drifted: tracked {} actual {}",
            self.mass,
            sum
        );
    }
}

impl<V: Item> fmt::Debug for Bag<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bag")
            .field("strategy", &self.selection.name())
            .field("merge", &self.merge.name())
            .field("capacity", &self.capacity)
            .field("len", &self.items.len())
            .field("mass", &self.mass)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::{MergeKind, PlusMerge};

    #[derive(Debug, Clone, PartialEq)]
    struct Sample {
        name: &'static str,
        budget: Budget,
        tag: u32,
    }

    impl Sample {
        fn new(name: &'static str, priority: f64) -> Self {
            Self {
                name,
                budget: Budget::new(priority, 0.5, 0.5),
                tag: 0,
            }
        }
    }

    impl Item for Sample {
        type Key = &'static str;

        fn key(&self) -> &Self::Key {
            &self.name
        }

        fn budget(&self) -> &Budget {
            &self.budget
        }

        fn budget_mut(&mut self) -> &mut Budget {
            &mut self.budget
        }
    }

    fn strategies() -> [Strategy; 2] {
        [Strategy::curve(), Strategy::Level { levels: 10 }]
    }

    fn bag(capacity: usize, strategy: Strategy) -> Bag<Sample> {
        Bag::new(BagConfig::new(capacity).with_strategy(strategy)).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_config() {
        assert!(Bag::<Sample>::new(BagConfig::new(0)).is_err());
        assert!(Bag::<Sample>::curve(10, 0.0).is_err());
        assert!(Bag::<Sample>::level(10, 0).is_err());
    }

    #[test]
    fn test_full_bag_evicts_then_rejects() {
        let mut bag = bag(3, Strategy::curve());
        for (name, p) in [("A", 0.2), ("B", 0.5), ("C", 0.8)] {
            assert_eq!(bag.insert(Sample::new(name, p)), Admission::Inserted);
        }

        let evicted = bag.put(Sample::new("D", 0.9)).unwrap();
        assert_eq!(evicted.name, "A");

        let rejected = bag.put(Sample::new("E", 0.1)).unwrap();
        assert_eq!(rejected, Sample::new("E", 0.1));

        let mut keys: Vec<_> = bag.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["B", "C", "D"]);
    }

    #[test]
    fn test_equal_priority_is_not_rejected() {
        for strategy in strategies() {
            let mut bag = bag(1, strategy);
            bag.put(Sample::new("a", 0.4));
            let admission = bag.insert(Sample::new("b", 0.4));
            assert!(matches!(admission, Admission::Evicted(ref v) if v.name == "a"));
        }
    }

    #[test]
    fn test_capacity_one_put_and_pop() {
        for strategy in strategies() {
            let mut bag = bag(1, strategy);
            assert!(bag.put(Sample::new("x", 0.7)).is_none());
            assert_eq!(bag.pop().unwrap().name, "x");
            assert!(bag.is_empty());
            assert!(bag.pop().is_none());
        }
    }

    #[test]
    fn test_merge_keeps_incoming_item_with_merged_budget() {
        for strategy in strategies() {
            let mut bag = bag(2, strategy);
            bag.put(Sample::new("k", 0.6));

            let mut newer = Sample::new("k", 0.3);
            newer.tag = 7;
            assert_eq!(bag.insert(newer), Admission::Merged);

            let resident = bag.get(&"k").unwrap();
            assert_eq!(resident.tag, 7);
            assert_eq!(resident.priority(), 0.6);
            assert_eq!(bag.len(), 1);
        }
    }

    #[test]
    fn test_merge_at_capacity_evicts_nothing() {
        let mut bag = bag(2, Strategy::curve());
        bag.put(Sample::new("a", 0.2));
        bag.put(Sample::new("b", 0.9));
        assert!(bag.put(Sample::new("a", 0.1)).is_none());
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_custom_merge_policy() {
        let mut bag = Bag::new(BagConfig::new(4).with_merge(MergeKind::Max))
            .unwrap()
            .with_merge_policy(PlusMerge);
        assert_eq!(bag.merge_policy_name(), "plus");

        bag.put(Sample::new("k", 0.3));
        bag.put(Sample::new("k", 0.4));
        assert!((bag.get(&"k").unwrap().priority() - 0.7).abs() < 1e-12);
        assert!((bag.mass() - 0.7).abs() < 1e-12);
    }

    #[test]
    fn test_remove_and_contains() {
        for strategy in strategies() {
            let mut bag = bag(4, strategy);
            bag.put(Sample::new("a", 0.3));
            bag.put(Sample::new("b", 0.6));

            assert!(bag.contains(&"a"));
            assert_eq!(bag.remove(&"a").unwrap().name, "a");
            assert!(!bag.contains(&"a"));
            assert!(bag.remove(&"a").is_none());
            assert!((bag.mass() - 0.6).abs() < 1e-12);
        }
    }

    #[test]
    fn test_peek_does_not_remove() {
        for strategy in strategies() {
            let mut bag = bag(4, strategy);
            bag.put(Sample::new("a", 0.3));
            bag.put(Sample::new("b", 0.6));

            let name = bag.peek_next().unwrap().name;
            assert!(name == "a" || name == "b");
            assert_eq!(bag.len(), 2);
        }
    }

    #[test]
    fn test_update_refiles_item() {
        for strategy in strategies() {
            let mut bag = bag(4, strategy);
            bag.put(Sample::new("a", 0.2));
            bag.put(Sample::new("b", 0.5));

            assert!(bag.update(&"a", |p| p.budget.set_priority(0.9)));
            assert_eq!(bag.max_priority(), Some(0.9));
            assert_eq!(bag.min_priority(), Some(0.5));
            assert!((bag.mass() - 1.4).abs() < 1e-12);
            assert!(!bag.update(&"missing", |_| {}));
        }
    }

    #[test]
    #[should_panic(expected = "update changed the key")]
    fn test_update_rejects_key_change() {
        let mut bag = bag(4, Strategy::curve());
        bag.put(Sample::new("a", 0.2));
        bag.update(&"a", |p| p.name = "z");
    }

    #[test]
    #[should_panic(expected = "bag admission requires a well-formed budget")]
    fn test_insert_malformed_budget_panics() {
        let mut bag = bag(4, Strategy::curve());
        let mut sample = Sample::new("bad", 0.5);
        sample.budget = Budget::undecided();
        let _ = bag.insert(sample);
    }

    #[test]
    fn test_iter_descending_on_curve() {
        let mut bag = bag(8, Strategy::curve());
        for (name, p) in [("m", 0.5), ("l", 0.1), ("h", 0.9)] {
            bag.put(Sample::new(name, p));
        }
        let names: Vec<_> = bag.iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["h", "m", "l"]);
    }

    #[test]
    fn test_priority_mean_clamped() {
        let mut bag = bag(4, Strategy::curve());
        assert_eq!(bag.priority_mean(), BUDGET_PRIORITY_MEAN_MIN);

        bag.put(Sample::new("z", 0.0));
        assert_eq!(bag.priority_mean(), BUDGET_PRIORITY_MEAN_MIN);

        bag.put(Sample::new("a", 0.8));
        assert!((bag.priority_mean() - 0.4).abs() < 1e-12);
    }

    #[test]
    fn test_stats() {
        let mut bag = bag(8, Strategy::Level { levels: 10 });
        assert_eq!(bag.stats().size, 0);
        assert_eq!(bag.stats().capacity, 8);

        bag.put(Sample::new("a", 0.2));
        bag.put(Sample::new("b", 0.4));
        let stats = bag.stats();
        assert_eq!(stats.size, 2);
        assert!((stats.mass - 0.6).abs() < 1e-12);
        assert!((stats.mean - 0.3).abs() < 1e-12);
        assert!((stats.std_dev - 0.1).abs() < 1e-12);
        assert_eq!(stats.min, 0.2);
        assert_eq!(stats.max, 0.4);
    }

    #[test]
    fn test_clear() {
        let mut bag = bag(4, Strategy::Level { levels: 10 });
        bag.put(Sample::new("a", 0.2));
        bag.clear();
        assert!(bag.is_empty());
        assert_eq!(bag.mass(), 0.0);
        bag.verify();
    }

    #[test]
    fn test_same_seed_same_pops() {
        let drain = |seed: u64| {
            let mut bag: Bag<Sample> = Bag::new(BagConfig::new(16).with_seed(seed)).unwrap();
            for (i, name) in ["a", "b", "c", "d", "e", "f"].into_iter().enumerate() {
                bag.put(Sample::new(name, 0.1 + 0.15 * i as f64));
            }
            std::iter::from_fn(|| bag.pop().map(|p| p.name)).collect::<Vec<_>>()
        };
        assert_eq!(drain(11), drain(11));
    }

    #[test]
    fn test_level_eviction_is_bucket_granular() {
        let mut bag = bag(3, Strategy::Level { levels: 10 });
        bag.put(Sample::new("older", 0.15));
        bag.put(Sample::new("newer", 0.11));
        bag.put(Sample::new("high", 0.9));

        // Same bucket as both low residents, not below the exact minimum
        let admission = bag.insert(Sample::new("incoming", 0.12));
        let evicted = admission.into_overflow().unwrap();
        assert_eq!(evicted.name, "older");

        // Strictly below the exact minimum is still rejected
        let rejected = bag.insert(Sample::new("weak", 0.105));
        assert!(matches!(rejected, Admission::Rejected(_)));
    }

    #[test]
    fn test_level_bag_all_in_one_level() {
        let mut bag = bag(5, Strategy::Level { levels: 100 });
        for (name, p) in [("a", 0.503), ("b", 0.501), ("c", 0.504), ("d", 0.502), ("e", 0.505)] {
            bag.put(Sample::new(name, p));
        }
        assert_eq!(bag.min_priority(), Some(0.501));

        // Lower level: rejected without looking inside the bucket
        assert!(matches!(bag.insert(Sample::new("low", 0.4)), Admission::Rejected(_)));
        // Same level, below the exact minimum
        assert!(matches!(bag.insert(Sample::new("under", 0.5)), Admission::Rejected(_)));

        // Same level, at or above the minimum: the oldest resident leaves
        let evicted = bag.put(Sample::new("f", 0.501)).unwrap();
        assert_eq!(evicted.name, "a");

        // Higher level: admitted outright, next oldest leaves
        let evicted = bag.put(Sample::new("g", 0.9)).unwrap();
        assert_eq!(evicted.name, "b");
        assert_eq!(bag.min_priority(), Some(0.501));

        let mut keys: Vec<_> = bag.keys().copied().collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["c", "d", "e", "f", "g"]);
    }

    #[test]
    fn test_custom_curve_replaces_sampling() {
        let mut bag = bag(4, Strategy::curve()).with_curve(|_x: f64| 1.0).unwrap();
        assert_eq!(bag.curve_name(), Some("custom"));
        for (name, p) in [("low", 0.1), ("mid", 0.5), ("top", 0.9)] {
            bag.put(Sample::new(name, p));
        }

        for _ in 0..20 {
            let item = bag.pop().unwrap();
            assert_eq!(item.name, "top");
            assert!(bag.put(item).is_none());
        }
    }

    #[test]
    fn test_curve_names() {
        let default = bag(4, Strategy::curve());
        assert_eq!(default.curve_name(), Some("power"));

        let fair = default.with_curve(ExponentialCurve::new(5.0)).unwrap();
        assert_eq!(fair.curve_name(), Some("exponential"));

        let level = bag(4, Strategy::Level { levels: 10 });
        assert_eq!(level.curve_name(), None);
        assert!(matches!(
            level.with_curve(PowerCurve::new(2.0)),
            Err(BagConfigError::CurveUnsupported { strategy: "level" })
        ));
    }

    #[test]
    fn test_debug_output() {
        let bag = bag(4, Strategy::curve());
        let text = format!("{:?}", bag);
        assert!(text.contains("curve"));
        assert!(text.contains("capacity: 4"));
    }
}
