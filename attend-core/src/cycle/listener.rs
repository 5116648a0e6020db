//! Remember/forget notifications and a predicate-keyed secondary index.

use std::collections::HashSet;
use std::fmt;

use crate::bag::Item;

/// Why an item left (or never entered) the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForgetReason {
    /// Displaced from a full bag by a stronger item
    Evicted,
    /// Offered to a full bag and weaker than every resident
    Rejected,
    /// Priority at or below the admission epsilon
    BelowThreshold,
    /// Removed explicitly by key
    Removed,
    /// Budget failed the boundary check after processing
    Malformed,
}

/// Receives every change to the set of resident items.
///
/// Called synchronously from the scheduler, after the bag has settled.
pub trait CycleListener<V: Item> {
    /// `item` is now resident (inserted or merged).
    fn on_remember(&mut self, item: &V) {
        let _ = item;
    }

    /// `item` is not resident.
    fn on_forget(&mut self, item: &V, reason: ForgetReason) {
        let _ = (item, reason);
    }
}

impl<V: Item> CycleListener<V> for () {}

impl<V: Item, A: CycleListener<V>, B: CycleListener<V>> CycleListener<V> for (A, B) {
    fn on_remember(&mut self, item: &V) {
        self.0.on_remember(item);
        self.1.on_remember(item);
    }

    fn on_forget(&mut self, item: &V, reason: ForgetReason) {
        self.0.on_forget(item, reason);
        self.1.on_forget(item, reason);
    }
}

/// Keys of resident items matching a predicate over item content.
pub struct PredicateIndex<V: Item> {
    predicate: Box<dyn Fn(&V) -> bool + Send + Sync>,
    keys: HashSet<V::Key>,
}

impl<V: Item> PredicateIndex<V> {
    /// Index the items for which `predicate` holds.
    pub fn new(predicate: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        Self {
            predicate: Box::new(predicate),
            keys: HashSet::new(),
        }
    }

    /// Whether `key` is indexed.
    #[must_use]
    pub fn contains(&self, key: &V::Key) -> bool {
        self.keys.contains(key)
    }

    /// Number of indexed keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Indexed keys, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &V::Key> + '_ {
        self.keys.iter()
    }
}

impl<V: Item> CycleListener<V> for PredicateIndex<V> {
    fn on_remember(&mut self, item: &V) {
        // A merge can change content, so re-evaluate on every remember
        if (self.predicate)(item) {
            self.keys.insert(item.key().clone());
        } else {
            self.keys.remove(item.key());
        }
    }

    fn on_forget(&mut self, item: &V, _reason: ForgetReason) {
        self.keys.remove(item.key());
    }
}

impl<V: Item> fmt::Debug for PredicateIndex<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredicateIndex")
            .field("len", &self.keys.len())
            .finish_non_exhaustive()
    }
}
