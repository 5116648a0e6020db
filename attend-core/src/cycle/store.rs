//! A bag paired with its listener.
//!
//! Every insertion and removal that goes through a [`Store`] is reported to
//! the listener, so secondary indices never hold keys the bag has dropped.

use crate::bag::{Admission, Bag, Item};

use super::listener::{CycleListener, ForgetReason};

/// Result of offering an item to a [`Store`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admitted {
    /// Stored or merged, nothing displaced
    Remembered,
    /// Stored; a resident was evicted
    Evicted,
    /// Bag full and the item was too weak
    Rejected,
    /// Priority at or below the admission epsilon
    BelowThreshold,
    /// Budget failed the boundary check
    Malformed,
}

/// Bag plus the listener that mirrors its resident set.
#[derive(Debug)]
pub struct Store<V: Item, L> {
    bag: Bag<V>,
    listener: L,
}

impl<V: Item, L: CycleListener<V>> Store<V, L> {
    /// Pair a bag with a listener.
    ///
    /// The listener is not told about items already in `bag`.
    pub fn new(bag: Bag<V>, listener: L) -> Self {
        Self { bag, listener }
    }

    /// The underlying bag.
    #[must_use]
    pub fn bag(&self) -> &Bag<V> {
        &self.bag
    }

    /// The listener.
    #[must_use]
    pub fn listener(&self) -> &L {
        &self.listener
    }

    /// Mutable access to the listener.
    pub fn listener_mut(&mut self) -> &mut L {
        &mut self.listener
    }

    /// Look up a resident item.
    #[must_use]
    pub fn get(&self, key: &V::Key) -> Option<&V> {
        self.bag.get(key)
    }

    /// Admission control, then insertion.
    ///
    /// Malformed budgets are dropped with a warning. Budgets at or below the
    /// priority epsilon are dropped and reported as [`ForgetReason::BelowThreshold`].
    pub fn admit(&mut self, item: V) -> Admitted {
        if let Err(err) = item.budget().validate() {
            tracing::warn!(key = ?item.key(), error = %err, "dropping item with malformed budget");
            return Admitted::Malformed;
        }
        if !item.budget().above_threshold() {
            tracing::trace!(key = ?item.key(), priority = item.priority(), "item below threshold");
            self.forgotten(&item, ForgetReason::BelowThreshold);
            return Admitted::BelowThreshold;
        }
        self.store(item)
    }

    /// Remove an item by key and report it forgotten.
    pub fn remove(&mut self, key: &V::Key) -> Option<V> {
        let item = self.bag.remove(key)?;
        self.listener.on_forget(&item, ForgetReason::Removed);
        Some(item)
    }

    /// Split into bag and listener.
    pub fn into_parts(self) -> (Bag<V>, L) {
        (self.bag, self.listener)
    }

    /// Take an item out for processing. The listener still counts it resident.
    pub(crate) fn take_next(&mut self) -> Option<V> {
        self.bag.pop()
    }

    /// Return a processed item. Only the boundary check applies: low priority
    /// is a signal for the host, not grounds for removal.
    pub(crate) fn restore(&mut self, item: V) -> Admitted {
        if let Err(err) = item.budget().validate() {
            tracing::warn!(key = ?item.key(), error = %err, "processed item left with malformed budget");
            self.forgotten(&item, ForgetReason::Malformed);
            return Admitted::Malformed;
        }
        self.store(item)
    }

    fn store(&mut self, item: V) -> Admitted {
        let key = item.key().clone();
        match self.bag.insert(item) {
            Admission::Inserted | Admission::Merged => {
                self.remembered(&key);
                Admitted::Remembered
            }
            Admission::Evicted(victim) => {
                tracing::debug!(key = ?key, evicted = ?victim.key(), "eviction");
                self.remembered(&key);
                self.forgotten(&victim, ForgetReason::Evicted);
                Admitted::Evicted
            }
            Admission::Rejected(item) => {
                tracing::debug!(key = ?key, priority = item.priority(), "rejection");
                self.forgotten(&item, ForgetReason::Rejected);
                Admitted::Rejected
            }
        }
    }

    fn remembered(&mut self, key: &V::Key) {
        if let Some(resident) = self.bag.get(key) {
            self.listener.on_remember(resident);
        }
    }

    /// Report `item` forgotten unless another item holds its key.
    fn forgotten(&mut self, item: &V, reason: ForgetReason) {
        if !self.bag.contains(item.key()) {
            self.listener.on_forget(item, reason);
        }
    }
}
