//! Level-bucketed ordering.
//!
//! Priority in [0, 1] is quantised into `levels` FIFO buckets. Sampling picks a
//! non-empty level with probability proportional to `level + 1` and takes the
//! oldest entry there. Eviction takes the oldest entry of the lowest non-empty
//! level, so the victim is minimal only to bucket granularity.
//!
//! Every operation is O(1) amortized in the bucket size, plus a walk over the
//! fixed number of levels. Removal by key leaves a tombstone in the bucket;
//! tombstones are trimmed from the front as they surface and compacted away
//! once they outnumber live entries. Each bucket caches its lowest entry and
//! rescans only after that entry leaves.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

use super::Entry;
use crate::constants::BAG_LEVEL_TOMBSTONES_COUNT_MIN;
use crate::dst::DeterministicRng;

// =============================================================================
// Bucket
// =============================================================================

#[derive(Debug, Clone)]
struct Bucket<K> {
    /// Entries oldest first; `None` marks a removed entry
    slots: VecDeque<Option<Entry<K>>>,
    /// Sequence number of `slots[0]`
    head: u64,
    live: usize,
    /// Sequence of the lowest live entry, unknown after it leaves
    min: Cell<Option<u64>>,
}

impl<K> Bucket<K> {
    fn new() -> Self {
        Self {
            slots: VecDeque::new(),
            head: 0,
            live: 0,
            min: Cell::new(None),
        }
    }

    fn is_empty(&self) -> bool {
        self.live == 0
    }

    fn tombstones(&self) -> usize {
        self.slots.len() - self.live
    }

    fn offset(&self, seq: u64) -> Option<usize> {
        usize::try_from(seq.checked_sub(self.head)?).ok()
    }

    fn slot(&self, seq: u64) -> Option<&Entry<K>> {
        self.slots.get(self.offset(seq)?)?.as_ref()
    }

    /// Oldest live entry. The front slot is never a tombstone.
    fn front(&self) -> Option<&Entry<K>> {
        self.slots.front().and_then(Option::as_ref)
    }

    fn push(&mut self, entry: Entry<K>) -> u64 {
        let seq = self.head + self.slots.len() as u64;
        let new_min = match self.min.get() {
            Some(min) => self.slot(min).map_or(false, |m| entry.priority < m.priority),
            None => self.live == 0,
        };
        if new_min {
            self.min.set(Some(seq));
        }
        self.slots.push_back(Some(entry));
        self.live += 1;
        seq
    }

    fn take(&mut self, seq: u64) -> Option<Entry<K>> {
        let offset = self.offset(seq)?;
        let entry = self.slots.get_mut(offset)?.take()?;
        self.live -= 1;
        if self.min.get() == Some(seq) {
            self.min.set(None);
        }
        while matches!(self.slots.front(), Some(None)) {
            self.slots.pop_front();
            self.head += 1;
        }
        Some(entry)
    }

    fn needs_compaction(&self) -> bool {
        let dead = self.tombstones();
        dead >= BAG_LEVEL_TOMBSTONES_COUNT_MIN && dead > self.live
    }

    /// Drop interior tombstones. Live entries are renumbered from `head`.
    fn compact(&mut self) {
        self.slots.retain(Option::is_some);
        self.min.set(None);
    }

    fn lowest(&self) -> Option<&Entry<K>> {
        if let Some(entry) = self.min.get().and_then(|seq| self.slot(seq)) {
            return Some(entry);
        }
        let (offset, entry) = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|e| (i, e)))
            .min_by(|a, b| a.1.priority.total_cmp(&b.1.priority))?;
        self.min.set(Some(self.head + offset as u64));
        Some(entry)
    }

    fn highest(&self) -> Option<&Entry<K>> {
        self.iter().max_by(|a, b| a.priority.total_cmp(&b.priority))
    }

    fn iter(&self) -> impl Iterator<Item = &Entry<K>> + '_ {
        self.slots.iter().flatten()
    }
}

// =============================================================================
// LevelIndex
// =============================================================================

#[derive(Debug, Clone)]
pub(crate) struct LevelIndex<K> {
    levels: Vec<Bucket<K>>,
    /// Key to `(level, sequence)`
    positions: HashMap<K, (usize, u64)>,
    /// Sum of `level + 1` over non-empty levels
    weight: usize,
}

impl<K: Eq + Hash + Clone + Debug> LevelIndex<K> {
    pub(crate) fn new(levels: usize) -> Self {
        assert!(levels > 0, "level count must be > 0");
        Self {
            levels: (0..levels).map(|_| Bucket::new()).collect(),
            positions: HashMap::new(),
            weight: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.positions.len()
    }

    /// Bucket for a priority: `min(floor(p * levels), levels - 1)`.
    pub(crate) fn level_of(&self, priority: f64) -> usize {
        let n = self.levels.len();
        #[allow(
            clippy::cast_precision_loss,
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss
        )]
        let raw = (priority * n as f64).floor().max(0.0) as usize;
        raw.min(n - 1)
    }

    pub(crate) fn insert(&mut self, key: K, priority: f64) {
        let level = self.level_of(priority);
        let bucket = &mut self.levels[level];
        if bucket.is_empty() {
            self.weight += level + 1;
        }
        let seq = bucket.push(Entry {
            key: key.clone(),
            priority,
        });
        let previous = self.positions.insert(key, (level, seq));
        assert!(previous.is_none(), "level index already holds the key");
    }

    /// Remove `key`, which must currently sit at the level of `priority`.
    pub(crate) fn remove(&mut self, key: &K, priority: f64) -> bool {
        let Some(&(level, seq)) = self.positions.get(key) else {
            return false;
        };
        if level != self.level_of(priority) {
            return false;
        }

        let taken = self.levels[level].take(seq);
        assert!(taken.is_some(), "position of {:?} points at a tombstone", key);
        self.positions.remove(key);

        if self.levels[level].is_empty() {
            self.weight -= level + 1;
        } else if self.levels[level].needs_compaction() {
            self.compact(level);
        }
        true
    }

    fn compact(&mut self, level: usize) {
        let bucket = &mut self.levels[level];
        bucket.compact();
        for (offset, entry) in bucket.slots.iter().flatten().enumerate() {
            if let Some(position) = self.positions.get_mut(&entry.key) {
                position.1 = bucket.head + offset as u64;
            }
        }
    }

    fn lowest_level(&self) -> Option<usize> {
        self.levels.iter().position(|b| !b.is_empty())
    }

    fn highest_level(&self) -> Option<usize> {
        self.levels.iter().rposition(|b| !b.is_empty())
    }

    pub(crate) fn select(&self, rng: &mut DeterministicRng) -> Option<&K> {
        let top = self.highest_level()?;

        #[allow(clippy::cast_precision_loss)]
        let mut remaining = rng.next_float() * self.weight as f64;
        for (level, bucket) in self.levels.iter().enumerate().rev() {
            if bucket.is_empty() {
                continue;
            }
            #[allow(clippy::cast_precision_loss)]
            let w = (level + 1) as f64;
            if remaining < w {
                return bucket.front().map(|e| &e.key);
            }
            remaining -= w;
        }

        // Rounding left a sliver past the last level
        self.levels[top].front().map(|e| &e.key)
    }

    /// Whether a new key at `priority` may displace a resident.
    ///
    /// Only a priority landing in the lowest non-empty level needs the exact
    /// minimum; any other level orders it against every resident at once.
    pub(crate) fn admits(&self, priority: f64) -> bool {
        let Some(low) = self.lowest_level() else {
            return true;
        };
        match self.level_of(priority).cmp(&low) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => self.levels[low]
                .lowest()
                .map_or(true, |e| priority >= e.priority),
        }
    }

    /// Oldest entry of the lowest non-empty level; the eviction victim.
    pub(crate) fn victim(&self) -> Option<&Entry<K>> {
        self.levels[self.lowest_level()?].front()
    }

    /// Exact minimum, cached per level.
    pub(crate) fn lowest(&self) -> Option<&Entry<K>> {
        self.levels[self.lowest_level()?].lowest()
    }

    /// Exact maximum: scans the highest non-empty level.
    pub(crate) fn highest(&self) -> Option<&Entry<K>> {
        self.levels[self.highest_level()?].highest()
    }

    /// Entries from the top level down, oldest first within a level.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entry<K>> + '_ {
        self.levels.iter().rev().flat_map(Bucket::iter)
    }

    pub(crate) fn clear(&mut self) {
        for bucket in &mut self.levels {
            *bucket = Bucket::new();
        }
        self.positions.clear();
        self.weight = 0;
    }

    pub(crate) fn check_order(&self) -> Result<(), String> {
        let mut count = 0;
        let mut weight = 0;
        for (level, bucket) in self.levels.iter().enumerate() {
            if !bucket.is_empty() {
                weight += level + 1;
            }
            if matches!(bucket.slots.front(), Some(None)) {
                return Err(format!("level {} starts with a tombstone", level));
            }

            let mut live = 0;
            for (offset, slot) in bucket.slots.iter().enumerate() {
                let Some(entry) = slot else {
                    continue;
                };
                let expected = self.level_of(entry.priority);
                if expected != level {
                    return Err(format!(
                        "entry {:?} with priority {} filed at level {} instead of {}",
                        entry.key, entry.priority, level, expected
                    ));
                }
                let seq = bucket.head + offset as u64;
                if self.positions.get(&entry.key) != Some(&(level, seq)) {
                    return Err(format!(
                        "entry {:?} at level {} slot {} disagrees with its position {:?}",
                        entry.key,
                        level,
                        seq,
                        self.positions.get(&entry.key)
                    ));
                }
                live += 1;
            }
            if live != bucket.live {
                return Err(format!(
                    "level {} holds {} entries, tracked {}",
                    level, live, bucket.live
                ));
            }

            if let Some(seq) = bucket.min.get() {
                let cached = bucket
                    .slot(seq)
                    .ok_or_else(|| format!("level {} caches a removed minimum", level))?;
                let actual = bucket.iter().map(|e| e.priority).fold(f64::INFINITY, f64::min);
                if cached.priority.total_cmp(&actual) != Ordering::Equal {
                    return Err(format!(
                        "level {} caches minimum {} but holds {}",
                        level, cached.priority, actual
                    ));
                }
            }
            count += live;
        }
        if count != self.positions.len() {
            return Err(format!(
                "level count {} disagrees with {} positions",
                count,
                self.positions.len()
            ));
        }
        if weight != self.weight {
            return Err(format!(
                "level weight {} disagrees with tracked {}",
                weight, self.weight
            ));
        }
        Ok(())
    }
}
