//! Strategy dispatch over the two ordering structures.
//!
//! A closed set of variants, matched directly on the hot path.

use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use super::config::Strategy;
use super::curve::{BagCurve, CurveIndex};
use super::level::LevelIndex;
use super::Entry;
use crate::constants::BAG_PREALLOC_COUNT_MAX;
use crate::dst::DeterministicRng;

#[derive(Debug, Clone)]
pub(crate) enum Selection<K> {
    Curve(CurveIndex<K>),
    Level(LevelIndex<K>),
}

impl<K: Eq + Hash + Clone + Debug> Selection<K> {
    pub(crate) fn from_strategy(strategy: Strategy, capacity: usize) -> Self {
        match strategy {
            Strategy::Curve { exponent } => Selection::Curve(CurveIndex::new(
                exponent,
                capacity.min(BAG_PREALLOC_COUNT_MAX),
            )),
            Strategy::Level { levels } => Selection::Level(LevelIndex::new(levels)),
        }
    }

    pub(crate) fn name(&self) -> &'static str {
        match self {
            Selection::Curve(_) => "curve",
            Selection::Level(_) => "level",
        }
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            Selection::Curve(c) => c.len(),
            Selection::Level(l) => l.len(),
        }
    }

    pub(crate) fn insert(&mut self, key: K, priority: f64) {
        match self {
            Selection::Curve(c) => c.insert(key, priority),
            Selection::Level(l) => l.insert(key, priority),
        }
    }

    pub(crate) fn remove(&mut self, key: &K, priority: f64) -> bool {
        match self {
            Selection::Curve(c) => c.remove(key, priority),
            Selection::Level(l) => l.remove(key, priority),
        }
    }

    pub(crate) fn select(&self, rng: &mut DeterministicRng) -> Option<&K> {
        match self {
            Selection::Curve(c) => c.select(rng),
            Selection::Level(l) => l.select(rng),
        }
    }

    /// Swap the shaping curve. Returns `false` for strategies without one.
    pub(crate) fn set_curve(&mut self, curve: Arc<dyn BagCurve>) -> bool {
        match self {
            Selection::Curve(c) => {
                c.set_curve(curve);
                true
            }
            Selection::Level(_) => false,
        }
    }

    pub(crate) fn curve_name(&self) -> Option<&'static str> {
        match self {
            Selection::Curve(c) => Some(c.curve_name()),
            Selection::Level(_) => None,
        }
    }

    /// Whether a new key at `priority` may displace a resident of a full bag.
    /// Exact: `false` only when it is below every resident.
    pub(crate) fn admits(&self, priority: f64) -> bool {
        match self {
            Selection::Curve(c) => c.admits(priority),
            Selection::Level(l) => l.admits(priority),
        }
    }

    /// Entry to drop when a new key arrives at a full bag.
    pub(crate) fn victim(&self) -> Option<&Entry<K>> {
        match self {
            Selection::Curve(c) => c.lowest(),
            Selection::Level(l) => l.victim(),
        }
    }

    pub(crate) fn lowest(&self) -> Option<&Entry<K>> {
        match self {
            Selection::Curve(c) => c.lowest(),
            Selection::Level(l) => l.lowest(),
        }
    }

    pub(crate) fn highest(&self) -> Option<&Entry<K>> {
        match self {
            Selection::Curve(c) => c.highest(),
            Selection::Level(l) => l.highest(),
        }
    }

    /// Entries in descending priority order (level order for buckets).
    pub(crate) fn iter(&self) -> Box<dyn Iterator<Item = &Entry<K>> + '_> {
        match self {
            Selection::Curve(c) => Box::new(c.iter()),
            Selection::Level(l) => Box::new(l.iter()),
        }
    }

    pub(crate) fn clear(&mut self) {
        match self {
            Selection::Curve(c) => c.clear(),
            Selection::Level(l) => l.clear(),
        }
    }

    pub(crate) fn check_order(&self) -> Result<(), String> {
        match self {
            Selection::Curve(c) => c.check_order(),
            Selection::Level(l) => l.check_order(),
        }
    }
}
