//! Curve-sampled ordering: one array sorted ascending by priority.
//!
//! Sampling draws `x` uniformly from [0, 1), shapes it through a [`BagCurve`]
//! and takes index `floor(y * len)`. Curves that rise quickly push draws toward
//! the top of the array, where the high priorities sit.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use super::Entry;
use crate::dst::DeterministicRng;

// =============================================================================
// Curves
// =============================================================================

/// Maps a uniform draw in [0, 1) onto a position in [0, 1] of the sorted array.
///
/// Implemented for any `Fn(f64) -> f64 + Send + Sync`. Output outside [0, 1]
/// is clamped to the array bounds.
pub trait BagCurve: Send + Sync {
    /// Shape the draw `x`.
    fn shape(&self, x: f64) -> f64;

    /// Short name for logs.
    fn name(&self) -> &'static str {
        "custom"
    }
}

impl<F> BagCurve for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn shape(&self, x: f64) -> f64 {
        self(x)
    }
}

/// `y = 1 - (1 - x)^exponent`. Exponent 1 samples uniformly by rank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerCurve {
    exponent: f64,
}

impl PowerCurve {
    /// Power curve with the given exponent.
    ///
    /// # Panics
    /// Panics if `exponent` is not finite or below 1.
    #[must_use]
    pub fn new(exponent: f64) -> Self {
        assert!(
            exponent.is_finite() && exponent >= 1.0,
            "curve exponent must be finite and >= 1, got {}",
            exponent
        );
        Self { exponent }
    }

    /// The configured exponent.
    #[must_use]
    pub fn exponent(&self) -> f64 {
        self.exponent
    }
}

impl BagCurve for PowerCurve {
    fn shape(&self, x: f64) -> f64 {
        1.0 - (1.0 - x).powf(self.exponent)
    }

    fn name(&self) -> &'static str {
        "power"
    }
}

/// `y = 1 - e^(-rate * x)`, which approximates priority-proportional picks.
///
/// The curve never reaches 1, so with a small rate the top of a long array is
/// sampled less than its priority suggests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExponentialCurve {
    rate: f64,
}

impl ExponentialCurve {
    /// Exponential curve rising at `rate`.
    ///
    /// # Panics
    /// Panics if `rate` is not finite and positive.
    #[must_use]
    pub fn new(rate: f64) -> Self {
        assert!(
            rate.is_finite() && rate > 0.0,
            "curve rate must be finite and > 0, got {}",
            rate
        );
        Self { rate }
    }
}

impl BagCurve for ExponentialCurve {
    fn shape(&self, x: f64) -> f64 {
        1.0 - (-self.rate * x).exp()
    }

    fn name(&self) -> &'static str {
        "exponential"
    }
}

/// Index into an array of `len` entries for the shaped draw `y`.
fn index_for(y: f64, len: usize) -> usize {
    assert!(len > 0, "cannot pick from an empty array");

    // Saturating cast: NaN and negatives land on 0, overshoot on the top
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let raw = (y * len as f64).floor().max(0.0) as usize;
    raw.min(len - 1)
}

// =============================================================================
// CurveIndex
// =============================================================================

/// Sorted array of `(priority, key)` entries.
#[derive(Clone)]
pub(crate) struct CurveIndex<K> {
    entries: Vec<Entry<K>>,
    curve: Arc<dyn BagCurve>,
}

impl<K: Eq + Clone + fmt::Debug> CurveIndex<K> {
    pub(crate) fn new(exponent: f64, capacity_hint: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity_hint),
            curve: Arc::new(PowerCurve::new(exponent)),
        }
    }

    pub(crate) fn set_curve(&mut self, curve: Arc<dyn BagCurve>) {
        self.curve = curve;
    }

    pub(crate) fn curve_name(&self) -> &'static str {
        self.curve.name()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Insert after any entries of equal priority.
    pub(crate) fn insert(&mut self, key: K, priority: f64) {
        let at = self
            .entries
            .partition_point(|e| e.priority.total_cmp(&priority) != Ordering::Greater);
        self.entries.insert(at, Entry { key, priority });
    }

    /// Remove `key`, which must currently sit at `priority`.
    pub(crate) fn remove(&mut self, key: &K, priority: f64) -> bool {
        let start = self
            .entries
            .partition_point(|e| e.priority.total_cmp(&priority) == Ordering::Less);

        let found = self.entries[start..]
            .iter()
            .take_while(|e| e.priority.total_cmp(&priority) == Ordering::Equal)
            .position(|e| e.key == *key);

        match found {
            Some(offset) => {
                self.entries.remove(start + offset);
                true
            }
            None => false,
        }
    }

    pub(crate) fn select(&self, rng: &mut DeterministicRng) -> Option<&K> {
        if self.entries.is_empty() {
            return None;
        }
        let y = self.curve.shape(rng.next_float());
        Some(&self.entries[index_for(y, self.entries.len())].key)
    }

    /// Whether a new key at `priority` displaces a resident of a full bag.
    pub(crate) fn admits(&self, priority: f64) -> bool {
        self.lowest().map_or(true, |e| priority >= e.priority)
    }

    /// Lowest-priority entry; the eviction victim.
    pub(crate) fn lowest(&self) -> Option<&Entry<K>> {
        self.entries.first()
    }

    pub(crate) fn highest(&self) -> Option<&Entry<K>> {
        self.entries.last()
    }

    /// Entries from highest to lowest priority.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Entry<K>> + '_ {
        self.entries.iter().rev()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn check_order(&self) -> Result<(), String> {
        for (i, pair) in self.entries.windows(2).enumerate() {
            if pair[0].priority.total_cmp(&pair[1].priority) == Ordering::Greater {
                return Err(format!(
                    "curve entries out of order at {}: {} > {}",
                    i, pair[0].priority, pair[1].priority
                ));
            }
        }
        Ok(())
    }
}

impl<K> fmt::Debug for CurveIndex<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurveIndex")
            .field("len", &self.entries.len())
            .field("curve", &self.curve.name())
            .finish()
    }
}
