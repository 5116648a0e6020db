//! DST Tests for Priority-Biased Sampling
//!
//! TigerStyle: Statistical bounds with wide margins, fixed seeds.

use std::collections::HashMap;

use attend_core::bag::{Bag, BagConfig, Item, Strategy};
use attend_core::budget::Budget;

const DRAWS: usize = 10_000;

#[derive(Debug, Clone)]
struct Token {
    id: u32,
    budget: Budget,
}

impl Item for Token {
    type Key = u32;

    fn key(&self) -> &u32 {
        &self.id
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}

fn token(id: u32, priority: f64) -> Token {
    Token {
        id,
        budget: Budget::new(priority, 0.5, 0.5),
    }
}

/// Pop `DRAWS` times, putting each item straight back, and count picks by key.
fn pop_counts(bag: &mut Bag<Token>) -> HashMap<u32, usize> {
    let mut counts = HashMap::new();
    for _ in 0..DRAWS {
        let item = bag.pop().expect("bag is not empty");
        *counts.entry(item.id).or_insert(0) += 1;
        assert!(bag.put(item).is_none());
    }
    counts
}

// =============================================================================
// Curve Sampling
// =============================================================================

#[test]
fn test_curve_pop_favours_high_priority() {
    let mut bag: Bag<Token> = Bag::curve(10, 6.0).unwrap();
    bag.put(token(1, 0.9));
    bag.put(token(2, 0.1));

    let counts = pop_counts(&mut bag);
    let high = counts.get(&1).copied().unwrap_or(0);

    // Exponent 6 over two entries picks the top one with probability ~0.89
    assert!(
        high * 100 > DRAWS * 60,
        "high-priority item drawn {} of {} times",
        high,
        DRAWS
    );
    assert_eq!(bag.len(), 2);
}

#[test]
fn test_curve_exponent_one_is_uniform() {
    let mut bag: Bag<Token> = Bag::new(
        BagConfig::new(10)
            .with_strategy(Strategy::Curve { exponent: 1.0 })
            .with_seed(99),
    )
    .unwrap();
    bag.put(token(1, 0.9));
    bag.put(token(2, 0.1));

    let counts = pop_counts(&mut bag);
    let high = counts.get(&1).copied().unwrap_or(0);

    assert!(
        (4_500..=5_500).contains(&high),
        "flat curve drew the top item {} of {} times",
        high,
        DRAWS
    );
}

#[test]
fn test_curve_top_beats_bottom_across_ten() {
    let mut bag: Bag<Token> = Bag::curve(10, 6.0).unwrap();
    for id in 0..10_u32 {
        bag.put(token(id, f64::from(id) / 10.0 + 0.05));
    }

    let counts = pop_counts(&mut bag);
    let top = counts.get(&9).copied().unwrap_or(0);
    let bottom = counts.get(&0).copied().unwrap_or(0);

    // Expected shares: top ~0.32, bottom ~0.017
    assert!(top > 5 * bottom, "top {} vs bottom {}", top, bottom);
    assert!(top * 100 > DRAWS * 20);
}

// =============================================================================
// Level Sampling
// =============================================================================

#[test]
fn test_level_pop_favours_high_priority() {
    let mut bag: Bag<Token> = Bag::level(10, 100).unwrap();
    bag.put(token(1, 0.9));
    bag.put(token(2, 0.1));

    let counts = pop_counts(&mut bag);
    let high = counts.get(&1).copied().unwrap_or(0);

    // Level weights 91 against 11
    assert!(
        high * 100 > DRAWS * 60,
        "high-level item drawn {} of {} times",
        high,
        DRAWS
    );
}

#[test]
fn test_level_top_beats_bottom_across_ten() {
    let mut bag: Bag<Token> = Bag::level(10, 100).unwrap();
    for id in 0..10_u32 {
        bag.put(token(id, f64::from(id) / 10.0 + 0.05));
    }

    let counts = pop_counts(&mut bag);
    let top = counts.get(&9).copied().unwrap_or(0);
    let bottom = counts.get(&0).copied().unwrap_or(0);

    // Weights 96 against 6 out of 510
    assert!(top > 5 * bottom, "top {} vs bottom {}", top, bottom);
    assert!(bottom > 0, "bottom level never drawn");
}

#[test]
fn test_every_resident_reachable() {
    for strategy in [Strategy::curve(), Strategy::level()] {
        let mut bag: Bag<Token> =
            Bag::new(BagConfig::new(20).with_strategy(strategy).with_seed(3)).unwrap();
        for id in 0..5_u32 {
            bag.put(token(id, 0.2 * f64::from(id) + 0.1));
        }

        let counts = pop_counts(&mut bag);
        assert_eq!(counts.len(), 5, "{:?} never drew some keys", strategy);
    }
}

// =============================================================================
// Determinism
// =============================================================================

fn pop_sequence(strategy: Strategy, seed: u64) -> Vec<u32> {
    let mut bag: Bag<Token> =
        Bag::new(BagConfig::new(50).with_strategy(strategy).with_seed(seed)).unwrap();
    for id in 0..50_u32 {
        bag.put(token(id, f64::from(id % 17) / 17.0 + 0.01));
    }
    std::iter::from_fn(|| bag.pop().map(|t| t.id)).collect()
}

#[test]
fn test_same_seed_same_pop_order() {
    for strategy in [Strategy::curve(), Strategy::level()] {
        let first = pop_sequence(strategy, 42);
        let second = pop_sequence(strategy, 42);
        assert_eq!(first.len(), 50);
        assert_eq!(first, second);
    }
}

#[test]
fn test_different_seed_different_pop_order() {
    let a = pop_sequence(Strategy::curve(), 1);
    let b = pop_sequence(Strategy::curve(), 2);
    assert_ne!(a, b);
}

#[test]
fn test_peek_does_not_remove() {
    let mut bag: Bag<Token> = Bag::curve(4, 6.0).unwrap();
    bag.put(token(1, 0.5));

    for _ in 0..10 {
        assert_eq!(bag.peek_next().map(|t| t.id), Some(1));
    }
    assert_eq!(bag.len(), 1);
}
