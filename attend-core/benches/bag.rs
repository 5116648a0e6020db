//! Bag Benchmarks
//!
//! Curve against level strategies for the hot operations:
//! - put into a full bag (evict or reject)
//! - put into a full bag whose residents crowd one priority level
//! - pop followed by put-back, as the scheduler does each cycle
//! - a full scheduler cycle
//!
//! Run with: cargo bench --bench bag

use std::time::Duration;

use attend_core::bag::{Bag, BagConfig, Item, Strategy};
use attend_core::budget::Budget;
use attend_core::cycle::{Scheduler, SchedulerConfig};
use attend_core::dst::DeterministicRng;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

#[derive(Debug, Clone)]
struct Concept {
    id: u64,
    budget: Budget,
}

impl Item for Concept {
    type Key = u64;

    fn key(&self) -> &u64 {
        &self.id
    }

    fn budget(&self) -> &Budget {
        &self.budget
    }

    fn budget_mut(&mut self) -> &mut Budget {
        &mut self.budget
    }
}

fn strategies() -> [(&'static str, Strategy); 2] {
    [("curve", Strategy::curve()), ("level", Strategy::level())]
}

fn filled_bag(strategy: Strategy, capacity: usize, rng: &mut DeterministicRng) -> Bag<Concept> {
    let mut bag = Bag::new(BagConfig::new(capacity).with_strategy(strategy)).unwrap();
    for id in 0..capacity as u64 {
        let _ = bag.put(Concept {
            id,
            budget: Budget::new(rng.next_float(), 0.5, 0.1),
        });
    }
    bag
}

// =============================================================================
// Bag Benchmarks
// =============================================================================

fn bench_put_full(c: &mut Criterion) {
    let mut group = c.benchmark_group("bag/put_full");
    group.measurement_time(Duration::from_secs(5));

    for capacity in [100, 1000, 10_000] {
        for (name, strategy) in strategies() {
            let mut rng = DeterministicRng::new(42);
            let mut bag = filled_bag(strategy, capacity, &mut rng);
            let mut next_id = capacity as u64;

            group.bench_with_input(BenchmarkId::new(name, capacity), &capacity, |b, _| {
                b.iter(|| {
                    next_id += 1;
                    black_box(bag.put(Concept {
                        id: next_id,
                        budget: Budget::new(rng.next_float(), 0.5, 0.1),
                    }))
                });
            });
        }
    }
    group.finish();
}

/// Priorities decay toward a shared floor, so one level can hold most of a bag.
fn bench_put_full_one_level(c: &mut Criterion) {
    let mut group = c.benchmark_group("bag/put_full_one_level");
    group.measurement_time(Duration::from_secs(5));

    for capacity in [1000, 10_000, 50_000] {
        for (name, strategy) in strategies() {
            let mut rng = DeterministicRng::new(13);
            let mut bag = Bag::new(BagConfig::new(capacity).with_strategy(strategy)).unwrap();
            for id in 0..capacity as u64 {
                let _ = bag.put(Concept {
                    id,
                    budget: Budget::new(0.5 + rng.next_float() * 0.005, 0.5, 0.1),
                });
            }
            let mut next_id = capacity as u64;

            group.bench_with_input(BenchmarkId::new(name, capacity), &capacity, |b, _| {
                b.iter(|| {
                    next_id += 1;
                    black_box(bag.put(Concept {
                        id: next_id,
                        budget: Budget::new(0.5 + rng.next_float() * 0.005, 0.5, 0.1),
                    }))
                });
            });
        }
    }
    group.finish();
}

fn bench_pop_put_back(c: &mut Criterion) {
    let mut group = c.benchmark_group("bag/pop_put_back");

    for capacity in [100, 1000, 10_000] {
        for (name, strategy) in strategies() {
            let mut rng = DeterministicRng::new(7);
            let mut bag = filled_bag(strategy, capacity, &mut rng);

            group.bench_with_input(BenchmarkId::new(name, capacity), &capacity, |b, _| {
                b.iter(|| {
                    let item = bag.pop().unwrap();
                    black_box(bag.put(item))
                });
            });
        }
    }
    group.finish();
}

// =============================================================================
// Scheduler Benchmarks
// =============================================================================

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("scheduler/cycle");

    for (name, strategy) in strategies() {
        let mut rng = DeterministicRng::new(3);
        let bag = filled_bag(strategy, 1000, &mut rng);
        let mut scheduler = Scheduler::new(
            SchedulerConfig::default().with_pops_per_cycle(8),
            bag,
            (),
        )
        .unwrap();

        group.bench_function(name, |b| {
            b.iter(|| {
                black_box(scheduler.cycle(|item, _ctx| {
                    vec![Concept {
                        id: item.id ^ 1,
                        budget: Budget::new(item.priority() * 0.8, 0.5, 0.1),
                    }]
                }))
            });
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_put_full,
    bench_put_full_one_level,
    bench_pop_put_back,
    bench_cycle
);
criterion_main!(benches);
