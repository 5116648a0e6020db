//! Effects requested during a cycle, run after its primary work.

use std::collections::VecDeque;
use std::fmt;

use crate::bag::Item;
use crate::constants::CYCLE_DEFERRED_COUNT_MAX;

use super::listener::CycleListener;
use super::store::Store;

type Effect<V, L> = Box<dyn FnOnce(&mut Store<V, L>)>;

/// FIFO of effects drained once per cycle.
pub(crate) struct DeferredQueue<V: Item, L> {
    effects: VecDeque<Effect<V, L>>,
}

impl<V: Item, L: CycleListener<V>> DeferredQueue<V, L> {
    pub(crate) fn new() -> Self {
        Self {
            effects: VecDeque::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.effects.len()
    }

    /// Queue an effect. Returns `false` (dropping it) when the queue is full.
    pub(crate) fn push(&mut self, effect: Effect<V, L>) -> bool {
        if self.effects.len() >= CYCLE_DEFERRED_COUNT_MAX {
            tracing::warn!(
                queued = self.effects.len(),
                max = CYCLE_DEFERRED_COUNT_MAX,
                "deferred queue full, dropping effect"
            );
            return false;
        }
        self.effects.push_back(effect);
        true
    }

    /// Run every queued effect in order. Returns how many ran.
    pub(crate) fn drain(&mut self, store: &mut Store<V, L>) -> usize {
        let mut ran = 0;
        while let Some(effect) = self.effects.pop_front() {
            effect(store);
            ran += 1;
        }
        ran
    }
}

impl<V: Item, L> fmt::Debug for DeferredQueue<V, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeferredQueue")
            .field("len", &self.effects.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::bag::{Bag, BagConfig};
    use crate::budget::Budget;

    #[derive(Debug)]
    struct Cell {
        id: u8,
        budget: Budget,
    }

    impl Item for Cell {
        type Key = u8;

        fn key(&self) -> &u8 {
            &self.id
        }

        fn budget(&self) -> &Budget {
            &self.budget
        }

        fn budget_mut(&mut self) -> &mut Budget {
            &mut self.budget
        }
    }

    #[test]
    fn test_drains_in_fifo_order() {
        let mut store = Store::new(Bag::<Cell>::new(BagConfig::new(4)).unwrap(), ());
        let mut queue = DeferredQueue::new();
        let order = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let order = Rc::clone(&order);
            assert!(queue.push(Box::new(move |_: &mut Store<Cell, ()>| {
                order.borrow_mut().push(i);
            })));
        }
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.drain(&mut store), 3);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn test_effects_see_the_store() {
        let mut store = Store::new(Bag::<Cell>::new(BagConfig::new(4)).unwrap(), ());
        let mut queue = DeferredQueue::new();
        assert!(queue.push(Box::new(|s: &mut Store<Cell, ()>| {
            let _ = s.admit(Cell {
                id: 9,
                budget: Budget::new(0.5, 0.5, 0.5),
            });
        })));

        queue.drain(&mut store);
        assert!(store.get(&9).is_some());
    }

    #[test]
    fn test_full_queue_drops_effect() {
        let mut store = Store::new(Bag::<Cell>::new(BagConfig::new(4)).unwrap(), ());
        let mut queue = DeferredQueue::new();
        for _ in 0..CYCLE_DEFERRED_COUNT_MAX {
            assert!(queue.push(Box::new(|_: &mut Store<Cell, ()>| {})));
        }

        let dropped = Rc::new(RefCell::new(false));
        let flag = Rc::clone(&dropped);
        assert!(!queue.push(Box::new(move |_: &mut Store<Cell, ()>| {
            *flag.borrow_mut() = true;
        })));
        assert_eq!(queue.len(), CYCLE_DEFERRED_COUNT_MAX);

        assert_eq!(queue.drain(&mut store), CYCLE_DEFERRED_COUNT_MAX);
        assert!(!*dropped.borrow());
    }
}
