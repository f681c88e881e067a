//! Synthetic event stream for benchmarks and pipeline tests.
//!
//! Deterministic for a given seed: the same `(num_events, seed)` pair always
//! yields the same stream, which is what the determinism and pipeline tests
//! lean on.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::event::Event;
use crate::types::{OrderId, Side};

/// Seeded generator producing the benchmark mix: 60% adds, 30% market
/// orders, 10% cancels of a random live order (adds are forced while no
/// order is live). After `num_events` real events it yields `End` forever.
pub struct EventGenerator {
    num_events: usize,
    generated: usize,
    rng: ChaCha8Rng,
    next_id: OrderId,
    live_ids: Vec<OrderId>,
}

impl EventGenerator {
    pub fn new(num_events: usize, seed: u64) -> Self {
        Self {
            num_events,
            generated: 0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 1,
            live_ids: Vec::with_capacity(num_events),
        }
    }

    pub fn num_events(&self) -> usize {
        self.num_events
    }

    pub fn next_event(&mut self) -> Event {
        if self.generated >= self.num_events {
            return Event::end();
        }

        let roll = self.rng.gen_range(0..100);
        let event = if self.live_ids.is_empty() || roll < 60 {
            self.gen_add()
        } else if roll < 90 {
            Event::market(self.gen_side(), self.rng.gen_range(1..=10))
        } else {
            // Cancel a random live id, at most once each.
            let pick = self.rng.gen_range(0..self.live_ids.len());
            Event::cancel(self.live_ids.swap_remove(pick))
        };

        self.generated += 1;
        event
    }

    fn gen_add(&mut self) -> Event {
        let id = self.next_id;
        self.next_id += 1;
        self.live_ids.push(id);
        Event::add(
            self.gen_side(),
            self.rng.gen_range(95..=105),
            self.rng.gen_range(1..=10),
            id,
        )
    }

    fn gen_side(&mut self) -> Side {
        if self.rng.gen_bool(0.5) {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventType;

    #[test]
    fn same_seed_same_stream() {
        let mut a = EventGenerator::new(500, 42);
        let mut b = EventGenerator::new(500, 42);
        for _ in 0..500 {
            assert_eq!(a.next_event(), b.next_event());
        }
        assert_eq!(a.next_event().kind, EventType::End);
        assert_eq!(b.next_event().kind, EventType::End);
    }

    #[test]
    fn first_event_is_always_an_add() {
        for seed in 0..20 {
            let mut generator = EventGenerator::new(10, seed);
            assert_eq!(generator.next_event().kind, EventType::Add);
        }
    }

    #[test]
    fn end_repeats_after_exhaustion() {
        let mut generator = EventGenerator::new(3, 7);
        for _ in 0..3 {
            assert_ne!(generator.next_event().kind, EventType::End);
        }
        assert_eq!(generator.next_event().kind, EventType::End);
        assert_eq!(generator.next_event().kind, EventType::End);
    }

    #[test]
    fn cancels_target_live_ids_once() {
        let mut generator = EventGenerator::new(10_000, 1234);
        let mut issued = std::collections::HashSet::new();
        let mut cancelled = std::collections::HashSet::new();

        loop {
            let ev = generator.next_event();
            match ev.kind {
                EventType::Add => {
                    assert!(issued.insert(ev.id), "add ids must be unique");
                    assert!(ev.qty >= 1 && ev.qty <= 10);
                    assert!(ev.price >= 95 && ev.price <= 105);
                }
                EventType::Cancel => {
                    assert!(issued.contains(&ev.id), "cancel of unknown id");
                    assert!(cancelled.insert(ev.id), "id cancelled twice");
                }
                EventType::Market => assert!(ev.qty >= 1 && ev.qty <= 10),
                EventType::End => break,
            }
        }
    }
}
