//! Cross-thread tests: ring FIFO guarantees and whole-pipeline runs.

use std::thread;
use std::time::Instant;

use tickbook::{
    run_pipeline, Event, EventGenerator, EventType, OrderBook, PipelineConfig, Side, SpscRing,
    TimedEvent,
};

#[test]
fn ring_round_trip_preserves_order() {
    const COUNT: u64 = 200_000;
    let ring = SpscRing::<TimedEvent>::new(1024);

    thread::scope(|s| {
        let ring = &ring;

        s.spawn(move || {
            for seq in 0..COUNT {
                let mut timed = TimedEvent {
                    event: Event::add(Side::Buy, 100, 1, seq + 1),
                    seq,
                    enqueue_ts: Instant::now(),
                };
                loop {
                    match ring.push(timed) {
                        Ok(()) => break,
                        Err(back) => {
                            timed = back;
                            thread::yield_now();
                        }
                    }
                }
            }
        });

        s.spawn(move || {
            let mut expected = 0u64;
            while expected < COUNT {
                let Some(timed) = ring.pop() else {
                    thread::yield_now();
                    continue;
                };
                assert_eq!(timed.seq, expected, "sequence gap or reorder");
                expected += 1;
            }
            assert_eq!(expected, COUNT);
        });
    });

    assert!(ring.is_empty());
}

#[test]
fn ring_round_trip_under_contention() {
    // A tiny ring forces constant full/empty transitions on both sides.
    const COUNT: u64 = 50_000;
    let ring = SpscRing::<u64>::new(2);

    thread::scope(|s| {
        let ring = &ring;

        s.spawn(move || {
            for value in 0..COUNT {
                let mut v = value;
                loop {
                    match ring.push(v) {
                        Ok(()) => break,
                        Err(back) => {
                            v = back;
                            thread::yield_now();
                        }
                    }
                }
            }
        });

        let consumer = s.spawn(move || {
            let mut popped = Vec::with_capacity(COUNT as usize);
            while popped.len() < COUNT as usize {
                match ring.pop() {
                    Some(value) => popped.push(value),
                    None => thread::yield_now(),
                }
            }
            popped
        });

        let popped = consumer.join().expect("consumer thread panicked");
        assert_eq!(popped.len(), COUNT as usize);
        for (i, &value) in popped.iter().enumerate() {
            assert_eq!(value, i as u64);
        }
    });
}

#[test]
fn pipeline_processes_every_event() {
    const COUNT: usize = 50_000;
    const SEED: u64 = 9;

    let mut generator = EventGenerator::new(COUNT, SEED);
    let mut book = OrderBook::new();
    let config = PipelineConfig {
        queue_capacity: 4096,
        max_events: COUNT,
        warmup_events: 1_000,
        pin_consumer: false,
    };

    let report = run_pipeline(|| generator.next_event(), &mut book, &config);

    assert_eq!(report.processed, COUNT);
    assert!(report.throughput > 0.0);

    let latency = report.latency.expect("should have post-warmup samples");
    assert_eq!(latency.samples, (COUNT - 1_000) as u64);
    assert!(latency.p50 <= latency.p99);
    assert!(latency.p99 <= latency.max);
}

#[test]
fn pipeline_equals_serial_replay() {
    // The pipeline must apply events in exactly the published order, so a
    // threaded run and a plain serial run of the same stream end identical.
    const COUNT: usize = 30_000;
    const SEED: u64 = 1234;

    let mut serial_book = OrderBook::new();
    let mut generator = EventGenerator::new(COUNT, SEED);
    loop {
        let event = generator.next_event();
        match event.kind {
            EventType::Add => {
                serial_book.add_limit_with_id(event.id, event.side, event.price, event.qty);
            }
            EventType::Market => {
                serial_book.market(event.side, event.qty);
            }
            EventType::Cancel => {
                serial_book.cancel(event.id);
            }
            EventType::End => break,
        }
    }

    let mut piped_book = OrderBook::new();
    let mut generator = EventGenerator::new(COUNT, SEED);
    let config = PipelineConfig {
        queue_capacity: 512, // small on purpose: exercise backpressure
        max_events: COUNT,
        warmup_events: 0,
        pin_consumer: false,
    };
    let report = run_pipeline(|| generator.next_event(), &mut piped_book, &config);

    assert_eq!(report.processed, COUNT);
    assert_eq!(piped_book.best_bid(), serial_book.best_bid());
    assert_eq!(piped_book.best_ask(), serial_book.best_ask());
    assert_eq!(piped_book.len(), serial_book.len());
}

#[test]
fn pipeline_with_huge_queue_never_stalls_producer() {
    const COUNT: usize = 10_000;

    let mut generator = EventGenerator::new(COUNT, 5);
    let mut book = OrderBook::new();
    let config = PipelineConfig {
        queue_capacity: COUNT + 1,
        max_events: COUNT,
        warmup_events: 0,
        pin_consumer: false,
    };

    let report = run_pipeline(|| generator.next_event(), &mut book, &config);
    assert_eq!(report.processed, COUNT);
}
