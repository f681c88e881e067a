//! Two-thread feed pipeline: producer -> SPSC ring -> matching consumer.
//!
//! The producer stamps every event immediately before enqueue; the consumer
//! records queue-to-process latency per sequence number and applies the
//! event to the book. The book is touched by the consumer only. Shutdown is
//! cooperative: an `End` sentinel in-band plus a `producer_done` flag for
//! the case where the consumer is ahead of the sentinel.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use hdrhistogram::Histogram;

use crate::book::OrderBook;
use crate::event::{Event, EventType, TimedEvent, END_SEQ};
use crate::ring::SpscRing;

/// Pipeline knobs. `queue_capacity` trades latency against full-queue
/// stalls: small rings (4096) for latency experiments, `max_events + 1` for
/// throughput runs that never block the producer. `warmup_events` leading
/// samples are excluded from the latency aggregation.
#[derive(Clone, Copy, Debug)]
pub struct PipelineConfig {
    pub queue_capacity: usize,
    pub max_events: usize,
    pub warmup_events: usize,
    pub pin_consumer: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 4096,
            max_events: 0,
            warmup_events: 0,
            pin_consumer: false,
        }
    }
}

/// Queue-to-process latency percentiles over the post-warmup samples.
#[derive(Clone, Copy, Debug)]
pub struct LatencyStats {
    pub p50: u64,
    pub p90: u64,
    pub p99: u64,
    pub p999: u64,
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub samples: u64,
}

/// What a pipeline run produced.
#[derive(Clone, Debug)]
pub struct PipelineReport {
    pub processed: usize,
    pub elapsed: Duration,
    /// Events per second over the whole run.
    pub throughput: f64,
    /// `None` when warmup swallowed every sample.
    pub latency: Option<LatencyStats>,
}

/// Drive `next_event` through the ring into `book` until the generator
/// yields an `End` event, then join both threads and aggregate latencies.
///
/// The generator runs on the producer thread; the book is mutated
/// exclusively on the consumer thread and handed back at join. Neither
/// thread blocks on anything but a cooperative yield.
pub fn run_pipeline<G>(
    mut next_event: G,
    book: &mut OrderBook,
    config: &PipelineConfig,
) -> PipelineReport
where
    G: FnMut() -> Event + Send,
{
    let ring = SpscRing::<TimedEvent>::new(config.queue_capacity.max(2));
    let producer_done = AtomicBool::new(false);
    let processed = AtomicUsize::new(0);
    let mut latencies = vec![0u64; config.max_events];

    let start = Instant::now();

    thread::scope(|s| {
        let ring = &ring;
        let producer_done = &producer_done;
        let processed = &processed;
        let latencies = &mut latencies;
        let pin_consumer = config.pin_consumer;

        s.spawn(move || {
            let mut seq: u64 = 0;
            loop {
                let event = next_event();
                let is_end = event.kind == EventType::End;
                let timed_seq = if is_end {
                    END_SEQ
                } else {
                    let current = seq;
                    seq += 1;
                    current
                };

                let mut timed = TimedEvent { event, seq: timed_seq, enqueue_ts: Instant::now() };
                loop {
                    match ring.push(timed) {
                        Ok(()) => break,
                        Err(back) => {
                            timed = back;
                            thread::yield_now();
                        }
                    }
                }

                if is_end {
                    break;
                }
            }
            producer_done.store(true, Ordering::Release);
        });

        s.spawn(move || {
            if pin_consumer {
                pin_to_last_core();
            }

            loop {
                let Some(timed) = ring.pop() else {
                    if producer_done.load(Ordering::Acquire) && ring.is_empty() {
                        break;
                    }
                    thread::yield_now();
                    continue;
                };

                if timed.event.kind == EventType::End {
                    break;
                }

                let latency_ns = timed.enqueue_ts.elapsed().as_nanos() as u64;
                if let Some(slot) = latencies.get_mut(timed.seq as usize) {
                    *slot = latency_ns;
                }

                let ev = timed.event;
                match ev.kind {
                    EventType::Add => {
                        book.add_limit_with_id(ev.id, ev.side, ev.price, ev.qty);
                    }
                    EventType::Market => {
                        book.market(ev.side, ev.qty);
                    }
                    EventType::Cancel => {
                        book.cancel(ev.id);
                    }
                    EventType::End => {}
                }

                processed.fetch_add(1, Ordering::Relaxed);
            }
        });
    });

    let elapsed = start.elapsed();
    let processed = processed.load(Ordering::Relaxed);
    let throughput = if elapsed.as_secs_f64() > 0.0 {
        processed as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    let recorded = processed.min(latencies.len());
    let latency = summarize(&latencies[..recorded], config.warmup_events);

    PipelineReport { processed, elapsed, throughput, latency }
}

fn summarize(samples: &[u64], warmup: usize) -> Option<LatencyStats> {
    if warmup >= samples.len() {
        return None;
    }
    let Ok(mut histogram) = Histogram::<u64>::new(3) else {
        return None;
    };
    for &ns in &samples[warmup..] {
        let _ = histogram.record(ns.max(1));
    }
    if histogram.is_empty() {
        return None;
    }
    Some(LatencyStats {
        p50: histogram.value_at_quantile(0.50),
        p90: histogram.value_at_quantile(0.90),
        p99: histogram.value_at_quantile(0.99),
        p999: histogram.value_at_quantile(0.999),
        min: histogram.min(),
        max: histogram.max(),
        mean: histogram.mean(),
        samples: histogram.len(),
    })
}

/// Pin the calling thread to the last core; typically the quietest one.
fn pin_to_last_core() {
    if let Some(core_ids) = core_affinity::get_core_ids() {
        if let Some(last_core) = core_ids.last() {
            core_affinity::set_for_current(*last_core);
        }
    }
}
