//! Two-thread pipeline benchmark over the synthetic event stream.
//!
//! Usage: `mt_bench <num_events> <seed> [queue_capacity]`
//!
//! A small queue (the 4096 default) exercises backpressure and measures
//! tight queue-to-process latency; pass `num_events + 1` to benchmark pure
//! throughput without full-queue stalls.

use std::env;
use std::process::ExitCode;

use tickbook::{
    run_pipeline, BestQuote, EventGenerator, OrderBook, PipelineConfig,
};

const DEFAULT_QUEUE_CAPACITY: usize = 4096;
const WARMUP_EVENTS: usize = 20_000;

fn print_quote(label: &str, quote: BestQuote) {
    if quote.valid {
        println!("{label}: price={}, qty={}", quote.price, quote.qty);
    } else {
        println!("{label}: none");
    }
}

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("usage: mt_bench <num_events> <seed> [queue_capacity]");
        return ExitCode::FAILURE;
    }

    let Ok(num_events) = args[1].parse::<usize>() else {
        eprintln!("invalid num_events: {}", args[1]);
        return ExitCode::FAILURE;
    };
    let Ok(seed) = args[2].parse::<u64>() else {
        eprintln!("invalid seed: {}", args[2]);
        return ExitCode::FAILURE;
    };
    let queue_capacity = match args.get(3) {
        Some(arg) => match arg.parse::<usize>() {
            Ok(capacity) if capacity >= 2 => capacity,
            _ => {
                eprintln!("invalid queue_capacity: {arg}");
                return ExitCode::FAILURE;
            }
        },
        None => DEFAULT_QUEUE_CAPACITY,
    };

    let mut generator = EventGenerator::new(num_events, seed);
    let mut book = OrderBook::new();
    let config = PipelineConfig {
        queue_capacity,
        max_events: num_events,
        warmup_events: WARMUP_EVENTS,
        pin_consumer: true,
    };

    let report = run_pipeline(|| generator.next_event(), &mut book, &config);

    let seconds = report.elapsed.as_secs_f64();
    println!(
        "mt_bench: processed {} events in {seconds:.3} s",
        report.processed
    );
    println!("  throughput: {:.0} events/s", report.throughput);
    if report.processed > 0 {
        println!(
            "  mean:       {:.1} ns/event",
            report.elapsed.as_nanos() as f64 / report.processed as f64
        );
    }

    match report.latency {
        Some(lat) => {
            println!("Latency (enqueue -> processed, {} samples):", lat.samples);
            println!("  p50:   {:6} ns", lat.p50);
            println!("  p90:   {:6} ns", lat.p90);
            println!("  p99:   {:6} ns", lat.p99);
            println!("  p99.9: {:6} ns", lat.p999);
            println!("  min:   {:6} ns", lat.min);
            println!("  max:   {:6} ns", lat.max);
        }
        None => println!("Latency: no samples past warmup ({WARMUP_EVENTS} events)"),
    }

    print_quote("Final best bid", book.best_bid());
    print_quote("Final best ask", book.best_ask());

    ExitCode::SUCCESS
}
