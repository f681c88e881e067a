//! Replay an event file into a fresh book and print a summary.
//!
//! Usage: `replay <events_file>`

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::process::ExitCode;

use tickbook::{parse_event_line, BestQuote, OrderBook, ReplayStats, Side};

fn print_quote(label: &str, quote: BestQuote) {
    if quote.valid {
        println!("{label}: {} x {}", quote.price, quote.qty);
    } else {
        println!("{label}: none");
    }
}

fn print_summary(stats: &ReplayStats, book: &OrderBook) {
    println!("=== Replay summary ===");
    println!();
    println!("Events ({} applied):", stats.events());
    println!("  ADD    : {}", stats.adds);
    println!("  MARKET : {}", stats.markets);
    println!("  CANCEL : {}", stats.cancels);
    println!();
    println!("Added volume:");
    println!("  Buy  : {}", stats.added_qty_buy);
    println!("  Sell : {}", stats.added_qty_sell);
    println!();
    println!("Aggressive (market) volume:");
    println!(
        "  Buy requested : {}, filled: {}",
        stats.taker_requested_buy, stats.taker_filled_buy
    );
    println!(
        "  Sell requested: {}, filled: {}",
        stats.taker_requested_sell, stats.taker_filled_sell
    );
    println!();
    println!("Aggressive VWAP:");
    match stats.vwap(Side::Buy) {
        Some(v) => println!("  Buy  : {v:.2}"),
        None => println!("  Buy  : n/a"),
    }
    match stats.vwap(Side::Sell) {
        Some(v) => println!("  Sell : {v:.2}"),
        None => println!("  Sell : n/a"),
    }
    println!();
    println!("Market order outcomes:");
    println!("  full fills   : {}", stats.full_fills);
    println!("  partial fills: {}", stats.partial_fills);
    println!("  zero fills   : {}", stats.zero_fills);
    println!();
    println!("Cancels:");
    println!("  success: {}", stats.cancels_ok);
    println!("  fail   : {}", stats.cancels_failed);
    println!();
    println!("Spread (ask - bid):");
    match stats.spread_mean() {
        Some(mean) => {
            println!("  mean : {mean:.2}");
            println!("  min  : {}", stats.spread_min.unwrap_or(0));
            println!("  max  : {}", stats.spread_max.unwrap_or(0));
        }
        None => println!("  not enough data (no simultaneous best bid & ask)"),
    }
    println!();
    println!("Resting orders: {}", book.len());
    print_quote("Final best bid", book.best_bid());
    print_quote("Final best ask", book.best_ask());
}

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: replay <events_file>");
        return ExitCode::FAILURE;
    };

    let file = match File::open(&path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("failed to open {path}: {err}");
            return ExitCode::FAILURE;
        }
    };

    let mut book = OrderBook::new();
    let mut stats = ReplayStats::default();

    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("read error in {path}: {err}");
                return ExitCode::FAILURE;
            }
        };
        if let Some(event) = parse_event_line(&line) {
            stats.apply(&mut book, &event);
        }
    }

    print_summary(&stats, &book);
    ExitCode::SUCCESS
}
