//! Line-oriented event format and replay statistics.
//!
//! The format is comma-separated, one event per line, `#` comments:
//!
//! ```text
//! ADD,BUY,100,10,1
//! ADD,SELL,105,4        # id optional, the book assigns one
//! MKT,BUY,12
//! CANCEL,1
//! ```
//!
//! `MARKET` is accepted for `MKT` and `CXL` for `CANCEL`; sides may be
//! abbreviated `B`/`S`. Tokens are trimmed; malformed lines parse to `None`
//! and replay skips them without failing.

use crate::book::OrderBook;
use crate::event::{Event, EventType};
use crate::types::{BestQuote, Price, Quantity, Side, Trade};

fn parse_side(token: &str) -> Option<Side> {
    match token.to_ascii_uppercase().as_str() {
        "BUY" | "B" => Some(Side::Buy),
        "SELL" | "S" => Some(Side::Sell),
        _ => None,
    }
}

/// Parse one line of the event format. Comments, blank lines and anything
/// malformed yield `None`.
pub fn parse_event_line(line: &str) -> Option<Event> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let mut tokens = trimmed.split(',').map(str::trim);
    match tokens.next()?.to_ascii_uppercase().as_str() {
        "ADD" => {
            let side = parse_side(tokens.next()?)?;
            let price: Price = tokens.next()?.parse().ok()?;
            let qty: Quantity = tokens.next()?.parse().ok()?;
            let id = match tokens.next() {
                Some(token) => token.parse().ok()?,
                None => 0,
            };
            Some(Event::add(side, price, qty, id))
        }
        "MKT" | "MARKET" => {
            let side = parse_side(tokens.next()?)?;
            let qty: Quantity = tokens.next()?.parse().ok()?;
            Some(Event::market(side, qty))
        }
        "CANCEL" | "CXL" => {
            let id = tokens.next()?.parse().ok()?;
            Some(Event::cancel(id))
        }
        _ => None,
    }
}

/// Aggregates gathered while replaying an event stream into a book.
#[derive(Clone, Debug, Default)]
pub struct ReplayStats {
    pub adds: usize,
    pub markets: usize,
    pub cancels: usize,

    pub added_qty_buy: Quantity,
    pub added_qty_sell: Quantity,

    pub taker_requested_buy: Quantity,
    pub taker_requested_sell: Quantity,
    pub taker_filled_buy: Quantity,
    pub taker_filled_sell: Quantity,

    pub full_fills: usize,
    pub partial_fills: usize,
    pub zero_fills: usize,

    pub cancels_ok: usize,
    pub cancels_failed: usize,

    /// Sum of `price * qty` over taker fills, per aggressor side (for VWAP).
    pub notional_buy: f64,
    pub notional_sell: f64,

    pub spread_min: Option<Price>,
    pub spread_max: Option<Price>,
    spread_sum: f64,
    spread_count: usize,
}

impl ReplayStats {
    /// Apply one event to `book` and fold the outcome into the stats.
    pub fn apply(&mut self, book: &mut OrderBook, event: &Event) {
        match event.kind {
            EventType::Add => {
                self.adds += 1;
                match event.side {
                    Side::Buy => self.added_qty_buy += event.qty,
                    Side::Sell => self.added_qty_sell += event.qty,
                }
                let outcome = if event.id != 0 {
                    book.add_limit_with_id(event.id, event.side, event.price, event.qty)
                } else {
                    book.add_limit(event.side, event.price, event.qty)
                };
                self.record_fills(event.side, &outcome.taker.trades);
            }
            EventType::Market => {
                self.markets += 1;
                match event.side {
                    Side::Buy => self.taker_requested_buy += event.qty,
                    Side::Sell => self.taker_requested_sell += event.qty,
                }
                let result = book.market(event.side, event.qty);
                if result.filled == 0 {
                    self.zero_fills += 1;
                } else if result.remaining == 0 {
                    self.full_fills += 1;
                } else {
                    self.partial_fills += 1;
                }
                match event.side {
                    Side::Buy => self.taker_filled_buy += result.filled,
                    Side::Sell => self.taker_filled_sell += result.filled,
                }
                self.record_fills(event.side, &result.trades);
            }
            EventType::Cancel => {
                self.cancels += 1;
                if book.cancel(event.id) {
                    self.cancels_ok += 1;
                } else {
                    self.cancels_failed += 1;
                }
            }
            EventType::End => {}
        }

        self.observe_spread(book.best_bid(), book.best_ask());
    }

    fn record_fills(&mut self, taker_side: Side, trades: &[Trade]) {
        for trade in trades {
            let notional = trade.price as f64 * trade.qty as f64;
            match taker_side {
                Side::Buy => self.notional_buy += notional,
                Side::Sell => self.notional_sell += notional,
            }
        }
    }

    fn observe_spread(&mut self, bid: BestQuote, ask: BestQuote) {
        if !(bid.valid && ask.valid) {
            return;
        }
        let spread = ask.price - bid.price;
        self.spread_min = Some(self.spread_min.map_or(spread, |s| s.min(spread)));
        self.spread_max = Some(self.spread_max.map_or(spread, |s| s.max(spread)));
        self.spread_sum += spread as f64;
        self.spread_count += 1;
    }

    pub fn spread_mean(&self) -> Option<f64> {
        (self.spread_count > 0).then(|| self.spread_sum / self.spread_count as f64)
    }

    /// Volume-weighted average fill price for one aggressor side.
    pub fn vwap(&self, taker_side: Side) -> Option<f64> {
        let (notional, filled) = match taker_side {
            Side::Buy => (self.notional_buy, self.taker_filled_buy),
            Side::Sell => (self.notional_sell, self.taker_filled_sell),
        };
        (filled > 0).then(|| notional / filled as f64)
    }

    pub fn events(&self) -> usize {
        self.adds + self.markets + self.cancels
    }
}

/// Replay a stream of text lines into `book`, skipping anything that does
/// not parse.
pub fn replay_lines<'a>(
    book: &mut OrderBook,
    lines: impl IntoIterator<Item = &'a str>,
) -> ReplayStats {
    let mut stats = ReplayStats::default();
    for line in lines {
        if let Some(event) = parse_event_line(line) {
            stats.apply(book, &event);
        }
    }
    stats
}
