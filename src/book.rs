//! The central limit order book and its matching routine.
//!
//! Two ordered price maps (bids and asks), a dense order pool and an
//! `OrderId -> slot` index. The leading level is the best price on each
//! side; within a level, index order is strict arrival order. A single
//! predicate-parameterized matcher serves both market orders and the taker
//! pass of a crossing limit, so the correctness-critical walk exists once.

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use crate::pool::{Order, OrderPool, SlotIndex};
use crate::types::{
    BestQuote, LimitOutcome, MatchResult, OrderId, Price, Quantity, Side, Trade, NO_ORDER_ID,
};

/// All orders resting at one price, oldest first. Entries may be tombstones
/// (slot no longer active); those are skipped and compacted away during the
/// next matching pass over the level.
#[derive(Debug, Default)]
struct Level {
    indices: Vec<SlotIndex>,
}

/// Single-instrument limit order book with price-time priority.
///
/// Strictly single-threaded: no locks, no I/O, no panics on bad input.
/// Every expected condition is reported through the return value.
pub struct OrderBook {
    bids: BTreeMap<Price, Level>,
    asks: BTreeMap<Price, Level>,
    pool: OrderPool,
    ids: FxHashMap<OrderId, SlotIndex>,
    next_id: OrderId,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            pool: OrderPool::new(),
            ids: FxHashMap::default(),
            next_id: 1,
        }
    }

    // ========================================================================
    // Adding liquidity
    // ========================================================================

    /// Add a limit order under a fresh internal id.
    ///
    /// The order first trades against the opposite side as far as its price
    /// allows; residual quantity rests in the book. The outcome id is
    /// [`NO_ORDER_ID`] when nothing rested - either the quantity was
    /// non-positive (no-op) or the order was fully consumed as taker.
    pub fn add_limit(&mut self, side: Side, price: Price, qty: Quantity) -> LimitOutcome {
        if qty <= 0 {
            return LimitOutcome { id: NO_ORDER_ID, taker: MatchResult::unfilled(qty) };
        }

        let id = self.next_id;
        self.next_id += 1;

        let mut outcome = self.add_limit_with_id(id, side, price, qty);
        if !outcome.rested() {
            outcome.id = NO_ORDER_ID;
        }
        outcome
    }

    /// Add a limit order under a caller-supplied id (feed replay path).
    ///
    /// Echoes `id` unconditionally; inspect [`LimitOutcome::rested`] to tell
    /// a resting order from a fully-taken one. A duplicate id supersedes the
    /// old order: the old slot is tombstoned, and both its level entry and
    /// the slot itself are reclaimed by the next matching pass over that
    /// level.
    pub fn add_limit_with_id(
        &mut self,
        id: OrderId,
        side: Side,
        price: Price,
        qty: Quantity,
    ) -> LimitOutcome {
        let mut taker = MatchResult::unfilled(qty);
        if qty <= 0 {
            return LimitOutcome { id, taker };
        }

        // Aggressive pass first: cross the opposite book while it overlaps.
        let residual = self.match_incoming_limit(side, price, qty, &mut taker.trades);
        taker.filled = qty - residual;
        taker.remaining = residual;

        if residual <= 0 {
            // Fully taken; nothing rests and no id is registered.
            return LimitOutcome { id, taker };
        }

        if let Some(old_idx) = self.ids.remove(&id) {
            // Supersede: tombstone the old order but keep the slot out of the
            // free list until the stale level entry is compacted away, so a
            // reused slot can never alias its own leftover index.
            let old = self.pool.get_mut(old_idx);
            old.active = false;
            old.qty = 0;
        }

        let idx = self.pool.alloc(Order { id, side, price, qty: residual, active: true });
        self.ids.insert(id, idx);

        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        levels.entry(price).or_default().indices.push(idx);

        LimitOutcome { id, taker }
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    /// Cancel a resting order. Returns `false` for an unknown id or a slot
    /// that already died; the book is untouched in that case.
    pub fn cancel(&mut self, id: OrderId) -> bool {
        let Some(&idx) = self.ids.get(&id) else {
            return false;
        };

        let ord = self.pool.get(idx);
        if !ord.active || ord.qty <= 0 {
            self.ids.remove(&id);
            return false;
        }
        let (side, price) = (ord.side, ord.price);

        let ord = self.pool.get_mut(idx);
        ord.active = false;
        ord.qty = 0;
        self.pool.release(idx);

        // Direct cancels clean their level entry eagerly.
        let levels = match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };
        let now_empty = match levels.get_mut(&price) {
            Some(level) => {
                level.indices.retain(|&i| i != idx);
                level.indices.is_empty()
            }
            None => false,
        };
        if now_empty {
            levels.remove(&price);
        }

        self.ids.remove(&id);
        true
    }

    // ========================================================================
    // Market orders
    // ========================================================================

    /// Execute a market order against the opposite side, best price first.
    /// Partial fills against a shallow book are expected and reported;
    /// `qty <= 0` is a zero-filled no-op.
    pub fn market(&mut self, side: Side, qty: Quantity) -> MatchResult {
        let mut result = MatchResult::unfilled(qty);
        if qty <= 0 {
            return result;
        }

        let residual = self.match_book(side.opposite(), qty, |_| true, side, &mut result.trades);
        result.filled = qty - residual;
        result.remaining = residual;
        result
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Best (highest) bid, aggregated over the live orders at that level.
    pub fn best_bid(&self) -> BestQuote {
        match self.bids.last_key_value() {
            Some((&price, level)) => self.level_quote(price, level),
            None => BestQuote::none(),
        }
    }

    /// Best (lowest) ask, aggregated over the live orders at that level.
    pub fn best_ask(&self) -> BestQuote {
        match self.asks.first_key_value() {
            Some((&price, level)) => self.level_quote(price, level),
            None => BestQuote::none(),
        }
    }

    /// True when neither side holds any price level.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Number of live (indexed) orders.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Drop all state and restart id assignment from 1.
    pub fn clear(&mut self) {
        self.bids.clear();
        self.asks.clear();
        self.pool.clear();
        self.ids.clear();
        self.next_id = 1;
    }

    fn level_quote(&self, price: Price, level: &Level) -> BestQuote {
        let mut qty: Quantity = 0;
        for &idx in &level.indices {
            let ord = self.pool.get(idx);
            if ord.active && ord.qty > 0 {
                qty += ord.qty;
            }
        }
        if qty == 0 {
            // Only tombstones left; the side is effectively empty here.
            return BestQuote::none();
        }
        BestQuote::at(price, qty)
    }

    // ========================================================================
    // Matching core
    // ========================================================================

    fn match_incoming_limit(
        &mut self,
        side: Side,
        price: Price,
        qty: Quantity,
        trades: &mut Vec<Trade>,
    ) -> Quantity {
        match side {
            Side::Buy => self.match_book(Side::Sell, qty, |p| p <= price, side, trades),
            Side::Sell => self.match_book(Side::Buy, qty, |p| p >= price, side, trades),
        }
    }

    /// Consume liquidity from the `makers` side while `should_cross` accepts
    /// the leading price. Returns the unfilled remainder.
    ///
    /// Levels are walked best-first and never beyond the leading one until
    /// it empties. Within a level the index list is traversed in arrival
    /// order with a write pointer: tombstones and fully-filled makers are
    /// dropped, survivors are compacted forward, and once the taker is
    /// exhausted the unprocessed tail is shifted up unchanged so resting
    /// FIFO order is preserved.
    fn match_book(
        &mut self,
        makers: Side,
        mut qty: Quantity,
        should_cross: impl Fn(Price) -> bool,
        taker_side: Side,
        trades: &mut Vec<Trade>,
    ) -> Quantity {
        while qty > 0 {
            let best = match makers {
                Side::Buy => self.bids.keys().next_back().copied(),
                Side::Sell => self.asks.keys().next().copied(),
            };
            let Some(price) = best else { break };
            if !should_cross(price) {
                break;
            }

            let levels = match makers {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            let Some(level) = levels.get_mut(&price) else { break };

            let mut write = 0usize;
            for i in 0..level.indices.len() {
                let idx = level.indices[i];

                if qty == 0 {
                    // Taker exhausted: keep the rest of the queue in order.
                    level.indices[write] = idx;
                    write += 1;
                    continue;
                }

                let ord = self.pool.get_mut(idx);
                if !ord.active || ord.qty <= 0 {
                    // Supersede leftover; its slot returns to the pool now
                    // that the last reference to it is gone.
                    self.pool.release(idx);
                    continue;
                }

                let traded = qty.min(ord.qty);
                qty -= traded;
                ord.qty -= traded;
                trades.push(Trade { maker_id: ord.id, taker_side, price, qty: traded });

                if ord.qty == 0 {
                    ord.active = false;
                    let maker_id = ord.id;
                    self.pool.release(idx);
                    self.ids.remove(&maker_id);
                } else {
                    level.indices[write] = idx;
                    write += 1;
                }
            }
            level.indices.truncate(write);

            if level.indices.is_empty() {
                levels.remove(&price);
            }
        }

        qty
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("orders", &self.ids.len())
            .finish()
    }
}
