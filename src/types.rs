//! Domain types shared by the book, the feed and the pipeline.
//!
//! All engine arithmetic is integer: prices are signed ticks, quantities are
//! signed counts (strictly positive for live orders). `0` is the reserved
//! "no order" id.

/// Price in ticks. Signed so spreads and synthetic instruments stay exact.
pub type Price = i64;

/// Order / trade quantity. Live orders always carry `qty > 0`.
pub type Quantity = i64;

/// External order identifier. `NO_ORDER_ID` is never assigned.
pub type OrderId = u64;

/// Sentinel id: "no order" (rejected input, or fully taken before resting).
pub const NO_ORDER_ID: OrderId = 0;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Side {
    Buy = 0,
    Sell = 1,
}

impl Side {
    /// Returns the opposite side.
    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Aggregated view of the leading price level on one side of the book.
///
/// `valid == false` means the side is effectively empty at the top
/// (no level at all, or only tombstones awaiting cleanup).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BestQuote {
    pub valid: bool,
    pub price: Price,
    pub qty: Quantity,
}

impl BestQuote {
    #[inline]
    pub const fn none() -> Self {
        Self { valid: false, price: 0, qty: 0 }
    }

    #[inline]
    pub const fn at(price: Price, qty: Quantity) -> Self {
        Self { valid: true, price, qty }
    }
}

/// A single fill: the resting (maker) order consumed, the aggressor side,
/// and the execution price/quantity. Emitted in matching order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Trade {
    pub maker_id: OrderId,
    pub taker_side: Side,
    pub price: Price,
    pub qty: Quantity,
}

/// Outcome of one aggressive pass over the book.
///
/// `filled + remaining == requested` always, and the trade quantities sum
/// to `filled`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub requested: Quantity,
    pub filled: Quantity,
    pub remaining: Quantity,
    pub trades: Vec<Trade>,
}

impl MatchResult {
    /// A result with nothing filled yet: `remaining == requested`.
    #[inline]
    pub fn unfilled(requested: Quantity) -> Self {
        Self { requested, filled: 0, remaining: requested, trades: Vec::new() }
    }

    #[inline]
    pub fn is_full_fill(&self) -> bool {
        self.requested > 0 && self.remaining == 0
    }
}

/// Outcome of a limit add: the order id plus the taker pass that ran first.
///
/// For [`OrderBook::add_limit`](crate::OrderBook::add_limit) the id is
/// [`NO_ORDER_ID`] when nothing rested (invalid quantity, or the order was
/// fully consumed crossing the opposite side). `add_limit_with_id` echoes
/// the caller's id unconditionally.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LimitOutcome {
    pub id: OrderId,
    pub taker: MatchResult,
}

impl LimitOutcome {
    /// True when residual quantity was posted to the book.
    #[inline]
    pub fn rested(&self) -> bool {
        self.taker.remaining > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn best_quote_constructors() {
        assert!(!BestQuote::none().valid);
        let q = BestQuote::at(101, 5);
        assert!(q.valid);
        assert_eq!(q.price, 101);
        assert_eq!(q.qty, 5);
    }

    #[test]
    fn match_result_unfilled() {
        let r = MatchResult::unfilled(12);
        assert_eq!(r.requested, 12);
        assert_eq!(r.filled, 0);
        assert_eq!(r.remaining, 12);
        assert!(r.trades.is_empty());
        assert!(!r.is_full_fill());
    }
}
