//! Event model shared by the feed side and the matching side.

use std::time::Instant;

use crate::types::{OrderId, Price, Quantity, Side};

/// What an [`Event`] asks the book to do. `End` is the stream sentinel used
/// by synthetic generators and the pipeline shutdown protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum EventType {
    Add,
    Market,
    Cancel,
    End,
}

/// A single book instruction from any feed source.
///
/// Field validity depends on `kind`: `price` is meaningful for `Add`,
/// `qty` for `Add`/`Market`, `id` for `Cancel` (optional for `Add`).
/// `ts_ns` carries an upstream feed timestamp when one exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Event {
    pub kind: EventType,
    pub side: Side,
    pub price: Price,
    pub qty: Quantity,
    pub id: OrderId,
    pub ts_ns: i64,
}

impl Event {
    #[inline]
    pub const fn add(side: Side, price: Price, qty: Quantity, id: OrderId) -> Self {
        Self { kind: EventType::Add, side, price, qty, id, ts_ns: 0 }
    }

    #[inline]
    pub const fn market(side: Side, qty: Quantity) -> Self {
        Self { kind: EventType::Market, side, price: 0, qty, id: 0, ts_ns: 0 }
    }

    #[inline]
    pub const fn cancel(id: OrderId) -> Self {
        Self { kind: EventType::Cancel, side: Side::Buy, price: 0, qty: 0, id, ts_ns: 0 }
    }

    #[inline]
    pub const fn end() -> Self {
        Self { kind: EventType::End, side: Side::Buy, price: 0, qty: 0, id: 0, ts_ns: 0 }
    }
}

/// Sequence number carried by the `End` sentinel.
pub const END_SEQ: u64 = u64::MAX;

/// An [`Event`] stamped by the producer on its way into the ring.
///
/// `seq` is 0-based over real events; `enqueue_ts` is taken immediately
/// before the enqueue so `now - enqueue_ts` on the consumer side is the
/// queue-to-process latency.
#[derive(Clone, Copy, Debug)]
pub struct TimedEvent {
    pub event: Event,
    pub seq: u64,
    pub enqueue_ts: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_kind() {
        assert_eq!(Event::add(Side::Buy, 100, 10, 1).kind, EventType::Add);
        assert_eq!(Event::market(Side::Sell, 5).kind, EventType::Market);
        assert_eq!(Event::cancel(7).kind, EventType::Cancel);
        assert_eq!(Event::end().kind, EventType::End);
    }

    #[test]
    fn cancel_keeps_only_id() {
        let ev = Event::cancel(42);
        assert_eq!(ev.id, 42);
        assert_eq!(ev.qty, 0);
        assert_eq!(ev.price, 0);
    }
}
