//! Order pool - dense slot storage with a free list.
//!
//! The pool exclusively owns all order storage. Price levels and the id
//! index refer to orders by 32-bit slot index only, so "this order is gone"
//! reduces to a flag flip and a free-list push, with no pointer chasing and
//! no cyclic ownership.

use std::fmt;

use crate::types::{OrderId, Price, Quantity, Side};

/// Index into the pool's slot array - a compressed pointer.
pub type SlotIndex = u32;

/// One pooled order. `active == false` marks a tombstone: the slot is
/// logically dead but a level's index list may still reference it until the
/// next matching pass compacts that level.
#[derive(Clone, Copy, Debug)]
pub struct Order {
    pub id: OrderId,
    pub side: Side,
    pub price: Price,
    pub qty: Quantity,
    pub active: bool,
}

/// Dense order storage. Released slots are recycled most-recently-freed
/// first; the backing array only ever grows.
pub struct OrderPool {
    slots: Vec<Order>,
    free: Vec<SlotIndex>,
}

impl OrderPool {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(orders: usize) -> Self {
        Self {
            slots: Vec::with_capacity(orders),
            free: Vec::with_capacity(orders),
        }
    }

    /// Place `order` into a slot, reusing a freed one when available.
    #[inline]
    pub fn alloc(&mut self, order: Order) -> SlotIndex {
        if let Some(idx) = self.free.pop() {
            self.slots[idx as usize] = order;
            return idx;
        }
        let idx = self.slots.len() as SlotIndex;
        self.slots.push(order);
        idx
    }

    /// Return a slot to the free list. The caller must have deactivated it
    /// first; a live slot on the free list would be handed out twice.
    #[inline]
    pub fn release(&mut self, idx: SlotIndex) {
        debug_assert!(!self.slots[idx as usize].active, "releasing a live slot");
        self.free.push(idx);
    }

    #[inline]
    pub fn get(&self, idx: SlotIndex) -> &Order {
        &self.slots[idx as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, idx: SlotIndex) -> &mut Order {
        &mut self.slots[idx as usize]
    }

    /// Number of slots currently out of the free list: live orders plus
    /// tombstones whose stale level entries await compaction.
    #[inline]
    pub fn allocated(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }
}

impl Default for OrderPool {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderPool")
            .field("slots", &self.slots.len())
            .field("free", &self.free.len())
            .finish()
    }
}
