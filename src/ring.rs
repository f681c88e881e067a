//! Bounded lock-free single-producer/single-consumer ring.
//!
//! One slot is reserved so an empty ring (`head == tail`) is distinguishable
//! from a full one (`next(head) == tail`); a ring of capacity `C` therefore
//! holds at most `C - 1` values. The producer owns `head`, the consumer owns
//! `tail`, and each reads the other's index with acquire ordering before
//! touching a slot, so a popped value is always fully published.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Keeps the producer and consumer indices on separate cache lines.
#[repr(align(64))]
struct CacheAligned<T>(T);

pub struct SpscRing<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    head: CacheAligned<AtomicUsize>,
    tail: CacheAligned<AtomicUsize>,
}

unsafe impl<T: Send> Send for SpscRing<T> {}
unsafe impl<T: Send> Sync for SpscRing<T> {}

impl<T> SpscRing<T> {
    /// Ring with `capacity` slots, one of which stays reserved.
    ///
    /// # Panics
    /// Panics if `capacity < 2` (such a ring could never hold a value).
    pub fn new(capacity: usize) -> Self {
        assert!(capacity >= 2, "SpscRing capacity must be at least 2");
        let slots = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Self {
            slots,
            head: CacheAligned(AtomicUsize::new(0)),
            tail: CacheAligned(AtomicUsize::new(0)),
        }
    }

    #[inline]
    fn advance(&self, idx: usize) -> usize {
        let next = idx + 1;
        if next == self.slots.len() {
            0
        } else {
            next
        }
    }

    /// Producer side. Returns the value back when the ring is full so the
    /// caller can retry without cloning.
    #[inline]
    pub fn push(&self, value: T) -> Result<(), T> {
        let head = self.head.0.load(Ordering::Relaxed);
        let next = self.advance(head);
        if next == self.tail.0.load(Ordering::Acquire) {
            return Err(value); // full
        }
        unsafe {
            (*self.slots[head].get()).write(value);
        }
        self.head.0.store(next, Ordering::Release);
        Ok(())
    }

    /// Consumer side. `None` when the ring is empty.
    #[inline]
    pub fn pop(&self) -> Option<T> {
        let tail = self.tail.0.load(Ordering::Relaxed);
        if tail == self.head.0.load(Ordering::Acquire) {
            return None; // empty
        }
        let value = unsafe { (*self.slots[tail].get()).assume_init_read() };
        self.tail.0.store(self.advance(tail), Ordering::Release);
        Some(value)
    }

    /// Advisory snapshot; not a synchronization point.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head.0.load(Ordering::Relaxed) == self.tail.0.load(Ordering::Relaxed)
    }

    /// Advisory snapshot; not a synchronization point.
    #[inline]
    pub fn is_full(&self) -> bool {
        let head = self.head.0.load(Ordering::Relaxed);
        self.advance(head) == self.tail.0.load(Ordering::Relaxed)
    }

    /// Number of values the ring can hold (`slots - 1`).
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }
}

impl<T> Drop for SpscRing<T> {
    fn drop(&mut self) {
        // Sole owner at this point; release whatever was never popped.
        let head = *self.head.0.get_mut();
        let mut tail = *self.tail.0.get_mut();
        while tail != head {
            unsafe {
                self.slots[tail].get_mut().assume_init_drop();
            }
            tail = self.advance(tail);
        }
    }
}
