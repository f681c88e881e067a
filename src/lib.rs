//! # Tickbook
//!
//! A single-instrument, in-memory limit order book with a matching engine
//! and a bounded SPSC event pipeline in front of it.
//!
//! ## Design Principles
//!
//! - **Single-Writer**: the book is mutated by exactly one thread (no locks)
//! - **Price-Time Priority**: best level first, strict FIFO within a level
//! - **Value-Returned Errors**: no panics on bad input, no I/O in the engine
//! - **Indexed Ownership**: levels and the id index hold 32-bit slot indices
//!   into a dense order pool, never references
//!
//! ## Architecture
//!
//! ```text
//! [Producer Thread] --> [SPSC Ring Buffer] --> [Consumer / Matching Thread]
//!        |                                               |
//!   enqueue_ts stamp                        latency + trades + book state
//! ```

pub mod book;
pub mod event;
pub mod feed;
pub mod pipeline;
pub mod pool;
pub mod replay;
pub mod ring;
pub mod types;

// Re-exports for convenience
pub use book::OrderBook;
pub use event::{Event, EventType, TimedEvent, END_SEQ};
pub use feed::EventGenerator;
pub use pipeline::{run_pipeline, LatencyStats, PipelineConfig, PipelineReport};
pub use pool::{Order, OrderPool, SlotIndex};
pub use replay::{parse_event_line, replay_lines, ReplayStats};
pub use ring::SpscRing;
pub use types::{
    BestQuote, LimitOutcome, MatchResult, OrderId, Price, Quantity, Side, Trade, NO_ORDER_ID,
};
