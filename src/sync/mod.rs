//! Broadcast synchronization for block pipelines
//!
//! A [`BroadcastQueue`] is an append-only, totally ordered log. Every consumer
//! owns an independent [`Consumer`] cursor into it and observes each message
//! not produced by itself exactly once, in publish order.
//!
//! ```text
//! log:        [m0 @c1] [m1 @c2] [m2 @c1] [m3 @c3]
//! consumer c1 sees:     m1               m3
//! consumer c2 sees: m0                   m2   m3
//! ```
//!
//! Delivery state lives only in the cursor. Published messages are never
//! mutated, so one consumer's reads cannot hide a message from another.

mod broadcast;
mod wait;

pub use broadcast::{BroadcastQueue, Consumer, ConsumerId};
pub use wait::{DEFAULT_POLL_INTERVAL, WaitStrategy};
