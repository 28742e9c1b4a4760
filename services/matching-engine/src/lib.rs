//! Matching Engine Service
//!
//! Pairs clients that ask for a match in the same bucket. The first arrival
//! for a bucket waits in that bucket's queue; the next arrival consumes it and
//! both sides are notified with the other side's bucket label.
//!
//! **Key Invariants:**
//! - A pending entry is popped at most once
//! - Pairing is FIFO within a bucket
//! - A requester is queued at most once per bucket
//! - A missing or dead connection is an outcome, never a failure of the engine
//!
//! # Architecture
//!
//! ```text
//!  submit(id, raw value)
//!          │
//!     ┌────▼─────┐
//!     │ Buckets  │  raw value → label
//!     └────┬─────┘
//!          │
//!   ┌──────▼───────┐
//!   │ Queue Store  │  atomic pair-or-enqueue
//!   └──────┬───────┘
//!          │ paired
//!   ┌──────▼───────┐
//!   │  Registry    │  deliver label to both sides
//!   └──────────────┘
//! ```

pub mod registry;
pub mod store;
pub mod matcher;
pub mod events;

pub use events::MatchOutcome;
pub use matcher::Matcher;
pub use registry::{ConnectionRegistry, Delivered, RegistryConfig};
pub use store::{MemoryQueueStore, Pairing, PendingQueueStore};
