//! Pending queue store
//!
//! Per-bucket FIFO of requests still waiting for a peer. The store is the only
//! place pairing atomicity comes from: the matcher never checks for emptiness
//! and pushes as two separate steps.

pub mod memory;

pub use memory::MemoryQueueStore;

use async_trait::async_trait;
use types::bucket::BucketLabel;
use types::errors::StoreError;
use types::pending::PendingEntry;

/// Result of an atomic pair-or-enqueue attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pairing {
    /// The oldest waiting entry was removed and handed back
    Paired(PendingEntry),
    /// Nobody was waiting; the entry now waits at the tail
    Enqueued,
    /// The requester is already waiting in this bucket; nothing changed
    AlreadyQueued,
}

/// Durable per-bucket FIFO of unmatched requests
///
/// Every operation is scoped to one bucket and must be atomic with respect to
/// concurrent callers on the same bucket. On error the queue must be left as
/// it was.
#[async_trait]
pub trait PendingQueueStore: Send + Sync {
    /// Remove and return the oldest entry, if any.
    async fn try_pop(&self, bucket: &BucketLabel) -> Result<Option<PendingEntry>, StoreError>;

    /// Append an entry to the tail of its bucket's queue.
    async fn push(&self, entry: PendingEntry) -> Result<(), StoreError>;

    /// Pop the oldest entry of `entry.bucket` if one exists, otherwise push
    /// `entry`, as a single atomic step.
    async fn pair_or_enqueue(&self, entry: PendingEntry) -> Result<Pairing, StoreError>;

    /// Number of entries waiting in a bucket.
    async fn len(&self, bucket: &BucketLabel) -> Result<usize, StoreError>;
}
