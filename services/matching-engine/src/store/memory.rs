//! In-process pending queue store
//!
//! Each bucket's queue lives behind its own `DashMap` entry; holding the entry
//! guard is the per-bucket critical section.

use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;
use types::bucket::BucketLabel;
use types::errors::StoreError;
use types::pending::PendingEntry;

use super::{Pairing, PendingQueueStore};

#[derive(Debug, Default)]
pub struct MemoryQueueStore {
    queues: DashMap<BucketLabel, VecDeque<PendingEntry>>,
}

impl MemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total entries waiting across all buckets.
    pub fn total_pending(&self) -> usize {
        self.queues.iter().map(|queue| queue.len()).sum()
    }
}

fn is_queued(queue: &VecDeque<PendingEntry>, entry: &PendingEntry) -> bool {
    queue
        .iter()
        .any(|waiting| waiting.requester_id == entry.requester_id)
}

#[async_trait]
impl PendingQueueStore for MemoryQueueStore {
    async fn try_pop(&self, bucket: &BucketLabel) -> Result<Option<PendingEntry>, StoreError> {
        Ok(self
            .queues
            .get_mut(bucket)
            .and_then(|mut queue| queue.pop_front()))
    }

    async fn push(&self, entry: PendingEntry) -> Result<(), StoreError> {
        let mut queue = self.queues.entry(entry.bucket.clone()).or_default();
        if is_queued(&queue, &entry) {
            debug!(%entry, "Requester already queued, skipping push");
            return Ok(());
        }
        queue.push_back(entry);
        Ok(())
    }

    async fn pair_or_enqueue(&self, entry: PendingEntry) -> Result<Pairing, StoreError> {
        let mut queue = self.queues.entry(entry.bucket.clone()).or_default();

        if is_queued(&queue, &entry) {
            return Ok(Pairing::AlreadyQueued);
        }

        match queue.pop_front() {
            Some(peer) => Ok(Pairing::Paired(peer)),
            None => {
                queue.push_back(entry);
                Ok(Pairing::Enqueued)
            }
        }
    }

    async fn len(&self, bucket: &BucketLabel) -> Result<usize, StoreError> {
        Ok(self.queues.get(bucket).map(|queue| queue.len()).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::ids::ConnectionId;

    fn entry(bucket: &str) -> PendingEntry {
        PendingEntry::new(ConnectionId::new(), BucketLabel::new(bucket))
    }

    #[tokio::test]
    async fn test_pop_order_is_fifo() {
        let store = MemoryQueueStore::new();
        let first = entry("10");
        let second = entry("10");
        store.push(first.clone()).await.unwrap();
        store.push(second.clone()).await.unwrap();

        let bucket = BucketLabel::new("10");
        assert_eq!(store.try_pop(&bucket).await.unwrap(), Some(first));
        assert_eq!(store.try_pop(&bucket).await.unwrap(), Some(second));
        assert_eq!(store.try_pop(&bucket).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_try_pop_unknown_bucket() {
        let store = MemoryQueueStore::new();
        assert_eq!(store.try_pop(&BucketLabel::new("50")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pair_or_enqueue_sequence() {
        let store = MemoryQueueStore::new();
        let waiting = entry("1");
        let arriving = entry("1");

        assert_eq!(
            store.pair_or_enqueue(waiting.clone()).await.unwrap(),
            Pairing::Enqueued
        );
        assert_eq!(
            store.pair_or_enqueue(arriving).await.unwrap(),
            Pairing::Paired(waiting)
        );
        assert_eq!(store.len(&BucketLabel::new("1")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_buckets_are_independent() {
        let store = MemoryQueueStore::new();
        store.pair_or_enqueue(entry("1")).await.unwrap();

        assert_eq!(
            store.pair_or_enqueue(entry("10")).await.unwrap(),
            Pairing::Enqueued
        );
        assert_eq!(store.total_pending(), 2);
    }

    #[tokio::test]
    async fn test_requester_is_never_queued_twice() {
        let store = MemoryQueueStore::new();
        let waiting = entry("100");

        store.pair_or_enqueue(waiting.clone()).await.unwrap();
        assert_eq!(
            store.pair_or_enqueue(waiting.clone()).await.unwrap(),
            Pairing::AlreadyQueued
        );
        store.push(waiting.clone()).await.unwrap();
        assert_eq!(store.len(&waiting.bucket).await.unwrap(), 1);
    }
}
