//! Matcher
//!
//! Runs one match request through its state machine:
//!
//! ```text
//! Received ──► Queued                      (nobody waiting)
//!          └─► Paired ──► Delivered        (both notified)
//!                     ├─► PartialDelivery  (peer notified only)
//!                     └─► Abandoned        (peer unreachable)
//! ```
//!
//! There are no retries. A client that wants another try submits again.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use types::bucket::{BucketLabel, BucketTable};
use types::errors::MatchError;
use types::ids::ConnectionId;
use types::pending::PendingEntry;

use crate::events::MatchOutcome;
use crate::registry::ConnectionRegistry;
use crate::store::{Pairing, PendingQueueStore};

/// Pairs requests in the same bucket and notifies both sides
pub struct Matcher<S> {
    registry: Arc<ConnectionRegistry>,
    store: Arc<S>,
    buckets: Arc<BucketTable>,
}

impl<S> Clone for Matcher<S> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            store: Arc::clone(&self.store),
            buckets: Arc::clone(&self.buckets),
        }
    }
}

impl<S: PendingQueueStore + 'static> Matcher<S> {
    pub fn new(registry: Arc<ConnectionRegistry>, store: Arc<S>, buckets: BucketTable) -> Self {
        Self {
            registry,
            store,
            buckets: Arc::new(buckets),
        }
    }

    /// Process one match request to completion
    ///
    /// Only a store failure is an error. In that case nothing was popped or
    /// pushed and no delivery was attempted.
    pub async fn submit(
        &self,
        requester_id: ConnectionId,
        raw_value: &str,
    ) -> Result<MatchOutcome, MatchError> {
        let bucket = self.buckets.bucket(raw_value);
        let entry = PendingEntry::new(requester_id, bucket.clone());

        match self.store.pair_or_enqueue(entry).await? {
            Pairing::Enqueued => {
                info!(connection_id = %requester_id, %bucket, "No peer waiting, request queued");
                Ok(MatchOutcome::Queued { bucket })
            }
            Pairing::AlreadyQueued => {
                debug!(connection_id = %requester_id, %bucket, "Request already queued");
                Ok(MatchOutcome::AlreadyQueued { bucket })
            }
            Pairing::Paired(peer) => Ok(self.notify_pair(requester_id, bucket, peer).await),
        }
    }

    /// Fire-and-forget form of [`Matcher::submit`]
    ///
    /// Spawns one task for the request; the outcome is only logged.
    pub fn submit_detached(&self, requester_id: ConnectionId, raw_value: String) -> JoinHandle<()> {
        let matcher = self.clone();
        tokio::spawn(async move {
            match matcher.submit(requester_id, &raw_value).await {
                Ok(outcome) => debug!(
                    connection_id = %requester_id,
                    outcome = outcome.kind(),
                    bucket = %outcome.bucket(),
                    "Match request finished"
                ),
                Err(err) => error!(connection_id = %requester_id, error = %err, "Match request failed"),
            }
        })
    }

    /// Tell each side the other side's bucket. Peer first: it has waited longest.
    async fn notify_pair(
        &self,
        requester_id: ConnectionId,
        bucket: BucketLabel,
        peer: PendingEntry,
    ) -> MatchOutcome {
        let peer_id = peer.requester_id;

        if let Err(failure) = self.registry.deliver(peer_id, bucket.as_str()).await {
            warn!(
                connection_id = %requester_id,
                peer = %peer_id,
                %bucket,
                error = %failure,
                "Peer unreachable, abandoning match"
            );
            return MatchOutcome::Abandoned {
                peer: peer_id,
                bucket,
                failure,
            };
        }

        match self.registry.deliver(requester_id, peer.bucket.as_str()).await {
            Ok(_) => {
                info!(connection_id = %requester_id, peer = %peer_id, %bucket, "Matched");
                MatchOutcome::Delivered {
                    peer: peer_id,
                    bucket,
                }
            }
            Err(failure) => {
                warn!(
                    connection_id = %requester_id,
                    peer = %peer_id,
                    %bucket,
                    error = %failure,
                    "Requester unreachable after peer was notified"
                );
                MatchOutcome::PartialDelivery {
                    peer: peer_id,
                    bucket,
                    failure,
                }
            }
        }
    }
}
