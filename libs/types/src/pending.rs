//! Pending match entries
//!
//! A pending entry is what sits in a bucket's queue while its requester waits
//! for a peer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bucket::BucketLabel;
use crate::ids::ConnectionId;

/// An unmatched request waiting in a bucket queue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingEntry {
    pub requester_id: ConnectionId,
    pub bucket: BucketLabel,
}

impl PendingEntry {
    pub fn new(requester_id: ConnectionId, bucket: BucketLabel) -> Self {
        Self {
            requester_id,
            bucket,
        }
    }
}

impl fmt::Display for PendingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.requester_id, self.bucket)
    }
}
