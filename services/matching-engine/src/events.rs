//! Outcomes of match request processing
//!
//! Every submitted request ends in exactly one of these states. Delivery
//! failures show up here rather than as errors.

use types::bucket::BucketLabel;
use types::errors::DeliveryError;
use types::ids::ConnectionId;

/// Terminal state of one match request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No peer was waiting; the request now waits in its bucket
    Queued { bucket: BucketLabel },
    /// The requester was already waiting in this bucket
    AlreadyQueued { bucket: BucketLabel },
    /// Both parties were notified
    Delivered {
        peer: ConnectionId,
        bucket: BucketLabel,
    },
    /// The peer was notified, the requester was not
    PartialDelivery {
        peer: ConnectionId,
        bucket: BucketLabel,
        failure: DeliveryError,
    },
    /// The peer could not be reached; nobody was notified and neither side
    /// went back into the queue
    Abandoned {
        peer: ConnectionId,
        bucket: BucketLabel,
        failure: DeliveryError,
    },
}

impl MatchOutcome {
    /// Short name for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            MatchOutcome::Queued { .. } => "QUEUED",
            MatchOutcome::AlreadyQueued { .. } => "ALREADY_QUEUED",
            MatchOutcome::Delivered { .. } => "DELIVERED",
            MatchOutcome::PartialDelivery { .. } => "PARTIAL_DELIVERY",
            MatchOutcome::Abandoned { .. } => "ABANDONED",
        }
    }

    pub fn bucket(&self) -> &BucketLabel {
        match self {
            MatchOutcome::Queued { bucket }
            | MatchOutcome::AlreadyQueued { bucket }
            | MatchOutcome::Delivered { bucket, .. }
            | MatchOutcome::PartialDelivery { bucket, .. }
            | MatchOutcome::Abandoned { bucket, .. } => bucket,
        }
    }
}
