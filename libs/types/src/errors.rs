//! Error types for the matchmaker
//!
//! Delivery failures are expected during normal operation (clients hang up at
//! any time) and are reported as values, never as panics. Store failures are
//! fatal only to the request that hit them.

use thiserror::Error;

/// Failure to deliver a message to a connection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("Connection not registered: {connection_id}")]
    NotConnected { connection_id: String },

    #[error("Transport failure on {connection_id}: {reason}")]
    TransportFailure { connection_id: String, reason: String },
}

/// Connection registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Connection already registered: {connection_id}")]
    DuplicateConnection { connection_id: String },
}

/// Pending queue store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Queue store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors that abort processing of a single match request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Invalid bucket table configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BucketTableError {
    #[error("Bucket table must have at least one entry")]
    Empty,

    #[error("Duplicate bucket threshold: {threshold}")]
    DuplicateThreshold { threshold: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delivery_error_display() {
        let err = DeliveryError::NotConnected {
            connection_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Connection not registered: abc");
    }

    #[test]
    fn test_match_error_from_store() {
        let store_err = StoreError::Unavailable {
            reason: "connection refused".to_string(),
        };
        let match_err: MatchError = store_err.into();
        assert_eq!(
            match_err.to_string(),
            "Store error: Queue store unavailable: connection refused"
        );
    }
}
