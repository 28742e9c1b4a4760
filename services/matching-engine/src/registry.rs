//! Connection registry
//!
//! Tracks every open client connection by its identifier together with the
//! outbound channel that feeds the connection's socket writer. The map itself
//! is never handed out; callers go through `register`, `deliver` and
//! `deregister`.
//!
//! Each registration hands back a cancellation token. The registry cancels it
//! whenever the entry leaves the map, so the transport can tear the socket
//! down even if its writer is stuck on a slow peer.

use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use types::errors::{DeliveryError, RegistryError};
use types::ids::ConnectionId;

/// Outbound half of a connection: one `String` per text frame
pub type Sink = mpsc::Sender<String>;

/// Marker returned by a successful delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delivered;

/// Configuration for the connection registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Upper bound on how long a delivery may wait for room in a
    /// connection's outbound channel.
    pub delivery_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            delivery_timeout: Duration::from_secs(5),
        }
    }
}

struct Connection {
    sink: Sink,
    /// Cancelled once this entry is removed, for whatever reason
    closed: CancellationToken,
}

/// Live connections keyed by identifier
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, Connection>,
    config: RegistryConfig,
}

impl ConnectionRegistry {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            connections: DashMap::new(),
            config,
        }
    }

    /// Register a freshly upgraded connection.
    ///
    /// The id becomes visible to matchers as soon as this returns. An id
    /// that is already present is left untouched and reported as an error.
    /// The returned token fires when the registry drops the connection.
    pub fn register(
        &self,
        id: ConnectionId,
        sink: Sink,
    ) -> Result<CancellationToken, RegistryError> {
        match self.connections.entry(id) {
            Entry::Occupied(_) => Err(RegistryError::DuplicateConnection {
                connection_id: id.to_string(),
            }),
            Entry::Vacant(slot) => {
                let closed = CancellationToken::new();
                slot.insert(Connection {
                    sink,
                    closed: closed.clone(),
                });
                debug!(connection_id = %id, "Registered connection");
                Ok(closed)
            }
        }
    }

    /// Deliver one text message to a connection.
    ///
    /// A failed write means the connection is dead, so the entry is dropped
    /// before returning `TransportFailure`.
    pub async fn deliver(
        &self,
        id: ConnectionId,
        message: impl Into<String>,
    ) -> Result<Delivered, DeliveryError> {
        // Clone the sender out so no map guard is held across the send
        let sink = self
            .connections
            .get(&id)
            .map(|entry| entry.sink.clone())
            .ok_or_else(|| DeliveryError::NotConnected {
                connection_id: id.to_string(),
            })?;

        match sink.send_timeout(message.into(), self.config.delivery_timeout).await {
            Ok(()) => Ok(Delivered),
            Err(err) => {
                let reason = match err {
                    SendTimeoutError::Timeout(_) => "delivery timed out",
                    SendTimeoutError::Closed(_) => "connection closed",
                };

                // Only evict the sink we failed on; the id may have been re-registered meanwhile
                if let Some((_, evicted)) = self
                    .connections
                    .remove_if(&id, |_, current| current.sink.same_channel(&sink))
                {
                    evicted.closed.cancel();
                }
                warn!(connection_id = %id, reason, "Delivery failed, dropping connection");

                Err(DeliveryError::TransportFailure {
                    connection_id: id.to_string(),
                    reason: reason.to_string(),
                })
            }
        }
    }

    /// Remove a connection. Returns whether anything was removed.
    pub fn deregister(&self, id: ConnectionId) -> bool {
        match self.connections.remove(&id) {
            Some((_, connection)) => {
                connection.closed.cancel();
                debug!(connection_id = %id, "Deregistered connection");
                true
            }
            None => false,
        }
    }

    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Number of connected clients.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
