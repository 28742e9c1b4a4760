//! Types library for the bucket matchmaker
//!
//! Shared definitions used by the matching engine and the gateway.
//!
//! # Modules
//! - `ids`: Connection identifiers
//! - `bucket`: Bucket labels and the threshold table
//! - `pending`: Queued, unmatched requests
//! - `errors`: Error taxonomy

pub mod ids;
pub mod bucket;
pub mod pending;
pub mod errors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::bucket::*;
    pub use crate::pending::*;
    pub use crate::errors::*;
}
