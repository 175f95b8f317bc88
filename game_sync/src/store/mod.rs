//! Repository functions over the SQLite store.
//!
//! Every function takes `&mut SqliteConnection` explicitly; there is no
//! module-level store handle. Multi-statement writes run inside
//! `immediate_transaction` to reduce SQLITE_BUSY surprises.

pub mod daily;
pub mod games;
pub mod kv;
pub mod queue;
pub mod ratings;

/// Typed store-level failures; everything else flows through `anyhow`.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// The advisory lock for an operation is already held.
    #[error("operation '{op}' is locked by {owner}")]
    LockHeld {
        /// Operation name.
        op: String,
        /// Holder identifier.
        owner: String,
    },
}

/// Result type used throughout the store for fallible operations.
pub type StoreResult<T> = anyhow::Result<T>;
