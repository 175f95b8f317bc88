//! Database utilities for connections and schema migrations.
//!
//! - [`connection::connect_sqlite`] opens a connection with WAL,
//!   foreign_keys=ON, and a 5000ms busy_timeout applied.
//! - [`migrate::run`] applies the embedded Diesel migrations for the store
//!   (games, rating_events, daily_stats, callback_queue, sync_kv, op_locks).

pub mod connection;
pub mod migrate;
