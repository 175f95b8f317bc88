//! Game-history sync pipeline over a SQLite store.
//!
//! The pipeline pulls a player's finished games from the public API (via the
//! `chess_api` crate), enriches each game into a wide derived record, writes
//! them duplicate-filtered into SQLite, and maintains two downstream
//! products: callback-derived per-game extras and per-day rollup statistics.
//!
//! Layout:
//! - [`ingest`] — checkpointed, budgeted archive traversal (fetch/backfill)
//! - [`enrich`] — raw payload to [`models::GameRecord`]
//! - [`callback`] — queue-driven second-phase enrichment
//! - [`stats`] — daily rollups, full or incremental
//! - [`profile`] — rating-snapshot refresh from the stats endpoint
//! - [`store`] — repository functions, [`lock`] — advisory op locks
//! - [`db`] — connection setup and embedded migrations

pub mod callback;
pub mod config;
pub mod db;
pub mod enrich;
pub mod format;
pub mod ingest;
pub mod lock;
pub mod models;
pub mod profile;
pub mod schema;
pub mod stats;
pub mod store;
