//! Read-only client for the chess platform's public REST API.
//!
//! The platform exposes a player's finished games as an index of monthly
//! archive URLs plus a handful of profile/stats endpoints, and a separate
//! per-game "callback" endpoint on the web host that carries fields the bulk
//! archives omit (rating deltas, accuracies). This crate wraps all of that
//! behind [`client::ApiClient`], with a sliding-window rate limiter and a
//! bounded retry policy for the shared endpoints.
//!
//! Consumers that want to stay testable should depend on the
//! [`source::PlatformSource`] trait rather than the concrete client.

pub mod client;
pub mod endpoints;
pub mod errors;
pub mod limiter;
pub mod models;
pub mod retry;
pub mod source;

pub use client::{ApiClient, ApiConfig};
pub use errors::ApiError;
pub use source::PlatformSource;
