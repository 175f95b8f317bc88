//! Trait seam over the upstream endpoints.
//!
//! Pipeline jobs take a `&dyn PlatformSource` instead of the concrete
//! [`crate::client::ApiClient`] so tests can drive them from canned payloads.

use async_trait::async_trait;

use crate::endpoints::GameId;
use crate::errors::ApiError;
use crate::models::{CallbackResponse, Profile, RawGame, PlayerStats};

/// The five read-only operations the pipeline consumes.
#[async_trait]
pub trait PlatformSource: Send + Sync {
    /// Monthly archive URLs for a player, oldest first.
    async fn archives(&self, username: &str) -> Result<Vec<String>, ApiError>;

    /// All raw games in one monthly archive, oldest first.
    async fn monthly_games(&self, archive_url: &str) -> Result<Vec<RawGame>, ApiError>;

    /// Public profile.
    async fn profile(&self, username: &str) -> Result<Profile, ApiError>;

    /// Per-format rating snapshot.
    async fn stats(&self, username: &str) -> Result<PlayerStats, ApiError>;

    /// Extended per-game data from the callback host.
    async fn game_callback(&self, id: &GameId) -> Result<CallbackResponse, ApiError>;
}
