//! URL construction for the public API and the per-game callback host.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ApiError;

/// Default base URL of the public read-only API.
pub const DEFAULT_BASE_URL: &str = "https://api.chess.com/pub";

/// Default base URL of the web host serving the per-game callback endpoint.
pub const DEFAULT_CALLBACK_BASE_URL: &str = "https://www.chess.com/callback";

static GAME_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"game/(live|daily)/(\d+)").expect("game url regex"));

/// URL builder for both hosts.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// Base URL of the public API, no trailing slash.
    pub base: String,
    /// Base URL of the callback host, no trailing slash.
    pub callback_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            base: DEFAULT_BASE_URL.to_string(),
            callback_base: DEFAULT_CALLBACK_BASE_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// `GET /player/{username}` — profile.
    pub fn profile(&self, username: &str) -> String {
        format!("{}/player/{}", self.base, username)
    }

    /// `GET /player/{username}/stats` — per-format rating snapshot.
    pub fn stats(&self, username: &str) -> String {
        format!("{}/player/{}/stats", self.base, username)
    }

    /// `GET /player/{username}/games/archives` — ordered monthly archive index.
    pub fn archives(&self, username: &str) -> String {
        format!("{}/player/{}/games/archives", self.base, username)
    }

    /// `GET {callback}/{live|daily}/game/{id}` — extended per-game data.
    pub fn game_callback(&self, id: &GameId) -> String {
        format!("{}/{}/game/{}", self.callback_base, id.kind, id.id)
    }
}

/// Whether a game was played on the live or the daily backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// Real-time game.
    Live,
    /// Correspondence ("daily") game.
    Daily,
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameKind::Live => write!(f, "live"),
            GameKind::Daily => write!(f, "daily"),
        }
    }
}

/// Identifier of a single game on the callback host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameId {
    /// Backend the game lives on.
    pub kind: GameKind,
    /// Numeric game id.
    pub id: u64,
}

impl GameId {
    /// Extract the id and backend from a canonical game URL.
    pub fn from_game_url(url: &str) -> Result<Self, ApiError> {
        let caps = GAME_URL_RE
            .captures(url)
            .ok_or_else(|| ApiError::InvalidGameUrl(url.to_string()))?;
        let kind = match &caps[1] {
            "live" => GameKind::Live,
            _ => GameKind::Daily,
        };
        let id = caps[2]
            .parse::<u64>()
            .map_err(|_| ApiError::InvalidGameUrl(url.to_string()))?;
        Ok(Self { kind, id })
    }

    /// True for daily (correspondence) games.
    pub fn is_daily(&self) -> bool {
        self.kind == GameKind::Daily
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_player_urls() {
        let e = Endpoints::default();
        assert_eq!(e.profile("magnus"), "https://api.chess.com/pub/player/magnus");
        assert_eq!(
            e.archives("magnus"),
            "https://api.chess.com/pub/player/magnus/games/archives"
        );
    }

    #[test]
    fn extracts_live_game_id() {
        let id = GameId::from_game_url("https://www.chess.com/game/live/123456789").unwrap();
        assert_eq!(id.kind, GameKind::Live);
        assert_eq!(id.id, 123456789);
        let e = Endpoints::default();
        assert_eq!(
            e.game_callback(&id),
            "https://www.chess.com/callback/live/game/123456789"
        );
    }

    #[test]
    fn extracts_daily_game_id() {
        let id = GameId::from_game_url("https://www.chess.com/game/daily/42").unwrap();
        assert!(id.is_daily());
        assert_eq!(id.id, 42);
    }

    #[test]
    fn rejects_foreign_urls() {
        assert!(GameId::from_game_url("https://example.com/post/99").is_err());
    }
}
