//! Shared harness for integration tests: a migrated temp-file store and a
//! canned [`PlatformSource`] driven by in-memory payloads.

// Each test binary uses a different slice of this harness.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chess_api::endpoints::GameId;
use chess_api::errors::ApiError;
use chess_api::models::{CallbackResponse, PlayerStats, Profile, RawGame, RawPlayer};
use chess_api::PlatformSource;
use diesel::SqliteConnection;
use tempfile::TempDir;

use game_sync::db;

pub const PLAYER: &str = "alice";

/// Fresh migrated SQLite store in a temp dir. Keep the `TempDir` alive for
/// the duration of the test.
pub fn setup_db() -> (SqliteConnection, TempDir) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("sync.db").to_string_lossy().to_string();
    db::migrate::run(&path).expect("migrations");
    let conn = db::connection::connect_sqlite(&path).expect("connect");
    (conn, dir)
}

/// Canned upstream. Archives map to game lists; callbacks map game ids to
/// raw JSON payloads; ids in `failing_callbacks` answer with a 500.
#[derive(Default)]
pub struct FakeSource {
    pub archives: Vec<String>,
    pub months: HashMap<String, Vec<RawGame>>,
    pub callbacks: HashMap<u64, serde_json::Value>,
    pub failing_callbacks: HashSet<u64>,
    pub stats_json: serde_json::Value,
}

impl FakeSource {
    pub fn with_month(mut self, url: &str, games: Vec<RawGame>) -> Self {
        self.archives.push(url.to_string());
        self.months.insert(url.to_string(), games);
        self
    }
}

#[async_trait]
impl PlatformSource for FakeSource {
    async fn archives(&self, _username: &str) -> Result<Vec<String>, ApiError> {
        Ok(self.archives.clone())
    }

    async fn monthly_games(&self, archive_url: &str) -> Result<Vec<RawGame>, ApiError> {
        Ok(self.months.get(archive_url).cloned().unwrap_or_default())
    }

    async fn profile(&self, _username: &str) -> Result<Profile, ApiError> {
        Ok(serde_json::from_value(serde_json::json!({ "username": PLAYER })).unwrap())
    }

    async fn stats(&self, _username: &str) -> Result<PlayerStats, ApiError> {
        let raw = if self.stats_json.is_null() {
            serde_json::json!({})
        } else {
            self.stats_json.clone()
        };
        Ok(serde_json::from_value(raw).unwrap())
    }

    async fn game_callback(&self, id: &GameId) -> Result<CallbackResponse, ApiError> {
        if self.failing_callbacks.contains(&id.id) {
            return Err(ApiError::Status {
                status: 500,
                url: format!("fake callback {}", id.id),
            });
        }
        let raw = self
            .callbacks
            .get(&id.id)
            .ok_or_else(|| ApiError::Status {
                status: 404,
                url: format!("fake callback {}", id.id),
            })?;
        Ok(serde_json::from_value(raw.clone()).unwrap())
    }
}

/// A finished live game won by [`PLAYER`] as white.
pub fn raw_game(id: u64, end_time: i64, time_control: &str) -> RawGame {
    RawGame {
        url: format!("https://www.chess.com/game/live/{id}"),
        pgn: None,
        time_control: Some(time_control.to_string()),
        start_time: None,
        end_time,
        rated: Some(true),
        time_class: None,
        rules: Some("chess".to_string()),
        white: RawPlayer {
            username: PLAYER.to_string(),
            rating: Some(1500),
            result: Some("win".to_string()),
        },
        black: RawPlayer {
            username: "rival".to_string(),
            rating: Some(1480),
            result: Some("resigned".to_string()),
        },
    }
}

/// Flip the result words so [`PLAYER`] lost.
pub fn as_loss(mut game: RawGame) -> RawGame {
    game.white.result = Some("resigned".to_string());
    game.black.result = Some("win".to_string());
    game
}

/// A minimal callback payload for a game where [`PLAYER`] sat white.
pub fn callback_payload(my_rating: i32, my_delta: i32) -> serde_json::Value {
    serde_json::json!({
        "game": { "ratingChangeWhite": my_delta, "ratingChangeBlack": -my_delta },
        "players": {
            "top": {
                "username": "rival",
                "rating": 1480,
                "accuracy": 77.5,
                "countryName": "Norway",
                "membershipCode": "basic"
            },
            "bottom": { "username": PLAYER, "rating": my_rating, "accuracy": 90.1 }
        }
    })
}
