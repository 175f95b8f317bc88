use serde::{Deserialize, Serialize};

/// One month of a player's finished games, as returned by a monthly archive URL.
#[derive(Debug, Clone, Deserialize)]
pub struct MonthlyArchive {
    /// Raw games in upstream order (chronological, oldest first).
    pub games: Vec<RawGame>,
}

/// A single raw game from the bulk archive payload.
///
/// Only `url`, `end_time`, and the two player blocks are reliably present;
/// everything else degrades to `None` on absence. The struct is also
/// serializable because unprocessed games ride inside ingestion checkpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGame {
    /// Canonical game URL; globally unique, used as the store key.
    pub url: String,
    /// Movetext with embedded headers and clock annotations.
    pub pgn: Option<String>,
    /// Time-control string: `"N"`, `"N+I"`, or `"M/S"` for daily games.
    pub time_control: Option<String>,
    /// Game start as a Unix timestamp, present on daily games.
    pub start_time: Option<i64>,
    /// Game end as a Unix timestamp.
    pub end_time: i64,
    /// Whether the game counted for rating.
    pub rated: Option<bool>,
    /// Upstream speed class (`bullet`/`blitz`/`rapid`/`daily`), when provided.
    pub time_class: Option<String>,
    /// Rules variant, `"chess"` for standard games.
    pub rules: Option<String>,
    /// White's side of the result.
    pub white: RawPlayer,
    /// Black's side of the result.
    pub black: RawPlayer,
}

/// One player's slice of a raw game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPlayer {
    /// Account name, matched case-insensitively against the tracked player.
    pub username: String,
    /// Post-game rating.
    pub rating: Option<i32>,
    /// Upstream result word (`win`, `resigned`, `timeout`, ...).
    pub result: Option<String>,
}
