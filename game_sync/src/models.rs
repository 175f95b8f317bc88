//! Diesel models mapping to the database schema.
//!
//! These types mirror the tables defined in the embedded migrations and in
//! [`crate::schema`]:
//! - [`crate::schema::games`] — one row per finished game, keyed by URL
//! - [`crate::schema::rating_events`] — append-only rating observations
//! - [`crate::schema::daily_stats`] — per (date, format) rollups
//! - [`crate::schema::callback_queue`] — second-phase enrichment work items
//!
//! [`GameRecord`] doubles as the domain type produced by the enricher: it is
//! serde-serializable because unflushed records ride inside ingestion
//! checkpoints between invocations.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::schema::*;

/// A fully derived game, one row in [`crate::schema::games`].
///
/// Field groups are optional as a block: PGN-derived fields are absent when
/// the movetext is missing or malformed, clock-derived fields when clock
/// retention is off, callback-derived fields until the queue job patches the
/// row. Timestamps are Unix seconds UTC.
#[derive(
    Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset, Serialize, Deserialize,
)]
#[diesel(table_name = games, check_for_backend(diesel::sqlite::Sqlite))]
pub struct GameRecord {
    /// Canonical game URL, the natural unique key.
    pub url: String,
    /// Game start, from headers when available, else derived.
    pub start_time: Option<i64>,
    /// Game end.
    pub end_time: i64,
    /// Whether the game counted for rating.
    pub rated: Option<bool>,
    /// Rules variant, `"chess"` for standard games.
    pub rules: Option<String>,
    /// Upstream speed class as reported, untouched.
    pub time_class: Option<String>,
    /// Raw time-control string.
    pub time_control: Option<String>,
    /// Parsed base time in seconds.
    pub base_time_secs: Option<i32>,
    /// Parsed per-move increment in seconds.
    pub increment_secs: Option<i32>,
    /// For daily controls `M/S`: moves per time unit.
    pub moves_per_unit: Option<i32>,
    /// Classified format key, see [`crate::format::Format`].
    pub format: String,
    /// White's account name.
    pub white_username: String,
    /// White's post-game rating.
    pub white_rating: Option<i32>,
    /// White's upstream result word.
    pub white_result: Option<String>,
    /// Black's account name.
    pub black_username: String,
    /// Black's post-game rating.
    pub black_rating: Option<i32>,
    /// Black's upstream result word.
    pub black_result: Option<String>,
    /// `"white"` or `"black"` for the tracked player.
    pub my_color: Option<String>,
    /// Tracked player's post-game rating.
    pub my_rating: Option<i32>,
    /// Tracked player's upstream result word.
    pub my_result: Option<String>,
    /// Numeric outcome for the tracked player: 1, 0.5, or 0.
    pub my_outcome: Option<f64>,
    /// Opponent's account name.
    pub opponent_username: Option<String>,
    /// Opponent's post-game rating.
    pub opponent_rating: Option<i32>,
    /// ECO code from the headers.
    pub eco: Option<String>,
    /// Opening name or ECO URL tail from the headers.
    pub opening: Option<String>,
    /// Termination header text.
    pub termination: Option<String>,
    /// Wall-clock game length in seconds, from the clock annotations.
    pub duration_secs: Option<f64>,
    /// JSON array of per-ply clock readings in seconds, when retention is on.
    pub move_clocks: Option<String>,
    /// JSON array of per-ply time spent in seconds, when retention is on.
    pub move_times: Option<String>,
    /// Tracked player's pre-game rating (callback-derived).
    pub my_pregame_rating: Option<i32>,
    /// Opponent's pre-game rating (callback-derived).
    pub opponent_pregame_rating: Option<i32>,
    /// Tracked player's accuracy (callback-derived).
    pub my_accuracy: Option<f64>,
    /// Opponent's accuracy (callback-derived).
    pub opponent_accuracy: Option<f64>,
    /// Opponent country snapshot (callback-derived).
    pub opponent_country: Option<String>,
    /// Opponent membership snapshot (callback-derived).
    pub opponent_membership: Option<String>,
    /// When this row landed in the store; stamped by the batch writer.
    pub processed_at: i64,
    /// Enrichment schema version stamped on the row.
    pub schema_version: i32,
}

/// Callback-derived patch for an existing game row; `None` fields are left
/// untouched by `AsChangeset`.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = games)]
pub struct CallbackPatch {
    /// Tracked player's pre-game rating.
    pub my_pregame_rating: Option<i32>,
    /// Opponent's pre-game rating.
    pub opponent_pregame_rating: Option<i32>,
    /// Tracked player's accuracy.
    pub my_accuracy: Option<f64>,
    /// Opponent's accuracy.
    pub opponent_accuracy: Option<f64>,
    /// Opponent country snapshot.
    pub opponent_country: Option<String>,
    /// Opponent membership snapshot.
    pub opponent_membership: Option<String>,
}

/// A new row in [`crate::schema::rating_events`]; the resolver reads events
/// back as plain tuples.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = rating_events)]
pub struct NewRatingEvent<'a> {
    /// Observation time, Unix seconds UTC.
    pub timestamp: i64,
    /// Format key the rating belongs to.
    pub format: &'a str,
    /// Rating value.
    pub rating: i32,
    /// Back-reference to the producing game, if any.
    pub game_url: Option<&'a str>,
    /// `"game"` or `"stats"`.
    pub source: &'a str,
}

/// A row in [`crate::schema::daily_stats`]; `format = "all"` carries the
/// cross-format totals for the date.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = daily_stats, check_for_backend(diesel::sqlite::Sqlite))]
pub struct DailyStatRow {
    /// Date in `YYYY-MM-DD` (UTC).
    pub date: String,
    /// Format key, or `"all"` for the totals row.
    pub format: String,
    /// Games finished on the date.
    pub games: i32,
    /// Wins.
    pub wins: i32,
    /// Draws.
    pub draws: i32,
    /// Losses.
    pub losses: i32,
    /// Sum of game durations in seconds.
    pub total_duration_secs: f64,
    /// Mean game duration, when durations are known.
    pub avg_duration_secs: Option<f64>,
    /// Mean opponent rating, when ratings are known.
    pub avg_opponent_rating: Option<f64>,
    /// Longest run of consecutive wins within the date.
    pub best_win_streak: i32,
    /// Longest run of consecutive losses within the date.
    pub worst_loss_streak: i32,
    /// Elo performance estimate for the date.
    pub performance_rating: Option<f64>,
    /// Rating at the previous day boundary.
    pub rating_start: Option<i32>,
    /// Rating at the current day boundary.
    pub rating_end: Option<i32>,
    /// `rating_end - rating_start`.
    pub rating_change: Option<i32>,
    /// Last upsert time, Unix seconds UTC.
    pub updated_at: i64,
}

/// A row in [`crate::schema::callback_queue`].
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = callback_queue, check_for_backend(diesel::sqlite::Sqlite))]
pub struct QueueItem {
    /// Numeric game id on the callback host.
    pub game_id: i64,
    /// Canonical game URL (store key for the patch).
    pub url: String,
    /// `"live"` or `"daily"`.
    pub kind: String,
    /// `"pending"`, `"completed"`, or `"failed"`.
    pub status: String,
    /// Processing attempts so far.
    pub attempts: i32,
    /// Error text of the most recent failure.
    pub last_error: Option<String>,
    /// Enqueue time, Unix seconds UTC.
    pub created_at: i64,
    /// Last state change, Unix seconds UTC.
    pub updated_at: i64,
}

/// Insertable form of [`QueueItem`].
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = callback_queue)]
pub struct NewQueueItem<'a> {
    /// Numeric game id on the callback host.
    pub game_id: i64,
    /// Canonical game URL.
    pub url: &'a str,
    /// `"live"` or `"daily"`.
    pub kind: &'a str,
    /// Initial status, `"pending"`.
    pub status: &'a str,
    /// Enqueue time.
    pub created_at: i64,
    /// Enqueue time.
    pub updated_at: i64,
}
