//! Per-game enrichment: raw archive payload -> fully derived [`GameRecord`].
//!
//! `enrich` is a pure transform. Malformed sub-fields (bad PGN, bad
//! time-control, bad clock annotations) degrade to absent derived fields and
//! never fail the game or the batch.

pub mod clock;
pub mod pgn;
pub mod time_control;

use chess_api::endpoints::GameId;
use chess_api::models::{RawGame, RawPlayer};
use chrono::Utc;

use crate::format::{self, SpeedThresholds};
use crate::models::GameRecord;
use pgn::Headers;

/// Version stamped on rows so later schema migrations can re-derive
/// selectively.
pub const SCHEMA_VERSION: i32 = 1;

/// Knobs for the enricher.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Whether to retain per-ply clock and move-time arrays.
    pub keep_move_clocks: bool,
    /// Speed-class boundaries.
    pub thresholds: SpeedThresholds,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            keep_move_clocks: true,
            thresholds: SpeedThresholds::default(),
        }
    }
}

/// Map the upstream result vocabulary to a numeric score.
pub fn outcome_score(result: &str) -> Option<f64> {
    match result {
        "win" => Some(1.0),
        "agreed" | "repetition" | "stalemate" | "insufficient" | "timevsinsufficient"
        | "50move" => Some(0.5),
        "resigned" | "checkmated" | "abandoned" | "timeout" | "lose" | "kingofthehill"
        | "threecheck" | "bughousepartnerlose" => Some(0.0),
        _ => None,
    }
}

/// Turn one raw game into a derived record from the perspective of `username`.
pub fn enrich(raw: &RawGame, username: &str, opts: &EnrichOptions) -> GameRecord {
    let headers = raw
        .pgn
        .as_deref()
        .map(Headers::parse)
        .unwrap_or_default();
    let tc = raw.time_control.as_deref().and_then(time_control::parse);

    let (move_clocks, move_times, duration_secs) = derive_clocks(raw, tc.as_ref(), opts);

    // Header UTC anchors beat the bulk epoch field; a missing start is
    // derived from the end minus the computed duration.
    let end_time = headers
        .end_instant()
        .map(|d| d.timestamp())
        .unwrap_or(raw.end_time);
    let start_time = headers
        .start_instant()
        .map(|d| d.timestamp())
        .or(raw.start_time)
        .or_else(|| duration_secs.map(|d| end_time - d.round() as i64));

    let is_daily_url = GameId::from_game_url(&raw.url)
        .map(|id| id.is_daily())
        .unwrap_or(false);
    let format = format::classify(
        is_daily_url,
        raw.rules.as_deref(),
        raw.time_class.as_deref(),
        tc.as_ref().map(|t| t.estimate_secs()),
        &opts.thresholds,
    );

    let (me, opponent, my_color) = perspective(raw, username);
    let my_result = me.and_then(|p| p.result.clone());
    let my_outcome = my_result.as_deref().and_then(outcome_score);

    let opening = headers.get("Opening").map(str::to_string).or_else(|| {
        headers
            .get("ECOUrl")
            .and_then(|u| u.rsplit('/').next())
            .map(|tail| tail.replace('-', " "))
    });

    GameRecord {
        url: raw.url.clone(),
        start_time,
        end_time,
        rated: raw.rated,
        rules: raw.rules.clone(),
        time_class: raw.time_class.clone(),
        time_control: raw.time_control.clone(),
        base_time_secs: tc.as_ref().map(|t| t.base_secs),
        increment_secs: tc.as_ref().map(|t| t.increment_secs),
        moves_per_unit: tc.as_ref().and_then(|t| t.moves_per_unit),
        format: format.key(),
        white_username: raw.white.username.clone(),
        white_rating: raw.white.rating,
        white_result: raw.white.result.clone(),
        black_username: raw.black.username.clone(),
        black_rating: raw.black.rating,
        black_result: raw.black.result.clone(),
        my_color: my_color.map(str::to_string),
        my_rating: me.and_then(|p| p.rating),
        my_result,
        my_outcome,
        opponent_username: opponent.map(|p| p.username.clone()),
        opponent_rating: opponent.and_then(|p| p.rating),
        eco: headers.get("ECO").map(str::to_string),
        opening,
        termination: headers.get("Termination").map(str::to_string),
        duration_secs,
        move_clocks,
        move_times,
        my_pregame_rating: None,
        opponent_pregame_rating: None,
        my_accuracy: None,
        opponent_accuracy: None,
        opponent_country: None,
        opponent_membership: None,
        processed_at: Utc::now().timestamp(),
        schema_version: SCHEMA_VERSION,
    }
}

fn derive_clocks(
    raw: &RawGame,
    tc: Option<&time_control::TimeControl>,
    opts: &EnrichOptions,
) -> (Option<String>, Option<String>, Option<f64>) {
    if !opts.keep_move_clocks {
        return (None, None, None);
    }
    let (Some(pgn), Some(tc)) = (raw.pgn.as_deref(), tc) else {
        return (None, None, None);
    };
    let clocks = clock::extract_clocks(pgn);
    if clocks.is_empty() {
        return (None, None, None);
    }
    let times = clock::move_times(&clocks, tc.base_secs as f64, tc.increment_secs as f64);
    let duration = clock::game_duration(&times);
    (
        serde_json::to_string(&clocks).ok(),
        serde_json::to_string(&times).ok(),
        duration,
    )
}

fn perspective<'a>(
    raw: &'a RawGame,
    username: &str,
) -> (Option<&'a RawPlayer>, Option<&'a RawPlayer>, Option<&'static str>) {
    if raw.white.username.eq_ignore_ascii_case(username) {
        (Some(&raw.white), Some(&raw.black), Some("white"))
    } else if raw.black.username.eq_ignore_ascii_case(username) {
        (Some(&raw.black), Some(&raw.white), Some("black"))
    } else {
        (None, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_api::models::RawPlayer;

    fn player(name: &str, rating: i32, result: &str) -> RawPlayer {
        RawPlayer {
            username: name.to_string(),
            rating: Some(rating),
            result: Some(result.to_string()),
        }
    }

    fn raw_live_game() -> RawGame {
        RawGame {
            url: "https://www.chess.com/game/live/1001".to_string(),
            pgn: Some(
                r#"[ECO "B01"]
[UTCDate "2021.05.31"]
[UTCTime "22:15:00"]
[EndDate "2021.05.31"]
[EndTime "22:17:30"]
[Termination "alice won by resignation"]

1. e4 {[%clk 0:00:58.9]} 1... d5 {[%clk 0:00:59.0]} 2. exd5 {[%clk 0:00:57.4]} 1-0"#
                    .to_string(),
            ),
            time_control: Some("60".to_string()),
            start_time: None,
            end_time: 1_622_499_000,
            rated: Some(true),
            time_class: None,
            rules: Some("chess".to_string()),
            white: player("Alice", 1200, "win"),
            black: player("bob", 1180, "resigned"),
        }
    }

    #[test]
    fn full_live_game_white_perspective() {
        let rec = enrich(&raw_live_game(), "alice", &EnrichOptions::default());
        assert_eq!(rec.format, "bullet");
        assert_eq!(rec.my_color.as_deref(), Some("white"));
        assert_eq!(rec.my_outcome, Some(1.0));
        assert_eq!(rec.my_rating, Some(1200));
        assert_eq!(rec.opponent_username.as_deref(), Some("bob"));
        assert_eq!(rec.eco.as_deref(), Some("B01"));
        // Header anchors beat the bulk epoch.
        assert_eq!(rec.end_time, 1_622_499_450);
        assert_eq!(rec.start_time, Some(1_622_499_300));
        assert!(rec.duration_secs.is_some());
        assert!(rec.move_clocks.is_some());
        assert_eq!(rec.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn black_perspective_and_loss_mapping() {
        let rec = enrich(&raw_live_game(), "BOB", &EnrichOptions::default());
        assert_eq!(rec.my_color.as_deref(), Some("black"));
        assert_eq!(rec.my_outcome, Some(0.0));
        assert_eq!(rec.opponent_rating, Some(1200));
    }

    #[test]
    fn unknown_player_degrades_perspective_only() {
        let rec = enrich(&raw_live_game(), "carol", &EnrichOptions::default());
        assert!(rec.my_color.is_none());
        assert!(rec.my_outcome.is_none());
        assert_eq!(rec.format, "bullet");
    }

    #[test]
    fn missing_pgn_and_bad_time_control_degrade() {
        let mut raw = raw_live_game();
        raw.pgn = None;
        raw.time_control = Some("garbage".to_string());
        let rec = enrich(&raw, "alice", &EnrichOptions::default());
        assert!(rec.base_time_secs.is_none());
        assert!(rec.duration_secs.is_none());
        assert!(rec.eco.is_none());
        assert_eq!(rec.end_time, 1_622_499_000, "falls back to bulk epoch");
        // No time-control and no upstream class: defaults to blitz.
        assert_eq!(rec.format, "blitz");
    }

    #[test]
    fn clock_retention_can_be_disabled() {
        let opts = EnrichOptions {
            keep_move_clocks: false,
            ..Default::default()
        };
        let rec = enrich(&raw_live_game(), "alice", &opts);
        assert!(rec.move_clocks.is_none());
        assert!(rec.move_times.is_none());
        assert!(rec.duration_secs.is_none());
    }

    #[test]
    fn daily_url_classifies_daily() {
        let mut raw = raw_live_game();
        raw.url = "https://www.chess.com/game/daily/555".to_string();
        raw.time_control = Some("1/86400".to_string());
        let rec = enrich(&raw, "alice", &EnrichOptions::default());
        assert_eq!(rec.format, "daily");
        assert_eq!(rec.moves_per_unit, Some(1));
    }

    #[test]
    fn draw_vocabulary_maps_to_half() {
        for word in ["agreed", "repetition", "stalemate", "insufficient", "timevsinsufficient"] {
            assert_eq!(outcome_score(word), Some(0.5), "{word}");
        }
        for word in ["resigned", "checkmated", "abandoned", "timeout", "lose"] {
            assert_eq!(outcome_score(word), Some(0.0), "{word}");
        }
        assert_eq!(outcome_score("win"), Some(1.0));
        assert_eq!(outcome_score("mystery"), None);
    }
}
