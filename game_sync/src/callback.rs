//! Queue-driven callback enrichment.
//!
//! Drains pending queue items against the per-game callback endpoint and
//! patches the extra columns (pregame ratings, accuracies, opponent profile
//! snapshot) onto stored games. One bad item never aborts the batch; it just
//! accrues an attempt and flips to `failed` once the attempt cap is hit.

use std::time::Duration;

use chess_api::endpoints::{GameId, GameKind};
use chess_api::models::CallbackResponse;
use chess_api::PlatformSource;
use diesel::SqliteConnection;

use crate::models::{CallbackPatch, GameRecord, QueueItem};
use crate::store::{games, queue, StoreResult};

/// Knobs for one queue-draining run.
#[derive(Debug, Clone)]
pub struct CallbackParams {
    /// Tracked player; picks which side of the callback payload is "mine".
    pub username: String,
    /// Maximum items leased per run.
    pub batch_limit: i64,
    /// Pause between consecutive callback calls. The callback host sits
    /// outside the shared limiter, so pacing happens here.
    pub delay: Duration,
    /// Attempts before an item is parked as `failed`.
    pub max_attempts: i32,
}

/// What one queue run accomplished.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CallbackSummary {
    pub processed: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Drain up to `batch_limit` pending items.
pub async fn process_queue(
    conn: &mut SqliteConnection,
    source: &dyn PlatformSource,
    params: &CallbackParams,
) -> StoreResult<CallbackSummary> {
    let items = queue::pending(conn, params.batch_limit)?;
    let mut summary = CallbackSummary::default();

    for (i, item) in items.iter().enumerate() {
        if i > 0 && !params.delay.is_zero() {
            tokio::time::sleep(params.delay).await;
        }
        summary.processed += 1;
        match process_item(conn, source, params, item).await {
            Ok(()) => {
                queue::mark_completed(conn, item.game_id)?;
                summary.completed += 1;
            }
            Err(e) => {
                tracing::warn!(game_id = item.game_id, url = %item.url, error = %e, "callback item failed");
                queue::mark_failure(conn, item.game_id, &e.to_string(), params.max_attempts)?;
                summary.failed += 1;
            }
        }
    }

    tracing::info!(
        processed = summary.processed,
        completed = summary.completed,
        failed = summary.failed,
        "queue run complete"
    );
    Ok(summary)
}

async fn process_item(
    conn: &mut SqliteConnection,
    source: &dyn PlatformSource,
    params: &CallbackParams,
    item: &QueueItem,
) -> anyhow::Result<()> {
    let game = games::by_url(conn, &item.url)?
        .ok_or_else(|| anyhow::anyhow!("no stored game for {}", item.url))?;

    let kind = match item.kind.as_str() {
        "daily" => GameKind::Daily,
        _ => GameKind::Live,
    };
    let id = GameId {
        kind,
        id: item.game_id as u64,
    };

    let resp = source.game_callback(&id).await?;
    let patch = build_patch(&resp, &game, &params.username);
    if !games::patch_by_url(conn, &item.url, &patch)? {
        anyhow::bail!("patch target vanished for {}", item.url);
    }
    Ok(())
}

/// Derive the patch columns from a callback payload.
///
/// Pregame rating is reconstructed as post-game rating minus the delta the
/// game applied; either side missing leaves that column untouched.
fn build_patch(resp: &CallbackResponse, game: &GameRecord, username: &str) -> CallbackPatch {
    let me = resp.player(username);
    let opponent = resp.opponent(username);

    let (my_delta, opp_delta) = match game.my_color.as_deref() {
        Some("white") => (resp.game.rating_change_white, resp.game.rating_change_black),
        Some("black") => (resp.game.rating_change_black, resp.game.rating_change_white),
        _ => (None, None),
    };

    let my_post = me.and_then(|p| p.rating).or(game.my_rating);
    let opp_post = opponent.and_then(|p| p.rating).or(game.opponent_rating);

    CallbackPatch {
        my_pregame_rating: pregame(my_post, my_delta),
        opponent_pregame_rating: pregame(opp_post, opp_delta),
        my_accuracy: me.and_then(|p| p.accuracy),
        opponent_accuracy: opponent.and_then(|p| p.accuracy),
        opponent_country: opponent.and_then(|p| p.country_name.clone()),
        opponent_membership: opponent.and_then(|p| p.membership_code.clone()),
    }
}

fn pregame(post: Option<i32>, delta: Option<i32>) -> Option<i32> {
    Some(post? - delta?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(json: serde_json::Value) -> CallbackResponse {
        serde_json::from_value(json).unwrap()
    }

    fn stored_game(my_color: &str) -> GameRecord {
        let raw = chess_api::models::RawGame {
            url: "https://www.chess.com/game/live/1".to_string(),
            pgn: None,
            time_control: Some("300".to_string()),
            start_time: None,
            end_time: 1_700_000_000,
            rated: Some(true),
            time_class: Some("blitz".to_string()),
            rules: Some("chess".to_string()),
            white: chess_api::models::RawPlayer {
                username: "me".to_string(),
                rating: Some(1500),
                result: Some("win".to_string()),
            },
            black: chess_api::models::RawPlayer {
                username: "rival".to_string(),
                rating: Some(1480),
                result: Some("resigned".to_string()),
            },
        };
        let who = if my_color == "white" { "me" } else { "rival" };
        crate::enrich::enrich(&raw, who, &crate::enrich::EnrichOptions::default())
    }

    #[test]
    fn pregame_is_post_minus_delta() {
        let resp = response(serde_json::json!({
            "game": { "ratingChangeWhite": 8, "ratingChangeBlack": -8 },
            "players": {
                "top": { "username": "rival", "rating": 1480, "accuracy": 77.0,
                         "countryName": "Norway", "membershipCode": "basic" },
                "bottom": { "username": "me", "rating": 1500, "accuracy": 91.5 }
            }
        }));
        let patch = build_patch(&resp, &stored_game("white"), "me");
        assert_eq!(patch.my_pregame_rating, Some(1492));
        assert_eq!(patch.opponent_pregame_rating, Some(1488));
        assert_eq!(patch.my_accuracy, Some(91.5));
        assert_eq!(patch.opponent_country.as_deref(), Some("Norway"));
        assert_eq!(patch.opponent_membership.as_deref(), Some("basic"));
    }

    #[test]
    fn missing_deltas_leave_pregame_untouched() {
        let resp = response(serde_json::json!({
            "game": {},
            "players": {
                "top": { "username": "rival", "rating": 1480 },
                "bottom": { "username": "me", "rating": 1500 }
            }
        }));
        let patch = build_patch(&resp, &stored_game("white"), "me");
        assert_eq!(patch.my_pregame_rating, None);
        assert_eq!(patch.opponent_pregame_rating, None);
    }

    #[test]
    fn black_perspective_swaps_deltas() {
        let resp = response(serde_json::json!({
            "game": { "ratingChangeWhite": 8, "ratingChangeBlack": -8 },
            "players": {
                "top": { "username": "me", "rating": 1500 },
                "bottom": { "username": "rival", "rating": 1472 }
            }
        }));
        // Tracked player is "rival", who sat black.
        let patch = build_patch(&resp, &stored_game("black"), "rival");
        assert_eq!(patch.my_pregame_rating, Some(1472 - (-8)));
    }
}
