//! Daily rollups: rebuild, idempotent upserts, incremental updates.

mod common;

use chrono::Utc;
use diesel::SqliteConnection;
use game_sync::enrich::{enrich, EnrichOptions};
use game_sync::store::{daily, games, kv};
use game_sync::stats;

use common::{as_loss, raw_game, setup_db, PLAYER};

// 2021-05-03 00:00:00 UTC.
const MAY_3: i64 = 1_620_000_000;

fn seed(conn: &mut SqliteConnection, games_raw: Vec<chess_api::models::RawGame>) {
    let records: Vec<_> = games_raw
        .iter()
        .map(|g| enrich(g, PLAYER, &EnrichOptions::default()))
        .collect();
    games::insert_batch(conn, &records).unwrap();
}

#[test]
fn rebuild_writes_per_format_and_totals_rows() {
    let (mut conn, _dir) = setup_db();
    // Three blitz games (two wins, one loss) and one bullet win on one date.
    seed(
        &mut conn,
        vec![
            raw_game(1, MAY_3 + 100, "300"),
            raw_game(2, MAY_3 + 900, "300"),
            as_loss(raw_game(3, MAY_3 + 1_800, "300")),
            raw_game(4, MAY_3 + 3_600, "60"),
        ],
    );

    let summary = stats::rebuild(&mut conn).unwrap();
    assert_eq!(summary.dates, 1);
    assert_eq!(summary.rows, 3, "bullet, blitz, and the totals row");

    let rows = daily::for_date(&mut conn, "2021-05-03").unwrap();
    assert_eq!(rows.len(), 3);

    let all = rows.iter().find(|r| r.format == "all").unwrap();
    assert_eq!(all.games, 4);
    assert_eq!(all.wins, 3);
    assert_eq!(all.losses, 1);
    assert_eq!(all.draws, 0);

    let blitz = rows.iter().find(|r| r.format == "blitz").unwrap();
    assert_eq!(blitz.games, 3);
    assert_eq!(blitz.wins, 2);
    assert_eq!(blitz.losses, 1);
    assert_eq!(blitz.avg_opponent_rating, Some(1480.0));
    // Two thirds against 1480 lands above the opposition.
    assert!(blitz.performance_rating.unwrap() > 1480.0);
    // Wins at +100 and +900, loss at +1800: best streak 2, worst 1.
    assert_eq!(blitz.best_win_streak, 2);
    assert_eq!(blitz.worst_loss_streak, 1);

    // Per-game rating events give the format a rating track.
    assert_eq!(blitz.rating_end, Some(1500));
}

#[test]
fn rebuild_is_idempotent() {
    let (mut conn, _dir) = setup_db();
    seed(&mut conn, vec![raw_game(1, MAY_3 + 100, "300")]);

    stats::rebuild(&mut conn).unwrap();
    stats::rebuild(&mut conn).unwrap();

    assert_eq!(daily::count(&mut conn).unwrap(), 2, "blitz + all, once each");
}

#[test]
fn games_on_different_dates_get_separate_rows() {
    let (mut conn, _dir) = setup_db();
    seed(
        &mut conn,
        vec![
            raw_game(1, MAY_3 + 100, "300"),
            raw_game(2, MAY_3 + 86_400 + 100, "300"),
        ],
    );

    let summary = stats::rebuild(&mut conn).unwrap();
    assert_eq!(summary.dates, 2);
    assert_eq!(daily::for_date(&mut conn, "2021-05-03").unwrap().len(), 2);
    assert_eq!(daily::for_date(&mut conn, "2021-05-04").unwrap().len(), 2);
}

#[test]
fn incremental_update_covers_newly_processed_games() {
    let (mut conn, _dir) = setup_db();
    seed(&mut conn, vec![raw_game(1, MAY_3 + 100, "300")]);

    // First incremental run picks the game's date up via processed_at.
    let first = stats::update(&mut conn, 0).unwrap();
    assert!(first.dates >= 1);
    assert_eq!(daily::for_date(&mut conn, "2021-05-03").unwrap().len(), 2);

    // A later game on the same date triggers recomputation.
    seed(&mut conn, vec![raw_game(2, MAY_3 + 900, "300")]);
    stats::update(&mut conn, 0).unwrap();

    let rows = daily::for_date(&mut conn, "2021-05-03").unwrap();
    let all = rows.iter().find(|r| r.format == "all").unwrap();
    assert_eq!(all.games, 2);
}

#[test]
fn games_landing_after_a_stats_run_are_covered_despite_stale_enrichment() {
    let (mut conn, _dir) = setup_db();
    // A prior stats run left its watermark at the current instant.
    kv::put_json(&mut conn, "daily_stats/last_run", &Utc::now().timestamp()).unwrap();

    // A record enriched long before it lands, the shape a resumed run's
    // checkpoint buffer produces.
    let mut record = enrich(&raw_game(1, MAY_3 + 100, "300"), PLAYER, &EnrichOptions::default());
    record.processed_at = 1;
    games::insert_batch(&mut conn, &[record]).unwrap();

    stats::update(&mut conn, 0).unwrap();
    assert_eq!(daily::for_date(&mut conn, "2021-05-03").unwrap().len(), 2);
}

#[test]
fn unknown_outcomes_do_not_count_as_results() {
    let (mut conn, _dir) = setup_db();
    let mut game = raw_game(1, MAY_3 + 100, "300");
    game.white.result = Some("mystery".to_string());
    game.black.result = Some("mystery".to_string());
    seed(&mut conn, vec![game]);

    stats::rebuild(&mut conn).unwrap();
    let rows = daily::for_date(&mut conn, "2021-05-03").unwrap();
    let all = rows.iter().find(|r| r.format == "all").unwrap();
    assert_eq!(all.games, 1);
    assert_eq!(all.wins + all.draws + all.losses, 0);
    assert!(all.performance_rating.is_none());
}
