//! Queue-driven callback enrichment: patching, attempts, isolation.

mod common;

use std::time::Duration;

use game_sync::callback::{self, CallbackParams};
use game_sync::enrich::{enrich, EnrichOptions};
use game_sync::store::{games, queue};

use common::{callback_payload, raw_game, setup_db, FakeSource, PLAYER};

fn params() -> CallbackParams {
    CallbackParams {
        username: PLAYER.to_string(),
        batch_limit: 50,
        delay: Duration::ZERO,
        max_attempts: 3,
    }
}

/// Write the game rows and queue items the ingestion phase would have left.
fn seed_games(conn: &mut diesel::SqliteConnection, ids: &[u64]) {
    let records: Vec<_> = ids
        .iter()
        .map(|id| {
            enrich(
                &raw_game(*id, 1_620_000_000 + *id as i64, "300"),
                PLAYER,
                &EnrichOptions::default(),
            )
        })
        .collect();
    let written = games::insert_batch(conn, &records).unwrap();
    queue::enqueue_urls(conn, &written).unwrap();
}

#[tokio::test]
async fn completed_item_patches_the_game_row() {
    let (mut conn, _dir) = setup_db();
    seed_games(&mut conn, &[1]);

    let mut source = FakeSource::default();
    source.callbacks.insert(1, callback_payload(1500, 8));

    let summary = callback::process_queue(&mut conn, &source, &params())
        .await
        .unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 0);

    let game = games::by_url(&mut conn, "https://www.chess.com/game/live/1")
        .unwrap()
        .unwrap();
    assert_eq!(game.my_pregame_rating, Some(1492));
    assert_eq!(game.opponent_pregame_rating, Some(1488));
    assert_eq!(game.my_accuracy, Some(90.1));
    assert_eq!(game.opponent_accuracy, Some(77.5));
    assert_eq!(game.opponent_country.as_deref(), Some("Norway"));

    let item = queue::by_id(&mut conn, 1).unwrap().unwrap();
    assert_eq!(item.status, "completed");
}

#[tokio::test]
async fn one_bad_item_does_not_abort_the_batch() {
    let (mut conn, _dir) = setup_db();
    seed_games(&mut conn, &[1, 2]);

    let mut source = FakeSource::default();
    source.failing_callbacks.insert(1);
    source.callbacks.insert(2, callback_payload(1500, 5));

    let summary = callback::process_queue(&mut conn, &source, &params())
        .await
        .unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.failed, 1);

    let bad = queue::by_id(&mut conn, 1).unwrap().unwrap();
    assert_eq!(bad.status, "pending", "one failure leaves the item retryable");
    assert_eq!(bad.attempts, 1);
    assert!(bad.last_error.is_some());

    let good = queue::by_id(&mut conn, 2).unwrap().unwrap();
    assert_eq!(good.status, "completed");
}

#[tokio::test]
async fn item_parks_as_failed_after_the_attempt_cap() {
    let (mut conn, _dir) = setup_db();
    seed_games(&mut conn, &[1]);

    let mut source = FakeSource::default();
    source.failing_callbacks.insert(1);

    for _ in 0..3 {
        callback::process_queue(&mut conn, &source, &params())
            .await
            .unwrap();
    }

    let item = queue::by_id(&mut conn, 1).unwrap().unwrap();
    assert_eq!(item.status, "failed");
    assert_eq!(item.attempts, 3);

    // Parked items are no longer leased.
    let summary = callback::process_queue(&mut conn, &source, &params())
        .await
        .unwrap();
    assert_eq!(summary.processed, 0);
}

#[tokio::test]
async fn queue_item_without_a_game_row_counts_as_a_failure() {
    let (mut conn, _dir) = setup_db();
    queue::enqueue_urls(
        &mut conn,
        &["https://www.chess.com/game/live/7".to_string()],
    )
    .unwrap();

    let mut source = FakeSource::default();
    source.callbacks.insert(7, callback_payload(1500, 8));

    let summary = callback::process_queue(&mut conn, &source, &params())
        .await
        .unwrap();
    assert_eq!(summary.failed, 1);
    let item = queue::by_id(&mut conn, 7).unwrap().unwrap();
    assert_eq!(item.attempts, 1);
}

#[tokio::test]
async fn batch_limit_caps_the_lease() {
    let (mut conn, _dir) = setup_db();
    seed_games(&mut conn, &[1, 2, 3]);

    let mut source = FakeSource::default();
    for id in 1..=3 {
        source.callbacks.insert(id, callback_payload(1500, 8));
    }

    let mut limited = params();
    limited.batch_limit = 2;
    let summary = callback::process_queue(&mut conn, &source, &limited)
        .await
        .unwrap();
    assert_eq!(summary.processed, 2);

    let counts = queue::counts_by_status(&mut conn).unwrap();
    assert!(counts.contains(&("pending".to_string(), 1)));
    assert!(counts.contains(&("completed".to_string(), 2)));
}
