//! Games table: duplicate-filtered batch insert, callback patching, reads.

use std::collections::HashSet;

use chrono::Utc;
use diesel::prelude::*;

use crate::models::{CallbackPatch, GameRecord, NewRatingEvent};
use crate::schema::{games, rating_events};
use crate::store::StoreResult;

/// URLs from `candidates` that already exist in the store.
pub fn existing_urls(
    conn: &mut SqliteConnection,
    candidates: &[GameRecord],
) -> StoreResult<HashSet<String>> {
    use crate::schema::games::dsl::*;

    let candidate_urls: Vec<&str> = candidates.iter().map(|g| g.url.as_str()).collect();
    let found: Vec<String> = games
        .filter(url.eq_any(&candidate_urls))
        .select(url)
        .load(conn)?;
    Ok(found.into_iter().collect())
}

/// Set-difference a candidate batch against the store, returning the fresh
/// records and the number of duplicates dropped.
pub fn filter_new(
    conn: &mut SqliteConnection,
    batch: Vec<GameRecord>,
) -> StoreResult<(Vec<GameRecord>, usize)> {
    let existing = existing_urls(conn, &batch)?;
    let before = batch.len();
    let fresh: Vec<GameRecord> = batch
        .into_iter()
        .filter(|g| !existing.contains(&g.url))
        .collect();
    let dupes = before - fresh.len();
    Ok((fresh, dupes))
}

/// Insert a pre-filtered batch and append one per-game rating event per
/// record that carries a rating. `ON CONFLICT DO NOTHING` keeps re-ingestion
/// of the same url a no-op even if a concurrent writer raced the filter.
///
/// Returns the urls actually written.
pub fn insert_batch(
    conn: &mut SqliteConnection,
    records: &[GameRecord],
) -> StoreResult<Vec<String>> {
    let now = Utc::now().timestamp();
    let mut written = Vec::with_capacity(records.len());
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        for record in records {
            // processed_at marks insert time. A record can ride in a
            // checkpoint buffer long after enrichment, and the daily-stats
            // watermark keys off this column.
            let mut row = record.clone();
            row.processed_at = now;
            let inserted = diesel::insert_into(games::table)
                .values(&row)
                .on_conflict(games::url)
                .do_nothing()
                .execute(conn)?;
            if inserted == 0 {
                continue;
            }
            written.push(row.url.clone());
            if let Some(rating) = row.my_rating {
                diesel::insert_into(rating_events::table)
                    .values(&NewRatingEvent {
                        timestamp: row.end_time,
                        format: &row.format,
                        rating,
                        game_url: Some(&row.url),
                        source: "game",
                    })
                    .execute(conn)?;
            }
        }
        Ok(())
    })?;
    Ok(written)
}

/// Patch callback-derived columns on one row; `None` fields stay untouched.
/// Returns false when the url is unknown.
pub fn patch_by_url(
    conn: &mut SqliteConnection,
    game_url: &str,
    patch: &CallbackPatch,
) -> StoreResult<bool> {
    use crate::schema::games::dsl::*;

    let updated = diesel::update(games.filter(url.eq(game_url)))
        .set(patch)
        .execute(conn)?;
    Ok(updated > 0)
}

/// Load one record by url.
pub fn by_url(conn: &mut SqliteConnection, game_url: &str) -> StoreResult<Option<GameRecord>> {
    use crate::schema::games::dsl::*;

    Ok(games
        .filter(url.eq(game_url))
        .select(GameRecord::as_select())
        .first(conn)
        .optional()?)
}

/// All games with `end_time` in `[start, end)`, oldest first.
pub fn in_end_time_range(
    conn: &mut SqliteConnection,
    start: i64,
    end: i64,
) -> StoreResult<Vec<GameRecord>> {
    use crate::schema::games::dsl::*;

    Ok(games
        .filter(end_time.ge(start).and(end_time.lt(end)))
        .order(end_time.asc())
        .select(GameRecord::as_select())
        .load(conn)?)
}

/// Games first processed at or after the given instant; drives incremental
/// daily-stats recomputation. Inclusive so a watermark landing in the same
/// second as a write never skips it; recomputing a date twice is harmless.
pub fn processed_after(
    conn: &mut SqliteConnection,
    after: i64,
) -> StoreResult<Vec<GameRecord>> {
    use crate::schema::games::dsl::*;

    Ok(games
        .filter(processed_at.ge(after))
        .select(GameRecord::as_select())
        .load(conn)?)
}

/// Total stored games.
pub fn count(conn: &mut SqliteConnection) -> StoreResult<i64> {
    use crate::schema::games::dsl::*;

    Ok(games.count().get_result(conn)?)
}
