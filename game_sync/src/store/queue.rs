//! Callback work queue: pending -> completed | failed after bounded attempts.

use chess_api::endpoints::GameId;
use chrono::Utc;
use diesel::prelude::*;

use crate::models::{NewQueueItem, QueueItem};
use crate::schema::callback_queue;
use crate::store::StoreResult;

/// Enqueue callback work for freshly written games. URLs that don't match
/// the `game/(live|daily)/(id)` shape are skipped with a warning; already
/// queued ids are left alone.
pub fn enqueue_urls(conn: &mut SqliteConnection, urls: &[String]) -> StoreResult<usize> {
    let now = Utc::now().timestamp();
    let mut enqueued = 0;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        for url in urls {
            let id = match GameId::from_game_url(url) {
                Ok(id) => id,
                Err(e) => {
                    tracing::warn!(%url, error = %e, "skipping unqueueable game url");
                    continue;
                }
            };
            let inserted = diesel::insert_into(callback_queue::table)
                .values(&NewQueueItem {
                    game_id: id.id as i64,
                    url,
                    kind: &id.kind.to_string(),
                    status: "pending",
                    created_at: now,
                    updated_at: now,
                })
                .on_conflict(callback_queue::game_id)
                .do_nothing()
                .execute(conn)?;
            enqueued += inserted;
        }
        Ok(())
    })?;
    Ok(enqueued)
}

/// Up to `limit` pending items, oldest first.
pub fn pending(conn: &mut SqliteConnection, limit: i64) -> StoreResult<Vec<QueueItem>> {
    use crate::schema::callback_queue::dsl::*;

    Ok(callback_queue
        .filter(status.eq("pending"))
        .order(created_at.asc())
        .limit(limit)
        .select(QueueItem::as_select())
        .load(conn)?)
}

/// Mark one item completed.
pub fn mark_completed(conn: &mut SqliteConnection, id: i64) -> StoreResult<()> {
    use crate::schema::callback_queue::dsl::*;

    diesel::update(callback_queue.filter(game_id.eq(id)))
        .set((status.eq("completed"), updated_at.eq(Utc::now().timestamp())))
        .execute(conn)?;
    Ok(())
}

/// Record a failure: attempts + 1 and the error text; the item flips to
/// `failed` once attempts reach `max_attempts`, otherwise stays pending.
pub fn mark_failure(
    conn: &mut SqliteConnection,
    id: i64,
    error: &str,
    max_attempts: i32,
) -> StoreResult<()> {
    use crate::schema::callback_queue::dsl::*;

    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let current: i32 = callback_queue
            .filter(game_id.eq(id))
            .select(attempts)
            .first(conn)?;
        let next = current + 1;
        let new_status = if next >= max_attempts { "failed" } else { "pending" };
        diesel::update(callback_queue.filter(game_id.eq(id)))
            .set((
                attempts.eq(next),
                status.eq(new_status),
                last_error.eq(error),
                updated_at.eq(Utc::now().timestamp()),
            ))
            .execute(conn)?;
        Ok(())
    })
}

/// Item counts per status, for run summaries and the status surface.
pub fn counts_by_status(conn: &mut SqliteConnection) -> StoreResult<Vec<(String, i64)>> {
    use crate::schema::callback_queue::dsl::*;

    Ok(callback_queue
        .group_by(status)
        .select((status, diesel::dsl::count_star()))
        .load(conn)?)
}

/// Load one item by game id.
pub fn by_id(conn: &mut SqliteConnection, id: i64) -> StoreResult<Option<QueueItem>> {
    use crate::schema::callback_queue::dsl::*;

    Ok(callback_queue
        .filter(game_id.eq(id))
        .select(QueueItem::as_select())
        .first(conn)
        .optional()?)
}
