//! Rating event log and the nearest-neighbour resolver.

use std::collections::BTreeMap;

use chess_api::models::RatingSnapshot;
use chrono::Utc;
use diesel::prelude::*;

use crate::models::NewRatingEvent;
use crate::store::StoreResult;

/// Append snapshot events from a profile-stats payload, one per format.
/// An event identical to the latest stored one for its format is skipped so
/// repeated stats runs don't pile up duplicate observations.
pub fn append_snapshots(
    conn: &mut SqliteConnection,
    snapshots: &[RatingSnapshot],
) -> StoreResult<usize> {
    use crate::schema::rating_events::dsl::*;

    let now = Utc::now().timestamp();
    let mut appended = 0;
    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        for snap in snapshots {
            let last: Option<(i64, i32)> = rating_events
                .filter(format.eq(&snap.format))
                .order(timestamp.desc())
                .select((timestamp, rating))
                .first(conn)
                .optional()?;
            if last == Some((snap.timestamp, snap.rating)) {
                continue;
            }
            // Stats payloads date the rating; fall back to "now" if absent upstream.
            let ts = if snap.timestamp > 0 { snap.timestamp } else { now };
            diesel::insert_into(rating_events)
                .values(&NewRatingEvent {
                    timestamp: ts,
                    format: &snap.format,
                    rating: snap.rating,
                    game_url: None,
                    source: "stats",
                })
                .execute(conn)?;
            appended += 1;
        }
        Ok(())
    })?;
    Ok(appended)
}

/// Total stored rating events.
pub fn count(conn: &mut SqliteConnection) -> StoreResult<i64> {
    use crate::schema::rating_events::dsl::*;

    Ok(rating_events.count().get_result(conn)?)
}

/// Event-sourced rating history, answering "what was the rating for format F
/// nearest to timestamp T".
///
/// Events are loaded ascending per format; the ascending order is what makes
/// the binary search in [`RatingResolver::resolve`] valid.
pub struct RatingResolver {
    events: BTreeMap<String, Vec<(i64, i32)>>,
}

impl RatingResolver {
    /// Load every event, grouped by format, ordered by timestamp.
    pub fn load(conn: &mut SqliteConnection) -> StoreResult<Self> {
        use crate::schema::rating_events::dsl::*;

        let rows: Vec<(String, i64, i32)> = rating_events
            .order((format.asc(), timestamp.asc()))
            .select((format, timestamp, rating))
            .load(conn)?;

        let mut events: BTreeMap<String, Vec<(i64, i32)>> = BTreeMap::new();
        for (f, ts, r) in rows {
            events.entry(f).or_default().push((ts, r));
        }
        Ok(Self { events })
    }

    /// Build a resolver from in-memory events (tests).
    #[cfg(test)]
    pub fn from_events(events: BTreeMap<String, Vec<(i64, i32)>>) -> Self {
        Self { events }
    }

    /// Rating nearest to `target` for `format_key`; `None` when the format
    /// has no events. Ties between the neighbouring events favour the later
    /// one.
    pub fn resolve(&self, format_key: &str, target: i64) -> Option<i32> {
        let list = self.events.get(format_key)?;
        if list.is_empty() {
            return None;
        }
        let idx = list.partition_point(|(ts, _)| *ts <= target);
        let before = idx.checked_sub(1).map(|i| list[i]);
        let after = list.get(idx).copied();
        match (before, after) {
            (Some((bt, br)), Some((at, ar))) => {
                if (target - bt) < (at - target) {
                    Some(br)
                } else {
                    Some(ar)
                }
            }
            (Some((_, br)), None) => Some(br),
            (None, Some((_, ar))) => Some(ar),
            (None, None) => None,
        }
    }
}
