//! Daily-stats table: upsert-only writes keyed by (date, format).

use diesel::prelude::*;

use crate::models::DailyStatRow;
use crate::schema::daily_stats;
use crate::store::StoreResult;

/// Upsert one rollup row; an existing (date, format) row is overwritten in
/// place, never duplicated.
pub fn upsert(conn: &mut SqliteConnection, row: &DailyStatRow) -> StoreResult<()> {
    diesel::insert_into(daily_stats::table)
        .values(row)
        .on_conflict((daily_stats::date, daily_stats::format))
        .do_update()
        .set(row)
        .execute(conn)?;
    Ok(())
}

/// Delete every row for a date ahead of recomputation, so formats that no
/// longer have games on that date don't leave stale rows behind.
pub fn delete_date(conn: &mut SqliteConnection, on_date: &str) -> StoreResult<usize> {
    use crate::schema::daily_stats::dsl::*;

    Ok(diesel::delete(daily_stats.filter(date.eq(on_date))).execute(conn)?)
}

/// Load all rows for one date.
pub fn for_date(conn: &mut SqliteConnection, on_date: &str) -> StoreResult<Vec<DailyStatRow>> {
    use crate::schema::daily_stats::dsl::*;

    Ok(daily_stats
        .filter(date.eq(on_date))
        .order(format.asc())
        .select(DailyStatRow::as_select())
        .load(conn)?)
}

/// Total rollup rows.
pub fn count(conn: &mut SqliteConnection) -> StoreResult<i64> {
    use crate::schema::daily_stats::dsl::*;

    Ok(daily_stats.count().get_result(conn)?)
}
