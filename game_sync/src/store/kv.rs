//! JSON-capable key/value table; checkpoints live under `checkpoint/<op>`.

use diesel::prelude::*;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::schema::sync_kv;
use crate::store::StoreResult;

/// Raw string read.
pub fn get(conn: &mut SqliteConnection, key: &str) -> StoreResult<Option<String>> {
    use crate::schema::sync_kv::dsl::*;

    Ok(sync_kv
        .filter(k.eq(key))
        .select(v)
        .first(conn)
        .optional()?)
}

/// Raw string upsert.
pub fn put(conn: &mut SqliteConnection, key: &str, value: &str) -> StoreResult<()> {
    diesel::insert_into(sync_kv::table)
        .values((sync_kv::k.eq(key), sync_kv::v.eq(value)))
        .on_conflict(sync_kv::k)
        .do_update()
        .set(sync_kv::v.eq(value))
        .execute(conn)?;
    Ok(())
}

/// Delete a key; absent keys are fine.
pub fn delete(conn: &mut SqliteConnection, key: &str) -> StoreResult<()> {
    use crate::schema::sync_kv::dsl::*;

    diesel::delete(sync_kv.filter(k.eq(key))).execute(conn)?;
    Ok(())
}

/// JSON read. A value that fails to decode is treated as absent with a
/// warning: for checkpoints that means "start of operation", per the error
/// contract.
pub fn get_json<T: DeserializeOwned>(
    conn: &mut SqliteConnection,
    key: &str,
) -> StoreResult<Option<T>> {
    let Some(raw) = get(conn, key)? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding unreadable kv value");
            Ok(None)
        }
    }
}

/// JSON upsert.
pub fn put_json<T: Serialize>(conn: &mut SqliteConnection, key: &str, value: &T) -> StoreResult<()> {
    put(conn, key, &serde_json::to_string(value)?)
}

/// Namespaced checkpoint key for an operation.
pub fn checkpoint_key(op: &str) -> String {
    format!("checkpoint/{op}")
}

/// Load the checkpoint for an operation; missing or unreadable means a fresh
/// start.
pub fn load_checkpoint<T: DeserializeOwned>(
    conn: &mut SqliteConnection,
    op: &str,
) -> StoreResult<Option<T>> {
    get_json(conn, &checkpoint_key(op))
}

/// Persist the checkpoint for an operation.
pub fn store_checkpoint<T: Serialize>(
    conn: &mut SqliteConnection,
    op: &str,
    cursor: &T,
) -> StoreResult<()> {
    put_json(conn, &checkpoint_key(op), cursor)
}

/// Clear the checkpoint after a clean completion.
pub fn clear_checkpoint(conn: &mut SqliteConnection, op: &str) -> StoreResult<()> {
    delete(conn, &checkpoint_key(op))
}

/// Open checkpoint keys, for the status surface.
pub fn open_checkpoints(conn: &mut SqliteConnection) -> StoreResult<Vec<String>> {
    use crate::schema::sync_kv::dsl::*;

    Ok(sync_kv
        .filter(k.like("checkpoint/%"))
        .select(k)
        .load(conn)?)
}
