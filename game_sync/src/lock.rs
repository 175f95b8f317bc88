//! Advisory per-operation locks.
//!
//! One named lock per long-running operation ("fetch", "backfill",
//! "callback", "daily_stats") keeps two invocations of the *same* operation
//! from overlapping. Different operations may still touch overlapping rows;
//! that is an accepted limitation of the store. Locks carry a TTL so a
//! killed process cannot wedge the schedule.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use diesel::prelude::*;

use crate::store::{StoreError, StoreResult};

/// A held advisory lock; release it with [`release`] at the end of the run.
#[derive(Debug)]
pub struct OpLock {
    /// Operation name the lock covers.
    pub op: String,
    owner: String,
}

/// Acquire the lock for `op_name`, failing with [`StoreError::LockHeld`]
/// when a live (non-expired) holder exists. An expired row is taken over.
pub fn acquire(conn: &mut SqliteConnection, op_name: &str, ttl_secs: i64) -> StoreResult<OpLock> {
    use crate::schema::op_locks::dsl::*;

    // Unique per acquisition within the process, so releasing a stale handle
    // can never free a lock that was since taken over.
    static LOCK_SEQ: AtomicU64 = AtomicU64::new(0);

    let now = Utc::now().timestamp();
    let holder = format!(
        "pid-{}#{}",
        std::process::id(),
        LOCK_SEQ.fetch_add(1, Ordering::Relaxed)
    );

    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
        let existing: Option<(String, i64)> = op_locks
            .filter(op.eq(op_name))
            .select((owner, expires_at))
            .first(conn)
            .optional()?;

        if let Some((held_by, expiry)) = existing {
            if expiry > now {
                return Err(StoreError::LockHeld {
                    op: op_name.to_string(),
                    owner: held_by,
                }
                .into());
            }
            tracing::warn!(op = op_name, stale_owner = %held_by, "taking over expired lock");
        }

        diesel::insert_into(op_locks)
            .values((
                op.eq(op_name),
                owner.eq(&holder),
                acquired_at.eq(now),
                expires_at.eq(now + ttl_secs),
            ))
            .on_conflict(op)
            .do_update()
            .set((
                owner.eq(&holder),
                acquired_at.eq(now),
                expires_at.eq(now + ttl_secs),
            ))
            .execute(conn)?;
        Ok(())
    })?;

    Ok(OpLock {
        op: op_name.to_string(),
        owner: holder,
    })
}

/// Release a held lock. Only the owning row is deleted, so a lock that was
/// taken over after expiry is not clobbered by the stale holder.
pub fn release(conn: &mut SqliteConnection, lock: OpLock) -> StoreResult<()> {
    use crate::schema::op_locks::dsl::*;

    diesel::delete(op_locks.filter(op.eq(&lock.op).and(owner.eq(&lock.owner)))).execute(conn)?;
    Ok(())
}
