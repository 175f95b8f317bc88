//! Profile and rating-snapshot refresh.
//!
//! Pulls the tracked player's profile and per-format stats and appends any
//! new rating observations to the event log. Runs cheaply, so it is folded
//! into the incremental fetch job as well as exposed on its own.

use chess_api::PlatformSource;
use diesel::SqliteConnection;

use crate::store::{kv, ratings, StoreResult};

/// What one refresh accomplished.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub snapshots_appended: usize,
}

/// Fetch profile + stats and append fresh rating events.
pub async fn refresh(
    conn: &mut SqliteConnection,
    source: &dyn PlatformSource,
    username: &str,
) -> StoreResult<ProfileSummary> {
    let profile = source.profile(username).await?;
    kv::put_json(
        conn,
        &format!("profile/{}", username.to_ascii_lowercase()),
        &serde_json::json!({
            "username": profile.username,
            "joined": profile.joined,
            "status": profile.status,
            "country": profile.country,
        }),
    )?;

    let stats = source.stats(username).await?;
    let snapshots = stats.rating_snapshots();
    let appended = ratings::append_snapshots(conn, &snapshots)?;
    kv::put_json(conn, "last_stats_sync", &chrono::Utc::now().timestamp())?;
    tracing::info!(username, formats = snapshots.len(), appended, "profile refreshed");
    Ok(ProfileSummary {
        snapshots_appended: appended,
    })
}
