//! Resumable traversal state, persisted as JSON in the kv store.

use serde::{Deserialize, Serialize};

use crate::models::GameRecord;

/// Snapshot of an archive traversal, written whenever a run stops before the
/// archive list is exhausted. A resumed run picks up at `archive_offset` with
/// the unflushed `buffer` intact.
///
/// `last_seen_end_time` is captured once at the start of the original run so
/// a resume keeps filtering against the same threshold; `watermark` only
/// becomes the published threshold once the traversal completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestCursor {
    /// Checkpoint namespace that wrote this cursor, `"fetch"` or
    /// `"backfill"`; a checkpoint is only resumed by the same mode.
    pub mode: String,
    /// Index of the next archive URL to fetch.
    pub archive_offset: usize,
    /// Incremental threshold frozen at the start of the run, in the raw
    /// bulk-API time base.
    pub last_seen_end_time: Option<i64>,
    /// Largest raw `end_time` seen so far; published as the next run's
    /// threshold on completion.
    pub watermark: Option<i64>,
    /// Enriched records not yet flushed to the store.
    pub buffer: Vec<GameRecord>,
    /// Games written so far across the whole (possibly multi-run) traversal.
    pub processed: usize,
    /// Duplicates dropped so far.
    pub duplicates: usize,
}

impl IngestCursor {
    pub fn fresh(mode: &str, last_seen_end_time: Option<i64>) -> Self {
        Self {
            mode: mode.to_string(),
            archive_offset: 0,
            last_seen_end_time,
            watermark: None,
            buffer: Vec::new(),
            processed: 0,
            duplicates: 0,
        }
    }
}
