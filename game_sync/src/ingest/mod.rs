//! Archive traversal: checkpointed, budgeted, duplicate-filtered ingestion.
//!
//! Two traversal modes over the same machinery. Incremental walks the
//! archive list newest month first and stops at the first month that yields
//! nothing new; backfill walks oldest first and visits every month. Both
//! checkpoint their position (and any unflushed enriched games) to the kv
//! store when the time budget runs out, and resume from it on the next run.

pub mod cursor;

use std::time::{Duration, Instant};

use chess_api::PlatformSource;
use diesel::SqliteConnection;

use crate::enrich::{self, EnrichOptions};
use crate::store::{games, kv, queue, StoreResult};
use cursor::IngestCursor;

/// Largest raw `end_time` ever ingested, in the bulk-API time base. The
/// stored `end_time` column can be shifted forward by PGN header anchors, so
/// the incremental threshold keeps its own key instead of reading the table.
const WATERMARK_KEY: &str = "ingest/last_seen_end_time";

/// Traversal direction and stop condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Newest month first; stop at the first month with no unseen games.
    Incremental,
    /// Oldest month first; visit every month.
    Backfill,
}

impl Mode {
    /// Lock and checkpoint namespace for this mode.
    pub fn op_name(self) -> &'static str {
        match self {
            Mode::Incremental => "fetch",
            Mode::Backfill => "backfill",
        }
    }
}

/// Wall-clock budget for one run. `unlimited` never expires.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self(Some(Instant::now() + budget))
    }

    pub fn unlimited() -> Self {
        Self(None)
    }

    /// A deadline in the past; forces an immediate checkpoint.
    pub fn already_expired() -> Self {
        Self(Some(Instant::now()))
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}

/// Per-run knobs, resolved from configuration by the caller.
#[derive(Debug, Clone)]
pub struct IngestParams {
    /// Whose games to pull; also the enrichment perspective.
    pub username: String,
    /// Flush the enriched buffer every this many games.
    pub batch_size: usize,
    /// Enricher options.
    pub enrich: EnrichOptions,
}

/// What one run accomplished. `finished` is false when the deadline fired
/// and a checkpoint was left behind.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub duplicates: usize,
    pub enqueued: usize,
    pub months_scanned: usize,
    pub finished: bool,
}

/// Drives one traversal over a [`PlatformSource`].
pub struct IngestionController<'a> {
    source: &'a dyn PlatformSource,
    params: IngestParams,
}

impl<'a> IngestionController<'a> {
    pub fn new(source: &'a dyn PlatformSource, params: IngestParams) -> Self {
        Self { source, params }
    }

    /// Run one traversal in `mode` under `deadline`, resuming an open
    /// checkpoint of the same mode when one exists.
    pub async fn run(
        &self,
        conn: &mut SqliteConnection,
        mode: Mode,
        deadline: Deadline,
    ) -> StoreResult<RunSummary> {
        let op = mode.op_name();
        let mut cursor = match kv::load_checkpoint::<IngestCursor>(conn, op)? {
            Some(c) if c.mode == op => {
                tracing::info!(
                    op,
                    archive_offset = c.archive_offset,
                    buffered = c.buffer.len(),
                    "resuming from checkpoint"
                );
                c
            }
            _ => {
                let threshold = match mode {
                    Mode::Incremental => kv::get_json::<i64>(conn, WATERMARK_KEY)?,
                    Mode::Backfill => None,
                };
                IngestCursor::fresh(op, threshold)
            }
        };

        let mut archives = self.source.archives(&self.params.username).await?;
        if mode == Mode::Incremental {
            archives.reverse();
        }

        let mut enqueued = 0usize;
        let mut months_scanned = 0usize;

        while cursor.archive_offset < archives.len() {
            if deadline.expired() {
                kv::store_checkpoint(conn, op, &cursor)?;
                tracing::info!(
                    op,
                    archive_offset = cursor.archive_offset,
                    processed = cursor.processed,
                    "budget exhausted, checkpointed"
                );
                return Ok(RunSummary {
                    processed: cursor.processed,
                    duplicates: cursor.duplicates,
                    enqueued,
                    months_scanned,
                    finished: false,
                });
            }

            let archive_url = &archives[cursor.archive_offset];
            // An upstream failure aborts the run but keeps the position, so
            // the next scheduled invocation picks up here.
            let mut month = match self.source.monthly_games(archive_url).await {
                Ok(month) => month,
                Err(e) => {
                    kv::store_checkpoint(conn, op, &cursor)?;
                    tracing::warn!(op, %archive_url, error = %e, "month fetch failed, checkpointed");
                    return Err(e.into());
                }
            };
            months_scanned += 1;
            if mode == Mode::Incremental {
                month.reverse();
                if let Some(threshold) = cursor.last_seen_end_time {
                    month.retain(|g| g.end_time > threshold);
                }
                // The first fully-seen month ends the incremental walk.
                if month.is_empty() {
                    cursor.archive_offset = archives.len();
                    break;
                }
            }

            tracing::debug!(op, %archive_url, games = month.len(), "scanning month");
            for raw in &month {
                cursor.watermark = Some(cursor.watermark.map_or(raw.end_time, |w| w.max(raw.end_time)));
                cursor
                    .buffer
                    .push(enrich::enrich(raw, &self.params.username, &self.params.enrich));
                if cursor.buffer.len() >= self.params.batch_size {
                    enqueued += self.flush(conn, &mut cursor)?;
                }
            }
            cursor.archive_offset += 1;
        }

        enqueued += self.flush(conn, &mut cursor)?;
        if let Some(seen) = cursor.watermark {
            let published = kv::get_json::<i64>(conn, WATERMARK_KEY)?.unwrap_or(i64::MIN);
            if seen > published {
                kv::put_json(conn, WATERMARK_KEY, &seen)?;
            }
        }
        kv::clear_checkpoint(conn, op)?;
        tracing::info!(
            op,
            processed = cursor.processed,
            duplicates = cursor.duplicates,
            months_scanned,
            "traversal complete"
        );
        Ok(RunSummary {
            processed: cursor.processed,
            duplicates: cursor.duplicates,
            enqueued,
            months_scanned,
            finished: true,
        })
    }

    /// Flush the buffered records: drop known urls, write the rest, queue
    /// callback work for what was written.
    fn flush(&self, conn: &mut SqliteConnection, cursor: &mut IngestCursor) -> StoreResult<usize> {
        if cursor.buffer.is_empty() {
            return Ok(0);
        }
        let batch = std::mem::take(&mut cursor.buffer);
        let (fresh, dupes) = games::filter_new(conn, batch)?;
        cursor.duplicates += dupes;
        let written = games::insert_batch(conn, &fresh)?;
        cursor.processed += written.len();
        queue::enqueue_urls(conn, &written)
    }
}
