//! Command-line entrypoint for the sync pipeline.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use diesel::SqliteConnection;
use tracing_subscriber::EnvFilter;

use game_sync::config::SyncConfig;
use game_sync::ingest::{Deadline, IngestionController, Mode};
use game_sync::store::{kv, queue};
use game_sync::{callback, db, lock, profile, stats, store};
use shared_utils::env::var_or;

#[derive(Parser)]
#[command(name = "game-sync", about = "Sync and aggregate a player's game history", version)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short, long, default_value = "game_sync.toml")]
    config: PathBuf,

    /// SQLite database path; falls back to $DATABASE_URL, then ./game_sync.db.
    #[arg(long)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pull games newer than the store's latest, newest month first.
    FetchNew,
    /// Walk every monthly archive, oldest first.
    Backfill,
    /// Refresh the profile and per-format rating snapshots.
    UpdateStats,
    /// Drain the callback enrichment queue.
    ProcessQueue {
        /// Override the configured batch limit.
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Recompute daily rollups.
    DailyStats {
        /// Recompute every date instead of only recently touched ones.
        #[arg(long)]
        rebuild: bool,
    },
    /// Show store counts, queue state, and open checkpoints.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let cfg = SyncConfig::load_path(&cli.config)?;
    let database_url = cli
        .database_url
        .unwrap_or_else(|| var_or("DATABASE_URL", "game_sync.db"));

    db::migrate::run(&database_url)?;
    let mut conn = db::connection::connect_sqlite(&database_url)?;

    match cli.command {
        Command::FetchNew => run_ingest(&mut conn, &cfg, Mode::Incremental).await,
        Command::Backfill => run_ingest(&mut conn, &cfg, Mode::Backfill).await,
        Command::UpdateStats => {
            let client = chess_api::ApiClient::new(cfg.api_config())?;
            let summary = profile::refresh(&mut conn, &client, &cfg.player.username).await?;
            println!("appended {} rating snapshot(s)", summary.snapshots_appended);
            Ok(())
        }
        Command::ProcessQueue { limit } => {
            let client = chess_api::ApiClient::new(cfg.api_config())?;
            let mut params = cfg.callback_params();
            if let Some(limit) = limit {
                params.batch_limit = limit;
            }
            let held = lock::acquire(&mut conn, "callback", cfg.ingest.lock_ttl_secs)?;
            let outcome = callback::process_queue(&mut conn, &client, &params).await;
            lock::release(&mut conn, held)?;
            let summary = outcome?;
            println!(
                "processed {} item(s): {} completed, {} failed",
                summary.processed, summary.completed, summary.failed
            );
            Ok(())
        }
        Command::DailyStats { rebuild } => {
            let held = lock::acquire(&mut conn, "daily_stats", cfg.ingest.lock_ttl_secs)?;
            let outcome = if rebuild {
                stats::rebuild(&mut conn)
            } else {
                stats::update(&mut conn, cfg.stats.safety_window_days)
            };
            lock::release(&mut conn, held)?;
            let summary = outcome?;
            println!("recomputed {} date(s), {} row(s)", summary.dates, summary.rows);
            Ok(())
        }
        Command::Status => print_status(&mut conn),
    }
}

async fn run_ingest(
    conn: &mut SqliteConnection,
    cfg: &SyncConfig,
    mode: Mode,
) -> anyhow::Result<()> {
    let client = chess_api::ApiClient::new(cfg.api_config())?;
    let deadline = match cfg.ingest.budget_secs {
        0 => Deadline::unlimited(),
        secs => Deadline::after(Duration::from_secs(secs)),
    };

    let held = lock::acquire(conn, mode.op_name(), cfg.ingest.lock_ttl_secs)?;
    let controller = IngestionController::new(&client, cfg.ingest_params());
    let outcome = controller.run(conn, mode, deadline).await;
    lock::release(conn, held)?;
    let summary = outcome?;

    // Rating snapshots ride along with incremental fetches.
    if mode == Mode::Incremental {
        if let Err(e) = profile::refresh(conn, &client, &cfg.player.username).await {
            tracing::warn!(error = %e, "profile refresh failed");
        }
    }

    println!(
        "{}: {} new game(s), {} duplicate(s), {} month(s) scanned, {} queued{}",
        mode.op_name(),
        summary.processed,
        summary.duplicates,
        summary.months_scanned,
        summary.enqueued,
        if summary.finished { "" } else { " (checkpointed, run again to continue)" }
    );
    Ok(())
}

fn print_status(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    println!("games:         {}", store::games::count(conn)?);
    println!("rating events: {}", store::ratings::count(conn)?);
    println!("daily rows:    {}", store::daily::count(conn)?);
    for (status, n) in queue::counts_by_status(conn)? {
        println!("queue {status:>9}: {n}");
    }
    let open = kv::open_checkpoints(conn)?;
    if open.is_empty() {
        println!("checkpoints:   none");
    } else {
        for key in open {
            println!("checkpoint:    {key}");
        }
    }
    Ok(())
}
