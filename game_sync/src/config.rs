//! TOML configuration for the pipeline.
//!
//! Everything except the tracked player's username has a default, so a
//! minimal config is just:
//!
//! ```toml
//! [player]
//! username = "hikaru"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

use crate::callback::CallbackParams;
use crate::enrich::EnrichOptions;
use crate::format::SpeedThresholds;
use crate::ingest::IngestParams;

/// Root of the config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    pub player: PlayerSection,
    #[serde(default)]
    pub api: ApiSection,
    #[serde(default)]
    pub ingest: IngestSection,
    #[serde(default)]
    pub callback: CallbackSection,
    #[serde(default)]
    pub speed: SpeedThresholds,
    #[serde(default)]
    pub stats: StatsSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerSection {
    /// Account whose history is synced.
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiSection {
    pub base_url: String,
    pub callback_base_url: String,
    /// Sliding-window period in seconds.
    pub window_secs: u64,
    /// Requests allowed per window.
    pub max_requests: usize,
    /// Extra sleep past the window edge, in milliseconds.
    pub margin_ms: u64,
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Exponential backoff base, in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for ApiSection {
    fn default() -> Self {
        Self {
            base_url: chess_api::endpoints::DEFAULT_BASE_URL.to_string(),
            callback_base_url: chess_api::endpoints::DEFAULT_CALLBACK_BASE_URL.to_string(),
            window_secs: 60,
            max_requests: 20,
            margin_ms: 250,
            max_retries: 3,
            base_delay_ms: 2_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestSection {
    /// Games per store flush.
    pub batch_size: usize,
    /// Wall-clock budget per run, in seconds. 0 means unlimited.
    pub budget_secs: u64,
    /// Retain per-ply clock and move-time arrays.
    pub keep_move_clocks: bool,
    /// Advisory lock TTL, in seconds.
    pub lock_ttl_secs: i64,
}

impl Default for IngestSection {
    fn default() -> Self {
        Self {
            batch_size: 25,
            budget_secs: 240,
            keep_move_clocks: true,
            lock_ttl_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallbackSection {
    /// Items leased per run.
    pub batch_limit: i64,
    /// Pause between callback calls, in milliseconds.
    pub delay_ms: u64,
    /// Attempts before an item is parked as failed.
    pub max_attempts: i32,
}

impl Default for CallbackSection {
    fn default() -> Self {
        Self {
            batch_limit: 20,
            delay_ms: 1_000,
            max_attempts: 3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StatsSection {
    /// Trailing dates always recomputed by an incremental stats run.
    pub safety_window_days: i64,
}

impl Default for StatsSection {
    fn default() -> Self {
        Self {
            safety_window_days: 3,
        }
    }
}

impl SyncConfig {
    /// Read and parse a config file.
    pub fn load_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::load_str(&raw).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse config TOML.
    pub fn load_str(raw: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Client construction parameters.
    pub fn api_config(&self) -> chess_api::ApiConfig {
        chess_api::ApiConfig {
            endpoints: chess_api::endpoints::Endpoints {
                base: self.api.base_url.clone(),
                callback_base: self.api.callback_base_url.clone(),
            },
            window: Duration::from_secs(self.api.window_secs),
            max_requests: self.api.max_requests,
            margin: Duration::from_millis(self.api.margin_ms),
            retry: chess_api::retry::RetryPolicy {
                max_retries: self.api.max_retries,
                base_delay: Duration::from_millis(self.api.base_delay_ms),
            },
            ..chess_api::ApiConfig::default()
        }
    }

    /// Traversal parameters.
    pub fn ingest_params(&self) -> IngestParams {
        IngestParams {
            username: self.player.username.clone(),
            batch_size: self.ingest.batch_size.max(1),
            enrich: EnrichOptions {
                keep_move_clocks: self.ingest.keep_move_clocks,
                thresholds: self.speed,
            },
        }
    }

    /// Queue-draining parameters.
    pub fn callback_params(&self) -> CallbackParams {
        CallbackParams {
            username: self.player.username.clone(),
            batch_limit: self.callback.batch_limit,
            delay: Duration::from_millis(self.callback.delay_ms),
            max_attempts: self.callback.max_attempts,
        }
    }
}
