//! Rate-limited, retrying HTTP client for the public API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::endpoints::{Endpoints, GameId};
use crate::errors::ApiError;
use crate::limiter::SlidingWindow;
use crate::models::{ArchiveIndex, CallbackResponse, MonthlyArchive, PlayerStats, Profile, RawGame};
use crate::retry::{RetryPolicy, DEFAULT_RETRY_AFTER};
use crate::source::PlatformSource;

/// Client construction parameters.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// URL builder for both hosts.
    pub endpoints: Endpoints,
    /// Sliding-window period for the shared endpoints.
    pub window: Duration,
    /// Maximum requests per window.
    pub max_requests: usize,
    /// Extra sleep past the window edge.
    pub margin: Duration,
    /// Retry/backoff parameters.
    pub retry: RetryPolicy,
    /// User-Agent header; the platform asks clients to identify themselves.
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoints: Endpoints::default(),
            window: Duration::from_secs(60),
            max_requests: 20,
            margin: Duration::from_millis(250),
            retry: RetryPolicy::default(),
            user_agent: concat!("game-sync/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Rate-limited, retrying client over the public API plus the callback host.
///
/// The per-game callback endpoint deliberately bypasses the shared limiter:
/// it lives on a different backend with its own limits, and the queue job
/// that drives it enforces its own inter-call pacing. Callback calls are
/// single-attempt.
pub struct ApiClient {
    http: Client,
    limiter: SlidingWindow,
    retry: RetryPolicy,
    endpoints: Endpoints,
}

impl ApiClient {
    /// Build a client from the given configuration.
    pub fn new(cfg: ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .user_agent(cfg.user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            http,
            limiter: SlidingWindow::new(cfg.window, cfg.max_requests, cfg.margin),
            retry: cfg.retry,
            endpoints: cfg.endpoints,
        })
    }

    /// GET a shared-host endpoint through the limiter and retry matrix.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            self.limiter.acquire().await;
            let outcome = self.http.get(url).send().await;
            let failure = match outcome {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        self.limiter.record();
                        return Ok(resp.json::<T>().await?);
                    }
                    if status == StatusCode::TOO_MANY_REQUESTS {
                        let wait = retry_after(&resp).unwrap_or(DEFAULT_RETRY_AFTER);
                        if !self.retry.allows(attempt) {
                            return Err(ApiError::RetriesExhausted {
                                attempts: attempt + 1,
                                last: format!("429 for {url}"),
                            });
                        }
                        tracing::debug!(%url, wait_secs = wait.as_secs(), "rate limited upstream");
                        tokio::time::sleep(wait).await;
                        attempt += 1;
                        continue;
                    }
                    if status.is_server_error() {
                        format!("{} for {url}", status.as_u16())
                    } else {
                        // Remaining 4xx: permanent, the resource is invalid.
                        return Err(ApiError::Status {
                            status: status.as_u16(),
                            url: url.to_string(),
                        });
                    }
                }
                Err(e) => e.to_string(),
            };

            if !self.retry.allows(attempt) {
                return Err(ApiError::RetriesExhausted {
                    attempts: attempt + 1,
                    last: failure,
                });
            }
            let wait = self.retry.backoff(attempt);
            tracing::debug!(%url, attempt, wait_ms = wait.as_millis() as u64, error = %failure, "retrying");
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }

    /// Single-attempt GET against the callback host, no shared limiter.
    async fn get_callback_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let resp = self.http.get(url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(resp.json::<T>().await?)
    }
}

fn retry_after(resp: &Response) -> Option<Duration> {
    resp.headers()
        .get(reqwest::header::RETRY_AFTER)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl PlatformSource for ApiClient {
    async fn archives(&self, username: &str) -> Result<Vec<String>, ApiError> {
        let index: ArchiveIndex = self.get_json(&self.endpoints.archives(username)).await?;
        Ok(index.archives)
    }

    async fn monthly_games(&self, archive_url: &str) -> Result<Vec<RawGame>, ApiError> {
        let month: MonthlyArchive = self.get_json(archive_url).await?;
        Ok(month.games)
    }

    async fn profile(&self, username: &str) -> Result<Profile, ApiError> {
        self.get_json(&self.endpoints.profile(username)).await
    }

    async fn stats(&self, username: &str) -> Result<PlayerStats, ApiError> {
        self.get_json(&self.endpoints.stats(username)).await
    }

    async fn game_callback(&self, id: &GameId) -> Result<CallbackResponse, ApiError> {
        self.get_callback_json(&self.endpoints.game_callback(id))
            .await
    }
}
