use thiserror::Error;

/// Errors produced by [`crate::client::ApiClient`].
///
/// Callers need to distinguish "give up for now" ([`ApiError::RetriesExhausted`])
/// from "this resource is invalid" ([`ApiError::Status`] with a 4xx code): the
/// former is worth retrying on the next scheduled invocation, the latter is not.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport-level failure from reqwest (connect, timeout, decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-retryable status (4xx other than 429).
    #[error("endpoint returned {status} for {url}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// The URL that produced the response.
        url: String,
    },

    /// The bounded retry budget ran out on a retryable failure (429/5xx/transport).
    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Description of the final failure.
        last: String,
    },

    /// A game URL did not match the `game/(live|daily)/(\d+)` shape.
    #[error("invalid game url: {0}")]
    InvalidGameUrl(String),
}

impl ApiError {
    /// True when the error marks the resource itself as invalid, so a later
    /// retry with the same inputs cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, ApiError::Status { .. } | ApiError::InvalidGameUrl(_))
    }
}
