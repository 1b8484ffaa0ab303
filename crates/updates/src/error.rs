//! Error types for update checks.

use std::time::Duration;

/// Errors produced while checking a single game.
///
/// These never escape a batch: the orchestrator logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("steam error: {0}")]
    Steam(#[from] gameshelf_steam::SteamError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalog API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("check timed out after {0:?}")]
    Timeout(Duration),

    #[error("check task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
