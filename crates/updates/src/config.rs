//! Update check configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

/// Public Epic Games GraphQL endpoint.
pub const DEFAULT_EPIC_GRAPHQL_URL: &str = "https://graphql.epicgames.com/graphql";

/// Tunables for a batch of update checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Maximum number of checks in flight at once.
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,

    /// Upper bound on a single game's check, in seconds. Zero makes every
    /// check that has to wait on I/O time out; see [`UpdateConfig::validate`].
    #[serde(default = "default_check_timeout_secs")]
    pub check_timeout_secs: u64,

    /// Timeout for the Epic catalog request, in seconds. Must be non-zero.
    #[serde(default = "default_epic_request_timeout_secs")]
    pub epic_request_timeout_secs: u64,

    #[serde(default = "default_epic_graphql_url")]
    pub epic_graphql_url: String,
}

fn default_max_concurrent_checks() -> usize {
    8
}

fn default_check_timeout_secs() -> u64 {
    30
}

fn default_epic_request_timeout_secs() -> u64 {
    5
}

fn default_epic_graphql_url() -> String {
    DEFAULT_EPIC_GRAPHQL_URL.into()
}

/// Error returned by [`UpdateConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid update configuration: {0}")]
pub struct InvalidConfig(pub &'static str);

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            max_concurrent_checks: default_max_concurrent_checks(),
            check_timeout_secs: default_check_timeout_secs(),
            epic_request_timeout_secs: default_epic_request_timeout_secs(),
            epic_graphql_url: default_epic_graphql_url(),
        }
    }
}

impl UpdateConfig {
    /// Concurrency limit, clamped to what a semaphore can hold.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_checks.clamp(1, Semaphore::MAX_PERMITS)
    }

    /// Rejects settings that would make every check fail.
    pub fn validate(&self) -> Result<(), InvalidConfig> {
        if self.check_timeout_secs == 0 {
            return Err(InvalidConfig("check_timeout_secs must be greater than 0"));
        }
        if self.epic_request_timeout_secs == 0 {
            return Err(InvalidConfig(
                "epic_request_timeout_secs must be greater than 0",
            ));
        }
        Ok(())
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }

    pub fn epic_request_timeout(&self) -> Duration {
        Duration::from_secs(self.epic_request_timeout_secs)
    }
}
