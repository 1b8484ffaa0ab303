//! Batch update detection across platforms.
//!
//! Games are grouped by platform and every check runs as its own task on a
//! `JoinSet`, bounded by a semaphore. A failing, hanging or panicking check
//! only loses that one game's result.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::{debug, info, warn};

use crate::checker::{EpicChecker, SteamChecker, UpdateChecker, XboxChecker};
use crate::config::UpdateConfig;
use crate::epic::EpicCatalogClient;
use crate::error::UpdateError;
use crate::types::{Game, Platform, UpdateResult};

/// Runs update checks for a list of installed games.
pub struct UpdateOrchestrator {
    checkers: HashMap<Platform, Arc<dyn UpdateChecker>>,
    max_concurrent: usize,
    check_timeout: Duration,
}

impl UpdateOrchestrator {
    /// Creates an orchestrator with the built-in Steam, Epic and Xbox checkers.
    pub fn new(config: &UpdateConfig) -> Result<Self, UpdateError> {
        let epic_client = EpicCatalogClient::new(config.epic_request_timeout())?
            .with_endpoint(config.epic_graphql_url.clone());

        let orchestrator = Self {
            checkers: HashMap::new(),
            max_concurrent: config.concurrency(),
            check_timeout: config.check_timeout(),
        }
        .with_checker(Arc::new(SteamChecker))
        .with_checker(Arc::new(EpicChecker::new(epic_client)))
        .with_checker(Arc::new(XboxChecker));

        Ok(orchestrator)
    }

    /// Installs `checker` for its platform, replacing any previous one.
    pub fn with_checker(mut self, checker: Arc<dyn UpdateChecker>) -> Self {
        self.checkers.insert(checker.platform(), checker);
        self
    }

    /// Returns one entry per game with a detected update.
    ///
    /// Games without an update, with an unrecognized platform, or whose
    /// check failed produce no entry. Output order is unspecified.
    pub async fn check_for_updates(&self, games: &[Game]) -> Vec<UpdateResult> {
        self.run_batch(games).await.0
    }

    async fn run_batch(&self, games: &[Game]) -> (Vec<UpdateResult>, Vec<CheckFailure>) {
        let groups = partition_by_platform(games);
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = JoinSet::new();
        // A panicking task takes its game with it; keep enough to name it.
        let mut labels: HashMap<task::Id, GameLabel> = HashMap::new();

        for platform in Platform::all() {
            let Some(group) = groups.get(platform) else {
                continue;
            };
            let Some(checker) = self.checkers.get(platform) else {
                debug!(%platform, count = group.len(), "no checker registered");
                continue;
            };

            for game in group {
                let label = GameLabel::from(*game);
                let game = (*game).clone();
                let checker = Arc::clone(checker);
                let semaphore = Arc::clone(&semaphore);
                let timeout = self.check_timeout;

                let handle = tasks.spawn(async move {
                    match semaphore.acquire_owned().await {
                        Ok(_permit) => run_check(checker.as_ref(), &game, timeout).await,
                        Err(_) => Ok(None),
                    }
                });
                labels.insert(handle.id(), label);
            }
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();

        while let Some(joined) = tasks.join_next_with_id().await {
            let (task_id, error) = match joined {
                Ok((_, Ok(Some(result)))) => {
                    results.push(result);
                    continue;
                }
                Ok((_, Ok(None))) => continue,
                Ok((task_id, Err(e))) => (task_id, e.to_string()),
                Err(e) => (e.id(), format!("check task aborted: {e}")),
            };

            let Some(label) = labels.remove(&task_id) else {
                warn!(%task_id, error = %error, "update check failed for untracked task");
                continue;
            };
            warn!(
                id = label.id,
                title = %label.title,
                platform = %label.platform,
                error = %error,
                "update check failed"
            );
            failures.push(CheckFailure { game: label, error });
        }

        info!(
            games = games.len(),
            updates = results.len(),
            failures = failures.len(),
            "update check finished"
        );
        (results, failures)
    }
}

/// Identity of a game, kept outside its check task.
#[derive(Debug, Clone, PartialEq, Eq)]
struct GameLabel {
    id: i64,
    title: String,
    platform: String,
}

impl From<&Game> for GameLabel {
    fn from(game: &Game) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            platform: game.platform.clone(),
        }
    }
}

#[derive(Debug)]
struct CheckFailure {
    game: GameLabel,
    error: String,
}

/// Builds an orchestrator from default settings and checks `games`.
///
/// Fails only if the HTTP client cannot be constructed.
pub async fn check_for_updates(games: &[Game]) -> Result<Vec<UpdateResult>, UpdateError> {
    let orchestrator = UpdateOrchestrator::new(&UpdateConfig::default())?;
    Ok(orchestrator.check_for_updates(games).await)
}

async fn run_check(
    checker: &dyn UpdateChecker,
    game: &Game,
    limit: Duration,
) -> Result<Option<UpdateResult>, UpdateError> {
    tokio::time::timeout(limit, checker.check(game))
        .await
        .map_err(|_| UpdateError::Timeout(limit))?
}

/// Splits games into disjoint per-platform groups, keeping input order.
fn partition_by_platform(games: &[Game]) -> HashMap<Platform, Vec<&Game>> {
    let mut groups: HashMap<Platform, Vec<&Game>> = HashMap::new();

    for game in games {
        match game.platform_kind() {
            Some(platform) => groups.entry(platform).or_default().push(game),
            None => {
                debug!(id = game.id, platform = %game.platform, "skipping unsupported platform");
            }
        }
    }

    groups
}
