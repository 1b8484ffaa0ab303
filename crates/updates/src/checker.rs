//! Per-platform update strategies.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use gameshelf_steam::{AppState, app_manifest_path_for_install, load_app_manifest};
use tracing::debug;

use crate::epic::EpicCatalogClient;
use crate::error::UpdateError;
use crate::types::{EpicMetadata, Game, NEW_BUILD_AVAILABLE, Platform, UpdateResult};

/// Boxed future returned by [`UpdateChecker::check`].
pub type CheckFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<UpdateResult>, UpdateError>> + Send + 'a>>;

/// Determines whether one game has a pending update.
///
/// `Ok(None)` means nothing to report, including when the game lacks the
/// data needed to check. Errors are logged by the orchestrator and never
/// affect other games.
pub trait UpdateChecker: Send + Sync {
    /// Platform this checker handles.
    fn platform(&self) -> Platform;

    fn check<'a>(&'a self, game: &'a Game) -> CheckFuture<'a>;
}

// ---------------------------------------------------------------------------
// Steam
// ---------------------------------------------------------------------------

/// Reads the game's local app manifest and inspects its `StateFlags`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SteamChecker;

impl SteamChecker {
    /// Resolves the manifest path, or `None` if the game cannot be checked.
    fn manifest_path(game: &Game) -> Option<PathBuf> {
        let install_dir = game.install_directory.as_deref().filter(|s| !s.is_empty())?;
        let app_id = game.app_id.as_deref().filter(|s| !s.is_empty())?;
        app_manifest_path_for_install(Path::new(install_dir), app_id)
    }
}

impl UpdateChecker for SteamChecker {
    fn platform(&self) -> Platform {
        Platform::Steam
    }

    fn check<'a>(&'a self, game: &'a Game) -> CheckFuture<'a> {
        Box::pin(check_steam(game))
    }
}

async fn check_steam(game: &Game) -> Result<Option<UpdateResult>, UpdateError> {
    let Some(path) = SteamChecker::manifest_path(game) else {
        debug!(id = game.id, title = %game.title, "missing install directory or app id");
        return Ok(None);
    };

    let manifest = path.clone();
    let loaded = tokio::task::spawn_blocking(move || load_app_manifest(&manifest)).await??;

    let Some(state) = loaded else {
        debug!(title = %game.title, path = %path.display(), "app manifest not found");
        return Ok(None);
    };

    Ok(classify_steam(game, &state))
}

/// Emits a result if the manifest flags an update as required or pending.
fn classify_steam(game: &Game, state: &AppState) -> Option<UpdateResult> {
    if !state.needs_update() {
        return None;
    }
    Some(UpdateResult::available(
        game,
        state.build_id.clone(),
        NEW_BUILD_AVAILABLE,
    ))
}

// ---------------------------------------------------------------------------
// Epic
// ---------------------------------------------------------------------------

/// Queries the Epic catalog for the game's offer.
///
/// There is no locally known installed version to compare the catalog dates
/// against, so this checker never reports an update. The catalog request is
/// still issued so the integration stays exercised.
pub struct EpicChecker {
    client: EpicCatalogClient,
}

impl EpicChecker {
    pub fn new(client: EpicCatalogClient) -> Self {
        Self { client }
    }
}

impl UpdateChecker for EpicChecker {
    fn platform(&self) -> Platform {
        Platform::Epic
    }

    fn check<'a>(&'a self, game: &'a Game) -> CheckFuture<'a> {
        Box::pin(self.check_epic(game))
    }
}

impl EpicChecker {
    async fn check_epic(&self, game: &Game) -> Result<Option<UpdateResult>, UpdateError> {
        let meta = EpicMetadata::from_game_metadata(game.metadata.as_deref());
        let Some((namespace, item_id)) = meta.catalog_ids() else {
            debug!(id = game.id, title = %game.title, "no Epic catalog ids in metadata");
            return Ok(None);
        };

        match self.client.fetch_catalog_offer(namespace, item_id).await {
            Ok(offer) => {
                debug!(
                    title = %game.title,
                    release_date = ?offer.as_ref().and_then(|o| o.release_date.as_deref()),
                    expiry_date = ?offer.as_ref().and_then(|o| o.expiry_date.as_deref()),
                    "fetched Epic catalog offer"
                );
            }
            Err(e) => {
                debug!(title = %game.title, error = %e, "Epic catalog query failed");
            }
        }

        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Xbox
// ---------------------------------------------------------------------------

/// The Microsoft Store updates titles itself and exposes no local signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct XboxChecker;

impl UpdateChecker for XboxChecker {
    fn platform(&self) -> Platform {
        Platform::Xbox
    }

    fn check<'a>(&'a self, _game: &'a Game) -> CheckFuture<'a> {
        Box::pin(std::future::ready(Ok::<_, UpdateError>(None::<UpdateResult>)))
    }
}
