//! Update detection for installed games.
//!
//! Given the library's installed [`Game`] records, determines which titles
//! have a pending update. Each platform has its own strategy:
//!
//! - **Steam** — reads `appmanifest_<id>.acf` next to the install directory
//!   and inspects its `StateFlags`
//! - **Epic** — queries the catalog offer; never concludes an update because
//!   no installed version is known locally
//! - **Xbox** — no local signal; never reports an update
//!
//! A single game's failure is logged and dropped; it never aborts the batch.

pub mod checker;
pub mod config;
pub mod epic;
pub mod error;
pub mod orchestrator;
pub mod types;

#[cfg(test)]
mod testutil;

// Re-export primary types for convenience.
pub use checker::{CheckFuture, EpicChecker, SteamChecker, UpdateChecker, XboxChecker};
pub use config::{InvalidConfig, UpdateConfig};
pub use epic::{CatalogOffer, EpicCatalogClient};
pub use error::UpdateError;
pub use orchestrator::{UpdateOrchestrator, check_for_updates};
pub use types::{EpicMetadata, Game, NEW_BUILD_AVAILABLE, Platform, UpdateResult};
