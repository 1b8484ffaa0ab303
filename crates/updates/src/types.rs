//! Domain types for update detection.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder shown as the new version when a Steam update is detected.
pub const NEW_BUILD_AVAILABLE: &str = "New Build Available";

/// Distribution platform with a dedicated update strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Steam,
    Epic,
    Xbox,
}

impl Platform {
    pub fn all() -> &'static [Platform] {
        &[Platform::Steam, Platform::Epic, Platform::Xbox]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Steam => "steam",
            Platform::Epic => "epic",
            Platform::Xbox => "xbox",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a platform string names no known platform.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown platform: {0}")]
pub struct UnknownPlatform(pub String);

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "steam" => Ok(Platform::Steam),
            "epic" => Ok(Platform::Epic),
            "xbox" => Ok(Platform::Xbox),
            _ => Err(UnknownPlatform(s.to_string())),
        }
    }
}

/// An installed game as supplied by the library scanner.
///
/// `platform` is kept as the raw string; see [`Game::platform_kind`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: i64,
    pub title: String,
    pub platform: String,
    #[serde(default)]
    pub install_directory: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
    /// JSON-encoded platform metadata.
    #[serde(default)]
    pub metadata: Option<String>,
}

impl Game {
    /// Returns the parsed platform, or `None` for platforms with no strategy.
    pub fn platform_kind(&self) -> Option<Platform> {
        self.platform.parse().ok()
    }
}

/// A detected pending update for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateResult {
    pub id: i64,
    pub title: String,
    pub platform: String,
    pub update_available: bool,
    pub current_version: String,
    pub new_version: String,
}

impl UpdateResult {
    /// Builds a positive result for `game`.
    pub fn available(
        game: &Game,
        current_version: impl Into<String>,
        new_version: impl Into<String>,
    ) -> Self {
        Self {
            id: game.id,
            title: game.title.clone(),
            platform: game.platform.clone(),
            update_available: true,
            current_version: current_version.into(),
            new_version: new_version.into(),
        }
    }
}

/// Epic catalog identifiers carried in a game's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EpicMetadata {
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub catalog_item_id: Option<String>,
}

impl EpicMetadata {
    /// Decodes the metadata blob. Malformed or absent metadata yields no ids.
    pub fn from_game_metadata(metadata: Option<&str>) -> Self {
        let Some(raw) = metadata.filter(|m| !m.trim().is_empty()) else {
            return Self::default();
        };

        let decoded: Self = serde_json::from_str(raw).unwrap_or_default();
        Self {
            namespace: decoded.namespace.filter(|s| !s.is_empty()),
            catalog_item_id: decoded.catalog_item_id.filter(|s| !s.is_empty()),
        }
    }

    /// Returns `(namespace, catalog_item_id)` when both are present.
    pub fn catalog_ids(&self) -> Option<(&str, &str)> {
        Some((self.namespace.as_deref()?, self.catalog_item_id.as_deref()?))
    }
}
