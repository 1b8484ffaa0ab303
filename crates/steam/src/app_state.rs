//! Logical view of an `appmanifest_<id>.acf` file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::SteamError;
use crate::vdf::{self, ParseNode};

/// Build id reported when the manifest carries none.
pub const UNKNOWN_BUILD_ID: &str = "Unknown";

/// Bitmask from the manifest's `StateFlags` field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateFlags(pub u32);

impl StateFlags {
    pub const UPDATE_REQUIRED: u32 = 4;
    pub const UPDATE_PENDING: u32 = 8;

    /// Decodes the manifest string form. Anything that is not an unsigned
    /// integer decodes as no flags.
    pub fn from_manifest_str(s: &str) -> Self {
        Self(s.trim().parse().unwrap_or(0))
    }

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits != 0
    }

    /// True if either the update-required or update-pending bit is set.
    pub fn needs_update(self) -> bool {
        self.contains(Self::UPDATE_REQUIRED) || self.contains(Self::UPDATE_PENDING)
    }
}

/// Fields read from a Steam app manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    pub state_flags: StateFlags,
    pub build_id: String,
    pub app_id: Option<String>,
    pub name: Option<String>,
    pub install_dir: Option<String>,
    pub size_on_disk: u64,
    pub last_updated: i64,
}

impl AppState {
    /// Extracts the app state from a parsed manifest.
    ///
    /// Uses the `"AppState"` child when present, otherwise the root itself.
    pub fn from_manifest(root: &ParseNode) -> Self {
        let node = root.get_object("AppState").unwrap_or(root);
        let owned = |key: &str| node.get_str(key).map(str::to_string);

        Self {
            state_flags: StateFlags::from_manifest_str(node.get_str("StateFlags").unwrap_or("0")),
            build_id: owned("buildid").unwrap_or_else(|| UNKNOWN_BUILD_ID.into()),
            app_id: owned("appid"),
            name: owned("name"),
            install_dir: owned("installdir"),
            size_on_disk: node
                .get_str("SizeOnDisk")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
            last_updated: node
                .get_str("LastUpdated")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
        }
    }

    pub fn needs_update(&self) -> bool {
        self.state_flags.needs_update()
    }
}

/// Reads and parses an app manifest.
///
/// Returns `Ok(None)` if the file does not exist. Any other read failure,
/// including invalid UTF-8, is an error.
pub fn load_app_manifest(path: &Path) -> Result<Option<AppState>, SteamError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SteamError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let root = vdf::parse(&text);
    Ok(Some(AppState::from_manifest(&root)))
}
