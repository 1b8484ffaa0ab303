//! Steam manifest access for Gameshelf: text VDF parser, app manifest
//! state and steamapps path conventions.

pub mod app_state;
pub mod paths;
pub mod vdf;

use std::path::PathBuf;

// Re-export primary types.
pub use app_state::{AppState, StateFlags, UNKNOWN_BUILD_ID, load_app_manifest};
pub use paths::{app_manifest_filename, app_manifest_path_for_install, steamapps_dir_for_install};
pub use vdf::{ParseDiagnostics, ParseNode, ParseValue, load_text_vdf, parse, parse_with_diagnostics};

/// Errors for Steam operations.
#[derive(Debug, thiserror::Error)]
pub enum SteamError {
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
