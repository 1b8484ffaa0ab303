use std::path::{Path, PathBuf};

/// Returns the `steamapps` directory for a game installed at
/// `.../steamapps/common/<GameName>`.
///
/// Returns `None` if the path has fewer than two ancestors.
pub fn steamapps_dir_for_install(install_dir: &Path) -> Option<PathBuf> {
    install_dir
        .parent()
        .and_then(Path::parent)
        .map(Path::to_path_buf)
}

/// Returns the manifest filename for an app id.
pub fn app_manifest_filename(app_id: &str) -> String {
    format!("appmanifest_{app_id}.acf")
}

/// Returns the expected manifest path for a game's install directory.
pub fn app_manifest_path_for_install(install_dir: &Path, app_id: &str) -> Option<PathBuf> {
    steamapps_dir_for_install(install_dir).map(|dir| dir.join(app_manifest_filename(app_id)))
}
