//! Update check configuration file.
//!
//! Stored as TOML:
//! - Linux/macOS: `~/.config/gameshelf/updates.toml`
//! - Windows: `%APPDATA%/gameshelf/updates.toml`
//!
//! A missing file means defaults; nothing is written back.

use std::path::{Path, PathBuf};

use gameshelf_updates::UpdateConfig;

/// Loads configuration from `path`, or from the default location.
pub fn load(path: Option<&Path>) -> anyhow::Result<UpdateConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no configuration file, using defaults");
        return Ok(UpdateConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: UpdateConfig = toml::from_str(&content)?;
    config.validate()?;
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(config)
}

/// Returns the platform-specific configuration file path.
fn config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| "C:\\".into());
        PathBuf::from(appdata).join("gameshelf").join("updates.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("gameshelf")
            .join("updates.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(Some(&dir.path().join("updates.toml"))).unwrap();
        assert_eq!(config, UpdateConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updates.toml");
        std::fs::write(&path, "max_concurrent_checks = 16\nepic_request_timeout_secs = 2\n").unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.max_concurrent_checks, 16);
        assert_eq!(config.epic_request_timeout_secs, 2);
        assert_eq!(config.check_timeout_secs, 30);
    }

    #[test]
    fn invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updates.toml");
        std::fs::write(&path, "max_concurrent_checks = \"many\"\n").unwrap();
        assert!(load(Some(&path)).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("updates.toml");
        std::fs::write(&path, "check_timeout_secs = 0\n").unwrap();

        let err = load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("check_timeout_secs"), "got {err}");
    }

    #[test]
    fn default_path_file_name() {
        assert!(config_path().ends_with("gameshelf/updates.toml"));
    }
}
