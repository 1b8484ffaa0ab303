//! Gameshelf update check entry point.
//!
//! Usage: `gameshelf-update-check [GAMES_JSON|-] [CONFIG_TOML]`
//!
//! Reads a JSON array of installed games (stdin when no path or `-` is
//! given) and prints the detected updates as JSON on stdout.

mod config;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use gameshelf_updates::{Game, UpdateOrchestrator};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut args = std::env::args_os().skip(1);
    let games_path = args.next().map(PathBuf::from).filter(|p| p.as_os_str() != "-");
    let config_path = args.next().map(PathBuf::from);

    let config = config::load(config_path.as_deref())?;
    let games = read_games(games_path)?;
    tracing::info!(count = games.len(), "checking games for updates");

    let rt = tokio::runtime::Runtime::new()?;
    let results = rt.block_on(async {
        let orchestrator = UpdateOrchestrator::new(&config)?;
        anyhow::Ok(orchestrator.check_for_updates(&games).await)
    })?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}

fn read_games(path: Option<PathBuf>) -> anyhow::Result<Vec<Game>> {
    let content = match &path {
        Some(p) => std::fs::read_to_string(p)
            .with_context(|| format!("failed to read {}", p.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };

    serde_json::from_str(&content).context("games file must be a JSON array of games")
}
