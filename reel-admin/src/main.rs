//! reel-admin - Main entry point
//!
//! Loads the bootstrap configuration, initializes logging, resolves the
//! root folder and runs a single catalog subcommand.

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use reel_admin::cli::Cli;
use reel_admin::commands::AdminSession;
use reel_common::config::{default_config_path, resolve_root_folder, LoggingConfig, TomlConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match cli.config.clone().or_else(default_config_path) {
        Some(path) => TomlConfig::load_or_default(&path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    init_tracing(&config.logging)?;

    // Build identification first, before any network delay
    info!(
        "Starting reel-admin v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let root_folder = resolve_root_folder(cli.root_folder.as_deref(), &config);
    info!("Root folder: {}", root_folder.display());

    let panel = reel_admin::build_panel(&config, &root_folder).context("Failed to open catalog")?;
    let mut session = AdminSession::new(
        panel,
        TomlConfig::exports_dir(&root_folder),
        cli.password.clone(),
    );

    let mut stdout = std::io::stdout();
    session.execute(&cli.command, &mut stdout).await
}

/// Log to the configured file, or stderr so stdout stays command output
///
/// `RUST_LOG` overrides the configured level.
fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    match &logging.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}
