//! reel-admin - command-line administration for the portfolio reel catalog
//!
//! Wires the catalog to its configured sources and a file-backed cache,
//! then runs one admin subcommand per invocation.

pub mod cli;
pub mod commands;

use reel_common::config::TomlConfig;
use reel_common::sources::{fallback_from_config, remote_from_config};
use reel_common::storage::{JsonFileStore, MemoryStore};
use reel_common::{AdminPanel, AuthGate, CatalogStore, EventBus, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Build an admin panel over the cache in `root_folder`
///
/// The admin session flag lives in memory, so each process starts locked.
pub fn build_panel(config: &TomlConfig, root_folder: &Path) -> Result<AdminPanel> {
    let cache_path = TomlConfig::cache_path(root_folder);
    info!("Local cache: {}", cache_path.display());

    let events = EventBus::default();
    let catalog = CatalogStore::new(
        Arc::new(JsonFileStore::open(cache_path)?),
        Arc::from(remote_from_config(&config.sources, &config.remote)?),
        Arc::from(fallback_from_config(&config.sources)?),
        events.clone(),
    )
    .with_io_timeout(config.sources.read_timeout());

    let auth = AuthGate::new(config.admin.secret(), Arc::new(MemoryStore::new()), events);
    Ok(AdminPanel::new(catalog, auth))
}
