//! # Reel Common Library
//!
//! Catalog synchronization and administration core for the portfolio reel:
//! - Video data model and admin form input
//! - Three-source load precedence (remote, bundled fallback, local cache)
//! - CRUD with validation, local snapshots and publish/export
//! - Add-vs-update edit session and session-scoped admin gate
//! - Event bus for renderers
//! - Configuration loading

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod publish;
pub mod session;
pub mod sources;
pub mod storage;
pub mod time;

pub use admin::AdminPanel;
pub use auth::AuthGate;
pub use catalog::{CatalogStore, LoadSource};
pub use error::{Error, Result};
pub use events::{AuthState, CatalogEvent, EditState, EventBus};
pub use models::{VideoInput, VideoRecord};
pub use publish::{ExportArtifact, PublishOutcome};
pub use session::{EditSession, SubmitOutcome};
