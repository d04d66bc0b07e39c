//! Admin workflow: gate → edit session → catalog → notifier
//!
//! [`AdminPanel`] is the single entry point for admin actions. It owns the
//! three stateful parts so no caller can mutate one behind another's back,
//! and it keeps the edit session consistent with the catalog (removing the
//! record being edited drops the form back to add mode).

use crate::auth::AuthGate;
use crate::catalog::CatalogStore;
use crate::events::{AuthState, EditState};
use crate::models::{VideoInput, VideoRecord};
use crate::publish::{ExportArtifact, PublishOutcome};
use crate::session::{EditSession, SubmitOutcome};
use crate::sources::RemoteCredentials;
use crate::{Error, Result};

pub struct AdminPanel {
    auth: AuthGate,
    session: EditSession,
    catalog: CatalogStore,
}

impl AdminPanel {
    pub fn new(catalog: CatalogStore, auth: AuthGate) -> Self {
        let session = EditSession::new(catalog.events().clone());
        Self {
            auth,
            session,
            catalog,
        }
    }

    /// Run the startup load (public data, no gate)
    pub async fn load(&mut self) -> &[VideoRecord] {
        self.catalog.load().await
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.state()
    }

    pub fn edit_state(&self) -> &EditState {
        self.session.state()
    }

    pub fn form(&self) -> &VideoInput {
        self.session.form()
    }

    /// Open the panel, prompting for the password only if still locked
    pub fn open<F>(&mut self, prompt: F) -> Result<()>
    where
        F: FnOnce() -> Option<String>,
    {
        self.auth.open_panel(prompt)
    }

    /// Lock the panel for the rest of the session
    pub fn end_session(&mut self) {
        self.session.cancel();
        self.auth.end_session();
    }

    pub fn begin_edit(&mut self, id: &str) -> Result<&VideoInput> {
        self.auth.require()?;
        self.session.begin_edit(&self.catalog, id)
    }

    pub fn submit(&mut self, form: &VideoInput) -> Result<SubmitOutcome> {
        self.auth.require()?;
        self.session.submit(&mut self.catalog, form)
    }

    /// Leave edit mode without touching the catalog
    pub fn cancel(&mut self) {
        self.session.cancel();
    }

    /// Remove `id`; resets the edit session if it was editing `id`
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.auth.require()?;
        self.catalog.remove(id)?;
        self.session.forget(id);
        Ok(())
    }

    pub fn export(&self) -> Result<ExportArtifact> {
        self.auth.require()?;
        self.catalog.export_artifact()
    }

    pub async fn publish(&self) -> Result<PublishOutcome> {
        self.auth.require()?;
        self.catalog.publish().await
    }

    pub fn save_credentials(&self, credentials: &RemoteCredentials) -> Result<()> {
        self.auth.require()?;
        if credentials.document_id.trim().is_empty() || credentials.token.trim().is_empty() {
            return Err(Error::Validation(
                "Both a document ID and a token are required".to_string(),
            ));
        }
        self.catalog.save_credentials(credentials)
    }

    /// Public action: play a video in the modal
    pub fn open_video(&self, id: &str) -> Result<String> {
        self.catalog.open_video(id)
    }
}
