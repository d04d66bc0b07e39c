//! Admin gate: session-scoped password check
//!
//! # Not a security boundary
//!
//! The secret is a single static value compiled into the client, compared
//! in plain text, with no rate limiting, lockout or attempt counter. Anyone
//! holding the binary (or the site script) can read it. The gate only keeps
//! casual visitors out of the admin panel.
//!
//! Once the password matches, the gate stays open for the rest of the
//! session: the `adminAuth` flag is written to the session store and later
//! panel opens do not prompt again.

use crate::events::{AuthState, CatalogEvent, EventBus};
use crate::storage::{KeyValueStore, ADMIN_AUTH_KEY};
use crate::{time, Error, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Session-scoped admin gate
pub struct AuthGate {
    secret: String,
    session: Arc<dyn KeyValueStore>,
    state: AuthState,
    events: EventBus,
}

impl AuthGate {
    /// Create the gate, restoring an earlier unlock from the same session
    pub fn new(secret: impl Into<String>, session: Arc<dyn KeyValueStore>, events: EventBus) -> Self {
        let restored = match session.get(ADMIN_AUTH_KEY) {
            Ok(value) => value.as_deref() == Some("true"),
            Err(e) => {
                warn!(error = %e, "Session store unreadable, admin gate starts locked");
                false
            }
        };

        Self {
            secret: secret.into(),
            session,
            state: if restored {
                AuthState::Authenticated
            } else {
                AuthState::Unauthenticated
            },
            events,
        }
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    /// Compare `candidate` with the secret; a match unlocks the session
    ///
    /// A mismatch leaves the gate as it was.
    pub fn check_password(&mut self, candidate: &str) -> bool {
        if candidate != self.secret {
            info!("Incorrect admin password");
            return false;
        }

        if let Err(e) = self.session.set(ADMIN_AUTH_KEY, "true") {
            warn!(error = %e, "Failed to record admin session flag");
        }

        if !self.state.is_authenticated() {
            info!("Admin access granted");
            self.set_state(AuthState::Authenticated);
        }
        true
    }

    /// Gate an admin-panel open
    ///
    /// `prompt` is only called when the session is still locked; `None`
    /// from the prompt (dismissed dialog) counts as a wrong password.
    pub fn open_panel<F>(&mut self, prompt: F) -> Result<()>
    where
        F: FnOnce() -> Option<String>,
    {
        if self.is_authenticated() {
            return Ok(());
        }

        let candidate = prompt().unwrap_or_default();
        if self.check_password(&candidate) {
            Ok(())
        } else {
            Err(Error::Auth("Incorrect password".to_string()))
        }
    }

    /// Fail with `Auth` unless the session is unlocked
    pub fn require(&self) -> Result<()> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(Error::Auth("Admin panel is locked".to_string()))
        }
    }

    /// End the session: clear the flag and lock the gate
    pub fn end_session(&mut self) {
        if let Err(e) = self.session.remove(ADMIN_AUTH_KEY) {
            warn!(error = %e, "Failed to clear admin session flag");
        }
        if self.state.is_authenticated() {
            self.set_state(AuthState::Unauthenticated);
        }
    }

    fn set_state(&mut self, state: AuthState) {
        self.state = state;
        self.events.emit_lossy(CatalogEvent::AuthChanged {
            state,
            timestamp: time::now(),
        });
    }
}
