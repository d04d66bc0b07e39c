//! Edit session: add-vs-update mode for the admin form
//!
//! One submit control means either "create" or "overwrite". The session
//! decides which, so the form can never create a duplicate while the user
//! believes they are editing.
//!
//! ```text
//!            begin_edit(id)
//!   Idle ─────────────────────▶ Editing(id)
//!    ▲  ◀──────────────────────    │
//!    │   submit ok / cancel /      │
//!    │   record removed            │
//!    └── submit (add), cancel ─────┘ (Idle stays Idle)
//! ```

use crate::catalog::CatalogStore;
use crate::events::{CatalogEvent, EditState, EventBus};
use crate::models::{VideoInput, VideoRecord};
use crate::{time, Error, Result};
use tracing::debug;

/// What a form submission resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added(VideoRecord),
    Updated {
        /// Key the record had before the update
        previous_id: String,
        record: VideoRecord,
    },
}

impl SubmitOutcome {
    pub fn record(&self) -> &VideoRecord {
        match self {
            SubmitOutcome::Added(record) => record,
            SubmitOutcome::Updated { record, .. } => record,
        }
    }
}

/// Admin form state machine; never persisted
pub struct EditSession {
    state: EditState,
    form: VideoInput,
    events: EventBus,
}

impl EditSession {
    pub fn new(events: EventBus) -> Self {
        Self {
            state: EditState::Idle,
            form: VideoInput::default(),
            events,
        }
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    /// Current form contents (pre-populated while editing)
    pub fn form(&self) -> &VideoInput {
        &self.form
    }

    /// Start editing `id`, pre-populating the form from the catalog
    pub fn begin_edit(&mut self, catalog: &CatalogStore, id: &str) -> Result<&VideoInput> {
        let record = catalog
            .get(id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;

        debug!(id = %id, "Editing video");
        self.form = VideoInput::from_record(record);
        self.transition(EditState::Editing { id: id.to_string() });
        Ok(&self.form)
    }

    /// Resolve a form submission against the catalog
    ///
    /// `Idle` adds; `Editing(id)` updates `id` and returns to `Idle` on
    /// success. On failure the state and form are left untouched so the
    /// user can correct the input.
    pub fn submit(&mut self, catalog: &mut CatalogStore, form: &VideoInput) -> Result<SubmitOutcome> {
        let outcome = match &self.state {
            EditState::Idle => SubmitOutcome::Added(catalog.add(form)?),
            EditState::Editing { id } => {
                let record = catalog.update(id, form)?;
                SubmitOutcome::Updated {
                    previous_id: id.clone(),
                    record,
                }
            }
        };

        self.form = VideoInput::default();
        if !self.state.is_idle() {
            self.transition(EditState::Idle);
        }
        Ok(outcome)
    }

    /// Clear the form and return to `Idle` without touching the catalog
    pub fn cancel(&mut self) {
        self.form = VideoInput::default();
        self.transition(EditState::Idle);
    }

    /// Drop back to `Idle` if `id` was being edited (it no longer exists)
    ///
    /// Returns whether the session was reset.
    pub fn forget(&mut self, id: &str) -> bool {
        if self.state.editing_id() != Some(id) {
            return false;
        }
        debug!(id = %id, "Edited video removed, leaving edit mode");
        self.form = VideoInput::default();
        self.transition(EditState::Idle);
        true
    }

    fn transition(&mut self, next: EditState) {
        self.state = next;
        self.events.emit_lossy(CatalogEvent::EditStateChanged {
            state: self.state.clone(),
            timestamp: time::now(),
        });
    }
}
