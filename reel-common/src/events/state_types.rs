//! State types carried by catalog events

use serde::{Deserialize, Serialize};

/// Admin form mode
///
/// `Idle` means a submit creates a new video; `Editing` means a submit
/// overwrites the video with `id`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum EditState {
    #[default]
    Idle,
    Editing { id: String },
}

impl EditState {
    pub fn is_idle(&self) -> bool {
        matches!(self, EditState::Idle)
    }

    /// ID being edited, if any
    pub fn editing_id(&self) -> Option<&str> {
        match self {
            EditState::Idle => None,
            EditState::Editing { id } => Some(id),
        }
    }
}

/// Admin gate state for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated,
}

impl AuthState {
    pub fn is_authenticated(self) -> bool {
        self == AuthState::Authenticated
    }
}

impl std::fmt::Display for AuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthState::Unauthenticated => write!(f, "Unauthenticated"),
            AuthState::Authenticated => write!(f, "Authenticated"),
        }
    }
}
