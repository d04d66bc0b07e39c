//! Event types for the catalog notifier
//!
//! Renderers (project grid, admin list, video modal) subscribe to the
//! [`EventBus`] and never touch catalog state directly.

mod state_types;

pub use state_types::{AuthState, EditState};

use crate::models::VideoRecord;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Catalog event types
///
/// Events are broadcast via EventBus and serialize with a `type` tag so a
/// front end can switch on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CatalogEvent {
    /// Catalog contents changed (load, add, update, remove)
    ///
    /// Triggers:
    /// - Project grid: rebuild custom cards
    /// - Admin panel: refresh video list
    CatalogChanged {
        /// Videos in render order (newest first)
        videos: Vec<VideoRecord>,
        /// When the catalog changed
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Admin form switched between add and update mode
    EditStateChanged {
        state: EditState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Admin gate opened or closed
    AuthChanged {
        state: AuthState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A project card was activated; the modal should play this video
    OpenVideo {
        id: String,
        embed_url: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl CatalogEvent {
    /// Get event type as string for filtering
    pub fn event_type(&self) -> &str {
        match self {
            CatalogEvent::CatalogChanged { .. } => "CatalogChanged",
            CatalogEvent::EditStateChanged { .. } => "EditStateChanged",
            CatalogEvent::AuthChanged { .. } => "AuthChanged",
            CatalogEvent::OpenVideo { .. } => "OpenVideo",
        }
    }
}

// ========================================
// EventBus Implementation
// ========================================

/// Central event distribution bus
///
/// The EventBus uses tokio::broadcast internally, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Lagged message detection for slow subscribers
///
/// # Examples
///
/// ```
/// use reel_common::events::{EventBus, CatalogEvent, AuthState};
///
/// let event_bus = EventBus::new(64);
/// let mut rx = event_bus.subscribe();
///
/// event_bus.emit_lossy(CatalogEvent::AuthChanged {
///     state: AuthState::Authenticated,
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.event_type(), "AuthChanged");
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CatalogEvent>,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before
    /// the oldest are dropped.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<CatalogEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the number of subscribers reached; errors when there are none.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: CatalogEvent,
    ) -> Result<usize, broadcast::error::SendError<CatalogEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: CatalogEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
