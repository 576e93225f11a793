//! Shared event contracts for cross-context communication.
//!
//! This crate defines the envelope every transport carries, the routing
//! hints accepted by `emit`, and the DTOs for domain events that flow between
//! the background script, tab content scripts and the popup. Using shared
//! types prevents runtime deserialization errors from mismatched field names.

mod envelope;
mod routing;

pub use envelope::{Envelope, FrameHandle, FrameId, ReplyHandle, SenderInfo, TabId, WireMessage};
pub use routing::{EmitOptions, RoutingConflict, RoutingHint};

use serde::{Deserialize, Serialize};

/// Authenticated user profile as returned by the API.
///
/// Producers: user module
/// Consumers: popup, tab content scripts
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Client resource URI, e.g. `/api/apprelation/client/42/`.
    #[serde(default)]
    pub client: Option<String>,
    /// Numeric client id derived from `client`.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Remaining profile fields, passed through untouched.
    #[serde(flatten)]
    pub profile: serde_json::Map<String, serde_json::Value>,
}

/// Event emitted after a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginSucceeded {
    pub user: User,
}

/// Kind of destination a call can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DestinationKind {
    FixedDestination,
    PhoneAccount,
}

/// A selectable destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: DestinationKind,
}

/// Currently selected destination; all fields empty when unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<DestinationKind>,
}

impl Selection {
    pub fn is_available(&self) -> bool {
        self.id.is_some()
    }

    /// Destination id for the given kind, if this selection is of that kind.
    pub fn id_for(&self, kind: DestinationKind) -> Option<i64> {
        if self.kind == Some(kind) {
            self.id
        } else {
            None
        }
    }
}

impl From<&Destination> for Selection {
    fn from(destination: &Destination) -> Self {
        Self {
            id: Some(destination.id),
            name: Some(destination.name.clone()),
            kind: Some(destination.kind),
        }
    }
}

/// Request to change availability.
///
/// Producers: popup
/// Consumers: availability module (background)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvailabilityUpdate {
    #[serde(default)]
    pub selected: Selection,
    #[serde(default)]
    pub destinations: Vec<Destination>,
}

/// Event emitted once the API accepted an availability change.
///
/// Producers: availability module (background)
/// Consumers: popup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityChanged {
    pub available: bool,
    pub selected: Selection,
}

/// Event names as constants to prevent typos.
pub mod event_names {
    /// Login accepted by the API.
    pub const LOGIN_SUCCESS: &str = "login.success";
    /// Login rejected by the API.
    pub const LOGIN_FAILED: &str = "login.failed";
    /// Session cleared.
    pub const LOGOUT_SUCCESS: &str = "logout.success";
    /// Popup asks the background to change availability.
    pub const UPDATE_AVAILABILITY: &str = "bg:update-availability";
    /// Availability change accepted.
    pub const AVAILABILITY_CHANGED: &str = "availability:changed";
    /// Widgets should reload their data.
    pub const WIDGETS_REFRESH: &str = "ui:widgets.refresh";
    /// Widgets should drop their state.
    pub const WIDGETS_RESET: &str = "ui:widgets.reset";
}
