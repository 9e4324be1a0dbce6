//! Session lifecycle types and the store that owns them.
//!
//! A session is a bounded interval of telemetry capture. `SessionStore` is the
//! only writer of `status` and `end_time`; telemetry and pattern rows reference
//! sessions but never mutate them.

use serde::{Deserialize, Serialize};

pub mod session;
pub mod session_store;

pub use session::{Session, SessionData, SessionId, SessionSummary};
pub use session_store::SessionStore;

/// Lifecycle state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    Active,
    Completed,
}

impl SessionStatus {
    /// On-disk representation, matching the `sessions.status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            _ => None,
        }
    }
}
