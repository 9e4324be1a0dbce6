use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::patterns::BehavioralPattern;
use crate::session_management::SessionStatus;
use crate::telemetry::{KeystrokeEvent, MouseEvent};

/// Monotonically assigned session identifier (SQLite rowid).
pub type SessionId = i64;

/// One capture session.
///
/// Invariant: `end_time` is set if and only if `status` is `Completed`,
/// and `end_time >= start_time`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub status: SessionStatus,
    pub notes: Option<String>,
}

/// Session record plus event counts, for display without pulling raw events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session: Session,
    pub keystroke_count: u64,
    pub mouse_count: u64,
}

/// Everything recorded for one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub session: Session,
    pub keystrokes: Vec<KeystrokeEvent>,
    pub mouse_movements: Vec<MouseEvent>,
    pub patterns: Vec<BehavioralPattern>,
}
