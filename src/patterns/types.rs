use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session_management::SessionId;

/// A derived, session-scoped summary of raw telemetry.
///
/// `pattern_data` is an opaque serialized payload (typically a JSON feature
/// map); the core never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralPattern {
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub pattern_type: String,
    /// Confidence in [0, 1].
    pub confidence_score: f64,
    pub pattern_data: String,
}
