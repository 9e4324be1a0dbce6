use std::sync::Arc;

use chrono::Utc;
use log::debug;

use crate::error_handling::types::CoreError;
use crate::session_management::SessionId;
use crate::storage::Database;

use super::types::BehavioralPattern;

/// Stores derived behavioral-pattern records per session.
pub struct PatternRepository {
    db: Arc<Database>,
}

impl PatternRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Appends a pattern record for an existing session.
    ///
    /// Errors with `Validation` when `confidence_score` is outside [0, 1] and
    /// `NotFound` when the session does not exist. Patterns may still be
    /// derived after a session completes, so only existence is checked.
    pub fn add_pattern(
        &self,
        session_id: SessionId,
        pattern_type: &str,
        confidence_score: f64,
        pattern_data: &str,
    ) -> Result<(), CoreError> {
        if !(0.0..=1.0).contains(&confidence_score) {
            return Err(CoreError::Validation(format!(
                "confidence_score must be within [0, 1], got {}",
                confidence_score
            )));
        }
        if self.db.session_status(session_id)?.is_none() {
            return Err(CoreError::NotFound);
        }
        let pattern = BehavioralPattern {
            session_id,
            timestamp: Utc::now(),
            pattern_type: pattern_type.to_string(),
            confidence_score,
            pattern_data: pattern_data.to_string(),
        };
        self.db.insert_pattern(&pattern)?;
        debug!(
            "[{}] pattern '{}' recorded (confidence {})",
            session_id, pattern_type, confidence_score
        );
        Ok(())
    }

    /// Patterns for a session, ascending by timestamp.
    pub fn list(&self, session_id: SessionId) -> Result<Vec<BehavioralPattern>, CoreError> {
        Ok(self.db.patterns(session_id)?)
    }
}
