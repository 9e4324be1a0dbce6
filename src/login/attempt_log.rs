use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error_handling::types::CoreError;
use crate::storage::Database;

use super::detector::Verdict;

/// Monotonically assigned attempt identifier (SQLite rowid).
pub type AttemptId = i64;

/// One audited login attempt. Immutable once written; the log offers no
/// update or delete operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    pub user_id: String,
    pub attempt_time: DateTime<Utc>,
    pub success: bool,
    pub duration_seconds: f64,
    pub ip_address: Option<String>,
    pub device_info: Option<String>,
    pub is_suspicious: bool,
    pub reason: Option<String>,
}

/// Append-only audit trail of login attempts and their verdicts.
pub struct LoginAttemptLog {
    db: Arc<Database>,
}

impl LoginAttemptLog {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Persists one attempt with its detector verdict already applied.
    pub fn record(&self, attempt: LoginAttempt) -> Result<AttemptId, CoreError> {
        if !(attempt.duration_seconds >= 0.0) {
            return Err(CoreError::Validation(format!(
                "duration_seconds must be >= 0, got {}",
                attempt.duration_seconds
            )));
        }
        let id = self.db.insert_attempt(&attempt)?;
        if attempt.is_suspicious {
            warn!(
                "suspicious login for '{}' recorded as attempt {}: {}",
                attempt.user_id,
                id,
                attempt.reason.as_deref().unwrap_or("no reason given")
            );
        } else {
            info!("login for '{}' recorded as attempt {}", attempt.user_id, id);
        }
        Ok(id)
    }

    /// Convenience for the evaluate-then-record call pattern: folds a
    /// [`Verdict`] into the attempt before persisting it.
    pub fn record_with_verdict(
        &self,
        mut attempt: LoginAttempt,
        verdict: &Verdict,
    ) -> Result<AttemptId, CoreError> {
        attempt.is_suspicious = verdict.is_suspicious;
        attempt.reason = verdict.reason.map(str::to_string);
        self.record(attempt)
    }

    /// Most recent attempts for a user, descending by attempt time, at most
    /// `limit` entries.
    pub fn recent(&self, user_id: &str, limit: u32) -> Result<Vec<LoginAttempt>, CoreError> {
        Ok(self.db.recent_attempts(user_id, limit)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::login::detector;
    use crate::login::profile::LoginProfileStore;
    use chrono::Duration;
    use std::collections::BTreeSet;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_db() -> Arc<Database> {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("test.sqlite3");
        Box::leak(Box::new(dir));
        Arc::new(Database::new_file(path).unwrap())
    }

    fn attempt_at(time: DateTime<Utc>) -> LoginAttempt {
        LoginAttempt {
            user_id: "alice".into(),
            attempt_time: time,
            success: true,
            duration_seconds: 2.5,
            ip_address: Some("192.168.1.1".into()),
            device_info: Some("workstation-01".into()),
            is_suspicious: false,
            reason: None,
        }
    }

    #[test]
    fn test_recent_is_limited_and_descending() {
        let log = LoginAttemptLog::new(temp_db());
        let base = Utc::now();
        for i in 0..15 {
            log.record(attempt_at(base + Duration::seconds(i))).unwrap();
        }

        let recent = log.recent("alice", 10).unwrap();
        assert_eq!(recent.len(), 10);
        for pair in recent.windows(2) {
            assert!(pair[0].attempt_time >= pair[1].attempt_time);
        }
        // newest first
        assert_eq!(recent[0].attempt_time, base + Duration::seconds(14));
        assert!(log.recent("bob", 10).unwrap().is_empty());
    }

    #[test]
    fn test_attempt_fields_survive_roundtrip() {
        let log = LoginAttemptLog::new(temp_db());
        let mut attempt = attempt_at(Utc::now());
        attempt.is_suspicious = true;
        attempt.reason = Some("Login outside normal hours".into());
        log.record(attempt).unwrap();

        let recent = log.recent("alice", 1).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].success);
        assert!(recent[0].is_suspicious);
        assert_eq!(recent[0].ip_address.as_deref(), Some("192.168.1.1"));
        assert_eq!(recent[0].device_info.as_deref(), Some("workstation-01"));
        assert_eq!(
            recent[0].reason.as_deref(),
            Some("Login outside normal hours")
        );
    }

    #[test]
    fn test_negative_duration_is_rejected() {
        let log = LoginAttemptLog::new(temp_db());
        let mut attempt = attempt_at(Utc::now());
        attempt.duration_seconds = -1.0;
        assert!(matches!(
            log.record(attempt),
            Err(CoreError::Validation(_))
        ));
    }

    #[test]
    fn test_evaluate_then_record_flow() {
        let db = temp_db();
        let profiles = LoginProfileStore::new(Arc::clone(&db));
        let log = LoginAttemptLog::new(Arc::clone(&db));

        let days: BTreeSet<u8> = [0u8, 1, 2, 3, 4].into_iter().collect();
        profiles.upsert("alice", 8, 18, &days, 30).unwrap();

        // no baseline for bob yet
        let profile = profiles.get("bob").unwrap();
        let now = Utc::now();
        let verdict = detector::evaluate(profile.as_ref(), now, 2.5);
        let mut attempt = attempt_at(now);
        attempt.user_id = "bob".into();
        log.record_with_verdict(attempt, &verdict).unwrap();

        let recent = log.recent("bob", 5).unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].is_suspicious);
        assert_eq!(
            recent[0].reason.as_deref(),
            Some("No login pattern established")
        );
    }
}
