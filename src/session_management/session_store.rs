use std::sync::Arc;

use chrono::Utc;
use log::{debug, info};

use crate::error_handling::types::CoreError;
use crate::storage::Database;

use super::session::{Session, SessionData, SessionId, SessionSummary};

/// Owns session lifecycle records.
///
/// The store is the only writer of `status` and `end_time`. Completion is a
/// single conditional UPDATE, so a session can only transition Active ->
/// Completed once regardless of how many callers race on it.
pub struct SessionStore {
    db: Arc<Database>,
}

impl SessionStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Opens a new capture session and returns its id.
    pub fn create(&self, notes: Option<&str>) -> Result<SessionId, CoreError> {
        let id = self.db.insert_session(Utc::now(), notes)?;
        info!("session {} started", id);
        Ok(id)
    }

    /// Completes an active session, stamping its end time.
    ///
    /// Errors with `NotFound` for an unknown id and `InvalidState` when the
    /// session has already been completed.
    pub fn end(&self, id: SessionId) -> Result<(), CoreError> {
        if self.db.complete_session(id, Utc::now())? == 1 {
            info!("session {} completed", id);
            return Ok(());
        }
        // Nothing updated: distinguish a missing session from a double close.
        match self.db.session_status(id)? {
            None => Err(CoreError::NotFound),
            Some(status) => Err(CoreError::InvalidState(format!(
                "session {} is already {}",
                id,
                status.as_str()
            ))),
        }
    }

    pub fn get(&self, id: SessionId) -> Result<Session, CoreError> {
        self.db.session_by_id(id)?.ok_or(CoreError::NotFound)
    }

    pub fn list_active(&self) -> Result<Vec<Session>, CoreError> {
        Ok(self.db.active_sessions()?)
    }

    /// Session record plus event counts.
    pub fn summary(&self, id: SessionId) -> Result<SessionSummary, CoreError> {
        let session = self.get(id)?;
        let keystroke_count = self.db.count_keystrokes(id)?;
        let mouse_count = self.db.count_mouse_events(id)?;
        debug!(
            "session {} summary: {} keystrokes, {} mouse samples",
            id, keystroke_count, mouse_count
        );
        Ok(SessionSummary {
            session,
            keystroke_count,
            mouse_count,
        })
    }

    /// Everything recorded for a session: raw telemetry and derived patterns.
    pub fn session_data(&self, id: SessionId) -> Result<SessionData, CoreError> {
        let session = self.get(id)?;
        Ok(SessionData {
            session,
            keystrokes: self.db.keystrokes(id)?,
            mouse_movements: self.db.mouse_movements(id)?,
            patterns: self.db.patterns(id)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session_management::SessionStatus;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_store() -> SessionStore {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("test.sqlite3");
        Box::leak(Box::new(dir));
        SessionStore::new(Arc::new(Database::new_file(path).unwrap()))
    }

    #[test]
    fn test_created_session_is_listed_active() {
        let store = temp_store();
        let id = store.create(Some("capture run")).unwrap();
        let active = store.list_active().unwrap();
        assert!(active.iter().any(|s| s.id == id));

        store.end(id).unwrap();
        let active = store.list_active().unwrap();
        assert!(!active.iter().any(|s| s.id == id));

        let session = store.get(id).unwrap();
        assert_eq!(session.status, SessionStatus::Completed);
        assert!(session.end_time.unwrap() >= session.start_time);
        assert_eq!(session.notes.as_deref(), Some("capture run"));
    }

    #[test]
    fn test_end_unknown_session_is_not_found() {
        let store = temp_store();
        assert!(matches!(store.end(99), Err(CoreError::NotFound)));
        assert!(matches!(store.get(99), Err(CoreError::NotFound)));
    }

    #[test]
    fn test_double_end_is_invalid_state() {
        let store = temp_store();
        let id = store.create(None).unwrap();
        store.end(id).unwrap();
        assert!(matches!(store.end(id), Err(CoreError::InvalidState(_))));
    }

    #[test]
    fn test_summary_counts_events() {
        let store = temp_store();
        let db = Arc::clone(&store.db);
        let recorder = crate::telemetry::TelemetryRecorder::new(Arc::clone(&db));
        let id = store.create(None).unwrap();

        for _ in 0..3 {
            recorder.record_keystroke(id, "a", "a", 0.1, None).unwrap();
        }
        recorder
            .record_mouse_move(id, 10, 20, None, None, None)
            .unwrap();

        let summary = store.summary(id).unwrap();
        assert_eq!(summary.keystroke_count, 3);
        assert_eq!(summary.mouse_count, 1);

        let data = store.session_data(id).unwrap();
        assert_eq!(data.keystrokes.len(), 3);
        assert_eq!(data.mouse_movements.len(), 1);
        assert!(data.patterns.is_empty());
    }
}
