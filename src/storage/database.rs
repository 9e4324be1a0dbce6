use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    Pool, Sqlite,
};

use crate::error_handling::types::StorageError;
use crate::login::attempt_log::{AttemptId, LoginAttempt};
use crate::login::profile::{days_from_csv, days_to_csv, LoginProfile};
use crate::patterns::BehavioralPattern;
use crate::session_management::{Session, SessionId, SessionStatus};
use crate::telemetry::{ClickType, KeystrokeEvent, MouseEvent};

fn parse_ts(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|_| StorageError::ReadFailed)
}

// Internal row mappings to avoid positional try_get
#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    session_id: i64,
    start_time: String,
    end_time: Option<String>,
    status: String,
    notes: Option<String>,
}

impl SessionRow {
    fn into_session(self) -> Result<Session, StorageError> {
        let status = SessionStatus::parse(&self.status).ok_or(StorageError::ReadFailed)?;
        Ok(Session {
            id: self.session_id,
            start_time: parse_ts(&self.start_time)?,
            end_time: match self.end_time {
                Some(s) => Some(parse_ts(&s)?),
                None => None,
            },
            status,
            notes: self.notes,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct KeystrokeRow {
    session_id: i64,
    timestamp: String,
    key_pressed: String,
    key_released: String,
    press_duration: f64,
    inter_key_interval: Option<f64>,
}

impl KeystrokeRow {
    fn into_event(self) -> Result<KeystrokeEvent, StorageError> {
        Ok(KeystrokeEvent {
            session_id: self.session_id,
            timestamp: parse_ts(&self.timestamp)?,
            key_pressed: self.key_pressed,
            key_released: self.key_released,
            press_duration: self.press_duration,
            inter_key_interval: self.inter_key_interval,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MouseRow {
    session_id: i64,
    timestamp: String,
    x_position: i64,
    y_position: i64,
    movement_speed: Option<f64>,
    acceleration: Option<f64>,
    click_type: Option<String>,
}

impl MouseRow {
    fn into_event(self) -> Result<MouseEvent, StorageError> {
        let click_type = match self.click_type {
            Some(s) => Some(ClickType::parse(&s).ok_or(StorageError::ReadFailed)?),
            None => None,
        };
        Ok(MouseEvent {
            session_id: self.session_id,
            timestamp: parse_ts(&self.timestamp)?,
            x: self.x_position as i32,
            y: self.y_position as i32,
            movement_speed: self.movement_speed,
            acceleration: self.acceleration,
            click_type,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PatternRow {
    session_id: i64,
    timestamp: String,
    pattern_type: String,
    confidence_score: f64,
    pattern_data: String,
}

impl PatternRow {
    fn into_pattern(self) -> Result<BehavioralPattern, StorageError> {
        Ok(BehavioralPattern {
            session_id: self.session_id,
            timestamp: parse_ts(&self.timestamp)?,
            pattern_type: self.pattern_type,
            confidence_score: self.confidence_score,
            pattern_data: self.pattern_data,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    normal_login_start_hour: i64,
    normal_login_end_hour: i64,
    normal_login_days: String,
    max_login_duration: i64,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<LoginProfile, StorageError> {
        Ok(LoginProfile {
            user_id: self.user_id,
            start_hour: self.normal_login_start_hour as u8,
            end_hour: self.normal_login_end_hour as u8,
            allowed_days: days_from_csv(&self.normal_login_days)
                .ok_or(StorageError::ReadFailed)?,
            max_duration_seconds: self.max_login_duration as u32,
            created_at: parse_ts(&self.created_at)?,
            updated_at: parse_ts(&self.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AttemptRow {
    user_id: String,
    attempt_time: String,
    success: bool,
    duration: f64,
    ip_address: Option<String>,
    device_info: Option<String>,
    is_suspicious: bool,
    reason: Option<String>,
}

impl AttemptRow {
    fn into_attempt(self) -> Result<LoginAttempt, StorageError> {
        Ok(LoginAttempt {
            user_id: self.user_id,
            attempt_time: parse_ts(&self.attempt_time)?,
            success: self.success,
            duration_seconds: self.duration,
            ip_address: self.ip_address,
            device_info: self.device_info,
            is_suspicious: self.is_suspicious,
            reason: self.reason,
        })
    }
}

/// Process-wide SQLite handle.
///
/// Opened once at startup and injected into every store. The pool is driven by
/// an owned current-thread runtime so the stores expose a plain blocking API
/// callable from the capture thread and the authentication thread alike. Every
/// query runs under a timeout; a slow database surfaces
/// [`StorageError::Timeout`] instead of hanging the caller.
pub struct Database {
    rt: tokio::runtime::Runtime,
    pool: Pool<Sqlite>,
    op_timeout: Duration,
}

impl Database {
    /// Default database filename used in the application's working directory
    const DEFAULT_DB_FILE: &'static str = "biomon.sqlite3";

    const DEFAULT_OP_TIMEOUT: Duration = Duration::from_secs(5);

    /// Create or open the database in the current working directory with the default filename
    pub fn new() -> Result<Self, StorageError> {
        let cwd = std::env::current_dir().map_err(|_| StorageError::ConnectionFailed)?;
        Self::open(cwd.join(Self::DEFAULT_DB_FILE), Self::DEFAULT_OP_TIMEOUT)
    }

    pub fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        Self::open(path, Self::DEFAULT_OP_TIMEOUT)
    }

    pub fn open<P: AsRef<Path>>(path: P, op_timeout: Duration) -> Result<Self, StorageError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|_| StorageError::ConnectionFailed)?;
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent).map_err(|_| StorageError::WriteFailed)?;
        }
        let pool = rt.block_on(async {
            let opts = SqliteConnectOptions::from_str("sqlite://")
                .unwrap()
                .filename(path_ref)
                .create_if_missing(true)
                // WAL lets summary reads proceed while the capture thread writes
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(op_timeout);
            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .acquire_timeout(op_timeout)
                .connect_with(opts)
                .await
                .map_err(|_| StorageError::ConnectionFailed)?;
            sqlx::query("PRAGMA foreign_keys = ON;")
                .execute(&pool)
                .await
                .map_err(|_| StorageError::WriteFailed)?;
            Self::create_schema(&pool).await?;
            Ok::<_, StorageError>(pool)
        })?;
        info!("Database opened at {}", path_ref.display());
        Ok(Self {
            rt,
            pool,
            op_timeout,
        })
    }

    async fn create_schema(pool: &Pool<Sqlite>) -> Result<(), StorageError> {
        let statements = [
            "CREATE TABLE IF NOT EXISTS sessions (
                session_id INTEGER PRIMARY KEY AUTOINCREMENT,
                start_time TEXT NOT NULL,
                end_time TEXT,
                status TEXT NOT NULL,
                notes TEXT
            );",
            "CREATE TABLE IF NOT EXISTS keystroke_dynamics (
                keystroke_id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                key_pressed TEXT NOT NULL,
                key_released TEXT NOT NULL,
                press_duration REAL NOT NULL,
                inter_key_interval REAL,
                FOREIGN KEY (session_id) REFERENCES sessions (session_id)
            );",
            "CREATE TABLE IF NOT EXISTS mouse_movements (
                movement_id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                x_position INTEGER NOT NULL,
                y_position INTEGER NOT NULL,
                movement_speed REAL,
                acceleration REAL,
                click_type TEXT,
                FOREIGN KEY (session_id) REFERENCES sessions (session_id)
            );",
            "CREATE TABLE IF NOT EXISTS behavioral_patterns (
                pattern_id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id INTEGER NOT NULL,
                timestamp TEXT NOT NULL,
                pattern_type TEXT NOT NULL,
                confidence_score REAL NOT NULL,
                pattern_data TEXT NOT NULL,
                FOREIGN KEY (session_id) REFERENCES sessions (session_id)
            );",
            "CREATE TABLE IF NOT EXISTS login_patterns (
                pattern_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL UNIQUE,
                normal_login_start_hour INTEGER NOT NULL,
                normal_login_end_hour INTEGER NOT NULL,
                normal_login_days TEXT NOT NULL,
                max_login_duration INTEGER NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );",
            "CREATE TABLE IF NOT EXISTS login_attempts (
                attempt_id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                attempt_time TEXT NOT NULL,
                success INTEGER NOT NULL,
                duration REAL NOT NULL,
                ip_address TEXT,
                device_info TEXT,
                is_suspicious INTEGER NOT NULL,
                reason TEXT
            );",
        ];
        for stmt in statements {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|_| StorageError::WriteFailed)?;
        }
        Ok(())
    }

    /// Drives one query to completion under the operation timeout.
    fn run<T>(
        &self,
        fut: impl Future<Output = Result<T, StorageError>>,
    ) -> Result<T, StorageError> {
        self.rt.block_on(async {
            match tokio::time::timeout(self.op_timeout, fut).await {
                Ok(res) => res,
                Err(_) => Err(StorageError::Timeout),
            }
        })
    }

    // --- sessions ---

    pub fn insert_session(
        &self,
        start_time: DateTime<Utc>,
        notes: Option<&str>,
    ) -> Result<SessionId, StorageError> {
        self.run(async {
            let res = sqlx::query(
                "INSERT INTO sessions (start_time, status, notes) VALUES (?1, ?2, ?3)",
            )
            .bind(start_time.to_rfc3339())
            .bind(SessionStatus::Active.as_str())
            .bind(notes)
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
            debug!("inserted session {}", res.last_insert_rowid());
            Ok(res.last_insert_rowid())
        })
    }

    pub fn session_by_id(&self, id: SessionId) -> Result<Option<Session>, StorageError> {
        self.run(async {
            let row = sqlx::query_as::<_, SessionRow>(
                "SELECT session_id, start_time, end_time, status, notes
                 FROM sessions WHERE session_id = ?1",
            )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
            row.map(SessionRow::into_session).transpose()
        })
    }

    pub fn active_sessions(&self) -> Result<Vec<Session>, StorageError> {
        self.run(async {
            let rows = sqlx::query_as::<_, SessionRow>(
                "SELECT session_id, start_time, end_time, status, notes
                 FROM sessions WHERE status = ?1 ORDER BY session_id ASC",
            )
            .bind(SessionStatus::Active.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
            rows.into_iter().map(SessionRow::into_session).collect()
        })
    }

    /// Marks an active session completed. Returns the number of rows updated,
    /// which is zero when the session is missing or already completed.
    pub fn complete_session(
        &self,
        id: SessionId,
        end_time: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        self.run(async {
            let res = sqlx::query(
                "UPDATE sessions SET end_time = ?1, status = ?2
                 WHERE session_id = ?3 AND status = ?4",
            )
            .bind(end_time.to_rfc3339())
            .bind(SessionStatus::Completed.as_str())
            .bind(id)
            .bind(SessionStatus::Active.as_str())
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
            Ok(res.rows_affected())
        })
    }

    pub fn session_status(&self, id: SessionId) -> Result<Option<SessionStatus>, StorageError> {
        self.run(async {
            let status: Option<String> =
                sqlx::query_scalar("SELECT status FROM sessions WHERE session_id = ?1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|_| StorageError::ReadFailed)?;
            match status {
                Some(s) => SessionStatus::parse(&s)
                    .map(Some)
                    .ok_or(StorageError::ReadFailed),
                None => Ok(None),
            }
        })
    }

    // --- telemetry ---

    pub fn insert_keystroke(&self, event: &KeystrokeEvent) -> Result<(), StorageError> {
        self.run(async {
            sqlx::query(
                "INSERT INTO keystroke_dynamics (
                    session_id, timestamp, key_pressed, key_released,
                    press_duration, inter_key_interval
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .bind(event.session_id)
            .bind(event.timestamp.to_rfc3339())
            .bind(&event.key_pressed)
            .bind(&event.key_released)
            .bind(event.press_duration)
            .bind(event.inter_key_interval)
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
            Ok(())
        })
    }

    pub fn keystrokes(&self, session_id: SessionId) -> Result<Vec<KeystrokeEvent>, StorageError> {
        self.run(async {
            let rows = sqlx::query_as::<_, KeystrokeRow>(
                "SELECT session_id, timestamp, key_pressed, key_released,
                        press_duration, inter_key_interval
                 FROM keystroke_dynamics WHERE session_id = ?1
                 ORDER BY timestamp ASC, keystroke_id ASC",
            )
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
            rows.into_iter().map(KeystrokeRow::into_event).collect()
        })
    }

    pub fn count_keystrokes(&self, session_id: SessionId) -> Result<u64, StorageError> {
        self.run(async {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM keystroke_dynamics WHERE session_id = ?1")
                    .bind(session_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|_| StorageError::ReadFailed)?;
            Ok(count as u64)
        })
    }

    pub fn insert_mouse_event(&self, event: &MouseEvent) -> Result<(), StorageError> {
        self.run(async {
            sqlx::query(
                "INSERT INTO mouse_movements (
                    session_id, timestamp, x_position, y_position,
                    movement_speed, acceleration, click_type
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )
            .bind(event.session_id)
            .bind(event.timestamp.to_rfc3339())
            .bind(event.x as i64)
            .bind(event.y as i64)
            .bind(event.movement_speed)
            .bind(event.acceleration)
            .bind(event.click_type.map(|c| c.as_str()))
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
            Ok(())
        })
    }

    pub fn mouse_movements(&self, session_id: SessionId) -> Result<Vec<MouseEvent>, StorageError> {
        self.run(async {
            let rows = sqlx::query_as::<_, MouseRow>(
                "SELECT session_id, timestamp, x_position, y_position,
                        movement_speed, acceleration, click_type
                 FROM mouse_movements WHERE session_id = ?1
                 ORDER BY timestamp ASC, movement_id ASC",
            )
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
            rows.into_iter().map(MouseRow::into_event).collect()
        })
    }

    pub fn count_mouse_events(&self, session_id: SessionId) -> Result<u64, StorageError> {
        self.run(async {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM mouse_movements WHERE session_id = ?1")
                    .bind(session_id)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|_| StorageError::ReadFailed)?;
            Ok(count as u64)
        })
    }

    // --- behavioral patterns ---

    pub fn insert_pattern(&self, pattern: &BehavioralPattern) -> Result<(), StorageError> {
        self.run(async {
            sqlx::query(
                "INSERT INTO behavioral_patterns (
                    session_id, timestamp, pattern_type, confidence_score, pattern_data
                 ) VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(pattern.session_id)
            .bind(pattern.timestamp.to_rfc3339())
            .bind(&pattern.pattern_type)
            .bind(pattern.confidence_score)
            .bind(&pattern.pattern_data)
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
            Ok(())
        })
    }

    pub fn patterns(&self, session_id: SessionId) -> Result<Vec<BehavioralPattern>, StorageError> {
        self.run(async {
            let rows = sqlx::query_as::<_, PatternRow>(
                "SELECT session_id, timestamp, pattern_type, confidence_score, pattern_data
                 FROM behavioral_patterns WHERE session_id = ?1
                 ORDER BY timestamp ASC, pattern_id ASC",
            )
            .bind(session_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
            rows.into_iter().map(PatternRow::into_pattern).collect()
        })
    }

    // --- login profiles ---

    /// Inserts or replaces the single profile row for a user. On conflict all
    /// behavioral fields and `updated_at` are overwritten while `created_at`
    /// keeps its original value.
    pub fn upsert_profile(&self, profile: &LoginProfile) -> Result<(), StorageError> {
        self.run(async {
            sqlx::query(
                "INSERT INTO login_patterns (
                    user_id, normal_login_start_hour, normal_login_end_hour,
                    normal_login_days, max_login_duration, created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(user_id) DO UPDATE SET
                   normal_login_start_hour = excluded.normal_login_start_hour,
                   normal_login_end_hour = excluded.normal_login_end_hour,
                   normal_login_days = excluded.normal_login_days,
                   max_login_duration = excluded.max_login_duration,
                   updated_at = excluded.updated_at",
            )
            .bind(&profile.user_id)
            .bind(profile.start_hour as i64)
            .bind(profile.end_hour as i64)
            .bind(days_to_csv(&profile.allowed_days))
            .bind(profile.max_duration_seconds as i64)
            .bind(profile.created_at.to_rfc3339())
            .bind(profile.updated_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
            Ok(())
        })
    }

    pub fn login_profile(&self, user_id: &str) -> Result<Option<LoginProfile>, StorageError> {
        self.run(async {
            let row = sqlx::query_as::<_, ProfileRow>(
                "SELECT user_id, normal_login_start_hour, normal_login_end_hour,
                        normal_login_days, max_login_duration, created_at, updated_at
                 FROM login_patterns WHERE user_id = ?1",
            )
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
            row.map(ProfileRow::into_profile).transpose()
        })
    }

    // --- login attempts ---

    pub fn insert_attempt(&self, attempt: &LoginAttempt) -> Result<AttemptId, StorageError> {
        self.run(async {
            let res = sqlx::query(
                "INSERT INTO login_attempts (
                    user_id, attempt_time, success, duration,
                    ip_address, device_info, is_suspicious, reason
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(&attempt.user_id)
            .bind(attempt.attempt_time.to_rfc3339())
            .bind(attempt.success)
            .bind(attempt.duration_seconds)
            .bind(&attempt.ip_address)
            .bind(&attempt.device_info)
            .bind(attempt.is_suspicious)
            .bind(&attempt.reason)
            .execute(&self.pool)
            .await
            .map_err(|_| StorageError::WriteFailed)?;
            Ok(res.last_insert_rowid())
        })
    }

    pub fn recent_attempts(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<LoginAttempt>, StorageError> {
        self.run(async {
            let rows = sqlx::query_as::<_, AttemptRow>(
                "SELECT user_id, attempt_time, success, duration,
                        ip_address, device_info, is_suspicious, reason
                 FROM login_attempts WHERE user_id = ?1
                 ORDER BY attempt_time DESC LIMIT ?2",
            )
            .bind(user_id)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|_| StorageError::ReadFailed)?;
            rows.into_iter().map(AttemptRow::into_attempt).collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn temp_db() -> Database {
        let dir = TempDir::new().unwrap();
        let path: PathBuf = dir.path().join("test.sqlite3");
        // Keep TempDir alive by leaking it for the test duration
        Box::leak(Box::new(dir));
        Database::new_file(path).unwrap()
    }

    #[test]
    fn test_session_roundtrip() {
        let db = temp_db();
        let now = Utc::now();
        let id = db.insert_session(now, Some("first run")).unwrap();
        let session = db.session_by_id(id).unwrap().unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.notes.as_deref(), Some("first run"));
        assert!(session.end_time.is_none());
        assert!(db.session_by_id(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_complete_session_updates_once() {
        let db = temp_db();
        let id = db.insert_session(Utc::now(), None).unwrap();
        assert_eq!(db.complete_session(id, Utc::now()).unwrap(), 1);
        // second completion matches no active row
        assert_eq!(db.complete_session(id, Utc::now()).unwrap(), 0);
        assert_eq!(
            db.session_status(id).unwrap(),
            Some(SessionStatus::Completed)
        );
    }

    #[test]
    fn test_session_ids_are_monotonic() {
        let db = temp_db();
        let a = db.insert_session(Utc::now(), None).unwrap();
        let b = db.insert_session(Utc::now(), None).unwrap();
        assert!(b > a);
    }
}
