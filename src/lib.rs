//! Per-session behavioral telemetry and login anomaly detection.
//!
//! The crate records keystroke timing and pointer movement per capture
//! session, keeps a baseline login profile per user, and evaluates login
//! attempts against that baseline with a fixed-priority rule sequence. It is
//! an embedded, in-process data/logic layer: a capture agent, an
//! authentication flow, and a reporting shell all consume it through the
//! store types constructed around one shared [`storage::Database`] handle.

pub mod configuration;
pub mod error_handling;
pub mod login;
pub mod patterns;
pub mod session_management;
pub mod storage;
pub mod telemetry;

pub use configuration::Config;
pub use error_handling::types::{ConfigError, CoreError, StorageError};
pub use login::{LoginAttempt, LoginAttemptLog, LoginProfile, LoginProfileStore, Verdict};
pub use patterns::{BehavioralPattern, PatternRepository};
pub use session_management::{Session, SessionId, SessionStatus, SessionStore};
pub use storage::Database;
pub use telemetry::{ClickType, KeystrokeEvent, MouseEvent, TelemetryRecorder};
