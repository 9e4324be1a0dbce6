//! Login baselines, anomaly detection and the attempt audit trail.
//!
//! The intended call pattern keeps detection and persistence decoupled: fetch
//! the profile with [`LoginProfileStore::get`], evaluate it with the pure
//! [`detector::evaluate`], then write the verdict through
//! [`LoginAttemptLog::record`].

pub mod attempt_log;
pub mod detector;
pub mod profile;

pub use attempt_log::{AttemptId, LoginAttempt, LoginAttemptLog};
pub use detector::{evaluate, Verdict};
pub use profile::{LoginProfile, LoginProfileStore};
