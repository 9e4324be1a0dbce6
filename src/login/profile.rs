use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};

use crate::error_handling::types::CoreError;
use crate::storage::Database;

/// A user's baseline login expectations.
///
/// Exactly one profile exists per user. The hour range is inclusive on both
/// ends and does not wrap past midnight; an overnight baseline (for example
/// 22:00-06:00) cannot be expressed. Days use 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginProfile {
    pub user_id: String,
    pub start_hour: u8,
    pub end_hour: u8,
    pub allowed_days: BTreeSet<u8>,
    pub max_duration_seconds: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Renders a day set in the on-disk comma-separated form, e.g. "0,1,2,3,4".
pub fn days_to_csv(days: &BTreeSet<u8>) -> String {
    days.iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Parses the comma-separated day list; `None` on any malformed entry.
pub fn days_from_csv(s: &str) -> Option<BTreeSet<u8>> {
    let mut days = BTreeSet::new();
    for part in s.split(',') {
        if part.is_empty() {
            continue;
        }
        days.insert(part.trim().parse::<u8>().ok()?);
    }
    Some(days)
}

/// Owns the single baseline profile row per user.
pub struct LoginProfileStore {
    db: Arc<Database>,
}

impl LoginProfileStore {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Creates or replaces the profile for `user_id` atomically.
    ///
    /// A fresh profile gets `created_at = updated_at = now`; replacing an
    /// existing one overwrites every behavioral field and bumps `updated_at`
    /// while `created_at` keeps its original value.
    pub fn upsert(
        &self,
        user_id: &str,
        start_hour: u8,
        end_hour: u8,
        allowed_days: &BTreeSet<u8>,
        max_duration_seconds: u32,
    ) -> Result<(), CoreError> {
        if start_hour > 23 || end_hour > 23 {
            return Err(CoreError::Validation(format!(
                "hours must be within [0, 23], got {}..={}",
                start_hour, end_hour
            )));
        }
        if let Some(day) = allowed_days.iter().find(|d| **d > 6) {
            return Err(CoreError::Validation(format!(
                "allowed_days must be within {{0..6}}, got {}",
                day
            )));
        }

        let now = Utc::now();
        let profile = LoginProfile {
            user_id: user_id.to_string(),
            start_hour,
            end_hour,
            allowed_days: allowed_days.clone(),
            max_duration_seconds,
            created_at: now,
            updated_at: now,
        };
        self.db.upsert_profile(&profile)?;
        info!("login profile for '{}' upserted", user_id);
        Ok(())
    }

    /// The profile for a user, or `None` when no baseline exists yet.
    pub fn get(&self, user_id: &str) -> Result<Option<LoginProfile>, CoreError> {
        Ok(self.db.login_profile(user_id)?)
    }
}
