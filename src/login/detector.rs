//! Fixed-threshold login anomaly detection.
//!
//! A pure rule sequence over a user's baseline profile; no I/O, no shared
//! state, safe to call concurrently from any number of threads. The detector
//! never fails: a missing profile is the "no baseline" verdict, not an error.

use chrono::{DateTime, Datelike, Timelike, Utc};

use super::profile::LoginProfile;

/// Outcome of evaluating one login attempt against a baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub is_suspicious: bool,
    pub reason: Option<&'static str>,
}

impl Verdict {
    fn suspicious(reason: &'static str) -> Self {
        Self {
            is_suspicious: true,
            reason: Some(reason),
        }
    }

    fn normal() -> Self {
        Self {
            is_suspicious: false,
            reason: None,
        }
    }
}

/// Evaluates a login attempt against `profile`. First matching rule wins;
/// reasons are never combined.
///
/// Rules, in order:
/// 1. no profile -> "No login pattern established"
/// 2. hour outside the inclusive [start_hour, end_hour] range -> "Login
///    outside normal hours". The range cannot wrap past midnight; a profile
///    with `start_hour > end_hour` matches no hour at all.
/// 3. weekday (0 = Monday .. 6 = Sunday) not in the allowed set -> "Login on
///    non-allowed day"
/// 4. duration above the profile maximum -> "Login duration exceeds maximum"
pub fn evaluate(
    profile: Option<&LoginProfile>,
    login_time: DateTime<Utc>,
    duration_seconds: f64,
) -> Verdict {
    let profile = match profile {
        Some(p) => p,
        None => return Verdict::suspicious("No login pattern established"),
    };

    let hour = login_time.hour() as u8;
    if !(profile.start_hour..=profile.end_hour).contains(&hour) {
        return Verdict::suspicious("Login outside normal hours");
    }

    let weekday = login_time.weekday().num_days_from_monday() as u8;
    if !profile.allowed_days.contains(&weekday) {
        return Verdict::suspicious("Login on non-allowed day");
    }

    if duration_seconds > profile.max_duration_seconds as f64 {
        return Verdict::suspicious("Login duration exceeds maximum");
    }

    Verdict::normal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::BTreeSet;

    fn office_hours_profile() -> LoginProfile {
        let now = Utc::now();
        LoginProfile {
            user_id: "alice".into(),
            start_hour: 8,
            end_hour: 18,
            allowed_days: [0u8, 1, 2, 3, 4].into_iter().collect(),
            max_duration_seconds: 30,
            created_at: now,
            updated_at: now,
        }
    }

    // 2024-01-02 is a Tuesday, 2024-01-06 a Saturday.
    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_missing_profile_is_always_suspicious() {
        let verdict = evaluate(None, at(2, 10), 1.0);
        assert!(verdict.is_suspicious);
        assert_eq!(verdict.reason, Some("No login pattern established"));
    }

    #[test]
    fn test_login_outside_hours() {
        let profile = office_hours_profile();
        let verdict = evaluate(Some(&profile), at(2, 3), 2.5);
        assert!(verdict.is_suspicious);
        assert_eq!(verdict.reason, Some("Login outside normal hours"));
    }

    #[test]
    fn test_hour_range_is_inclusive_on_both_ends() {
        let profile = office_hours_profile();
        assert!(!evaluate(Some(&profile), at(2, 8), 1.0).is_suspicious);
        assert!(!evaluate(Some(&profile), at(2, 18), 1.0).is_suspicious);
        assert!(evaluate(Some(&profile), at(2, 7), 1.0).is_suspicious);
        assert!(evaluate(Some(&profile), at(2, 19), 1.0).is_suspicious);
    }

    #[test]
    fn test_login_on_non_allowed_day() {
        let profile = office_hours_profile();
        let verdict = evaluate(Some(&profile), at(6, 10), 2.5);
        assert!(verdict.is_suspicious);
        assert_eq!(verdict.reason, Some("Login on non-allowed day"));
    }

    #[test]
    fn test_duration_above_maximum() {
        let profile = office_hours_profile();
        let verdict = evaluate(Some(&profile), at(2, 10), 45.0);
        assert!(verdict.is_suspicious);
        assert_eq!(verdict.reason, Some("Login duration exceeds maximum"));
        // equal to the maximum is still normal
        assert!(!evaluate(Some(&profile), at(2, 10), 30.0).is_suspicious);
    }

    #[test]
    fn test_normal_login_has_no_reason() {
        let profile = office_hours_profile();
        let verdict = evaluate(Some(&profile), at(2, 10), 10.0);
        assert!(!verdict.is_suspicious);
        assert_eq!(verdict.reason, None);
    }

    #[test]
    fn test_hour_rule_wins_over_day_rule() {
        // Saturday at 3 AM violates both; the hour rule fires first.
        let profile = office_hours_profile();
        let verdict = evaluate(Some(&profile), at(6, 3), 100.0);
        assert_eq!(verdict.reason, Some("Login outside normal hours"));
    }

    #[test]
    fn test_inverted_range_matches_no_hour() {
        // Wraparound is not supported: 22..=6 is an empty range.
        let mut profile = office_hours_profile();
        profile.start_hour = 22;
        profile.end_hour = 6;
        assert!(evaluate(Some(&profile), at(2, 23), 1.0).is_suspicious);
        assert!(evaluate(Some(&profile), at(2, 2), 1.0).is_suspicious);
    }

    #[test]
    fn test_empty_day_set_rejects_every_day() {
        let mut profile = office_hours_profile();
        profile.allowed_days = BTreeSet::new();
        let verdict = evaluate(Some(&profile), at(2, 10), 1.0);
        assert_eq!(verdict.reason, Some("Login on non-allowed day"));
    }
}
