use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::session_management::SessionId;

/// Per-session write lanes.
///
/// Event appends for one session must land in arrival order, so each session
/// gets its own lock; writers for different sessions do not contend. The lane
/// map itself is only held long enough to clone the lane out.
pub struct WriteLanes {
    inner: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
}

impl WriteLanes {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the lock for `session_id`, creating it on first use.
    pub fn lane(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(map.entry(session_id).or_default())
    }

    /// Drops the lane for a session that will take no further writes.
    pub fn release(&self, session_id: SessionId) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(&session_id);
    }
}

impl Default for WriteLanes {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_session_shares_a_lane() {
        let lanes = WriteLanes::new();
        let a = lanes.lane(1);
        let b = lanes.lane(1);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn distinct_sessions_do_not_share() {
        let lanes = WriteLanes::new();
        let a = lanes.lane(1);
        let b = lanes.lane(2);
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn release_forgets_the_lane() {
        let lanes = WriteLanes::new();
        let a = lanes.lane(7);
        lanes.release(7);
        let b = lanes.lane(7);
        assert!(!Arc::ptr_eq(&a, &b));
    }
}
