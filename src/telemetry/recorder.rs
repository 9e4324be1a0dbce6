use std::sync::Arc;

use chrono::Utc;
use log::{debug, trace};

use crate::error_handling::types::CoreError;
use crate::session_management::{SessionId, SessionStatus};
use crate::storage::{Database, WriteLanes};

use super::types::{ClickType, KeystrokeEvent, MouseEvent};

/// Appends keystroke and pointer events for active sessions.
///
/// The recorder is the single telemetry writer in the process. A per-session
/// lane lock serializes the active-check-plus-insert pair, so events for one
/// session land in arrival order even when the capture agent fans out across
/// threads; sessions never contend with each other.
pub struct TelemetryRecorder {
    db: Arc<Database>,
    lanes: WriteLanes,
}

impl TelemetryRecorder {
    pub fn new(db: Arc<Database>) -> Self {
        Self {
            db,
            lanes: WriteLanes::new(),
        }
    }

    pub fn record_keystroke(
        &self,
        session_id: SessionId,
        key_pressed: &str,
        key_released: &str,
        press_duration: f64,
        inter_key_interval: Option<f64>,
    ) -> Result<(), CoreError> {
        if !(press_duration >= 0.0) {
            return Err(CoreError::Validation(format!(
                "press_duration must be >= 0, got {}",
                press_duration
            )));
        }
        if let Some(interval) = inter_key_interval {
            if !(interval >= 0.0) {
                return Err(CoreError::Validation(format!(
                    "inter_key_interval must be >= 0, got {}",
                    interval
                )));
            }
        }

        let lane = self.lanes.lane(session_id);
        let _guard = lane.lock().unwrap_or_else(|e| e.into_inner());
        self.ensure_active(session_id)?;
        let event = KeystrokeEvent {
            session_id,
            timestamp: Utc::now(),
            key_pressed: key_pressed.to_string(),
            key_released: key_released.to_string(),
            press_duration,
            inter_key_interval,
        };
        self.db.insert_keystroke(&event)?;
        trace!("[{}] keystroke {:?} recorded", session_id, key_pressed);
        Ok(())
    }

    pub fn record_mouse_move(
        &self,
        session_id: SessionId,
        x: i32,
        y: i32,
        movement_speed: Option<f64>,
        acceleration: Option<f64>,
        click_type: Option<ClickType>,
    ) -> Result<(), CoreError> {
        if let Some(speed) = movement_speed {
            if !(speed >= 0.0) {
                return Err(CoreError::Validation(format!(
                    "movement_speed must be >= 0, got {}",
                    speed
                )));
            }
        }

        let lane = self.lanes.lane(session_id);
        let _guard = lane.lock().unwrap_or_else(|e| e.into_inner());
        self.ensure_active(session_id)?;
        let event = MouseEvent {
            session_id,
            timestamp: Utc::now(),
            x,
            y,
            movement_speed,
            acceleration,
            click_type,
        };
        self.db.insert_mouse_event(&event)?;
        trace!("[{}] mouse sample at ({}, {}) recorded", session_id, x, y);
        Ok(())
    }

    /// Keystroke events for a session, ascending by timestamp (arrival order).
    pub fn keystrokes(&self, session_id: SessionId) -> Result<Vec<KeystrokeEvent>, CoreError> {
        Ok(self.db.keystrokes(session_id)?)
    }

    /// Pointer events for a session, ascending by timestamp (arrival order).
    pub fn mouse_movements(&self, session_id: SessionId) -> Result<Vec<MouseEvent>, CoreError> {
        Ok(self.db.mouse_movements(session_id)?)
    }

    /// Drops the write lane of a session that will take no further events.
    pub fn forget_session(&self, session_id: SessionId) {
        debug!("[{}] releasing telemetry write lane", session_id);
        self.lanes.release(session_id);
    }

    fn ensure_active(&self, session_id: SessionId) -> Result<(), CoreError> {
        match self.db.session_status(session_id)? {
            Some(SessionStatus::Active) => Ok(()),
            _ => Err(CoreError::InvalidSession(session_id)),
        }
    }
}
