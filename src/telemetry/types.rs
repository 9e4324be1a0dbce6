use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::session_management::SessionId;

/// One key press/release pair with its timing characteristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub key_pressed: String,
    pub key_released: String,
    /// Key-down to key-up, in seconds.
    pub press_duration: f64,
    /// Gap to the previous keystroke, in seconds. Absent for the first key.
    pub inter_key_interval: Option<f64>,
}

/// One pointer sample, optionally carrying a click.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MouseEvent {
    pub session_id: SessionId,
    pub timestamp: DateTime<Utc>,
    pub x: i32,
    pub y: i32,
    pub movement_speed: Option<f64>,
    pub acceleration: Option<f64>,
    pub click_type: Option<ClickType>,
}

/// Which button a click sample belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickType {
    Left,
    Right,
    Middle,
}

impl ClickType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClickType::Left => "left",
            ClickType::Right => "right",
            ClickType::Middle => "middle",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "left" => Some(ClickType::Left),
            "right" => Some(ClickType::Right),
            "middle" => Some(ClickType::Middle),
            _ => None,
        }
    }
}
