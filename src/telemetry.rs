//! Raw behavioral telemetry: keystroke dynamics and pointer movement.
//!
//! Events are append-only child rows of a session. The recorder checks that
//! the target session is still active before every write and keeps appends
//! for one session in arrival order.

pub mod recorder;
pub mod types;

pub use recorder::TelemetryRecorder;
pub use types::{ClickType, KeystrokeEvent, MouseEvent};
