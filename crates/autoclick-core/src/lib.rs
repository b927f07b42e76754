//! autoclick-core: click emission engine + settings model.
//!
//! Design goal: keep this crate UI-agnostic and platform-agnostic.
//! Platform specific I/O (injection, global hotkey) lives in `autoclick-platform`.

mod engine;
pub mod hotkey;
pub mod record;
mod storage;

pub use engine::{ButtonEvent, ClickEmitter, ClickEngine, EngineEvent, EngineState};
pub use hotkey::{HotkeyBinding, HotkeyModifiers, HotkeyParseError};
pub use record::{SettingsRecord, RECORD_LEN};
pub use storage::{
    get_app_data_dir, get_log_dir, load_record, save_record, settings_path, StorageError,
    StorageResult, SETTINGS_ENV,
};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default delay between clicks.
pub const DEFAULT_INTERVAL_MS: u32 = 100;

/// Snapshot of what the engine should do while running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickSettings {
    /// Delay between successive clicks, never below 1.
    pub interval_ms: u32,
    pub kind: ClickKind,
    /// Fixed pointer position. `None` clicks wherever the pointer is.
    pub target: Option<Point>,
}

impl ClickSettings {
    /// Build settings, clamping the interval to at least 1 ms.
    pub fn new(interval_ms: i64, kind: ClickKind, target: Option<Point>) -> Self {
        Self {
            interval_ms: clamp_interval(interval_ms),
            kind,
            target,
        }
    }

    /// The wait between clicks. A zero interval is treated as 1 ms.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.interval_ms.max(1)))
    }
}

impl Default for ClickSettings {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
            kind: ClickKind::Left,
            target: None,
        }
    }
}

/// Clamp a user supplied interval into `1..=u32::MAX`.
pub fn clamp_interval(interval_ms: i64) -> u32 {
    interval_ms.clamp(1, i64::from(u32::MAX)) as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClickKind {
    Left,
    Right,
}

impl std::fmt::Display for ClickKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClickKind::Left => write!(f, "left"),
            ClickKind::Right => write!(f, "right"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_is_clamped() {
        assert_eq!(ClickSettings::new(0, ClickKind::Left, None).interval_ms, 1);
        assert_eq!(ClickSettings::new(-25, ClickKind::Left, None).interval_ms, 1);
        assert_eq!(ClickSettings::new(250, ClickKind::Right, None).interval_ms, 250);
        assert_eq!(clamp_interval(i64::MAX), u32::MAX);
    }

    #[test]
    fn test_zero_interval_never_waits_zero() {
        let settings = ClickSettings {
            interval_ms: 0,
            ..ClickSettings::default()
        };
        assert_eq!(settings.interval(), Duration::from_millis(1));
    }
}
