//! Fixed-layout settings record, as stored in `settings.dat`.
//!
//! Layout (little-endian, 28 bytes):
//!
//! | offset | field          | type |
//! |--------|----------------|------|
//! | 0      | interval_ms    | i32  |
//! | 4      | is_left_click  | u8   |
//! | 5      | fixed_position | u8   |
//! | 6      | padding        | 2    |
//! | 8      | x              | i32  |
//! | 12     | y              | i32  |
//! | 16     | theme_index    | i32  |
//! | 20     | hotkey_vk      | i32  |
//! | 24     | hotkey_mod     | i32  |

use crate::hotkey::{HotkeyBinding, HotkeyModifiers};
use crate::{ClickKind, ClickSettings, Point, DEFAULT_INTERVAL_MS};
use serde::{Deserialize, Serialize};

/// Encoded size of a [`SettingsRecord`].
pub const RECORD_LEN: usize = 28;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsRecord {
    pub interval_ms: i32,
    pub is_left_click: bool,
    pub fixed_position: bool,
    pub x: i32,
    pub y: i32,
    /// Cosmetic only.
    pub theme_index: i32,
    pub hotkey_vk: i32,
    pub hotkey_mod: i32,
}

impl Default for SettingsRecord {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS as i32,
            is_left_click: true,
            fixed_position: false,
            x: 0,
            y: 0,
            theme_index: 0,
            hotkey_vk: 0,
            hotkey_mod: 0,
        }
    }
}

impl SettingsRecord {
    pub fn to_bytes(&self) -> [u8; RECORD_LEN] {
        let mut buf = [0u8; RECORD_LEN];
        buf[0..4].copy_from_slice(&self.interval_ms.to_le_bytes());
        buf[4] = u8::from(self.is_left_click);
        buf[5] = u8::from(self.fixed_position);
        buf[8..12].copy_from_slice(&self.x.to_le_bytes());
        buf[12..16].copy_from_slice(&self.y.to_le_bytes());
        buf[16..20].copy_from_slice(&self.theme_index.to_le_bytes());
        buf[20..24].copy_from_slice(&self.hotkey_vk.to_le_bytes());
        buf[24..28].copy_from_slice(&self.hotkey_mod.to_le_bytes());
        buf
    }

    /// Decode a record. Bytes present in `data` overwrite the defaults; a
    /// short buffer keeps defaults for the fields it does not reach and
    /// anything past [`RECORD_LEN`] is ignored.
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut buf = Self::default().to_bytes();
        let n = data.len().min(RECORD_LEN);
        buf[..n].copy_from_slice(&data[..n]);

        Self {
            interval_ms: read_i32(&buf, 0),
            is_left_click: buf[4] != 0,
            fixed_position: buf[5] != 0,
            x: read_i32(&buf, 8),
            y: read_i32(&buf, 12),
            theme_index: read_i32(&buf, 16),
            hotkey_vk: read_i32(&buf, 20),
            hotkey_mod: read_i32(&buf, 24),
        }
    }

    /// The engine-facing part of the record, interval clamped.
    pub fn click_settings(&self) -> ClickSettings {
        let kind = if self.is_left_click {
            ClickKind::Left
        } else {
            ClickKind::Right
        };
        let target = self
            .fixed_position
            .then(|| Point::new(self.x, self.y));
        ClickSettings::new(i64::from(self.interval_ms), kind, target)
    }

    /// Copy the engine-facing fields from `settings`, keeping theme and
    /// hotkey. Coordinates are kept when switching to current position.
    pub fn apply_click_settings(&mut self, settings: &ClickSettings) {
        self.interval_ms = i32::try_from(settings.interval_ms).unwrap_or(i32::MAX);
        self.is_left_click = settings.kind == ClickKind::Left;
        self.fixed_position = settings.target.is_some();
        if let Some(point) = settings.target {
            self.x = point.x;
            self.y = point.y;
        }
    }

    pub fn hotkey(&self) -> Option<HotkeyBinding> {
        HotkeyBinding::from_record(self.hotkey_vk, self.hotkey_mod)
    }

    pub fn set_hotkey(&mut self, binding: Option<HotkeyBinding>) {
        match binding {
            Some(binding) => {
                self.hotkey_vk = i32::from(binding.vk);
                self.hotkey_mod = i32::from(binding.modifiers.bits());
            }
            None => {
                self.hotkey_vk = 0;
                self.hotkey_mod = i32::from(HotkeyModifiers::default().bits());
            }
        }
    }
}

fn read_i32(buf: &[u8; RECORD_LEN], offset: usize) -> i32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[offset..offset + 4]);
    i32::from_le_bytes(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let record = SettingsRecord {
            interval_ms: 250,
            is_left_click: false,
            fixed_position: true,
            x: -10,
            y: 1080,
            theme_index: 7,
            hotkey_vk: 0x75,
            hotkey_mod: 0x03,
        };
        let bytes = record.to_bytes();

        assert_eq!(&bytes[0..4], &250i32.to_le_bytes());
        assert_eq!(bytes[4], 0);
        assert_eq!(bytes[5], 1);
        assert_eq!(&bytes[6..8], &[0, 0]);
        assert_eq!(&bytes[8..12], &(-10i32).to_le_bytes());
        assert_eq!(&bytes[12..16], &1080i32.to_le_bytes());
        assert_eq!(&bytes[16..20], &7i32.to_le_bytes());
        assert_eq!(&bytes[20..24], &0x75i32.to_le_bytes());
        assert_eq!(&bytes[24..28], &3i32.to_le_bytes());

        assert_eq!(SettingsRecord::from_bytes(&bytes), record);
    }

    #[test]
    fn test_short_input_keeps_default_tail() {
        let mut source = SettingsRecord::default();
        source.interval_ms = 40;
        source.is_left_click = false;
        source.theme_index = 3;

        // Only interval and the two flags survive the truncation.
        let record = SettingsRecord::from_bytes(&source.to_bytes()[..6]);
        assert_eq!(record.interval_ms, 40);
        assert!(!record.is_left_click);
        assert_eq!(record.theme_index, 0);

        assert_eq!(SettingsRecord::from_bytes(&[]), SettingsRecord::default());
    }

    #[test]
    fn test_long_input_is_truncated() {
        let mut data = SettingsRecord::default().to_bytes().to_vec();
        data.extend_from_slice(&[0xff; 16]);
        assert_eq!(SettingsRecord::from_bytes(&data), SettingsRecord::default());
    }

    #[test]
    fn test_click_settings_conversion() {
        let mut record = SettingsRecord {
            interval_ms: 0,
            is_left_click: false,
            fixed_position: true,
            x: 5,
            y: 6,
            ..SettingsRecord::default()
        };

        let settings = record.click_settings();
        assert_eq!(settings.interval_ms, 1);
        assert_eq!(settings.kind, ClickKind::Right);
        assert_eq!(settings.target, Some(Point::new(5, 6)));

        record.theme_index = 4;
        record.apply_click_settings(&ClickSettings::new(75, ClickKind::Left, None));
        assert_eq!(record.interval_ms, 75);
        assert!(record.is_left_click);
        assert!(!record.fixed_position);
        assert_eq!((record.x, record.y), (5, 6));
        assert_eq!(record.theme_index, 4);
    }

    #[test]
    fn test_hotkey_fields() {
        let mut record = SettingsRecord::default();
        assert_eq!(record.hotkey(), None);

        let binding: HotkeyBinding = "ctrl+shift+f6".parse().unwrap();
        record.set_hotkey(Some(binding));
        assert_eq!(record.hotkey_vk, 0x75);
        assert_eq!(record.hotkey_mod, 0x03);
        assert_eq!(record.hotkey(), Some(binding));

        record.set_hotkey(None);
        assert_eq!(record.hotkey(), None);
    }
}
