//! Toggle hotkey model.
//!
//! Keys are identified by Windows virtual-key codes and modifiers by the
//! hotkey-control flag bits, since that is what `settings.dat` stores.
//! Platform listeners translate their own key types into these codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MOD_SHIFT: u8 = 0x01;
pub const MOD_CONTROL: u8 = 0x02;
pub const MOD_ALT: u8 = 0x04;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HotkeyParseError {
    #[error("empty hotkey")]
    Empty,
    #[error("unknown key: {0}")]
    UnknownKey(String),
    #[error("hotkey has no main key")]
    MissingKey,
    #[error("hotkey has more than one main key")]
    MultipleKeys,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotkeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl HotkeyModifiers {
    /// Unknown bits are ignored.
    pub fn from_bits(bits: u8) -> Self {
        Self {
            shift: bits & MOD_SHIFT != 0,
            ctrl: bits & MOD_CONTROL != 0,
            alt: bits & MOD_ALT != 0,
        }
    }

    pub fn bits(&self) -> u8 {
        let mut bits = 0;
        if self.shift {
            bits |= MOD_SHIFT;
        }
        if self.ctrl {
            bits |= MOD_CONTROL;
        }
        if self.alt {
            bits |= MOD_ALT;
        }
        bits
    }
}

/// A key plus the modifiers that must be held with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HotkeyBinding {
    /// Virtual-key code, never 0.
    pub vk: u8,
    pub modifiers: HotkeyModifiers,
}

impl HotkeyBinding {
    pub fn new(vk: u8, modifiers: HotkeyModifiers) -> Option<Self> {
        (vk != 0).then_some(Self { vk, modifiers })
    }

    /// Build from the raw record fields. `vk == 0` means no hotkey.
    pub fn from_record(vk: i32, modifiers: i32) -> Option<Self> {
        let vk = u8::try_from(vk).ok()?;
        let bits = u8::try_from(modifiers & 0xff).unwrap_or(0);
        Self::new(vk, HotkeyModifiers::from_bits(bits))
    }

    /// True when `vk` pressed with `held` modifiers triggers this binding.
    pub fn matches(&self, vk: u8, held: HotkeyModifiers) -> bool {
        self.vk == vk && self.modifiers == held
    }
}

impl fmt::Display for HotkeyBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            f.write_str("Ctrl + ")?;
        }
        if self.modifiers.shift {
            f.write_str("Shift + ")?;
        }
        if self.modifiers.alt {
            f.write_str("Alt + ")?;
        }
        match key_name(self.vk) {
            Some(name) => f.write_str(&name),
            None => write!(f, "Key {:#04x}", self.vk),
        }
    }
}

impl FromStr for HotkeyBinding {
    type Err = HotkeyParseError;

    /// Parse `"ctrl+shift+f6"` style strings (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(HotkeyParseError::Empty);
        }

        let mut modifiers = HotkeyModifiers::default();
        let mut vk = None;

        for part in s.split('+').map(str::trim) {
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "shift" => modifiers.shift = true,
                "alt" => modifiers.alt = true,
                "" => return Err(HotkeyParseError::MissingKey),
                name => {
                    let code = key_from_name(name)
                        .ok_or_else(|| HotkeyParseError::UnknownKey(part.to_string()))?;
                    if vk.replace(code).is_some() {
                        return Err(HotkeyParseError::MultipleKeys);
                    }
                }
            }
        }

        let vk = vk.ok_or(HotkeyParseError::MissingKey)?;
        Ok(Self { vk, modifiers })
    }
}

/// Display name for a virtual-key code.
pub fn key_name(vk: u8) -> Option<String> {
    let name = match vk {
        0x41..=0x5a | 0x30..=0x39 => return Some(char::from(vk).to_string()),
        0x70..=0x87 => return Some(format!("F{}", vk - 0x6f)),
        0x08 => "Backspace",
        0x09 => "Tab",
        0x0d => "Enter",
        0x13 => "Pause",
        0x1b => "Escape",
        0x20 => "Space",
        0x21 => "PageUp",
        0x22 => "PageDown",
        0x23 => "End",
        0x24 => "Home",
        0x25 => "Left",
        0x26 => "Up",
        0x27 => "Right",
        0x28 => "Down",
        0x2d => "Insert",
        0x2e => "Delete",
        _ => return None,
    };
    Some(name.to_string())
}

/// Virtual-key code for a lowercase key name.
pub fn key_from_name(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return match c.to_ascii_uppercase() {
            c @ ('A'..='Z' | '0'..='9') => Some(c as u8),
            _ => None,
        };
    }

    if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        return (1..=24).contains(&n).then(|| 0x6f + n);
    }

    let vk = match name {
        "backspace" => 0x08,
        "tab" => 0x09,
        "enter" | "return" => 0x0d,
        "pause" => 0x13,
        "escape" | "esc" => 0x1b,
        "space" => 0x20,
        "pageup" | "pgup" => 0x21,
        "pagedown" | "pgdn" => 0x22,
        "end" => 0x23,
        "home" => 0x24,
        "left" => 0x25,
        "up" => 0x26,
        "right" => 0x27,
        "down" => 0x28,
        "insert" | "ins" => 0x2d,
        "delete" | "del" => 0x2e,
        _ => return None,
    };
    Some(vk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hotkey() {
        let binding: HotkeyBinding = "Ctrl+Shift+F6".parse().unwrap();
        assert_eq!(binding.vk, 0x75);
        assert!(binding.modifiers.ctrl && binding.modifiers.shift && !binding.modifiers.alt);

        let binding: HotkeyBinding = "alt + q".parse().unwrap();
        assert_eq!(binding.vk, b'Q');
        assert_eq!(binding.modifiers.bits(), MOD_ALT);

        let binding: HotkeyBinding = "F24".parse().unwrap();
        assert_eq!(binding.vk, 0x87);
    }

    #[test]
    fn test_parse_hotkey_errors() {
        assert_eq!("".parse::<HotkeyBinding>(), Err(HotkeyParseError::Empty));
        assert_eq!("ctrl+shift".parse::<HotkeyBinding>(), Err(HotkeyParseError::MissingKey));
        assert_eq!("ctrl+".parse::<HotkeyBinding>(), Err(HotkeyParseError::MissingKey));
        assert_eq!("a+b".parse::<HotkeyBinding>(), Err(HotkeyParseError::MultipleKeys));
        assert_eq!(
            "ctrl+f25".parse::<HotkeyBinding>(),
            Err(HotkeyParseError::UnknownKey("f25".into()))
        );
    }

    #[test]
    fn test_display_matches_modifier_order() {
        let binding: HotkeyBinding = "alt+shift+ctrl+space".parse().unwrap();
        assert_eq!(binding.to_string(), "Ctrl + Shift + Alt + Space");

        let binding = HotkeyBinding::new(0x75, HotkeyModifiers::default()).unwrap();
        assert_eq!(binding.to_string(), "F6");

        let binding = HotkeyBinding::new(0xba, HotkeyModifiers::default()).unwrap();
        assert_eq!(binding.to_string(), "Key 0xba");
    }

    #[test]
    fn test_from_record() {
        assert_eq!(HotkeyBinding::from_record(0, 2), None);
        assert_eq!(HotkeyBinding::from_record(-1, 0), None);
        assert_eq!(HotkeyBinding::from_record(300, 0), None);

        let binding = HotkeyBinding::from_record(0x77, 0x06).unwrap();
        assert!(binding.modifiers.ctrl && binding.modifiers.alt && !binding.modifiers.shift);
        assert!(binding.matches(0x77, HotkeyModifiers { shift: false, ctrl: true, alt: true }));
        assert!(!binding.matches(0x77, HotkeyModifiers::default()));
    }

    #[test]
    fn test_key_names_round_trip() {
        for vk in 0u8..=255 {
            if let Some(name) = key_name(vk) {
                assert_eq!(key_from_name(&name.to_ascii_lowercase()), Some(vk), "{}", name);
            }
        }
    }
}
