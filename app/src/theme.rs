//! Cosmetic themes. Only the index is persisted; rendering is up to the front end.

use std::fmt;

pub const THEME_COUNT: i32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Default,
    Dark,
    Matrix,
    Blueprint,
    Sunset,
    Space,
}

impl Theme {
    /// Any stored index maps onto a theme, wrapping both ways.
    pub fn from_index(index: i32) -> Self {
        match index.rem_euclid(THEME_COUNT) {
            0 => Theme::Default,
            1 => Theme::Dark,
            2 => Theme::Matrix,
            3 => Theme::Blueprint,
            4 => Theme::Sunset,
            _ => Theme::Space,
        }
    }

    /// Whether the theme has a moving background.
    pub fn is_animated(&self) -> bool {
        matches!(self, Theme::Matrix | Theme::Space)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Theme::Default => "Default",
            Theme::Dark => "Dark",
            Theme::Matrix => "Matrix",
            Theme::Blueprint => "Blueprint",
            Theme::Sunset => "Sunset",
            Theme::Space => "Space",
        };
        f.write_str(name)
    }
}

/// Index of the theme after `index`, kept within `0..THEME_COUNT`.
pub fn next_index(index: i32) -> i32 {
    (index.rem_euclid(THEME_COUNT) + 1) % THEME_COUNT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_wraps() {
        assert_eq!(Theme::from_index(0), Theme::Default);
        assert_eq!(Theme::from_index(5), Theme::Space);
        assert_eq!(Theme::from_index(8), Theme::Matrix);
        assert_eq!(Theme::from_index(-1), Theme::Space);
    }

    #[test]
    fn test_next_index_cycles() {
        assert_eq!(next_index(0), 1);
        assert_eq!(next_index(5), 0);
        assert_eq!(next_index(13), 2);
        assert!(Theme::from_index(next_index(1)).is_animated());
    }
}
