use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

fn default_enabled() -> bool {
    true
}

fn default_chord() -> String {
    "alt+shift+d".to_string()
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct HotkeyConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_chord")]
    pub chord: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            chord: default_chord(),
        }
    }
}

impl HotkeyConfig {
    pub fn parsed(&self) -> Result<HotkeyChord, ChordError> {
        self.chord.parse()
    }
}

/// A parsed chord like "ctrl+shift+p". Exactly one non-modifier key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyChord {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
    pub key: String,
}

impl Default for HotkeyChord {
    /// The parsed form of [`default_chord`].
    fn default() -> Self {
        Self {
            ctrl: false,
            alt: true,
            shift: true,
            meta: false,
            key: "d".to_string(),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChordError {
    #[error("empty hotkey chord")]
    Empty,
    #[error("chord {0:?} has no non-modifier key")]
    MissingKey(String),
    #[error("unrecognized token {0:?} in hotkey chord")]
    UnknownToken(String),
    #[error("chord has more than one key, second was {0:?}")]
    ExtraKey(String),
}

impl FromStr for HotkeyChord {
    type Err = ChordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ChordError::Empty);
        }
        let mut chord = HotkeyChord {
            ctrl: false,
            alt: false,
            shift: false,
            meta: false,
            key: String::new(),
        };
        for part in trimmed.split('+') {
            let token = part.trim().to_ascii_lowercase();
            match token.as_str() {
                "ctrl" | "control" => chord.ctrl = true,
                "alt" => chord.alt = true,
                "shift" => chord.shift = true,
                "meta" | "super" | "cmd" | "win" => chord.meta = true,
                _ => {
                    if !is_key_token(&token) {
                        return Err(ChordError::UnknownToken(part.trim().to_string()));
                    }
                    if !chord.key.is_empty() {
                        return Err(ChordError::ExtraKey(token));
                    }
                    chord.key = token;
                }
            }
        }
        if chord.key.is_empty() {
            return Err(ChordError::MissingKey(trimmed.to_string()));
        }
        Ok(chord)
    }
}

impl fmt::Display for HotkeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        if self.meta {
            f.write_str("meta+")?;
        }
        f.write_str(&self.key)
    }
}

fn is_key_token(token: &str) -> bool {
    let mut chars = token.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return c.is_ascii_alphanumeric();
    }
    matches!(
        token,
        "space"
            | "enter"
            | "tab"
            | "escape"
            | "esc"
            | "backspace"
            | "delete"
            | "insert"
            | "home"
            | "end"
            | "pageup"
            | "pagedown"
            | "up"
            | "down"
            | "left"
            | "right"
            | "printscreen"
            | "f1"
            | "f2"
            | "f3"
            | "f4"
            | "f5"
            | "f6"
            | "f7"
            | "f8"
            | "f9"
            | "f10"
            | "f11"
            | "f12"
    )
}
