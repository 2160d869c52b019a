//! Key combinations such as `ctrl+shift+i` or `win+up`.

use crate::errors::DriverError;
use std::fmt;
use std::str::FromStr;

/// A single key that can appear in a combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    // Modifiers
    Ctrl,
    Alt,
    Shift,
    Win,

    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    Space,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
    /// F1-F24
    F(u8),
    /// Printable character, lowercase for letters
    Char(char),
}

impl Key {
    pub fn is_modifier(&self) -> bool {
        matches!(self, Key::Ctrl | Key::Alt | Key::Shift | Key::Win)
    }

    fn name(&self) -> String {
        match self {
            Key::Ctrl => "ctrl".into(),
            Key::Alt => "alt".into(),
            Key::Shift => "shift".into(),
            Key::Win => "win".into(),
            Key::Enter => "enter".into(),
            Key::Tab => "tab".into(),
            Key::Escape => "escape".into(),
            Key::Backspace => "backspace".into(),
            Key::Delete => "delete".into(),
            Key::Space => "space".into(),
            Key::Home => "home".into(),
            Key::End => "end".into(),
            Key::PageUp => "pageup".into(),
            Key::PageDown => "pagedown".into(),
            Key::Up => "up".into(),
            Key::Down => "down".into(),
            Key::Left => "left".into(),
            Key::Right => "right".into(),
            Key::F(n) => format!("f{n}"),
            Key::Char(c) => c.to_string(),
        }
    }
}

/// Keys pressed together: held in order, released in reverse order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    keys: Vec<Key>,
}

impl KeyCombo {
    pub fn new(keys: Vec<Key>) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    pub fn single(key: Key) -> Self {
        Self { keys: vec![key] }
    }
}

impl FromStr for KeyCombo {
    type Err = DriverError;

    /// Accepts `ctrl+shift+t`, `Alt+F4`, `win+up`, `ctrl+shift+\``.
    ///
    /// A printable character is only valid as the last part.
    fn from_str(combo: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = combo.split('+').collect();
        let mut keys = Vec::with_capacity(parts.len());

        for (i, part) in parts.iter().enumerate() {
            let lower = part.trim().to_lowercase();
            let is_last = i == parts.len() - 1;

            let key = match lower.as_str() {
                "control" | "ctrl" => Key::Ctrl,
                "alt" => Key::Alt,
                "shift" => Key::Shift,
                "meta" | "cmd" | "command" | "win" | "windows" | "super" => Key::Win,

                "enter" | "return" => Key::Enter,
                "tab" => Key::Tab,
                "escape" | "esc" => Key::Escape,
                "backspace" | "back" => Key::Backspace,
                "delete" | "del" => Key::Delete,
                "space" => Key::Space,
                "home" => Key::Home,
                "end" => Key::End,
                "pageup" | "page_up" | "pgup" => Key::PageUp,
                "pagedown" | "page_down" | "pgdn" => Key::PageDown,

                "up" | "arrowup" => Key::Up,
                "down" | "arrowdown" => Key::Down,
                "left" | "arrowleft" => Key::Left,
                "right" | "arrowright" => Key::Right,

                s if s.starts_with('f') && s.len() >= 2 && s.len() <= 3 => {
                    match s[1..].parse::<u8>() {
                        Ok(n) if (1..=24).contains(&n) => Key::F(n),
                        _ => {
                            return Err(DriverError::InvalidKey(format!(
                                "invalid function key '{part}' in '{combo}', use f1-f24"
                            )))
                        }
                    }
                }

                other => {
                    let mut chars = other.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) if is_last => Key::Char(c),
                        _ => {
                            return Err(DriverError::InvalidKey(format!(
                                "unknown key '{other}' in '{combo}'"
                            )));
                        }
                    }
                }
            };

            keys.push(key);
        }

        Ok(Self { keys })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.keys.iter().map(Key::name).collect();
        write!(f, "{}", names.join("+"))
    }
}
