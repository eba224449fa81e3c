//! Input script
//!
//! A TOML file replaying key presses and device commands at fixed frames:
//!
//! ```toml
//! [[key]]
//! frame = 10
//! key = "a"
//! pressed = true
//!
//! [[key]]
//! frame = 40
//! key = "up"
//! pressed = true
//! player = 2
//!
//! [[command]]
//! frame = 90
//! name = "x|release"
//! ```
//!
//! Events are applied in frame order; events sharing a frame keep file
//! order.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use ferrule_core::device::{Port, Variant};
use serde::Deserialize;

use crate::keyboard::{Key, PLAYER_ONE, PLAYER_TWO};

/// Script loading errors
#[derive(Debug)]
pub enum ConfigError {
    /// Reading the file failed
    Io(io::Error),
    /// The file is not valid TOML or does not match the script layout
    Toml(toml::de::Error),
    /// A key event names a player other than 1 or 2
    Player { frame: u32, player: u8 },
}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Toml(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "cannot read script: {}", e),
            ConfigError::Toml(e) => write!(f, "invalid script: {}", e),
            ConfigError::Player { frame, player } => {
                write!(f, "frame {}: no player {} (expected 1 or 2)", frame, player)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Toml(e) => Some(e),
            ConfigError::Player { .. } => None,
        }
    }
}

fn player_one() -> u8 {
    1
}

/// A key going down or up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct KeyEvent {
    pub frame: u32,
    pub key: Key,
    pub pressed: bool,
    /// 1 or 2
    #[serde(default = "player_one")]
    pub player: u8,
}

impl KeyEvent {
    /// Keyboard port the event lands on
    pub fn port(&self) -> Port {
        if self.player == 2 {
            PLAYER_TWO
        } else {
            PLAYER_ONE
        }
    }
}

/// A device command sent to the keyboard driver
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CommandEvent {
    pub frame: u32,
    pub name: String,
    #[serde(default)]
    pub value: Variant,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Script {
    #[serde(default, rename = "key")]
    pub keys: Vec<KeyEvent>,
    #[serde(default, rename = "command")]
    pub commands: Vec<CommandEvent>,
}

impl Script {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut script: Script = toml::from_str(text)?;
        if let Some(bad) = script.keys.iter().find(|e| e.player != 1 && e.player != 2) {
            return Err(ConfigError::Player {
                frame: bad.frame,
                player: bad.player,
            });
        }
        // stable: same-frame events keep file order
        script.keys.sort_by_key(|e| e.frame);
        script.commands.sort_by_key(|e| e.frame);
        Ok(script)
    }

    /// Key events scheduled for `frame`
    pub fn keys_at(&self, frame: u32) -> impl Iterator<Item = &KeyEvent> + '_ {
        self.keys.iter().filter(move |e| e.frame == frame)
    }

    /// Commands scheduled for `frame`
    pub fn commands_at(&self, frame: u32) -> impl Iterator<Item = &CommandEvent> + '_ {
        self.commands.iter().filter(move |e| e.frame == frame)
    }

    /// Last frame with an event, if any
    pub fn last_frame(&self) -> Option<u32> {
        let keys = self.keys.last().map(|e| e.frame);
        let commands = self.commands.last().map(|e| e.frame);
        keys.max(commands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_by_frame() {
        let script = Script::parse(
            r#"
            [[key]]
            frame = 30
            key = "main_b"
            pressed = true

            [[key]]
            frame = 5
            key = "a"
            pressed = true
            player = 2

            [[key]]
            frame = 30
            key = "a"
            pressed = false
            "#,
        )
        .unwrap();

        let frames: Vec<u32> = script.keys.iter().map(|e| e.frame).collect();
        assert_eq!(frames, [5, 30, 30]);
        assert_eq!(script.keys[0].port(), PLAYER_TWO);
        assert_eq!(script.keys[1].key, Key::MainB);
        assert_eq!(script.keys[2].key, Key::A);
        assert_eq!(script.keys_at(30).count(), 2);
        assert_eq!(script.last_frame(), Some(30));
    }

    #[test]
    fn test_commands_with_values() {
        let script = Script::parse(
            r#"
            [[command]]
            frame = 12
            name = "x|release"

            [[command]]
            frame = 3
            name = "s|speed"
            value = { Uint = 9600 }
            "#,
        )
        .unwrap();

        assert!(script.keys.is_empty());
        assert_eq!(script.commands[0].value, Variant::Uint(9600));
        assert_eq!(script.commands[1].value, Variant::None);
        assert_eq!(script.commands_at(12).count(), 1);
    }

    #[test]
    fn test_rejects_bad_input() {
        let err = Script::parse("[[key]]\nframe = 1\nkey = \"a\"\npressed = true\nplayer = 3\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Player { frame: 1, player: 3 }));

        let err = Script::parse("[[key]]\nframe = 1\nkey = \"escape\"\npressed = true\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));

        assert_eq!(Script::parse("").unwrap().last_frame(), None);
    }
}
