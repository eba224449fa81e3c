//! Scripted keyboard
//!
//! The simulator has no real keyboard: key presses come from the event
//! script and land in a shared [`KeyState`]. The [`Keyboard`] IO device
//! samples that state on every update, one port per player.

use std::sync::atomic::{AtomicU32, Ordering};

use ferrule_core::device::{
    Capabilities, Code, CommandName, CommandResult, Device, Direction, IoDevice, Port, Space,
    Value, Variant,
};
use ferrule_core::mio::{DriverId, Mio};
use ferrule_core::Ticks;
use serde::Deserialize;

/// Description the keyboard driver reports; rigs look it up by this name
pub const KEYBOARD_NAME: &str = "keyboard";

/// Player one keys plus the MAIN buttons
pub const PLAYER_ONE: Port = 0;
/// Player two keys
pub const PLAYER_TWO: Port = 1;

const PORTS: usize = 2;

/// Keyboard keys, in driver line order
///
/// The first twelve follow the gamepad line order so a pad profile can be
/// mapped one to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Key {
    Right,
    Left,
    Down,
    Up,
    Start,
    Select,
    A,
    B,
    C,
    X,
    Y,
    Z,
    MainA,
    MainB,
    MainC,
    MainD,
}

impl Key {
    pub const ALL: [Key; 16] = [
        Key::Right,
        Key::Left,
        Key::Down,
        Key::Up,
        Key::Start,
        Key::Select,
        Key::A,
        Key::B,
        Key::C,
        Key::X,
        Key::Y,
        Key::Z,
        Key::MainA,
        Key::MainB,
        Key::MainC,
        Key::MainD,
    ];

    /// Line of the first MAIN button
    pub const MAIN_BASE: Code = Key::MainA as Code;

    pub fn code(self) -> Code {
        self as Code
    }

    /// Label printed in mapping summaries
    pub fn label(self) -> &'static str {
        match self {
            Key::Right => "kbd right",
            Key::Left => "kbd left",
            Key::Down => "kbd down",
            Key::Up => "kbd up",
            Key::Start => "kbd enter",
            Key::Select => "kbd space",
            Key::A => "kbd a",
            Key::B => "kbd s",
            Key::C => "kbd d",
            Key::X => "kbd q",
            Key::Y => "kbd w",
            Key::Z => "kbd e",
            Key::MainA => "kbd f1",
            Key::MainB => "kbd f2",
            Key::MainC => "kbd f3",
            Key::MainD => "kbd f4",
        }
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Live key state, written by the script runner and sampled by the device
#[derive(Debug, Default)]
pub struct KeyState {
    ports: [AtomicU32; PORTS],
}

impl KeyState {
    pub const fn new() -> Self {
        Self {
            ports: [AtomicU32::new(0), AtomicU32::new(0)],
        }
    }

    pub fn set(&self, port: Port, key: Key, pressed: bool) {
        let lines = &self.ports[port as usize];
        if pressed {
            lines.fetch_or(key.bit(), Ordering::Relaxed);
        } else {
            lines.fetch_and(!key.bit(), Ordering::Relaxed);
        }
    }

    pub fn mask(&self, port: Port) -> u32 {
        self.ports[port as usize].load(Ordering::Relaxed)
    }

    pub fn release_all(&self) {
        for lines in &self.ports {
            lines.store(0, Ordering::Relaxed);
        }
    }
}

/// Keyboard IO device
///
/// Commands: `x|release` drops every held key, `g|pressed` reads the raw
/// line mask of player one.
pub struct Keyboard<'k> {
    keys: &'k KeyState,
    sampled: [u32; PORTS],
}

impl<'k> Keyboard<'k> {
    pub const UPDATE_PERIOD: Ticks = 10;

    pub fn new(keys: &'k KeyState) -> Self {
        Self {
            keys,
            sampled: [0; PORTS],
        }
    }
}

impl Device for Keyboard<'_> {
    fn description(&self) -> &'static str {
        KEYBOARD_NAME
    }

    fn command(&mut self, name: &CommandName<'_>, value: &mut Variant) -> CommandResult {
        if *name == "x|release" {
            self.keys.release_all();
            CommandResult::Ok
        } else if *name == "g|pressed" {
            *value = Variant::Uint(self.keys.mask(PLAYER_ONE));
            CommandResult::Ok
        } else {
            CommandResult::NotHandled
        }
    }
}

impl IoDevice for Keyboard<'_> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new(PORTS as Port).with_inputs(Space::Bit, Key::ALL.len() as Code)
    }

    fn update_period(&self) -> Ticks {
        Self::UPDATE_PERIOD
    }

    fn update(&mut self) {
        for port in 0..PORTS {
            self.sampled[port] = self.keys.mask(port as Port);
        }
    }

    fn get_input(&mut self, _space: Space, code: Code, port: Port) -> Value {
        (self.sampled[port as usize] >> code) & 1
    }

    fn input_name(&self, _space: Space, code: Code) -> &'static str {
        Key::ALL[code as usize].label()
    }
}

/// Driver id of the keyboard, found through the input gateways
pub fn find_driver(mio: &Mio<'_>) -> Option<DriverId> {
    mio.gateways(Direction::Input)
        .map(|(_, gateway)| gateway.driver)
        .find(|&driver| mio.driver(driver).description() == KEYBOARD_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ferrule_core::device::command::dispatch;

    #[test]
    fn test_key_order_matches_pad_lines() {
        use ferrule_core::mio::{Gp1Bit, MainBit, ProfileLine};

        assert_eq!(Key::A.code(), Gp1Bit::A.code());
        assert_eq!(Key::Z.code(), Gp1Bit::Z.code());
        assert_eq!(Key::MAIN_BASE + MainBit::C.code(), Key::MainC.code());
    }

    #[test]
    fn test_presses_visible_after_update() {
        let keys = KeyState::new();
        let mut keyboard = Keyboard::new(&keys);

        keys.set(PLAYER_TWO, Key::Up, true);
        assert_eq!(keyboard.get_input(Space::Bit, Key::Up.code(), PLAYER_TWO), 0);
        keyboard.update();
        assert_eq!(keyboard.get_input(Space::Bit, Key::Up.code(), PLAYER_TWO), 1);
        assert_eq!(keyboard.get_input(Space::Bit, Key::Up.code(), PLAYER_ONE), 0);
        assert_eq!(keyboard.first_active_input(Space::Bit, PLAYER_TWO), Some(Key::Up.code()));

        keys.set(PLAYER_TWO, Key::Up, false);
        keyboard.update();
        assert_eq!(keyboard.get_input(Space::Bit, Key::Up.code(), PLAYER_TWO), 0);
    }

    #[test]
    fn test_commands() {
        let keys = KeyState::new();
        let mut keyboard = Keyboard::new(&keys);
        keys.set(PLAYER_ONE, Key::B, true);
        keys.set(PLAYER_ONE, Key::MainA, true);

        let mut value = Variant::None;
        assert_eq!(dispatch(&mut keyboard, "g|pressed", &mut value), Ok(CommandResult::Ok));
        assert_eq!(value, Variant::Uint(Key::B.bit() | Key::MainA.bit()));

        assert_eq!(dispatch(&mut keyboard, "x|release", &mut value), Ok(CommandResult::Ok));
        assert_eq!(keys.mask(PLAYER_ONE), 0);
        assert_eq!(
            dispatch(&mut keyboard, "s|speed", &mut value),
            Ok(CommandResult::NotHandled)
        );
    }
}
