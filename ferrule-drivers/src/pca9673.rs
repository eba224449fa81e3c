//! Dual Genesis/MegaDrive gamepads on a PCA9673 I2C expander
//!
//! Each gamepad connector uses one 8-bit expander port: six data lines
//! driven by the pad, the TH select line driven by us, and a presence LED.
//! A full read takes six write/read transactions per update.
//!
//! # Select cycle
//!
//! Buttons are active-low. TH toggles each transaction; the pad reports a
//! different button set on each edge:
//!
//! ```text
//! state   0      1      2      3      4      5
//! TH      1      0      1      0      1      0
//! TR      C      Start  C      Start  C      Start
//! TL      B      A      B      A      B      A
//! D3      Right  0      Right  0      Mode   -
//! D2      Left   0      Left   0      X      -
//! D1      Down   Down   Down   0      Y      -
//! D0      Up     Up     Up     0      Z      -
//! ```
//!
//! D3 = D2 = 0 in state 1 means a pad is connected. D1 = D0 = 0 in state 3
//! means it is a 6-button pad, and state 4 carries its extra buttons.

use embedded_hal::i2c::{ErrorKind, I2c};
use ferrule_core::device::{Capabilities, Code, Device, IoDevice, Port, Space, Value};
use ferrule_core::Ticks;

/// Port bit masks for one connector
struct Pins {
    th: u8,
    tr: u8,
    tl: u8,
    d3: u8,
    d2: u8,
    d1: u8,
    d0: u8,
    ok: u8,
}

const PAD1: Pins = Pins {
    th: 0x10,
    tr: 0x80,
    tl: 0x04,
    d3: 0x40,
    d2: 0x20,
    d1: 0x08,
    d0: 0x02,
    ok: 0x01,
};

const PAD2: Pins = Pins {
    th: 0x08,
    tr: 0x40,
    tl: 0x02,
    d3: 0x20,
    d2: 0x10,
    d1: 0x04,
    d0: 0x01,
    ok: 0x80,
};

/// Gamepad button codes
pub mod button {
    use ferrule_core::device::Code;

    pub const RIGHT: Code = 0;
    pub const LEFT: Code = 1;
    pub const DOWN: Code = 2;
    pub const UP: Code = 3;
    pub const START: Code = 4;
    pub const A: Code = 5;
    pub const B: Code = 6;
    pub const C: Code = 7;
    pub const MODE: Code = 8;
    pub const X: Code = 9;
    pub const Y: Code = 10;
    pub const Z: Code = 11;

    /// Buttons on a 3-button pad
    pub const COUNT_3: Code = MODE;
    /// Buttons on a 6-button pad
    pub const COUNT_6: Code = 12;
}

const BUTTON_NAMES: [&str; button::COUNT_6 as usize] = [
    "→", "←", "↓", "↑", "start", "a", "b", "c", "mode", "x", "y", "z",
];

const STATES: u8 = 6;

/// Outcome of the last bus transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pca9673Status {
    /// Never talked to the expander
    Idle,
    Ok,
    /// The expander did not acknowledge its address
    Nack,
    /// Any other bus failure
    Bus,
}

impl Pca9673Status {
    fn from_error<E: embedded_hal::i2c::Error>(e: &E) -> Self {
        match e.kind() {
            ErrorKind::NoAcknowledge(_) => Pca9673Status::Nack,
            _ => Pca9673Status::Bus,
        }
    }
}

pub struct Pca9673Gamepads<I2C> {
    i2c: I2C,
    address: u8,
    /// Pressed buttons, one bit per code
    pressed: [u16; 2],
    /// Buttons available per port: 0, 8 or 12
    available: [Code; 2],
    status: Pca9673Status,
    errors: u32,
}

impl<I2C: I2c> Pca9673Gamepads<I2C> {
    /// One full read per frame
    pub const UPDATE_PERIOD: Ticks = 15;

    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            pressed: [0; 2],
            available: [0; 2],
            status: Pca9673Status::Idle,
            errors: 0,
        }
    }

    /// Configure the expander: data lines as inputs, TH low
    ///
    /// A missing expander is reported as an error, the board decides
    /// whether that is fatal.
    pub fn init(&mut self) -> Result<(), I2C::Error> {
        let tx = [0xFF & !PAD1.th, 0xFF & !PAD2.th];
        let result = self.i2c.write(self.address, &tx);
        self.record(&result);
        result
    }

    pub fn status(&self) -> Pca9673Status {
        self.status
    }

    /// Failed transactions since start
    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn release(self) -> I2C {
        self.i2c
    }

    fn record<T>(&mut self, result: &Result<T, I2C::Error>) {
        match result {
            Ok(_) => self.status = Pca9673Status::Ok,
            Err(e) => {
                self.status = Pca9673Status::from_error(e);
                self.errors = self.errors.wrapping_add(1);
            }
        }
    }

    fn transfer(&mut self, state: u8) -> Option<[u8; 2]> {
        // odd states drive TH low
        let mut tx = [0xFF, 0xFF];
        if state % 2 == 1 {
            tx[0] &= !PAD1.th;
            tx[1] &= !PAD2.th;
        }
        // presence LED on (low) for detected pads
        if self.available[0] > 0 {
            tx[0] &= !PAD1.ok;
        }
        if self.available[1] > 0 {
            tx[1] &= !PAD2.ok;
        }

        let mut rx = [0u8; 2];
        let result = self.i2c.write_read(self.address, &tx, &mut rx);
        self.record(&result);
        result.ok().map(|_| rx)
    }

    fn decode(&mut self, state: u8, rx: [u8; 2]) {
        for (port, pins) in [PAD1, PAD2].iter().enumerate() {
            let raw = rx[port];
            // active-low
            let low = |mask: u8, code: Code| -> u16 {
                if raw & mask == 0 {
                    1 << code
                } else {
                    0
                }
            };

            match state {
                0 => self.pressed[port] = 0,
                1 => {
                    self.pressed[port] |= low(pins.tr, button::START)
                        | low(pins.tl, button::A)
                        | low(pins.d1, button::DOWN)
                        | low(pins.d0, button::UP);
                    let present = raw & (pins.d3 | pins.d2) == 0;
                    self.available[port] = if present { button::COUNT_3 } else { 0 };
                }
                2 => {
                    self.pressed[port] |= low(pins.tr, button::C)
                        | low(pins.tl, button::B)
                        | low(pins.d3, button::RIGHT)
                        | low(pins.d2, button::LEFT)
                        | low(pins.d1, button::DOWN)
                        | low(pins.d0, button::UP);
                }
                3 => {
                    if self.available[port] > 0 && raw & (pins.d1 | pins.d0) == 0 {
                        self.available[port] = button::COUNT_6;
                    }
                }
                4 => {
                    if self.available[port] == button::COUNT_6 {
                        self.pressed[port] |= low(pins.d3, button::MODE)
                            | low(pins.d2, button::X)
                            | low(pins.d1, button::Y)
                            | low(pins.d0, button::Z);
                    }
                }
                // TH back low to end the cycle
                _ => {}
            }
        }
    }
}

impl<I2C: I2c> Device for Pca9673Gamepads<I2C> {
    fn description(&self) -> &'static str {
        "dual genesis on pca9673"
    }
}

impl<I2C: I2c> IoDevice for Pca9673Gamepads<I2C> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new(2).with_inputs(Space::Bit, button::COUNT_6)
    }

    fn update_period(&self) -> Ticks {
        Self::UPDATE_PERIOD
    }

    fn update(&mut self) {
        for state in 0..STATES {
            match self.transfer(state) {
                Some(rx) => self.decode(state, rx),
                // keep what was decoded so far
                None => break,
            }
        }
    }

    fn available_inputs(&self, space: Space, port: Port) -> Code {
        match space {
            Space::Bit => self.available[port as usize],
            // no analog lines on these pads
            Space::Range => 0,
        }
    }

    fn get_input(&mut self, _space: Space, code: Code, port: Port) -> Value {
        ((self.pressed[port as usize] >> code) & 1) as Value
    }

    fn input_name(&self, _space: Space, code: Code) -> &'static str {
        BUTTON_NAMES[code as usize]
    }
}
