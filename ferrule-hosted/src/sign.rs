//! Status sign lamps printed as text
//!
//! Four Bit outputs in SIGN order. Lamp changes are written to the sink
//! (stdout in the binary) when the device updates, one line per change.

use std::io::Write;

use ferrule_core::device::{Capabilities, Code, Device, IoDevice, Port, Space, Value};

const LAMPS: [&str; 4] = ["warning", "red", "green", "blue"];

pub struct SignLamps<W> {
    out: W,
    pending: [bool; 4],
    shown: [bool; 4],
}

impl<W: Write> SignLamps<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            pending: [false; 4],
            shown: [false; 4],
        }
    }

    pub fn is_lit(&self, code: Code) -> bool {
        self.shown[code as usize]
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Device for SignLamps<W> {
    fn description(&self) -> &'static str {
        "sign lamps"
    }
}

impl<W: Write> IoDevice for SignLamps<W> {
    fn capabilities(&self) -> Capabilities {
        Capabilities::new(1).with_outputs(Space::Bit, LAMPS.len() as Code)
    }

    fn update(&mut self) {
        for (code, name) in LAMPS.iter().enumerate() {
            let lit = self.pending[code];
            if lit == self.shown[code] {
                continue;
            }
            self.shown[code] = lit;
            // a closed stdout must not stop the frame loop
            let _ = writeln!(self.out, "sign: {} {}", name, if lit { "on" } else { "off" });
        }
    }

    fn set_output(&mut self, _space: Space, code: Code, _port: Port, value: Value) {
        self.pending[code as usize] = value != 0;
    }

    fn output_name(&self, _space: Space, code: Code) -> &'static str {
        LAMPS[code as usize]
    }
}
