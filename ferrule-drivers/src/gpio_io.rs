//! GPIO buttons and LEDs
//!
//! Exposes a fixed set of input pins as Bit inputs and a fixed set of
//! output pins as Bit outputs on a single port. Evaluation boards use this
//! for their on-board push buttons and LEDs.

use ferrule_core::device::{Capabilities, Code, Device, IoDevice, Port, Space, Value};
use ferrule_core::Ticks;
use ferrule_hal::gpio::{InputPin, Level, OutputPin};

/// One GPIO line with its label and active level
pub struct Line<P> {
    pub pin: P,
    pub name: &'static str,
    pub active: Level,
}

impl<P> Line<P> {
    /// Active-high line
    pub fn new(pin: P, name: &'static str) -> Self {
        Self {
            pin,
            name,
            active: Level::High,
        }
    }

    /// Active-low line (pull-up buttons, sinking LEDs)
    pub fn active_low(pin: P, name: &'static str) -> Self {
        Self {
            pin,
            name,
            active: Level::Low,
        }
    }
}

/// Board buttons and LEDs
///
/// `NI` input pins become Bit input codes `0..NI`, `NO` output pins Bit
/// output codes `0..NO`, in array order.
pub struct GpioBoardIo<I, O, const NI: usize, const NO: usize> {
    inputs: [Line<I>; NI],
    outputs: [Line<O>; NO],
    /// Active flags sampled at the last update
    sampled: [bool; NI],
    /// Requested output states, written at the next update
    pending: [bool; NO],
}

impl<I: InputPin, O: OutputPin, const NI: usize, const NO: usize> GpioBoardIo<I, O, NI, NO> {
    /// Update period in milliseconds
    pub const UPDATE_PERIOD: Ticks = 15;

    pub fn new(inputs: [Line<I>; NI], outputs: [Line<O>; NO]) -> Self {
        let mut io = Self {
            inputs,
            outputs,
            sampled: [false; NI],
            pending: [false; NO],
        };
        // outputs start inactive
        io.write_outputs();
        io
    }

    fn write_outputs(&mut self) {
        for (line, &active) in self.outputs.iter_mut().zip(self.pending.iter()) {
            line.pin.set_state(line.active.raw(active));
        }
    }
}

impl<I: InputPin, O: OutputPin, const NI: usize, const NO: usize> Device
    for GpioBoardIo<I, O, NI, NO>
{
    fn description(&self) -> &'static str {
        "board gpio"
    }
}

impl<I: InputPin, O: OutputPin, const NI: usize, const NO: usize> IoDevice
    for GpioBoardIo<I, O, NI, NO>
{
    fn capabilities(&self) -> Capabilities {
        Capabilities::new(1)
            .with_inputs(Space::Bit, NI as Code)
            .with_outputs(Space::Bit, NO as Code)
    }

    fn update_period(&self) -> Ticks {
        Self::UPDATE_PERIOD
    }

    fn update(&mut self) {
        for (sample, line) in self.sampled.iter_mut().zip(self.inputs.iter()) {
            *sample = line.active.is_active(line.pin.is_high());
        }
        self.write_outputs();
    }

    fn get_input(&mut self, _space: Space, code: Code, _port: Port) -> Value {
        self.sampled[code as usize] as Value
    }

    fn set_output(&mut self, _space: Space, code: Code, _port: Port, value: Value) {
        self.pending[code as usize] = value != 0;
    }

    fn input_name(&self, _space: Space, code: Code) -> &'static str {
        self.inputs[code as usize].name
    }

    fn output_name(&self, _space: Space, code: Code) -> &'static str {
        self.outputs[code as usize].name
    }
}
