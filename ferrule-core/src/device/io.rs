//! IO device contract
//!
//! An IO device exposes lines in two address spaces ([`Space::Bit`] and
//! [`Space::Range`]), in one or both directions, on one or more ports. What
//! it supports is declared up front in its [`Capabilities`]; callers check
//! that table before dispatching, and calling an operation the table does
//! not declare is a contract violation.
//!
//! Hardware is touched only by [`IoDevice::update`]. Reads and writes work
//! on state cached by the driver, so an expensive bus transaction happens
//! once per update period rather than once per line.

use super::{Code, Device, Direction, Port, Space, Value, When};
use crate::config::DEFAULT_UPDATE_PERIOD;
use crate::Ticks;

/// Line counts a device declares per direction and address space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Capabilities {
    /// Number of physical ports (at least 1)
    pub ports: Port,
    /// Input line count, indexed by [`Space::index`]
    pub inputs: [Code; 2],
    /// Output line count, indexed by [`Space::index`]
    pub outputs: [Code; 2],
}

impl Capabilities {
    /// Device with `ports` ports and no lines yet
    pub fn new(ports: Port) -> Self {
        Self {
            ports,
            inputs: [0; 2],
            outputs: [0; 2],
        }
    }

    /// Declare `count` input lines in `space`
    pub fn with_inputs(mut self, space: Space, count: Code) -> Self {
        self.inputs[space.index()] = count;
        self
    }

    /// Declare `count` output lines in `space`
    pub fn with_outputs(mut self, space: Space, count: Code) -> Self {
        self.outputs[space.index()] = count;
        self
    }

    /// Declared line count for a direction and space
    pub fn count(&self, direction: Direction, space: Space) -> Code {
        match direction {
            Direction::Input => self.inputs[space.index()],
            Direction::Output => self.outputs[space.index()],
        }
    }

    /// Whether the device has any line in `direction`
    pub fn supports(&self, direction: Direction) -> bool {
        Space::ALL.iter().any(|&s| self.count(direction, s) > 0)
    }
}

/// Contract implemented by IO drivers
///
/// Only [`capabilities`](IoDevice::capabilities) and
/// [`update`](IoDevice::update) are mandatory. The line operations default
/// to a contract violation; a driver overrides the ones its capability
/// table declares.
pub trait IoDevice: Device {
    /// Declared ports and line counts
    fn capabilities(&self) -> Capabilities;

    /// Minimum ticks between two throttled updates
    fn update_period(&self) -> Ticks {
        DEFAULT_UPDATE_PERIOD
    }

    /// Synchronize cached state with the hardware
    fn update(&mut self);

    /// Input lines currently available on `port`
    ///
    /// May be lower than the declared count, e.g. a 3-button pad plugged
    /// into a port that supports 6-button pads.
    fn available_inputs(&self, space: Space, port: Port) -> Code {
        let _ = port;
        self.capabilities().count(Direction::Input, space)
    }

    /// Output lines currently available on `port`
    fn available_outputs(&self, space: Space, port: Port) -> Code {
        let _ = port;
        self.capabilities().count(Direction::Output, space)
    }

    /// Cached value of an input line
    fn get_input(&mut self, space: Space, code: Code, port: Port) -> Value {
        let _ = (space, code, port);
        unsupported(self.description(), "get_input")
    }

    /// Store a value for an output line; written at the next update
    fn set_output(&mut self, space: Space, code: Code, port: Port, value: Value) {
        let _ = (space, code, port, value);
        unsupported(self.description(), "set_output")
    }

    /// Label of an input line
    fn input_name(&self, space: Space, code: Code) -> &'static str {
        let _ = (space, code);
        unsupported(self.description(), "input_name")
    }

    /// Label of an output line
    fn output_name(&self, space: Space, code: Code) -> &'static str {
        let _ = (space, code);
        unsupported(self.description(), "output_name")
    }

    /// Largest value an output line accepts
    fn max_output(&self, space: Space, code: Code) -> Value {
        let _ = code;
        match space {
            Space::Bit => 1,
            Space::Range => Value::MAX,
        }
    }

    /// First input line on `port` reading nonzero, in code order
    fn first_active_input(&mut self, space: Space, port: Port) -> Option<Code> {
        let count = self.available_inputs(space, port);
        (0..count).find(|&code| self.get_input(space, code, port) != 0)
    }
}

fn unsupported(device: &str, op: &str) -> ! {
    violation!("{}: {} is not supported", device, op)
}

/// An attached IO device together with its update throttle
pub struct IoDriver<'d> {
    device: &'d mut dyn IoDevice,
    caps: Capabilities,
    period: Ticks,
    last_update: Option<Ticks>,
}

impl<'d> IoDriver<'d> {
    /// Wrap a device, capturing its capabilities and update period
    pub fn new(device: &'d mut dyn IoDevice) -> Self {
        let caps = device.capabilities();
        let period = device.update_period();
        Self {
            device,
            caps,
            period,
            last_update: None,
        }
    }

    pub fn description(&self) -> &'static str {
        self.device.description()
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.caps
    }

    /// Tick of the last throttled update, if any
    pub fn last_update(&self) -> Option<Ticks> {
        self.last_update
    }

    /// Update the device unless its period has not elapsed since the last
    /// throttled update. The first call always updates.
    ///
    /// Returns whether the device was updated.
    pub fn update(&mut self, now: Ticks) -> bool {
        if let Some(last) = self.last_update {
            if now.wrapping_sub(last) < self.period {
                return false;
            }
        }
        self.device.update();
        self.last_update = Some(now);
        true
    }

    pub fn available(&self, direction: Direction, space: Space, port: Port) -> Code {
        match direction {
            Direction::Input => self.device.available_inputs(space, port),
            Direction::Output => self.device.available_outputs(space, port),
        }
    }

    /// Read an input line; `Now` polls the device first, unthrottled
    pub fn get_input(&mut self, space: Space, code: Code, port: Port, when: When) -> Value {
        if when == When::Now {
            self.device.update();
        }
        self.device.get_input(space, code, port)
    }

    /// Write an output line; `Now` pushes it to the hardware immediately
    pub fn set_output(&mut self, space: Space, code: Code, port: Port, value: Value, when: When) {
        self.device.set_output(space, code, port, value);
        if when == When::Now {
            self.device.update();
        }
    }

    pub fn first_active_input(&mut self, space: Space, port: Port) -> Option<Code> {
        self.device.first_active_input(space, port)
    }

    pub fn line_name(&self, direction: Direction, space: Space, code: Code) -> &'static str {
        match direction {
            Direction::Input => self.device.input_name(space, code),
            Direction::Output => self.device.output_name(space, code),
        }
    }

    pub fn max_output(&self, space: Space, code: Code) -> Value {
        self.device.max_output(space, code)
    }

    /// Direct access for device commands
    pub fn device_mut(&mut self) -> &mut dyn IoDevice {
        &mut *self.device
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Buttons {
        updates: Cell<u32>,
        live: [bool; 3],
        cached: [bool; 3],
    }

    impl Buttons {
        fn new() -> Self {
            Self {
                updates: Cell::new(0),
                live: [false; 3],
                cached: [false; 3],
            }
        }
    }

    impl Device for Buttons {
        fn description(&self) -> &'static str {
            "buttons"
        }
    }

    impl IoDevice for Buttons {
        fn capabilities(&self) -> Capabilities {
            Capabilities::new(1).with_inputs(Space::Bit, 3)
        }

        fn update_period(&self) -> Ticks {
            10
        }

        fn update(&mut self) {
            self.updates.set(self.updates.get() + 1);
            self.cached = self.live;
        }

        fn get_input(&mut self, _space: Space, code: Code, _port: Port) -> Value {
            self.cached[code as usize] as Value
        }

        fn input_name(&self, _space: Space, code: Code) -> &'static str {
            ["a", "b", "c"][code as usize]
        }
    }

    #[test]
    fn test_capabilities() {
        let caps = Capabilities::new(2)
            .with_inputs(Space::Bit, 12)
            .with_outputs(Space::Range, 4);
        assert_eq!(caps.count(Direction::Input, Space::Bit), 12);
        assert_eq!(caps.count(Direction::Input, Space::Range), 0);
        assert_eq!(caps.count(Direction::Output, Space::Range), 4);
        assert!(caps.supports(Direction::Input));
        assert!(caps.supports(Direction::Output));
        assert!(!Capabilities::new(1).supports(Direction::Output));
    }

    #[test]
    fn test_throttle() {
        let mut dev = Buttons::new();
        let mut driver = IoDriver::new(&mut dev);
        assert!(driver.update(100));
        assert!(!driver.update(105));
        assert!(!driver.update(109));
        assert!(driver.update(110));
        assert_eq!(driver.last_update(), Some(110));
    }

    #[test]
    fn test_throttle_wraps() {
        let mut dev = Buttons::new();
        let mut driver = IoDriver::new(&mut dev);
        assert!(driver.update(Ticks::MAX - 2));
        assert!(!driver.update(3));
        assert!(driver.update(7));
    }

    #[test]
    fn test_buffer_reads_cached_now_polls() {
        let mut dev = Buttons::new();
        dev.live[1] = true;
        let mut driver = IoDriver::new(&mut dev);
        assert_eq!(driver.get_input(Space::Bit, 1, 0, When::Buffer), 0);
        assert_eq!(driver.get_input(Space::Bit, 1, 0, When::Now), 1);
        // forced polls leave the throttle alone
        assert_eq!(driver.last_update(), None);
    }

    #[test]
    fn test_first_active_input() {
        let mut dev = Buttons::new();
        dev.live = [false, true, true];
        dev.update();
        assert_eq!(dev.first_active_input(Space::Bit, 0), Some(1));
        dev.live = [false; 3];
        dev.update();
        assert_eq!(dev.first_active_input(Space::Bit, 0), None);
    }

    #[test]
    #[should_panic(expected = "set_output is not supported")]
    fn test_unsupported_direction_panics() {
        let mut dev = Buttons::new();
        dev.set_output(Space::Bit, 0, 0, 1);
    }
}
