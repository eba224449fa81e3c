//! UART debug stream
//!
//! Text sink over a transmit-only UART. Line speed can be changed at run
//! time with the `s|uart.baud` (or `s|speed`) command; the applied rate is
//! written back into the command value.

use core::fmt;

use ferrule_core::device::command::names;
use ferrule_core::device::{CommandName, CommandResult, DebugStream, Device, Variant};
use ferrule_hal::uart::{UartConfig, UartTx};

pub struct UartDebugStream<T> {
    uart: T,
    config: UartConfig,
    /// Failed writes since start
    errors: u32,
}

impl<T: UartTx> UartDebugStream<T> {
    pub fn new(uart: T, config: UartConfig) -> Self {
        Self {
            uart,
            config,
            errors: 0,
        }
    }

    pub fn config(&self) -> &UartConfig {
        &self.config
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn release(self) -> T {
        self.uart
    }

    fn set_baudrate(&mut self, value: &mut Variant) -> CommandResult {
        let Some(requested) = value.as_uint() else {
            return CommandResult::Failed;
        };
        let requested = requested.clamp(UartConfig::MIN_BAUDRATE, UartConfig::MAX_BAUDRATE);
        match self.uart.set_baudrate(requested) {
            Ok(applied) => {
                self.config.baudrate = applied;
                *value = Variant::Uint(applied);
                CommandResult::Ok
            }
            Err(_) => {
                self.errors = self.errors.wrapping_add(1);
                CommandResult::Failed
            }
        }
    }
}

impl<T: UartTx> Device for UartDebugStream<T> {
    fn description(&self) -> &'static str {
        "uart debug stream"
    }

    fn command(&mut self, name: &CommandName<'_>, value: &mut Variant) -> CommandResult {
        if *name == names::UART_BAUD || *name == names::SPEED {
            self.set_baudrate(value)
        } else if *name == "g|uart.baud" {
            *value = Variant::Uint(self.config.baudrate);
            CommandResult::Ok
        } else if *name == "g|framebits" {
            *value = Variant::Uint(self.config.frame_bits() as u32);
            CommandResult::Ok
        } else {
            CommandResult::NotHandled
        }
    }
}

impl<T: UartTx> fmt::Write for UartDebugStream<T> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.uart.write_blocking(s.as_bytes()).map_err(|_| {
            self.errors = self.errors.wrapping_add(1);
            fmt::Error
        })
    }
}

impl<T: UartTx> DebugStream for UartDebugStream<T> {
    fn flush(&mut self) {
        if self.uart.flush().is_err() {
            self.errors = self.errors.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;
    use ferrule_core::device::command::dispatch;
    use heapless::Vec;

    struct MockUart {
        sent: Vec<u8, 64>,
        baudrate: u32,
        broken: bool,
    }

    impl MockUart {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                baudrate: 115200,
                broken: false,
            }
        }
    }

    impl UartTx for MockUart {
        type Error = ();

        fn write_blocking(&mut self, data: &[u8]) -> Result<(), ()> {
            if self.broken {
                return Err(());
            }
            self.sent.extend_from_slice(data).map_err(|_| ())
        }

        fn flush(&mut self) -> Result<(), ()> {
            Ok(())
        }

        fn set_baudrate(&mut self, baudrate: u32) -> Result<u32, ()> {
            if self.broken {
                return Err(());
            }
            // pretend the divider rounds to a multiple of 100
            self.baudrate = baudrate / 100 * 100;
            Ok(self.baudrate)
        }
    }

    #[test]
    fn test_write_text() {
        let mut stream = UartDebugStream::new(MockUart::new(), UartConfig::default());
        write!(stream, "boot {}", 1).unwrap();
        assert_eq!(stream.release().sent.as_slice(), b"boot 1");
    }

    #[test]
    fn test_set_speed_reports_applied_rate() {
        let mut stream = UartDebugStream::new(MockUart::new(), UartConfig::default());
        let mut value = Variant::Uint(57_623);
        assert_eq!(dispatch(&mut stream, names::SPEED, &mut value), Ok(CommandResult::Ok));
        assert_eq!(value, Variant::Uint(57_600));
        assert_eq!(stream.config().baudrate, 57_600);

        let mut value = Variant::Uint(10);
        assert_eq!(dispatch(&mut stream, names::UART_BAUD, &mut value), Ok(CommandResult::Ok));
        assert_eq!(value, Variant::Uint(UartConfig::MIN_BAUDRATE));

        let mut value = Variant::None;
        assert_eq!(dispatch(&mut stream, "g|framebits", &mut value), Ok(CommandResult::Ok));
        assert_eq!(value, Variant::Uint(10));
    }

    #[test]
    fn test_command_failures() {
        let mut stream = UartDebugStream::new(MockUart::new(), UartConfig::default());
        let mut value = Variant::Bool(true);
        assert_eq!(dispatch(&mut stream, names::SPEED, &mut value), Ok(CommandResult::Failed));
        assert_eq!(dispatch(&mut stream, names::HOSTNAME, &mut value), Ok(CommandResult::NotHandled));

        let mut broken = MockUart::new();
        broken.broken = true;
        let mut stream = UartDebugStream::new(broken, UartConfig::default());
        let mut value = Variant::Uint(9600);
        assert_eq!(dispatch(&mut stream, names::SPEED, &mut value), Ok(CommandResult::Failed));
        assert!(write!(stream, "x").is_err());
        assert_eq!(stream.errors(), 2);
    }
}
