//! Host "UART" backing the debug stream
//!
//! Wraps any `std::io::Write` (stderr in the binary) so the regular
//! [`UartDebugStream`](ferrule_drivers::UartDebugStream) driver can run on
//! the host. Baud rate changes are accepted as-is.

use std::io::{self, Write};

use ferrule_hal::uart::UartTx;
use log::debug;

pub struct HostUart<W> {
    out: W,
    baudrate: u32,
}

impl<W: Write> HostUart<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            baudrate: 115_200,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> UartTx for HostUart<W> {
    type Error = io::Error;

    fn write_blocking(&mut self, data: &[u8]) -> Result<(), io::Error> {
        self.out.write_all(data)
    }

    fn flush(&mut self) -> Result<(), io::Error> {
        self.out.flush()
    }

    fn set_baudrate(&mut self, baudrate: u32) -> Result<u32, io::Error> {
        debug!("host uart: {} -> {} baud", self.baudrate, baudrate);
        self.baudrate = baudrate;
        Ok(baudrate)
    }
}
