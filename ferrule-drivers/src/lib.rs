//! Reference driver implementations
//!
//! Concrete implementations of the device contracts defined in
//! ferrule-core:
//!
//! - GPIO buttons and LEDs as an IO device
//! - Two Genesis/MegaDrive gamepads behind a PCA9673 I2C expander
//! - A UART debug stream
//! - A xorshift random source

#![no_std]
#![deny(unsafe_code)]

pub mod gpio_io;
pub mod pca9673;
pub mod random;
pub mod uart_stream;

pub use gpio_io::GpioBoardIo;
pub use pca9673::{Pca9673Gamepads, Pca9673Status};
pub use random::XorShiftRandom;
pub use uart_stream::UartDebugStream;
