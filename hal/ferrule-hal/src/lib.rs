//! Ferrule Hardware Abstraction Layer
//!
//! Board-level traits that concrete drivers in `ferrule-drivers` are built
//! on. A board crate implements these for its chip (or for the host, in the
//! simulator) and hands the pins and serial ports to the drivers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / rig                      │
//! └─────────────────────────────────────────┘
//!                     │  profile codes
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ferrule-core (MIO, device contract)    │
//! └─────────────────────────────────────────┘
//!                     │  IoDevice
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ferrule-drivers                        │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ferrule-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! I2C drivers use `embedded_hal::i2c::I2c` directly.
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - Digital I/O
//! - [`uart::UartTx`] - Serial transmit with runtime baud changes

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod uart;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, Level, OutputPin};
pub use uart::{UartConfig, UartTx};
