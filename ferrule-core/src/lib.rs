//! Board-agnostic core of the Ferrule framework
//!
//! Application code is written once against semantic profiles ("first
//! gamepad", "status sign", ...) and runs unchanged on every board that can
//! feed those profiles. This crate contains everything that does not depend
//! on a concrete chip:
//!
//! - The IO device contract and its capability table ([`device`])
//! - The string-keyed device command protocol ([`device::command`])
//! - The multiplexed I/O manager binding profile codes to drivers ([`mio`])
//! - The staged board bring-up sequencer ([`board`])
//! - Compile-time capacities and required-driver flags ([`config`])

#![no_std]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod board;
pub mod config;
pub mod device;
pub mod mio;

/// Framework name printed in the boot greeting
pub const FRAMEWORK_NAME: &str = "Ferrule";

/// Framework version printed in the boot greeting
pub const FRAMEWORK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Monotonic millisecond tick counter
///
/// Wraps around after ~49 days; all comparisons use wrapping arithmetic.
pub type Ticks = u32;
