//! Hosted simulator board for Ferrule
//!
//! Runs the framework on a desktop: the debug stream goes to stderr, the
//! status sign prints to stdout, and input comes from a scripted keyboard.

pub mod board;
pub mod demo;
pub mod keyboard;
pub mod rig;
pub mod script;
pub mod sign;
pub mod sim;
pub mod uart;

pub use board::{HostDevices, HostedBoard, HOSTED_SEED};
pub use demo::{Demo, DemoStats};
pub use keyboard::{Key, KeyState, Keyboard};
pub use rig::{DemoRig, RIG_SEED};
pub use script::{ConfigError, Script};
pub use sign::SignLamps;
pub use sim::Simulation;
pub use uart::HostUart;
