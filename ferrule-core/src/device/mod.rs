//! Device contract
//!
//! Every driver the framework talks to is a [`Device`]: it has a
//! description and may answer runtime commands. IO drivers additionally
//! implement [`IoDevice`]; the boot sequencer selects exactly one of each
//! [`singleton`] kind.

pub mod command;
pub mod io;
pub mod singleton;
pub mod variant;

pub use command::{CommandKind, CommandName, CommandNameError, CommandResult};
pub use io::{Capabilities, IoDevice, IoDriver};
pub use singleton::{DebugStream, RandomDevice, SoundDevice, VideoDevice};
pub use variant::Variant;

/// Index of one line within a device (or profile) address space
pub type Code = u16;

/// Index of a physical port on a multi-port device
pub type Port = u8;

/// Value of one line; Bit lines use 0 and 1
pub type Value = u32;

/// Data direction, as seen from the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Input, Direction::Output];

    /// Position in per-direction tables
    pub const fn index(self) -> usize {
        match self {
            Direction::Input => 0,
            Direction::Output => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

/// Address space of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Space {
    /// Boolean line (button, LED)
    Bit,
    /// Multi-valued line (analog axis, PWM channel, counter)
    Range,
}

impl Space {
    pub const ALL: [Space; 2] = [Space::Bit, Space::Range];

    /// Position in per-space tables
    pub const fn index(self) -> usize {
        match self {
            Space::Bit => 0,
            Space::Range => 1,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Space::Bit => "bit",
            Space::Range => "range",
        }
    }
}

/// When a read or write reaches the hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum When {
    /// Poll the device immediately, bypassing its update throttle
    Now,
    /// Touch cached state only; the next throttled update syncs hardware
    #[default]
    Buffer,
}

/// Base contract shared by every driver
pub trait Device {
    /// Human readable driver description, shown in boot summaries
    fn description(&self) -> &'static str;

    /// Handle a runtime command
    ///
    /// Drivers recognize only their own names and answer
    /// [`CommandResult::NotHandled`] for everything else. The default body
    /// reports that the driver has no command handler at all.
    fn command(&mut self, name: &CommandName<'_>, value: &mut Variant) -> CommandResult {
        let _ = (name, value);
        CommandResult::NoMethod
    }
}
