//! Singleton device kinds
//!
//! The boot sequencer selects at most one device of each kind. Boards and
//! rigs offer candidates; the selected one is owned by
//! [`System`](crate::board::System) for the rest of the run.

use core::fmt;

use super::Device;

/// Text sink for boot greetings, summaries and log contexts
///
/// Selected at the `InitDebugStreamDriver` stage and required: nothing can
/// be reported before it exists.
pub trait DebugStream: Device + fmt::Write {
    /// Push buffered output to the wire
    fn flush(&mut self) {}
}

/// Random number source
pub trait RandomDevice: Device {
    /// Next 32 random bits
    fn next_u32(&mut self) -> u32;

    /// Uniform-ish value in `0..bound`; `bound` must be nonzero
    fn next_below(&mut self, bound: u32) -> u32 {
        if bound == 0 {
            violation!("{}: next_below(0)", self.description());
        }
        self.next_u32() % bound
    }
}

/// Video output
pub trait VideoDevice: Device {
    /// Visible resolution as (width, height) in pixels
    fn resolution(&self) -> (u16, u16);

    /// Frames presented since start
    fn frame_count(&self) -> u32;
}

/// Audio output
pub trait SoundDevice: Device {
    /// Output sample rate in Hz
    fn sample_rate(&self) -> u32;

    /// Set master volume, 0 (mute) to 255
    fn set_volume(&mut self, volume: u8);
}
