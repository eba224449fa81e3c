//! Compile-time capacities and required-driver flags
//!
//! Every table in the core is a fixed-size array sized from these
//! constants. Nothing allocates.

use crate::Ticks;

/// Maximum number of input gateways a board and rig may register together
pub const INPUT_MAX_GATEWAYS: usize = 8;

/// Maximum number of output gateways a board and rig may register together
pub const OUTPUT_MAX_GATEWAYS: usize = 8;

/// Maximum number of distinct IO drivers attached to the multiplexer
pub const MAX_DRIVERS: usize = 8;

/// Lighting devices addressable through the LIGHTDEV profiles
pub const MAX_LIGHTING_DEVICES: usize = 4;

/// Channels per lighting device in the output LIGHTDEV profile
pub const MAX_LIGHT_CHANNELS: usize = 16;

/// Update period used by drivers that do not declare their own (ms)
pub const DEFAULT_UPDATE_PERIOD: Ticks = 15;

/// Maximum nesting of console log contexts
pub const MAX_CONSOLE_DEPTH: usize = 8;

/// Boot halts when no board or rig provides a video driver
pub const REQUIRE_VIDEO: bool = cfg!(feature = "require-video");

/// Boot halts when no board or rig provides a sound driver
pub const REQUIRE_SOUND: bool = cfg!(feature = "require-sound");
