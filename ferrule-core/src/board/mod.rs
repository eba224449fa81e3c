//! Board bring-up
//!
//! A [`Board`] knows how to bring up one piece of hardware; an optional
//! [`Rig`] sits on top of it and overrides or extends what the board
//! provides. [`System::boot`] walks both through the fixed [`BoardStage`]
//! sequence:
//!
//! ```text
//!  InitHardware ─► InitDebugStreamDriver ─► Greetings ─► InitIoProfiles
//!       ─► InitRandomDriver ─► InitIoLevel1 ─► Comm ─► Storage
//!       ─► InitIoLevel2 ─► Screen ─► Sound ─► InitIoLevel3 ─► Ready
//! ```
//!
//! At every stage the board handler runs first, then the rig handler. At
//! selecting stages both may offer a device; the rig's offer wins.

mod console;
mod countdown;
mod stage;
pub mod summary;
mod system;

pub use console::Console;
pub use countdown::{CountdownState, InputCountdown};
pub use stage::{BoardStage, SingletonKind, StageShape};
pub use system::System;

use core::fmt;

use crate::device::{DebugStream, RandomDevice, SoundDevice, VideoDevice};
use crate::mio::Mio;

/// A device offered at a selecting stage
pub enum Candidate<'d> {
    DebugStream(&'d mut dyn DebugStream),
    Random(&'d mut dyn RandomDevice),
    Video(&'d mut dyn VideoDevice),
    Sound(&'d mut dyn SoundDevice),
}

impl Candidate<'_> {
    pub fn kind(&self) -> SingletonKind {
        match self {
            Candidate::DebugStream(_) => SingletonKind::DebugStream,
            Candidate::Random(_) => SingletonKind::Random,
            Candidate::Video(_) => SingletonKind::Video,
            Candidate::Sound(_) => SingletonKind::Sound,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Candidate::DebugStream(d) => d.description(),
            Candidate::Random(d) => d.description(),
            Candidate::Video(d) => d.description(),
            Candidate::Sound(d) => d.description(),
        }
    }
}

/// What a stage handler gets to work with
pub struct StageContext<'c, 'd> {
    pub stage: BoardStage,
    pub mio: &'c mut Mio<'d>,
    console: Option<&'c mut Console<'d>>,
}

impl<'c, 'd> StageContext<'c, 'd> {
    pub(crate) fn new(
        stage: BoardStage,
        mio: &'c mut Mio<'d>,
        console: Option<&'c mut Console<'d>>,
    ) -> Self {
        Self {
            stage,
            mio,
            console,
        }
    }

    /// Write a line on the boot console
    ///
    /// Dropped before the debug stream is selected.
    pub fn line(&mut self, args: fmt::Arguments<'_>) {
        if let Some(console) = self.console.as_deref_mut() {
            console.line(args);
        }
    }

    pub fn has_console(&self) -> bool {
        self.console.is_some()
    }
}

/// Hardware bring-up handlers
pub trait Board<'d> {
    /// One-line description printed in the greeting
    fn identity(&self) -> &'static str;

    /// Run `ctx.stage`; at selecting stages, optionally offer a device
    fn stage_change(&mut self, ctx: &mut StageContext<'_, 'd>) -> Option<Candidate<'d>>;

    /// Report a failure that happens before any debug stream exists
    ///
    /// Boards signal this with whatever they have: an LED, stderr, a
    /// beeper. Boot panics right after.
    fn early_failure(&mut self, _reason: &str) {}
}

/// Overrides on top of a board
pub trait Rig<'d> {
    fn identity(&self) -> &'static str;

    fn stage_change(&mut self, ctx: &mut StageContext<'_, 'd>) -> Option<Candidate<'d>>;
}
