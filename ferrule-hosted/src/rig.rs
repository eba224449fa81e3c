//! Demo rig
//!
//! Sits on top of the hosted board: replaces the board's random source with
//! its own and wires the keyboard's second player port to GP2.

use ferrule_core::board::{BoardStage, Candidate, Rig, StageContext};
use ferrule_core::device::{Direction, RandomDevice};
use ferrule_core::mio::{Gp2Bit, ProfileLine};
use log::warn;

use crate::keyboard::{self, PLAYER_TWO};

/// Seed of the rig random source
pub const RIG_SEED: u64 = 0x5EED_F00D;

pub struct DemoRig<'d> {
    random: Option<&'d mut dyn RandomDevice>,
}

impl<'d> DemoRig<'d> {
    pub fn new(random: &'d mut dyn RandomDevice) -> Self {
        Self {
            random: Some(random),
        }
    }
}

impl<'d> Rig<'d> for DemoRig<'d> {
    fn identity(&self) -> &'static str {
        "demo rig"
    }

    fn stage_change(&mut self, ctx: &mut StageContext<'_, 'd>) -> Option<Candidate<'d>> {
        match ctx.stage {
            BoardStage::InitRandomDriver => self.random.take().map(Candidate::Random),
            BoardStage::InitIoLevel2Drivers => {
                let Some(keyboard) = keyboard::find_driver(ctx.mio) else {
                    warn!("demo rig: no keyboard, GP2 left unmapped");
                    ctx.line(format_args!("gp2: no keyboard"));
                    return None;
                };
                ctx.mio.register_gateway(Direction::Input, keyboard, PLAYER_TWO);
                for &line in Gp2Bit::ALL {
                    ctx.mio.map_line(line, line.code());
                }
                ctx.line(format_args!("gp2: keyboard port {}", PLAYER_TWO));
                None
            }
            _ => None,
        }
    }
}
