//! Hosted simulator board
//!
//! | Stage | Work |
//! |-------|------|
//! | `InitDebugStreamDriver` | offers the stderr UART stream |
//! | `InitIoProfiles` | attaches GP1, GP2, MAIN and SIGN |
//! | `InitRandomDriver` | offers xorshift seeded with [`HOSTED_SEED`] |
//! | `InitIoLevel1Drivers` | keyboard port 0 on GP1 and MAIN, sign lamps on SIGN |

use std::env::consts::{ARCH, OS};

use ferrule_core::board::{Board, BoardStage, Candidate, StageContext};
use ferrule_core::device::{DebugStream, Direction, IoDevice, RandomDevice};
use ferrule_core::mio::{Gp1Bit, InputGroup, MainBit, Mio, OutputGroup, ProfileLine, SignBit};
use log::{debug, error, info};

use crate::keyboard::{Key, PLAYER_ONE};

/// Seed of the board random source
pub const HOSTED_SEED: u64 = 0xCACA_CACA_CACA_CACA;

/// Everything the board hands out during boot
pub struct HostDevices<'d> {
    pub stream: &'d mut dyn DebugStream,
    pub random: &'d mut dyn RandomDevice,
    pub keyboard: &'d mut dyn IoDevice,
    pub sign: &'d mut dyn IoDevice,
}

pub struct HostedBoard<'d> {
    stream: Option<&'d mut dyn DebugStream>,
    random: Option<&'d mut dyn RandomDevice>,
    keyboard: Option<&'d mut dyn IoDevice>,
    sign: Option<&'d mut dyn IoDevice>,
}

impl<'d> HostedBoard<'d> {
    pub fn new(devices: HostDevices<'d>) -> Self {
        Self {
            stream: Some(devices.stream),
            random: Some(devices.random),
            keyboard: Some(devices.keyboard),
            sign: Some(devices.sign),
        }
    }

    fn attach_io(&mut self, mio: &mut Mio<'d>) {
        if let Some(keyboard) = self.keyboard.take() {
            let driver = mio.attach_driver(keyboard);
            mio.register_gateway(Direction::Input, driver, PLAYER_ONE);
            for &line in Gp1Bit::ALL {
                mio.map_line(line, line.code());
            }
            for &line in MainBit::ALL {
                mio.map_line(line, Key::MAIN_BASE + line.code());
            }
        }

        if let Some(sign) = self.sign.take() {
            let driver = mio.attach_driver(sign);
            mio.register_gateway(Direction::Output, driver, 0);
            for &line in SignBit::ALL {
                mio.map_line(line, line.code());
            }
        }
    }
}

impl<'d> Board<'d> for HostedBoard<'d> {
    fn identity(&self) -> &'static str {
        "hosted simulator"
    }

    fn stage_change(&mut self, ctx: &mut StageContext<'_, 'd>) -> Option<Candidate<'d>> {
        match ctx.stage {
            BoardStage::InitHardware => {
                debug!("hosted: {} {}", OS, ARCH);
                None
            }
            BoardStage::InitDebugStreamDriver => self.stream.take().map(Candidate::DebugStream),
            BoardStage::Greetings => {
                ctx.line(format_args!("host: {} {}", OS, ARCH));
                None
            }
            BoardStage::InitIoProfiles => {
                for group in [InputGroup::Gp1, InputGroup::Gp2, InputGroup::Main] {
                    ctx.mio.attach_profile(group);
                }
                ctx.mio.attach_profile(OutputGroup::Sign);
                None
            }
            BoardStage::InitRandomDriver => self.random.take().map(Candidate::Random),
            BoardStage::InitIoLevel1Drivers => {
                self.attach_io(ctx.mio);
                None
            }
            BoardStage::Ready => {
                info!("hosted: board ready");
                None
            }
            BoardStage::ShutdownHardware => {
                ctx.line(format_args!("host: power off"));
                None
            }
            _ => None,
        }
    }

    fn early_failure(&mut self, reason: &str) {
        error!("hosted: {}", reason);
        eprintln!("ferrule-hosted: boot failed: {}", reason);
    }
}
