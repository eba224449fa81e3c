//! Ferrule hosted simulator
//!
//! Boots the hosted board, optionally with the demo rig on top, then runs
//! the demo application for a fixed number of frames while replaying an
//! input script.
//!
//! ```bash
//! ferrule-hosted --frames 600 --rig --script scripts/demo.toml
//! RUST_LOG=ferrule_core=debug ferrule-hosted --no-sleep
//! ```

use std::io::{self, Stderr, Stdout};
use std::path::PathBuf;
use std::process;
use std::thread;
use std::time::Duration;

use clap::Parser;
use env_logger::Env;
use ferrule_core::board::{Rig, System};
use ferrule_core::Ticks;
use ferrule_drivers::{UartDebugStream, XorShiftRandom};
use ferrule_hal::uart::UartConfig;
use ferrule_hosted::{
    ConfigError, Demo, DemoRig, HostDevices, HostUart, HostedBoard, KeyState, Keyboard, Script,
    SignLamps, Simulation, HOSTED_SEED, RIG_SEED,
};
use log::{info, warn};
use static_cell::StaticCell;

/// Ferrule hosted simulator
#[derive(Parser, Debug)]
#[command(name = "ferrule-hosted")]
#[command(version)]
#[command(about = "Run a Ferrule application on the hosted simulator board", long_about = None)]
struct Args {
    /// Number of frames to run
    #[arg(short, long, default_value_t = 240)]
    frames: u32,

    /// Simulated milliseconds per frame
    #[arg(long, default_value_t = 16)]
    frame_ms: Ticks,

    /// Do not sleep between frames
    #[arg(long)]
    no_sleep: bool,

    /// Boot with the demo rig on top of the board
    #[arg(short, long)]
    rig: bool,

    /// TOML input script
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Log filter, takes precedence over RUST_LOG (e.g. "debug")
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,
}

const APPLICATION: &str = "ferrule demo";

static KEYS: KeyState = KeyState::new();

// Devices are borrowed by the system for the rest of the run
static STREAM: StaticCell<UartDebugStream<HostUart<Stderr>>> = StaticCell::new();
static RANDOM: StaticCell<XorShiftRandom> = StaticCell::new();
static RIG_RANDOM: StaticCell<XorShiftRandom> = StaticCell::new();
static KEYBOARD: StaticCell<Keyboard<'static>> = StaticCell::new();
static SIGN: StaticCell<SignLamps<Stdout>> = StaticCell::new();

fn main() {
    let args = Args::parse();
    init_logging(args.log_level.as_deref());

    if let Err(e) = run(&args) {
        eprintln!("ferrule-hosted: {}", e);
        process::exit(1);
    }
}

fn init_logging(filter: Option<&str>) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.init();
}

fn run(args: &Args) -> Result<(), ConfigError> {
    let script = match &args.script {
        Some(path) => Script::load(path)?,
        None => Script::default(),
    };
    if let Some(last) = script.last_frame() {
        if last >= args.frames {
            warn!(
                "script runs to frame {} but only {} frames are requested",
                last, args.frames
            );
        }
    }

    let stream = STREAM.init(UartDebugStream::new(
        HostUart::new(io::stderr()),
        UartConfig::default(),
    ));
    let random = RANDOM.init(XorShiftRandom::new(HOSTED_SEED));
    let keyboard = KEYBOARD.init(Keyboard::new(&KEYS));
    let sign = SIGN.init(SignLamps::new(io::stdout()));

    let mut board = HostedBoard::new(HostDevices {
        stream,
        random,
        keyboard,
        sign,
    });
    let mut rig = args
        .rig
        .then(|| DemoRig::new(RIG_RANDOM.init(XorShiftRandom::new(RIG_SEED))));

    let mut system = System::boot(
        &mut board,
        rig.as_mut().map(|rig| rig as &mut dyn Rig<'static>),
        APPLICATION,
    );

    let sim = Simulation::new(&mut system, &script, &KEYS, args.frame_ms);
    let mut demo = Demo::start(&mut system, sim.now(0));
    for frame in 0..args.frames {
        sim.step(&mut system, &mut demo, frame);
        if !args.no_sleep {
            thread::sleep(Duration::from_millis(args.frame_ms.into()));
        }
    }

    info!("{} frames: {:?}", args.frames, demo.stats());
    system.shutdown(&mut board, rig.as_mut().map(|rig| rig as &mut dyn Rig<'static>));
    Ok(())
}
