//! Demo application
//!
//! Written only against profiles, so it runs the same on any board:
//!
//! 1. Gives the user [`SKIP_WINDOW`] ms to hold MAIN A; the warning lamp
//!    blinks meanwhile. Without a press every lamp lights for
//!    [`LAMP_TEST`] ms.
//! 2. Then mirrors GP1 A/B/Start onto the green/red/warning lamps and any
//!    GP2 key onto blue, reports clicks and holds on the console, and rolls
//!    a die when MAIN B is clicked.

use ferrule_core::board::{CountdownState, InputCountdown, System};
use ferrule_core::device::{Value, When};
use ferrule_core::mio::{Gp1Bit, InputAction, InputGroup, MainBit, ProfileLine, SignBit};
use ferrule_core::Ticks;

/// Window to hold MAIN A and skip the lamp test (ms)
pub const SKIP_WINDOW: Ticks = 1500;

/// How long the lamp test keeps every lamp lit (ms)
pub const LAMP_TEST: Ticks = 600;

const BLINK: Ticks = 250;

#[derive(Debug, Clone, Copy)]
enum Mode {
    Countdown(InputCountdown),
    LampTest { until: Ticks },
    Run,
}

/// What happened so far, for the exit summary
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DemoStats {
    pub lamp_test_skipped: bool,
    pub clicks: u32,
    pub holds: u32,
    pub rolls: u32,
}

pub struct Demo {
    mode: Mode,
    stats: DemoStats,
}

impl Demo {
    pub fn start(system: &mut System<'_>, now: Ticks) -> Self {
        let countdown = system.countdown(
            InputGroup::Main,
            MainBit::A.code(),
            SKIP_WINDOW,
            now,
            "hold to skip the lamp test",
        );
        Self {
            mode: Mode::Countdown(countdown),
            stats: DemoStats::default(),
        }
    }

    pub fn stats(&self) -> DemoStats {
        self.stats
    }

    pub fn is_running(&self) -> bool {
        matches!(self.mode, Mode::Run)
    }

    /// Advance one frame; call after [`System::update`]
    pub fn step(&mut self, system: &mut System<'_>, now: Ticks) {
        match self.mode {
            Mode::Countdown(countdown) => match countdown.poll(system.mio(), now) {
                CountdownState::Running(left) => {
                    let lit = (left / BLINK) % 2 == 1;
                    system.mio().output(SignBit::Warning, lit as Value, When::Buffer);
                }
                CountdownState::Pressed => {
                    system.console().line(format_args!("lamp test skipped"));
                    system.mio().output(SignBit::Warning, 0, When::Buffer);
                    self.stats.lamp_test_skipped = true;
                    self.mode = Mode::Run;
                }
                CountdownState::Expired | CountdownState::Unmapped => {
                    system.console().line(format_args!("lamp test"));
                    set_all_lamps(system, 1);
                    self.mode = Mode::LampTest {
                        until: now.wrapping_add(LAMP_TEST),
                    };
                }
            },
            Mode::LampTest { until } => {
                if (now.wrapping_sub(until) as i32) >= 0 {
                    set_all_lamps(system, 0);
                    self.mode = Mode::Run;
                }
            }
            Mode::Run => self.run(system),
        }
    }

    fn run(&mut self, system: &mut System<'_>) {
        let mio = system.mio();
        let green = mio.input(Gp1Bit::A, When::Buffer);
        let red = mio.input(Gp1Bit::B, When::Buffer);
        let warning = mio.input(Gp1Bit::Start, When::Buffer);
        let blue = mio.any_input_bit(&[InputGroup::Gp2]) as Value;
        mio.output(SignBit::Green, green, When::Buffer);
        mio.output(SignBit::Red, red, When::Buffer);
        mio.output(SignBit::Warning, warning, When::Buffer);
        mio.output(SignBit::Blue, blue, When::Buffer);

        for &line in Gp1Bit::ALL {
            let action = system.mio().input_bit_action(InputGroup::Gp1, line.code());
            match action {
                InputAction::Clicked | InputAction::DoubleClicked => self.stats.clicks += 1,
                InputAction::OnHold => self.stats.holds += 1,
                _ => continue,
            }
            system.console().line(format_args!("GP1 {:?}: {:?}", line, action));
        }

        if system.mio().input_bit_action(InputGroup::Main, MainBit::B.code()) == InputAction::Clicked {
            let roll = system.random().map(|random| random.next_below(6) + 1);
            match roll {
                Some(roll) => {
                    self.stats.rolls += 1;
                    system.console().line(format_args!("dice: {}", roll));
                }
                None => system.console().line(format_args!("dice: no random source")),
            }
        }
    }
}

fn set_all_lamps(system: &mut System<'_>, value: Value) {
    for &line in SignBit::ALL {
        system.mio().output(line, value, When::Buffer);
    }
}
