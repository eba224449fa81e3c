//! Frame loop
//!
//! Time on the simulator is the frame counter times the frame length, so a
//! run is reproducible no matter how fast the host is.

use ferrule_core::board::System;
use ferrule_core::mio::DriverId;
use ferrule_core::Ticks;
use log::{info, warn};

use crate::demo::Demo;
use crate::keyboard::{self, KeyState};
use crate::script::{CommandEvent, Script};

pub struct Simulation<'s> {
    script: &'s Script,
    keys: &'s KeyState,
    keyboard: Option<DriverId>,
    frame_ms: Ticks,
}

impl<'s> Simulation<'s> {
    pub fn new(system: &mut System<'_>, script: &'s Script, keys: &'s KeyState, frame_ms: Ticks) -> Self {
        let keyboard = keyboard::find_driver(system.mio());
        if keyboard.is_none() && !script.commands.is_empty() {
            warn!("sim: script has commands but no keyboard is mapped");
        }
        Self {
            script,
            keys,
            keyboard,
            frame_ms,
        }
    }

    /// Tick count at the start of `frame`
    pub fn now(&self, frame: u32) -> Ticks {
        frame.wrapping_mul(self.frame_ms)
    }

    /// Replay the script for `frame`, poll the drivers, run the demo
    pub fn step(&self, system: &mut System<'_>, demo: &mut Demo, frame: u32) {
        for event in self.script.keys_at(frame) {
            self.keys.set(event.port(), event.key, event.pressed);
        }
        for command in self.script.commands_at(frame) {
            self.send(system, command);
        }

        let now = self.now(frame);
        system.update(now);
        demo.step(system, now);
    }

    fn send(&self, system: &mut System<'_>, command: &CommandEvent) {
        let Some(driver) = self.keyboard else {
            return;
        };
        let mut value = command.value.clone();
        match system.mio().command(driver, &command.name, &mut value) {
            Ok(result) => info!(
                "sim: frame {}: {} -> {:?} ({})",
                command.frame, command.name, result, value
            ),
            Err(e) => warn!("sim: frame {}: {}: {:?}", command.frame, command.name, e),
        }
    }
}
