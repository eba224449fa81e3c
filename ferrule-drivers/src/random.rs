//! Xorshift random source
//!
//! 64-bit xorshift (13, 7, 17). Fast and small; not for cryptography.
//! Boards without a hardware RNG seed it from whatever entropy they have
//! (ADC noise, uninitialized RAM hash, a fixed value on the simulator).

use ferrule_core::device::command::names;
use ferrule_core::device::{CommandName, CommandResult, Device, RandomDevice, Variant};

/// State used when asked to seed with zero, which xorshift cannot leave
const ZERO_SEED_REPLACEMENT: u64 = 0x9E37_79B9_7F4A_7C15;

#[derive(Debug, Clone)]
pub struct XorShiftRandom {
    state: u64,
}

impl XorShiftRandom {
    pub fn new(seed: u64) -> Self {
        let mut rng = Self { state: 0 };
        rng.seed(seed);
        rng
    }

    pub fn seed(&mut self, seed: u64) {
        self.state = if seed == 0 { ZERO_SEED_REPLACEMENT } else { seed };
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl Device for XorShiftRandom {
    fn description(&self) -> &'static str {
        "xorshift64"
    }

    fn command(&mut self, name: &CommandName<'_>, value: &mut Variant) -> CommandResult {
        if *name != names::SEED {
            return CommandResult::NotHandled;
        }
        match value.as_uint() {
            Some(seed) => {
                self.seed(seed as u64);
                CommandResult::Ok
            }
            None => CommandResult::Failed,
        }
    }
}

impl RandomDevice for XorShiftRandom {
    fn next_u32(&mut self) -> u32 {
        // high half has the better bits
        (self.next_u64() >> 32) as u32
    }
}
