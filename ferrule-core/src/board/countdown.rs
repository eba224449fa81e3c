//! "Press to interrupt" countdown
//!
//! Used during bring-up to give the user a short window to hold a button
//! (skip a self test, enter a setup mode). The caller keeps calling
//! [`Mio::update`] and [`InputCountdown::poll`] until the state is final.

use crate::device::{Code, Space, When};
use crate::mio::{InputGroup, Mio};
use crate::Ticks;

use super::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CountdownState {
    /// Still waiting; milliseconds left
    Running(Ticks),
    /// The input went active before the deadline
    Pressed,
    /// Deadline reached without a press
    Expired,
    /// The input has no mapping, there is nothing to wait for
    Unmapped,
}

impl CountdownState {
    pub fn is_final(self) -> bool {
        !matches!(self, CountdownState::Running(_))
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InputCountdown {
    group: InputGroup,
    code: Code,
    started: Ticks,
    duration: Ticks,
    mapped: bool,
}

impl InputCountdown {
    /// Start waiting `duration` ms for `(group, Bit, code)`
    ///
    /// Prints `message` followed by the driver name of the line, if mapped.
    pub fn start(
        console: &mut Console<'_>,
        mio: &Mio<'_>,
        group: InputGroup,
        code: Code,
        duration: Ticks,
        now: Ticks,
        message: &str,
    ) -> Self {
        let mapped = match mio.mapped_name(group, Space::Bit, code) {
            Some(name) => {
                console.line(format_args!("{} [{}]", message, name));
                true
            }
            None => false,
        };
        Self {
            group,
            code,
            started: now,
            duration,
            mapped,
        }
    }

    pub fn poll(&self, mio: &mut Mio<'_>, now: Ticks) -> CountdownState {
        if !self.mapped {
            return CountdownState::Unmapped;
        }
        let elapsed = now.wrapping_sub(self.started);
        if elapsed >= self.duration {
            return CountdownState::Expired;
        }
        if mio.get_input(self.group, Space::Bit, self.code, When::Buffer) != 0 {
            return CountdownState::Pressed;
        }
        CountdownState::Running(self.duration - elapsed)
    }

    /// Elapsed share of the window, 0 to 100
    pub fn progress(&self, now: Ticks) -> u32 {
        let elapsed = now.wrapping_sub(self.started).min(self.duration);
        if self.duration == 0 {
            return 100;
        }
        (elapsed as u64 * 100 / self.duration as u64) as u32
    }
}
