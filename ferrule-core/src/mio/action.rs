//! Switch action detection
//!
//! Turns the per-frame level of a Bit input into discrete events: a
//! debounced press, a click, a double click, a long hold and the release
//! that ends a hold.

use crate::Ticks;

/// Held at least this long before a press is reported
pub const DEBOUNCE_MS: Ticks = 50;
/// Released within this long after the press counts as a click
pub const CLICK_WINDOW_MS: Ticks = 400;
/// A click with no follow-up click within this long is reported as Clicked
pub const CLICK_TIMEOUT_MS: Ticks = 300;
/// Second click within this long of the first is a double click
pub const DOUBLE_CLICK_MS: Ticks = 800;
/// Held longer than this becomes a hold
pub const HOLD_MS: Ticks = 1000;

/// Event reported for one Bit line during an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputAction {
    #[default]
    None,
    Pressed,
    Clicked,
    DoubleClicked,
    OnHold,
    Released,
}

impl InputAction {
    const COUNT: usize = 6;

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Debouncing,
    Pressed,
    Holding,
}

/// Per-line action detector
///
/// Every event is an edge: [`last`](Self::last) reports what the most
/// recent update produced and drops back to `None` on the next quiet
/// frame. Use [`count`](Self::count) to see whether something happened
/// since an earlier point.
#[derive(Debug, Clone, Copy)]
pub struct ActionTracker {
    phase: Phase,
    active: bool,
    hold_started: Ticks,
    last_click: Option<Ticks>,
    last: InputAction,
    counts: [u32; InputAction::COUNT],
}

impl ActionTracker {
    pub const fn new() -> Self {
        Self {
            phase: Phase::Idle,
            active: false,
            hold_started: 0,
            last_click: None,
            last: InputAction::None,
            counts: [0; InputAction::COUNT],
        }
    }

    /// Event produced by the most recent update
    pub fn last(&self) -> InputAction {
        self.last
    }

    /// Number of times `action` has been reported
    pub fn count(&self, action: InputAction) -> u32 {
        self.counts[action.index()]
    }

    /// Feed the current line level sampled at `now`
    pub fn update(&mut self, now: Ticks, active: bool) -> InputAction {
        let was = self.active;
        self.active = active;
        let held = now.wrapping_sub(self.hold_started);

        let action = match (was, active) {
            (false, false) => match self.last_click {
                Some(at) if now.wrapping_sub(at) >= CLICK_TIMEOUT_MS => {
                    self.last_click = None;
                    InputAction::Clicked
                }
                _ => InputAction::None,
            },
            (false, true) => {
                self.hold_started = now;
                self.phase = Phase::Debouncing;
                InputAction::None
            }
            (true, false) => self.release(now, held),
            (true, true) => match self.phase {
                Phase::Debouncing if held > DEBOUNCE_MS => {
                    self.phase = Phase::Pressed;
                    InputAction::Pressed
                }
                Phase::Pressed if held > HOLD_MS => {
                    self.phase = Phase::Holding;
                    InputAction::OnHold
                }
                Phase::Holding => InputAction::OnHold,
                _ => InputAction::None,
            },
        };

        if action != InputAction::None {
            let count = &mut self.counts[action.index()];
            *count = count.saturating_add(1);
        }
        self.last = action;
        action
    }

    fn release(&mut self, now: Ticks, held: Ticks) -> InputAction {
        let phase = core::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            // never got past debounce
            Phase::Idle | Phase::Debouncing => InputAction::None,
            Phase::Holding => InputAction::Released,
            Phase::Pressed if held < CLICK_WINDOW_MS => match self.last_click {
                Some(at) if now.wrapping_sub(at) < DOUBLE_CLICK_MS => {
                    self.last_click = None;
                    InputAction::DoubleClicked
                }
                _ => {
                    self.last_click = Some(now);
                    InputAction::None
                }
            },
            Phase::Pressed => InputAction::None,
        }
    }
}

impl Default for ActionTracker {
    fn default() -> Self {
        Self::new()
    }
}
