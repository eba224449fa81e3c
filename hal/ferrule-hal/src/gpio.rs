//! GPIO pin abstractions
//!
//! Digital input and output pins as seen by board IO drivers. Buttons and
//! LEDs on evaluation boards are wired either way round, so each pin
//! carries the level that means "active".

/// Electrical level that counts as the active state of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 1 is active
    #[default]
    High,
    /// Logic 0 is active (pull-up buttons, sinking LEDs)
    Low,
}

impl Level {
    /// Translate a raw pin reading into an active/inactive flag
    pub fn is_active(self, high: bool) -> bool {
        match self {
            Level::High => high,
            Level::Low => !high,
        }
    }

    /// Raw pin state that produces the requested active/inactive flag
    pub fn raw(self, active: bool) -> bool {
        self.is_active(active)
    }
}

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }

    /// Check if the pin is currently set high
    fn is_set_high(&self) -> bool;
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}
