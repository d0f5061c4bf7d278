//! Tick clock for the Heatgrid simulation.
//!
//! The clock is the single source of truth for how many ticks have run. It
//! starts at 0 (the initial frame) and advances once per executed tick with
//! checked arithmetic. Stopping and restarting the simulation does not reset
//! it.

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// Tick counter would overflow.
    #[error("tick counter overflow: cannot advance beyond u64::MAX")]
    TickOverflow,
}

/// Counter of executed ticks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickClock {
    /// Number of ticks executed so far.
    tick: u64,
}

impl TickClock {
    /// Create a clock at tick 0.
    pub const fn new() -> Self {
        Self { tick: 0 }
    }

    /// Create a clock at an arbitrary tick (useful for testing).
    pub const fn from_tick(tick: u64) -> Self {
        Self { tick }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::TickOverflow`] if the tick counter would exceed
    /// `u64::MAX`.
    pub fn advance(&mut self) -> Result<u64, ClockError> {
        self.tick = self.tick.checked_add(1).ok_or(ClockError::TickOverflow)?;
        Ok(self.tick)
    }

    /// Return the current tick number.
    pub const fn tick(&self) -> u64 {
        self.tick
    }
}
