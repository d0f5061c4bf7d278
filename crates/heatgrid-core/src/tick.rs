//! Tick cycle: one discrete simulation step.
//!
//! Each tick runs these phases in order:
//!
//! 1. **Clock** -- advance the tick counter.
//! 2. **Spike** -- random per-cell temperature increases.
//! 3. **Cool** -- natural cooling plus optional hotspot cooling, floored at
//!    ambient.
//! 4. **Summarize** -- report what happened; rendering is left to the
//!    runner's [`TickCallback`].
//!
//! The tick is synchronous and deterministic given the RNG state.
//!
//! [`TickCallback`]: crate::runner::TickCallback

use heatgrid_types::{GridSnapshot, SimulationStatus};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::debug;

use crate::clock::TickClock;
use crate::config::{GridConfig, SimulationConfig};
use crate::control::ControlState;
use crate::grid::{GridError, TemperatureGrid};
use crate::thermal;

/// Errors that can occur during tick execution.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: crate::clock::ClockError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Cells that received a spike.
    pub spiked_cells: u32,
    /// Cells that received extra hotspot cooling.
    pub hotspots_cooled: u32,
    /// Whether hotspot cooling was active for this tick's cool step.
    pub hotspot_cooling_active: bool,
    /// Grid-wide maximum temperature after the tick (unrounded).
    pub max_temp: f64,
}

/// The mutable simulation state passed through the tick cycle.
///
/// Bundles everything a tick touches. There is no process-wide state: the
/// runner owns one of these and lends it to each tick and callback.
#[derive(Debug)]
pub struct SimulationState {
    /// Tick counter.
    pub clock: TickClock,
    /// Cell temperatures.
    pub grid: TemperatureGrid,
    /// User-controlled flags.
    pub control: ControlState,
    /// Thermal parameters.
    pub grid_config: GridConfig,
    /// Source of spike randomness.
    pub rng: SmallRng,
}

impl SimulationState {
    /// Build the initial state from configuration.
    ///
    /// Seeds the RNG from `world.seed` when set, otherwise from the
    /// operating system, then fills the grid with near-ambient values.
    ///
    /// # Errors
    ///
    /// Returns [`GridError`] if the configured dimensions are unusable.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, GridError> {
        let rng = config
            .world
            .seed
            .map_or_else(SmallRng::from_os_rng, SmallRng::seed_from_u64);
        Self::new(config.grid.clone(), rng)
    }

    /// Build the initial state with an explicit RNG.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] if `grid_config` fails
    /// validation, or another [`GridError`] if the dimensions are unusable.
    pub fn new(grid_config: GridConfig, mut rng: SmallRng) -> Result<Self, GridError> {
        let grid = TemperatureGrid::initialize(&grid_config, &mut rng)?;
        Self::with_grid(grid, grid_config, rng)
    }

    /// Wrap an existing grid (useful for testing and scripted scenarios).
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] if `grid_config` fails
    /// validation; spike sampling relies on a valid chance and range.
    pub fn with_grid(
        grid: TemperatureGrid,
        grid_config: GridConfig,
        rng: SmallRng,
    ) -> Result<Self, GridError> {
        grid_config.validate()?;
        Ok(Self {
            clock: TickClock::new(),
            grid,
            control: ControlState::new(),
            grid_config,
            rng,
        })
    }

    /// Current frame for a presentation layer.
    pub fn snapshot(&self) -> GridSnapshot {
        self.grid.snapshot(self.clock.tick())
    }

    /// Current control status for a presentation layer.
    pub fn status(&self) -> SimulationStatus {
        self.control.status(self.clock.tick())
    }
}

/// Execute one complete tick of the simulation.
///
/// Spikes and cools unconditionally; whether ticks happen at all is the
/// runner's concern.
///
/// # Errors
///
/// Returns [`TickError::Clock`] if the tick counter would overflow.
pub fn run_tick(state: &mut SimulationState) -> Result<TickSummary, TickError> {
    let tick = state.clock.advance()?;
    let hotspot_cooling_active = state.control.hotspot_cooling_active();

    let spiked_cells = thermal::spike_cells(&mut state.grid, &state.grid_config, &mut state.rng);
    let cooling = thermal::cool_cells(&mut state.grid, &state.grid_config, hotspot_cooling_active);
    let max_temp = state.grid.max_temp();

    debug!(
        tick,
        spiked_cells,
        hotspots_cooled = cooling.hotspots_cooled,
        at_ambient = cooling.at_ambient,
        max_temp,
        "Tick complete"
    );

    Ok(TickSummary {
        tick,
        spiked_cells,
        hotspots_cooled: cooling.hotspots_cooled,
        hotspot_cooling_active,
        max_temp,
    })
}
