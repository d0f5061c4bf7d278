//! Grid, thermal steps, color mapping, and tick loop for the Heatgrid
//! simulation.
//!
//! Each tick spikes random cells, cools every cell toward ambient (with
//! extra cooling for hotspots when enabled), and hands the result to a
//! presentation callback.
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter with checked arithmetic.
//! - [`color`] -- Temperature to HSL tile color mapping.
//! - [`config`] -- Configuration loading from `heatgrid-config.yaml` into
//!   strongly-typed structs.
//! - [`control`] -- Start/stop/toggle control state.
//! - [`grid`] -- The fixed-size temperature grid.
//! - [`runner`] -- The timer-driven loop that applies commands and ticks.
//! - [`thermal`] -- Spike and cool steps.
//! - [`tick`] -- Simulation state and the single-tick function.

pub mod clock;
pub mod color;
pub mod config;
pub mod control;
pub mod grid;
pub mod runner;
pub mod thermal;
pub mod tick;
