//! Shared type definitions for the Heatgrid simulation.
//!
//! Types defined here flow to any presentation layer: the engine's terminal
//! renderer uses them directly, and `ts-rs` exports them to `TypeScript` for
//! a browser front end.
//!
//! # Modules
//!
//! - [`enums`] -- Commands and status labels
//! - [`structs`] -- Colors, grid snapshots, and the control status view

pub mod enums;
pub mod structs;

pub use enums::{Command, CoolingMode, ParseCommandError, RunStatus};
pub use structs::{CellView, GridSnapshot, Hsl, Rgb, SimulationStatus};
