//! Enumeration types for the Heatgrid simulation.
//!
//! Control-plane vocabulary shared by the engine, the tick runner, and any
//! presentation layer: the commands a user can issue and the labels used to
//! describe the current run state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

/// A user command that mutates the simulation's control state.
///
/// Commands never touch the grid directly. They only decide whether the
/// periodic tick is scheduled and whether hotspot cooling applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export, export_to = "bindings/")]
pub enum Command {
    /// Begin periodic ticking. No-op if already running.
    Start,
    /// Cancel periodic ticking. No-op if not running.
    Stop,
    /// Flip the hotspot cooling flag. Takes effect on the next cool step.
    ToggleHotspotCooling,
    /// End the run loop.
    Quit,
}

impl Command {
    /// The canonical textual form accepted by [`Command::from_str`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::ToggleHotspotCooling => "toggle-hotspot-cooling",
            Self::Quit => "quit",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a line of input does not name a known command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command: {input:?}")]
pub struct ParseCommandError {
    /// The trimmed input that failed to parse.
    pub input: String,
}

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Parse a command, ignoring case and surrounding whitespace.
    ///
    /// `toggle` and `cool` are accepted as shorthands for
    /// `toggle-hotspot-cooling`; `exit` and `q` for `quit`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            "toggle-hotspot-cooling" | "toggle" | "cool" => Ok(Self::ToggleHotspotCooling),
            "quit" | "exit" | "q" => Ok(Self::Quit),
            _ => Err(ParseCommandError {
                input: trimmed.to_owned(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Status labels
// ---------------------------------------------------------------------------

/// Whether the periodic tick is currently scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RunStatus {
    /// Ticks fire on every interval.
    Running,
    /// No ticks are scheduled.
    Stopped,
}

impl RunStatus {
    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Stopped => "Stopped",
        }
    }
}

impl From<bool> for RunStatus {
    fn from(running: bool) -> Self {
        if running { Self::Running } else { Self::Stopped }
    }
}

/// Whether the extra hotspot cooling pass is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CoolingMode {
    /// Hotspots lose the additional cooling rate each tick.
    Active,
    /// Only natural cooling applies.
    Inactive,
}

impl CoolingMode {
    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        }
    }

    /// Caption for a control that flips the mode.
    pub const fn toggle_caption(self) -> &'static str {
        match self {
            Self::Active => "Deactivate Hotspot Cooling",
            Self::Inactive => "Activate Hotspot Cooling",
        }
    }
}

impl From<bool> for CoolingMode {
    fn from(active: bool) -> Self {
        if active { Self::Active } else { Self::Inactive }
    }
}
