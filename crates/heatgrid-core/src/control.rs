//! Control state for runtime simulation management.
//!
//! The user (through the engine's command reader) can start and stop the
//! periodic tick, toggle hotspot cooling, and quit. Commands only flip these
//! flags; the simulation itself never changes them.
//!
//! The runner owns the control state alongside the grid and applies commands
//! between ticks, so no atomics or locks are needed.

use chrono::{DateTime, Utc};
use heatgrid_types::{Command, CoolingMode, RunStatus, SimulationStatus};

/// What a command actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlEffect {
    /// The simulation went from stopped to running.
    Started,
    /// The simulation went from running to stopped.
    Stopped,
    /// Hotspot cooling flipped; carries the new value.
    CoolingToggled {
        /// Whether hotspot cooling is now active.
        active: bool,
    },
    /// The command had no effect (start while running, stop while stopped).
    Unchanged,
    /// The run loop should end.
    QuitRequested,
}

/// The two user-controlled flags plus the time of the last start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlState {
    running: bool,
    hotspot_cooling_active: bool,
    started_at: Option<DateTime<Utc>>,
}

impl ControlState {
    /// Stopped, with hotspot cooling inactive.
    pub const fn new() -> Self {
        Self {
            running: false,
            hotspot_cooling_active: false,
            started_at: None,
        }
    }

    /// Apply a command and report what changed.
    pub fn apply(&mut self, command: Command) -> ControlEffect {
        match command {
            Command::Start => self.start(),
            Command::Stop => self.stop(),
            Command::ToggleHotspotCooling => self.toggle_hotspot_cooling(),
            Command::Quit => ControlEffect::QuitRequested,
        }
    }

    /// Begin ticking. No-op if already running.
    pub fn start(&mut self) -> ControlEffect {
        if self.running {
            return ControlEffect::Unchanged;
        }
        self.running = true;
        self.started_at = Some(Utc::now());
        ControlEffect::Started
    }

    /// Stop ticking. No-op if not running.
    pub const fn stop(&mut self) -> ControlEffect {
        if !self.running {
            return ControlEffect::Unchanged;
        }
        self.running = false;
        ControlEffect::Stopped
    }

    /// Flip hotspot cooling.
    pub const fn toggle_hotspot_cooling(&mut self) -> ControlEffect {
        self.hotspot_cooling_active = !self.hotspot_cooling_active;
        ControlEffect::CoolingToggled {
            active: self.hotspot_cooling_active,
        }
    }

    /// Whether the periodic tick is scheduled.
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the next cool step applies hotspot cooling.
    pub const fn hotspot_cooling_active(&self) -> bool {
        self.hotspot_cooling_active
    }

    /// Wall-clock time of the most recent start, if any.
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Serializable status for a presentation layer.
    pub fn status(&self, tick: u64) -> SimulationStatus {
        let cooling_mode = CoolingMode::from(self.hotspot_cooling_active);
        SimulationStatus {
            run_status: RunStatus::from(self.running),
            cooling_mode,
            can_start: !self.running,
            can_stop: self.running,
            toggle_caption: cooling_mode.toggle_caption().to_owned(),
            tick,
            started_at: self.started_at.map(|t| t.to_rfc3339()),
        }
    }
}
