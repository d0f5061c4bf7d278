//! Terminal renderer.
//!
//! Draws each frame as a block of colored tiles: every cell shows its
//! rounded temperature on a 24-bit background taken from the color mapper,
//! followed by a status line. The renderer is a [`TickCallback`], so it runs
//! after every tick and after every command.

use std::fmt::Write as _;
use std::io::Write;

use heatgrid_core::control::ControlEffect;
use heatgrid_core::runner::TickCallback;
use heatgrid_core::tick::{SimulationState, TickSummary};
use heatgrid_types::{GridSnapshot, SimulationStatus};
use tracing::warn;

/// ANSI sequence that clears the screen and homes the cursor.
const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// ANSI sequence resetting all attributes.
const RESET: &str = "\x1b[0m";

/// Hint printed under every frame.
const COMMAND_HINT: &str = "Commands: start | stop | toggle | quit";

/// Render a frame and its status line into a string.
///
/// With `color` disabled the tiles are plain right-aligned numbers, which
/// keeps piped output readable.
pub fn render_frame(snapshot: &GridSnapshot, status: &SimulationStatus, color: bool) -> String {
    let mut out = String::new();
    for row in &snapshot.cells {
        for cell in row {
            if color {
                let rgb = cell.color.to_rgb();
                let _ = write!(
                    out,
                    "\x1b[30;48;2;{};{};{}m{:>4} {RESET}",
                    rgb.red, rgb.green, rgb.blue, cell.temperature
                );
            } else {
                let _ = write!(out, "{:>4} ", cell.temperature);
            }
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "Status: {} | Hotspot cooling: {} | Max temp: {} | Tick: {}",
        status.run_status.label(),
        status.cooling_mode.label(),
        snapshot.max_temp,
        snapshot.tick
    );
    out.push_str(COMMAND_HINT);
    out.push('\n');
    out
}

/// Writes frames to a terminal (or any writer).
pub struct TerminalRenderer<W: Write + Send> {
    out: W,
    color: bool,
    clear_screen: bool,
}

impl<W: Write + Send> TerminalRenderer<W> {
    /// Create a renderer.
    ///
    /// `color` enables truecolor tiles; `clear_screen` redraws in place
    /// instead of scrolling.
    pub const fn new(out: W, color: bool, clear_screen: bool) -> Self {
        Self {
            out,
            color,
            clear_screen,
        }
    }

    /// Draw the current state.
    pub fn draw(&mut self, state: &SimulationState) {
        let mut frame = String::new();
        if self.clear_screen {
            frame.push_str(CLEAR_SCREEN);
        }
        frame.push_str(&render_frame(&state.snapshot(), &state.status(), self.color));

        let written = self
            .out
            .write_all(frame.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!(error = %e, "failed to write frame");
        }
    }

    /// Consume the renderer and return the writer.
    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> TickCallback for TerminalRenderer<W> {
    fn on_tick(&mut self, _summary: &TickSummary, state: &SimulationState) {
        self.draw(state);
    }

    fn on_control(&mut self, _effect: ControlEffect, state: &SimulationState) {
        self.draw(state);
    }
}
