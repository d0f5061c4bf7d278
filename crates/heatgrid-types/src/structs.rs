//! Snapshot and color structs for the Heatgrid simulation.
//!
//! These are the values handed to a presentation layer after each tick:
//! the rendered grid, the per-cell colors, and the control status.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CoolingMode, RunStatus};

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

/// An HSL color with integral components.
///
/// `hue` is in degrees (0 to 360), `saturation` and `lightness` are
/// percentages (0 to 100).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Hsl {
    /// Hue in degrees.
    pub hue: u16,
    /// Saturation percentage.
    pub saturation: u8,
    /// Lightness percentage.
    pub lightness: u8,
}

impl Hsl {
    /// Create a new color.
    pub const fn new(hue: u16, saturation: u8, lightness: u8) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }

    /// Format as a CSS color, e.g. `hsl(240, 80%, 50%)`.
    pub fn to_css(self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }

    /// Convert to 8-bit RGB.
    ///
    /// Saturation and lightness above 100 are treated as 100; the hue wraps
    /// at 360.
    pub fn to_rgb(self) -> Rgb {
        let s = f64::from(self.saturation.min(100)) / 100.0;
        let l = f64::from(self.lightness.min(100)) / 100.0;
        let h = f64::from(self.hue.checked_rem(360).unwrap_or(0)) / 60.0;

        let chroma = (1.0 - 2.0f64.mul_add(l, -1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let m = l - chroma / 2.0;

        let (r, g, b) = if h < 1.0 {
            (chroma, x, 0.0)
        } else if h < 2.0 {
            (x, chroma, 0.0)
        } else if h < 3.0 {
            (0.0, chroma, x)
        } else if h < 4.0 {
            (0.0, x, chroma)
        } else if h < 5.0 {
            (x, 0.0, chroma)
        } else {
            (chroma, 0.0, x)
        };

        Rgb {
            red: channel(r + m),
            green: channel(g + m),
            blue: channel(b + m),
        }
    }
}

/// Scale a unit-interval channel to 0..=255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn channel(unit: f64) -> u8 {
    // Clamped to [0, 255] before the cast.
    (unit.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// An 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Rgb {
    /// Red channel.
    pub red: u8,
    /// Green channel.
    pub green: u8,
    /// Blue channel.
    pub blue: u8,
}

// ---------------------------------------------------------------------------
// Grid snapshot
// ---------------------------------------------------------------------------

/// One rendered cell: its rounded temperature and its tile color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CellView {
    /// Temperature rounded to the nearest integer.
    pub temperature: i64,
    /// Background color derived from the unrounded temperature.
    pub color: Hsl,
}

/// Everything a presentation layer needs to draw one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GridSnapshot {
    /// Number of ticks executed so far (0 for the initial frame).
    pub tick: u64,
    /// Number of grid rows.
    pub rows: u32,
    /// Number of grid columns.
    pub cols: u32,
    /// Cells in row-major order, one inner vector per row.
    pub cells: Vec<Vec<CellView>>,
    /// Grid-wide maximum temperature, rounded.
    pub max_temp: i64,
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Serializable view of the control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SimulationStatus {
    /// Whether ticks are scheduled.
    pub run_status: RunStatus,
    /// Whether hotspot cooling applies.
    pub cooling_mode: CoolingMode,
    /// A start command would take effect.
    pub can_start: bool,
    /// A stop command would take effect.
    pub can_stop: bool,
    /// Caption for the hotspot cooling toggle.
    pub toggle_caption: String,
    /// Number of ticks executed so far.
    pub tick: u64,
    /// ISO 8601 timestamp of the most recent start, if any.
    pub started_at: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn near(actual: u8, expected: u8) -> bool {
        actual.abs_diff(expected) <= 1
    }

    #[test]
    fn css_format_matches_hsl_notation() {
        assert_eq!(Hsl::new(240, 80, 50).to_css(), "hsl(240, 80%, 50%)");
        assert_eq!(Hsl::new(0, 80, 50).to_css(), "hsl(0, 80%, 50%)");
    }

    #[test]
    fn blue_end_converts_to_blue() {
        let rgb = Hsl::new(240, 80, 50).to_rgb();
        assert!(near(rgb.red, 26));
        assert!(near(rgb.green, 26));
        assert!(near(rgb.blue, 230));
    }

    #[test]
    fn red_end_converts_to_red() {
        let rgb = Hsl::new(0, 80, 50).to_rgb();
        assert!(near(rgb.red, 230));
        assert!(near(rgb.green, 26));
        assert!(near(rgb.blue, 26));
    }

    #[test]
    fn green_midpoint_converts_to_green() {
        let rgb = Hsl::new(120, 80, 50).to_rgb();
        assert!(rgb.green > rgb.red);
        assert!(rgb.green > rgb.blue);
    }

    #[test]
    fn zero_saturation_is_grey() {
        let rgb = Hsl::new(200, 0, 50).to_rgb();
        assert_eq!(rgb.red, rgb.green);
        assert_eq!(rgb.green, rgb.blue);
    }
}
