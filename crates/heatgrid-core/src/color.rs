//! Temperature to color mapping.
//!
//! Temperatures between [`COLOR_MIN_TEMP`] and [`COLOR_MAX_TEMP`] are spread
//! linearly across the hue wheel from blue (240) down to red (0). Values
//! outside the band are clamped, so everything at or below 80 is the same
//! blue and everything at or above 120 is the same red. Saturation and
//! lightness are fixed.

use heatgrid_types::Hsl;

/// Temperature mapped to the coldest hue.
pub const COLOR_MIN_TEMP: f64 = 80.0;

/// Temperature mapped to the hottest hue.
pub const COLOR_MAX_TEMP: f64 = 120.0;

/// Hue used for [`COLOR_MIN_TEMP`] and below (blue).
pub const COLD_HUE: u16 = 240;

/// Fixed saturation percentage.
pub const TILE_SATURATION: u8 = 80;

/// Fixed lightness percentage.
pub const TILE_LIGHTNESS: u8 = 50;

/// Map a temperature to its tile color.
///
/// `hue = 240 - round(240 * ratio)` where `ratio` is the clamped temperature's
/// position within the color band. A NaN temperature maps to the cold end.
pub fn map_temperature_to_color(temp: f64) -> Hsl {
    let clamped = if temp.is_nan() {
        COLOR_MIN_TEMP
    } else {
        temp.clamp(COLOR_MIN_TEMP, COLOR_MAX_TEMP)
    };
    let ratio = (clamped - COLOR_MIN_TEMP) / (COLOR_MAX_TEMP - COLOR_MIN_TEMP);
    let cold = f64::from(COLD_HUE);
    let hue = cold - round_half_up(cold * ratio);
    Hsl::new(hue_from_f64(hue), TILE_SATURATION, TILE_LIGHTNESS)
}

/// Round to the nearest integer, with halves going toward positive infinity.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round a temperature for display.
///
/// Non-finite values saturate (NaN becomes 0).
#[allow(clippy::cast_possible_truncation)]
pub fn rounded_temperature(value: f64) -> i64 {
    // `as` saturates at the i64 bounds.
    round_half_up(value) as i64
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn hue_from_f64(hue: f64) -> u16 {
    // Always within 0..=240 after clamping.
    hue.clamp(0.0, f64::from(COLD_HUE)) as u16
}
