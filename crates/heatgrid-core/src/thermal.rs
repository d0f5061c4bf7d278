//! Spike and cool steps applied to the grid once per tick.
//!
//! 1. **Spike** -- every cell independently, with probability
//!    `spike_chance`, gains `uniform_int(spike_min, spike_max)` degrees.
//! 2. **Cool** -- every cell above ambient loses `natural_cool_rate`. If
//!    hotspot cooling is active and the naturally cooled value is still at or
//!    above the hotspot threshold, it loses `cooling_rate` more. The result
//!    never drops below ambient.
//!
//! Both steps are total: they cannot fail on a well-formed grid.

use rand::Rng;

use crate::config::GridConfig;
use crate::grid::TemperatureGrid;

/// Counters describing what one cool step did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoolingOutcome {
    /// Cells that received the extra hotspot cooling.
    pub hotspots_cooled: u32,
    /// Cells that sat exactly at ambient after the step.
    pub at_ambient: u32,
}

/// Apply random spikes to the grid. Returns the number of cells spiked.
pub fn spike_cells(grid: &mut TemperatureGrid, config: &GridConfig, rng: &mut impl Rng) -> u32 {
    let mut spiked: u32 = 0;
    for cell in grid.cells_mut() {
        if rng.random_bool(config.spike_chance) {
            let amount: u32 = rng.random_range(config.spike_min..=config.spike_max);
            *cell += f64::from(amount);
            spiked = spiked.saturating_add(1);
        }
    }
    spiked
}

/// Cool a single cell value.
///
/// Returns the new value and whether hotspot cooling applied.
pub fn cool_cell(value: f64, config: &GridConfig, hotspot_cooling_active: bool) -> (f64, bool) {
    let ambient = config.ambient_temp;
    let mut current = value;

    if current > ambient {
        current -= config.natural_cool_rate;
    }

    let hotspot = hotspot_cooling_active && current >= config.hotspot_threshold();
    if hotspot {
        current -= config.cooling_rate;
    }

    (current.max(ambient), hotspot)
}

/// Cool every cell in the grid.
pub fn cool_cells(
    grid: &mut TemperatureGrid,
    config: &GridConfig,
    hotspot_cooling_active: bool,
) -> CoolingOutcome {
    let mut outcome = CoolingOutcome::default();
    for cell in grid.cells_mut() {
        let (cooled, hotspot) = cool_cell(*cell, config, hotspot_cooling_active);
        *cell = cooled;
        if hotspot {
            outcome.hotspots_cooled = outcome.hotspots_cooled.saturating_add(1);
        }
        if cooled <= config.ambient_temp {
            outcome.at_ambient = outcome.at_ambient.saturating_add(1);
        }
    }
    outcome
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn demo_config() -> GridConfig {
        GridConfig {
            ambient_temp: 75.0,
            natural_cool_rate: 1.0,
            cooling_rate: 5.0,
            hotspot_margin: 15.0,
            ..GridConfig::default()
        }
    }

    #[test]
    fn hotspot_with_cooling_active_drops_by_both_rates() {
        // 95 - 1 = 94 >= 90, so another 5 comes off.
        assert_eq!(cool_cell(95.0, &demo_config(), true), (89.0, true));
    }

    #[test]
    fn hotspot_with_cooling_inactive_drops_by_natural_rate() {
        assert_eq!(cool_cell(95.0, &demo_config(), false), (94.0, false));
    }

    #[test]
    fn cell_just_above_ambient_lands_on_ambient() {
        assert_eq!(cool_cell(76.0, &demo_config(), false), (75.0, false));
    }

    #[test]
    fn threshold_is_checked_after_natural_cooling() {
        // 90 - 1 = 89 < 90: not a hotspot any more.
        assert_eq!(cool_cell(90.0, &demo_config(), true), (89.0, false));
        // 91 - 1 = 90 >= 90: hotspot.
        assert_eq!(cool_cell(91.0, &demo_config(), true), (85.0, true));
    }

    #[test]
    fn cooling_clamps_at_ambient() {
        let config = GridConfig {
            cooling_rate: 50.0,
            ..demo_config()
        };
        assert_eq!(cool_cell(95.0, &config, true), (75.0, true));

        let fractional = GridConfig {
            natural_cool_rate: 2.5,
            ..demo_config()
        };
        assert_eq!(cool_cell(76.0, &fractional, false), (75.0, false));
    }

    #[test]
    fn ambient_cell_is_left_alone() {
        assert_eq!(cool_cell(75.0, &demo_config(), true), (75.0, false));
    }

    #[test]
    fn cell_below_ambient_is_raised_to_floor() {
        assert_eq!(cool_cell(70.0, &demo_config(), false), (75.0, false));
    }

    #[test]
    fn ambient_plus_twenty_drops_by_both_rates_only_when_active() {
        let config = demo_config();
        let start = config.ambient_temp + 20.0;
        let (active, _) = cool_cell(start, &config, true);
        let (inactive, _) = cool_cell(start, &config, false);
        assert_eq!(start - active, config.natural_cool_rate + config.cooling_rate);
        assert_eq!(start - inactive, config.natural_cool_rate);
    }

    #[test]
    fn cool_cells_reports_hotspots() {
        let config = demo_config();
        let mut grid =
            TemperatureGrid::from_rows(vec![vec![95.0, 76.0], vec![75.0, 100.0]]).unwrap();
        let outcome = cool_cells(&mut grid, &config, true);
        assert_eq!(grid.cells(), &[89.0, 75.0, 75.0, 94.0]);
        assert_eq!(outcome.hotspots_cooled, 2);
        assert_eq!(outcome.at_ambient, 2);
    }

    #[test]
    fn zero_spike_chance_never_spikes() {
        let config = GridConfig {
            spike_chance: 0.0,
            ..demo_config()
        };
        let mut grid = TemperatureGrid::filled(8, 8, 75.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(spike_cells(&mut grid, &config, &mut rng), 0);
        }
        assert!(grid.cells().iter().all(|&t| t == 75.0));
    }

    #[test]
    fn certain_spike_hits_every_cell_within_range() {
        let config = GridConfig {
            spike_chance: 1.0,
            spike_min: 10,
            spike_max: 25,
            ..demo_config()
        };
        let mut grid = TemperatureGrid::filled(4, 4, 75.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(2);
        assert_eq!(spike_cells(&mut grid, &config, &mut rng), 16);
        for &temp in grid.cells() {
            assert!((85.0..=100.0).contains(&temp), "spike out of range: {temp}");
        }
    }

    #[test]
    fn fixed_spike_range_adds_exact_amount() {
        let config = GridConfig {
            spike_chance: 1.0,
            spike_min: 12,
            spike_max: 12,
            ..demo_config()
        };
        let mut grid = TemperatureGrid::filled(1, 3, 80.0).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let _ = spike_cells(&mut grid, &config, &mut rng);
        assert_eq!(grid.cells(), &[92.0, 92.0, 92.0]);
    }
}
