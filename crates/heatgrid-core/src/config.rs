//! Configuration loading and typed config structures for the Heatgrid
//! simulation.
//!
//! The configuration lives in `heatgrid-config.yaml`. This module defines
//! strongly-typed structs that mirror the YAML structure and a loader that
//! reads and validates the file. Every field has a default, so an empty file
//! (or no file at all) yields the classic 8x8 demo.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The configuration parsed but holds values the simulation cannot use.
    #[error("invalid configuration: {reason}")]
    Invalid {
        /// Explanation of what is wrong with the configuration.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `heatgrid-config.yaml`. Fixed for the process
/// lifetime once loaded.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (name, seed, timing, autostart).
    #[serde(default)]
    pub world: WorldConfig,

    /// Grid dimensions and thermal parameters.
    #[serde(default)]
    pub grid: GridConfig,

    /// Simulation boundary parameters.
    #[serde(default)]
    pub simulation: SimulationBoundsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load and validate configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // serde_yml rejects an empty document; treat it as "all defaults".
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value the simulation depends on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        if self.world.tick_interval_ms == 0 {
            return Err(invalid("world.tick_interval_ms must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Invalid {
        reason: reason.to_owned(),
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Random seed for reproducible runs. Unset means a fresh seed from
    /// the operating system on every run.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Real-time milliseconds between ticks while running.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Start ticking immediately instead of waiting for a `start` command.
    #[serde(default)]
    pub autostart: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: None,
            tick_interval_ms: default_tick_interval_ms(),
            autostart: false,
        }
    }
}

/// Grid dimensions and thermal parameters.
///
/// Temperatures are plain scalars in the same unit as `ambient_temp`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    /// Number of grid rows.
    #[serde(default = "default_rows")]
    pub rows: u32,

    /// Number of grid columns.
    #[serde(default = "default_cols")]
    pub cols: u32,

    /// Floor temperature cells cool toward and never drop below.
    #[serde(default = "default_ambient_temp")]
    pub ambient_temp: f64,

    /// Largest jitter added above ambient at initialization (inclusive).
    #[serde(default = "default_initial_jitter")]
    pub initial_jitter: u32,

    /// Per-cell, per-tick probability of a spike (0.0 to 1.0).
    #[serde(default = "default_spike_chance")]
    pub spike_chance: f64,

    /// Smallest spike magnitude (inclusive).
    #[serde(default = "default_spike_min")]
    pub spike_min: u32,

    /// Largest spike magnitude (inclusive).
    #[serde(default = "default_spike_max")]
    pub spike_max: u32,

    /// Degrees lost every tick by any cell above ambient.
    #[serde(default = "default_natural_cool_rate")]
    pub natural_cool_rate: f64,

    /// Extra degrees lost by hotspots while hotspot cooling is active.
    #[serde(default = "default_cooling_rate")]
    pub cooling_rate: f64,

    /// Distance above ambient at which a cell counts as a hotspot.
    #[serde(default = "default_hotspot_margin")]
    pub hotspot_margin: f64,
}

impl GridConfig {
    /// Temperature at or above which a cell is a hotspot.
    pub fn hotspot_threshold(&self) -> f64 {
        self.ambient_temp + self.hotspot_margin
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        usize::try_from(u64::from(self.rows).saturating_mul(u64::from(self.cols)))
            .unwrap_or(usize::MAX)
    }

    /// Check dimensions, spike parameters, and rates.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows == 0 || self.cols == 0 {
            return Err(invalid("grid.rows and grid.cols must be at least 1"));
        }
        if !self.ambient_temp.is_finite() {
            return Err(invalid("grid.ambient_temp must be a finite number"));
        }
        if !(0.0..=1.0).contains(&self.spike_chance) {
            return Err(invalid("grid.spike_chance must be between 0.0 and 1.0"));
        }
        if self.spike_min > self.spike_max {
            return Err(invalid("grid.spike_min must not exceed grid.spike_max"));
        }
        for (name, rate) in [
            ("grid.natural_cool_rate", self.natural_cool_rate),
            ("grid.cooling_rate", self.cooling_rate),
            ("grid.hotspot_margin", self.hotspot_margin),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(ConfigError::Invalid {
                    reason: format!("{name} must be a non-negative finite number"),
                });
            }
        }
        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            ambient_temp: default_ambient_temp(),
            initial_jitter: default_initial_jitter(),
            spike_chance: default_spike_chance(),
            spike_min: default_spike_min(),
            spike_max: default_spike_max(),
            natural_cool_rate: default_natural_cool_rate(),
            cooling_rate: default_cooling_rate(),
            hotspot_margin: default_hotspot_margin(),
        }
    }
}

/// Simulation boundary parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimulationBoundsConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

/// Output format for log lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Heatgrid")
}

const fn default_tick_interval_ms() -> u64 {
    800
}

const fn default_rows() -> u32 {
    8
}

const fn default_cols() -> u32 {
    8
}

const fn default_ambient_temp() -> f64 {
    75.0
}

const fn default_initial_jitter() -> u32 {
    4
}

const fn default_spike_chance() -> f64 {
    0.1
}

const fn default_spike_min() -> u32 {
    10
}

const fn default_spike_max() -> u32 {
    25
}

const fn default_natural_cool_rate() -> f64 {
    1.0
}

const fn default_cooling_rate() -> f64 {
    5.0
}

const fn default_hotspot_margin() -> f64 {
    15.0
}

fn default_log_level() -> String {
    String::from("info")
}
