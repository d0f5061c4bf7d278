//! The temperature grid.
//!
//! A fixed-size, row-major array of scalar temperatures. Dimensions are set
//! at construction and never change; values are mutated in place by the
//! thermal steps in [`crate::thermal`].

use heatgrid_types::{CellView, GridSnapshot};
use rand::Rng;

use crate::color::{map_temperature_to_color, rounded_temperature};
use crate::config::{ConfigError, GridConfig};

/// Errors that can occur when building or addressing a grid.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    /// A grid must have at least one row and one column.
    #[error("grid must have at least one row and one column")]
    Empty,

    /// Rows passed to [`TemperatureGrid::from_rows`] differ in length.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// The grid is too large to address.
    #[error("grid dimensions exceed the supported range")]
    TooLarge,

    /// The grid parameters failed validation.
    #[error("invalid grid config: {source}")]
    InvalidConfig {
        /// The underlying validation error.
        #[from]
        source: ConfigError,
    },

    /// A coordinate lies outside the grid.
    #[error("cell ({row}, {col}) is outside the grid")]
    OutOfBounds {
        /// Requested row.
        row: u32,
        /// Requested column.
        col: u32,
    },
}

/// Rectangular array of cell temperatures.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureGrid {
    rows: u32,
    cols: u32,
    /// Row-major cell values; `len == rows * cols`.
    cells: Vec<f64>,
}

impl TemperatureGrid {
    /// Create a grid with every cell at `value`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] if either dimension is zero, or
    /// [`GridError::TooLarge`] if the cell count does not fit in memory
    /// addressing.
    pub fn filled(rows: u32, cols: u32, value: f64) -> Result<Self, GridError> {
        let len = cell_count(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![value; len],
        })
    }

    /// Create a grid of near-ambient cells.
    ///
    /// Each cell starts at `ambient + uniform_int(0, initial_jitter)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] if `config` fails validation,
    /// otherwise the same errors as [`TemperatureGrid::filled`].
    pub fn initialize(config: &GridConfig, rng: &mut impl Rng) -> Result<Self, GridError> {
        config.validate()?;
        let mut grid = Self::filled(config.rows, config.cols, config.ambient_temp)?;
        for cell in &mut grid.cells {
            let jitter: u32 = rng.random_range(0..=config.initial_jitter);
            *cell += f64::from(jitter);
        }
        Ok(grid)
    }

    /// Build a grid from explicit rows.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::Empty`] for no rows or empty rows,
    /// [`GridError::Ragged`] if rows differ in length, or
    /// [`GridError::TooLarge`] if a dimension exceeds `u32`.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, GridError> {
        let expected = rows.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::Empty);
        }
        for (row, values) in rows.iter().enumerate() {
            if values.len() != expected {
                return Err(GridError::Ragged {
                    row,
                    expected,
                    found: values.len(),
                });
            }
        }
        let row_count = u32::try_from(rows.len()).map_err(|_err| GridError::TooLarge)?;
        let col_count = u32::try_from(expected).map_err(|_err| GridError::TooLarge)?;
        Ok(Self {
            rows: row_count,
            cols: col_count,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows.
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns.
    pub const fn cols(&self) -> u32 {
        self.cols
    }

    /// Temperature at `(row, col)`, or `None` outside the grid.
    pub fn get(&self, row: u32, col: u32) -> Option<f64> {
        self.index(row, col).and_then(|i| self.cells.get(i).copied())
    }

    /// Overwrite the temperature at `(row, col)`.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::OutOfBounds`] outside the grid.
    pub fn set(&mut self, row: u32, col: u32, value: f64) -> Result<(), GridError> {
        let cell = self
            .index(row, col)
            .and_then(|i| self.cells.get_mut(i))
            .ok_or(GridError::OutOfBounds { row, col })?;
        *cell = value;
        Ok(())
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> &[f64] {
        &self.cells
    }

    /// Mutable access to all cells in row-major order.
    pub fn cells_mut(&mut self) -> &mut [f64] {
        &mut self.cells
    }

    /// Iterate over rows as slices.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // cols >= 1 by construction.
        self.cells.chunks(usize::try_from(self.cols).unwrap_or(1).max(1))
    }

    /// Grid-wide maximum temperature.
    ///
    /// The scan starts from 0, so a grid of entirely negative values reports
    /// 0.
    pub fn max_temp(&self) -> f64 {
        self.cells.iter().copied().fold(0.0, f64::max)
    }

    /// Render the grid into a presentation snapshot.
    pub fn snapshot(&self, tick: u64) -> GridSnapshot {
        let cells = self
            .iter_rows()
            .map(|row| {
                row.iter()
                    .map(|&temp| CellView {
                        temperature: rounded_temperature(temp),
                        color: map_temperature_to_color(temp),
                    })
                    .collect()
            })
            .collect();
        GridSnapshot {
            tick,
            rows: self.rows,
            cols: self.cols,
            cells,
            max_temp: rounded_temperature(self.max_temp()),
        }
    }

    fn index(&self, row: u32, col: u32) -> Option<usize> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        let flat = u64::from(row)
            .checked_mul(u64::from(self.cols))?
            .checked_add(u64::from(col))?;
        usize::try_from(flat).ok()
    }
}

fn cell_count(rows: u32, cols: u32) -> Result<usize, GridError> {
    if rows == 0 || cols == 0 {
        return Err(GridError::Empty);
    }
    let count = u64::from(rows)
        .checked_mul(u64::from(cols))
        .ok_or(GridError::TooLarge)?;
    usize::try_from(count).map_err(|_err| GridError::TooLarge)
}
