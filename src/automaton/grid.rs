//! Grid representation for a k-state cellular automaton

use crate::error::{AutomatonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single cell's discrete state, always in `[0, states)`
pub type CellState = u8;

/// Immutable run parameters shared by grid construction and the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub width: usize,
    pub height: usize,
    pub states: u8,
}

impl RunConfig {
    /// Create a run configuration, rejecting empty grids and zero states
    pub fn new(width: usize, height: usize, states: u8) -> Result<Self> {
        let config = Self { width, height, states };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(AutomatonError::config(format!(
                "Grid dimensions must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if self.states < 1 {
            return Err(AutomatonError::config("Number of states must be at least 1"));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
}

/// A fixed-size automaton grid and its generation counter.
///
/// Cells are addressed as `(x, y)` with `x` the column and `y` the row. Initializers and
/// [`Grid::to_rows`] use row-major nesting, so `rows[y][x]` is the cell at `(x, y)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridRepr")]
pub struct Grid {
    width: usize,
    height: usize,
    states: u8,
    generation: u64,
    cells: Vec<CellState>,
}

/// Unchecked wire form of [`Grid`]
#[derive(Deserialize)]
struct GridRepr {
    width: usize,
    height: usize,
    states: u8,
    generation: u64,
    cells: Vec<CellState>,
}

impl TryFrom<GridRepr> for Grid {
    type Error = AutomatonError;

    fn try_from(repr: GridRepr) -> Result<Self> {
        let config = RunConfig::new(repr.width, repr.height, repr.states)?;
        if repr.cells.len() != config.cell_count() {
            return Err(AutomatonError::config(format!(
                "Grid has {} cells, expected {} for {}x{}",
                repr.cells.len(),
                config.cell_count(),
                repr.width,
                repr.height
            )));
        }
        let rows = repr.cells.chunks(repr.width).map(<[CellState]>::to_vec).collect();
        let mut grid = Self::from_rows(rows, repr.states)?;
        grid.generation = repr.generation;
        Ok(grid)
    }
}

impl Grid {
    /// Create a grid at generation 0 from an initializer producing `height` rows of `width` cells
    pub fn create<F>(config: RunConfig, initializer: F) -> Result<Self>
    where
        F: FnOnce(usize, usize) -> Vec<Vec<CellState>>,
    {
        config.validate()?;
        let rows = initializer(config.width, config.height);

        if rows.len() != config.height {
            return Err(AutomatonError::config(format!(
                "Initializer produced {} rows, expected {}",
                rows.len(),
                config.height
            )));
        }

        Self::from_rows(rows, config.states)
    }

    /// Create a grid from explicit rows (`rows[y][x]`)
    pub fn from_rows(rows: Vec<Vec<CellState>>, states: u8) -> Result<Self> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        RunConfig::new(width, height, states)?;

        for (y, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(AutomatonError::config(format!(
                    "Row {} has length {}, expected {}",
                    y,
                    row.len(),
                    width
                )));
            }
            if let Some(&state) = row.iter().find(|&&state| state >= states) {
                return Err(AutomatonError::InvalidState { state: state.into(), states });
            }
        }

        Ok(Self {
            width,
            height,
            states,
            generation: 0,
            cells: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn states(&self) -> u8 {
        self.states
    }

    /// Number of completed evolution steps since creation
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> RunConfig {
        RunConfig {
            width: self.width,
            height: self.height,
            states: self.states,
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Whether `(x, y)` addresses a cell of this grid
    #[inline]
    pub fn contains(&self, x: isize, y: isize) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Bounds-checked state lookup
    pub fn state_at(&self, x: isize, y: isize) -> Result<CellState> {
        if !self.contains(x, y) {
            return Err(AutomatonError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(self.cells[self.index(x as usize, y as usize)])
    }

    /// Row-major view of every cell
    pub fn cells(&self) -> &[CellState] {
        &self.cells
    }

    pub fn rows(&self) -> impl Iterator<Item = &[CellState]> + '_ {
        self.cells.chunks(self.width)
    }

    pub fn to_rows(&self) -> Vec<Vec<CellState>> {
        self.rows().map(<[CellState]>::to_vec).collect()
    }

    /// Count of cells holding each state, indexed by state
    pub fn population(&self) -> Vec<usize> {
        let mut counts = vec![0; self.states as usize];
        for &cell in &self.cells {
            counts[cell as usize] += 1;
        }
        counts
    }

    /// Count of cells in any non-zero state
    pub fn living_count(&self) -> usize {
        self.cells.iter().filter(|&&cell| cell != 0).count()
    }

    /// Check if every cell is in state 0
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|&cell| cell == 0)
    }

    /// Build the successor grid from a fully computed buffer
    pub(crate) fn successor(&self, cells: Vec<CellState>) -> Self {
        debug_assert_eq!(cells.len(), self.cells.len());
        Self {
            width: self.width,
            height: self.height,
            states: self.states,
            generation: self.generation + 1,
            cells,
        }
    }

    /// Swap in a fully computed buffer, returning the previous one for reuse
    pub(crate) fn commit(&mut self, cells: Vec<CellState>) -> Vec<CellState> {
        debug_assert_eq!(cells.len(), self.cells.len());
        self.generation += 1;
        std::mem::replace(&mut self.cells, cells)
    }
}

/// Single-character glyph for a state: `·` for 0, `█` for 1, base-36 digits above
pub fn state_glyph(state: CellState) -> char {
    match state {
        0 => '·',
        1 => '█',
        state => char::from_digit(u32::from(state) % 36, 36).unwrap_or('?'),
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            for &cell in row {
                write!(f, "{}", state_glyph(cell))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
