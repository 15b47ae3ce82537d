//! Generation-advance engine

use super::grid::{CellState, Grid, RunConfig};
use super::neighborhood::{Neighborhood, NeighborhoodPolicy};
use super::rules::{NeighborTally, Rule, TransitionRule};
use crate::error::{AutomatonError, Result};
use rayon::prelude::*;
use tracing::trace;

/// Advances a grid one generation at a time under a fixed rule and neighborhood.
///
/// Every cell of a generation is computed from the pre-step grid into a separate
/// buffer; the grid only changes once the whole buffer is complete. Cells outside
/// the grid are never sampled, so edge cells see fewer neighbors (no wraparound).
#[derive(Debug, Clone)]
pub struct EvolutionEngine<R = Rule, N = NeighborhoodPolicy> {
    config: RunConfig,
    rule: R,
    neighborhood: N,
    parallel: bool,
}

impl<R: TransitionRule, N: Neighborhood> EvolutionEngine<R, N> {
    /// Create an engine for grids matching `config`
    pub fn new(config: RunConfig, rule: R, neighborhood: N) -> Result<Self> {
        config.validate()?;
        rule.validate(config.states)?;
        Ok(Self {
            config,
            rule,
            neighborhood,
            parallel: false,
        })
    }

    /// Compute rows on the rayon thread pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn config(&self) -> RunConfig {
        self.config
    }

    pub fn rule(&self) -> &R {
        &self.rule
    }

    pub fn neighborhood(&self) -> &N {
        &self.neighborhood
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    fn check_grid(&self, grid: &Grid) -> Result<()> {
        if grid.states() != self.config.states {
            return Err(AutomatonError::TallyMismatch {
                expected: self.config.states as usize,
                actual: grid.states() as usize,
            });
        }
        if grid.width() != self.config.width || grid.height() != self.config.height {
            return Err(AutomatonError::config(format!(
                "Grid is {}x{}, engine expects {}x{}",
                grid.width(),
                grid.height(),
                self.config.width,
                self.config.height
            )));
        }
        Ok(())
    }

    /// Count the states of every in-bounds neighbor of `(x, y)`
    pub fn tally(&self, grid: &Grid, x: isize, y: isize) -> Result<NeighborTally> {
        let mut tally = NeighborTally::new(self.config.states);
        for (nx, ny) in self.neighborhood.neighbors(x, y) {
            if grid.contains(nx, ny) {
                tally.record(grid.state_at(nx, ny)?)?;
            }
        }
        Ok(tally)
    }

    fn next_cell(&self, grid: &Grid, x: isize, y: isize) -> Result<CellState> {
        let tally = self.tally(grid, x, y)?;
        let next = self.rule.next_state(grid.state_at(x, y)?, &tally);
        if next >= self.config.states {
            return Err(AutomatonError::InvalidState {
                state: next.into(),
                states: self.config.states,
            });
        }
        Ok(next)
    }

    fn compute_row(&self, grid: &Grid, y: usize, row: &mut [CellState]) -> Result<()> {
        for (x, cell) in row.iter_mut().enumerate() {
            *cell = self.next_cell(grid, x as isize, y as isize)?;
        }
        Ok(())
    }

    /// Fill `buffer` with the next generation of `grid` without touching `grid`
    fn compute_into(&self, grid: &Grid, buffer: &mut Vec<CellState>) -> Result<()> {
        self.check_grid(grid)?;
        buffer.clear();
        buffer.resize(self.config.cell_count(), 0);

        let width = self.config.width;
        if self.parallel {
            buffer
                .par_chunks_mut(width)
                .enumerate()
                .try_for_each(|(y, row)| self.compute_row(grid, y, row))
        } else {
            buffer
                .chunks_mut(width)
                .enumerate()
                .try_for_each(|(y, row)| self.compute_row(grid, y, row))
        }
    }

    /// Compute the next generation as a new grid
    pub fn step(&self, grid: &Grid) -> Result<Grid> {
        let mut next = Vec::with_capacity(self.config.cell_count());
        self.compute_into(grid, &mut next)?;
        trace!(generation = grid.generation() + 1, "computed generation");
        Ok(grid.successor(next))
    }

    /// Advance `grid` in place; on error the grid is left as it was
    pub fn advance(&self, grid: &mut Grid) -> Result<()> {
        let mut scratch = Vec::new();
        self.advance_with(grid, &mut scratch)
    }

    /// Advance `grid` in place using `scratch` as the second buffer.
    ///
    /// After a successful call `scratch` holds the previous generation's cells, so
    /// passing the same buffer to every step alternates between two allocations.
    pub fn advance_with(&self, grid: &mut Grid, scratch: &mut Vec<CellState>) -> Result<()> {
        self.compute_into(grid, scratch)?;
        *scratch = grid.commit(std::mem::take(scratch));
        trace!(generation = grid.generation(), "committed generation");
        Ok(())
    }

    /// Evolve the grid for multiple generations
    pub fn evolve_generations(&self, mut grid: Grid, generations: u64) -> Result<Grid> {
        let mut scratch = Vec::with_capacity(self.config.cell_count());
        for _ in 0..generations {
            self.advance_with(&mut grid, &mut scratch)?;
        }
        Ok(grid)
    }
}
