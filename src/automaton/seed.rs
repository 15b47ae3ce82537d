//! Initializers that seed a grid's first generation

use super::grid::{CellState, Grid, RunConfig};
use super::neighborhood::Coord;
use crate::error::{AutomatonError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Live cells of the classic glider as `(x, y)`; it travels toward `(+1, +1)`
pub const GLIDER: [Coord; 5] = [(2, 0), (0, 1), (2, 1), (1, 2), (2, 2)];

/// Initializer choice carried in run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Initializer {
    Empty,
    Glider,
    Random,
    /// Explicit live cells (state 1) given as `(x, y)`
    Pattern { cells: Vec<Coord> },
}

impl Initializer {
    /// Check that the initializer fits the grid before a run starts
    pub fn validate(&self, config: &RunConfig) -> Result<()> {
        let cells: &[Coord] = match self {
            Initializer::Empty | Initializer::Random => return Ok(()),
            Initializer::Glider => &GLIDER,
            Initializer::Pattern { cells } => cells,
        };
        if config.states < 2 {
            return Err(AutomatonError::config(
                "Pattern seeds need at least 2 states",
            ));
        }
        if let Some(&(x, y)) = cells.iter().find(|&&(x, y)| {
            x < 0 || y < 0 || x as usize >= config.width || y as usize >= config.height
        }) {
            return Err(AutomatonError::config(format!(
                "Seed cell ({}, {}) does not fit a {}x{} grid",
                x, y, config.width, config.height
            )));
        }
        Ok(())
    }

    /// Build the first generation; `seed` makes random grids reproducible
    pub fn build(&self, config: RunConfig, seed: Option<u64>) -> Result<Grid> {
        self.validate(&config)?;
        match self {
            Initializer::Empty => Grid::create(config, empty_start),
            Initializer::Glider => Grid::create(config, glide_start),
            Initializer::Pattern { cells } => Grid::create(config, pattern_start(cells)),
            Initializer::Random => {
                let mut rng = match seed {
                    Some(seed) => ChaCha8Rng::seed_from_u64(seed),
                    None => ChaCha8Rng::from_entropy(),
                };
                Grid::create(config, rand_start(config.states, &mut rng))
            }
        }
    }
}

pub fn empty_start(width: usize, height: usize) -> Vec<Vec<CellState>> {
    vec![vec![0; width]; height]
}

/// All zeros except a glider near the origin
pub fn glide_start(width: usize, height: usize) -> Vec<Vec<CellState>> {
    pattern_start(&GLIDER)(width, height)
}

/// All zeros except the given `(x, y)` cells, which are set to 1.
/// Cells outside the grid are dropped.
pub fn pattern_start(cells: &[Coord]) -> impl FnOnce(usize, usize) -> Vec<Vec<CellState>> + '_ {
    move |width, height| {
        let mut rows = empty_start(width, height);
        for &(x, y) in cells {
            if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                rows[y as usize][x as usize] = 1;
            }
        }
        rows
    }
}

/// Every cell drawn uniformly from `[0, states)`
pub fn rand_start<R: Rng>(
    states: u8,
    rng: &mut R,
) -> impl FnOnce(usize, usize) -> Vec<Vec<CellState>> + '_ {
    move |width, height| {
        (0..height)
            .map(|_| (0..width).map(|_| rng.gen_range(0..states.max(1))).collect::<Vec<_>>())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glide_start() {
        let rows = glide_start(5, 5);
        let living: usize = rows.iter().flatten().filter(|&&c| c == 1).count();
        assert_eq!(living, 5);
        for (x, y) in GLIDER {
            assert_eq!(rows[y as usize][x as usize], 1);
        }
        assert_eq!(rows[0], vec![0, 0, 1, 0, 0]);
        assert_eq!(rows[1], vec![1, 0, 1, 0, 0]);
        assert_eq!(rows[2], vec![0, 1, 1, 0, 0]);
    }

    #[test]
    fn test_rand_start_is_reproducible() {
        let mut first = ChaCha8Rng::seed_from_u64(42);
        let mut second = ChaCha8Rng::seed_from_u64(42);
        let a = rand_start(4, &mut first)(20, 10);
        let b = rand_start(4, &mut second)(20, 10);
        assert_eq!(a, b);
        assert_eq!(a.len(), 10);
        assert!(a.iter().all(|row| row.len() == 20));
    }

    #[test]
    fn test_rand_start_covers_all_states() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let rows = rand_start(4, &mut rng)(30, 30);
        let mut seen = [0usize; 4];
        for &cell in rows.iter().flatten() {
            assert!(cell < 4);
            seen[cell as usize] += 1;
        }
        // 900 uniform draws over 4 states
        assert!(seen.iter().all(|&count| count > 150));
    }

    #[test]
    fn test_build_random_with_seed() {
        let config = RunConfig::new(12, 8, 3).unwrap();
        let a = Initializer::Random.build(config, Some(9)).unwrap();
        let b = Initializer::Random.build(config, Some(9)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.generation(), 0);
    }

    #[test]
    fn test_glider_must_fit() {
        let config = RunConfig::new(2, 5, 2).unwrap();
        assert!(Initializer::Glider.build(config, None).unwrap_err().is_configuration());

        let config = RunConfig::new(3, 3, 2).unwrap();
        assert_eq!(Initializer::Glider.build(config, None).unwrap().living_count(), 5);
    }

    #[test]
    fn test_pattern_needs_two_states() {
        let config = RunConfig::new(3, 3, 1).unwrap();
        let seed = Initializer::Pattern { cells: vec![(1, 1)] };
        assert!(seed.build(config, None).is_err());
        assert!(Initializer::Empty.build(config, None).unwrap().is_empty());
    }

    #[test]
    fn test_pattern_start_drops_outside_cells() {
        let rows = pattern_start(&[(0, 0), (-1, 2), (9, 9)])(3, 3);
        assert_eq!(rows, vec![vec![1, 0, 0], vec![0, 0, 0], vec![0, 0, 0]]);
    }
}
