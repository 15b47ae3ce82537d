//! Neighborhood shapes used to sample a cell's surroundings

use super::grid::RunConfig;
use crate::error::{AutomatonError, Result};
use itertools::iproduct;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A grid coordinate that may lie outside the grid
pub type Coord = (isize, isize);

/// Produces candidate neighbor coordinates for a cell.
///
/// Implementations know nothing about grid size; out-of-bounds candidates are
/// filtered by the engine.
pub trait Neighborhood: Send + Sync {
    fn neighbors(&self, x: isize, y: isize) -> Vec<Coord>;
}

impl<F> Neighborhood for F
where
    F: Fn(isize, isize) -> Vec<Coord> + Send + Sync,
{
    fn neighbors(&self, x: isize, y: isize) -> Vec<Coord> {
        self(x, y)
    }
}

/// The standard neighborhood shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NeighborhoodPolicy {
    /// Moore neighborhood: the 8 surrounding cells
    Square,
    /// Von Neumann neighborhood: the 4 orthogonal cells
    Diamond,
    /// Every cell within Chebyshev distance `radius`, centre excluded
    ExtendedSquare { radius: u32 },
}

impl NeighborhoodPolicy {
    /// Upper bound on the number of candidates returned for any cell
    pub fn max_neighbors(&self) -> usize {
        match self {
            NeighborhoodPolicy::Square => 8,
            NeighborhoodPolicy::Diamond => 4,
            NeighborhoodPolicy::ExtendedSquare { radius } => {
                let side = (*radius as usize).saturating_mul(2).saturating_add(1);
                side.saturating_mul(side) - 1
            }
        }
    }

    /// Reject radii that reach past every cell of the grid
    pub fn validate(&self, config: &RunConfig) -> Result<()> {
        if let NeighborhoodPolicy::ExtendedSquare { radius } = self {
            let limit = config.width.max(config.height);
            if *radius as usize > limit {
                return Err(AutomatonError::config(format!(
                    "Neighborhood radius {} exceeds the {}x{} grid (max {})",
                    radius, config.width, config.height, limit
                )));
            }
        }
        Ok(())
    }
}

pub fn square(x: isize, y: isize) -> Vec<Coord> {
    vec![
        (x - 1, y),
        (x + 1, y),
        (x, y - 1),
        (x, y + 1),
        (x - 1, y - 1),
        (x + 1, y + 1),
        (x + 1, y - 1),
        (x - 1, y + 1),
    ]
}

pub fn diamond(x: isize, y: isize) -> Vec<Coord> {
    vec![(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
}

pub fn extended_square(x: isize, y: isize, radius: u32) -> Vec<Coord> {
    let r = radius as isize;
    iproduct!(-r..=r, -r..=r)
        .filter(|&(dy, dx)| dx != 0 || dy != 0)
        .map(|(dy, dx)| (x + dx, y + dy))
        .collect()
}

impl Neighborhood for NeighborhoodPolicy {
    fn neighbors(&self, x: isize, y: isize) -> Vec<Coord> {
        match self {
            NeighborhoodPolicy::Square => square(x, y),
            NeighborhoodPolicy::Diamond => diamond(x, y),
            NeighborhoodPolicy::ExtendedSquare { radius } => extended_square(x, y, *radius),
        }
    }
}

impl fmt::Display for NeighborhoodPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeighborhoodPolicy::Square => write!(f, "square"),
            NeighborhoodPolicy::Diamond => write!(f, "diamond"),
            NeighborhoodPolicy::ExtendedSquare { radius } => write!(f, "square(r={})", radius),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_square_order() {
        assert_eq!(
            NeighborhoodPolicy::Square.neighbors(5, 5),
            vec![(4, 5), (6, 5), (5, 4), (5, 6), (4, 4), (6, 6), (6, 4), (4, 6)]
        );
    }

    #[test]
    fn test_diamond_order() {
        assert_eq!(
            NeighborhoodPolicy::Diamond.neighbors(0, 0),
            vec![(-1, 0), (1, 0), (0, -1), (0, 1)]
        );
    }

    #[test]
    fn test_radius_one_matches_square() {
        let extended: HashSet<_> = NeighborhoodPolicy::ExtendedSquare { radius: 1 }
            .neighbors(2, 3)
            .into_iter()
            .collect();
        let square: HashSet<_> = square(2, 3).into_iter().collect();
        assert_eq!(extended, square);
    }

    #[test]
    fn test_extended_square_size() {
        let policy = NeighborhoodPolicy::ExtendedSquare { radius: 2 };
        let neighbors = policy.neighbors(0, 0);
        assert_eq!(neighbors.len(), 24);
        assert_eq!(policy.max_neighbors(), 24);
        assert!(!neighbors.contains(&(0, 0)));
        assert!(neighbors.contains(&(-2, 2)));
    }

    #[test]
    fn test_radius_bounded_by_grid() {
        let config = RunConfig::new(30, 20, 2).unwrap();
        assert!(NeighborhoodPolicy::ExtendedSquare { radius: 30 }.validate(&config).is_ok());
        assert!(NeighborhoodPolicy::Square.validate(&config).is_ok());

        let err = NeighborhoodPolicy::ExtendedSquare { radius: 1_000_000 }
            .validate(&config)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_max_neighbors_saturates() {
        let huge = NeighborhoodPolicy::ExtendedSquare { radius: u32::MAX };
        assert!(huge.max_neighbors() >= u32::MAX as usize);
    }

    #[test]
    fn test_closure_neighborhood() {
        let knight = |x: isize, y: isize| vec![(x + 1, y + 2), (x - 2, y - 1)];
        assert_eq!(knight.neighbors(0, 0), vec![(1, 2), (-2, -1)]);
    }

    #[test]
    fn test_policy_yaml_names() {
        let yaml = serde_yaml::to_string(&NeighborhoodPolicy::Diamond).unwrap();
        assert_eq!(yaml.trim(), "diamond");

        let extended = NeighborhoodPolicy::ExtendedSquare { radius: 2 };
        let yaml = serde_yaml::to_string(&extended).unwrap();
        let parsed: NeighborhoodPolicy = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, extended);
    }
}
