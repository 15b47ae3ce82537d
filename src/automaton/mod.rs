//! Cellular automaton core: grid, neighborhoods, rules and the evolution engine

pub mod engine;
pub mod grid;
pub mod neighborhood;
pub mod rules;
pub mod seed;

pub use engine::EvolutionEngine;
pub use grid::{CellState, Grid, RunConfig};
pub use neighborhood::{Coord, Neighborhood, NeighborhoodPolicy};
pub use rules::{NeighborTally, Rule, TransitionRule};
pub use seed::Initializer;
