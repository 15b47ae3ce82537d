//! Two-dimensional cellular automaton simulator
//!
//! This library advances a fixed-size grid of k-state cells one generation at a
//! time under a pluggable transition rule and neighborhood, and renders or exports
//! the resulting generations.

pub mod automaton;
pub mod config;
pub mod error;
pub mod simulation;
pub mod utils;

pub use automaton::{EvolutionEngine, Grid, NeighborhoodPolicy, Rule, RunConfig};
pub use config::Settings;
pub use error::AutomatonError;
pub use simulation::{RunSummary, Simulation};

use anyhow::Result;

/// Run the configured simulation and return its final grid
pub fn simulate(settings: Settings) -> Result<Grid> {
    let mut simulation = Simulation::new(settings)?;
    simulation.run()?;
    Ok(simulation.grid().clone())
}
