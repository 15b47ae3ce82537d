//! Driving loop that repeatedly advances a grid and records completed generations

use crate::automaton::{CellState, EvolutionEngine, Grid};
use crate::config::Settings;
use anyhow::{Context, Result};
use std::fmt;
use std::ops::ControlFlow;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// A configured run: the current grid, its engine, and recorded frames
pub struct Simulation {
    settings: Settings,
    engine: EvolutionEngine,
    grid: Grid,
    scratch: Vec<CellState>,
    frames: Vec<Grid>,
    record: bool,
}

/// Outcome of [`Simulation::run`]
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: u64,
    pub final_generation: u64,
    pub living_cells: usize,
    pub population: Vec<usize>,
    pub stopped_early: bool,
    pub elapsed: Duration,
}

impl Simulation {
    /// Create a simulation seeded by the configured initializer
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate().context("Invalid simulation settings")?;
        let grid = settings.build_grid()?;
        Self::with_grid(settings, grid)
    }

    /// Create a simulation from an explicit seed grid
    pub fn with_grid(settings: Settings, grid: Grid) -> Result<Self> {
        let engine = settings.build_engine()?;
        if grid.config() != engine.config() {
            anyhow::bail!(
                "Seed grid is {}x{} with {} states, settings describe {}x{} with {} states",
                grid.width(),
                grid.height(),
                grid.states(),
                engine.config().width,
                engine.config().height,
                engine.config().states
            );
        }

        Ok(Self {
            settings,
            engine,
            grid,
            scratch: Vec::new(),
            frames: Vec::new(),
            record: false,
        })
    }

    /// Keep a copy of every completed generation, starting with the current one
    pub fn record_frames(mut self, record: bool) -> Self {
        self.record = record;
        self.frames.clear();
        if record {
            self.frames.push(self.grid.clone());
        }
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn engine(&self) -> &EvolutionEngine {
        &self.engine
    }

    /// The latest completed generation
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn frames(&self) -> &[Grid] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<Grid> {
        self.frames
    }

    /// Advance one generation
    pub fn step(&mut self) -> Result<&Grid> {
        self.engine
            .advance_with(&mut self.grid, &mut self.scratch)
            .with_context(|| format!("Failed to compute generation {}", self.grid.generation() + 1))?;

        debug!(
            generation = self.grid.generation(),
            living = self.grid.living_count(),
            "advanced generation"
        );

        if self.record {
            self.frames.push(self.grid.clone());
        }
        Ok(&self.grid)
    }

    /// Run the configured number of generations
    pub fn run(&mut self) -> Result<RunSummary> {
        let generations = self.settings.simulation.generations;
        self.run_with(generations, |_| ControlFlow::Continue(()))
    }

    /// Run up to `generations` steps, calling `on_generation` after each one.
    /// Returning `ControlFlow::Break` stops at that generation boundary.
    pub fn run_with<F>(&mut self, generations: u64, mut on_generation: F) -> Result<RunSummary>
    where
        F: FnMut(&Grid) -> ControlFlow<()>,
    {
        let start_time = Instant::now();
        info!(
            width = self.grid.width(),
            height = self.grid.height(),
            states = self.grid.states(),
            rule = %self.settings.simulation.rule,
            neighborhood = %self.settings.simulation.neighborhood,
            generations,
            "starting run"
        );

        let mut steps = 0;
        let mut stopped_early = false;
        while steps < generations {
            let grid = self.step()?;
            steps += 1;
            if on_generation(grid).is_break() {
                stopped_early = steps < generations;
                break;
            }
        }

        let summary = RunSummary {
            steps,
            final_generation: self.grid.generation(),
            living_cells: self.grid.living_count(),
            population: self.grid.population(),
            stopped_early,
            elapsed: start_time.elapsed(),
        };
        info!(
            steps,
            generation = summary.final_generation,
            living = summary.living_cells,
            "run finished"
        );
        Ok(summary)
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Run Summary:")?;
        writeln!(f, "  Steps: {}", self.steps)?;
        writeln!(f, "  Final generation: {}", self.final_generation)?;
        writeln!(f, "  Living cells: {}", self.living_cells)?;
        writeln!(f, "  Population by state: {:?}", self.population)?;
        if self.stopped_early {
            writeln!(f, "  Stopped early")?;
        }
        write!(f, "  Time: {:.3}s", self.elapsed.as_secs_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::{Initializer, Rule};

    fn small_settings(generations: u64) -> Settings {
        let mut settings = Settings::default();
        settings.simulation.width = 10;
        settings.simulation.height = 10;
        settings.simulation.generations = generations;
        settings
    }

    #[test]
    fn test_run_counts_generations() {
        let mut simulation = Simulation::new(small_settings(8)).unwrap();
        let summary = simulation.run().unwrap();
        assert_eq!(summary.steps, 8);
        assert_eq!(summary.final_generation, 8);
        assert_eq!(simulation.grid().generation(), 8);
        assert_eq!(summary.living_cells, 5); // glider still in open space
        assert!(!summary.stopped_early);
    }

    #[test]
    fn test_recorded_frames() {
        let mut simulation = Simulation::new(small_settings(4)).unwrap().record_frames(true);
        simulation.run().unwrap();

        let frames = simulation.into_frames();
        assert_eq!(frames.len(), 5);
        for (i, frame) in frames.iter().enumerate() {
            assert_eq!(frame.generation(), i as u64);
        }
        // Glider reappears one cell down and right
        assert_eq!(frames[4].state_at(3, 1).unwrap(), 1);
        assert_eq!(frames[0].state_at(2, 0).unwrap(), 1);
    }

    #[test]
    fn test_stop_at_generation_boundary() {
        let mut simulation = Simulation::new(small_settings(50)).unwrap();
        let summary = simulation
            .run_with(50, |grid| {
                if grid.generation() == 3 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            })
            .unwrap();
        assert_eq!(summary.steps, 3);
        assert!(summary.stopped_early);
        assert_eq!(simulation.grid().generation(), 3);
    }

    #[test]
    fn test_glider_dies_against_edge() {
        // Without wraparound a glider reaching the corner collapses into a block
        let mut settings = small_settings(60);
        settings.simulation.width = 6;
        settings.simulation.height = 6;
        let mut simulation = Simulation::new(settings).unwrap();
        let summary = simulation.run().unwrap();
        assert_eq!(summary.final_generation, 60);
        assert_eq!(summary.living_cells, 4);
        for (x, y) in [(4, 4), (5, 4), (4, 5), (5, 5)] {
            assert_eq!(simulation.grid().state_at(x, y).unwrap(), 1);
        }
    }

    #[test]
    fn test_with_grid_rejects_mismatch() {
        let settings = small_settings(1);
        let grid = Grid::from_rows(vec![vec![0; 4]; 4], 2).unwrap();
        assert!(Simulation::with_grid(settings, grid).is_err());
    }

    #[test]
    fn test_cycle_run_is_reproducible() {
        let mut settings = small_settings(5);
        settings.simulation.states = 3;
        settings.simulation.rule = Rule::Cycle;
        settings.simulation.initializer = Initializer::Random;
        settings.simulation.seed = Some(99);

        let mut first = Simulation::new(settings.clone()).unwrap();
        let mut second = Simulation::new(settings).unwrap();
        first.run().unwrap();
        second.run().unwrap();
        assert_eq!(first.grid(), second.grid());
        assert_eq!(first.grid().population().iter().sum::<usize>(), 100);
    }
}
