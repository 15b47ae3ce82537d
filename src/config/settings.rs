//! Configuration settings for an automaton run

use crate::automaton::{
    EvolutionEngine, Grid, Initializer, NeighborhoodPolicy, Rule, RunConfig, TransitionRule,
};
use crate::utils::Color;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub simulation: SimulationConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub width: usize,
    pub height: usize,
    pub states: u8,
    pub rule: Rule,
    pub neighborhood: NeighborhoodPolicy,
    pub initializer: Initializer,
    /// Seed for random initializers; `None` draws from OS entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of generations to advance
    pub generations: u64,
    #[serde(default)]
    pub parallel: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub save_frames: bool,
    pub output_directory: PathBuf,
    /// Playback rate recorded with exported frames
    pub fps: u32,
    pub palette: Vec<Color>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig {
                width: 30,
                height: 30,
                states: 2,
                rule: Rule::GameOfLife,
                neighborhood: NeighborhoodPolicy::Square,
                initializer: Initializer::Glider,
                seed: None,
                generations: 110,
                parallel: false,
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                save_frames: false,
                output_directory: PathBuf::from("output/frames"),
                fps: 10,
                palette: Color::default_palette(),
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        let config = self.run_config()?;
        self.simulation.rule.validate(config.states)?;
        self.simulation.neighborhood.validate(&config)?;
        self.simulation.initializer.validate(&config)?;

        if self.simulation.generations == 0 {
            anyhow::bail!("Number of generations must be positive");
        }

        if self.output.fps == 0 {
            anyhow::bail!("Frames per second must be positive");
        }

        if self.output.palette.is_empty() {
            anyhow::bail!("Palette must contain at least one color");
        }

        Ok(())
    }

    /// Grid dimensions and state count for this run
    pub fn run_config(&self) -> Result<RunConfig> {
        RunConfig::new(
            self.simulation.width,
            self.simulation.height,
            self.simulation.states,
        )
        .context("Invalid grid configuration")
    }

    /// Build the seed grid described by these settings
    pub fn build_grid(&self) -> Result<Grid> {
        let config = self.run_config()?;
        self.simulation
            .initializer
            .build(config, self.simulation.seed)
            .context("Failed to seed grid")
    }

    /// Build the engine for the configured rule and neighborhood
    pub fn build_engine(&self) -> Result<EvolutionEngine> {
        let config = self.run_config()?;
        self.simulation.neighborhood.validate(&config)?;
        let engine = EvolutionEngine::new(
            config,
            self.simulation.rule.clone(),
            self.simulation.neighborhood,
        )
        .context("Failed to build evolution engine")?;
        Ok(engine.with_parallel(self.simulation.parallel))
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(width) = cli_overrides.width {
            self.simulation.width = width;
        }
        if let Some(height) = cli_overrides.height {
            self.simulation.height = height;
        }
        if let Some(states) = cli_overrides.states {
            self.simulation.states = states;
        }
        if let Some(ref rule) = cli_overrides.rule {
            self.simulation.rule = rule.clone();
        }
        if let Some(neighborhood) = cli_overrides.neighborhood {
            self.simulation.neighborhood = neighborhood;
        }
        if let Some(ref initializer) = cli_overrides.initializer {
            self.simulation.initializer = initializer.clone();
        }
        if let Some(seed) = cli_overrides.seed {
            self.simulation.seed = Some(seed);
        }
        if let Some(generations) = cli_overrides.generations {
            self.simulation.generations = generations;
        }
        if cli_overrides.parallel {
            self.simulation.parallel = true;
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
            self.output.save_frames = true;
        }
        if let Some(ref format) = cli_overrides.format {
            self.output.format = format.clone();
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub width: Option<usize>,
    pub height: Option<usize>,
    pub states: Option<u8>,
    pub rule: Option<Rule>,
    pub neighborhood: Option<NeighborhoodPolicy>,
    pub initializer: Option<Initializer>,
    pub seed: Option<u64>,
    pub generations: Option<u64>,
    pub parallel: bool,
    pub output_dir: Option<PathBuf>,
    pub format: Option<OutputFormat>,
}
