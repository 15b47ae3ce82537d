//! Command line driver for the cellular automaton simulator

use anyhow::{Context, Result};
use cellular_automaton::{
    automaton::{Initializer, NeighborhoodPolicy, Rule},
    config::{CliOverrides, OutputFormat, Settings},
    simulation::Simulation,
    utils::{ColorOutput, FrameExporter, FrameRenderer, GenerationProgress},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "cellular_automaton")]
#[command(about = "Two-dimensional cellular automaton simulator")]
#[command(version = "0.1.0")]
struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation
    Run {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        #[command(flatten)]
        overrides: RunArgs,

        /// Print every generation instead of a progress line
        #[arg(long)]
        show_frames: bool,

        /// Disable colored frames
        #[arg(long)]
        no_color: bool,
    },

    /// Create example configuration files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Print the seed grid for a configuration
    Show {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        #[command(flatten)]
        overrides: RunArgs,
    },
}

#[derive(clap::Args, Default)]
struct RunArgs {
    /// Grid width in cells (overrides config)
    #[arg(long)]
    width: Option<usize>,

    /// Grid height in cells (overrides config)
    #[arg(long)]
    height: Option<usize>,

    /// Number of cell states (overrides config)
    #[arg(short, long)]
    states: Option<u8>,

    /// Rule: game_of_life, cycle, or a rulestring such as B36/S23
    #[arg(short, long)]
    rule: Option<Rule>,

    /// Neighborhood shape (overrides config)
    #[arg(short, long, value_enum)]
    neighborhood: Option<NeighborhoodArg>,

    /// Radius for the square neighborhood
    #[arg(long, requires = "neighborhood")]
    radius: Option<u32>,

    /// Initial pattern (overrides config)
    #[arg(short, long, value_enum)]
    initializer: Option<InitializerArg>,

    /// Seed for the random initializer
    #[arg(long)]
    seed: Option<u64>,

    /// Number of generations (overrides config)
    #[arg(short, long)]
    generations: Option<u64>,

    /// Compute rows in parallel
    #[arg(long)]
    parallel: bool,

    /// Export frames to this directory (overrides config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export format (overrides config)
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,
}

#[derive(Clone, Copy, ValueEnum)]
enum NeighborhoodArg {
    Square,
    Diamond,
}

#[derive(Clone, Copy, ValueEnum)]
enum InitializerArg {
    Empty,
    Glider,
    Random,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl RunArgs {
    fn to_overrides(&self) -> CliOverrides {
        let neighborhood = self.neighborhood.map(|shape| match (shape, self.radius) {
            (NeighborhoodArg::Square, Some(radius)) if radius != 1 => {
                NeighborhoodPolicy::ExtendedSquare { radius }
            }
            (NeighborhoodArg::Square, _) => NeighborhoodPolicy::Square,
            (NeighborhoodArg::Diamond, _) => NeighborhoodPolicy::Diamond,
        });

        CliOverrides {
            width: self.width,
            height: self.height,
            states: self.states,
            rule: self.rule.clone(),
            neighborhood,
            initializer: self.initializer.map(|init| match init {
                InitializerArg::Empty => Initializer::Empty,
                InitializerArg::Glider => Initializer::Glider,
                InitializerArg::Random => Initializer::Random,
            }),
            seed: self.seed,
            generations: self.generations,
            parallel: self.parallel,
            output_dir: self.output.clone(),
            format: self.format.map(|format| match format {
                FormatArg::Text => OutputFormat::Text,
                FormatArg::Json => OutputFormat::Json,
            }),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Run { config, overrides, show_frames, no_color } => {
            run_command(&config, &overrides, show_frames, no_color)
        }
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Show { config, overrides } => show_command(&config, &overrides),
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "info,cellular_automaton=debug" } else { "warn" };
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn load_settings(config_path: &Path, overrides: &RunArgs) -> Result<Settings> {
    let mut settings = if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        tracing::warn!("Config file {} not found, using defaults", config_path.display());
        Settings::default()
    };

    settings.merge_with_cli(&overrides.to_overrides());
    settings.validate().context("Configuration validation failed")?;
    Ok(settings)
}

fn run_command(config_path: &Path, overrides: &RunArgs, show_frames: bool, no_color: bool) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    let renderer = FrameRenderer::new(
        settings.output.palette.clone(),
        !no_color && ColorOutput::enabled(),
    );

    println!("{}", ColorOutput::info(&format!(
        "Running {} on a {}x{} grid ({} states, {} neighborhood) for {} generations",
        settings.simulation.rule,
        settings.simulation.width,
        settings.simulation.height,
        settings.simulation.states,
        settings.simulation.neighborhood,
        settings.simulation.generations,
    )));

    let save_frames = settings.output.save_frames;
    let generations = settings.simulation.generations;
    let mut simulation = Simulation::new(settings.clone())
        .context("Failed to create simulation")?
        .record_frames(save_frames);

    if show_frames {
        println!("{}", renderer.render_with_header(simulation.grid()));
    }

    let mut progress = GenerationProgress::new(generations);
    let summary = simulation.run_with(generations, |grid| {
        if show_frames {
            println!("{}", renderer.render_with_header(grid));
        } else {
            progress.record(grid.generation());
        }
        ControlFlow::Continue(())
    })?;

    if !show_frames {
        progress.finish();
        println!("{}", renderer.render_with_header(simulation.grid()));
    }
    println!("{}", summary);

    if save_frames {
        let written = FrameExporter::save_frames(
            simulation.frames(),
            &settings.output.output_directory,
            &settings.output.format,
            settings.output.fps,
        )
        .context("Failed to export frames")?;

        if let Some(path) = written {
            println!("{}", ColorOutput::success(&format!(
                "Saved {} frames to {}",
                simulation.frames().len(),
                path.display()
            )));
        }
    }

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up configuration files..."));

    let config_dir = directory.join("config");
    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)
        .with_context(|| format!("Failed to create directory {}", examples_dir.display()))?;

    let mut cycle = Settings::default();
    cycle.simulation.states = 4;
    cycle.simulation.rule = Rule::Cycle;
    cycle.simulation.initializer = Initializer::Random;
    cycle.simulation.seed = Some(42);
    cycle.simulation.generations = 60;

    let mut highlife = Settings::default();
    highlife.simulation.width = 64;
    highlife.simulation.height = 64;
    highlife.simulation.rule = "B36/S23".parse()?;
    highlife.simulation.initializer = Initializer::Random;
    highlife.simulation.parallel = true;

    let mut diamond = Settings::default();
    diamond.simulation.neighborhood = NeighborhoodPolicy::Diamond;
    diamond.simulation.rule = Rule::Cycle;
    diamond.simulation.states = 3;
    diamond.simulation.initializer = Initializer::Random;
    diamond.output.format = OutputFormat::Json;
    diamond.output.save_frames = true;

    let files = [
        (config_dir.join("default.yaml"), Settings::default()),
        (examples_dir.join("cycle.yaml"), cycle),
        (examples_dir.join("highlife.yaml"), highlife),
        (examples_dir.join("diamond.yaml"), diamond),
    ];

    for (path, settings) in files {
        if path.exists() && !force {
            println!("Skipped: {} (already exists)", path.display());
            continue;
        }
        settings.to_file(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("Created: {}", path.display());
    }

    println!("\n{}", ColorOutput::success("Setup complete!"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Run: cargo run -- run --config config/default.yaml --show-frames");

    Ok(())
}

fn show_command(config_path: &Path, overrides: &RunArgs) -> Result<()> {
    let settings = load_settings(config_path, overrides)?;
    let grid = settings.build_grid()?;

    println!("Seed Grid ({}x{}, {} states):", grid.width(), grid.height(), grid.states());
    println!("{}", FrameRenderer::format_grid_with_coords(&grid));
    println!("Population: {}", FrameRenderer::format_population(&grid));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "cellular_automaton",
            "run",
            "--config", "test.yaml",
            "--rule", "B36/S23",
            "--neighborhood", "square",
            "--radius", "2",
            "--generations", "5",
        ])
        .unwrap();

        let Commands::Run { overrides, .. } = cli.command else {
            panic!("expected run command");
        };
        let parsed = overrides.to_overrides();
        assert_eq!(parsed.generations, Some(5));
        assert_eq!(parsed.neighborhood, Some(NeighborhoodPolicy::ExtendedSquare { radius: 2 }));
        assert_eq!(parsed.rule, Some("B36/S23".parse().unwrap()));
    }

    #[test]
    fn test_cli_rejects_bad_rule() {
        let cli = Cli::try_parse_from(["cellular_automaton", "run", "--rule", "B9/S"]);
        assert!(cli.is_err());
    }

    #[test]
    fn test_setup_command() {
        let temp_dir = tempdir().unwrap();
        setup_command(temp_dir.path().to_path_buf(), false).unwrap();

        let default = temp_dir.path().join("config/default.yaml");
        assert!(default.exists());
        for name in ["cycle", "highlife", "diamond"] {
            let path = temp_dir.path().join(format!("config/examples/{}.yaml", name));
            Settings::from_file(&path).unwrap();
        }
    }

    #[test]
    fn test_run_exports_frames() {
        let temp_dir = tempdir().unwrap();
        let args = RunArgs {
            width: Some(8),
            height: Some(8),
            generations: Some(3),
            output: Some(temp_dir.path().join("frames")),
            format: Some(FormatArg::Json),
            ..Default::default()
        };

        run_command(&temp_dir.path().join("missing.yaml"), &args, false, true).unwrap();
        assert!(temp_dir.path().join("frames/frames.json").exists());
    }
}
