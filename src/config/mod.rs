//! Configuration management for automaton runs

pub mod settings;

pub use settings::{CliOverrides, OutputConfig, OutputFormat, Settings, SimulationConfig};
