//! Display and frame export utilities

use crate::automaton::grid::state_glyph;
use crate::automaton::Grid;
use crate::config::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Maps cell states to terminal output
#[derive(Debug, Clone)]
pub struct FrameRenderer {
    palette: Vec<Color>,
    colored: bool,
}

impl FrameRenderer {
    /// Create a renderer; states beyond the palette wrap around it
    pub fn new(palette: Vec<Color>, colored: bool) -> Self {
        let palette = if palette.is_empty() {
            Color::default_palette()
        } else {
            palette
        };
        Self { palette, colored }
    }

    /// Plain glyph renderer, used for files
    pub fn plain() -> Self {
        Self::new(Color::default_palette(), false)
    }

    pub fn color_for(&self, state: u8) -> Color {
        self.palette[state as usize % self.palette.len()]
    }

    pub fn glyph(state: u8) -> char {
        state_glyph(state)
    }

    /// Render one generation, one text line per grid row
    pub fn render_frame(&self, grid: &Grid) -> String {
        let mut output = String::with_capacity(grid.height() * (grid.width() * 2 + 1));
        for row in grid.rows() {
            for &cell in row {
                if self.colored {
                    output.push_str(&format!("\x1b[{}m  ", self.color_for(cell).background_code()));
                } else {
                    output.push(Self::glyph(cell));
                }
            }
            if self.colored {
                output.push_str("\x1b[0m");
            }
            output.push('\n');
        }
        output
    }

    /// Frame preceded by a generation header
    pub fn render_with_header(&self, grid: &Grid) -> String {
        format!(
            "Generation {} (live: {}):\n{}",
            grid.generation(),
            grid.living_count(),
            self.render_frame(grid)
        )
    }

    /// Format a grid with coordinates
    pub fn format_grid_with_coords(grid: &Grid) -> String {
        let mut output = String::new();

        // Header with column numbers
        output.push_str("   ");
        for x in 0..grid.width() {
            output.push_str(&format!("{:2}", x % 10));
        }
        output.push('\n');

        // Rows with row numbers
        for (y, row) in grid.rows().enumerate() {
            output.push_str(&format!("{:2} ", y));
            for &cell in row {
                let glyph = Self::glyph(cell);
                output.push(glyph);
                output.push(glyph);
            }
            output.push('\n');
        }

        output
    }

    /// Population per state, e.g. `0: 895  1: 5`
    pub fn format_population(grid: &Grid) -> String {
        grid.population()
            .iter()
            .enumerate()
            .map(|(state, count)| format!("{}: {}", state, count))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

/// Serialized form of a recorded run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub width: usize,
    pub height: usize,
    pub states: u8,
    pub fps: u32,
    pub frames: Vec<AnimationFrame>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationFrame {
    pub generation: u64,
    pub rows: Vec<Vec<u8>>,
}

impl Animation {
    pub fn from_frames(frames: &[Grid], fps: u32) -> Option<Self> {
        let first = frames.first()?;
        Some(Self {
            width: first.width(),
            height: first.height(),
            states: first.states(),
            fps,
            frames: frames
                .iter()
                .map(|grid| AnimationFrame {
                    generation: grid.generation(),
                    rows: grid.to_rows(),
                })
                .collect(),
        })
    }
}

/// Writes recorded generations to disk
pub struct FrameExporter;

impl FrameExporter {
    /// Save frames in the given format, returning the written file
    pub fn save_frames<P: AsRef<Path>>(
        frames: &[Grid],
        output_dir: P,
        format: &OutputFormat,
        fps: u32,
    ) -> Result<Option<PathBuf>> {
        if frames.is_empty() {
            warn!("No frames recorded, nothing to export");
            return Ok(None);
        }

        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create directory: {}", output_dir.display()))?;

        let path = match format {
            OutputFormat::Text => {
                let renderer = FrameRenderer::plain();
                let content = frames
                    .iter()
                    .map(|grid| renderer.render_with_header(grid))
                    .collect::<Vec<_>>()
                    .join("\n");
                let path = output_dir.join("frames.txt");
                std::fs::write(&path, content)
                    .with_context(|| format!("Failed to write frames to {}", path.display()))?;
                path
            }
            OutputFormat::Json => {
                let path = output_dir.join("frames.json");
                let animation = Animation::from_frames(frames, fps)
                    .context("Failed to assemble animation")?;
                let json = serde_json::to_string_pretty(&animation)
                    .context("Failed to serialize frames")?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write frames to {}", path.display()))?;
                path
            }
        };

        info!(frames = frames.len(), path = %path.display(), "exported frames");
        Ok(Some(path))
    }
}

/// Single-line generation counter for runs that do not print frames
pub struct GenerationProgress {
    target: u64,
    generation: u64,
    last_draw: Instant,
    started: Instant,
}

impl GenerationProgress {
    pub fn new(target: u64) -> Self {
        let now = Instant::now();
        Self {
            target,
            generation: 0,
            last_draw: now,
            started: now,
        }
    }

    /// Note a completed generation, redrawing at most every 100ms
    pub fn record(&mut self, generation: u64) {
        self.generation = generation;
        if self.last_draw.elapsed() > Duration::from_millis(100) {
            self.draw();
            self.last_draw = Instant::now();
        }
    }

    fn percent(&self) -> f64 {
        if self.target == 0 {
            return 100.0;
        }
        self.generation as f64 * 100.0 / self.target as f64
    }

    fn draw(&self) {
        print!("\rgeneration {}/{} ({:.0}%)", self.generation, self.target, self.percent());
        std::io::stdout().flush().ok();
    }

    /// Overwrite the counter with the final tally and elapsed time
    pub fn finish(&self) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 { self.generation as f64 / elapsed } else { 0.0 };
        println!(
            "\r{} generations in {:.2}s ({:.0} gen/s)",
            self.generation, elapsed, rate
        );
    }
}

/// ANSI styling for console status lines; plain text under `NO_COLOR` or a dumb terminal
pub struct ColorOutput;

impl ColorOutput {
    pub fn enabled() -> bool {
        std::env::var_os("NO_COLOR").is_none()
            && std::env::var("TERM").map_or(true, |term| term != "dumb")
    }

    pub fn paint(text: &str, color: Color) -> String {
        if Self::enabled() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    pub fn success(text: &str) -> String {
        Self::paint(text, Color::Green)
    }

    pub fn info(text: &str) -> String {
        Self::paint(text, Color::Cyan)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

impl Color {
    /// White, red, black, green: dead, then live states in order
    pub fn default_palette() -> Vec<Color> {
        vec![Color::White, Color::Red, Color::Black, Color::Green]
    }

    fn code(self) -> u8 {
        match self {
            Color::Black => 30,
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
            Color::Magenta => 35,
            Color::Cyan => 36,
            Color::White => 37,
        }
    }

    fn background_code(self) -> u8 {
        self.code() + 10
    }
}
