//! Rendering and console helpers

pub mod display;

pub use display::{Animation, Color, ColorOutput, FrameExporter, FrameRenderer, GenerationProgress};
