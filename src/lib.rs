//! Benchplot - culling benchmark CSV cleaning & comparison charts
//!
//! Loads frame timing / mesh count CSVs recorded by the renderer, cleans them
//! per frame and renders comparison charts interactively or to image files.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod stats;

pub use charts::{Comparison, ImageFormat, Palette, StaticChartRenderer};
pub use config::{ChartSpec, Config};
pub use data::{CleanedSeries, CleaningPolicy, SeriesLoader};
