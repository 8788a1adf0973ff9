//! Data module - benchmark CSV loading and cleaning

mod loader;
mod processor;

pub use loader::{CleanedSeries, LoaderError, SeriesLoader, DEFAULT_BENCHMARKS_DIR};
pub use processor::{CleaningPolicy, DataProcessor, ProcessorError, DEFAULT_SIGMA, FRAME_COLUMN};
