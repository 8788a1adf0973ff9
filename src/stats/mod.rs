//! Stats module - Statistical calculations

mod calculator;

pub use calculator::{SeriesStats, StatsCalculator, SIGNIFICANCE_THRESHOLD};
