//! Comparison Module
//! Loads every series of a chart and summarizes it, ready for either renderer.

use super::palette::{Palette, Rgb};
use crate::config::ChartSpec;
use crate::data::{CleanedSeries, CleaningPolicy, LoaderError, SeriesLoader};
use crate::stats::{SeriesStats, StatsCalculator};
use log::{info, warn};
use rayon::prelude::*;
use std::fmt::Write;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ComparisonError {
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error("chart `{chart}` uses unknown color `{color}`")]
    UnknownColor { chart: String, color: String },
}

/// One cleaned series with its presentation attributes.
#[derive(Debug, Clone)]
pub struct ComparisonSeries {
    pub label: String,
    pub color: Rgb,
    pub series: CleanedSeries,
    pub stats: SeriesStats,
}

/// A chart's series, loaded, cleaned and summarized.
#[derive(Debug, Clone)]
pub struct Comparison {
    pub spec: ChartSpec,
    pub policy: CleaningPolicy,
    pub series: Vec<ComparisonSeries>,
}

impl Comparison {
    /// Load all series of `spec` with `policy` and compute their statistics.
    ///
    /// The first series is the baseline the others are tested against.
    pub fn build(
        spec: &ChartSpec,
        palette: &Palette,
        loader: &SeriesLoader,
        policy: CleaningPolicy,
    ) -> Result<Self, ComparisonError> {
        let colors = spec
            .series
            .iter()
            .map(|s| {
                palette
                    .resolve(&s.color)
                    .ok_or_else(|| ComparisonError::UnknownColor {
                        chart: spec.name.clone(),
                        color: s.color.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let loaded = spec
            .series
            .par_iter()
            .map(|s| loader.load(&s.file, &s.column, policy))
            .collect::<Result<Vec<_>, _>>()?;

        let comparison = Self::from_series(spec, policy, loaded, colors);
        info!(
            "{}: {} series cleaned with {}",
            spec.name,
            comparison.series.len(),
            policy
        );
        if !comparison.frames_overlap() {
            warn!("{}: series share no frame numbers", spec.name);
        }

        Ok(comparison)
    }

    /// Assemble a comparison from already cleaned series.
    pub fn from_series(
        spec: &ChartSpec,
        policy: CleaningPolicy,
        loaded: Vec<CleanedSeries>,
        colors: Vec<Rgb>,
    ) -> Self {
        let labels: Vec<String> = spec.series.iter().map(|s| s.label.clone()).collect();
        let values: Vec<Vec<f64>> = loaded.iter().map(CleanedSeries::values).collect();
        let stats = StatsCalculator::compute_comparison_stats(&labels, &values);

        let series = labels
            .into_iter()
            .zip(colors)
            .zip(loaded)
            .zip(stats)
            .map(|(((label, color), series), stats)| ComparisonSeries {
                label,
                color,
                series,
                stats,
            })
            .collect();

        Self {
            spec: spec.clone(),
            policy,
            series,
        }
    }

    /// Smallest and largest frame number over all series.
    pub fn frame_range(&self) -> (i64, i64) {
        self.series
            .iter()
            .filter_map(|s| s.series.frame_range())
            .fold(None, |acc: Option<(i64, i64)>, (lo, hi)| match acc {
                Some((a, b)) => Some((a.min(lo), b.max(hi))),
                None => Some((lo, hi)),
            })
            .unwrap_or((0, 1))
    }

    /// Whether the series' frame ranges intersect.
    pub fn frames_overlap(&self) -> bool {
        let ranges: Vec<(i64, i64)> = self
            .series
            .iter()
            .filter_map(|s| s.series.frame_range())
            .collect();
        let start = ranges.iter().map(|r| r.0).max();
        let end = ranges.iter().map(|r| r.1).min();
        match (start, end) {
            (Some(start), Some(end)) => start <= end,
            _ => false,
        }
    }

    /// Legend label of series `idx`.
    pub fn legend_label(&self, idx: usize) -> String {
        let s = &self.series[idx];
        self.spec.series_label(&s.label, s.stats.mean)
    }

    /// Legend label of the mean line of series `idx`, when it has its own entry.
    pub fn mean_line_label(&self, idx: usize) -> Option<String> {
        let s = &self.series[idx];
        self.spec.reference_label(&s.label, s.stats.mean)
    }

    /// Tick label of series `idx` in the bar chart.
    pub fn bar_label(&self, idx: usize) -> String {
        self.legend_label(idx)
    }

    /// Half-height of the error bar of series `idx`.
    pub fn error_bar(&self, idx: usize) -> f64 {
        let scale = self.spec.bar.as_ref().map(|b| b.error_scale).unwrap_or(1.0);
        self.series[idx].stats.std * scale
    }

    /// Plain-text statistics table.
    pub fn summary(&self) -> String {
        let width = self
            .series
            .iter()
            .map(|s| s.label.chars().count())
            .max()
            .unwrap_or(0)
            .max(6);
        let precision = self.spec.mean_precision.max(2);

        let mut out = String::new();
        let _ = writeln!(out, "{} [{}]", self.spec.title, self.policy);
        let _ = writeln!(
            out,
            "{:<width$} {:>6} {:>12} {:>12} {:>12} {:>12} {:>10}",
            "Series", "N", "Mean", "Std", "Min", "Max", "P-value"
        );
        for s in &self.series {
            let p_value = match s.stats.p_value {
                Some(p) if s.stats.is_significant => format!("{:.4}*", p),
                Some(p) => format!("{:.4}", p),
                None => "-".to_string(),
            };
            let _ = writeln!(
                out,
                "{:<width$} {:>6} {:>12.prec$} {:>12.prec$} {:>12.prec$} {:>12.prec$} {:>10}",
                s.label,
                s.stats.count,
                s.stats.mean,
                s.stats.std,
                s.stats.min,
                s.stats.max,
                p_value,
                prec = precision
            );
        }
        out
    }
}
