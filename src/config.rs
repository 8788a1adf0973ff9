//! Chart configuration: which files, columns, colors and axes make up each comparison.

use crate::charts::{Palette, Rgb};
use crate::data::{CleaningPolicy, DEFAULT_BENCHMARKS_DIR};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Presets reproducing the culling benchmark charts.
const BUILTIN_PRESETS: &str = include_str!("../presets/charts.json");

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("unknown chart `{0}`")]
    UnknownChart(String),
    #[error("chart `{chart}` uses unknown color `{color}`")]
    UnknownColor { chart: String, color: String },
}

/// One line of a comparison chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSpec {
    pub file: String,
    pub column: String,
    pub label: String,
    /// Palette name or literal `#rrggbb`.
    pub color: String,
}

/// Where a series' mean is shown in the legend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeanLabel {
    /// Baked into the series and bar labels: `"Two-Pass (301)"`.
    #[default]
    Series,
    /// Own legend entry for the reference line: `"Two-Pass Mean (8.00 ms)"`;
    /// series and bar labels stay plain.
    ReferenceLine,
}

/// Companion bar chart of series means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSpec {
    pub title: String,
    pub y_limit: f64,
    /// Multiplier applied to the std shown as error bar.
    #[serde(default = "default_error_scale")]
    pub error_scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartSpec {
    pub name: String,
    pub title: String,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    pub y_label: String,
    pub y_limit: f64,
    pub cleaning: CleaningPolicy,
    /// Decimals of the mean baked into legend labels.
    #[serde(default)]
    pub mean_precision: usize,
    /// Suffix appended to means in labels, e.g. `" ms"`.
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub mean_label: MeanLabel,
    pub series: Vec<SeriesSpec>,
    #[serde(default)]
    pub bar: Option<BarSpec>,
}

impl ChartSpec {
    /// Mean formatted with the chart's precision and unit: `"12.34 ms"`.
    pub fn format_mean(&self, mean: f64) -> String {
        format!("{:.*}{}", self.mean_precision, mean, self.unit)
    }

    /// Series label, with the mean appended when the chart bakes it in.
    pub fn series_label(&self, label: &str, mean: f64) -> String {
        match self.mean_label {
            MeanLabel::Series => format!("{} ({})", label, self.format_mean(mean)),
            MeanLabel::ReferenceLine => label.to_string(),
        }
    }

    /// Legend entry of the mean reference line, if it gets its own.
    pub fn reference_label(&self, label: &str, mean: f64) -> Option<String> {
        match self.mean_label {
            MeanLabel::Series => None,
            MeanLabel::ReferenceLine => {
                Some(format!("{} Mean ({})", label, self.format_mean(mean)))
            }
        }
    }
}

fn default_x_label() -> String {
    "Frame Number".to_string()
}

fn default_error_scale() -> f64 {
    1.0
}

fn default_benchmarks_dir() -> PathBuf {
    PathBuf::from(DEFAULT_BENCHMARKS_DIR)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_benchmarks_dir")]
    pub benchmarks_dir: PathBuf,
    #[serde(default)]
    pub palette: Palette,
    pub charts: Vec<ChartSpec>,
}

impl Config {
    /// The built-in chart presets.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json(BUILTIN_PRESETS)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Parse and validate a JSON config.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.charts.is_empty() {
            return Err(ConfigError::Invalid("no charts defined".to_string()));
        }

        let mut names = HashSet::new();
        for chart in &self.charts {
            if !names.insert(chart.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "duplicate chart name `{}`",
                    chart.name
                )));
            }
            if chart.series.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "chart `{}` has no series",
                    chart.name
                )));
            }
            check_limit(&chart.name, chart.y_limit)?;
            if let Some(bar) = &chart.bar {
                check_limit(&chart.name, bar.y_limit)?;
                if !bar.error_scale.is_finite() || bar.error_scale < 0.0 {
                    return Err(ConfigError::Invalid(format!(
                        "chart `{}`: error_scale must be a non-negative number",
                        chart.name
                    )));
                }
            }
            chart
                .cleaning
                .validate()
                .map_err(|e| ConfigError::Invalid(format!("chart `{}`: {}", chart.name, e)))?;
            for series in &chart.series {
                self.color(chart, &series.color)?;
            }
        }

        Ok(())
    }

    /// Resolve a series color of `chart`.
    pub fn color(&self, chart: &ChartSpec, color: &str) -> Result<Rgb, ConfigError> {
        self.palette
            .resolve(color)
            .ok_or_else(|| ConfigError::UnknownColor {
                chart: chart.name.clone(),
                color: color.to_string(),
            })
    }

    pub fn chart(&self, name: &str) -> Result<&ChartSpec, ConfigError> {
        self.charts
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ConfigError::UnknownChart(name.to_string()))
    }

    /// Charts named in `names`, in that order; all charts when empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<&ChartSpec>, ConfigError> {
        if names.is_empty() {
            return Ok(self.charts.iter().collect());
        }
        names.iter().map(|name| self.chart(name)).collect()
    }
}

fn check_limit(chart: &str, limit: f64) -> Result<(), ConfigError> {
    if limit.is_finite() && limit > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "chart `{}`: y_limit must be a positive number, got {}",
            chart, limit
        )))
    }
}
