//! Data Processor Module
//! Turns raw benchmark samples into a cleaned per-frame series.

use crate::stats::StatsCalculator;
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Column holding the frame number in every benchmark file.
pub const FRAME_COLUMN: &str = "frameNumber";

/// Sigma multiplier used when a config omits it.
pub const DEFAULT_SIGMA: f64 = 3.0;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("column `{0}` not found")]
    MissingColumn(String),
    #[error("no samples left after cleaning")]
    EmptySeries,
}

/// How raw samples are filtered before they are averaged per frame.
///
/// Zero, empty and NaN samples are always dropped: the recorder writes `0`
/// when a readback was not available for that frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum CleaningPolicy {
    /// Only drop sentinel zeros.
    None,
    /// Also drop samples outside `mean ± sigma * std` of the raw column.
    OutlierReject {
        #[serde(default = "default_sigma")]
        sigma: f64,
    },
}

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}

impl CleaningPolicy {
    pub fn outlier_reject(sigma: f64) -> Self {
        CleaningPolicy::OutlierReject { sigma }
    }

    /// Check that the sigma multiplier is usable.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            CleaningPolicy::None => Ok(()),
            CleaningPolicy::OutlierReject { sigma } if sigma.is_finite() && sigma > 0.0 => Ok(()),
            CleaningPolicy::OutlierReject { sigma } => Err(format!(
                "sigma must be a positive finite number, got {}",
                sigma
            )),
        }
    }
}

impl std::fmt::Display for CleaningPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CleaningPolicy::None => write!(f, "none"),
            CleaningPolicy::OutlierReject { sigma } => write!(f, "outlier-reject({}σ)", sigma),
        }
    }
}

/// Handles sample cleaning and per-frame aggregation.
pub struct DataProcessor;

impl DataProcessor {
    /// Clean `column` of a raw benchmark table.
    ///
    /// Output columns: [`frameNumber` (i64), `column` (f64)], one row per
    /// frame number, ascending.
    pub fn clean(
        df: &DataFrame,
        column: &str,
        policy: CleaningPolicy,
    ) -> Result<DataFrame, ProcessorError> {
        for name in [FRAME_COLUMN, column] {
            if !Self::has_column(df, name) {
                return Err(ProcessorError::MissingColumn(name.to_string()));
            }
        }

        let samples = df
            .clone()
            .lazy()
            .select([
                col(FRAME_COLUMN),
                col(column).strict_cast(DataType::Float64),
            ])
            .filter(
                col(column)
                    .is_not_null()
                    .and(col(column).is_not_nan())
                    .and(col(column).neq(lit(0.0))),
            )
            .collect()?;
        debug!(
            "`{}`: {} of {} samples left after zero/null/NaN exclusion",
            column,
            samples.height(),
            df.height()
        );

        if samples.height() == 0 {
            return Err(ProcessorError::EmptySeries);
        }

        let samples = match policy {
            CleaningPolicy::None => samples,
            CleaningPolicy::OutlierReject { sigma } => {
                let before = samples.height();
                let (low, high) = Self::outlier_band(&Self::column_values(&samples, column)?, sigma);
                let kept = samples
                    .lazy()
                    .filter(
                        col(column)
                            .gt_eq(lit(low))
                            .and(col(column).lt_eq(lit(high))),
                    )
                    .collect()?;
                debug!(
                    "`{}`: rejected {} outliers outside [{:.3}, {:.3}]",
                    column,
                    before - kept.height(),
                    low,
                    high
                );
                kept
            }
        };

        let cleaned = samples
            .lazy()
            .with_column(col(FRAME_COLUMN).strict_cast(DataType::Int64))
            .filter(col(FRAME_COLUMN).is_not_null())
            .group_by([col(FRAME_COLUMN)])
            .agg([col(column).mean()])
            .sort_by_exprs([col(FRAME_COLUMN)], SortMultipleOptions::default())
            .collect()?;

        if cleaned.height() == 0 {
            return Err(ProcessorError::EmptySeries);
        }

        Ok(cleaned)
    }

    /// Inclusive band `[mean - sigma * std, mean + sigma * std]`.
    ///
    /// A single sample has a std of zero, so it always survives.
    pub fn outlier_band(values: &[f64], sigma: f64) -> (f64, f64) {
        let stats = StatsCalculator::compute_descriptive_stats(values);
        let spread = sigma * stats.std;
        (stats.mean - spread, stats.mean + spread)
    }

    fn has_column(df: &DataFrame, name: &str) -> bool {
        df.get_column_names().iter().any(|c| c.as_str() == name)
    }

    fn column_values(df: &DataFrame, column: &str) -> Result<Vec<f64>, ProcessorError> {
        let values = df.column(column)?.f64()?.into_iter().flatten().collect();
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(df: &DataFrame, column: &str) -> Vec<(i64, f64)> {
        let frames = df.column(FRAME_COLUMN).unwrap().i64().unwrap();
        let values = df.column(column).unwrap().f64().unwrap();
        frames
            .into_iter()
            .zip(values.into_iter())
            .map(|(f, v)| (f.unwrap(), v.unwrap()))
            .collect()
    }

    #[test]
    fn zero_samples_are_not_averaged() {
        let df = df!(
            "frameNumber" => [1i64, 1, 2],
            "gpuTime" => [4.0, 0.0, 6.0]
        )
        .unwrap();

        let cleaned = DataProcessor::clean(&df, "gpuTime", CleaningPolicy::None).unwrap();
        assert_eq!(rows(&cleaned, "gpuTime"), vec![(1, 4.0), (2, 6.0)]);
    }

    #[test]
    fn duplicate_frames_collapse_to_their_mean() {
        let df = df!(
            "frameNumber" => [3i64, 1, 3, 2],
            "meshes" => [10i64, 5, 30, 7]
        )
        .unwrap();

        let cleaned = DataProcessor::clean(&df, "meshes", CleaningPolicy::None).unwrap();
        assert_eq!(rows(&cleaned, "meshes"), vec![(1, 5.0), (2, 7.0), (3, 20.0)]);
    }

    #[test]
    fn outlier_is_rejected_with_one_sigma() {
        let df = df!(
            "frameNumber" => [1i64, 2, 3, 4, 5],
            "gpuTime" => [10.0, 10.0, 10.0, 10.0, 1000.0]
        )
        .unwrap();

        let cleaned =
            DataProcessor::clean(&df, "gpuTime", CleaningPolicy::outlier_reject(1.0)).unwrap();
        let values: Vec<f64> = rows(&cleaned, "gpuTime").into_iter().map(|r| r.1).collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;

        assert_eq!(values.len(), 4);
        assert!((mean - 10.0).abs() < 1e-9);
    }

    #[test]
    fn without_rejection_the_outlier_stays() {
        let df = df!(
            "frameNumber" => [1i64, 2, 3, 4, 5],
            "gpuTime" => [10.0, 10.0, 10.0, 10.0, 1000.0]
        )
        .unwrap();

        let cleaned = DataProcessor::clean(&df, "gpuTime", CleaningPolicy::None).unwrap();
        assert_eq!(cleaned.height(), 5);
    }

    #[test]
    fn single_sample_survives_outlier_rejection() {
        let df = df!("frameNumber" => [7i64], "first" => [42.0]).unwrap();

        let cleaned =
            DataProcessor::clean(&df, "first", CleaningPolicy::outlier_reject(3.0)).unwrap();
        assert_eq!(rows(&cleaned, "first"), vec![(7, 42.0)]);
    }

    #[test]
    fn nan_samples_are_excluded_under_both_policies() {
        let df = df!(
            "frameNumber" => [1i64, 1, 2],
            "gpuTime" => [f64::NAN, 4.0, 6.0]
        )
        .unwrap();

        for policy in [CleaningPolicy::None, CleaningPolicy::outlier_reject(3.0)] {
            let cleaned = DataProcessor::clean(&df, "gpuTime", policy).unwrap();
            assert_eq!(rows(&cleaned, "gpuTime"), vec![(1, 4.0), (2, 6.0)], "{}", policy);
        }
    }

    #[test]
    fn null_samples_are_excluded_under_both_policies() {
        let df = df!(
            "frameNumber" => [1i64, 1, 2],
            "gpuTime" => [None, Some(4.0), Some(6.0)]
        )
        .unwrap();

        for policy in [CleaningPolicy::None, CleaningPolicy::outlier_reject(3.0)] {
            let cleaned = DataProcessor::clean(&df, "gpuTime", policy).unwrap();
            assert_eq!(rows(&cleaned, "gpuTime"), vec![(1, 4.0), (2, 6.0)], "{}", policy);
        }
    }

    #[test]
    fn all_zero_column_is_empty() {
        let df = df!("frameNumber" => [1i64, 2], "second" => [0.0, 0.0]).unwrap();

        let err = DataProcessor::clean(&df, "second", CleaningPolicy::None).unwrap_err();
        assert!(matches!(err, ProcessorError::EmptySeries));
    }

    #[test]
    fn missing_column_is_reported() {
        let df = df!("frameNumber" => [1i64], "meshes" => [3.0]).unwrap();

        let err = DataProcessor::clean(&df, "gpuTime", CleaningPolicy::None).unwrap_err();
        assert!(matches!(err, ProcessorError::MissingColumn(ref c) if c == "gpuTime"));
    }

    #[test]
    fn non_numeric_frame_number_fails() {
        let df = df!(
            "frameNumber" => ["1", "two"],
            "meshes" => [3.0, 4.0]
        )
        .unwrap();

        assert!(DataProcessor::clean(&df, "meshes", CleaningPolicy::None).is_err());
    }

    #[test]
    fn cleaning_twice_gives_the_same_table() {
        let df = df!(
            "frameNumber" => [2i64, 1, 2, 3],
            "meshes" => [1.0, 2.0, 3.0, 0.0]
        )
        .unwrap();

        let policy = CleaningPolicy::outlier_reject(3.0);
        let a = DataProcessor::clean(&df, "meshes", policy).unwrap();
        let b = DataProcessor::clean(&df, "meshes", policy).unwrap();
        assert!(a.equals(&b));
    }

    #[test]
    fn sigma_must_be_positive() {
        assert!(CleaningPolicy::outlier_reject(0.0).validate().is_err());
        assert!(CleaningPolicy::outlier_reject(f64::NAN).validate().is_err());
        assert!(CleaningPolicy::outlier_reject(2.5).validate().is_ok());
        assert!(CleaningPolicy::None.validate().is_ok());
    }

    #[test]
    fn policy_deserializes_with_default_sigma() {
        let policy: CleaningPolicy = serde_json::from_str(r#"{"policy":"outlier_reject"}"#).unwrap();
        assert_eq!(policy, CleaningPolicy::outlier_reject(DEFAULT_SIGMA));

        let policy: CleaningPolicy = serde_json::from_str(r#"{"policy":"none"}"#).unwrap();
        assert_eq!(policy, CleaningPolicy::None);
    }
}
