//! Benchmark CSV Loader Module
//! Reads benchmark files with Polars and hands them to the cleaning pipeline.

use super::processor::{CleaningPolicy, DataProcessor, ProcessorError, FRAME_COLUMN};
use log::debug;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where the renderer's benchmark recorder drops its CSV files.
pub const DEFAULT_BENCHMARKS_DIR: &str = "../resources/benchmarks";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("benchmark file not found: {}", path.display())]
    InputNotFound { path: PathBuf },
    #[error("malformed benchmark file {} (column `{column}`): {reason}", path.display())]
    InputMalformed {
        path: PathBuf,
        column: String,
        reason: String,
    },
    #[error("no samples left in {} for column `{column}` after cleaning", path.display())]
    EmptySeries { path: PathBuf, column: String },
}

impl LoaderError {
    fn malformed(path: &Path, column: &str, reason: impl ToString) -> Self {
        LoaderError::InputMalformed {
            path: path.to_path_buf(),
            column: column.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// One measurement column of one benchmark file, cleaned and aggregated per frame.
#[derive(Debug, Clone)]
pub struct CleanedSeries {
    file: String,
    column: String,
    df: DataFrame,
    points: Vec<(i64, f64)>,
}

impl CleanedSeries {
    /// Wrap a table produced by [`DataProcessor::clean`].
    pub fn from_frame(file: &str, column: &str, df: DataFrame) -> PolarsResult<Self> {
        let frames = df.column(FRAME_COLUMN)?.i64()?;
        let values = df.column(column)?.f64()?;
        let points = frames
            .into_iter()
            .zip(values.into_iter())
            .filter_map(|(frame, value)| Some((frame?, value?)))
            .collect();

        Ok(Self {
            file: file.to_string(),
            column: column.to_string(),
            df,
            points,
        })
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    /// The cleaned table: [`frameNumber`, `column`].
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    /// (frame number, value) pairs in ascending frame order.
    pub fn points(&self) -> &[(i64, f64)] {
        &self.points
    }

    pub fn frame_numbers(&self) -> Vec<i64> {
        self.points.iter().map(|p| p.0).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.1).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// First and last frame number.
    pub fn frame_range(&self) -> Option<(i64, i64)> {
        Some((self.points.first()?.0, self.points.last()?.0))
    }
}

/// Loads benchmark files from a fixed directory.
#[derive(Debug, Clone)]
pub struct SeriesLoader {
    benchmarks_dir: PathBuf,
}

impl Default for SeriesLoader {
    fn default() -> Self {
        Self::new(DEFAULT_BENCHMARKS_DIR)
    }
}

impl SeriesLoader {
    pub fn new(benchmarks_dir: impl Into<PathBuf>) -> Self {
        Self {
            benchmarks_dir: benchmarks_dir.into(),
        }
    }

    pub fn benchmarks_dir(&self) -> &Path {
        &self.benchmarks_dir
    }

    /// Full path of a benchmark file.
    pub fn resolve(&self, file_name: &str) -> PathBuf {
        self.benchmarks_dir.join(file_name)
    }

    /// Read a CSV file using Polars.
    pub fn read_csv(path: &Path) -> PolarsResult<DataFrame> {
        LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .finish()?
            .collect()
    }

    /// Load `column` of `file_name` and clean it with `policy`.
    pub fn load(
        &self,
        file_name: &str,
        column: &str,
        policy: CleaningPolicy,
    ) -> Result<CleanedSeries, LoaderError> {
        let path = self.resolve(file_name);
        if !path.is_file() {
            return Err(LoaderError::InputNotFound { path });
        }

        let raw = Self::read_csv(&path).map_err(|e| LoaderError::malformed(&path, column, e))?;
        debug!("{}: read {} rows", path.display(), raw.height());

        let cleaned = DataProcessor::clean(&raw, column, policy).map_err(|e| match e {
            ProcessorError::EmptySeries => LoaderError::EmptySeries {
                path: path.clone(),
                column: column.to_string(),
            },
            other => LoaderError::malformed(&path, column, other),
        })?;
        debug!(
            "{}: `{}` cleaned with {} into {} frames",
            path.display(),
            column,
            policy,
            cleaned.height()
        );

        CleanedSeries::from_frame(file_name, column, cleaned)
            .map_err(|e| LoaderError::malformed(&path, column, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_inside_benchmarks_dir() {
        let loader = SeriesLoader::new("bench");
        assert_eq!(
            loader.resolve("data_twoPass.csv"),
            Path::new("bench").join("data_twoPass.csv")
        );
    }

    #[test]
    fn default_dir_matches_recorder_layout() {
        assert_eq!(
            SeriesLoader::default().benchmarks_dir(),
            Path::new(DEFAULT_BENCHMARKS_DIR)
        );
    }

    #[test]
    fn series_keeps_frame_order() {
        let df = df!("frameNumber" => [1i64, 4, 9], "meshes" => [2.0, 3.0, 4.0]).unwrap();
        let series = CleanedSeries::from_frame("a.csv", "meshes", df).unwrap();

        assert_eq!(series.frame_numbers(), vec![1, 4, 9]);
        assert_eq!(series.values(), vec![2.0, 3.0, 4.0]);
        assert_eq!(series.frame_range(), Some((1, 9)));
        assert_eq!(series.file(), "a.csv");
    }
}
