//! Statistics Calculator Module
//! Descriptive statistics per series and Welch t-tests against a baseline series.

use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Statistics for a single cleaned series.
#[derive(Debug, Clone)]
pub struct SeriesStats {
    pub label: String,
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub p95: f64,
    pub p05: f64,
    pub std_diff_from_baseline: Option<f64>,
    pub p_value: Option<f64>,
    pub is_significant: bool,
}

impl Default for SeriesStats {
    fn default() -> Self {
        Self {
            label: String::new(),
            count: 0,
            mean: f64::NAN,
            median: f64::NAN,
            std: f64::NAN,
            variance: f64::NAN,
            min: f64::NAN,
            max: f64::NAN,
            p95: f64::NAN,
            p05: f64::NAN,
            std_diff_from_baseline: None,
            p_value: None,
            is_significant: false,
        }
    }
}

/// Handles statistical calculations.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics for an array of values.
    pub fn compute_descriptive_stats(values: &[f64]) -> SeriesStats {
        let n = values.len();
        if n == 0 {
            return SeriesStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = values.iter().sum::<f64>() / n as f64;
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        // Sample variance; a lone sample has no spread
        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        SeriesStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            variance,
            min: sorted[0],
            max: sorted[n - 1],
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
            ..SeriesStats::default()
        }
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Perform Welch's t-test (independent samples, unequal variance).
    ///
    /// Returns the two-tailed p-value and whether it is significant.
    pub fn perform_ttest(values: &[f64], baseline: &[f64]) -> (f64, bool) {
        let n1 = values.len() as f64;
        let n2 = baseline.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return (f64::NAN, false);
        }

        let mean1 = values.iter().sum::<f64>() / n1;
        let mean2 = baseline.iter().sum::<f64>() / n2;

        let var1 = values.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
        let var2 = baseline.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            return if mean1 == mean2 { (1.0, false) } else { (0.0, true) };
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        match StudentsT::new(0.0, 1.0, df) {
            Ok(dist) => {
                let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
                (p_value, p_value <= SIGNIFICANCE_THRESHOLD)
            }
            Err(_) => (f64::NAN, false),
        }
    }

    /// Compute stats for every series; all but the first are tested against the first.
    pub fn compute_comparison_stats(labels: &[String], series: &[Vec<f64>]) -> Vec<SeriesStats> {
        let Some(baseline) = series.first() else {
            return Vec::new();
        };
        let baseline_stats = Self::compute_descriptive_stats(baseline);

        labels
            .iter()
            .zip(series)
            .enumerate()
            .map(|(i, (label, values))| {
                let mut stats = Self::compute_descriptive_stats(values);
                stats.label = label.clone();

                if i > 0 {
                    if baseline_stats.std > 0.0 && !baseline_stats.mean.is_nan() {
                        stats.std_diff_from_baseline =
                            Some((stats.mean - baseline_stats.mean) / baseline_stats.std);
                    }
                    let (p_value, is_significant) = Self::perform_ttest(values, baseline);
                    stats.p_value = Some(p_value);
                    stats.is_significant = is_significant;
                }

                stats
            })
            .collect()
    }
}
