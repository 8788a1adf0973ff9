//! Benchplot - culling benchmark comparison charts
//!
//! Cleans benchmark CSVs and shows the configured comparison charts in a
//! window and/or writes them as images.

use anyhow::{anyhow, bail, Context, Result};
use benchplot::charts::{Comparison, ImageFormat, StaticChartRenderer};
use benchplot::config::Config;
use benchplot::data::{CleaningPolicy, SeriesLoader, DEFAULT_SIGMA};
use benchplot::gui::ComparisonApp;
use clap::{Parser, ValueEnum};
use log::{info, warn, LevelFilter};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// Charts to render, by name. Renders every configured chart when empty.
    charts: Vec<String>,
    /// JSON chart configuration. Uses the built-in presets when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Overwrite the directory holding the benchmark CSV files.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
    /// Overwrite the cleaning policy of every chart.
    #[arg(long, value_enum)]
    cleaning: Option<Cleaning>,
    /// Sigma multiplier for outlier rejection (implies `--cleaning outlier-reject`).
    #[arg(long)]
    sigma: Option<f64>,
    /// Where the charts go.
    #[arg(short, long, value_enum, default_value_t = Mode::Window)]
    mode: Mode,
    /// Output path for chart images.
    #[arg(short, long, default_value = "./plots/")]
    output_dir: PathBuf,
    /// Image format for chart images.
    #[arg(short, long, value_enum, default_value_t = Format::Png)]
    format: Format,
    /// Open written images with the system viewer.
    #[arg(long)]
    open: bool,
    /// List the configured charts and exit.
    #[arg(short, long)]
    list: bool,
    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Cleaning {
    /// Only drop sentinel zero samples.
    None,
    /// Drop sentinel zeros and samples outside mean ± sigma·std.
    OutlierReject,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    /// Interactive window, blocks until closed.
    Window,
    /// Image files in the output directory.
    File,
    /// Image files first, then the window.
    Both,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    Png,
    Svg,
}

impl From<Format> for ImageFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Png => ImageFormat::Png,
            Format::Svg => ImageFormat::Svg,
        }
    }
}

impl Args {
    /// Cleaning policy forced on every chart, if any.
    fn policy_override(&self) -> Result<Option<CleaningPolicy>> {
        let policy = match (self.cleaning, self.sigma) {
            (Some(Cleaning::None), Some(_)) => {
                bail!("--sigma has no effect with --cleaning none")
            }
            (Some(Cleaning::None), None) => Some(CleaningPolicy::None),
            (Some(Cleaning::OutlierReject), sigma) => Some(CleaningPolicy::outlier_reject(
                sigma.unwrap_or(DEFAULT_SIGMA),
            )),
            (None, Some(sigma)) => Some(CleaningPolicy::outlier_reject(sigma)),
            (None, None) => None,
        };
        if let Some(policy) = policy {
            policy.validate().map_err(|e| anyhow!("--sigma: {}", e))?;
        }
        Ok(policy)
    }
}

fn init_logging(verbose: bool) {
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    let _ = builder.try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::builtin().context("built-in chart presets are invalid")?,
    };
    if let Some(dir) = &args.data_dir {
        config.benchmarks_dir = dir.clone();
    }

    if args.list {
        for chart in &config.charts {
            println!("{:<20} {}", chart.name, chart.title);
        }
        return Ok(());
    }

    let policy = args.policy_override()?;
    if args.cleaning.is_none() && args.sigma.is_some() {
        info!("--sigma given, cleaning every chart with outlier rejection");
    }

    let loader = SeriesLoader::new(&config.benchmarks_dir);
    let comparisons = config
        .select(&args.charts)?
        .into_iter()
        .map(|spec| {
            Comparison::build(
                spec,
                &config.palette,
                &loader,
                policy.unwrap_or(spec.cleaning),
            )
            .with_context(|| format!("failed to build chart `{}`", spec.name))
        })
        .collect::<Result<Vec<_>>>()?;

    for comparison in &comparisons {
        println!("{}", comparison.summary());
    }

    if matches!(args.mode, Mode::File | Mode::Both) {
        for comparison in &comparisons {
            let written = StaticChartRenderer::render_comparison(
                comparison,
                &args.output_dir,
                args.format.into(),
            )?;
            if args.open {
                for path in &written {
                    if let Err(e) = open::that(path) {
                        warn!("could not open {}: {}", path.display(), e);
                    }
                }
            }
        }
    }

    if matches!(args.mode, Mode::Window | Mode::Both) {
        ComparisonApp::run(comparisons).map_err(|e| anyhow!("viewer failed: {}", e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(argv: &[&str]) -> Result<Option<CleaningPolicy>> {
        let args = Args::try_parse_from(std::iter::once("benchplot").chain(argv.iter().copied()))?;
        args.policy_override()
    }

    #[test]
    fn presets_decide_without_flags() {
        assert_eq!(policy(&[]).unwrap(), None);
    }

    #[test]
    fn sigma_alone_implies_outlier_rejection() {
        assert_eq!(
            policy(&["--sigma", "2"]).unwrap(),
            Some(CleaningPolicy::outlier_reject(2.0))
        );
        assert_eq!(
            policy(&["--cleaning", "outlier-reject"]).unwrap(),
            Some(CleaningPolicy::outlier_reject(DEFAULT_SIGMA))
        );
    }

    #[test]
    fn sigma_with_no_cleaning_is_rejected() {
        assert!(policy(&["--cleaning", "none", "--sigma", "2"]).is_err());
        assert_eq!(
            policy(&["--cleaning", "none"]).unwrap(),
            Some(CleaningPolicy::None)
        );
    }

    #[test]
    fn non_positive_sigma_is_rejected() {
        assert!(policy(&["--sigma", "0"]).is_err());
    }
}
