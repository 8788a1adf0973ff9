//! Static Chart Renderer
//! Writes comparison charts to PNG or SVG files with plotters.
//!
//! Layout per chart:
//! 1. `<name>_line.<ext>`: series per frame, dotted mean lines, legend top-right
//! 2. `<name>_bar.<ext>`: mean per series with std error bars (when configured)

use super::comparison::Comparison;
use log::info;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const LINE_SIZE: (u32, u32) = (1400, 500);
const BAR_SIZE: (u32, u32) = (600, 500);
const FONT: &str = "sans-serif";
/// Number of dashes across the x axis for mean reference lines.
const MEAN_DASHES: i64 = 120;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to draw {}: {message}", path.display())]
    Drawing { path: PathBuf, message: String },
}

/// Image format of written charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
    Svg,
}

impl ImageFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Figure {
    Line,
    Bar,
}

impl Figure {
    fn suffix(self) -> &'static str {
        match self {
            Figure::Line => "line",
            Figure::Bar => "bar",
        }
    }

    fn size(self) -> (u32, u32) {
        match self {
            Figure::Line => LINE_SIZE,
            Figure::Bar => BAR_SIZE,
        }
    }
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Output path of the line chart of `name`.
    pub fn line_path(out_dir: &Path, name: &str, format: ImageFormat) -> PathBuf {
        Self::output_path(out_dir, name, Figure::Line, format)
    }

    /// Output path of the bar chart of `name`.
    pub fn bar_path(out_dir: &Path, name: &str, format: ImageFormat) -> PathBuf {
        Self::output_path(out_dir, name, Figure::Bar, format)
    }

    fn output_path(out_dir: &Path, name: &str, figure: Figure, format: ImageFormat) -> PathBuf {
        out_dir.join(format!("{}_{}.{}", name, figure.suffix(), format.extension()))
    }

    /// Write the line chart and, when configured, the bar chart.
    ///
    /// Returns the written paths.
    pub fn render_comparison(
        comparison: &Comparison,
        out_dir: &Path,
        format: ImageFormat,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(out_dir).map_err(|source| RenderError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let mut figures = vec![Figure::Line];
        if comparison.spec.bar.is_some() {
            figures.push(Figure::Bar);
        }

        let mut written = Vec::new();
        for figure in figures {
            let path = Self::output_path(out_dir, &comparison.spec.name, figure, format);
            Self::render_to(&path, format, figure, comparison)?;
            info!("wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }

    fn render_to(
        path: &Path,
        format: ImageFormat,
        figure: Figure,
        comparison: &Comparison,
    ) -> Result<(), RenderError> {
        let result = match format {
            ImageFormat::Png => {
                let root = BitMapBackend::new(path, figure.size()).into_drawing_area();
                Self::draw(&root, figure, comparison)
            }
            ImageFormat::Svg => {
                let root = SVGBackend::new(path, figure.size()).into_drawing_area();
                Self::draw(&root, figure, comparison)
            }
        };

        result.map_err(|e| RenderError::Drawing {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    fn draw<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        figure: Figure,
        comparison: &Comparison,
    ) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        root.fill(&WHITE)?;
        match figure {
            Figure::Line => Self::draw_line_chart(root, comparison)?,
            Figure::Bar => Self::draw_bar_chart(root, comparison)?,
        }
        root.present()?;
        Ok(())
    }

    /// x = frame number, y = cleaned value, one line per series plus its mean.
    fn draw_line_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        comparison: &Comparison,
    ) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let spec = &comparison.spec;
        let (x_min, x_max) = comparison.frame_range();
        let x_max = x_max.max(x_min + 1);

        let mut chart = ChartBuilder::on(root)
            .caption(&spec.title, (FONT, 28).into_font())
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d(x_min..x_max, 0f64..spec.y_limit)?;

        chart
            .configure_mesh()
            .x_desc(spec.x_label.as_str())
            .y_desc(spec.y_label.as_str())
            .light_line_style(BLACK.mix(0.05))
            .draw()?;

        let dash = ((x_max - x_min) / MEAN_DASHES).max(1);
        for (idx, s) in comparison.series.iter().enumerate() {
            let color = s.color.to_plotters();

            chart
                .draw_series(LineSeries::new(
                    s.series.points().iter().copied(),
                    color.stroke_width(2),
                ))?
                .label(comparison.legend_label(idx))
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2))
                });

            let mean = s.stats.mean;
            let mean_style = color.mix(0.5).stroke_width(2);
            let mean_line = chart.draw_series(
                (x_min..x_max)
                    .step_by((dash * 2) as usize)
                    .map(move |x| {
                        PathElement::new(vec![(x, mean), ((x + dash).min(x_max), mean)], mean_style)
                    }),
            )?;
            if let Some(label) = comparison.mean_line_label(idx) {
                mean_line.label(label).legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 6, y)], mean_style)
                });
            }
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font((FONT, 16).into_font())
            .draw()?;

        Ok(())
    }

    /// One bar per series: height = mean, error bar = scaled std.
    fn draw_bar_chart<DB: DrawingBackend>(
        root: &DrawingArea<DB, Shift>,
        comparison: &Comparison,
    ) -> DrawResult
    where
        DB::ErrorType: 'static,
    {
        let Some(bar) = comparison.spec.bar.as_ref() else {
            return Ok(());
        };
        let n = comparison.series.len();
        let labels: Vec<String> = (0..n).map(|i| comparison.bar_label(i)).collect();

        let mut chart = ChartBuilder::on(root)
            .caption(&bar.title, (FONT, 24).into_font())
            .margin(20)
            .x_label_area_size(45)
            .y_label_area_size(70)
            .build_cartesian_2d((0usize..n).into_segmented(), 0f64..bar.y_limit)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .light_line_style(BLACK.mix(0.05))
            .bold_line_style(BLACK.mix(0.2))
            .y_desc(comparison.spec.y_label.as_str())
            .x_label_formatter(&|v| match v {
                SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
                _ => String::new(),
            })
            .draw()?;

        chart.draw_series(comparison.series.iter().enumerate().map(|(i, s)| {
            let mut rect = Rectangle::new(
                [
                    (SegmentValue::Exact(i), 0.0),
                    (SegmentValue::Exact(i + 1), s.stats.mean),
                ],
                s.color.to_plotters().filled(),
            );
            rect.set_margin(0, 0, 40, 40);
            rect
        }))?;

        chart.draw_series(comparison.series.iter().enumerate().map(|(i, s)| {
            let err = comparison.error_bar(i);
            ErrorBar::new_vertical(
                SegmentValue::CenterOf(i),
                s.stats.mean - err,
                s.stats.mean,
                s.stats.mean + err,
                BLACK.stroke_width(2),
                16,
            )
        }))?;

        Ok(())
    }
}
