//! Chart Plotter Module
//! Draws comparison charts interactively using egui_plot.

use super::comparison::Comparison;
use egui::{Color32, RichText};
use egui::Vec2b;
use egui_plot::{
    Bar, BarChart, Corner, HLine, Legend, Line, LineStyle, Plot, PlotBounds, PlotPoints,
};

/// Text color for significant p-values.
pub const SIGNIFICANT_COLOR: Color32 = Color32::from_rgb(220, 53, 69);

const BAR_WIDTH: f64 = 0.5;
const CAP_HALF_WIDTH: f64 = 0.08;

/// Creates comparison charts using egui_plot.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Fixed view of the line chart: full frame range, y from 0 to `y_limit`.
    pub fn line_bounds(comparison: &Comparison) -> PlotBounds {
        let (x_min, x_max) = comparison.frame_range();
        let x_max = x_max.max(x_min + 1);
        PlotBounds::from_min_max(
            [x_min as f64, 0.0],
            [x_max as f64, comparison.spec.y_limit],
        )
    }

    /// Fixed view of the bar chart, or `None` when the chart has no bar plot.
    pub fn bar_bounds(comparison: &Comparison) -> Option<PlotBounds> {
        let bar = comparison.spec.bar.as_ref()?;
        Some(PlotBounds::from_min_max(
            [-0.5, 0.0],
            [comparison.series.len() as f64 - 0.5, bar.y_limit],
        ))
    }

    /// Draw the per-frame line chart with a dotted mean line per series.
    pub fn draw_line_chart(ui: &mut egui::Ui, comparison: &Comparison, height: f32) {
        let spec = &comparison.spec;
        let bounds = Self::line_bounds(comparison);

        Plot::new(format!("line_{}", spec.name))
            .height(height)
            .legend(Legend::default().position(Corner::RightTop))
            .x_axis_label(spec.x_label.clone())
            .y_axis_label(spec.y_label.clone())
            .auto_bounds(Vec2b::new(false, false))
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(bounds);

                for (idx, s) in comparison.series.iter().enumerate() {
                    let color = s.color.to_color32();
                    let label = comparison.legend_label(idx);

                    let points: PlotPoints = s
                        .series
                        .points()
                        .iter()
                        .map(|&(frame, value)| [frame as f64, value])
                        .collect();
                    plot_ui.line(Line::new(points).color(color).width(1.5).name(&label));

                    // Same name as the series unless the mean gets its own entry
                    let mean_name = comparison.mean_line_label(idx).unwrap_or(label);
                    plot_ui.hline(
                        HLine::new(s.stats.mean)
                            .color(color.gamma_multiply(0.5))
                            .width(2.0)
                            .style(LineStyle::dotted_dense())
                            .name(mean_name),
                    );
                }
            });
    }

    /// Draw the bar chart of means with (scaled) std error bars.
    pub fn draw_bar_chart(ui: &mut egui::Ui, comparison: &Comparison, height: f32) {
        let Some(bounds) = Self::bar_bounds(comparison) else {
            return;
        };

        let x_labels: Vec<String> = (0..comparison.series.len())
            .map(|i| comparison.bar_label(i))
            .collect();

        Plot::new(format!("bar_{}", comparison.spec.name))
            .height(height)
            .y_axis_label(comparison.spec.y_label.clone())
            .auto_bounds(Vec2b::new(false, false))
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .allow_boxed_zoom(false)
            .show_grid([false, true])
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                x_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.set_plot_bounds(bounds);

                for (idx, s) in comparison.series.iter().enumerate() {
                    let color = s.color.to_color32();
                    let x = idx as f64;
                    let mean = s.stats.mean;
                    let err = comparison.error_bar(idx);

                    plot_ui.bar_chart(
                        BarChart::new(vec![Bar::new(x, mean)
                            .width(BAR_WIDTH)
                            .fill(color)
                            .name(&s.label)])
                        .color(color),
                    );

                    for segment in Self::error_bar_segments(x, mean, err) {
                        plot_ui.line(
                            Line::new(PlotPoints::from_iter(segment))
                                .color(Color32::BLACK)
                                .width(1.5),
                        );
                    }
                }
            });
    }

    /// Vertical whisker plus top and bottom caps.
    fn error_bar_segments(x: f64, mean: f64, err: f64) -> [[[f64; 2]; 2]; 3] {
        let (low, high) = (mean - err, mean + err);
        [
            [[x, low], [x, high]],
            [[x - CAP_HALF_WIDTH, low], [x + CAP_HALF_WIDTH, low]],
            [[x - CAP_HALF_WIDTH, high], [x + CAP_HALF_WIDTH, high]],
        ]
    }

    /// Draw statistics table
    pub fn draw_stats_table(ui: &mut egui::Ui, comparison: &Comparison) {
        let precision = comparison.spec.mean_precision.max(2);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new(ui.make_persistent_id(format!(
                    "stats_table_{}",
                    comparison.spec.name
                )))
                .striped(true)
                .min_col_width(55.0)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    for header in ["Series", "N", "Mean", "Median", "Std", "P05", "P95", "Δ/σ", "P-value"] {
                        ui.label(RichText::new(header).strong().size(11.0));
                    }
                    ui.end_row();

                    let default_text_color = ui.visuals().text_color();

                    for s in &comparison.series {
                        let gs = &s.stats;
                        ui.label(
                            RichText::new(&s.label)
                                .size(11.0)
                                .color(s.color.to_color32()),
                        );
                        ui.label(RichText::new(gs.count.to_string()).size(11.0));
                        for value in [gs.mean, gs.median, gs.std, gs.p05, gs.p95] {
                            ui.label(RichText::new(format!("{:.*}", precision, value)).size(11.0));
                        }

                        if let Some(diff) = gs.std_diff_from_baseline {
                            ui.label(RichText::new(format!("{:.3}", diff)).size(11.0));
                        } else {
                            ui.label(RichText::new("-").size(11.0));
                        }

                        if let Some(p) = gs.p_value {
                            let p_color = if gs.is_significant {
                                SIGNIFICANT_COLOR
                            } else {
                                default_text_color
                            };
                            ui.label(RichText::new(format!("{:.4}", p)).size(11.0).color(p_color));
                        } else {
                            ui.label(RichText::new("-").size(11.0));
                        }
                        ui.end_row();
                    }
                });
            });
    }
}
