//! Chart Viewer Widget
//! Scrollable card showing one comparison: line chart, bar chart and statistics.

use crate::charts::{ChartPlotter, Comparison};
use egui::{RichText, ScrollArea};

const LINE_HEIGHT: f32 = 360.0;
const BAR_HEIGHT: f32 = 300.0;
const BAR_WIDTH: f32 = 520.0;

/// Shows the currently selected comparison.
#[derive(Default)]
pub struct ChartViewer;

impl ChartViewer {
    pub fn new() -> Self {
        Self
    }

    pub fn show(&mut self, ui: &mut egui::Ui, comparison: Option<&Comparison>) {
        let Some(comparison) = comparison else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("No Data").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                Self::draw_chart_card(ui, comparison);
            });
    }

    fn draw_chart_card(ui: &mut egui::Ui, comparison: &Comparison) {
        let spec = &comparison.spec;

        egui::Frame::none()
            .rounding(8.0)
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&spec.title).size(18.0).strong());
                        ui.label(
                            RichText::new(format!("cleaning: {}", comparison.policy))
                                .size(12.0)
                                .weak(),
                        );
                    });

                    ui.add_space(8.0);
                    ChartPlotter::draw_line_chart(ui, comparison, LINE_HEIGHT);

                    if let Some(bar) = &spec.bar {
                        ui.add_space(12.0);
                        ui.label(RichText::new(&bar.title).size(14.0).strong());
                        ui.vertical(|ui| {
                            ui.set_width(BAR_WIDTH.min(ui.available_width()));
                            ChartPlotter::draw_bar_chart(ui, comparison, BAR_HEIGHT);
                        });
                    }

                    ui.add_space(10.0);
                    ChartPlotter::draw_stats_table(ui, comparison);
                });
            });
    }
}
