//! Benchplot Viewer Application
//! Window listing the rendered comparisons, with the selected one on the right.

use crate::charts::Comparison;
use crate::gui::ChartViewer;
use egui::{RichText, SidePanel};

/// Main application window.
pub struct ComparisonApp {
    comparisons: Vec<Comparison>,
    selected: usize,
    chart_viewer: ChartViewer,
}

impl ComparisonApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, comparisons: Vec<Comparison>) -> Self {
        Self {
            comparisons,
            selected: 0,
            chart_viewer: ChartViewer::new(),
        }
    }

    /// Open the viewer and block until its window is closed.
    pub fn run(comparisons: Vec<Comparison>) -> eframe::Result<()> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([1400.0, 900.0])
                .with_min_inner_size([900.0, 600.0])
                .with_title("Benchplot"),
            ..Default::default()
        };

        eframe::run_native(
            "Benchplot",
            options,
            Box::new(move |cc| Ok(Box::new(ComparisonApp::new(cc, comparisons)))),
        )
    }
}

impl eframe::App for ComparisonApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Left panel - chart list
        SidePanel::left("chart_list")
            .min_width(180.0)
            .max_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Charts");
                ui.separator();
                for (idx, comparison) in self.comparisons.iter().enumerate() {
                    let text = RichText::new(&comparison.spec.name).size(14.0);
                    if ui.selectable_label(self.selected == idx, text).clicked() {
                        self.selected = idx;
                    }
                }
            });

        // Central panel - selected chart
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer
                .show(ui, self.comparisons.get(self.selected));
        });
    }
}
