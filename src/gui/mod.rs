//! GUI module - Interactive comparison viewer

mod app;
mod chart_viewer;

pub use app::ComparisonApp;
pub use chart_viewer::ChartViewer;
