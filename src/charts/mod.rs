//! Charts module - comparison building and rendering

mod comparison;
mod palette;
mod plotter;
mod renderer;

pub use comparison::{Comparison, ComparisonError, ComparisonSeries};
pub use palette::{Palette, Rgb, BUILTIN_COLORS};
pub use plotter::ChartPlotter;
pub use renderer::{ImageFormat, RenderError, StaticChartRenderer};
