//! Charts module - Chart rendering

mod plotter;

pub use plotter::{ChartPlotter, NEGATIVE_COLOR, POSITIVE_COLOR};
