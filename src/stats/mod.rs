//! Stats module - aggregation primitives and chart summaries

pub mod aggregate;
pub mod summaries;

pub use aggregate::{AggError, CategoryChoice};
pub use summaries::{DashboardSummaries, Polarity};
