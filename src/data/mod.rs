//! Data module - CSV loading, joining and filtering

pub mod dataset;
mod loader;

pub use dataset::{FilteredView, SurveyDataset};
pub use loader::{DatasetLoader, LoaderError, IMPACT_PATH, SURVEY_PATH};
