//! GamePulse - Gaming Survey Analysis & Interactive Dashboard
//!
//! Loads two survey exports, joins them on the shared ID column and renders
//! descriptive charts over an age-filtered view of the answers.

mod charts;
mod data;
mod gui;
mod stats;

use anyhow::Context;
use eframe::egui;
use gui::DashboardApp;

fn main() -> anyhow::Result<()> {
    // The load is synchronous and fatal on a missing join key: nothing may
    // render before both tables are joined.
    let dataset = data::DatasetLoader::load(data::SURVEY_PATH, data::IMPACT_PATH)
        .context("Не вдалося завантажити дані опитування")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("GamePulse - Аналіз ігрового опитування"),
        ..Default::default()
    };

    eframe::run_native(
        "GamePulse",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, dataset)))),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
}
