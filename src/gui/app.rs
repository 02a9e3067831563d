//! GamePulse Main Application
//! Main window with control panel and chart viewer. Filter changes trigger
//! a full recompute of every summary on a background thread.

use crate::data::{FilteredView, SurveyDataset};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use crate::stats::DashboardSummaries;
use egui::SidePanel;
use std::path::Path;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

/// Shown whenever the current filter matches no survey rows.
const NO_DATA_STATUS: &str = "Немає даних, що відповідають вибраним критеріям фільтрації.";

/// Recompute result from the background thread
enum CalcResult {
    Progress(f32, String),
    Complete {
        view: FilteredView,
        summaries: Box<DashboardSummaries>,
    },
    Empty,
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    dataset: Arc<SurveyDataset>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    view: Option<FilteredView>,
    summaries: Option<DashboardSummaries>,

    calc_rx: Option<Receiver<CalcResult>>,
    is_calculating: bool,
    pending_refresh: bool,
}

impl DashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, dataset: SurveyDataset) -> Self {
        let control_panel = ControlPanel::new(dataset.distinct_ages(), dataset.has_ages());
        let mut app = Self {
            dataset: Arc::new(dataset),
            control_panel,
            chart_viewer: ChartViewer::new(),
            view: None,
            summaries: None,
            calc_rx: None,
            is_calculating: false,
            pending_refresh: false,
        };
        // First pass over the default all-ages selection.
        app.start_recompute();
        app
    }

    /// Filter and recompute every summary in a background thread.
    fn start_recompute(&mut self) {
        if self.is_calculating {
            self.pending_refresh = true;
            return;
        }

        let selection = self.control_panel.selected_ages();
        let dataset = Arc::clone(&self.dataset);

        let (tx, rx) = channel();
        self.calc_rx = Some(rx);
        self.is_calculating = true;
        self.control_panel.set_progress(5.0, "Фільтрація даних...");

        thread::spawn(move || {
            Self::run_recompute(tx, dataset, selection);
        });
    }

    /// Run the filter pass and summary computation (background thread).
    fn run_recompute(
        tx: Sender<CalcResult>,
        dataset: Arc<SurveyDataset>,
        selection: Option<std::collections::HashSet<i32>>,
    ) {
        let _ = tx.send(CalcResult::Progress(20.0, "Фільтрація даних...".to_string()));

        let view = match dataset.filter_by_ages(selection.as_ref()) {
            Ok(view) => view,
            Err(err) => {
                let _ = tx.send(CalcResult::Error(err.to_string()));
                return;
            }
        };

        // An empty filtered set must not reach the aggregation stage.
        if view.is_empty() {
            let _ = tx.send(CalcResult::Empty);
            return;
        }

        let _ = tx.send(CalcResult::Progress(
            50.0,
            "Обчислення зведень...".to_string(),
        ));

        let summaries = DashboardSummaries::compute(&view);
        let _ = tx.send(CalcResult::Complete {
            view,
            summaries: Box::new(summaries),
        });
    }

    /// Check for recompute results
    fn check_calculation_results(&mut self) {
        let rx = self.calc_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    CalcResult::Progress(progress, status) => {
                        self.control_panel.set_progress(progress, &status);
                    }
                    CalcResult::Complete { view, summaries } => {
                        let rows = view.survey.height();
                        self.view = Some(view);
                        self.summaries = Some(*summaries);
                        self.chart_viewer.invalidate();
                        self.control_panel
                            .set_progress(100.0, &format!("Готово: {} анкет у вибірці", rows));
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                    CalcResult::Empty => {
                        self.view = None;
                        self.summaries = None;
                        self.chart_viewer.invalidate();
                        self.control_panel.set_progress(0.0, NO_DATA_STATUS);
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                    CalcResult::Error(error) => {
                        self.control_panel
                            .set_progress(0.0, &format!("Помилка: {}", error));
                        self.is_calculating = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.calc_rx = Some(rx);
            }
        }

        if !self.is_calculating && self.pending_refresh {
            self.pending_refresh = false;
            self.start_recompute();
        }
    }

    /// Serialize the current summary tables to a pretty JSON report.
    fn handle_export_report(&mut self) {
        let Some(summaries) = &self.summaries else {
            self.control_panel
                .set_progress(0.0, "Немає звіту для збереження");
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("gamepulse_report.json")
            .save_file()
        else {
            return; // User cancelled
        };

        match Self::write_report(summaries, &path) {
            Ok(()) => {
                self.control_panel
                    .set_progress(100.0, &format!("Звіт збережено: {}", path.display()));
                let _ = open::that(&path);
            }
            Err(err) => {
                self.control_panel
                    .set_progress(0.0, &format!("Помилка: {}", err));
            }
        }
    }

    fn write_report(summaries: &DashboardSummaries, path: &Path) -> anyhow::Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(std::io::BufWriter::new(file), summaries)?;
        Ok(())
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_calculation_results();

        if self.is_calculating {
            ctx.request_repaint();
        }

        // Left panel - filters and status
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.control_panel.show(ui);

                    match action {
                        ControlPanelAction::FilterChanged => self.start_recompute(),
                        ControlPanelAction::ExportReport => self.handle_export_report(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - chart grid
        egui::CentralPanel::default().show(ctx, |ui| {
            match (&self.summaries, &self.view) {
                (Some(summaries), Some(view)) => {
                    // Clones are cheap column handles; the viewer only reads.
                    let summaries = summaries.clone();
                    let view = view.clone();
                    self.chart_viewer.show(ui, &summaries, &view);
                }
                _ => {
                    ui.centered_and_justified(|ui| {
                        let message = if self.is_calculating {
                            "Обчислення..."
                        } else {
                            NO_DATA_STATUS
                        };
                        ui.label(egui::RichText::new(message).size(18.0));
                    });
                }
            }
        });
    }
}
