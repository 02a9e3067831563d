//! Control Panel Widget
//! Left side panel with the age filter, progress and report export.

use egui::{Color32, RichText, ScrollArea};
use std::collections::HashSet;

/// Left side panel driving the filter pass and the report export.
pub struct ControlPanel {
    pub ages: Vec<i32>,
    pub selected: Vec<bool>,
    pub select_all: bool,
    /// False when the survey export has no age column.
    pub filter_enabled: bool,
    pub progress: f32,
    pub status: String,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            ages: Vec::new(),
            selected: Vec::new(),
            select_all: true,
            filter_enabled: false,
            progress: 0.0,
            status: "Готово".to_string(),
        }
    }
}

impl ControlPanel {
    /// Seed the panel from the loaded dataset. All ages start selected.
    pub fn new(ages: Vec<i32>, filter_enabled: bool) -> Self {
        let selected = vec![true; ages.len()];
        Self {
            ages,
            selected,
            select_all: true,
            filter_enabled,
            ..Self::default()
        }
    }

    /// Current age selection. `None` disables filtering (pass-through).
    pub fn selected_ages(&self) -> Option<HashSet<i32>> {
        if !self.filter_enabled {
            return None;
        }
        Some(
            self.ages
                .iter()
                .zip(self.selected.iter())
                .filter(|(_, &selected)| selected)
                .map(|(&age, _)| age)
                .collect(),
        )
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🎮 GamePulse")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Аналіз ігрового опитування")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Filter Section =====
        ui.label(RichText::new("Фільтри").size(14.0).strong());
        ui.add_space(5.0);

        if self.filter_enabled {
            if ui
                .checkbox(&mut self.select_all, "Обрати всі віки")
                .changed()
            {
                let value = self.select_all;
                self.selected.iter_mut().for_each(|s| *s = value);
                action = ControlPanelAction::FilterChanged;
            }

            ui.add_space(5.0);
            egui::Frame::none()
                .fill(ui.visuals().widgets.noninteractive.bg_fill)
                .rounding(5.0)
                .inner_margin(5.0)
                .show(ui, |ui| {
                    ScrollArea::vertical()
                        .id_salt("age_filter")
                        .max_height(200.0)
                        .show(ui, |ui| {
                            for (i, age) in self.ages.iter().enumerate() {
                                if ui
                                    .checkbox(&mut self.selected[i], format!("{} р.", age))
                                    .changed()
                                {
                                    action = ControlPanelAction::FilterChanged;
                                }
                            }
                        });
                });

            if action == ControlPanelAction::FilterChanged {
                self.select_all = self.selected.iter().all(|&s| s);
            }
        } else {
            ui.label(
                RichText::new("Стовпець 'Вік' не знайдено. Фільтрація за віком недоступна.")
                    .size(12.0)
                    .color(Color32::from_rgb(255, 193, 7)),
            );
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Report Section =====
        ui.vertical_centered(|ui| {
            let button = egui::Button::new(RichText::new("💾 Зберегти звіт (JSON)").size(14.0))
                .min_size(egui::vec2(200.0, 30.0));
            if ui.add(button).clicked() {
                action = ControlPanelAction::ExportReport;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Progress Section =====
        ui.label(RichText::new("Стан").size(14.0).strong());
        ui.add_space(5.0);

        ui.add(
            egui::ProgressBar::new(self.progress / 100.0)
                .show_percentage()
                .animate(self.progress > 0.0 && self.progress < 100.0),
        );

        ui.add_space(5.0);

        let status_color = if self.status.contains("Помилка") {
            Color32::from_rgb(220, 53, 69)
        } else if self.status.contains("Немає даних") {
            Color32::from_rgb(255, 193, 7)
        } else if self.status.contains("Готово") || self.status.contains("збережено") {
            Color32::from_rgb(40, 167, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));

        action
    }

    /// Set progress and status
    pub fn set_progress(&mut self, progress: f32, status: &str) {
        self.progress = progress;
        self.status = status.to_string();
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    FilterChanged,
    ExportReport,
}
