//! Chart Viewer Widget
//! Tabbed scrollable grid of chart cards fed by the current summaries.
//! Drill-down charts recompute from the filtered view on selector changes.

use egui::{Color32, ComboBox, RichText, ScrollArea};

use crate::charts::{ChartPlotter, NEGATIVE_COLOR, POSITIVE_COLOR};
use crate::data::FilteredView;
use crate::stats::aggregate::{CategoryChoice, CountRow};
use crate::stats::summaries::{self, ChartResult, DashboardSummaries, Polarity};

const CARD_SPACING: f32 = 15.0;

const ALL_CATEGORIES: &str = "Всі категорії";

#[derive(Clone, Copy, PartialEq, Eq)]
enum DashboardTab {
    Popularity,
    Impact,
}

/// Central chart area. Holds only widget state; every table it draws comes
/// from the summaries of the current filter pass.
pub struct ChartViewer {
    tab: DashboardTab,
    positive_type_choice: CategoryChoice,
    negative_type_choice: CategoryChoice,
    genre_choice: CategoryChoice,
    positive_types: Option<ChartResult<Vec<CountRow>>>,
    negative_types: Option<ChartResult<Vec<CountRow>>>,
    positive_genres: Option<ChartResult<Vec<CountRow>>>,
    negative_genres: Option<ChartResult<Vec<CountRow>>>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            tab: DashboardTab::Popularity,
            positive_type_choice: CategoryChoice::All,
            negative_type_choice: CategoryChoice::All,
            genre_choice: CategoryChoice::All,
            positive_types: None,
            negative_types: None,
            positive_genres: None,
            negative_genres: None,
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the drill-down caches after a filter pass replaced the view.
    pub fn invalidate(&mut self) {
        self.positive_types = None;
        self.negative_types = None;
        self.positive_genres = None;
        self.negative_genres = None;
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        summaries: &DashboardSummaries,
        view: &FilteredView,
    ) {
        ui.horizontal(|ui| {
            ui.selectable_value(
                &mut self.tab,
                DashboardTab::Popularity,
                RichText::new("Популярність ігор").size(15.0),
            );
            ui.selectable_value(
                &mut self.tab,
                DashboardTab::Impact,
                RichText::new("Вплив ігор").size(15.0),
            );
        });
        ui.separator();

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| match self.tab {
                DashboardTab::Popularity => Self::show_popularity(ui, summaries),
                DashboardTab::Impact => self.show_impact(ui, summaries, view),
            });
    }

    // ---------- popularity tab ----------

    fn show_popularity(ui: &mut egui::Ui, summaries: &DashboardSummaries) {
        ui.vertical_centered(|ui| {
            ui.label(
                RichText::new("Статистика популярності ігор та жанрів")
                    .size(18.0)
                    .strong(),
            );
        });
        ui.add_space(CARD_SPACING);

        let s = &summaries.popularity;
        let width = Self::card_width(ui, 3);

        ui.horizontal(|ui| {
            Self::chart_card(ui, width, "Співвідношення гравців до не гравців", |ui| {
                Self::with_rows(ui, &s.plays, |ui, rows| {
                    ChartPlotter::draw_pie(ui, rows, Some(summaries::YES));
                });
            });
            Self::chart_card(ui, width, "Топ-5 жанрів", |ui| {
                Self::with_rows(ui, &s.top_genres, |ui, rows| {
                    ChartPlotter::draw_count_bars(ui, "top_genres", rows);
                });
            });
            Self::chart_card(ui, width, "Топ-5 ігор", |ui| {
                Self::with_rows(ui, &s.top_games, |ui, rows| {
                    ChartPlotter::draw_count_bars(ui, "top_games", rows);
                });
            });
        });
        ui.add_space(CARD_SPACING);

        ui.horizontal(|ui| {
            Self::chart_card(ui, width, "Витрати на ігри", |ui| {
                Self::with_rows(ui, &s.spending, |ui, rows| {
                    ChartPlotter::draw_pie(ui, rows, Some(summaries::YES));
                });
            });
            Self::chart_card(ui, width, "Топ жанрів за відсотком донатерів", |ui| {
                Self::with_rows(ui, &s.donation_rate, |ui, rows| {
                    ChartPlotter::draw_ratio_bars(ui, "donation_rate", rows);
                });
            });
            Self::chart_card(ui, width, "Популярність часу, проведеного за іграми", |ui| {
                Self::with_rows(ui, &s.playtime, |ui, rows| {
                    ChartPlotter::draw_playtime_area(ui, "playtime", rows);
                });
            });
        });
        ui.add_space(CARD_SPACING);

        ui.horizontal(|ui| {
            Self::chart_card(ui, width, "Популярність ігрових девайсів", |ui| {
                Self::with_rows(ui, &s.devices, |ui, rows| {
                    ChartPlotter::draw_pie(ui, rows, None);
                });
            });
            Self::chart_card(
                ui,
                width,
                "Розподіл популярності девайсів за жанрами (%)",
                |ui| {
                    Self::with_rows(ui, &s.device_share, |ui, rows| {
                        ChartPlotter::draw_share_lines(ui, "device_share", rows);
                    });
                },
            );
            Self::chart_card(ui, width, "Середній час гри за жанром", |ui| {
                Self::with_rows(ui, &s.mean_playtime, |ui, rows| {
                    ChartPlotter::draw_mean_bars(ui, "mean_playtime", rows);
                });
            });
        });
    }

    // ---------- impact tab ----------

    fn show_impact(
        &mut self,
        ui: &mut egui::Ui,
        summaries: &DashboardSummaries,
        view: &FilteredView,
    ) {
        ui.vertical_centered(|ui| {
            ui.label(RichText::new("Аналіз впливу відеоігор").size(18.0).strong());
        });
        ui.add_space(CARD_SPACING);

        let s = &summaries.impact;
        let third = Self::card_width(ui, 3);
        let half = Self::card_width(ui, 2);

        ui.horizontal(|ui| {
            Self::chart_card(ui, third, "Позитивний вплив відеоігор", |ui| {
                Self::with_rows(ui, &s.positive, |ui, rows| {
                    let emphasize = rows.first().map(|r| r.label.as_str());
                    ChartPlotter::draw_pie(ui, rows, emphasize);
                });
            });
            Self::chart_card(ui, third, "Негативний вплив відеоігор", |ui| {
                Self::with_rows(ui, &s.negative, |ui, rows| {
                    let emphasize = rows.get(1).map(|r| r.label.as_str());
                    ChartPlotter::draw_pie(ui, rows, emphasize);
                });
            });
            Self::chart_card(ui, third, "Загальний вплив", |ui| {
                Self::with_rows(ui, &s.by_respondent, |ui, rows| {
                    ChartPlotter::draw_sunburst(ui, rows);
                });
            });
        });
        ui.add_space(CARD_SPACING);

        let wide = Self::card_width(ui, 1) * 0.4;
        let narrow = (Self::card_width(ui, 1) - wide - 2.0 * CARD_SPACING) / 2.0;
        ui.horizontal(|ui| {
            Self::chart_card(
                ui,
                wide,
                "Порівняння позитивного та негативного впливу за категоріями",
                |ui| {
                    Self::with_rows(ui, &s.category_comparison, |ui, rows| {
                        ChartPlotter::draw_grouped_hbars(ui, "category_comparison", rows);
                    });
                },
            );

            let positive_title = match &self.positive_type_choice {
                CategoryChoice::All => "Топ-5 типів позитивного впливу".to_string(),
                CategoryChoice::One(category) => {
                    format!("Типи позитивного впливу: {category}")
                }
            };
            Self::chart_card(ui, narrow, &positive_title, |ui| {
                if Self::category_combo(
                    ui,
                    "positive_type_category",
                    &s.positive_categories,
                    &mut self.positive_type_choice,
                ) {
                    self.positive_types = None;
                }
                let choice = self.positive_type_choice.clone();
                let outcome = self.positive_types.get_or_insert_with(|| {
                    summaries::impact_type_drilldown(&view.merged, Polarity::Positive, &choice)
                });
                Self::with_rows(ui, outcome, |ui, rows| {
                    ChartPlotter::draw_count_bars_solid(
                        ui,
                        "positive_types",
                        rows,
                        POSITIVE_COLOR,
                    );
                });
            });

            let negative_title = match &self.negative_type_choice {
                CategoryChoice::All => "Топ-5 типів негативного впливу".to_string(),
                CategoryChoice::One(category) => {
                    format!("Типи негативного впливу: {category}")
                }
            };
            Self::chart_card(ui, narrow, &negative_title, |ui| {
                if Self::category_combo(
                    ui,
                    "negative_type_category",
                    &s.negative_categories,
                    &mut self.negative_type_choice,
                ) {
                    self.negative_types = None;
                }
                let choice = self.negative_type_choice.clone();
                let outcome = self.negative_types.get_or_insert_with(|| {
                    summaries::impact_type_drilldown(&view.merged, Polarity::Negative, &choice)
                });
                Self::with_rows(ui, outcome, |ui, rows| {
                    ChartPlotter::draw_count_bars_solid(
                        ui,
                        "negative_types",
                        rows,
                        NEGATIVE_COLOR,
                    );
                });
            });
        });
        ui.add_space(CARD_SPACING);

        // Shared category selector for both impact-genre charts.
        ui.horizontal(|ui| {
            ui.label("Категорія:");
            if Self::category_combo(
                ui,
                "genre_category",
                &s.positive_categories,
                &mut self.genre_choice,
            ) {
                self.positive_genres = None;
                self.negative_genres = None;
            }
        });
        ui.add_space(CARD_SPACING);

        ui.horizontal(|ui| {
            Self::chart_card(ui, half, "Топ-5 жанрів позитивного впливу", |ui| {
                let choice = self.genre_choice.clone();
                let outcome = self.positive_genres.get_or_insert_with(|| {
                    summaries::impact_genre_drilldown(&view.merged, Polarity::Positive, &choice)
                });
                Self::with_rows(ui, outcome, |ui, rows| {
                    ChartPlotter::draw_count_hbars(ui, "positive_genres", rows, POSITIVE_COLOR);
                });
            });
            Self::chart_card(ui, half, "Топ-5 жанрів негативного впливу", |ui| {
                let choice = self.genre_choice.clone();
                let outcome = self.negative_genres.get_or_insert_with(|| {
                    summaries::impact_genre_drilldown(&view.merged, Polarity::Negative, &choice)
                });
                Self::with_rows(ui, outcome, |ui, rows| {
                    ChartPlotter::draw_count_hbars(ui, "negative_genres", rows, NEGATIVE_COLOR);
                });
            });
        });
        ui.add_space(CARD_SPACING);

        let heat = Self::card_width(ui, 1) * 0.58;
        let side = Self::card_width(ui, 1) - heat - 2.0 * CARD_SPACING;
        ui.horizontal(|ui| {
            Self::chart_card(
                ui,
                heat,
                "Теплова карта залежності типу позитивного впливу від жанру",
                |ui| match &s.positive_heatmap {
                    Ok(table) if !table.is_empty() => {
                        ChartPlotter::draw_heatmap(ui, table, POSITIVE_COLOR);
                    }
                    Ok(_) => Self::insufficient_data(ui),
                    Err(err) => Self::chart_error(ui, err),
                },
            );
            Self::chart_card(ui, side, "Топ-5 жанрів (стековано за впливом)", |ui| {
                Self::with_rows(ui, &s.top_genres_stacked, |ui, rows| {
                    ChartPlotter::draw_stacked_bars(ui, "top_genres_stacked", rows);
                });
            });
        });
        ui.add_space(CARD_SPACING);

        ui.horizontal(|ui| {
            Self::chart_card(
                ui,
                heat,
                "Теплова карта залежності типу негативного впливу від жанру",
                |ui| match &s.negative_heatmap {
                    Ok(table) if !table.is_empty() => {
                        ChartPlotter::draw_heatmap(ui, table, NEGATIVE_COLOR);
                    }
                    Ok(_) => Self::insufficient_data(ui),
                    Err(err) => Self::chart_error(ui, err),
                },
            );
            Self::chart_card(ui, side, "Вплив часу гри", |ui| {
                Self::with_rows(ui, &s.playtime_share, |ui, rows| {
                    ChartPlotter::draw_impact_share_lines(ui, "playtime_share", rows);
                });
            });
        });
    }

    // ---------- shared widgets ----------

    fn card_width(ui: &egui::Ui, columns: usize) -> f32 {
        let spacing = CARD_SPACING * (columns.saturating_sub(1)) as f32 + 30.0;
        ((ui.available_width() - spacing) / columns as f32).max(260.0)
    }

    fn chart_card(
        ui: &mut egui::Ui,
        width: f32,
        title: &str,
        add_contents: impl FnOnce(&mut egui::Ui),
    ) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(
                1.0,
                ui.visuals().widgets.noninteractive.bg_stroke.color,
            ))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(width);
                ui.vertical(|ui| {
                    ui.label(RichText::new(title).size(13.0).strong());
                    ui.add_space(6.0);
                    add_contents(ui);
                });
            });
    }

    /// Draw a summary table, or the per-chart degradation message.
    fn with_rows<T>(
        ui: &mut egui::Ui,
        outcome: &ChartResult<Vec<T>>,
        draw: impl FnOnce(&mut egui::Ui, &[T]),
    ) {
        match outcome {
            Ok(rows) if rows.is_empty() => Self::insufficient_data(ui),
            Ok(rows) => draw(ui, rows),
            Err(err) => Self::chart_error(ui, err),
        }
    }

    fn insufficient_data(ui: &mut egui::Ui) {
        ui.label(
            RichText::new("Недостатньо даних для відображення.")
                .size(12.0)
                .color(Color32::from_rgb(255, 193, 7)),
        );
    }

    fn chart_error(ui: &mut egui::Ui, err: &crate::stats::AggError) {
        ui.label(
            RichText::new(format!("Помилка: {err}"))
                .size(12.0)
                .color(Color32::from_rgb(220, 53, 69)),
        );
    }

    /// Category selector with the "all categories" sentinel on top.
    /// Returns true when the choice changed.
    fn category_combo(
        ui: &mut egui::Ui,
        id: &str,
        options: &ChartResult<Vec<String>>,
        choice: &mut CategoryChoice,
    ) -> bool {
        let mut changed = false;
        let selected_text = match choice {
            CategoryChoice::All => ALL_CATEGORIES.to_string(),
            CategoryChoice::One(category) => category.clone(),
        };
        ComboBox::from_id_salt(id.to_string())
            .width(190.0)
            .selected_text(selected_text)
            .show_ui(ui, |ui| {
                if ui
                    .selectable_label(choice.is_all(), ALL_CATEGORIES)
                    .clicked()
                {
                    *choice = CategoryChoice::All;
                    changed = true;
                }
                if let Ok(options) = options {
                    for option in options {
                        let is_selected =
                            matches!(choice, CategoryChoice::One(current) if current == option);
                        if ui.selectable_label(is_selected, option).clicked() {
                            *choice = CategoryChoice::One(option.clone());
                            changed = true;
                        }
                    }
                }
            });
        changed
    }
}
