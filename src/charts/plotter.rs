//! Chart Plotter Module
//! Draws summary tables as interactive visualizations: egui_plot for bar,
//! line and area charts, the raw painter for pie, sunburst and heatmap.

use egui::{Color32, Pos2, Rect, RichText, Sense, Shape, Stroke, Vec2};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::stats::aggregate::{CountRow, CrossRow, MeanRow, PivotTable, RatioRow};
use crate::stats::summaries::{
    ImpactShareRow, ImpactSplitRow, PlaytimeRow, NEGATIVE_LABEL, POSITIVE_LABEL,
};

/// Categorical palette (Tableau T10).
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(76, 120, 168),  // Blue
    Color32::from_rgb(245, 133, 24),  // Orange
    Color32::from_rgb(228, 87, 86),   // Red
    Color32::from_rgb(114, 183, 178), // Teal
    Color32::from_rgb(84, 162, 75),   // Green
    Color32::from_rgb(238, 202, 59),  // Yellow
    Color32::from_rgb(178, 121, 162), // Purple
    Color32::from_rgb(255, 157, 166), // Pink
    Color32::from_rgb(157, 117, 93),  // Brown
    Color32::from_rgb(186, 176, 172), // Grey
];

/// Fixed colors for the two impact sides.
pub const POSITIVE_COLOR: Color32 = Color32::from_rgb(44, 160, 44);
pub const NEGATIVE_COLOR: Color32 = Color32::from_rgb(214, 39, 40);

const CHART_HEIGHT: f32 = 260.0;
const AXIS_LABEL_CHARS: usize = 12;

/// Creates the dashboard visualizations.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn color_for(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Shorten a category for an axis tick; the full text stays available
    /// through the series name on hover.
    fn tick_label(label: &str) -> String {
        if label.chars().count() > AXIS_LABEL_CHARS {
            let mut short: String = label.chars().take(AXIS_LABEL_CHARS - 1).collect();
            short.push('…');
            short
        } else {
            label.to_string()
        }
    }

    /// Vertical bars, one palette color per category.
    pub fn draw_count_bars(ui: &mut egui::Ui, id: &str, rows: &[CountRow]) {
        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        let values: Vec<f64> = rows.iter().map(|r| f64::from(r.count)).collect();
        let colors: Vec<Color32> = (0..rows.len()).map(Self::color_for).collect();
        Self::draw_bars(ui, id, &labels, &values, &colors, false);
    }

    /// Vertical bars in a single color, for the drill-down charts.
    pub fn draw_count_bars_solid(ui: &mut egui::Ui, id: &str, rows: &[CountRow], color: Color32) {
        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        let values: Vec<f64> = rows.iter().map(|r| f64::from(r.count)).collect();
        let colors = vec![color; rows.len()];
        Self::draw_bars(ui, id, &labels, &values, &colors, false);
    }

    /// Horizontal bars in a single color, longest at the top.
    pub fn draw_count_hbars(ui: &mut egui::Ui, id: &str, rows: &[CountRow], color: Color32) {
        let labels: Vec<String> = rows.iter().rev().map(|r| r.label.clone()).collect();
        let values: Vec<f64> = rows.iter().rev().map(|r| f64::from(r.count)).collect();
        let colors = vec![color; rows.len()];
        Self::draw_bars(ui, id, &labels, &values, &colors, true);
    }

    /// Percentage bars for a ratio table.
    pub fn draw_ratio_bars(ui: &mut egui::Ui, id: &str, rows: &[RatioRow]) {
        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.percent).collect();
        let colors: Vec<Color32> = (0..rows.len()).map(Self::color_for).collect();
        Self::draw_bars(ui, id, &labels, &values, &colors, false);
    }

    /// Mean-value bars, ascending order as computed.
    pub fn draw_mean_bars(ui: &mut egui::Ui, id: &str, rows: &[MeanRow]) {
        let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
        let values: Vec<f64> = rows.iter().map(|r| r.mean).collect();
        let colors = vec![PALETTE[0]; rows.len()];
        Self::draw_bars(ui, id, &labels, &values, &colors, false);
    }

    fn draw_bars(
        ui: &mut egui::Ui,
        id: &str,
        labels: &[String],
        values: &[f64],
        colors: &[Color32],
        horizontal: bool,
    ) {
        let bars: Vec<Bar> = values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                Bar::new(i as f64, value)
                    .width(0.6)
                    .fill(colors[i])
                    .name(&labels[i])
            })
            .collect();
        let mut chart = BarChart::new(bars);
        if horizontal {
            chart = chart.horizontal();
        }

        let tick_labels: Vec<String> = labels.iter().map(|l| Self::tick_label(l)).collect();
        let formatter = move |mark: egui_plot::GridMark, _range: &std::ops::RangeInclusive<f64>| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            tick_labels
                .get(idx as usize)
                .cloned()
                .unwrap_or_default()
        };

        let mut plot = Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false);
        plot = if horizontal {
            plot.y_axis_formatter(formatter)
        } else {
            plot.x_axis_formatter(formatter)
        };
        plot.show(ui, |plot_ui| plot_ui.bar_chart(chart));
    }

    /// Positive/negative counts per category as paired horizontal bars.
    pub fn draw_grouped_hbars(ui: &mut egui::Ui, id: &str, rows: &[ImpactSplitRow]) {
        let positive: Vec<Bar> = rows
            .iter()
            .rev()
            .enumerate()
            .map(|(i, row)| {
                Bar::new(i as f64 + 0.2, f64::from(row.positive))
                    .width(0.35)
                    .fill(POSITIVE_COLOR)
                    .name(&row.label)
            })
            .collect();
        let negative: Vec<Bar> = rows
            .iter()
            .rev()
            .enumerate()
            .map(|(i, row)| {
                Bar::new(i as f64 - 0.2, f64::from(row.negative))
                    .width(0.35)
                    .fill(NEGATIVE_COLOR)
                    .name(&row.label)
            })
            .collect();

        let tick_labels: Vec<String> =
            rows.iter().rev().map(|r| Self::tick_label(&r.label)).collect();
        Plot::new(id.to_string())
            .height(CHART_HEIGHT + 60.0)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .y_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                tick_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(
                    BarChart::new(positive)
                        .horizontal()
                        .name(POSITIVE_LABEL),
                );
                plot_ui.bar_chart(
                    BarChart::new(negative)
                        .horizontal()
                        .name(NEGATIVE_LABEL),
                );
            });
    }

    /// Positive counts stacked under negative counts per genre.
    pub fn draw_stacked_bars(ui: &mut egui::Ui, id: &str, rows: &[ImpactSplitRow]) {
        let positive: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Bar::new(i as f64, f64::from(row.positive))
                    .width(0.6)
                    .fill(POSITIVE_COLOR)
                    .name(&row.label)
            })
            .collect();
        let negative: Vec<Bar> = rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                Bar::new(i as f64, f64::from(row.negative))
                    .width(0.6)
                    .fill(NEGATIVE_COLOR)
                    .name(&row.label)
            })
            .collect();

        let positive_chart = BarChart::new(positive).name(POSITIVE_LABEL);
        let negative_chart = BarChart::new(negative)
            .name(NEGATIVE_LABEL)
            .stack_on(&[&positive_chart]);

        let tick_labels: Vec<String> = rows.iter().map(|r| Self::tick_label(&r.label)).collect();
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                tick_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(positive_chart);
                plot_ui.bar_chart(negative_chart);
            });
    }

    /// Device share per genre: one marked line per device over the sorted
    /// genre axis.
    pub fn draw_share_lines(ui: &mut egui::Ui, id: &str, pairs: &[CrossRow]) {
        let mut genres: Vec<String> = pairs.iter().map(|p| p.primary.clone()).collect();
        genres.sort();
        genres.dedup();
        let mut devices: Vec<String> = pairs.iter().map(|p| p.secondary.clone()).collect();
        devices.sort();
        devices.dedup();

        let tick_labels: Vec<String> = genres.iter().map(|g| Self::tick_label(g)).collect();
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .include_y(0.0)
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                    return String::new();
                }
                tick_labels.get(idx as usize).cloned().unwrap_or_default()
            })
            .show(ui, |plot_ui| {
                for (device_idx, device) in devices.iter().enumerate() {
                    let color = Self::color_for(device_idx);
                    let points: Vec<[f64; 2]> = genres
                        .iter()
                        .enumerate()
                        .filter_map(|(genre_idx, genre)| {
                            pairs
                                .iter()
                                .find(|p| &p.primary == genre && &p.secondary == device)
                                .map(|p| [genre_idx as f64, p.percent])
                        })
                        .collect();
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(color)
                            .width(1.5)
                            .name(device),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.iter().copied()))
                            .radius(3.0)
                            .color(color),
                    );
                }
            });
    }

    /// Playtime distribution as a filled area over mapped hours.
    pub fn draw_playtime_area(ui: &mut egui::Ui, id: &str, rows: &[PlaytimeRow]) {
        let points: Vec<[f64; 2]> = rows
            .iter()
            .map(|row| [row.hours, f64::from(row.count)])
            .collect();
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .include_y(0.0)
            .show(ui, |plot_ui| {
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(PALETTE[0])
                        .width(2.0)
                        .fill(0.0),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(3.0)
                        .color(PALETTE[0]),
                );
            });
    }

    /// Normalized impact share per playtime bucket, one marked line per side.
    pub fn draw_impact_share_lines(ui: &mut egui::Ui, id: &str, rows: &[ImpactShareRow]) {
        let positive: Vec<[f64; 2]> = rows.iter().map(|r| [r.hours, r.positive]).collect();
        let negative: Vec<[f64; 2]> = rows.iter().map(|r| [r.hours, r.negative]).collect();
        Plot::new(id.to_string())
            .height(CHART_HEIGHT)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .legend(Legend::default())
            .include_y(0.0)
            .show(ui, |plot_ui| {
                for (points, color, name) in [
                    (&positive, POSITIVE_COLOR, POSITIVE_LABEL),
                    (&negative, NEGATIVE_COLOR, NEGATIVE_LABEL),
                ] {
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(points.iter().copied()))
                            .color(color)
                            .width(1.5)
                            .name(name),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(points.iter().copied()))
                            .radius(3.0)
                            .color(color),
                    );
                }
            });
    }

    /// Donut pie with an optional emphasized slice pulled outwards.
    pub fn draw_pie(ui: &mut egui::Ui, rows: &[CountRow], emphasize: Option<&str>) {
        let total: u32 = rows.iter().map(|r| r.count).sum();
        if total == 0 {
            return;
        }

        let size = Vec2::new(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        let center = rect.center();
        let radius = (rect.width().min(rect.height()) / 2.0 - 10.0).max(20.0);
        let hole = radius * 0.2;

        let mut angle = -std::f32::consts::FRAC_PI_2;
        for (i, row) in rows.iter().enumerate() {
            let fraction = row.count as f32 / total as f32;
            let sweep = fraction * std::f32::consts::TAU;
            let outer = if emphasize == Some(row.label.as_str()) {
                radius
            } else {
                radius - 6.0
            };
            let color = Self::color_for(i);
            Self::fill_ring_segment(&painter, center, hole, outer, angle, angle + sweep, color);

            if fraction > 0.04 {
                let mid = angle + sweep / 2.0;
                let text_radius = (hole + outer) / 2.0;
                let pos = center + Vec2::angled(mid) * text_radius;
                painter.text(
                    pos,
                    egui::Align2::CENTER_CENTER,
                    format!("{:.0}%", fraction * 100.0),
                    egui::FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
            angle += sweep;
        }

        Self::draw_swatch_legend(
            ui,
            &rows
                .iter()
                .enumerate()
                .map(|(i, row)| (row.label.clone(), Self::color_for(i)))
                .collect::<Vec<_>>(),
        );
    }

    /// Two-ring sunburst: impact side inside, respondent role outside.
    pub fn draw_sunburst(ui: &mut egui::Ui, rows: &[CrossRow]) {
        let total: u32 = rows.iter().map(|r| r.count).sum();
        if total == 0 {
            return;
        }

        let size = Vec2::new(ui.available_width(), CHART_HEIGHT);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;
        let center = rect.center();
        let radius = (rect.width().min(rect.height()) / 2.0 - 10.0).max(20.0);

        let side_color = |side: &str| {
            if side == POSITIVE_LABEL {
                POSITIVE_COLOR
            } else {
                NEGATIVE_COLOR
            }
        };

        let mut sides: Vec<String> = rows.iter().map(|r| r.primary.clone()).collect();
        sides.sort();
        sides.dedup();

        let mut angle = -std::f32::consts::FRAC_PI_2;
        for side in &sides {
            let segments: Vec<&CrossRow> = rows.iter().filter(|r| &r.primary == side).collect();
            let side_total: u32 = segments.iter().map(|r| r.count).sum();
            let side_sweep = side_total as f32 / total as f32 * std::f32::consts::TAU;
            let color = side_color(side);

            // Inner ring: the impact side.
            Self::fill_ring_segment(
                &painter,
                center,
                radius * 0.2,
                radius * 0.55,
                angle,
                angle + side_sweep,
                color,
            );
            let mid = angle + side_sweep / 2.0;
            painter.text(
                center + Vec2::angled(mid) * radius * 0.38,
                egui::Align2::CENTER_CENTER,
                side,
                egui::FontId::proportional(12.0),
                Color32::WHITE,
            );

            // Outer ring: respondent roles within the side.
            let mut role_angle = angle;
            for (role_idx, segment) in segments.iter().enumerate() {
                let role_sweep = segment.count as f32 / side_total as f32 * side_sweep;
                let shade = color.gamma_multiply(0.85 - 0.18 * (role_idx % 4) as f32);
                Self::fill_ring_segment(
                    &painter,
                    center,
                    radius * 0.55,
                    radius * 0.9,
                    role_angle,
                    role_angle + role_sweep,
                    shade,
                );
                if segment.percent >= 8.0 {
                    painter.text(
                        center + Vec2::angled(role_angle + role_sweep / 2.0) * radius * 0.72,
                        egui::Align2::CENTER_CENTER,
                        format!("{} {:.0}%", segment.secondary, segment.percent),
                        egui::FontId::proportional(10.0),
                        Color32::WHITE,
                    );
                }
                role_angle += role_sweep;
            }
            angle += side_sweep;
        }
    }

    /// Zero-filled count matrix as shaded cells with the value printed in
    /// each cell.
    pub fn draw_heatmap(ui: &mut egui::Ui, table: &PivotTable, base: Color32) {
        if table.is_empty() {
            return;
        }
        let max = table.max_value().max(1);

        let label_width = 120.0;
        let label_height = 40.0;
        let size = Vec2::new(ui.available_width(), CHART_HEIGHT + 60.0);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect;

        let grid = Rect::from_min_max(
            Pos2::new(rect.min.x + label_width, rect.min.y),
            Pos2::new(rect.max.x, rect.max.y - label_height),
        );
        let cell_w = grid.width() / table.columns.len() as f32;
        let cell_h = grid.height() / table.rows.len() as f32;

        for (r, row_label) in table.rows.iter().enumerate() {
            let y = grid.min.y + r as f32 * cell_h;
            painter.text(
                Pos2::new(rect.min.x + label_width - 6.0, y + cell_h / 2.0),
                egui::Align2::RIGHT_CENTER,
                Self::tick_label(row_label),
                egui::FontId::proportional(11.0),
                ui.visuals().text_color(),
            );
            for (c, _) in table.columns.iter().enumerate() {
                let value = table.values[r][c];
                let t = value as f32 / max as f32;
                let cell = Rect::from_min_size(
                    Pos2::new(grid.min.x + c as f32 * cell_w, y),
                    Vec2::new(cell_w - 1.0, cell_h - 1.0),
                );
                painter.rect_filled(cell, 2.0, Self::lerp_color(Color32::WHITE, base, t));
                painter.text(
                    cell.center(),
                    egui::Align2::CENTER_CENTER,
                    value.to_string(),
                    egui::FontId::proportional(11.0),
                    if t > 0.55 { Color32::WHITE } else { Color32::DARK_GRAY },
                );
            }
        }
        for (c, column_label) in table.columns.iter().enumerate() {
            painter.text(
                Pos2::new(
                    grid.min.x + c as f32 * cell_w + cell_w / 2.0,
                    grid.max.y + 6.0,
                ),
                egui::Align2::CENTER_TOP,
                Self::tick_label(column_label),
                egui::FontId::proportional(10.0),
                ui.visuals().text_color(),
            );
        }
    }

    /// Horizontal swatch legend under a painter-drawn chart.
    fn draw_swatch_legend(ui: &mut egui::Ui, entries: &[(String, Color32)]) {
        ui.horizontal_wrapped(|ui| {
            for (label, color) in entries {
                let (rect, _) = ui.allocate_exact_size(Vec2::new(12.0, 12.0), Sense::hover());
                ui.painter().rect_filled(rect, 2.0, *color);
                ui.label(RichText::new(label).size(11.0));
                ui.add_space(8.0);
            }
        });
    }

    /// Fill a ring segment as short convex quads so arbitrary sweeps render
    /// correctly.
    fn fill_ring_segment(
        painter: &egui::Painter,
        center: Pos2,
        inner: f32,
        outer: f32,
        start: f32,
        end: f32,
        color: Color32,
    ) {
        let sweep = end - start;
        if sweep <= 0.0 {
            return;
        }
        let steps = ((sweep / 0.08).ceil() as usize).max(1);
        for step in 0..steps {
            let a0 = start + sweep * step as f32 / steps as f32;
            let a1 = start + sweep * (step + 1) as f32 / steps as f32;
            let points = vec![
                center + Vec2::angled(a0) * inner,
                center + Vec2::angled(a0) * outer,
                center + Vec2::angled(a1) * outer,
                center + Vec2::angled(a1) * inner,
            ];
            painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
        }
    }

    fn lerp_color(from: Color32, to: Color32, t: f32) -> Color32 {
        let t = t.clamp(0.0, 1.0);
        let channel = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Color32::from_rgb(
            channel(from.r(), to.r()),
            channel(from.g(), to.g()),
            channel(from.b(), to.b()),
        )
    }
}
