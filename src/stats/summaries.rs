//! Chart Summary Builders Module
//! One aggregation per dashboard chart, each a pure function of the
//! filtered tables. Recomputed whole on every filter change.

use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::data::dataset::*;
use crate::stats::aggregate::{
    count_values, drill_down_counts, map_bucket, mean_by_key, pivot, ratio_by_key, text_column,
    top_n, AggError, CategoryChoice, CountRow, CrossRow, MeanRow, PivotTable, RatioRow,
    SplitOptions, ALL_GENRES, MISSING, NAN_TEXT, NO_GENRE,
};

pub type ChartResult<T> = Result<T, AggError>;

/// Affirmative answer in every yes/no column of the export.
pub const YES: &str = "Так";

/// Sunburst ring labels.
pub const POSITIVE_LABEL: &str = "Позитивний";
pub const NEGATIVE_LABEL: &str = "Негативний";

/// Device cell meaning "other", dropped whole before the per-genre split.
const OTHER_DEVICE: &str = "інше";

/// Category synonym folded into its canonical spelling wherever category
/// columns are read.
const CATEGORY_SYNONYM: &str = "Когнітивні функції здібності";
const CATEGORY_CANONICAL: &str = "Когнітивні функції";

/// Playtime bucket scale used by the distribution and mean charts.
pub const PLAYTIME_SCALE_FULL: [(&str, f64); 6] = [
    ("менше 1 години", 0.5),
    ("близько 1 години", 1.0),
    ("близько 2 годин", 2.0),
    ("близько 3 годин", 3.0),
    ("близько 4 годин", 4.0),
    ("4 години і більше", 5.0),
];

/// Scale used by the impact-share chart: no "близько 4 годин" step and a
/// top bucket of 4. Kept separate from the full scale; do not unify.
pub const PLAYTIME_SCALE_SHORT: [(&str, f64); 5] = [
    ("менше 1 години", 0.5),
    ("близько 1 години", 1.0),
    ("близько 2 годин", 2.0),
    ("близько 3 годин", 3.0),
    ("4 години і більше", 4.0),
];

/// Which impact side a chart reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn flag_column(self) -> &'static str {
        match self {
            Polarity::Positive => COL_POSITIVE,
            Polarity::Negative => COL_NEGATIVE,
        }
    }

    pub fn category_column(self) -> &'static str {
        match self {
            Polarity::Positive => COL_POSITIVE_CATEGORY,
            Polarity::Negative => COL_NEGATIVE_CATEGORY,
        }
    }

    pub fn type_column(self) -> &'static str {
        match self {
            Polarity::Positive => COL_POSITIVE_TYPE,
            Polarity::Negative => COL_NEGATIVE_TYPE,
        }
    }

    pub fn genre_column(self) -> &'static str {
        match self {
            Polarity::Positive => COL_POSITIVE_GENRE,
            Polarity::Negative => COL_NEGATIVE_GENRE,
        }
    }
}

/// One playtime bucket of the distribution chart.
#[derive(Debug, Clone, Serialize)]
pub struct PlaytimeRow {
    pub hours: f64,
    pub label: String,
    pub count: u32,
}

/// A category with counts on both impact sides, zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpactSplitRow {
    pub label: String,
    pub positive: u32,
    pub negative: u32,
}

/// Normalized share of affirmative answers per mapped playtime bucket.
#[derive(Debug, Clone, Serialize)]
pub struct ImpactShareRow {
    pub hours: f64,
    pub positive: f64,
    pub negative: f64,
}

// ---------- popularity tab ----------

pub fn plays_counts(survey: &DataFrame) -> ChartResult<Vec<CountRow>> {
    crate::stats::aggregate::column_value_counts(survey, COL_PLAYS)
}

pub fn top_genres(survey: &DataFrame, n: usize) -> ChartResult<Vec<CountRow>> {
    let rows = crate::stats::aggregate::exploded_value_counts(
        survey,
        COL_GENRE,
        SplitOptions::default(),
        &[MISSING],
    )?;
    Ok(top_n(rows, n))
}

pub fn top_games(survey: &DataFrame, n: usize) -> ChartResult<Vec<CountRow>> {
    let rows = crate::stats::aggregate::exploded_value_counts(
        survey,
        COL_FAVORITE_GAME,
        SplitOptions::default(),
        &[MISSING],
    )?;
    Ok(top_n(rows, n))
}

pub fn spending_counts(survey: &DataFrame) -> ChartResult<Vec<CountRow>> {
    crate::stats::aggregate::column_value_counts(survey, COL_SPENDING)
}

/// Share of paying respondents per genre, top `n` by percentage. A genre
/// nobody pays for still appears at 0 percent until truncation.
pub fn donation_rate_by_genre(merged: &DataFrame, n: usize) -> ChartResult<Vec<RatioRow>> {
    let spending = text_column(merged, COL_SPENDING)?;
    let mut rows = ratio_by_key(
        merged,
        COL_GENRE,
        SplitOptions::default(),
        &[MISSING],
        |idx| spending[idx].as_deref() == Some(YES),
    )?;
    rows.truncate(n);
    Ok(rows)
}

/// Respondent counts per playtime bucket, ascending by mapped hours.
/// Buckets outside the scale are dropped rather than charted at null.
pub fn playtime_distribution(survey: &DataFrame) -> ChartResult<Vec<PlaytimeRow>> {
    let counts = crate::stats::aggregate::column_value_counts(survey, COL_PLAYTIME)?;
    let mut rows: Vec<PlaytimeRow> = counts
        .into_iter()
        .filter_map(|row| {
            map_bucket(&PLAYTIME_SCALE_FULL, &row.label).map(|hours| PlaytimeRow {
                hours,
                label: row.label,
                count: row.count,
            })
        })
        .collect();
    rows.sort_by(|a, b| a.hours.total_cmp(&b.hours));
    Ok(rows)
}

pub fn device_counts(survey: &DataFrame) -> ChartResult<Vec<CountRow>> {
    crate::stats::aggregate::exploded_value_counts(
        survey,
        COL_DEVICE,
        SplitOptions { lowercase: true },
        &[MISSING, NAN_TEXT],
    )
}

/// Genre by device cross tabulation as percentages within each genre.
/// Records whose whole device cell is a sentinel or "інше" are dropped
/// before any splitting.
pub fn device_share_by_genre(survey: &DataFrame) -> ChartResult<Vec<CrossRow>> {
    let devices = text_column(survey, COL_DEVICE)?;
    let keep = move |idx: usize| {
        devices[idx].as_deref().is_some_and(|cell| {
            let lowered = cell.trim().to_lowercase();
            lowered != MISSING && lowered != NAN_TEXT && lowered != OTHER_DEVICE
        })
    };
    crate::stats::aggregate::cross_tab(
        survey,
        COL_GENRE,
        SplitOptions::default(),
        &[MISSING],
        COL_DEVICE,
        SplitOptions { lowercase: true },
        &[MISSING, NAN_TEXT],
        keep,
    )
}

/// Mean mapped playtime per genre, ascending, with respondent counts.
pub fn mean_playtime_by_genre(survey: &DataFrame) -> ChartResult<Vec<MeanRow>> {
    mean_by_key(
        survey,
        COL_GENRE,
        COL_PLAYTIME,
        &PLAYTIME_SCALE_FULL,
        &[MISSING],
    )
}

// ---------- impact tab ----------

pub fn impact_flag_counts(merged: &DataFrame, polarity: Polarity) -> ChartResult<Vec<CountRow>> {
    crate::stats::aggregate::column_value_counts(merged, polarity.flag_column())
}

/// Affirmative impact answers split by respondent role, for the two-ring
/// sunburst. `percent` is the share within one impact side.
pub fn impact_by_respondent(merged: &DataFrame) -> ChartResult<Vec<CrossRow>> {
    let respondents = text_column(merged, COL_RESPONDENT)?;
    let positive = text_column(merged, COL_POSITIVE)?;
    let negative = text_column(merged, COL_NEGATIVE)?;

    let mut counts: BTreeMap<(String, String), u32> = BTreeMap::new();
    for idx in 0..respondents.len() {
        let Some(role) = &respondents[idx] else { continue };
        if positive[idx].as_deref() == Some(YES) {
            *counts
                .entry((POSITIVE_LABEL.to_string(), role.clone()))
                .or_default() += 1;
        }
        if negative[idx].as_deref() == Some(YES) {
            *counts
                .entry((NEGATIVE_LABEL.to_string(), role.clone()))
                .or_default() += 1;
        }
    }

    let mut side_totals: BTreeMap<&str, u32> = BTreeMap::new();
    for ((side, _), count) in &counts {
        *side_totals.entry(side.as_str()).or_default() += count;
    }

    Ok(counts
        .iter()
        .map(|((side, role), count)| CrossRow {
            primary: side.clone(),
            secondary: role.clone(),
            count: *count,
            percent: f64::from(*count) / f64::from(side_totals[side.as_str()]) * 100.0,
        })
        .collect())
}

fn normalize_category(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed == CATEGORY_SYNONYM {
        CATEGORY_CANONICAL.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Category column with the synonym folded in, per row.
fn category_values(df: &DataFrame, polarity: Polarity) -> ChartResult<Vec<Option<String>>> {
    Ok(text_column(df, polarity.category_column())?
        .into_iter()
        .map(|cell| cell.map(|raw| normalize_category(&raw)))
        .collect())
}

/// Positive and negative counts per category, zero-filled on the side a
/// category never appears on. Descending by combined count.
pub fn impact_category_comparison(merged: &DataFrame) -> ChartResult<Vec<ImpactSplitRow>> {
    let positive = category_values(merged, Polarity::Positive)?;
    let negative = category_values(merged, Polarity::Negative)?;

    let mut rows: BTreeMap<String, ImpactSplitRow> = BTreeMap::new();
    for row in count_values(positive.into_iter().flatten()) {
        rows.entry(row.label.clone())
            .or_insert_with(|| ImpactSplitRow {
                label: row.label,
                positive: 0,
                negative: 0,
            })
            .positive = row.count;
    }
    for row in count_values(negative.into_iter().flatten()) {
        rows.entry(row.label.clone())
            .or_insert_with(|| ImpactSplitRow {
                label: row.label,
                positive: 0,
                negative: 0,
            })
            .negative = row.count;
    }

    let mut rows: Vec<ImpactSplitRow> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        (b.positive + b.negative)
            .cmp(&(a.positive + a.negative))
            .then_with(|| a.label.cmp(&b.label))
    });
    Ok(rows)
}

/// Distinct normalized categories in first-appearance order, for the
/// drill-down selectors.
pub fn impact_categories(merged: &DataFrame, polarity: Polarity) -> ChartResult<Vec<String>> {
    let values = category_values(merged, polarity)?;
    let mut seen = Vec::new();
    for value in values.into_iter().flatten() {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    Ok(seen)
}

/// Impact-type counts under the category drill-down. "All categories"
/// truncates to the global top 5; a specific category returns every
/// matching type. The asymmetry is intended selector behavior.
pub fn impact_type_drilldown(
    merged: &DataFrame,
    polarity: Polarity,
    choice: &CategoryChoice,
) -> ChartResult<Vec<CountRow>> {
    let categories = category_values(merged, polarity)?;
    let types = text_column(merged, polarity.type_column())?;
    let rows = drill_down_counts(&categories, &types, choice);
    Ok(if choice.is_all() { top_n(rows, 5) } else { rows })
}

/// Impact-genre counts under the shared category drill-down. Unlike the
/// type charts, both selector modes truncate to the top 5.
pub fn impact_genre_drilldown(
    merged: &DataFrame,
    polarity: Polarity,
    choice: &CategoryChoice,
) -> ChartResult<Vec<CountRow>> {
    let categories = category_values(merged, polarity)?;
    let genres: Vec<Option<String>> = text_column(merged, polarity.genre_column())?
        .into_iter()
        .map(|cell| cell.filter(|genre| genre != ALL_GENRES))
        .collect();
    Ok(top_n(drill_down_counts(&categories, &genres, choice), 5))
}

/// Genre-specific rows only: both "Всі" and "0" mean "no particular genre".
fn specific_genres(merged: &DataFrame, polarity: Polarity) -> ChartResult<Vec<Option<String>>> {
    Ok(text_column(merged, polarity.genre_column())?
        .into_iter()
        .map(|cell| cell.filter(|genre| genre != ALL_GENRES && genre != NO_GENRE))
        .collect())
}

/// Genre by impact-type matrix for one side, zero-filled.
pub fn impact_genre_type_heatmap(
    merged: &DataFrame,
    polarity: Polarity,
) -> ChartResult<PivotTable> {
    let genres = specific_genres(merged, polarity)?;
    let types = text_column(merged, polarity.type_column())?;

    let mut counts: BTreeMap<(String, String), u32> = BTreeMap::new();
    for (genre, kind) in genres.iter().zip(types.iter()) {
        let (Some(genre), Some(kind)) = (genre, kind) else {
            continue;
        };
        *counts.entry((genre.clone(), kind.clone())).or_default() += 1;
    }
    let pairs: Vec<CrossRow> = counts
        .into_iter()
        .map(|((primary, secondary), count)| CrossRow {
            primary,
            secondary,
            count,
            percent: 0.0,
        })
        .collect();
    Ok(pivot(&pairs))
}

/// Top-5 genres by combined impact mentions: the top 5 of each side are
/// outer-merged with zero fill, summed, and the 5 largest totals kept.
pub fn top_impact_genres(merged: &DataFrame) -> ChartResult<Vec<ImpactSplitRow>> {
    let positive = count_values(
        specific_genres(merged, Polarity::Positive)?
            .into_iter()
            .flatten(),
    );
    let negative = count_values(
        specific_genres(merged, Polarity::Negative)?
            .into_iter()
            .flatten(),
    );

    let mut rows: BTreeMap<String, ImpactSplitRow> = BTreeMap::new();
    for row in top_n(positive, 5) {
        rows.entry(row.label.clone())
            .or_insert_with(|| ImpactSplitRow {
                label: row.label,
                positive: 0,
                negative: 0,
            })
            .positive = row.count;
    }
    for row in top_n(negative, 5) {
        rows.entry(row.label.clone())
            .or_insert_with(|| ImpactSplitRow {
                label: row.label,
                positive: 0,
                negative: 0,
            })
            .negative = row.count;
    }

    let mut rows: Vec<ImpactSplitRow> = rows
        .into_values()
        .filter(|row| row.positive + row.negative > 0)
        .collect();
    rows.sort_by(|a, b| {
        (b.positive + b.negative)
            .cmp(&(a.positive + a.negative))
            .then_with(|| a.label.cmp(&b.label))
    });
    rows.truncate(5);
    Ok(rows)
}

/// Share of affirmative impact answers per mapped playtime bucket, each
/// side normalized by its own affirmative total. The totals count every
/// row, mapped bucket or not; an all-zero side stays flat at 0.
pub fn impact_share_by_playtime(merged: &DataFrame) -> ChartResult<Vec<ImpactShareRow>> {
    let playtime = text_column(merged, COL_PLAYTIME)?;
    let positive = text_column(merged, COL_POSITIVE)?;
    let negative = text_column(merged, COL_NEGATIVE)?;

    let yes = |cell: &Option<String>| cell.as_deref() == Some(YES);
    let total_positive = positive.iter().filter(|cell| yes(cell)).count() as f64;
    let total_negative = negative.iter().filter(|cell| yes(cell)).count() as f64;

    let mut rows = Vec::with_capacity(PLAYTIME_SCALE_SHORT.len());
    for (bucket, hours) in PLAYTIME_SCALE_SHORT {
        let mut positive_sum = 0u32;
        let mut negative_sum = 0u32;
        let mut seen = false;
        for idx in 0..playtime.len() {
            if playtime[idx].as_deref() != Some(bucket) {
                continue;
            }
            seen = true;
            if yes(&positive[idx]) {
                positive_sum += 1;
            }
            if yes(&negative[idx]) {
                negative_sum += 1;
            }
        }
        if !seen {
            continue;
        }
        rows.push(ImpactShareRow {
            hours,
            positive: if total_positive > 0.0 {
                f64::from(positive_sum) / total_positive
            } else {
                0.0
            },
            negative: if total_negative > 0.0 {
                f64::from(negative_sum) / total_negative
            } else {
                0.0
            },
        });
    }
    Ok(rows)
}

// ---------- whole-dashboard recompute ----------

/// Every popularity-tab summary for one filter pass.
#[derive(Clone, Serialize)]
pub struct PopularitySummaries {
    pub plays: ChartResult<Vec<CountRow>>,
    pub top_genres: ChartResult<Vec<CountRow>>,
    pub top_games: ChartResult<Vec<CountRow>>,
    pub spending: ChartResult<Vec<CountRow>>,
    pub donation_rate: ChartResult<Vec<RatioRow>>,
    pub playtime: ChartResult<Vec<PlaytimeRow>>,
    pub devices: ChartResult<Vec<CountRow>>,
    pub device_share: ChartResult<Vec<CrossRow>>,
    pub mean_playtime: ChartResult<Vec<MeanRow>>,
}

impl PopularitySummaries {
    pub fn compute(survey: &DataFrame, merged: &DataFrame) -> Self {
        Self {
            plays: plays_counts(survey),
            top_genres: top_genres(survey, 5),
            top_games: top_games(survey, 5),
            spending: spending_counts(survey),
            donation_rate: donation_rate_by_genre(merged, 5),
            playtime: playtime_distribution(survey),
            devices: device_counts(survey),
            device_share: device_share_by_genre(survey),
            mean_playtime: mean_playtime_by_genre(survey),
        }
    }
}

/// Every impact-tab summary for one filter pass. Drill-down charts are
/// recomputed separately on selector changes.
#[derive(Clone, Serialize)]
pub struct ImpactSummaries {
    pub positive: ChartResult<Vec<CountRow>>,
    pub negative: ChartResult<Vec<CountRow>>,
    pub by_respondent: ChartResult<Vec<CrossRow>>,
    pub category_comparison: ChartResult<Vec<ImpactSplitRow>>,
    pub positive_categories: ChartResult<Vec<String>>,
    pub negative_categories: ChartResult<Vec<String>>,
    pub positive_heatmap: ChartResult<PivotTable>,
    pub negative_heatmap: ChartResult<PivotTable>,
    pub top_genres_stacked: ChartResult<Vec<ImpactSplitRow>>,
    pub playtime_share: ChartResult<Vec<ImpactShareRow>>,
}

impl ImpactSummaries {
    pub fn compute(merged: &DataFrame) -> Self {
        Self {
            positive: impact_flag_counts(merged, Polarity::Positive),
            negative: impact_flag_counts(merged, Polarity::Negative),
            by_respondent: impact_by_respondent(merged),
            category_comparison: impact_category_comparison(merged),
            positive_categories: impact_categories(merged, Polarity::Positive),
            negative_categories: impact_categories(merged, Polarity::Negative),
            positive_heatmap: impact_genre_type_heatmap(merged, Polarity::Positive),
            negative_heatmap: impact_genre_type_heatmap(merged, Polarity::Negative),
            top_genres_stacked: top_impact_genres(merged),
            playtime_share: impact_share_by_playtime(merged),
        }
    }
}

#[derive(Clone, Serialize)]
pub struct DashboardSummaries {
    pub popularity: PopularitySummaries,
    pub impact: ImpactSummaries,
}

impl DashboardSummaries {
    /// Recompute every chart summary for the view, the two tab groups in
    /// parallel.
    pub fn compute(view: &FilteredView) -> Self {
        let (popularity, impact) = rayon::join(
            || PopularitySummaries::compute(&view.survey, &view.merged),
            || ImpactSummaries::compute(&view.merged),
        );
        Self { popularity, impact }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filtered_view_feeds_exploded_genre_counts() {
        let survey = DataFrame::new(vec![
            Column::new(COL_ID.into(), ["1", "2"]),
            Column::new(COL_AGE.into(), ["17", "22"]),
            Column::new(COL_GENRE.into(), ["RPG, Shooter", "RPG"]),
        ])
        .unwrap();
        let merged = survey.clone();
        let dataset = SurveyDataset::new(survey, merged);

        let selection: std::collections::HashSet<i32> = [17, 22].into_iter().collect();
        let view = dataset.filter_by_ages(Some(&selection)).unwrap();
        let rows = top_genres(&view.survey, 5).unwrap();
        assert_eq!(rows[0], CountRow { label: "RPG".into(), count: 2 });
        assert_eq!(rows[1], CountRow { label: "Shooter".into(), count: 1 });
    }

    #[test]
    fn genre_counts_explode_multi_valued_cells() {
        let survey = DataFrame::new(vec![
            Column::new(COL_ID.into(), ["1", "2"]),
            Column::new(COL_GENRE.into(), ["RPG, Shooter", "RPG"]),
        ])
        .unwrap();
        let rows = top_genres(&survey, 5).unwrap();
        assert_eq!(rows[0], CountRow { label: "RPG".into(), count: 2 });
        assert_eq!(rows[1], CountRow { label: "Shooter".into(), count: 1 });
    }

    #[test]
    fn donation_rate_keeps_zero_percent_genres() {
        let merged = DataFrame::new(vec![
            Column::new(COL_GENRE.into(), ["RPG", "MOBA"]),
            Column::new(COL_SPENDING.into(), ["Так", "Ні"]),
        ])
        .unwrap();
        let rows = donation_rate_by_genre(&merged, 5).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].label, "MOBA");
        assert_eq!(rows[1].percent, 0.0);
    }

    #[test]
    fn playtime_scales_stay_divergent() {
        // The short scale deliberately has no "близько 4 годин" step and
        // tops out at 4 instead of 5.
        assert_eq!(map_bucket(&PLAYTIME_SCALE_FULL, "близько 4 годин"), Some(4.0));
        assert_eq!(map_bucket(&PLAYTIME_SCALE_SHORT, "близько 4 годин"), None);
        assert_eq!(map_bucket(&PLAYTIME_SCALE_FULL, "4 години і більше"), Some(5.0));
        assert_eq!(map_bucket(&PLAYTIME_SCALE_SHORT, "4 години і більше"), Some(4.0));
    }

    #[test]
    fn playtime_distribution_sorts_by_hours_and_drops_unmapped() {
        let survey = DataFrame::new(vec![Column::new(
            COL_PLAYTIME.into(),
            [
                "близько 2 годин",
                "менше 1 години",
                "близько 2 годин",
                "не пам'ятаю",
            ],
        )])
        .unwrap();
        let rows = playtime_distribution(&survey).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].hours, 0.5);
        assert_eq!(rows[1].hours, 2.0);
        assert_eq!(rows[1].count, 2);
    }

    #[test]
    fn category_synonym_folds_into_canonical_name() {
        let merged = DataFrame::new(vec![
            Column::new(
                COL_POSITIVE_CATEGORY.into(),
                ["Когнітивні функції здібності", "Когнітивні функції"],
            ),
            Column::new(COL_NEGATIVE_CATEGORY.into(), ["Агресія", "Агресія"]),
        ])
        .unwrap();
        let rows = impact_category_comparison(&merged).unwrap();
        let cognitive = rows
            .iter()
            .find(|row| row.label == "Когнітивні функції")
            .unwrap();
        assert_eq!(cognitive.positive, 2);
        assert!(!rows
            .iter()
            .any(|row| row.label == "Когнітивні функції здібності"));
    }

    #[test]
    fn type_drilldown_is_asymmetric() {
        let categories = [
            "Соціальні навички",
            "Соціальні навички",
            "Соціальні навички",
            "Інше",
            "Інше",
            "Інше",
        ];
        let types = [
            "Командна гра",
            "Комунікація",
            "Емпатія",
            "Тип А",
            "Тип Б",
            "Тип В",
        ];
        let merged = DataFrame::new(vec![
            Column::new(COL_POSITIVE_CATEGORY.into(), categories),
            Column::new(COL_POSITIVE_TYPE.into(), types),
        ])
        .unwrap();

        let specific = impact_type_drilldown(
            &merged,
            Polarity::Positive,
            &CategoryChoice::One("Соціальні навички".into()),
        )
        .unwrap();
        assert_eq!(specific.len(), 3);

        let all =
            impact_type_drilldown(&merged, Polarity::Positive, &CategoryChoice::All).unwrap();
        assert_eq!(all.len(), 5); // six distinct types, truncated
    }

    #[test]
    fn genre_drilldown_truncates_both_modes_and_skips_all_sentinel() {
        let categories: Vec<&str> = vec!["К"; 8];
        let genres = ["RPG", "MOBA", "Шутер", "Стратегія", "Гонки", "Спорт", "Всі", "RPG"];
        let merged = DataFrame::new(vec![
            Column::new(COL_POSITIVE_CATEGORY.into(), categories),
            Column::new(COL_POSITIVE_GENRE.into(), genres),
        ])
        .unwrap();

        let all =
            impact_genre_drilldown(&merged, Polarity::Positive, &CategoryChoice::All).unwrap();
        assert_eq!(all.len(), 5);
        assert!(all.iter().all(|row| row.label != ALL_GENRES));

        let one = impact_genre_drilldown(
            &merged,
            Polarity::Positive,
            &CategoryChoice::One("К".into()),
        )
        .unwrap();
        assert_eq!(one.len(), 5);
    }

    #[test]
    fn heatmap_excludes_both_genre_sentinels() {
        let merged = DataFrame::new(vec![
            Column::new(COL_NEGATIVE_GENRE.into(), ["RPG", "Всі", "0", "RPG"]),
            Column::new(
                COL_NEGATIVE_TYPE.into(),
                ["Агресія", "Агресія", "Залежність", "Залежність"],
            ),
        ])
        .unwrap();
        let table = impact_genre_type_heatmap(&merged, Polarity::Negative).unwrap();
        assert_eq!(table.rows, vec!["RPG"]);
        assert_eq!(table.columns, vec!["Агресія", "Залежність"]);
        assert_eq!(table.values, vec![vec![1, 1]]);
    }

    #[test]
    fn playtime_share_handles_zero_denominator() {
        let merged = DataFrame::new(vec![
            Column::new(COL_PLAYTIME.into(), ["близько 2 годин", "близько 2 годин"]),
            Column::new(COL_POSITIVE.into(), ["Так", "Так"]),
            Column::new(COL_NEGATIVE.into(), ["Ні", "Ні"]),
        ])
        .unwrap();
        let rows = impact_share_by_playtime(&merged).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].hours, 2.0);
        assert!((rows[0].positive - 1.0).abs() < 1e-9);
        assert_eq!(rows[0].negative, 0.0);
    }

    #[test]
    fn sunburst_counts_per_side_and_role() {
        let merged = DataFrame::new(vec![
            Column::new(COL_RESPONDENT.into(), ["Учень", "Учень", "Вчитель"]),
            Column::new(COL_POSITIVE.into(), ["Так", "Так", "Ні"]),
            Column::new(COL_NEGATIVE.into(), ["Ні", "Так", "Так"]),
        ])
        .unwrap();
        let rows = impact_by_respondent(&merged).unwrap();
        let find = |side: &str, role: &str| {
            rows.iter()
                .find(|row| row.primary == side && row.secondary == role)
                .unwrap()
        };
        assert_eq!(find(POSITIVE_LABEL, "Учень").count, 2);
        assert_eq!(find(NEGATIVE_LABEL, "Вчитель").count, 1);
        assert!((find(NEGATIVE_LABEL, "Учень").percent - 50.0).abs() < 1e-9);
    }
}
