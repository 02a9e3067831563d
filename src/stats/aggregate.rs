//! Aggregation Primitives Module
//! Generic counting, ratio, cross-tabulation and bucket-mean operations
//! shared by all chart summaries.

use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

use crate::data::dataset::column_strings;

/// Placeholder cell meaning "no value" in the survey export.
pub const MISSING: &str = "-";
/// Literal text left behind by spreadsheet exports for empty device cells.
pub const NAN_TEXT: &str = "nan";
/// Impact-genre sentinel meaning "not genre-specific".
pub const ALL_GENRES: &str = "Всі";
/// Second impact-genre sentinel with the same meaning.
pub const NO_GENRE: &str = "0";

#[derive(Error, Debug, Clone, Serialize)]
pub enum AggError {
    #[error("Відсутній стовпець '{0}'")]
    MissingColumn(String),
    #[error("{0}")]
    Polars(String),
}

impl From<PolarsError> for AggError {
    fn from(err: PolarsError) -> Self {
        AggError::Polars(err.to_string())
    }
}

/// One category with its count, the unit every counting chart consumes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountRow {
    pub label: String,
    pub count: u32,
}

/// One key of a ratio table: subset share of the population, in percent.
#[derive(Debug, Clone, Serialize)]
pub struct RatioRow {
    pub label: String,
    pub subset: u32,
    pub total: u32,
    pub percent: f64,
}

/// One exploded pair of a two-key cross tabulation. `percent` is the share
/// of this pair within all pairs carrying the same primary key.
#[derive(Debug, Clone, Serialize)]
pub struct CrossRow {
    pub primary: String,
    pub secondary: String,
    pub count: u32,
    pub percent: f64,
}

/// Mean of a bucket-mapped value per key, with the full per-key row count.
#[derive(Debug, Clone, Serialize)]
pub struct MeanRow {
    pub label: String,
    pub mean: f64,
    pub count: u32,
}

/// Zero-filled matrix produced by unstacking pair counts.
#[derive(Debug, Clone, Serialize)]
pub struct PivotTable {
    pub rows: Vec<String>,
    pub columns: Vec<String>,
    pub values: Vec<Vec<u32>>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }

    pub fn max_value(&self) -> u32 {
        self.values
            .iter()
            .flat_map(|row| row.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Drill-down selector state: the "all categories" sentinel or one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryChoice {
    All,
    One(String),
}

impl CategoryChoice {
    pub fn is_all(&self) -> bool {
        matches!(self, CategoryChoice::All)
    }
}

/// How a multi-valued cell is exploded before counting.
#[derive(Debug, Clone, Copy, Default)]
pub struct SplitOptions {
    /// Device fields compare case-insensitively; nothing else does.
    pub lowercase: bool,
}

/// Materialize a column as per-row optional strings with a typed error for
/// the one failure charts care about. Checked once per aggregation.
pub fn text_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, AggError> {
    if !df.get_column_names().iter().any(|c| c.as_str() == name) {
        return Err(AggError::MissingColumn(name.to_string()));
    }
    Ok(column_strings(df, name)?)
}

/// Split a multi-valued cell on commas, trim each piece, optionally
/// lowercase, and drop sentinel pieces. A record listing two values
/// contributes both, whole.
pub fn split_cell(raw: &str, opts: SplitOptions, sentinels: &[&str]) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            if opts.lowercase {
                piece.to_lowercase()
            } else {
                piece.to_string()
            }
        })
        .filter(|piece| !sentinels.contains(&piece.as_str()))
        .collect()
}

/// Explode every non-null cell of a column into its listed values.
pub fn exploded_values(
    values: &[Option<String>],
    opts: SplitOptions,
    sentinels: &[&str],
) -> Vec<String> {
    values
        .iter()
        .flatten()
        .flat_map(|raw| split_cell(raw, opts, sentinels))
        .collect()
}

/// (category, count) pairs, descending by count; ties break on the label so
/// repeated runs stay deterministic.
pub fn count_values<I>(values: I) -> Vec<CountRow>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, u32> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut rows: Vec<CountRow> = counts
        .into_iter()
        .map(|(label, count)| CountRow { label, count })
        .collect();
    rows.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.label.cmp(&b.label)));
    rows
}

/// Plain value counts of one column: non-null cells, no splitting.
pub fn column_value_counts(df: &DataFrame, name: &str) -> Result<Vec<CountRow>, AggError> {
    let values = text_column(df, name)?;
    Ok(count_values(values.into_iter().flatten()))
}

/// Value counts of a multi-valued column after explosion.
pub fn exploded_value_counts(
    df: &DataFrame,
    name: &str,
    opts: SplitOptions,
    sentinels: &[&str],
) -> Result<Vec<CountRow>, AggError> {
    let values = text_column(df, name)?;
    Ok(count_values(exploded_values(&values, opts, sentinels)))
}

pub fn top_n(mut rows: Vec<CountRow>, n: usize) -> Vec<CountRow> {
    rows.truncate(n);
    rows
}

/// Per-key share of rows satisfying `numerator` among all rows, after
/// exploding the key column. Every population key is reported: a key the
/// numerator never hits comes out at exactly 0 percent. Descending by
/// percentage. An empty population key set yields an empty table, and a
/// zero denominator can never surface as an error.
pub fn ratio_by_key<F>(
    df: &DataFrame,
    key: &str,
    opts: SplitOptions,
    sentinels: &[&str],
    numerator: F,
) -> Result<Vec<RatioRow>, AggError>
where
    F: Fn(usize) -> bool,
{
    let keys = text_column(df, key)?;
    let mut totals: HashMap<String, u32> = HashMap::new();
    let mut subset: HashMap<String, u32> = HashMap::new();

    for (idx, raw) in keys.iter().enumerate() {
        let Some(raw) = raw else { continue };
        let in_subset = numerator(idx);
        for value in split_cell(raw, opts, sentinels) {
            *totals.entry(value.clone()).or_default() += 1;
            if in_subset {
                *subset.entry(value).or_default() += 1;
            }
        }
    }

    let mut rows: Vec<RatioRow> = totals
        .into_iter()
        .map(|(label, total)| {
            let inside = subset.get(&label).copied().unwrap_or(0);
            let percent = if total == 0 {
                0.0
            } else {
                f64::from(inside) / f64::from(total) * 100.0
            };
            RatioRow {
                label,
                subset: inside,
                total,
                percent,
            }
        })
        .collect();
    rows.sort_by(|a, b| {
        b.percent
            .partial_cmp(&a.percent)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    Ok(rows)
}

/// Explode two key columns independently (a record with 2 primaries and 3
/// secondaries contributes 6 pairs), count per pair, and attach each pair's
/// share within its primary key. `keep_row` pre-filters whole records
/// before any splitting. Pairs come out ordered by (primary, secondary).
pub fn cross_tab<F>(
    df: &DataFrame,
    primary: &str,
    primary_opts: SplitOptions,
    primary_sentinels: &[&str],
    secondary: &str,
    secondary_opts: SplitOptions,
    secondary_sentinels: &[&str],
    keep_row: F,
) -> Result<Vec<CrossRow>, AggError>
where
    F: Fn(usize) -> bool,
{
    let primaries = text_column(df, primary)?;
    let secondaries = text_column(df, secondary)?;

    let mut counts: BTreeMap<(String, String), u32> = BTreeMap::new();
    for idx in 0..primaries.len() {
        if !keep_row(idx) {
            continue;
        }
        let (Some(raw_primary), Some(raw_secondary)) = (&primaries[idx], &secondaries[idx]) else {
            continue;
        };
        for first in split_cell(raw_primary, primary_opts, primary_sentinels) {
            for second in split_cell(raw_secondary, secondary_opts, secondary_sentinels) {
                *counts.entry((first.clone(), second)).or_default() += 1;
            }
        }
    }

    let mut primary_totals: HashMap<&str, u32> = HashMap::new();
    for ((first, _), count) in &counts {
        *primary_totals.entry(first.as_str()).or_default() += count;
    }

    Ok(counts
        .iter()
        .map(|((first, second), count)| {
            let total = primary_totals[first.as_str()];
            CrossRow {
                primary: first.clone(),
                secondary: second.clone(),
                count: *count,
                percent: f64::from(*count) / f64::from(total) * 100.0,
            }
        })
        .collect())
}

/// Unstack pair counts into a matrix with sorted labels on both axes and
/// zeroes where a pair never occurred.
pub fn pivot(pairs: &[CrossRow]) -> PivotTable {
    let mut rows: Vec<String> = pairs.iter().map(|p| p.primary.clone()).collect();
    rows.sort();
    rows.dedup();
    let mut columns: Vec<String> = pairs.iter().map(|p| p.secondary.clone()).collect();
    columns.sort();
    columns.dedup();

    let mut values = vec![vec![0u32; columns.len()]; rows.len()];
    for pair in pairs {
        let (Ok(r), Ok(c)) = (
            rows.binary_search(&pair.primary),
            columns.binary_search(&pair.secondary),
        ) else {
            continue;
        };
        values[r][c] += pair.count;
    }
    PivotTable {
        rows,
        columns,
        values,
    }
}

/// Mean of a bucket-mapped value per key, ascending by mean. Rows whose key
/// cell equals a skip sentinel are dropped whole. `count` covers every kept
/// row of the key; the mean covers only rows whose value has a scale entry.
/// Keys with no mapped value at all are dropped, never averaged as zero.
pub fn mean_by_key(
    df: &DataFrame,
    key: &str,
    value: &str,
    scale: &[(&str, f64)],
    skip_keys: &[&str],
) -> Result<Vec<MeanRow>, AggError> {
    let keys = text_column(df, key)?;
    let values = text_column(df, value)?;

    struct Acc {
        rows: u32,
        sum: f64,
        mapped: u32,
    }
    let mut accumulators: HashMap<String, Acc> = HashMap::new();

    for idx in 0..keys.len() {
        let Some(raw_key) = &keys[idx] else { continue };
        if skip_keys.contains(&raw_key.as_str()) {
            continue;
        }
        let acc = accumulators.entry(raw_key.clone()).or_insert(Acc {
            rows: 0,
            sum: 0.0,
            mapped: 0,
        });
        acc.rows += 1;
        if let Some(mapped) = values[idx].as_deref().and_then(|raw| map_bucket(scale, raw)) {
            acc.sum += mapped;
            acc.mapped += 1;
        }
    }

    let mut rows: Vec<MeanRow> = accumulators
        .into_iter()
        .filter(|(_, acc)| acc.mapped > 0)
        .map(|(label, acc)| MeanRow {
            label,
            mean: acc.sum / f64::from(acc.mapped),
            count: acc.rows,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.mean
            .partial_cmp(&b.mean)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.label.cmp(&b.label))
    });
    Ok(rows)
}

/// Look a bucket text up in an enumerated scale. No entry means the value
/// is excluded from both count and mean.
pub fn map_bucket(scale: &[(&str, f64)], raw: &str) -> Option<f64> {
    scale
        .iter()
        .find(|(bucket, _)| *bucket == raw)
        .map(|(_, hours)| *hours)
}

/// Count `targets` for rows matching the drill-down choice. Rows with a
/// null target never count; with a specific category only rows whose
/// category equals it do. Truncation policy is the caller's.
pub fn drill_down_counts(
    categories: &[Option<String>],
    targets: &[Option<String>],
    choice: &CategoryChoice,
) -> Vec<CountRow> {
    let matching = categories
        .iter()
        .zip(targets.iter())
        .filter(|(category, _)| match choice {
            CategoryChoice::All => true,
            CategoryChoice::One(wanted) => category.as_deref() == Some(wanted.as_str()),
        })
        .filter_map(|(_, target)| target.clone());
    count_values(matching)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(columns: Vec<Column>) -> DataFrame {
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn split_cell_trims_and_drops_sentinels() {
        let opts = SplitOptions::default();
        assert_eq!(
            split_cell(" RPG , Shooter ", opts, &[MISSING]),
            vec!["RPG", "Shooter"]
        );
        assert!(split_cell("-", opts, &[MISSING]).is_empty());
    }

    #[test]
    fn split_cell_lowercases_devices_only_when_asked() {
        let lowered = SplitOptions { lowercase: true };
        assert_eq!(
            split_cell("ПК, Консоль", lowered, &[]),
            vec!["пк", "консоль"]
        );
        assert_eq!(split_cell("ПК", SplitOptions::default(), &[]), vec!["ПК"]);
    }

    #[test]
    fn exploded_counts_sum_to_value_pairs_not_records() {
        // Two records, three listed values after sentinel exclusion.
        let df = frame(vec![Column::new(
            "Жанр".into(),
            ["RPG, Shooter", "RPG", "-"],
        )]);
        let rows =
            exploded_value_counts(&df, "Жанр", SplitOptions::default(), &[MISSING]).unwrap();
        let total: u32 = rows.iter().map(|r| r.count).sum();
        assert_eq!(total, 3);
        assert_eq!(rows[0], CountRow { label: "RPG".into(), count: 2 });
        assert_eq!(rows[1], CountRow { label: "Shooter".into(), count: 1 });
    }

    #[test]
    fn missing_column_reports_typed_error() {
        let df = frame(vec![Column::new("a".into(), ["x"])]);
        let err = column_value_counts(&df, "b").unwrap_err();
        assert!(matches!(err, AggError::MissingColumn(name) if name == "b"));
    }

    #[test]
    fn ratio_reports_zero_for_keys_absent_from_subset() {
        let df = frame(vec![
            Column::new("Жанр".into(), ["RPG", "MOBA", "RPG"]),
            Column::new("Витрата грошей".into(), ["Так", "Ні", "Ні"]),
        ]);
        let spending = text_column(&df, "Витрата грошей").unwrap();
        let rows = ratio_by_key(&df, "Жанр", SplitOptions::default(), &[MISSING], |idx| {
            spending[idx].as_deref() == Some("Так")
        })
        .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].label, "RPG");
        assert!((rows[0].percent - 50.0).abs() < 1e-9);
        let moba = &rows[1];
        assert_eq!(moba.label, "MOBA");
        assert_eq!(moba.subset, 0);
        assert_eq!(moba.percent, 0.0);
    }

    #[test]
    fn empty_population_is_an_empty_table_not_an_error() {
        let df = frame(vec![
            Column::new("Жанр".into(), ["-", "-"]),
            Column::new("Витрата грошей".into(), ["Так", "Так"]),
        ]);
        let rows = ratio_by_key(&df, "Жанр", SplitOptions::default(), &[MISSING], |_| true)
            .unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn cross_tab_expands_cartesian_pairs() {
        let df = frame(vec![
            Column::new("Жанр".into(), ["RPG, MOBA"]),
            Column::new("Девайс".into(), ["ПК, Консоль, Телефон"]),
        ]);
        let pairs = cross_tab(
            &df,
            "Жанр",
            SplitOptions::default(),
            &[MISSING],
            "Девайс",
            SplitOptions { lowercase: true },
            &[MISSING, NAN_TEXT],
            |_| true,
        )
        .unwrap();
        assert_eq!(pairs.len(), 6);
        let total: u32 = pairs.iter().map(|p| p.count).sum();
        assert_eq!(total, 6);
        // Each device takes a third of its genre.
        assert!(pairs.iter().all(|p| (p.percent - 100.0 / 3.0).abs() < 1e-9));
    }

    #[test]
    fn pivot_zero_fills_absent_pairs() {
        let pairs = vec![
            CrossRow { primary: "RPG".into(), secondary: "Агресія".into(), count: 2, percent: 100.0 },
            CrossRow { primary: "MOBA".into(), secondary: "Залежність".into(), count: 1, percent: 100.0 },
        ];
        let table = pivot(&pairs);
        assert_eq!(table.rows, vec!["MOBA", "RPG"]);
        assert_eq!(table.columns, vec!["Агресія", "Залежність"]);
        assert_eq!(table.values, vec![vec![0, 1], vec![2, 0]]);
        assert_eq!(table.max_value(), 2);
    }

    #[test]
    fn mean_excludes_unmapped_values_from_count_and_mean() {
        let scale: [(&str, f64); 2] = [("близько 2 годин", 2.0), ("близько 3 годин", 3.0)];
        let df = frame(vec![
            Column::new("Жанр".into(), ["RPG", "RPG", "RPG", "RPG", "-"]),
            Column::new(
                "Час".into(),
                [
                    "близько 2 годин",
                    "близько 2 годин",
                    "близько 3 годин",
                    "не знаю",
                    "близько 2 годин",
                ],
            ),
        ]);
        let rows = mean_by_key(&df, "Жанр", "Час", &scale, &[MISSING]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].label, "RPG");
        // Mean over the three mapped rows only: (2 + 2 + 3) / 3.
        assert!((rows[0].mean - 7.0 / 3.0).abs() < 1e-9);
        // The unmapped row still counts as a respondent of this genre.
        assert_eq!(rows[0].count, 4);
    }

    #[test]
    fn drill_down_specific_category_returns_all_types() {
        let categories: Vec<Option<String>> = vec![
            Some("Соціальні навички".into()),
            Some("Соціальні навички".into()),
            Some("Соціальні навички".into()),
            Some("Інше".into()),
            None,
        ];
        let types: Vec<Option<String>> = vec![
            Some("Командна гра".into()),
            Some("Комунікація".into()),
            Some("Емпатія".into()),
            Some("Щось ще".into()),
            Some("Без категорії".into()),
        ];

        let one = CategoryChoice::One("Соціальні навички".into());
        let rows = drill_down_counts(&categories, &types, &one);
        assert_eq!(rows.len(), 3); // all three, never truncated here

        let all = top_n(drill_down_counts(&categories, &types, &CategoryChoice::All), 5);
        assert_eq!(all.len(), 5);
        let total: u32 = all.iter().map(|r| r.count).sum();
        assert_eq!(total, 5);
    }
}
