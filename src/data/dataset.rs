//! Survey Dataset Module
//! Immutable load-once container for the two survey tables and their join.

use polars::prelude::*;
use std::collections::HashSet;

/// Join key shared by both exports.
pub const COL_ID: &str = "ID";

// Survey export columns.
pub const COL_AGE: &str = "Вік";
pub const COL_PLAYS: &str = "Чи грає у відеоігри";
pub const COL_GENRE: &str = "Жанр";
pub const COL_FAVORITE_GAME: &str = "Улюблена гра";
pub const COL_DEVICE: &str = "Девайс";
pub const COL_PLAYTIME: &str = "Час";
pub const COL_SPENDING: &str = "Витрата грошей";
pub const COL_RESPONDENT: &str = "Респондент";

// Impact export columns.
pub const COL_POSITIVE: &str = "Позитивний вплив";
pub const COL_NEGATIVE: &str = "Негативний вплив";
pub const COL_POSITIVE_CATEGORY: &str = "Категорія позитивного впливу";
pub const COL_NEGATIVE_CATEGORY: &str = "Категорія негативного впливу";
pub const COL_POSITIVE_TYPE: &str = "Тип позитивного впливу";
pub const COL_NEGATIVE_TYPE: &str = "Тип негативного впливу";
pub const COL_POSITIVE_GENRE: &str = "Жанр позитивного впливу";
pub const COL_NEGATIVE_GENRE: &str = "Жанр негативного впливу";

/// The loaded tables plus the derived per-row ages. Never mutated after
/// construction; every filter pass reads from here and builds a fresh view.
#[derive(Debug)]
pub struct SurveyDataset {
    survey: DataFrame,
    merged: DataFrame,
    /// Parsed age per survey row; `None` when the age column is absent.
    row_ages: Option<Vec<Option<i32>>>,
}

/// The pair of tables a single filter pass produces. Charts on the
/// popularity tab read `survey`, charts on the impact tab read `merged`.
#[derive(Clone)]
pub struct FilteredView {
    pub survey: DataFrame,
    pub merged: DataFrame,
}

impl FilteredView {
    pub fn is_empty(&self) -> bool {
        self.survey.height() == 0
    }
}

impl SurveyDataset {
    pub fn new(survey: DataFrame, merged: DataFrame) -> Self {
        let row_ages = parse_row_ages(&survey);
        Self {
            survey,
            merged,
            row_ages,
        }
    }

    pub fn survey(&self) -> &DataFrame {
        &self.survey
    }

    pub fn merged(&self) -> &DataFrame {
        &self.merged
    }

    /// Whether the survey export carries an age column at all.
    pub fn has_ages(&self) -> bool {
        self.row_ages.is_some()
    }

    /// Distinct parsed ages, ascending. Empty when age filtering is disabled.
    pub fn distinct_ages(&self) -> Vec<i32> {
        let Some(row_ages) = &self.row_ages else {
            return Vec::new();
        };
        let mut ages: Vec<i32> = row_ages
            .iter()
            .filter_map(|age| *age)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        ages.sort_unstable();
        ages
    }

    /// Apply an age selection as a pure function of the loaded tables.
    ///
    /// `None` means filtering is disabled (age column absent): both tables
    /// pass through whole. With a selection, survey rows are kept when their
    /// parsed age is selected, and joined rows are kept when their ID appears
    /// in the kept survey rows.
    pub fn filter_by_ages(&self, selection: Option<&HashSet<i32>>) -> PolarsResult<FilteredView> {
        let (Some(row_ages), Some(selection)) = (&self.row_ages, selection) else {
            return Ok(FilteredView {
                survey: self.survey.clone(),
                merged: self.merged.clone(),
            });
        };

        let survey_mask: Vec<bool> = row_ages
            .iter()
            .map(|age| age.is_some_and(|age| selection.contains(&age)))
            .collect();
        let survey_mask = BooleanChunked::from_slice("age_mask".into(), &survey_mask);
        let survey = self.survey.filter(&survey_mask)?;

        let kept_ids: HashSet<String> = column_strings(&survey, COL_ID)?
            .into_iter()
            .flatten()
            .collect();
        let merged_ids = column_strings(&self.merged, COL_ID)?;
        let merged_mask: Vec<bool> = merged_ids
            .iter()
            .map(|id| id.as_ref().is_some_and(|id| kept_ids.contains(id)))
            .collect();
        let merged_mask = BooleanChunked::from_slice("id_mask".into(), &merged_mask);
        let merged = self.merged.filter(&merged_mask)?;

        Ok(FilteredView { survey, merged })
    }
}

/// Parse the free-text age column to numbers; non-numeric cells become null.
fn parse_row_ages(survey: &DataFrame) -> Option<Vec<Option<i32>>> {
    let ages = column_strings(survey, COL_AGE).ok()?;
    Some(
        ages.iter()
            .map(|raw| raw.as_deref().and_then(parse_age))
            .collect(),
    )
}

fn parse_age(raw: &str) -> Option<i32> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|age| age.is_finite())
        .map(|age| age as i32)
}

/// Materialize a column as per-row optional strings, casting if needed.
pub fn column_strings(df: &DataFrame, name: &str) -> PolarsResult<Vec<Option<String>>> {
    let casted = df.column(name)?.cast(&DataType::String)?;
    let ca = casted.str()?;
    Ok(ca.into_iter().map(|v| v.map(str::to_string)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn survey_fixture() -> DataFrame {
        DataFrame::new(vec![
            Column::new(COL_ID.into(), ["1", "2", "3", "4"]),
            Column::new(COL_AGE.into(), ["17", "22", "сімнадцять", "17"]),
            Column::new(COL_GENRE.into(), ["RPG, Shooter", "RPG", "-", "MOBA"]),
        ])
        .unwrap()
    }

    fn merged_fixture() -> DataFrame {
        DataFrame::new(vec![
            Column::new(COL_ID.into(), ["1", "2", "3", "4", "9"]),
            Column::new(COL_POSITIVE.into(), ["Так", "Ні", "Так", "Ні", "Так"]),
        ])
        .unwrap()
    }

    #[test]
    fn distinct_ages_drop_non_numeric_and_duplicates() {
        let dataset = SurveyDataset::new(survey_fixture(), merged_fixture());
        assert!(dataset.has_ages());
        assert_eq!(dataset.distinct_ages(), vec![17, 22]);
    }

    #[test]
    fn age_filter_keeps_matching_survey_and_merged_rows() {
        let dataset = SurveyDataset::new(survey_fixture(), merged_fixture());
        let selection: HashSet<i32> = [17].into_iter().collect();
        let view = dataset.filter_by_ages(Some(&selection)).unwrap();
        assert_eq!(view.survey.height(), 2); // IDs 1 and 4
        assert_eq!(view.merged.height(), 2); // ID 9 has no survey row, dropped
    }

    #[test]
    fn empty_selection_yields_empty_view() {
        let dataset = SurveyDataset::new(survey_fixture(), merged_fixture());
        let selection: HashSet<i32> = HashSet::new();
        let view = dataset.filter_by_ages(Some(&selection)).unwrap();
        assert!(view.is_empty());
        assert_eq!(view.merged.height(), 0);
    }

    #[test]
    fn missing_age_column_disables_filtering() {
        let survey = DataFrame::new(vec![Column::new(COL_ID.into(), ["1", "2"])]).unwrap();
        let dataset = SurveyDataset::new(survey, merged_fixture());
        assert!(!dataset.has_ages());
        let view = dataset.filter_by_ages(None).unwrap();
        assert_eq!(view.survey.height(), 2);
        assert_eq!(view.merged.height(), 5);
    }

    #[test]
    fn numeric_age_column_still_parses() {
        let survey = DataFrame::new(vec![
            Column::new(COL_ID.into(), ["1", "2"]),
            Column::new(COL_AGE.into(), [17i64, 22]),
        ])
        .unwrap();
        let dataset = SurveyDataset::new(survey, merged_fixture());
        assert_eq!(dataset.distinct_ages(), vec![17, 22]);
    }
}
