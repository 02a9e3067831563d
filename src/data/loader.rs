//! CSV Data Loader Module
//! Loads the two survey exports and joins them on the shared ID column.

use polars::prelude::*;
use thiserror::Error;

use super::dataset::{SurveyDataset, COL_ID};

/// Fixed relative paths of the two exports, resolved from the working
/// directory at process start.
pub const SURVEY_PATH: &str = "survey_data_updated.csv";
pub const IMPACT_PATH: &str = "impact_data_updated.csv";

const SURVEY_SEPARATOR: u8 = b';';
const IMPACT_SEPARATOR: u8 = b',';

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Не вдалося прочитати CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("Стовпець '{key}' відсутній у таблиці {table}. Перевірте назви стовпців.")]
    MissingJoinKey { table: &'static str, key: String },
}

/// Loads both exports with Polars and produces the joined dataset.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load, coerce the join key and outer-join the two exports.
    ///
    /// A missing `ID` column on either side is fatal: no dataset is
    /// produced and nothing may render.
    pub fn load(survey_path: &str, impact_path: &str) -> Result<SurveyDataset, LoaderError> {
        let survey = Self::load_csv(survey_path, SURVEY_SEPARATOR)?;
        let impact = Self::load_csv(impact_path, IMPACT_SEPARATOR)?;
        Self::join(survey, impact)
    }

    /// Coerce `ID` to string on both sides, then full outer join. Public so
    /// tests can exercise join semantics on in-memory frames.
    pub fn join(survey: DataFrame, impact: DataFrame) -> Result<SurveyDataset, LoaderError> {
        let survey = Self::coerce_join_key(survey, "survey")?;
        let impact = Self::coerce_join_key(impact, "impact")?;
        let merged = Self::outer_join(&survey, &impact)?;
        Ok(SurveyDataset::new(survey, merged))
    }

    fn load_csv(path: &str, separator: u8) -> Result<DataFrame, LoaderError> {
        let df = LazyCsvReader::new(path)
            .with_separator(separator)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;
        Ok(df)
    }

    /// Cast the join key to string so numeric-looking IDs read with
    /// different inferred types still match.
    fn coerce_join_key(df: DataFrame, table: &'static str) -> Result<DataFrame, LoaderError> {
        if !df.get_column_names().iter().any(|c| c.as_str() == COL_ID) {
            return Err(LoaderError::MissingJoinKey {
                table,
                key: COL_ID.to_string(),
            });
        }
        let df = df
            .lazy()
            .with_column(col(COL_ID).cast(DataType::String))
            .collect()?;
        Ok(df)
    }

    fn outer_join(survey: &DataFrame, impact: &DataFrame) -> Result<DataFrame, LoaderError> {
        let merged = survey
            .clone()
            .lazy()
            .join(
                impact.clone().lazy(),
                [col(COL_ID)],
                [col(COL_ID)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
            .collect()?;
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::{column_strings, COL_PLAYS, COL_POSITIVE};

    fn survey_fixture() -> DataFrame {
        DataFrame::new(vec![
            Column::new(COL_ID.into(), [1i64, 2, 3]),
            Column::new(COL_PLAYS.into(), ["Так", "Так", "Ні"]),
        ])
        .unwrap()
    }

    fn impact_fixture() -> DataFrame {
        DataFrame::new(vec![
            Column::new(COL_ID.into(), ["2", "3", "7"]),
            Column::new(COL_POSITIVE.into(), ["Так", "Ні", "Так"]),
        ])
        .unwrap()
    }

    #[test]
    fn outer_join_keeps_identifiers_from_both_sides() {
        let dataset = DatasetLoader::join(survey_fixture(), impact_fixture()).unwrap();
        let merged = dataset.merged();
        assert_eq!(merged.height(), 4); // IDs 1, 2, 3, 7

        let ids = column_strings(merged, COL_ID).unwrap();
        let mut ids: Vec<String> = ids.into_iter().flatten().collect();
        ids.sort();
        assert_eq!(ids, vec!["1", "2", "3", "7"]);
    }

    #[test]
    fn unmatched_sides_fill_with_nulls() {
        let dataset = DatasetLoader::join(survey_fixture(), impact_fixture()).unwrap();
        let merged = dataset.merged();
        let ids = column_strings(merged, COL_ID).unwrap();
        let plays = column_strings(merged, COL_PLAYS).unwrap();
        let positive = column_strings(merged, COL_POSITIVE).unwrap();

        let row_of = |id: &str| ids.iter().position(|v| v.as_deref() == Some(id)).unwrap();
        // ID 1 exists only in the survey export.
        assert!(positive[row_of("1")].is_none());
        // ID 7 exists only in the impact export.
        assert!(plays[row_of("7")].is_none());
        assert_eq!(positive[row_of("7")].as_deref(), Some("Так"));
    }

    #[test]
    fn join_key_coercion_is_idempotent() {
        let once = DatasetLoader::join(survey_fixture(), impact_fixture()).unwrap();
        let again = DatasetLoader::join(once.survey().clone(), impact_fixture()).unwrap();
        assert_eq!(once.merged().height(), again.merged().height());
    }

    #[test]
    fn missing_join_key_is_fatal() {
        let no_id = DataFrame::new(vec![Column::new(COL_PLAYS.into(), ["Так"])]).unwrap();
        let err = DatasetLoader::join(no_id, impact_fixture()).unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingJoinKey { table: "survey", .. }
        ));
    }
}
