//! Spreadsheet-shaped JSON documents.
//!
//! A workbook maps sheet names to rows of cells:
//!
//! ```json
//! {"sheets": {"threshold": [["threshold"], [0]], "pool_limit": [[3]]}}
//! ```

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tripool_domain::{InputValidationError, Pooling, PoolingProblem};

pub type Sheet = Vec<Vec<Cell>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Numeric value of the cell; numeric text is accepted too.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(value) => Some(*value),
            Cell::Text(text) => text.trim().parse().ok(),
            Cell::Empty => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(text) => text.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    fn as_label(&self) -> Option<String> {
        match self {
            Cell::Text(text) if !text.trim().is_empty() => Some(text.trim().to_owned()),
            Cell::Number(value) => Some(value.to_string()),
            _ => None,
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_owned())
    }
}

#[derive(Debug, Error)]
pub enum WorkbookError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed workbook JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Sheet '{0}' is missing")]
    MissingSheet(String),
    #[error("Sheet '{0}' holds no value")]
    MissingValue(String),
    #[error("Sheet '{sheet}' has a non-numeric cell at row {row}, column {column}")]
    NonNumericCell {
        sheet: String,
        row: usize,
        column: usize,
    },
    #[error("Sheet '{sheet}' has no trip label at row {row}, column {column}")]
    InvalidLabel {
        sheet: String,
        row: usize,
        column: usize,
    },
    #[error(transparent)]
    Validation(#[from] InputValidationError),
}

/// Sheet names of an input workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub benefits: String,
    pub threshold: String,
    pub pool_limit: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            benefits: "benefits".to_owned(),
            threshold: "threshold".to_owned(),
            pool_limit: "pool_limit".to_owned(),
        }
    }
}

pub const PAIRS_SHEET: &str = "pairs";
pub const OPTIMUM_SHEET: &str = "optimum";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Workbook {
    pub sheets: IndexMap<String, Sheet>,
}

impl Workbook {
    pub fn from_json_str(source: &str) -> Result<Self, WorkbookError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, WorkbookError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read(path: impl AsRef<Path>) -> Result<Self, WorkbookError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| WorkbookError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&source)
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), WorkbookError> {
        let path = path.as_ref();
        let mut rendered = self.to_json_pretty()?;
        rendered.push('\n');
        fs::write(path, rendered).map_err(|source| WorkbookError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn sheet(&self, name: &str) -> Result<&Sheet, WorkbookError> {
        self.sheets
            .get(name)
            .ok_or_else(|| WorkbookError::MissingSheet(name.to_owned()))
    }

    pub fn insert_sheet(&mut self, name: impl Into<String>, sheet: Sheet) {
        self.sheets.insert(name.into(), sheet);
    }

    /// Reads and validates the benefit matrix, threshold and pool limit.
    pub fn read_pooling_problem(&self, names: &SheetNames) -> Result<PoolingProblem, WorkbookError> {
        let (labels, rows) = read_benefit_sheet(&names.benefits, self.sheet(&names.benefits)?)?;
        let threshold = read_scalar(&names.threshold, self.sheet(&names.threshold)?)?;
        let pool_limit = read_scalar(&names.pool_limit, self.sheet(&names.pool_limit)?)?;
        tracing::debug!(
            trip_count = labels.len(),
            threshold,
            pool_limit,
            "Pooling input read from workbook"
        );
        Ok(PoolingProblem::from_raw(
            labels.as_slice(),
            rows,
            threshold,
            pool_limit,
        )?)
    }

    /// Renders a pooling as the `pairs` and `optimum` sheets.
    pub fn from_pooling(pooling: &Pooling) -> Self {
        let mut pairs: Sheet = Vec::with_capacity(pooling.len() + 1);
        pairs.push(vec!["trip_1".into(), "trip_2".into(), "benefit".into()]);
        for pair in pooling.pairs() {
            pairs.push(vec![
                pair.first().into(),
                pair.second().into(),
                pair.benefit().into(),
            ]);
        }

        let mut workbook = Self::default();
        workbook.insert_sheet(PAIRS_SHEET, pairs);
        workbook.insert_sheet(
            OPTIMUM_SHEET,
            vec![vec!["objective".into()], vec![pooling.objective().into()]],
        );
        workbook
    }
}

fn without_blank_rows(sheet: &Sheet) -> impl Iterator<Item = (usize, &Vec<Cell>)> {
    sheet
        .iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().all(Cell::is_empty))
}

/// Drops padding cells past `keep`, as left behind by spreadsheet exports.
fn without_trailing_blanks(row: &[Cell], keep: usize) -> &[Cell] {
    let mut end = row.len();
    while end > keep && row[end - 1].is_empty() {
        end -= 1;
    }
    &row[..end]
}

/// Header row `["", label, ...]`, then `[label, v, ...]` per trip.
fn read_benefit_sheet(
    name: &str,
    sheet: &Sheet,
) -> Result<(Vec<String>, Vec<Vec<f64>>), WorkbookError> {
    let mut rows = without_blank_rows(sheet);
    let Some((header_idx, header)) = rows.next() else {
        return Err(WorkbookError::MissingValue(name.to_owned()));
    };

    let labels = without_trailing_blanks(header, 1)
        .iter()
        .enumerate()
        .skip(1)
        .map(|(column, cell)| {
            cell.as_label().ok_or_else(|| WorkbookError::InvalidLabel {
                sheet: name.to_owned(),
                row: header_idx,
                column,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut values = Vec::with_capacity(labels.len());
    for (position, (row_idx, row)) in rows.enumerate() {
        let Some(row_label) = row.first().and_then(Cell::as_label) else {
            return Err(WorkbookError::InvalidLabel {
                sheet: name.to_owned(),
                row: row_idx,
                column: 0,
            });
        };
        match labels.get(position) {
            Some(column_label) if *column_label != row_label => {
                return Err(InputValidationError::LabelMismatch {
                    position,
                    row_label,
                    column_label: column_label.clone(),
                }
                .into());
            }
            _ => {}
        }

        let cells = without_trailing_blanks(row, labels.len() + 1)
            .iter()
            .enumerate()
            .skip(1)
            .map(|(column, cell)| match cell.as_number() {
                Some(value) => Ok(value),
                None if cell.is_empty() && column - 1 == position => Ok(0.0),
                None => Err(WorkbookError::NonNumericCell {
                    sheet: name.to_owned(),
                    row: row_idx,
                    column,
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;
        values.push(cells);
    }

    Ok((labels, values))
}

/// First numeric cell of a sheet; text cells before it act as headers.
fn read_scalar(name: &str, sheet: &Sheet) -> Result<f64, WorkbookError> {
    sheet
        .iter()
        .flatten()
        .find_map(Cell::as_number)
        .ok_or_else(|| WorkbookError::MissingValue(name.to_owned()))
}
