use thiserror::Error;

/// Rejections raised before any model is built.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("Trip set must not be empty")]
    EmptyTripSet,
    #[error("Trip label at position {position} is empty")]
    EmptyLabel { position: usize },
    #[error("Trip '{0}' is listed more than once")]
    DuplicateTrip(String),
    #[error("Benefit matrix must be square (row {row} has {found} columns, expected {expected})")]
    NonSquareMatrix {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Benefit matrix has {rows} rows but {trips} trips are declared")]
    DimensionMismatch { rows: usize, trips: usize },
    #[error(
        "Row label '{row_label}' does not match column label '{column_label}' at position {position}"
    )]
    LabelMismatch {
        position: usize,
        row_label: String,
        column_label: String,
    },
    #[error("Benefit at ({row}, {column}) is not a finite number")]
    NonFiniteBenefit { row: usize, column: usize },
    #[error("Benefit at ({row}, {column}) is negative ({value})")]
    NegativeBenefit { row: usize, column: usize, value: f64 },
    #[error("Trip at position {index} has a non-zero benefit with itself ({value})")]
    SelfBenefit { index: usize, value: f64 },
    #[error("Benefits at ({row}, {column}) and ({column}, {row}) differ ({forward} vs {backward})")]
    AsymmetricBenefit {
        row: usize,
        column: usize,
        forward: f64,
        backward: f64,
    },
    #[error("Threshold must be a finite non-negative number (found {0})")]
    InvalidThreshold(f64),
    #[error("Pool limit must be at least 1 (found {0})")]
    NonPositivePoolLimit(f64),
    #[error("Pool limit must be an integer (found {0})")]
    FractionalPoolLimit(f64),
}
