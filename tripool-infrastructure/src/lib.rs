#![warn(clippy::uninlined_format_args)]

pub mod solver;
pub mod workbook;

pub use solver::{GoodLpAttempt, GoodLpSolver};
pub use workbook::{Cell, Sheet, SheetNames, Workbook, WorkbookError};
