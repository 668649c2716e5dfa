//! # Spreadsheet Access Module
//!
//! Read-only access to the sheets of an xlsx workbook: the text of a cell
//! addressed by 1-based column and row, and whether two cells share the same
//! background fill. Every sheet gets its own handle; the handles of one
//! workbook share a single opened package that is closed after the last
//! handle is released.
use crate::error::ErrorKind;
use crate::error::ScheduleSheetError;
use anyhow::Context;
use std::path::Path;
use thiserror::Error;

mod cell;
mod excel;
pub mod memory;
pub mod options;
pub mod reference;
mod sheet;
pub mod styles;
mod xlsx;

#[cfg(test)]
pub(crate) mod fixture;

pub use memory::MemoryCell;
pub use memory::MemorySheet;
pub use options::AccessorOptions;
pub use options::BooleanLabels;
pub use sheet::XlsxSheet;
pub use styles::Color;
pub use styles::PatternFill;
pub use xlsx::XlsxWorkbook;

/// Custom error types for spreadsheet operations.
///
/// Each variant maps to one [`ErrorKind`], see [`SpreadsheetError::kind`].
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    /// A required part of the package is missing
    #[error("Missing part '{0}' in spreadsheet package")]
    FileError(String),

    /// OLE compound file: a legacy `.xls` workbook or a password protected package
    #[error("Spreadsheet '{0}' is a compound file (legacy xls or password protected), not an xlsx package")]
    SpreadsheetCompoundFileError(String),

    /// A `<sheet>` of the workbook part has no matching relationship
    #[error("Sheet '{0}' refers to unknown relationship '{1}'")]
    SheetRelationshipError(String, String),

    /// Column or row below 1
    #[error("Column and row must be greater than 0, got column {column} and row {row}")]
    ArgumentError { column: i64, row: i64 },

    /// The package has already been released by all sheet handles
    #[error("Workbook '{0}' is already closed")]
    WorkbookClosedError(String),

    /// The queried handle has already been released
    #[error("Sheet {index} of '{file_name}' is already released")]
    SheetReleasedError { file_name: String, index: usize },

    /// A lock of the workbook was poisoned by a panicking thread
    #[error("Lock of workbook '{0}' is poisoned")]
    PoisonedLockError(String),

    /// Sheet index outside of the workbook
    #[error("Sheet index {0} is out of range")]
    SheetIndexError(usize),

    /// A cell refers to the shared string table but the package has none
    #[error("Shared string table is missing")]
    SharedStringTableMissingError,

    /// A shared string cell value is not an index
    #[error("Invalid shared string reference '{0}'")]
    SharedStringReferenceError(String),

    /// A shared string index beyond the table
    #[error("Shared string index {0} is out of range")]
    SharedStringIndexError(usize),

    /// A cell style beyond `cellXfs`
    #[error("Cell format index {0} is out of range")]
    CellFormatIndexError(usize),

    /// A `fillId` beyond `fills`
    #[error("Fill id {0} is out of range")]
    FillIndexError(usize),
}

impl SpreadsheetError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SpreadsheetError::ArgumentError { .. } => ErrorKind::Argument,
            SpreadsheetError::WorkbookClosedError(_)
            | SpreadsheetError::SheetReleasedError { .. }
            | SpreadsheetError::PoisonedLockError(_) => ErrorKind::Io,
            _ => ErrorKind::Format,
        }
    }
}

/// Read access to one sheet, as needed by schedule detection.
///
/// Implemented by [`XlsxSheet`] for real workbooks and by [`MemorySheet`] for
/// tests of code that consumes sheets.
pub trait SheetAccess {
    /// Text of the cell at a 1-based column and row, empty when there is no cell.
    fn cell_text(&self, column: i64, row: i64) -> Result<String, ScheduleSheetError>;

    /// Whether two cells have the same background fill; `false` if either cell is missing.
    fn fill_colors_equal(&self, column1: i64, row1: i64, column2: i64, row2: i64) -> Result<bool, ScheduleSheetError>;

    /// Releases the sheet. Calling it again has no effect.
    fn release(&mut self) -> Result<(), ScheduleSheetError>;
}

/// Opens every sheet of a workbook with default options.
pub fn open(file_name: impl AsRef<Path>) -> Result<Vec<XlsxSheet>, ScheduleSheetError> {
    XlsxWorkbook::open(file_name)
}

/// Opens every sheet of a workbook as boxed [`SheetAccess`] objects.
pub fn open_sheets(file_name: impl AsRef<Path>) -> anyhow::Result<Vec<Box<dyn SheetAccess + Send + Sync>>> {
    let path = file_name.as_ref();
    let sheets = XlsxWorkbook::open(path)
        .with_context(|| format!("Failed to load schedule sheets from '{}'", path.display()))?;
    Ok(sheets
        .into_iter()
        .map(|sheet| Box::new(sheet) as Box<dyn SheetAccess + Send + Sync>)
        .collect())
}
