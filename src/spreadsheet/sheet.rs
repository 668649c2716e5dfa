use crate::error::ResultMessage;
use crate::error::ScheduleSheetError;
use crate::spreadsheet::reference::checked_address;
use crate::spreadsheet::xlsx::XlsxWorkbook;
use crate::spreadsheet::SheetAccess;
use crate::spreadsheet::SpreadsheetError;
use std::fmt;
use std::sync::Arc;

/// Handle to one sheet of a shared [`XlsxWorkbook`].
///
/// Handles answer queries independently; the workbook is closed once every
/// handle created by the same `open` call has been released. Dropping a handle
/// releases it.
pub struct XlsxSheet {
    workbook: Arc<XlsxWorkbook>,
    /// Zero-based index of the sheet in workbook order
    index: usize,
    is_open: bool,
}

impl XlsxSheet {
    pub(crate) fn new(workbook: Arc<XlsxWorkbook>, index: usize) -> Self {
        Self {
            workbook,
            index,
            is_open: true,
        }
    }

    pub fn sheet_index(&self) -> usize {
        self.index
    }

    pub fn sheet_name(&self) -> &str {
        self.workbook.sheet_name(self.index).unwrap_or_default()
    }

    pub fn file_name(&self) -> &str {
        self.workbook.file_name()
    }

    /// Number of sibling handles that must be released before the workbook closes
    pub fn need_to_close(&self) -> usize {
        self.workbook.need_to_close()
    }

    /// Number of sibling handles released so far
    pub fn closed_count(&self) -> usize {
        self.workbook.closed_count()
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// The workbook shared with the sibling handles
    pub fn workbook(&self) -> Arc<XlsxWorkbook> {
        Arc::clone(&self.workbook)
    }

    fn ensure_open(&self) -> Result<(), SpreadsheetError> {
        if self.is_open {
            Ok(())
        } else {
            Err(SpreadsheetError::SheetReleasedError {
                file_name: self.workbook.file_name().to_owned(),
                index: self.index,
            })
        }
    }

    fn read_cell_text(&self, address: &str) -> Result<String, ScheduleSheetError> {
        self.ensure_open()?;
        let cells = self.workbook.sheet_cells(self.index)?;
        match cells.get(address) {
            Some(cell) => Ok(cell.text(
                self.workbook.shared_strings(),
                &self.workbook.options().boolean_labels,
            )?),
            None => Ok(String::new()),
        }
    }

    fn read_fill_equality(&self, first: &str, second: &str) -> Result<bool, ScheduleSheetError> {
        self.ensure_open()?;
        let cells = self.workbook.sheet_cells(self.index)?;
        match (cells.get(first), cells.get(second)) {
            (Some(first), Some(second)) => Ok(self.workbook.fills_equal(first.style, second.style)?),
            _ => Ok(false),
        }
    }
}

impl SheetAccess for XlsxSheet {
    fn cell_text(&self, column: i64, row: i64) -> Result<String, ScheduleSheetError> {
        let address = checked_address(column, row)?;
        self.read_cell_text(&address).with_prefix(|| {
            format!(
                "Read cell {} of sheet {} in '{}' failed",
                address,
                self.index,
                self.file_name()
            )
        })
    }

    fn fill_colors_equal(&self, column1: i64, row1: i64, column2: i64, row2: i64) -> Result<bool, ScheduleSheetError> {
        let first = checked_address(column1, row1)?;
        let second = checked_address(column2, row2)?;
        self.read_fill_equality(&first, &second).with_prefix(|| {
            format!(
                "Compare fills of cells {} and {} of sheet {} in '{}' failed",
                first,
                second,
                self.index,
                self.file_name()
            )
        })
    }

    fn release(&mut self) -> Result<(), ScheduleSheetError> {
        if !self.is_open {
            return Ok(());
        }
        let index = self.index;
        let workbook = &self.workbook;
        workbook
            .release_one()
            .with_prefix(|| format!("Release sheet {} of '{}' failed", index, workbook.file_name()))?;
        self.is_open = false;
        Ok(())
    }
}

impl Drop for XlsxSheet {
    fn drop(&mut self) {
        if let Err(error) = self.release() {
            log::warn!("{}", error);
        }
    }
}

impl fmt::Display for XlsxSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "XlsxSheet {{ file_name = '{}', sheet = {} '{}', need_to_close = {}, closed = {}, is_open = {} }}",
            self.file_name(),
            self.index,
            self.sheet_name(),
            self.need_to_close(),
            self.closed_count(),
            self.is_open
        )
    }
}

impl fmt::Debug for XlsxSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
