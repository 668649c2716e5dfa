//! In-memory sheet for testing code that consumes [`SheetAccess`].

use crate::error::ScheduleSheetError;
use crate::spreadsheet::reference::checked_address;
use crate::spreadsheet::styles::PatternFill;
use crate::spreadsheet::SheetAccess;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashMap;

/// A cell of a [`MemorySheet`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryCell {
    pub text: String,
    /// `None` means no pattern fill, like a gradient filled cell of a workbook
    pub fill: Option<PatternFill>,
}

/// Sheet held entirely in memory, following the same contract as a workbook sheet.
#[derive(Clone, Debug, Default)]
pub struct MemorySheet {
    name: String,
    cells: HashMap<String, MemoryCell>,
    is_released: bool,
    release_count: usize,
}

impl MemorySheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a cell with the default (`none`) pattern fill.
    ///
    /// # Errors
    /// An [`Argument`](crate::ErrorKind::Argument) error if `column` or `row` is below 1.
    pub fn with_cell(self, column: i64, row: i64, text: impl Into<String>) -> Result<Self, ScheduleSheetError> {
        self.with_filled_cell(column, row, text, Some(PatternFill::default()))
    }

    /// Adds a cell with an explicit fill, `None` standing for a fill without pattern.
    pub fn with_filled_cell(
        mut self,
        column: i64,
        row: i64,
        text: impl Into<String>,
        fill: Option<PatternFill>,
    ) -> Result<Self, ScheduleSheetError> {
        let address = checked_address(column, row)?;
        self.cells.insert(address, MemoryCell { text: text.into(), fill });
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// How many times `release` took effect; stays at 1 after repeated calls.
    pub fn release_count(&self) -> usize {
        self.release_count
    }

    fn cell(&self, column: i64, row: i64) -> Result<Option<&MemoryCell>, ScheduleSheetError> {
        let address = checked_address(column, row)?;
        if self.is_released {
            Err(SpreadsheetError::SheetReleasedError {
                file_name: format!("memory:{}", self.name),
                index: 0,
            })?;
        }
        Ok(self.cells.get(&address))
    }
}

impl SheetAccess for MemorySheet {
    fn cell_text(&self, column: i64, row: i64) -> Result<String, ScheduleSheetError> {
        Ok(self
            .cell(column, row)?
            .map(|cell| cell.text.to_owned())
            .unwrap_or_default())
    }

    fn fill_colors_equal(&self, column1: i64, row1: i64, column2: i64, row2: i64) -> Result<bool, ScheduleSheetError> {
        let first = self.cell(column1, row1)?;
        let second = self.cell(column2, row2)?;
        Ok(match first.zip(second) {
            Some((first, second)) => first.fill == second.fill,
            None => false,
        })
    }

    fn release(&mut self) -> Result<(), ScheduleSheetError> {
        if !self.is_released {
            self.is_released = true;
            self.release_count += 1;
        }
        Ok(())
    }
}
