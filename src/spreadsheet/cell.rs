use crate::spreadsheet::options::BooleanLabels;
use crate::spreadsheet::SpreadsheetError;
use std::collections::HashMap;

/// Types of cell data, taken from the `t` attribute of a worksheet cell.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) enum CellType {
    /// Numeric value, also the default when `t` is missing
    #[default]
    Number,
    /// Boolean stored as `0`/`1`
    Boolean,
    /// ISO 8601 date/time string
    IsoDateTime,
    /// Inline rich string (`<is>`)
    InlineString,
    /// Formula result string
    FormulaString,
    /// Shared string table reference
    SharedString,
    /// Error value such as `#N/A`
    Error,
}

impl CellType {
    /// Maps the value of the `t` attribute to a cell type.
    pub(crate) fn from_type_attribute(value: &str) -> Self {
        match value {
            "s" => CellType::SharedString,
            "inlineStr" => CellType::InlineString,
            "str" => CellType::FormulaString,
            "b" => CellType::Boolean,
            "d" => CellType::IsoDateTime,
            "e" => CellType::Error,
            _ => CellType::Number,
        }
    }
}

/// A cell as stored in the worksheet part, before any indirection is resolved.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct RawCell {
    /// Cell data type
    pub(crate) kind: CellType,
    /// Index into `cellXfs` (the `s` attribute, 0 when missing)
    pub(crate) style: usize,
    /// Literal content of `<v>` or the text of `<is>`
    pub(crate) value: String,
}

impl RawCell {
    /// Resolves the displayed text of the cell.
    pub(crate) fn text(&self, shared_strings: Option<&[String]>, labels: &BooleanLabels) -> Result<String, SpreadsheetError> {
        if self.value.is_empty() {
            return Ok(String::new());
        }
        match self.kind {
            CellType::SharedString => {
                let table = shared_strings.ok_or(SpreadsheetError::SharedStringTableMissingError)?;
                let index = self
                    .value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| SpreadsheetError::SharedStringReferenceError(self.value.to_owned()))?;
                table
                    .get(index)
                    .cloned()
                    .ok_or(SpreadsheetError::SharedStringIndexError(index))
            }
            CellType::Boolean => Ok(labels.label(self.value.trim()).to_owned()),
            _ => Ok(self.value.to_owned()),
        }
    }
}

/// Cells of one worksheet keyed by their A1 reference.
pub(crate) type SheetCells = HashMap<String, RawCell>;
