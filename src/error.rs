use thiserror::Error;
use zip::result::ZipError;

/// Coarse classification of every failure the crate can report.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// File access failed, or the workbook/handle is no longer open
    Io,
    /// Unrecognized or corrupt spreadsheet package
    Format,
    /// Caller passed a column or row below 1 (or a date out of range)
    Argument,
    /// Local date-time falls into a daylight-saving gap
    SkippedTime,
    /// Local date-time occurs twice because of a daylight-saving overlap
    AmbiguousTime,
}

/// Main error type for the Schedule Sheet crate.
/// Aggregates errors from the standard library, dependencies, and internal modules.
#[derive(Error, Debug)]
pub enum ScheduleSheetError {
    #[error("{message}: {source}")]
    WithContextError {
        message: String,
        source: Box<ScheduleSheetError>,
    },

    // Standard library errors
    #[error("{0}")]
    IoError(#[from] std::io::Error),

    #[error("{0}")]
    ParseIntError(#[from] std::num::ParseIntError),

    // Third-party library errors
    #[error("{0}")]
    ZipError(#[from] ZipError),

    #[error("{0}")]
    XmlError(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncodingError(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttributeError(#[from] quick_xml::events::attributes::AttrError),

    // Helper module errors
    #[error("{0}")]
    XmlHelperError(#[from] crate::helpers::xml::XmlError),

    // Domain module errors
    #[error("{0}")]
    SpreadsheetError(#[from] crate::spreadsheet::SpreadsheetError),

    #[error("{0}")]
    DateError(#[from] crate::date::DateError),
}

impl ScheduleSheetError {
    /// Classifies the error, looking through any context added on the way up.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ScheduleSheetError::WithContextError { source, .. } => source.kind(),
            ScheduleSheetError::IoError(_) => ErrorKind::Io,
            ScheduleSheetError::ZipError(ZipError::Io(_)) => ErrorKind::Io,
            ScheduleSheetError::SpreadsheetError(error) => error.kind(),
            ScheduleSheetError::DateError(error) => error.kind(),
            _ => ErrorKind::Format,
        }
    }
}

pub(crate) trait ResultMessage {
    /// Prefixes the error with a lazily built message, keeping its kind.
    fn with_prefix<F>(self, message: F) -> Self
    where
        F: FnOnce() -> String;
}

impl<T> ResultMessage for Result<T, ScheduleSheetError> {
    fn with_prefix<F>(self, message: F) -> Self
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ScheduleSheetError::WithContextError {
            message: message(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::SpreadsheetError;

    #[test]
    fn test_kind_survives_context() {
        let result: Result<(), ScheduleSheetError> =
            Err(SpreadsheetError::ArgumentError { column: 0, row: 1 }.into());
        let error = result
            .with_prefix(|| "Read cell of sheet 0 in 'a.xlsx' failed".to_owned())
            .unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Argument);
        assert!(error.to_string().starts_with("Read cell of sheet 0 in 'a.xlsx' failed: "));
    }

    #[test]
    fn test_zip_io_is_io_kind() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated");
        assert_eq!(ScheduleSheetError::from(ZipError::Io(io)).kind(), ErrorKind::Io);
        assert_eq!(
            ScheduleSheetError::from(ZipError::InvalidArchive("bad".into())).kind(),
            ErrorKind::Format
        );
    }
}
