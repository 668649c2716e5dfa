//! # Schedule Sheet
//!
//! Read-only access to schedule spreadsheets for a timetable to calendar
//! converter.
//!
//! ## Features
//!
//! - **Sheet handles**: every sheet of an xlsx workbook is opened as its own
//!   handle; all handles of one workbook share a single package that is closed
//!   after the last handle is released
//! - **Cell text**: text of a cell by 1-based column and row, with shared and
//!   inline strings resolved and booleans rendered through configurable labels
//! - **Fill comparison**: whether two cells carry the same background pattern fill
//! - **Date arithmetic**: whole-day shifts of zoned timestamps that refuse to
//!   guess inside daylight-saving gaps and overlaps
//! - **Time zone labels**: every zone of the tz database with its offset, sorted
//!   by offset
//!
//! ## Example
//!
//! ```no_run
//! use schedule_sheet::SheetAccess;
//!
//! let mut sheets = schedule_sheet::open("timetable.xlsx")?;
//! for sheet in sheets.iter_mut() {
//!     println!("{}: {}", sheet.sheet_name(), sheet.cell_text(1, 1)?);
//!     sheet.release()?;
//! }
//! # Ok::<(), schedule_sheet::ScheduleSheetError>(())
//! ```
pub mod date;
pub mod error;
mod helpers;
pub mod spreadsheet;

pub use date::add_days;
pub use date::time_zone_list;
pub use date::DateError;
pub use date::OffsetBase;
pub use error::ErrorKind;
pub use error::ScheduleSheetError;
pub use spreadsheet::open;
pub use spreadsheet::open_sheets;
pub use spreadsheet::AccessorOptions;
pub use spreadsheet::BooleanLabels;
pub use spreadsheet::MemorySheet;
pub use spreadsheet::SheetAccess;
pub use spreadsheet::SpreadsheetError;
pub use spreadsheet::XlsxSheet;
pub use spreadsheet::XlsxWorkbook;
