use crate::error::ResultMessage;
use crate::error::ScheduleSheetError;
use crate::helpers::xml::XmlAttributeHelper;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::cell::RawCell;
use crate::spreadsheet::cell::SheetCells;
use crate::spreadsheet::excel;
use crate::spreadsheet::excel::load_relationships;
use crate::spreadsheet::excel::Package;
use crate::spreadsheet::options::AccessorOptions;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::reference::reference_to_index;
use crate::spreadsheet::sheet::XlsxSheet;
use crate::spreadsheet::styles::StyleTable;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

// XML tag names for parsing Excel XLSX format
const TAG_SHARED_STRING_ITEM: &[u8] = b"si"; // Shared string table item
const TAG_SHEET: &[u8] = b"sheet"; // Worksheet definition
const TAG_ROW: &[u8] = b"row"; // Row in worksheet
const TAG_CELL: &[u8] = b"c"; // Cell in worksheet
const TAG_INLINE_STRING: &[u8] = b"is"; // Inline string value
const TAG_VALUE: &[u8] = b"v"; // Cell value content

const WORKBOOK_PATH: &str = "xl/workbook.xml";
const WORKBOOK_RELATIONSHIPS_PATH: &str = "xl/_rels/workbook.xml.rels";
const SHARED_STRINGS_PATH: &str = "xl/sharedStrings.xml";

/// Archive and parsed sheets; `zip` is `None` once the workbook is closed
struct PackageState {
    zip: Option<Package>,
    cells: Vec<Option<Arc<SheetCells>>>,
}

/// Release bookkeeping shared by all sheet handles of one workbook
#[derive(Debug)]
struct CloseState {
    closed: usize,
    need_to_close: usize,
}

/// An opened xlsx workbook shared by the handles of all its sheets.
///
/// Exactly one instance exists per [`XlsxWorkbook::open`] call. The package is
/// released when the last of its sheet handles is released.
pub struct XlsxWorkbook {
    /// File name of the spreadsheet
    file_name: String,
    options: AccessorOptions,
    /// Worksheets in workbook order as (name, zip_path) pairs
    sheets: Vec<(String, String)>,
    /// `None` when the package has no shared string part
    shared_strings: Option<Vec<String>>,
    styles: StyleTable,
    package: Mutex<PackageState>,
    close_state: Mutex<CloseState>,
}

impl XlsxWorkbook {
    /// Opens a workbook with default options and returns one handle per sheet.
    ///
    /// # Errors
    /// An [`Io`](crate::ErrorKind::Io) error if the file cannot be accessed and a
    /// [`Format`](crate::ErrorKind::Format) error if it is not an xlsx package.
    pub fn open(file_name: impl AsRef<Path>) -> Result<Vec<XlsxSheet>, ScheduleSheetError> {
        Self::open_with(file_name, AccessorOptions::default())
    }

    /// Opens a workbook and returns one handle per sheet, all sharing this workbook.
    pub fn open_with(file_name: impl AsRef<Path>, options: AccessorOptions) -> Result<Vec<XlsxSheet>, ScheduleSheetError> {
        let path = file_name.as_ref();
        let workbook = Self::load(path, options)
            .with_prefix(|| format!("Open spreadsheet '{}' failed", path.display()))?;
        Ok(workbook.into_sheets())
    }

    fn load(path: &Path, options: AccessorOptions) -> Result<XlsxWorkbook, ScheduleSheetError> {
        let mut zip = excel::open(path)?;
        let sheets = load_workbook(&mut zip)?;
        let shared_strings = load_shared_strings(&mut zip)?;
        let styles = StyleTable::load(&mut zip)?;
        log::debug!(
            "Opened '{}': {} sheets, {} shared strings",
            path.display(),
            sheets.len(),
            shared_strings.as_ref().map(Vec::len).unwrap_or(0),
        );

        let sheet_count = sheets.len();
        Ok(XlsxWorkbook {
            file_name: path.display().to_string(),
            options,
            sheets,
            shared_strings,
            styles,
            package: Mutex::new(PackageState {
                zip: Some(zip),
                cells: vec![None; sheet_count],
            }),
            close_state: Mutex::new(CloseState {
                closed: 0,
                need_to_close: sheet_count,
            }),
        })
    }

    fn into_sheets(self) -> Vec<XlsxSheet> {
        let sheet_count = self.sheets.len();
        let workbook = Arc::new(self);
        if sheet_count == 0 {
            // No handle will ever release an empty workbook
            workbook.close_package();
        }
        (0..sheet_count)
            .map(|index| XlsxSheet::new(Arc::clone(&workbook), index))
            .collect()
    }

    /// File name the workbook was opened from
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub(crate) fn sheet_name(&self, index: usize) -> Option<&str> {
        self.sheets.get(index).map(|(name, _)| name.as_str())
    }

    pub(crate) fn options(&self) -> &AccessorOptions {
        &self.options
    }

    pub(crate) fn shared_strings(&self) -> Option<&[String]> {
        self.shared_strings.as_deref()
    }

    pub(crate) fn fills_equal(&self, first_style: usize, second_style: usize) -> Result<bool, SpreadsheetError> {
        self.styles.fills_equal(first_style, second_style)
    }

    /// Number of sheet handles that must be released before the package closes
    pub fn need_to_close(&self) -> usize {
        self.lock_close_state().map(|state| state.need_to_close).unwrap_or(0)
    }

    /// Number of sheet handles released so far
    pub fn closed_count(&self) -> usize {
        self.lock_close_state().map(|state| state.closed).unwrap_or(0)
    }

    /// Whether the underlying package has been released
    pub fn is_closed(&self) -> bool {
        self.lock_package().map(|state| state.zip.is_none()).unwrap_or(true)
    }

    /// Returns the cells of a sheet, parsing the worksheet part on first use.
    pub(crate) fn sheet_cells(&self, index: usize) -> Result<Arc<SheetCells>, ScheduleSheetError> {
        let (_, path) = self
            .sheets
            .get(index)
            .ok_or(SpreadsheetError::SheetIndexError(index))?;
        let mut state = self.lock_package()?;
        let PackageState { zip, cells } = &mut *state;
        let zip = zip
            .as_mut()
            .ok_or_else(|| SpreadsheetError::WorkbookClosedError(self.file_name.to_owned()))?;
        if let Some(Some(loaded)) = cells.get(index) {
            return Ok(Arc::clone(loaded));
        }

        let loaded = Arc::new(load_sheet_cells(zip, path)?);
        log::debug!("Loaded {} cells of sheet {} '{}'", loaded.len(), index, path);
        cells[index] = Some(Arc::clone(&loaded));
        Ok(loaded)
    }

    /// Counts one released handle and closes the package after the last one.
    ///
    /// The counter update and the close decision happen under the close lock
    /// of this workbook.
    pub(crate) fn release_one(&self) -> Result<(), ScheduleSheetError> {
        let mut state = self.lock_close_state()?;
        if state.closed < state.need_to_close {
            state.closed += 1;
            if state.closed == state.need_to_close {
                self.close_package();
                log::debug!("Closed '{}' after releasing {} sheets", self.file_name, state.closed);
            }
        }
        Ok(())
    }

    fn close_package(&self) {
        let mut state = match self.package.lock() {
            Ok(state) => state,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.zip = None;
        state.cells.clear();
    }

    #[cfg(test)]
    pub(crate) fn poison_close_state(&self) {
        std::thread::scope(|scope| {
            let holder = scope.spawn(|| {
                let _state = self.close_state.lock();
                panic!("close state poisoned on purpose");
            });
            assert!(holder.join().is_err());
        });
    }

    #[cfg(test)]
    pub(crate) fn clear_close_state_poison(&self) {
        self.close_state.clear_poison();
    }

    fn lock_package(&self) -> Result<MutexGuard<'_, PackageState>, SpreadsheetError> {
        self.package
            .lock()
            .map_err(|_| SpreadsheetError::PoisonedLockError(self.file_name.to_owned()))
    }

    fn lock_close_state(&self) -> Result<MutexGuard<'_, CloseState>, SpreadsheetError> {
        self.close_state
            .lock()
            .map_err(|_| SpreadsheetError::PoisonedLockError(self.file_name.to_owned()))
    }
}

/// Loads worksheet names and part paths from the workbook part, in workbook order
fn load_workbook(zip: &mut Package) -> Result<Vec<(String, String)>, ScheduleSheetError> {
    let relationships = load_relationships(zip, WORKBOOK_RELATIONSHIPS_PATH)?;
    let mut reader = zip
        .xml_reader(WORKBOOK_PATH)?
        .ok_or_else(|| SpreadsheetError::FileError(WORKBOOK_PATH.to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.get_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.get_value()?);
                }
            }
            let name = name.unwrap_or_default().into_owned();
            let id = id.unwrap_or_default();
            match relationships.get(id.as_ref()) {
                Some(path) => sheets.push((name, path.to_owned())),
                None => Err(SpreadsheetError::SheetRelationshipError(name, id.into_owned()))?,
            }
        }
    });
    Ok(sheets)
}

/// Loads the whole shared string table, `None` when the part is absent
fn load_shared_strings(zip: &mut Package) -> Result<Option<Vec<String>>, ScheduleSheetError> {
    let mut reader = match zip.xml_reader(SHARED_STRINGS_PATH)? {
        Some(reader) => reader,
        None => return Ok(None),
    };

    let mut shared_strings = Vec::<String>::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_SHARED_STRING_ITEM => {
            shared_strings.push(reader.read_text(TAG_SHARED_STRING_ITEM, false)?);
        }
    });
    Ok(Some(shared_strings))
}

/// Parses every cell of a worksheet part, including cells that only carry a style
fn load_sheet_cells(zip: &mut Package, path: &str) -> Result<SheetCells, ScheduleSheetError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut cells = SheetCells::new();
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut current = None::<(String, RawCell)>;
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_ROW => {
            if let Some(row) = event.parse_attribute_value::<usize>("r")?.filter(|row| *row > 0) {
                row_count = row - 1;
            }
            col_count = 0;
        }
        Event::End(event) if event.local_name().as_ref() == TAG_ROW => {
            row_count += 1;
            col_count = 0;
        }
        Event::Start(event) if event.local_name().as_ref() == TAG_CELL => {
            let (row, col) = event.get_attribute_value("r")?
                .and_then(|reference| reference_to_index(&reference))
                .unwrap_or((row_count, col_count));
            col_count = col + 1;
            let kind = event.get_attribute_value("t")?
                .map(|t| CellType::from_type_attribute(&t))
                .unwrap_or_default();
            let style = event.parse_attribute_value::<usize>("s")?.unwrap_or(0);
            current = Some((index_to_reference(row, col), RawCell { kind, style, value: String::new() }));
        }
        Event::Start(event) if current.is_some() && event.local_name().as_ref() == TAG_INLINE_STRING => {
            let value = reader.read_text(TAG_INLINE_STRING, false)?;
            if let Some((_, cell)) = current.as_mut() {
                cell.value = value;
            }
        }
        Event::Start(event) if current.is_some() && event.local_name().as_ref() == TAG_VALUE => {
            let value = reader.read_text(TAG_VALUE, true)?;
            if let Some((_, cell)) = current.as_mut() {
                cell.value = value;
            }
        }
        Event::End(event) if event.local_name().as_ref() == TAG_CELL => {
            if let Some((reference, cell)) = current.take() {
                cells.insert(reference, cell);
            }
        }
    });
    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::spreadsheet::fixture::worksheet;
    use crate::spreadsheet::fixture::XlsxFixture;
    use crate::spreadsheet::open_sheets;
    use std::io::Cursor;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_bytes(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(bytes).unwrap();
        file
    }

    #[test]
    fn test_open_missing_file() {
        let directory = tempfile::tempdir().unwrap();
        let error = XlsxWorkbook::open(directory.path().join("missing.xlsx")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Io);
        assert!(error.to_string().contains("missing.xlsx"), "{error}");
    }

    #[test]
    fn test_open_not_a_package() {
        let file = write_bytes(b"Day;Time;Subject\nMonday;9:00;Math\n");
        assert_eq!(XlsxWorkbook::open(file.path()).unwrap_err().kind(), ErrorKind::Format);
    }

    #[test]
    fn test_open_compound_file() {
        let mut bytes = vec![0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];
        bytes.resize(512, 0);
        let file = write_bytes(&bytes);
        let error = XlsxWorkbook::open(file.path()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
        assert!(error.to_string().contains("compound file"), "{error}");
    }

    #[test]
    fn test_open_zip_without_workbook() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(b"<document/>").unwrap();
        let file = write_bytes(&zip.finish().unwrap().into_inner());
        let error = XlsxWorkbook::open(file.path()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Format);
        assert!(error.to_string().contains("xl/_rels/workbook.xml.rels"), "{error}");
    }

    #[test]
    fn test_open_empty_workbook_closes_immediately() {
        let file = XlsxFixture::new().write();
        assert!(XlsxWorkbook::open(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_sheets_load_lazily_and_are_cached() {
        let file = XlsxFixture::new()
            .sheet("Sheet1", worksheet(r#"<row r="1"><c r="A1"><v>1</v></c></row>"#))
            .sheet("Sheet2", worksheet(r#"<row r="1"><c r="A1"><v>2</v></c></row>"#))
            .write();
        let sheets = XlsxWorkbook::open(file.path()).unwrap();
        let workbook = sheets[0].workbook();
        let first = workbook.sheet_cells(0).unwrap();
        assert!(Arc::ptr_eq(&first, &workbook.sheet_cells(0).unwrap()));
        assert_eq!(workbook.sheet_cells(1).unwrap()["A1"].value, "2");
        assert!(matches!(
            workbook.sheet_cells(2).unwrap_err(),
            ScheduleSheetError::SpreadsheetError(SpreadsheetError::SheetIndexError(2))
        ));
    }

    #[test]
    fn test_open_sheets_as_trait_objects() {
        let file = XlsxFixture::new()
            .sheet("Sheet1", worksheet(r#"<row r="2"><c r="C2" t="inlineStr"><is><t>Лекция</t></is></c></row>"#))
            .write();
        let mut sheets = open_sheets(file.path()).unwrap();
        assert_eq!(sheets[0].cell_text(3, 2).unwrap(), "Лекция");
        sheets[0].release().unwrap();

        let Err(error) = open_sheets(file.path().with_extension("missing")) else {
            panic!("opening a missing file succeeded");
        };
        assert!(error.to_string().starts_with("Failed to load schedule sheets"), "{error}");
    }
}
