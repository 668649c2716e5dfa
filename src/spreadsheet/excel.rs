//! Microsoft Office Excel package helpers
use crate::error::ScheduleSheetError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::Event;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;
use std::path::Path;
use zip::ZipArchive;

/// XML tag name for relationship elements in Excel files
const TAG_RELATIONSHIP: &[u8] = b"Relationship";

/// Signature of an OLE compound file: legacy `.xls` or a password protected package
const CFB_SIGNATURE: [u8; 8] = [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1];

/// Read-only zip package backing an opened workbook
pub(crate) type Package = ZipArchive<BufReader<File>>;

/// Opens an xlsx package read-only.
///
/// # Arguments
/// * `path` - Path to the Excel file
///
/// # Returns
/// The zip archive of the package
///
/// # Errors
/// I/O errors if the file cannot be read; a format error for compound files
/// and for anything that is not a zip archive.
pub(super) fn open(path: &Path) -> Result<Package, ScheduleSheetError> {
    let mut reader = BufReader::new(File::open(path)?);

    if is_compound_file(&mut reader)? {
        Err(SpreadsheetError::SpreadsheetCompoundFileError(path.display().to_string()))?;
    }

    Ok(ZipArchive::new(reader)?)
}

/// Loads the targets of the relationships of a package part
///
/// # Arguments
/// * `zip` - Zip archive handle
/// * `path` - Path to the relationships XML file within the archive
///
/// # Returns
/// Mapping of relationship IDs to part paths inside the archive
pub(super) fn load_relationships<RS: Read + Seek>(
    zip: &mut ZipArchive<RS>,
    path: &str,
) -> Result<HashMap<String, String>, ScheduleSheetError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| SpreadsheetError::FileError(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let target = event.get_attribute_value("Target")?;
            let is_external = event.get_attribute_value("TargetMode")?
                .map(|mode| mode == "External")
                .unwrap_or(false);
            if let Some((id, target)) = id.zip(target).filter(|_| !is_external) {
                relationships.insert(id.to_string(), to_zip_path(target));
            }
        }
    });
    Ok(relationships)
}

/// Normalizes a relationship target to a path inside the Excel zip archive
///
/// # Arguments
/// * `path` - Target as written in the relationship part
///
/// # Returns
/// Path relative to the archive root
pub(crate) fn to_zip_path(path: Cow<'_, str>) -> String {
    let path = path.replace('\\', "/");
    if let Some(absolute) = path.strip_prefix('/') {
        absolute.to_string()
    } else if path.starts_with("xl/") {
        path
    } else {
        format!("xl/{path}")
    }
}

/// Checks for the OLE compound file signature and rewinds the reader
fn is_compound_file<R: Read + Seek>(reader: &mut R) -> Result<bool, ScheduleSheetError> {
    let mut signature = [0u8; 8];
    let mut read = 0usize;
    while read < signature.len() {
        match reader.read(&mut signature[read..])? {
            0 => break,
            n => read += n,
        }
    }
    reader.seek(SeekFrom::Start(0))?;
    Ok(read == signature.len() && signature == CFB_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_to_zip_path() {
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("/xl/worksheets/sheet2.xml")), "xl/worksheets/sheet2.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("xl/worksheets/sheet3.xml")), "xl/worksheets/sheet3.xml");
        assert_eq!(to_zip_path(Cow::Borrowed("worksheets\\sheet4.xml")), "xl/worksheets/sheet4.xml");
    }

    #[test]
    fn test_is_compound_file() {
        let mut compound = Cursor::new([CFB_SIGNATURE.as_slice(), &[0u8; 16]].concat());
        assert!(is_compound_file(&mut compound).unwrap());
        assert_eq!(compound.position(), 0);

        let mut zip = Cursor::new(b"PK\x03\x04rest of archive".to_vec());
        assert!(!is_compound_file(&mut zip).unwrap());

        let mut short = Cursor::new(vec![0xD0, 0xCF]);
        assert!(!is_compound_file(&mut short).unwrap());
    }
}
