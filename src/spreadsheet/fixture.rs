//! Builds small xlsx packages on disk for tests.

use std::io::Cursor;
use std::io::Write;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

pub(crate) const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fills count="4">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
    <fill><patternFill patternType="solid"><fgColor rgb="FF00B050"/><bgColor indexed="64"/></patternFill></fill>
  </fills>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0" fillId="0" xfId="0"/>
    <xf numFmtId="0" fontId="0" fillId="2" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="1" fillId="2" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="3" xfId="0" applyFill="1"/>
    <xf numFmtId="0" fontId="0" fillId="7" xfId="0" applyFill="1"/>
  </cellXfs>
</styleSheet>"#;

/// Wraps `<row>` elements into a worksheet part.
pub(crate) fn worksheet(rows: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>{rows}</sheetData></worksheet>"#
    )
}

/// Builds a shared string part from plain strings.
pub(crate) fn shared_strings(strings: &[&str]) -> String {
    let items: String = strings
        .iter()
        .map(|string| format!("<si><t>{string}</t></si>"))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{items}</sst>"#,
        strings.len()
    )
}

#[derive(Default)]
pub(crate) struct XlsxFixture {
    sheets: Vec<(String, String)>,
    shared_strings: Option<String>,
    styles: Option<String>,
}

impl XlsxFixture {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn sheet(mut self, name: &str, xml: impl Into<String>) -> Self {
        self.sheets.push((name.to_owned(), xml.into()));
        self
    }

    pub(crate) fn shared_strings(mut self, xml: impl Into<String>) -> Self {
        self.shared_strings = Some(xml.into());
        self
    }

    pub(crate) fn styles(mut self, xml: impl Into<String>) -> Self {
        self.styles = Some(xml.into());
        self
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut sheet_entries = String::new();
        let mut relationships = String::new();
        for (index, (name, xml)) in self.sheets.iter().enumerate() {
            let number = index + 1;
            sheet_entries.push_str(&format!(r#"<sheet name="{name}" sheetId="{number}" r:id="rId{number}"/>"#));
            relationships.push_str(&format!(
                r#"<Relationship Id="rId{number}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{number}.xml"/>"#
            ));
            zip.start_file(format!("xl/worksheets/sheet{number}.xml"), options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        relationships.push_str(
            r#"<Relationship Id="rIdStyles" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        );

        zip.start_file("xl/workbook.xml", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
            )
            .as_bytes(),
        )
        .unwrap();

        zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
        zip.write_all(
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
            )
            .as_bytes(),
        )
        .unwrap();

        if let Some(xml) = &self.shared_strings {
            zip.start_file("xl/sharedStrings.xml", options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }
        if let Some(xml) = &self.styles {
            zip.start_file("xl/styles.xml", options).unwrap();
            zip.write_all(xml.as_bytes()).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    /// Writes the package to a temporary `.xlsx` file.
    pub(crate) fn write(&self) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".xlsx").tempfile().unwrap();
        file.write_all(&self.to_bytes()).unwrap();
        file.flush().unwrap();
        file
    }
}
