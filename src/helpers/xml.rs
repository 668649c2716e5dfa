//! XML reading utilities for SpreadsheetML parts
//! Wraps quick-xml with a reusable buffer and adds attribute and text helpers

use crate::error::ScheduleSheetError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use std::str::FromStr;
use thiserror::Error;

/// Phonetic run inside a rich string, never part of the displayed text
const TAG_PHONETIC_TEXT: &[u8] = b"rPh";
/// Text run inside a rich string
const TAG_TEXT: &[u8] = b"t";

#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),

    #[error("Parse attribute value '{0}' failed")]
    ParseAttributeValueError(String),
}

/// XML reader wrapper configured for spreadsheet parts
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a reader that reports `<a/>` as a start and an end event
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, `None` at end of input
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, ScheduleSheetError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(ScheduleSheetError::XmlError(error)),
        }
    }

    /// Collects the text of the current element up to its `end_tag`.
    ///
    /// With `is_text_content` the element holds text directly (`<v>`);
    /// otherwise only `<t>` runs count and phonetic runs are skipped
    /// (`<si>`, `<is>`).
    pub(crate) fn read_text(&mut self, end_tag: &[u8], is_text_content: bool) -> Result<String, ScheduleSheetError> {
        let mut is_phonetic_text = false;
        let mut is_text = is_text_content;
        let mut text = String::new();
        match_xml_events!(self => {
            Event::End(event) if event.local_name().as_ref() == end_tag => break,
            Event::Start(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => is_phonetic_text = true,
            Event::End(event) if event.local_name().as_ref() == TAG_PHONETIC_TEXT => is_phonetic_text = false,
            Event::Start(event) if !is_phonetic_text && event.local_name().as_ref() == TAG_TEXT => is_text = true,
            Event::End(event) if is_text && event.local_name().as_ref() == TAG_TEXT => is_text = false,
            Event::Text(event) if is_text => text.push_str(&event.xml_content()?),
            Event::CData(event) if is_text => text.push_str(&event.xml_content()?),
            Event::GeneralRef(event) if is_text => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }
}

/// Helper trait for XML attributes providing value extraction and parsing
pub(crate) trait XmlAttributeHelper<'a> {
    /// Gets the unescaped attribute value as a string
    fn get_value(&self) -> Result<Cow<'a, str>, ScheduleSheetError>;

    /// Parses the attribute value to the specified type
    fn parse_value<T: FromStr>(&self) -> Result<T, ScheduleSheetError>;
}

impl<'a> XmlAttributeHelper<'a> for Attribute<'a> {
    fn get_value(&self) -> Result<Cow<'a, str>, ScheduleSheetError> {
        Ok(self.unescape_value()?)
    }

    fn parse_value<T: FromStr>(&self) -> Result<T, ScheduleSheetError> {
        let value = self.get_value()?;
        value
            .trim()
            .parse()
            .map_err(|_| XmlError::ParseAttributeValueError(value.to_string()).into())
    }
}

/// Helper trait for XML nodes providing attribute access by name
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an attribute value by name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ScheduleSheetError>;

    /// Parses an attribute value, treating an empty value as absent
    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, ScheduleSheetError>;

    /// Reads a boolean attribute written as `1`/`true` or `0`/`false`
    fn parse_flag_attribute(&self, name: &str) -> Result<bool, ScheduleSheetError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, ScheduleSheetError> {
        self.try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()
    }

    fn parse_attribute_value<T: FromStr>(&self, name: &str) -> Result<Option<T>, ScheduleSheetError> {
        match self.try_get_attribute(name)? {
            Some(attribute) if !attribute.value.is_empty() => attribute.parse_value().map(Some),
            _ => Ok(None),
        }
    }

    fn parse_flag_attribute(&self, name: &str) -> Result<bool, ScheduleSheetError> {
        Ok(self
            .try_get_attribute(name)?
            .map(|attribute| attribute.get_value())
            .transpose()?
            .map(|value| value == "1" || value == "true")
            .unwrap_or(false))
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends the text behind an entity or character reference
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ScheduleSheetError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), ScheduleSheetError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = if let Some(hex) = number.strip_prefix('x') {
                u32::from_str_radix(hex, 16)?
            } else {
                number.parse::<u32>()?
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }

        Ok(())
    }
}
