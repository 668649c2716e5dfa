//! Fill resolution through the workbook style table.
//!
//! A cell refers to `cellXfs/xf[s]`, the format refers to `fills/fill[fillId]`,
//! and the fill carries the `patternFill` that paints the cell background.

use crate::error::ScheduleSheetError;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::spreadsheet::SpreadsheetError;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use std::io::Read;
use std::io::Seek;
use zip::ZipArchive;

const STYLES_PATH: &str = "xl/styles.xml";

// XML tag names of the style table
const TAG_FILLS: &[u8] = b"fills"; // Fill definitions container
const TAG_FILL: &[u8] = b"fill"; // Individual fill
const TAG_PATTERN_FILL: &[u8] = b"patternFill"; // Pattern fill of a fill
const TAG_FOREGROUND_COLOR: &[u8] = b"fgColor"; // Pattern foreground color
const TAG_BACKGROUND_COLOR: &[u8] = b"bgColor"; // Pattern background color
const TAG_FORMAT_INDEXES: &[u8] = b"cellXfs"; // Cell formats container
const TAG_FORMAT_INDEX: &[u8] = b"xf"; // Individual cell format

/// Color reference used by a pattern fill.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Color {
    /// ARGB hex value, upper-cased
    pub rgb: Option<String>,
    /// Index into the theme color scheme
    pub theme: Option<u32>,
    /// Index into the legacy indexed palette
    pub indexed: Option<u32>,
    /// Lighten/darken factor applied to the base color
    pub tint: Option<f64>,
    /// System automatic color
    pub auto: bool,
}

/// Background pattern of a cell.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternFill {
    /// `solid`, `gray125`, `none` and so on
    pub pattern_type: String,
    pub fg_color: Option<Color>,
    pub bg_color: Option<Color>,
}

impl Default for PatternFill {
    fn default() -> Self {
        Self {
            pattern_type: "none".to_owned(),
            fg_color: None,
            bg_color: None,
        }
    }
}

impl PatternFill {
    /// Solid fill of one ARGB color, the usual highlight of a spreadsheet cell.
    pub fn solid(rgb: &str) -> Self {
        Self {
            pattern_type: "solid".to_owned(),
            fg_color: Some(Color {
                rgb: Some(rgb.to_ascii_uppercase()),
                ..Color::default()
            }),
            bg_color: Some(Color {
                indexed: Some(64),
                ..Color::default()
            }),
        }
    }
}

/// Cell formats and fills loaded from `xl/styles.xml`.
#[derive(Debug, Default)]
pub(crate) struct StyleTable {
    /// `fillId` of every `cellXfs/xf`, by style index
    fill_ids: Vec<usize>,
    /// Pattern fill of every `fills/fill`, `None` for gradient fills
    fills: Vec<Option<PatternFill>>,
    /// Whether the package has a style part at all
    is_present: bool,
}

impl StyleTable {
    /// Loads the style table, empty when the package has no style part.
    pub(crate) fn load<RS: Read + Seek>(zip: &mut ZipArchive<RS>) -> Result<StyleTable, ScheduleSheetError> {
        let mut reader = match zip.xml_reader(STYLES_PATH)? {
            Some(reader) => reader,
            None => return Ok(StyleTable::default()),
        };

        let mut fills_context = false;
        let mut fills = Vec::<Option<PatternFill>>::new();
        let mut pattern = None::<PatternFill>;

        let mut format_indexes_context = false;
        let mut fill_ids = Vec::<usize>::new();

        match_xml_events!(reader => {
            Event::Start(event) if event.local_name().as_ref() == TAG_FILLS => fills_context = true,
            Event::End(event) if event.local_name().as_ref() == TAG_FILLS => fills_context = false,
            Event::Start(event) if fills_context && event.local_name().as_ref() == TAG_FILL => pattern = None,
            Event::End(event) if fills_context && event.local_name().as_ref() == TAG_FILL => fills.push(pattern.take()),
            Event::Start(event) if fills_context && event.local_name().as_ref() == TAG_PATTERN_FILL => {
                pattern = Some(PatternFill {
                    pattern_type: event.get_attribute_value("patternType")?
                        .map(|value| value.into_owned())
                        .unwrap_or_else(|| "none".to_owned()),
                    ..PatternFill::default()
                });
            }
            Event::Start(event) if fills_context && event.local_name().as_ref() == TAG_FOREGROUND_COLOR => {
                if let Some(pattern) = pattern.as_mut() {
                    pattern.fg_color = Some(read_color(&event)?);
                }
            }
            Event::Start(event) if fills_context && event.local_name().as_ref() == TAG_BACKGROUND_COLOR => {
                if let Some(pattern) = pattern.as_mut() {
                    pattern.bg_color = Some(read_color(&event)?);
                }
            }

            Event::Start(event) if event.local_name().as_ref() == TAG_FORMAT_INDEXES => format_indexes_context = true,
            Event::End(event) if event.local_name().as_ref() == TAG_FORMAT_INDEXES => format_indexes_context = false,
            Event::Start(event) if format_indexes_context && event.local_name().as_ref() == TAG_FORMAT_INDEX => {
                fill_ids.push(event.parse_attribute_value::<usize>("fillId")?.unwrap_or(0));
            }
        });

        log::debug!("Loaded {} cell formats and {} fills", fill_ids.len(), fills.len());
        Ok(StyleTable {
            fill_ids,
            fills,
            is_present: true,
        })
    }

    /// Whether two style indexes paint the same background.
    ///
    /// Pattern fills compare by value. A fill without a pattern (a gradient)
    /// only equals the very same `fills` entry. Without a style part every
    /// cell has the default background.
    pub(crate) fn fills_equal(&self, first_style: usize, second_style: usize) -> Result<bool, SpreadsheetError> {
        if !self.is_present {
            return Ok(true);
        }
        let (first_id, first) = self.resolve(first_style)?;
        let (second_id, second) = self.resolve(second_style)?;
        Ok(match (first, second) {
            (Some(first), Some(second)) => first == second,
            _ => first_id == second_id,
        })
    }

    /// Resolves a style index to its `fillId` and pattern fill
    fn resolve(&self, style: usize) -> Result<(usize, Option<&PatternFill>), SpreadsheetError> {
        let fill_id = *self
            .fill_ids
            .get(style)
            .ok_or(SpreadsheetError::CellFormatIndexError(style))?;
        let fill = self
            .fills
            .get(fill_id)
            .ok_or(SpreadsheetError::FillIndexError(fill_id))?;
        Ok((fill_id, fill.as_ref()))
    }
}

fn read_color(event: &BytesStart) -> Result<Color, ScheduleSheetError> {
    Ok(Color {
        rgb: event.get_attribute_value("rgb")?.map(|rgb| rgb.to_ascii_uppercase()),
        theme: event.parse_attribute_value("theme")?,
        indexed: event.parse_attribute_value("indexed")?,
        tint: event.parse_attribute_value("tint")?,
        auto: event.parse_flag_attribute("auto")?,
    })
}
