/// Text formats resolved by semantic role
///
/// This module handles:
/// - Parsing the raw `TEXT_FORMAT` entries of the settings file
/// - Color and alignment conversion
/// - Resolving the format for a role (title level, status, table, ...)
/// - Applying a format to a document run
use crate::docx::{Alignment, RgbColor, RunProperties};
use serde::Deserialize;

/// Line spacing used when a format leaves it unset or zero
pub const DEFAULT_LINE_SPACING: f64 = 1.5;
const DEFAULT_FONT_NAME: &str = "Calibri";
const DEFAULT_FONT_SIZE: f64 = 11.0;

/// Semantic role of a piece of text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    /// Title of level 1, 2 or 3
    Title(u8),
    Paragraph,
    PositiveStatus,
    NegativeStatus,
    Caption,
    Table,
    Header,
    Footer,
}

impl TextRole {
    /// Every role with a format of its own, title levels included
    pub const ALL: [TextRole; 10] = [
        TextRole::Title(1),
        TextRole::Title(2),
        TextRole::Title(3),
        TextRole::Paragraph,
        TextRole::PositiveStatus,
        TextRole::NegativeStatus,
        TextRole::Caption,
        TextRole::Table,
        TextRole::Header,
        TextRole::Footer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TextRole::Title(_) => "TITLE",
            TextRole::Paragraph => "PARAGRAPH",
            TextRole::PositiveStatus => "POSITIVE_STATUS",
            TextRole::NegativeStatus => "NEGATIVE_STATUS",
            TextRole::Caption => "CAPTION",
            TextRole::Table => "TABLE",
            TextRole::Header => "HEADER",
            TextRole::Footer => "FOOTER",
        }
    }
}

/// A named style bundle: font, size, weight, color, alignment, line spacing
#[derive(Debug, Clone, PartialEq)]
pub struct TextFormat {
    pub font_name: String,
    /// Size in points
    pub font_size: f64,
    pub bold: bool,
    pub italic: bool,
    pub color: RgbColor,
    /// Multiple of single line spacing
    pub line_spacing: f64,
    pub alignment: Alignment,
}

impl Default for TextFormat {
    fn default() -> Self {
        TextFormat {
            font_name: DEFAULT_FONT_NAME.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            bold: true,
            italic: true,
            color: RgbColor::BLACK,
            line_spacing: DEFAULT_LINE_SPACING,
            alignment: Alignment::Left,
        }
    }
}

impl TextFormat {
    /// Build a format from its raw settings entry
    pub fn from_raw(raw: &RawTextFormat, name: &str) -> Result<Self, String> {
        let font_size = raw.font_size.unwrap_or(DEFAULT_FONT_SIZE);
        if font_size.is_nan() || font_size <= 0.0 {
            return Err(format!("{}: font_size must be positive, got {}", name, font_size));
        }

        let color = match raw.color.as_deref() {
            Some(s) => parse_color(s).map_err(|e| format!("{}: {}", name, e))?,
            None => RgbColor::BLACK,
        };

        let line_spacing = match raw.line_spacing {
            Some(v) if v > 0.0 => v,
            Some(v) if v < 0.0 => return Err(format!("{}: line_spacing must not be negative, got {}", name, v)),
            _ => DEFAULT_LINE_SPACING,
        };

        Ok(TextFormat {
            font_name: raw.font_name.clone().unwrap_or_else(|| DEFAULT_FONT_NAME.to_string()),
            font_size,
            bold: raw.bold.as_ref().is_none_or(Flag::is_set),
            italic: raw.italic.as_ref().is_none_or(Flag::is_set),
            color,
            line_spacing,
            alignment: parse_alignment(raw.alignment.as_deref()),
        })
    }

    /// Apply font, size, color, bold and italic to a run
    pub fn apply_format(&self, run: &mut RunProperties) {
        run.font_name = Some(self.font_name.clone());
        run.font_size = Some(self.font_size);
        run.color = Some(self.color);
        run.bold = Some(self.bold);
        run.italic = Some(self.italic);
    }
}

/// A boolean that settings files spell either as `true` or as `"True"`.
/// Only an explicit false (`false`, `"False"`, any case) turns it off.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    pub fn is_set(&self) -> bool {
        match self {
            Flag::Bool(b) => *b,
            Flag::Text(s) => !s.trim().eq_ignore_ascii_case("false"),
        }
    }
}

/// One `TEXT_FORMAT` entry as written in the settings file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTextFormat {
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub bold: Option<Flag>,
    pub italic: Option<Flag>,
    pub color: Option<String>,
    pub line_spacing: Option<f64>,
    pub alignment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTitleFormats {
    #[serde(rename = "L1", default)]
    pub l1: RawTextFormat,
    #[serde(rename = "L2", default)]
    pub l2: RawTextFormat,
    #[serde(rename = "L3", default)]
    pub l3: RawTextFormat,
}

/// The `TEXT_FORMAT` section of the settings file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct RawTextFormats {
    #[serde(default)]
    pub title: RawTitleFormats,
    #[serde(default)]
    pub paragraph: RawTextFormat,
    #[serde(default)]
    pub positive_status: RawTextFormat,
    #[serde(default)]
    pub negative_status: RawTextFormat,
    #[serde(default)]
    pub caption: RawTextFormat,
    #[serde(default)]
    pub table: RawTextFormat,
    #[serde(default)]
    pub header: RawTextFormat,
    #[serde(default)]
    pub footer: RawTextFormat,
}

/// Resolved formats, one per role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextFormats {
    pub titles: [TextFormat; 3],
    pub paragraph: TextFormat,
    pub positive_status: TextFormat,
    pub negative_status: TextFormat,
    pub caption: TextFormat,
    pub table: TextFormat,
    pub header: TextFormat,
    pub footer: TextFormat,
}

impl TextFormats {
    pub fn from_raw(raw: &RawTextFormats) -> Result<Self, String> {
        Ok(TextFormats {
            titles: [
                TextFormat::from_raw(&raw.title.l1, "TITLE.L1")?,
                TextFormat::from_raw(&raw.title.l2, "TITLE.L2")?,
                TextFormat::from_raw(&raw.title.l3, "TITLE.L3")?,
            ],
            paragraph: TextFormat::from_raw(&raw.paragraph, "PARAGRAPH")?,
            positive_status: TextFormat::from_raw(&raw.positive_status, "POSITIVE_STATUS")?,
            negative_status: TextFormat::from_raw(&raw.negative_status, "NEGATIVE_STATUS")?,
            caption: TextFormat::from_raw(&raw.caption, "CAPTION")?,
            table: TextFormat::from_raw(&raw.table, "TABLE")?,
            header: TextFormat::from_raw(&raw.header, "HEADER")?,
            footer: TextFormat::from_raw(&raw.footer, "FOOTER")?,
        })
    }

    /// Get the format for a role
    pub fn resolve(&self, role: TextRole) -> Result<&TextFormat, String> {
        match role {
            TextRole::Title(level @ 1..=3) => Ok(&self.titles[usize::from(level) - 1]),
            TextRole::Title(level) => Err(format!("Title level must be between 1 and 3, got {}", level)),
            TextRole::Paragraph => Ok(&self.paragraph),
            TextRole::PositiveStatus => Ok(&self.positive_status),
            TextRole::NegativeStatus => Ok(&self.negative_status),
            TextRole::Caption => Ok(&self.caption),
            TextRole::Table => Ok(&self.table),
            TextRole::Header => Ok(&self.header),
            TextRole::Footer => Ok(&self.footer),
        }
    }
}

/// Parse a color written as `(RR,GG,BB)` (hex components), `#RRGGBB` or `RRGGBB`
pub fn parse_color(s: &str) -> Result<RgbColor, String> {
    let trimmed = s.trim();

    let components: Vec<&str> = if trimmed.contains(',') {
        trimmed.trim_start_matches('(').trim_end_matches(')').split(',').map(str::trim).collect()
    } else {
        let hex = trimmed.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(format!("Invalid color '{}'", s));
        }
        vec![&hex[0..2], &hex[2..4], &hex[4..6]]
    };

    if components.len() != 3 {
        return Err(format!("Invalid color '{}': expected three components", s));
    }

    let mut rgb = [0u8; 3];
    for (slot, component) in rgb.iter_mut().zip(&components) {
        *slot = u8::from_str_radix(component, 16)
            .map_err(|e| format!("Invalid color component '{}' in '{}': {}", component, s, e))?;
    }

    Ok(RgbColor(rgb[0], rgb[1], rgb[2]))
}

fn parse_alignment(s: Option<&str>) -> Alignment {
    match s.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        Some("center") => Alignment::Center,
        Some("right") => Alignment::Right,
        _ => Alignment::Left,
    }
}
