//! In-memory document object model.
//!
//! A `Document` is a mutable tree of paragraphs and tables plus a single
//! page setup with optional header and footer. Everything is plain data;
//! serialization lives in the `xml` and `package` modules.

use super::media::Media;
use log::debug;
use std::collections::HashMap;
use std::ops::Sub;
use std::path::{Path, PathBuf};

const TWIPS_PER_INCH: f64 = 1440.0;
const EMU_PER_INCH: f64 = 914_400.0;
/// Pixel density assumed for images placed without an explicit size
const DEFAULT_DPI: f64 = 96.0;

/// A length in inches.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Inches(pub f64);

impl Inches {
    /// Twentieths of a point, used for page and table geometry.
    pub fn twips(self) -> i64 {
        (self.0 * TWIPS_PER_INCH).round() as i64
    }

    /// English metric units, used for drawings.
    pub fn emu(self) -> i64 {
        (self.0 * EMU_PER_INCH).round() as i64
    }
}

impl Sub for Inches {
    type Output = Inches;

    fn sub(self, rhs: Inches) -> Inches {
        Inches(self.0 - rhs.0)
    }
}

/// Horizontal alignment of a paragraph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
        }
    }
}

/// Vertical alignment of a table cell. Cells without one sit at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlignment {
    Bottom,
}

impl VerticalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerticalAlignment::Bottom => "bottom",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RgbColor(pub u8, pub u8, pub u8);

impl RgbColor {
    pub const BLACK: RgbColor = RgbColor(0, 0, 0);

    /// `RRGGBB` as written in WordprocessingML
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

/// Character formatting. `None` leaves the value to the paragraph style.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunProperties {
    pub font_name: Option<String>,
    /// Size in points
    pub font_size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub color: Option<RgbColor>,
}

impl RunProperties {
    pub fn is_empty(&self) -> bool {
        *self == RunProperties::default()
    }
}

/// An inline picture placed in a run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Picture {
    pub media: MediaId,
    pub width: Inches,
    pub height: Inches,
}

/// Content items of a run, serialized in order
#[derive(Debug, Clone, PartialEq)]
pub enum RunContent {
    Text(String),
    PageBreak,
    FieldBegin,
    FieldInstruction(String),
    FieldSeparate,
    FieldEnd,
    Picture(Picture),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    pub properties: RunProperties,
    pub content: Vec<RunContent>,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        let mut run = Run::new();
        run.add_text(text);
        run
    }

    pub fn add_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.content.push(RunContent::Text(text.into()));
        self
    }

    pub fn add_page_break(&mut self) -> &mut Self {
        self.content.push(RunContent::PageBreak);
        self
    }

    /// Add a complex field (`PAGE`, `NUMPAGES`, ...) with a cached placeholder value
    pub fn add_field(&mut self, instruction: &str, placeholder: &str) -> &mut Self {
        self.content.push(RunContent::FieldBegin);
        self.content.push(RunContent::FieldInstruction(format!(" {} ", instruction)));
        self.content.push(RunContent::FieldSeparate);
        self.content.push(RunContent::Text(placeholder.to_string()));
        self.content.push(RunContent::FieldEnd);
        self
    }

    pub fn add_picture(&mut self, picture: Picture) -> &mut Self {
        self.content.push(RunContent::Picture(picture));
        self
    }

    /// Concatenated text content, fields included with their placeholders
    #[cfg(test)]
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                RunContent::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Built-in paragraph styles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    Heading(u8),
}

impl ParagraphStyle {
    pub fn style_id(&self) -> String {
        match self {
            ParagraphStyle::Heading(level) => format!("Heading{}", level),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub style: Option<ParagraphStyle>,
    pub alignment: Option<Alignment>,
    /// Multiple of single line spacing
    pub line_spacing: Option<f64>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph holding one run of text; empty text adds no run
    pub fn with_text(text: &str) -> Self {
        let mut p = Paragraph::new();
        if !text.is_empty() {
            p.runs.push(Run::with_text(text));
        }
        p
    }

    pub fn add_run(&mut self, run: Run) -> &mut Run {
        self.runs.push(run);
        let last = self.runs.len() - 1;
        &mut self.runs[last]
    }

    pub fn first_run_mut(&mut self) -> Option<&mut Run> {
        self.runs.first_mut()
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }

    #[cfg(test)]
    pub fn has_page_break(&self) -> bool {
        self.runs.iter().any(|r| r.content.contains(&RunContent::PageBreak))
    }
}

/// A single-line cell border
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Border {
    /// Width in eighths of a point
    pub size: u32,
    pub color: RgbColor,
}

impl Default for Border {
    fn default() -> Self {
        Border { size: 4, color: RgbColor::BLACK }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub width: Option<Inches>,
    pub vertical_alignment: Option<VerticalAlignment>,
    /// Same border on all four sides
    pub border: Option<Border>,
    pub paragraphs: Vec<Paragraph>,
}

impl Cell {
    pub fn clear_content(&mut self) {
        self.paragraphs.clear();
    }

    pub fn add_paragraph(&mut self, text: &str) -> &mut Paragraph {
        self.paragraphs.push(Paragraph::with_text(text));
        let last = self.paragraphs.len() - 1;
        &mut self.paragraphs[last]
    }

    #[cfg(test)]
    pub fn text(&self) -> String {
        self.paragraphs.iter().map(Paragraph::text).collect::<Vec<_>>().join("\n")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Total width; `None` lets the consumer size the table
    pub width: Option<Inches>,
    pub column_widths: Vec<Inches>,
    /// Fixed layout when false
    pub autofit: bool,
    pub rows: Vec<Vec<Cell>>,
}

impl Table {
    /// A rows x cols table with equal column widths spanning `width`
    pub fn new(rows: usize, cols: usize, width: Inches) -> Self {
        let column_width = if cols > 0 { Inches(width.0 / cols as f64) } else { Inches(0.0) };
        Table {
            width: Some(width),
            column_widths: vec![column_width; cols],
            autofit: true,
            rows: (0..rows).map(|_| (0..cols).map(|_| Cell::default()).collect()).collect(),
        }
    }

    #[cfg(test)]
    pub fn column_count(&self) -> usize {
        self.column_widths.len()
    }

    #[cfg(test)]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Set a column's grid width and the width of every cell in it
    pub fn set_column_width(&mut self, col: usize, width: Inches) {
        if let Some(w) = self.column_widths.get_mut(col) {
            *w = width;
        }
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(col) {
                cell.width = Some(width);
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// Content of a page header or footer
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderFooter {
    pub blocks: Vec<Block>,
}

impl HeaderFooter {
    #[cfg(test)]
    pub fn add_paragraph(&mut self, text: &str) -> &mut Paragraph {
        push_paragraph(&mut self.blocks, Paragraph::with_text(text))
    }

    pub fn add_table(&mut self, rows: usize, cols: usize, width: Inches) -> &mut Table {
        push_table(&mut self.blocks, Table::new(rows, cols, width))
    }

    #[cfg(test)]
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }
}

/// Page size, margins and header/footer distances
#[derive(Debug, Clone, PartialEq)]
pub struct PageSetup {
    pub width: Inches,
    pub height: Inches,
    pub top_margin: Inches,
    pub bottom_margin: Inches,
    pub left_margin: Inches,
    pub right_margin: Inches,
    pub header_distance: Inches,
    pub footer_distance: Inches,
}

impl Default for PageSetup {
    /// US Letter with one-inch margins
    fn default() -> Self {
        PageSetup {
            width: Inches(8.5),
            height: Inches(11.0),
            top_margin: Inches(1.0),
            bottom_margin: Inches(1.0),
            left_margin: Inches(1.0),
            right_margin: Inches(1.0),
            header_distance: Inches(0.5),
            footer_distance: Inches(0.5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoreProperties {
    pub title: String,
    pub creator: String,
}

/// Opaque handle to an embedded image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MediaId(pub usize);

/// A mutable word-processing document
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub page: PageSetup,
    /// Document-wide line spacing, as a multiple of single spacing
    pub line_spacing: Option<f64>,
    pub body: Vec<Block>,
    pub header: Option<HeaderFooter>,
    pub footer: Option<HeaderFooter>,
    pub properties: CoreProperties,
    media: Vec<Media>,
    media_by_path: HashMap<PathBuf, MediaId>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Page width minus left and right margins
    pub fn content_width(&self) -> Inches {
        self.page.width - self.page.left_margin - self.page.right_margin
    }

    pub fn add_heading(&mut self, text: &str, level: u8) -> &mut Paragraph {
        let mut p = Paragraph::with_text(text);
        p.style = Some(ParagraphStyle::Heading(level));
        push_paragraph(&mut self.body, p)
    }

    pub fn add_paragraph(&mut self, text: &str) -> &mut Paragraph {
        push_paragraph(&mut self.body, Paragraph::with_text(text))
    }

    pub fn add_empty_paragraph(&mut self) -> &mut Paragraph {
        push_paragraph(&mut self.body, Paragraph::new())
    }

    pub fn add_table(&mut self, rows: usize, cols: usize, width: Inches) -> &mut Table {
        push_table(&mut self.body, Table::new(rows, cols, width))
    }

    /// A paragraph holding only a page break
    pub fn add_page_break(&mut self) -> &mut Paragraph {
        let mut run = Run::new();
        run.add_page_break();
        let mut p = Paragraph::new();
        p.runs.push(run);
        push_paragraph(&mut self.body, p)
    }

    /// Add a paragraph holding a single picture
    pub fn add_picture(
        &mut self,
        path: &Path,
        width: Option<Inches>,
        height: Option<Inches>,
    ) -> Result<&mut Paragraph, String> {
        let picture = self.picture(path, width, height)?;
        let mut run = Run::new();
        run.add_picture(picture);
        let mut p = Paragraph::new();
        p.runs.push(run);
        Ok(push_paragraph(&mut self.body, p))
    }

    /// Embed an image (once per path) and size it.
    ///
    /// With one dimension given the other follows the aspect ratio; with
    /// none the image keeps its pixel size at 96 dpi.
    pub fn picture(&mut self, path: &Path, width: Option<Inches>, height: Option<Inches>) -> Result<Picture, String> {
        let id = self.embed_image(path)?;
        let media = &self.media[id.0];
        let (px_w, px_h) = (f64::from(media.pixel_width), f64::from(media.pixel_height));

        let (width, height) = match (width, height) {
            (Some(w), Some(h)) => (w, h),
            (Some(w), None) => (w, Inches(w.0 * px_h / px_w)),
            (None, Some(h)) => (Inches(h.0 * px_w / px_h), h),
            (None, None) => (Inches(px_w / DEFAULT_DPI), Inches(px_h / DEFAULT_DPI)),
        };

        Ok(Picture { media: id, width, height })
    }

    fn embed_image(&mut self, path: &Path) -> Result<MediaId, String> {
        if let Some(id) = self.media_by_path.get(path) {
            debug!("Reusing embedded image {:?}", path);
            return Ok(*id);
        }

        let media = Media::load(path)?;
        let id = MediaId(self.media.len());
        debug!("Embedded image {:?} as media #{} ({}x{})", path, id.0, media.pixel_width, media.pixel_height);
        self.media.push(media);
        self.media_by_path.insert(path.to_path_buf(), id);
        Ok(id)
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    /// The page header, created empty on first use
    pub fn header_mut(&mut self) -> &mut HeaderFooter {
        self.header.get_or_insert_with(HeaderFooter::default)
    }

    /// The page footer, created empty on first use
    pub fn footer_mut(&mut self) -> &mut HeaderFooter {
        self.footer.get_or_insert_with(HeaderFooter::default)
    }

    #[cfg(test)]
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.body.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.body.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            _ => None,
        })
    }

    /// Save as a `.docx` package
    pub fn save(&self, path: &Path) -> Result<(), String> {
        super::package::save(self, path)
    }
}

fn push_paragraph(blocks: &mut Vec<Block>, p: Paragraph) -> &mut Paragraph {
    blocks.push(Block::Paragraph(p));
    match blocks.last_mut() {
        Some(Block::Paragraph(p)) => p,
        _ => unreachable!("a paragraph was just pushed"),
    }
}

fn push_table(blocks: &mut Vec<Block>, t: Table) -> &mut Table {
    blocks.push(Block::Table(t));
    match blocks.last_mut() {
        Some(Block::Table(t)) => t,
        _ => unreachable!("a table was just pushed"),
    }
}
