//! Document-wide setup: page geometry, header and footer.

use super::element::RenderContext;
use crate::docx::{Alignment, Document, Inches, Paragraph, Run, VerticalAlignment};
use crate::settings::PageSettings;
use crate::text_format::{TextFormat, TextRole};
use log::debug;
use std::path::PathBuf;

const HEADER_COLUMNS: [f64; 2] = [6.5, 1.0];
const FOOTER_COLUMNS: [f64; 3] = [5.5, 2.0, 1.0];
const LOGO_WIDTH: f64 = 1.0;
const PAGE_NUMBER_SIZE: f64 = 9.0;

/// Builds the page header and footer. Calls chain:
/// `builder.header_render(doc, ctx)?.footer_render(doc, ctx)?`.
pub trait SetupBuilder {
    fn header_render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<&Self, String>;
    fn footer_render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<&Self, String>;
}

/// Header with text and logo, footer with two texts and page numbers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GlobalSetupBuilder {
    pub left_header_text: String,
    pub footer_text: String,
    pub middle_footer_text: String,
    pub logo: Option<PathBuf>,
}

impl GlobalSetupBuilder {
    pub fn from_settings(page: &PageSettings) -> Self {
        GlobalSetupBuilder {
            left_header_text: page.header_text.clone(),
            footer_text: page.footer_text.clone(),
            middle_footer_text: page.middle_footer_text.clone(),
            logo: page.logo().map(|p| p.to_path_buf()),
        }
    }
}

impl SetupBuilder for GlobalSetupBuilder {
    /// 1x2 table across the content width: text on the left, logo on the right
    fn header_render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<&Self, String> {
        let format = ctx.format(TextRole::Header)?;
        let width = doc.content_width();
        let logo = match &self.logo {
            Some(path) => Some(doc.picture(path, Some(Inches(LOGO_WIDTH)), None)?),
            None => None,
        };

        let header = doc.header_mut();
        header.blocks.clear();
        let table = header.add_table(1, HEADER_COLUMNS.len(), width);
        table.autofit = false;
        for (col, w) in HEADER_COLUMNS.iter().enumerate() {
            table.set_column_width(col, Inches(*w));
        }

        let left = &mut table.rows[0][0];
        left.clear_content();
        formatted_paragraph(left.add_paragraph(&self.left_header_text), format, Alignment::Left);
        left.vertical_alignment = Some(VerticalAlignment::Bottom);

        if let Some(picture) = logo {
            let right = &mut table.rows[0][1];
            right.clear_content();
            let p = right.add_paragraph("");
            p.add_run(Run::new()).add_picture(picture);
            p.alignment = Some(Alignment::Right);
            right.vertical_alignment = Some(VerticalAlignment::Bottom);
        }

        debug!("Header rendered (logo: {})", self.logo.is_some());
        Ok(self)
    }

    /// 1x3 table across the page width: text, centered text, page numbers
    fn footer_render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<&Self, String> {
        let format = ctx.format(TextRole::Footer)?;
        let width = doc.page.width;

        let footer = doc.footer_mut();
        footer.blocks.clear();
        let table = footer.add_table(1, FOOTER_COLUMNS.len(), width);
        table.autofit = false;
        for (col, w) in FOOTER_COLUMNS.iter().enumerate() {
            table.set_column_width(col, Inches(*w));
        }

        let cells = &mut table.rows[0];

        cells[0].clear_content();
        formatted_paragraph(cells[0].add_paragraph(&self.footer_text), format, Alignment::Left);

        cells[1].clear_content();
        formatted_paragraph(cells[1].add_paragraph(&self.middle_footer_text), format, Alignment::Center);

        cells[2].clear_content();
        let page_number = cells[2].add_paragraph("");
        page_number.alignment = Some(Alignment::Right);
        add_page_number(page_number);

        debug!("Footer rendered");
        Ok(self)
    }
}

fn formatted_paragraph(p: &mut Paragraph, format: &TextFormat, alignment: Alignment) {
    if let Some(run) = p.first_run_mut() {
        format.apply_format(&mut run.properties);
    }
    p.alignment = Some(alignment);
}

/// Append `PAGE / NUMPAGES` fields in 9pt
pub fn add_page_number(p: &mut Paragraph) {
    let run = p.add_run(Run::new());
    run.add_field("PAGE", "1").add_text(" / ").add_field("NUMPAGES", "1");
    run.properties.font_size = Some(PAGE_NUMBER_SIZE);
}

/// Page size, margins and document line spacing from the settings
pub fn set_global_formatting(doc: &mut Document, page: &PageSettings) {
    doc.page.width = Inches(page.page_width);
    doc.page.height = Inches(page.page_height);
    doc.page.top_margin = Inches(page.top_margin);
    doc.page.bottom_margin = Inches(page.bottom_margin);
    doc.page.left_margin = Inches(page.left_margin);
    doc.page.right_margin = Inches(page.right_margin);
    doc.line_spacing = Some(page.line_spacing);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::model::{Block, RunContent};
    use crate::settings::sample_settings;

    #[test]
    fn test_global_formatting_applies_page_settings() {
        let page = PageSettings { left_margin: 0.75, right_margin: 0.75, line_spacing: 1.5, ..Default::default() };
        let mut doc = Document::new();
        set_global_formatting(&mut doc, &page);

        assert_eq!(doc.page.left_margin, Inches(0.75));
        assert_eq!(doc.page.top_margin, Inches(1.0));
        assert_eq!(doc.line_spacing, Some(1.5));
        assert_eq!(doc.content_width(), Inches(7.0));
    }

    #[test]
    fn test_header_without_logo() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();
        let builder = GlobalSetupBuilder::from_settings(&settings.page);

        builder.header_render(&mut doc, &ctx).unwrap();

        let header = doc.header.as_ref().unwrap();
        let table = header.tables().next().unwrap();
        assert!(!table.autofit);
        assert_eq!(table.width, Some(Inches(6.5)));
        assert_eq!(table.column_widths, vec![Inches(6.5), Inches(1.0)]);

        let left = table.cell(0, 0).unwrap();
        assert_eq!(left.text(), "Header");
        assert_eq!(left.vertical_alignment, Some(VerticalAlignment::Bottom));
        assert_eq!(left.paragraphs[0].runs[0].properties.font_size, Some(10.0));
        assert!(table.cell(0, 1).unwrap().paragraphs.is_empty());
        assert!(doc.media().is_empty());
    }

    #[test]
    fn test_header_with_logo() {
        let dir = tempfile::tempdir().unwrap();
        let logo = dir.path().join("logo.png");
        image::RgbImage::new(64, 32).save(&logo).unwrap();

        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();
        let builder = GlobalSetupBuilder { logo: Some(logo), ..GlobalSetupBuilder::from_settings(&settings.page) };

        builder.header_render(&mut doc, &ctx).unwrap();

        let table = doc.header.as_ref().unwrap().tables().next().unwrap();
        let right = table.cell(0, 1).unwrap();
        assert_eq!(right.paragraphs[0].alignment, Some(Alignment::Right));
        match &right.paragraphs[0].runs[0].content[0] {
            RunContent::Picture(p) => {
                assert_eq!(p.width, Inches(1.0));
                assert_eq!(p.height, Inches(0.5));
            }
            other => panic!("expected a picture, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_logo_is_an_error() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();
        let builder = GlobalSetupBuilder { logo: Some(PathBuf::from("no/such/logo.png")), ..Default::default() };
        assert!(builder.header_render(&mut doc, &ctx).is_err());
    }

    #[test]
    fn test_footer_layout_and_page_numbers() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();
        let builder = GlobalSetupBuilder::from_settings(&settings.page);

        builder.header_render(&mut doc, &ctx).unwrap().footer_render(&mut doc, &ctx).unwrap();

        let footer = doc.footer.as_ref().unwrap();
        assert_eq!(footer.blocks.len(), 1);
        let Block::Table(table) = &footer.blocks[0] else { panic!("footer should hold a table") };
        assert_eq!(table.width, Some(Inches(8.5)));
        assert_eq!(table.column_widths, vec![Inches(5.5), Inches(2.0), Inches(1.0)]);

        assert_eq!(table.cell(0, 0).unwrap().text(), "Footer");
        let middle = table.cell(0, 1).unwrap();
        assert_eq!(middle.text(), "Middle");
        assert_eq!(middle.paragraphs[0].alignment, Some(Alignment::Center));

        let numbers = &table.cell(0, 2).unwrap().paragraphs[0];
        assert_eq!(numbers.alignment, Some(Alignment::Right));
        assert_eq!(numbers.text(), "1 / 1");
        assert_eq!(numbers.runs[0].properties.font_size, Some(9.0));
    }

    #[test]
    fn test_setup_twice_replaces_header() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();
        let builder = GlobalSetupBuilder::from_settings(&settings.page);

        builder.header_render(&mut doc, &ctx).unwrap();
        builder.header_render(&mut doc, &ctx).unwrap();
        assert_eq!(doc.header.as_ref().unwrap().tables().count(), 1);
    }

    #[test]
    fn test_setup_replaces_existing_footer_content() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();
        doc.footer_mut().add_paragraph("stale");
        let builder = GlobalSetupBuilder::from_settings(&settings.page);

        builder.footer_render(&mut doc, &ctx).unwrap();

        let footer = doc.footer.as_ref().unwrap();
        assert_eq!(footer.blocks.len(), 1);
        assert!(matches!(footer.blocks[0], Block::Table(_)));
    }
}
