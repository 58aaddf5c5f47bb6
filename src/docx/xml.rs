//! WordprocessingML serialization of the document model.
//!
//! Every XML part of the package is produced here with `quick-xml`
//! writer events; the `package` module only decides which parts exist
//! and zips them.

use super::media::Media;
use super::model::{
    Block, Border, Document, HeaderFooter, MediaId, Paragraph, Picture, Run, RunContent, RunProperties, Table,
};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::borrow::Cow;
use std::collections::BTreeSet;

pub const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Namespace declarations shared by document, header and footer roots
const CONTENT_NAMESPACES: [(&str, &str); 5] =
    [("xmlns:w", NS_W), ("xmlns:r", NS_R), ("xmlns:wp", NS_WP), ("xmlns:a", NS_A), ("xmlns:pic", NS_PIC)];

/// Relationship id of an embedded image, the same in every part that uses it
pub fn media_rel_id(id: MediaId) -> String {
    format!("rIdImg{}", id.0 + 1)
}

/// Package path of an embedded image, relative to `word/`
pub fn media_target(id: MediaId, media: &Media) -> String {
    format!("media/image{}.{}", id.0 + 1, media.kind.extension())
}

/// Characters an XML 1.0 document may contain
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Replace characters XML 1.0 forbids (control characters, U+FFFE, U+FFFF) with U+FFFD
pub fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(text.chars().map(|c| if is_xml_char(c) { c } else { char::REPLACEMENT_CHARACTER }).collect())
}

/// Thin wrapper over a quick-xml writer with string errors
pub struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    pub fn new() -> Result<Self, String> {
        let mut part = XmlPart { writer: Writer::new(Vec::new()) };
        part.emit(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(part)
    }

    fn emit(&mut self, event: Event<'_>) -> Result<(), String> {
        self.writer.write_event(event).map_err(|e| format!("Failed to write XML: {}", e))
    }

    pub fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), String> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().map(|(k, v)| (*k, xml_safe(v))));
        self.emit(Event::Start(elem))
    }

    pub fn end(&mut self, name: &str) -> Result<(), String> {
        self.emit(Event::End(BytesEnd::new(name)))
    }

    pub fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), String> {
        let elem = BytesStart::new(name).with_attributes(attrs.iter().map(|(k, v)| (*k, xml_safe(v))));
        self.emit(Event::Empty(elem))
    }

    /// `<name attrs>text</name>` with the text escaped and forbidden characters replaced
    pub fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<(), String> {
        self.start(name, attrs)?;
        self.emit(Event::Text(BytesText::new(&xml_safe(text))))?;
        self.end(name)
    }

    pub fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

/// Serializes body, header and footer content.
///
/// Drawing ids must be unique across the whole document, so one
/// serializer is shared by all parts.
pub struct ContentWriter<'a> {
    media: &'a [Media],
    next_drawing_id: u32,
}

impl<'a> ContentWriter<'a> {
    pub fn new(media: &'a [Media]) -> Self {
        ContentWriter { media, next_drawing_id: 1 }
    }

    pub fn document_part(
        &mut self,
        doc: &Document,
        header_rel: Option<&str>,
        footer_rel: Option<&str>,
    ) -> Result<Vec<u8>, String> {
        let mut xml = XmlPart::new()?;
        xml.start("w:document", &CONTENT_NAMESPACES)?;
        xml.start("w:body", &[])?;

        self.write_blocks(&mut xml, &doc.body)?;
        write_section_properties(&mut xml, doc, header_rel, footer_rel)?;

        xml.end("w:body")?;
        xml.end("w:document")?;
        Ok(xml.finish())
    }

    /// `w:hdr` or `w:ftr` part
    pub fn header_footer_part(&mut self, root: &str, content: &HeaderFooter) -> Result<Vec<u8>, String> {
        let mut xml = XmlPart::new()?;
        xml.start(root, &CONTENT_NAMESPACES)?;
        self.write_blocks(&mut xml, &content.blocks)?;
        // A header or footer must hold at least one paragraph after its last table
        if !matches!(content.blocks.last(), Some(Block::Paragraph(_))) {
            write_paragraph_start(&mut xml, &Paragraph::new())?;
            xml.end("w:p")?;
        }
        xml.end(root)?;
        Ok(xml.finish())
    }

    fn write_blocks(&mut self, xml: &mut XmlPart, blocks: &[Block]) -> Result<(), String> {
        for block in blocks {
            match block {
                Block::Paragraph(p) => self.write_paragraph(xml, p)?,
                Block::Table(t) => self.write_table(xml, t)?,
            }
        }
        Ok(())
    }

    fn write_paragraph(&mut self, xml: &mut XmlPart, p: &Paragraph) -> Result<(), String> {
        write_paragraph_start(xml, p)?;
        for run in &p.runs {
            self.write_run(xml, run)?;
        }
        xml.end("w:p")
    }

    fn write_run(&mut self, xml: &mut XmlPart, run: &Run) -> Result<(), String> {
        xml.start("w:r", &[])?;
        if !run.properties.is_empty() {
            write_run_properties(xml, &run.properties)?;
        }

        for item in &run.content {
            match item {
                RunContent::Text(text) => xml.text_element("w:t", &[("xml:space", "preserve")], text)?,
                RunContent::PageBreak => xml.empty("w:br", &[("w:type", "page")])?,
                RunContent::FieldBegin => xml.empty("w:fldChar", &[("w:fldCharType", "begin")])?,
                RunContent::FieldInstruction(instr) => {
                    xml.text_element("w:instrText", &[("xml:space", "preserve")], instr)?
                }
                RunContent::FieldSeparate => xml.empty("w:fldChar", &[("w:fldCharType", "separate")])?,
                RunContent::FieldEnd => xml.empty("w:fldChar", &[("w:fldCharType", "end")])?,
                RunContent::Picture(picture) => self.write_picture(xml, picture)?,
            }
        }

        xml.end("w:r")
    }

    fn write_picture(&mut self, xml: &mut XmlPart, picture: &Picture) -> Result<(), String> {
        let media = self
            .media
            .get(picture.media.0)
            .ok_or_else(|| format!("Picture refers to unknown media #{}", picture.media.0))?;

        let drawing_id = self.next_drawing_id;
        self.next_drawing_id += 1;

        let id = drawing_id.to_string();
        let name = format!("Picture {}", drawing_id);
        let file_name = media_target(picture.media, media);
        let rel_id = media_rel_id(picture.media);
        let cx = picture.width.emu().to_string();
        let cy = picture.height.emu().to_string();

        xml.start("w:drawing", &[])?;
        xml.start("wp:inline", &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")])?;
        xml.empty("wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        xml.empty("wp:docPr", &[("id", id.as_str()), ("name", name.as_str())])?;
        xml.start("wp:cNvGraphicFramePr", &[])?;
        xml.empty("a:graphicFrameLocks", &[("noChangeAspect", "1")])?;
        xml.end("wp:cNvGraphicFramePr")?;
        xml.start("a:graphic", &[])?;
        xml.start("a:graphicData", &[("uri", NS_PIC)])?;
        xml.start("pic:pic", &[])?;

        xml.start("pic:nvPicPr", &[])?;
        xml.empty("pic:cNvPr", &[("id", "0"), ("name", file_name.as_str())])?;
        xml.empty("pic:cNvPicPr", &[])?;
        xml.end("pic:nvPicPr")?;

        xml.start("pic:blipFill", &[])?;
        xml.empty("a:blip", &[("r:embed", rel_id.as_str())])?;
        xml.start("a:stretch", &[])?;
        xml.empty("a:fillRect", &[])?;
        xml.end("a:stretch")?;
        xml.end("pic:blipFill")?;

        xml.start("pic:spPr", &[])?;
        xml.start("a:xfrm", &[])?;
        xml.empty("a:off", &[("x", "0"), ("y", "0")])?;
        xml.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        xml.end("a:xfrm")?;
        xml.start("a:prstGeom", &[("prst", "rect")])?;
        xml.empty("a:avLst", &[])?;
        xml.end("a:prstGeom")?;
        xml.end("pic:spPr")?;

        xml.end("pic:pic")?;
        xml.end("a:graphicData")?;
        xml.end("a:graphic")?;
        xml.end("wp:inline")?;
        xml.end("w:drawing")
    }

    fn write_table(&mut self, xml: &mut XmlPart, table: &Table) -> Result<(), String> {
        xml.start("w:tbl", &[])?;

        xml.start("w:tblPr", &[])?;
        match table.width {
            Some(w) => xml.empty("w:tblW", &[("w:w", w.twips().to_string().as_str()), ("w:type", "dxa")])?,
            None => xml.empty("w:tblW", &[("w:w", "0"), ("w:type", "auto")])?,
        }
        let layout = if table.autofit { "autofit" } else { "fixed" };
        xml.empty("w:tblLayout", &[("w:type", layout)])?;
        xml.end("w:tblPr")?;

        xml.start("w:tblGrid", &[])?;
        for width in &table.column_widths {
            xml.empty("w:gridCol", &[("w:w", width.twips().to_string().as_str())])?;
        }
        xml.end("w:tblGrid")?;

        for row in &table.rows {
            xml.start("w:tr", &[])?;
            for cell in row {
                xml.start("w:tc", &[])?;

                xml.start("w:tcPr", &[])?;
                if let Some(w) = cell.width {
                    xml.empty("w:tcW", &[("w:w", w.twips().to_string().as_str()), ("w:type", "dxa")])?;
                }
                if let Some(border) = cell.border {
                    write_cell_borders(xml, &border)?;
                }
                if let Some(v) = cell.vertical_alignment {
                    xml.empty("w:vAlign", &[("w:val", v.as_str())])?;
                }
                xml.end("w:tcPr")?;

                if cell.paragraphs.is_empty() {
                    write_paragraph_start(xml, &Paragraph::new())?;
                    xml.end("w:p")?;
                }
                for p in &cell.paragraphs {
                    self.write_paragraph(xml, p)?;
                }

                xml.end("w:tc")?;
            }
            xml.end("w:tr")?;
        }

        xml.end("w:tbl")
    }
}

/// Media referenced by pictures in a list of blocks
pub fn collect_media(blocks: &[Block]) -> BTreeSet<MediaId> {
    let mut ids = BTreeSet::new();
    let mut visit = |p: &Paragraph| {
        for run in &p.runs {
            for item in &run.content {
                if let RunContent::Picture(picture) = item {
                    ids.insert(picture.media);
                }
            }
        }
    };

    for block in blocks {
        match block {
            Block::Paragraph(p) => visit(p),
            Block::Table(t) => t.rows.iter().flatten().flat_map(|c| &c.paragraphs).for_each(&mut visit),
        }
    }
    ids
}

/// Opens `w:p` and writes its properties; the caller closes it
fn write_paragraph_start(xml: &mut XmlPart, p: &Paragraph) -> Result<(), String> {
    xml.start("w:p", &[])?;
    if p.style.is_none() && p.alignment.is_none() && p.line_spacing.is_none() {
        return Ok(());
    }

    xml.start("w:pPr", &[])?;
    if let Some(style) = p.style {
        xml.empty("w:pStyle", &[("w:val", style.style_id().as_str())])?;
    }
    if let Some(spacing) = p.line_spacing {
        xml.empty("w:spacing", &[("w:line", line_value(spacing).as_str()), ("w:lineRule", "auto")])?;
    }
    if let Some(alignment) = p.alignment {
        xml.empty("w:jc", &[("w:val", alignment.as_str())])?;
    }
    xml.end("w:pPr")
}

fn write_run_properties(xml: &mut XmlPart, props: &RunProperties) -> Result<(), String> {
    xml.start("w:rPr", &[])?;
    if let Some(font) = props.font_name.as_deref() {
        xml.empty("w:rFonts", &[("w:ascii", font), ("w:hAnsi", font), ("w:eastAsia", font), ("w:cs", font)])?;
    }
    if let Some(bold) = props.bold {
        xml.empty("w:b", &[("w:val", toggle(bold))])?;
    }
    if let Some(italic) = props.italic {
        xml.empty("w:i", &[("w:val", toggle(italic))])?;
    }
    if let Some(color) = props.color {
        xml.empty("w:color", &[("w:val", color.hex().as_str())])?;
    }
    if let Some(size) = props.font_size {
        let half_points = half_points(size);
        xml.empty("w:sz", &[("w:val", half_points.as_str())])?;
        xml.empty("w:szCs", &[("w:val", half_points.as_str())])?;
    }
    xml.end("w:rPr")
}

fn write_cell_borders(xml: &mut XmlPart, border: &Border) -> Result<(), String> {
    let size = border.size.to_string();
    let color = border.color.hex();
    xml.start("w:tcBorders", &[])?;
    for side in ["w:top", "w:left", "w:bottom", "w:right"] {
        let attrs = [("w:val", "single"), ("w:sz", size.as_str()), ("w:space", "0"), ("w:color", color.as_str())];
        xml.empty(side, &attrs)?;
    }
    xml.end("w:tcBorders")
}

fn write_section_properties(
    xml: &mut XmlPart,
    doc: &Document,
    header_rel: Option<&str>,
    footer_rel: Option<&str>,
) -> Result<(), String> {
    let page = &doc.page;
    xml.start("w:sectPr", &[])?;
    if let Some(rel) = header_rel {
        xml.empty("w:headerReference", &[("w:type", "default"), ("r:id", rel)])?;
    }
    if let Some(rel) = footer_rel {
        xml.empty("w:footerReference", &[("w:type", "default"), ("r:id", rel)])?;
    }
    let (width, height) = (page.width.twips().to_string(), page.height.twips().to_string());
    xml.empty("w:pgSz", &[("w:w", width.as_str()), ("w:h", height.as_str())])?;
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", page.top_margin.twips().to_string().as_str()),
            ("w:right", page.right_margin.twips().to_string().as_str()),
            ("w:bottom", page.bottom_margin.twips().to_string().as_str()),
            ("w:left", page.left_margin.twips().to_string().as_str()),
            ("w:header", page.header_distance.twips().to_string().as_str()),
            ("w:footer", page.footer_distance.twips().to_string().as_str()),
            ("w:gutter", "0"),
        ],
    )?;
    xml.end("w:sectPr")
}

/// `word/styles.xml`: document defaults plus Normal and Heading1-3
pub fn styles_part(line_spacing: Option<f64>) -> Result<Vec<u8>, String> {
    let mut xml = XmlPart::new()?;
    xml.start("w:styles", &[("xmlns:w", NS_W)])?;

    xml.start("w:docDefaults", &[])?;
    xml.start("w:rPrDefault", &[])?;
    xml.start("w:rPr", &[])?;
    let font = "Calibri";
    xml.empty("w:rFonts", &[("w:ascii", font), ("w:hAnsi", font), ("w:eastAsia", font), ("w:cs", font)])?;
    xml.empty("w:sz", &[("w:val", "22")])?;
    xml.empty("w:szCs", &[("w:val", "22")])?;
    xml.end("w:rPr")?;
    xml.end("w:rPrDefault")?;
    xml.start("w:pPrDefault", &[])?;
    xml.start("w:pPr", &[])?;
    let line = line_value(line_spacing.unwrap_or(1.0));
    xml.empty("w:spacing", &[("w:after", "0"), ("w:line", line.as_str()), ("w:lineRule", "auto")])?;
    xml.end("w:pPr")?;
    xml.end("w:pPrDefault")?;
    xml.end("w:docDefaults")?;

    xml.start("w:style", &[("w:type", "paragraph"), ("w:default", "1"), ("w:styleId", "Normal")])?;
    xml.empty("w:name", &[("w:val", "Normal")])?;
    xml.empty("w:qFormat", &[])?;
    xml.end("w:style")?;

    for (level, size) in [(1u8, "32"), (2, "26"), (3, "24")] {
        let id = format!("Heading{}", level);
        let name = format!("heading {}", level);
        let outline = (level - 1).to_string();
        xml.start("w:style", &[("w:type", "paragraph"), ("w:styleId", id.as_str())])?;
        xml.empty("w:name", &[("w:val", name.as_str())])?;
        xml.empty("w:basedOn", &[("w:val", "Normal")])?;
        xml.empty("w:next", &[("w:val", "Normal")])?;
        xml.empty("w:qFormat", &[])?;
        xml.start("w:pPr", &[])?;
        xml.empty("w:keepNext", &[])?;
        xml.empty("w:spacing", &[("w:before", "240"), ("w:after", "120")])?;
        xml.empty("w:outlineLvl", &[("w:val", outline.as_str())])?;
        xml.end("w:pPr")?;
        xml.start("w:rPr", &[])?;
        xml.empty("w:b", &[])?;
        xml.empty("w:color", &[("w:val", "2F5496")])?;
        xml.empty("w:sz", &[("w:val", size)])?;
        xml.empty("w:szCs", &[("w:val", size)])?;
        xml.end("w:rPr")?;
        xml.end("w:style")?;
    }

    xml.end("w:styles")?;
    Ok(xml.finish())
}

/// `word/settings.xml`
pub fn settings_part() -> Result<Vec<u8>, String> {
    let mut xml = XmlPart::new()?;
    xml.start("w:settings", &[("xmlns:w", NS_W)])?;
    xml.empty("w:defaultTabStop", &[("w:val", "720")])?;
    xml.empty("w:characterSpacingControl", &[("w:val", "doNotCompress")])?;
    xml.end("w:settings")?;
    Ok(xml.finish())
}

/// Line spacing in 240ths of a line
fn line_value(multiple: f64) -> String {
    ((multiple * 240.0).round() as i64).to_string()
}

fn half_points(points: f64) -> String {
    ((points * 2.0).round() as i64).to_string()
}

fn toggle(on: bool) -> &'static str {
    if on { "1" } else { "0" }
}
