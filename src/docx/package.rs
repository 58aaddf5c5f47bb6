//! `.docx` packaging: decides which parts exist, wires their
//! relationships and zips them.

use super::media::Media;
use super::model::{Document, MediaId};
use super::xml::{self, ContentWriter, XmlPart};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CORE: &str = "http://schemas.openxmlformats.org/package/2006/metadata/core-properties";
const NS_APP: &str = "http://schemas.openxmlformats.org/officeDocument/2006/extended-properties";

const REL_OFFICE_DOCUMENT: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_CORE: &str = "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const REL_SETTINGS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
const REL_HEADER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/header";
const REL_FOOTER: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
const REL_IMAGE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

const CT_DOCUMENT: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml";
const CT_SETTINGS: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";
const CT_HEADER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.header+xml";
const CT_FOOTER: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";
const CT_RELATIONSHIPS: &str = "application/vnd.openxmlformats-package.relationships+xml";

const HEADER_REL_ID: &str = "rId3";
const FOOTER_REL_ID: &str = "rId4";

/// Write `doc` to `path`, creating parent directories as needed
pub fn save(doc: &Document, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create directory {}: {}", parent.display(), e))?;
    }

    let file = File::create(path).map_err(|e| format!("Failed to create {}: {}", path.display(), e))?;
    let mut out = write_package(doc, BufWriter::new(file))?;
    out.flush().map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;

    debug!("Saved {} ({} embedded images)", path.display(), doc.media().len());
    Ok(())
}

/// Zip every part of `doc` into `out` and hand the writer back
pub fn write_package<W: Write + Seek>(doc: &Document, out: W) -> Result<W, String> {
    let media = doc.media();
    let mut content = ContentWriter::new(media);

    let document = content.document_part(
        doc,
        doc.header.as_ref().map(|_| HEADER_REL_ID),
        doc.footer.as_ref().map(|_| FOOTER_REL_ID),
    )?;
    let header = match &doc.header {
        Some(h) => Some((content.header_footer_part("w:hdr", h)?, xml::collect_media(&h.blocks))),
        None => None,
    };
    let footer = match &doc.footer {
        Some(f) => Some((content.header_footer_part("w:ftr", f)?, xml::collect_media(&f.blocks))),
        None => None,
    };

    let mut parts: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
    parts.insert("[Content_Types].xml", content_types_part(doc)?);
    parts.insert("_rels/.rels", package_rels_part()?);
    parts.insert("docProps/core.xml", core_part(doc)?);
    parts.insert("docProps/app.xml", app_part()?);
    parts.insert("word/document.xml", document);
    parts.insert("word/styles.xml", xml::styles_part(doc.line_spacing)?);
    parts.insert("word/settings.xml", xml::settings_part()?);
    parts.insert("word/_rels/document.xml.rels", document_rels_part(doc, &xml::collect_media(&doc.body))?);
    if let Some((data, used)) = header {
        parts.insert("word/header1.xml", data);
        parts.insert("word/_rels/header1.xml.rels", media_rels_part(media, &used, &[])?);
    }
    if let Some((data, used)) = footer {
        parts.insert("word/footer1.xml", data);
        parts.insert("word/_rels/footer1.xml.rels", media_rels_part(media, &used, &[])?);
    }

    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    let mut zip = ZipWriter::new(out);
    for (name, data) in &parts {
        zip.start_file(*name, options).map_err(|e| format!("Failed to add {}: {}", name, e))?;
        zip.write_all(data).map_err(|e| format!("Failed to write {}: {}", name, e))?;
    }
    for (index, item) in media.iter().enumerate() {
        let name = format!("word/{}", xml::media_target(MediaId(index), item));
        zip.start_file(name.as_str(), options).map_err(|e| format!("Failed to add {}: {}", name, e))?;
        zip.write_all(&item.data).map_err(|e| format!("Failed to write {}: {}", name, e))?;
    }

    zip.finish().map_err(|e| format!("Failed to finish package: {}", e))
}

fn content_types_part(doc: &Document) -> Result<Vec<u8>, String> {
    let mut xml = XmlPart::new()?;
    xml.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    xml.empty("Default", &[("Extension", "rels"), ("ContentType", CT_RELATIONSHIPS)])?;
    xml.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;

    let image_types: BTreeSet<(&str, &str)> =
        doc.media().iter().map(|m| (m.kind.extension(), m.kind.content_type())).collect();
    for (extension, content_type) in image_types {
        xml.empty("Default", &[("Extension", extension), ("ContentType", content_type)])?;
    }

    let mut overrides = vec![
        ("/word/document.xml", CT_DOCUMENT),
        ("/word/styles.xml", CT_STYLES),
        ("/word/settings.xml", CT_SETTINGS),
    ];
    if doc.header.is_some() {
        overrides.push(("/word/header1.xml", CT_HEADER));
    }
    if doc.footer.is_some() {
        overrides.push(("/word/footer1.xml", CT_FOOTER));
    }
    overrides.push(("/docProps/core.xml", CT_CORE));
    overrides.push(("/docProps/app.xml", CT_APP));
    for (part, content_type) in overrides {
        xml.empty("Override", &[("PartName", part), ("ContentType", content_type)])?;
    }

    xml.end("Types")?;
    Ok(xml.finish())
}

fn relationship(xml: &mut XmlPart, id: &str, kind: &str, target: &str) -> Result<(), String> {
    xml.empty("Relationship", &[("Id", id), ("Type", kind), ("Target", target)])
}

fn package_rels_part() -> Result<Vec<u8>, String> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELATIONSHIPS)])?;
    relationship(&mut xml, "rId1", REL_OFFICE_DOCUMENT, "word/document.xml")?;
    relationship(&mut xml, "rId2", REL_CORE, "docProps/core.xml")?;
    relationship(&mut xml, "rId3", REL_APP, "docProps/app.xml")?;
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn document_rels_part(doc: &Document, used: &BTreeSet<MediaId>) -> Result<Vec<u8>, String> {
    let mut fixed = vec![("rId1", REL_STYLES, "styles.xml"), ("rId2", REL_SETTINGS, "settings.xml")];
    if doc.header.is_some() {
        fixed.push((HEADER_REL_ID, REL_HEADER, "header1.xml"));
    }
    if doc.footer.is_some() {
        fixed.push((FOOTER_REL_ID, REL_FOOTER, "footer1.xml"));
    }
    media_rels_part(doc.media(), used, &fixed)
}

/// Relationship part listing `fixed` entries followed by the images in `used`
fn media_rels_part(
    media: &[Media],
    used: &BTreeSet<MediaId>,
    fixed: &[(&str, &str, &str)],
) -> Result<Vec<u8>, String> {
    let mut xml = XmlPart::new()?;
    xml.start("Relationships", &[("xmlns", NS_RELATIONSHIPS)])?;
    for (id, kind, target) in fixed {
        relationship(&mut xml, id, kind, target)?;
    }
    for id in used {
        let item = media.get(id.0).ok_or_else(|| format!("Unknown media #{}", id.0))?;
        relationship(&mut xml, &xml::media_rel_id(*id), REL_IMAGE, &xml::media_target(*id, item))?;
    }
    xml.end("Relationships")?;
    Ok(xml.finish())
}

fn core_part(doc: &Document) -> Result<Vec<u8>, String> {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let w3cdtf = [("xsi:type", "dcterms:W3CDTF")];

    let mut xml = XmlPart::new()?;
    xml.start(
        "cp:coreProperties",
        &[
            ("xmlns:cp", NS_CORE),
            ("xmlns:dc", "http://purl.org/dc/elements/1.1/"),
            ("xmlns:dcterms", "http://purl.org/dc/terms/"),
            ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
        ],
    )?;
    xml.text_element("dc:title", &[], &doc.properties.title)?;
    xml.text_element("dc:creator", &[], &doc.properties.creator)?;
    xml.text_element("cp:lastModifiedBy", &[], &doc.properties.creator)?;
    xml.text_element("dcterms:created", &w3cdtf, &now)?;
    xml.text_element("dcterms:modified", &w3cdtf, &now)?;
    xml.end("cp:coreProperties")?;
    Ok(xml.finish())
}

fn app_part() -> Result<Vec<u8>, String> {
    let application = format!("report-generator {}", env!("CARGO_PKG_VERSION"));
    let mut xml = XmlPart::new()?;
    xml.start("Properties", &[("xmlns", NS_APP)])?;
    xml.text_element("Application", &[], &application)?;
    xml.end("Properties")?;
    Ok(xml.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::model::Inches;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn read_part(bytes: &[u8], name: &str) -> Option<String> {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).ok()?;
        let mut s = String::new();
        file.read_to_string(&mut s).unwrap();
        Some(s)
    }

    fn package(doc: &Document) -> Vec<u8> {
        write_package(doc, Cursor::new(Vec::new())).unwrap().into_inner()
    }

    fn write_png(dir: &Path, name: &str) -> std::path::PathBuf {
        let path = dir.join(name);
        image::RgbImage::new(20, 10).save(&path).unwrap();
        path
    }

    #[test]
    fn test_minimal_package_parts() {
        let mut doc = Document::new();
        doc.properties.title = "Smoke".to_string();
        doc.add_paragraph("hello");
        let bytes = package(&doc);

        let types = read_part(&bytes, "[Content_Types].xml").unwrap();
        assert!(types.contains("PartName=\"/word/document.xml\""));
        assert!(!types.contains("header1.xml"));

        let rels = read_part(&bytes, "word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains("Target=\"styles.xml\""));
        assert!(!rels.contains("header1.xml"));

        assert!(read_part(&bytes, "word/document.xml").unwrap().contains(">hello</w:t>"));
        assert!(read_part(&bytes, "docProps/core.xml").unwrap().contains("<dc:title>Smoke</dc:title>"));
        assert!(read_part(&bytes, "word/header1.xml").is_none());
    }

    #[test]
    fn test_header_footer_and_media_relationships() {
        let dir = tempfile::tempdir().unwrap();
        let logo = write_png(dir.path(), "logo.png");
        let chart = write_png(dir.path(), "chart.png");

        let mut doc = Document::new();
        let picture = doc.picture(&logo, Some(Inches(1.0)), None).unwrap();
        let header = doc.header_mut().add_paragraph("");
        header.runs.push({
            let mut run = crate::docx::model::Run::new();
            run.add_picture(picture);
            run
        });
        doc.footer_mut().add_paragraph("footer");
        doc.add_picture(&chart, None, None).unwrap();

        let bytes = package(&doc);
        let types = read_part(&bytes, "[Content_Types].xml").unwrap();
        assert_eq!(types.matches("Extension=\"png\"").count(), 1);
        assert!(types.contains("/word/header1.xml"));
        assert!(types.contains("/word/footer1.xml"));

        let doc_rels = read_part(&bytes, "word/_rels/document.xml.rels").unwrap();
        assert!(doc_rels.contains("Id=\"rId3\""));
        assert!(doc_rels.contains("Target=\"media/image2.png\""));
        assert!(!doc_rels.contains("media/image1.png"));

        let header_rels = read_part(&bytes, "word/_rels/header1.xml.rels").unwrap();
        assert!(header_rels.contains("Id=\"rIdImg1\""));
        assert!(read_part(&bytes, "word/_rels/footer1.xml.rels").is_some());

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        assert!(archive.by_name("word/media/image1.png").is_ok());
        assert!(archive.by_name("word/media/image2.png").is_ok());
    }

    #[test]
    fn test_save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out").join("report.docx");
        let mut doc = Document::new();
        doc.add_paragraph("saved");
        doc.save(&path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(read_part(&bytes, "word/document.xml").unwrap().contains("saved"));
    }
}
