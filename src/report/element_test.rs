/// Tests for report elements
#[cfg(test)]
mod tests {
    use crate::docx::model::{Block, ParagraphStyle};
    use crate::docx::{Alignment, Border, Document, Inches, RgbColor};
    use crate::report::element::*;
    use crate::settings::sample_settings;
    use crate::text_format::TextRole;
    use indexmap::IndexMap;
    use std::path::Path;

    fn texts(doc: &Document) -> Vec<String> {
        doc.paragraphs().map(|p| p.text()).collect()
    }

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    #[test]
    fn test_title_applies_level_format() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        Title::new("CCRs_AEB_test_case_1", 1).render(&mut doc, &ctx).unwrap();

        let heading = doc.paragraphs().next().unwrap();
        assert_eq!(heading.style, Some(ParagraphStyle::Heading(1)));
        let props = &heading.runs[0].properties;
        assert_eq!(props.font_name.as_deref(), Some("Arial"));
        assert_eq!(props.font_size, Some(20.0));
        assert_eq!(props.bold, Some(true));
    }

    #[test]
    fn test_title_without_weight_keys_is_bold_italic() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        Title::new("Results", 2).render(&mut doc, &ctx).unwrap();

        let props = &doc.paragraphs().next().unwrap().runs[0].properties;
        assert_eq!(props.bold, Some(true));
        assert_eq!(props.italic, Some(true));
    }

    #[test]
    fn test_title_level_out_of_range_fails_without_output() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        assert!(Title::new("too deep", 4).render(&mut doc, &ctx).is_err());
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_paragraph_without_title_starts_with_blank_line() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        Paragraph::new("", "PASSED").with_role(TextRole::PositiveStatus).render(&mut doc, &ctx).unwrap();

        assert_eq!(texts(&doc), vec!["", "PASSED"]);
        let status = doc.paragraphs().nth(1).unwrap();
        assert_eq!(status.alignment, Some(Alignment::Center));
        assert_eq!(status.runs[0].properties.color, Some(RgbColor(0, 0x80, 0)));
    }

    #[test]
    fn test_paragraph_with_title_adds_level_two_heading() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        Paragraph::new("Test-Settings", "gvt: 30km/h").render(&mut doc, &ctx).unwrap();

        let paragraphs: Vec<_> = doc.paragraphs().collect();
        assert_eq!(paragraphs[0].style, Some(ParagraphStyle::Heading(2)));
        assert_eq!(paragraphs[0].text(), "Test-Settings");
        assert_eq!(paragraphs[1].alignment, Some(Alignment::Left));
        assert_eq!(paragraphs[1].runs[0].properties.font_name.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_table_cells_are_bordered_and_aligned() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        let data = vec![
            vec!["Expected Result".to_string(), "Result".to_string(), "Note".to_string()],
            vec!["speed < 5".to_string(), "Passed".to_string(), "".to_string()],
        ];
        Table::new(data).with_title("Conditions").render(&mut doc, &ctx).unwrap();

        assert_eq!(texts(&doc), vec!["Conditions"]);
        let table = doc.tables().next().unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.column_count(), 3);
        assert!(table.column_widths[0] > table.column_widths[1], "first column is widened");
        let total: f64 = table.column_widths.iter().map(|w| w.0).sum();
        assert!((total - doc.content_width().0).abs() < 1e-9);

        let first = table.cell(1, 0).unwrap();
        assert_eq!(first.border, Some(Border::default()));
        assert_eq!(first.paragraphs[0].alignment, Some(Alignment::Left));
        assert_eq!(first.paragraphs[0].line_spacing, Some(1.0));
        assert_eq!(first.paragraphs[0].runs[0].properties.font_name.as_deref(), Some("Consolas"));

        let second = table.cell(1, 1).unwrap();
        assert_eq!(second.paragraphs[0].alignment, Some(Alignment::Right));
        assert_eq!(second.text(), "Passed");

        let empty = table.cell(1, 2).unwrap();
        assert_eq!(empty.paragraphs.len(), 1);
        assert!(empty.paragraphs[0].runs.is_empty());
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        Table::new(vec![]).render(&mut doc, &ctx).unwrap();
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_condition_rows() {
        let checks = vec![
            (vec!["distance > 0".to_string(), "all".to_string()], true),
            (vec!["speed < 5".to_string()], false),
        ];
        assert_eq!(
            condition_rows(&checks),
            vec![
                vec!["Expected Result".to_string(), "Result".to_string()],
                vec!["distance > 0, all".to_string(), "Passed".to_string()],
                vec!["speed < 5".to_string(), "Failed".to_string()],
            ]
        );
    }

    #[test]
    fn test_condition_tables_heading_per_file() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        let mut result = IndexMap::new();
        result.insert("file2".to_string(), vec![(vec!["a".to_string()], true)]);
        result.insert("file1".to_string(), vec![(vec!["b".to_string()], true), (vec!["c".to_string()], false)]);
        result.insert("file3".to_string(), vec![]);
        ConditionTables::new(result).render(&mut doc, &ctx).unwrap();

        assert_eq!(texts(&doc), vec!["file2: Passed", "file1: Failed", "file3: Passed"]);
        let row_counts: Vec<usize> = doc.tables().map(|t| t.rows.len()).collect();
        assert_eq!(row_counts, vec![2, 3, 1]);
        assert!(matches!(doc.body[1], Block::Table(_)));
    }

    #[test]
    fn test_image_without_index_renders_nothing() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        Image::new("case", "").render(&mut doc, &ctx).unwrap();
        assert!(doc.body.is_empty());
    }

    #[test]
    fn test_unreadable_index_is_an_error() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let dir = tempfile::tempdir().unwrap();
        let mut doc = Document::new();

        let missing = dir.path().join("image_index.json");
        let err = Image::new("case", &missing).render(&mut doc, &ctx).unwrap_err();
        assert!(err.contains("image_index.json"), "{}", err);
    }

    #[test]
    fn test_image_index_entries_for_case() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("speed.png"), 200, 100);
        write_png(&dir.path().join("distance.png"), 100, 100);

        let index = dir.path().join("image_index.json");
        std::fs::write(
            &index,
            r#"[
                {"case_a": {"file1": ["speed.png", "distance.png"], "file2": ["speed.png"]}},
                {"case_b": {"file1": ["distance.png"]}}
            ]"#,
        )
        .unwrap();

        let mut doc = Document::new();
        Image::new("case_a", &index).render(&mut doc, &ctx).unwrap();

        let headings: Vec<String> =
            doc.paragraphs().filter(|p| p.style.is_some()).map(|p| p.text()).collect();
        assert_eq!(headings, vec!["case_a - file1", "case_a - file2"]);
        assert_eq!(doc.media().len(), 2, "the same image is embedded once");

        let pictures: Vec<_> = doc.paragraphs().filter(|p| p.style.is_none()).collect();
        assert_eq!(pictures.len(), 3);
        assert!(pictures.iter().all(|p| p.alignment == Some(Alignment::Center)));
    }

    #[test]
    fn test_image_width_defaults_to_content_width() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("wide.png"), 300, 100);
        let index = dir.path().join("index.json");
        std::fs::write(&index, r#"[{"case": {"file": ["wide.png"]}}]"#).unwrap();

        let mut doc = Document::new();
        Image::new("case", &index).render(&mut doc, &ctx).unwrap();

        let picture = doc
            .paragraphs()
            .flat_map(|p| &p.runs)
            .flat_map(|r| &r.content)
            .find_map(|c| match c {
                crate::docx::model::RunContent::Picture(p) => Some(*p),
                _ => None,
            })
            .unwrap();
        assert_eq!(picture.width, doc.content_width());
        assert!((picture.height.0 - Inches(6.5).0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_resolve_image_path_prefers_existing_path() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("beside.png"), 1, 1);

        assert_eq!(resolve_image_path(Path::new("beside.png"), dir.path()), dir.path().join("beside.png"));
        assert_eq!(resolve_image_path(Path::new("Cargo.toml"), dir.path()), Path::new("Cargo.toml"));
        assert_eq!(resolve_image_path(Path::new("nowhere.png"), dir.path()), Path::new("nowhere.png"));
    }
}
