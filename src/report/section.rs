//! Sections: ordered groups of elements, each ending on a page break.

use super::element::{ConditionTables, Element, Image, Paragraph, RenderContext, Title};
use crate::docx::Document;
use crate::text_format::TextRole;
use crate::types::{CaseResult, TestCase};
use log::{debug, info};

/// An ordered container of elements
#[derive(Default)]
pub struct Section {
    elements: Vec<Box<dyn Element>>,
}

impl Section {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(&mut self, element: Box<dyn Element>) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Render every element in order, then break the page
    pub fn render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<(), String> {
        for (i, element) in self.elements.iter().enumerate() {
            debug!("Rendering element {}/{} ({})", i + 1, self.len(), element.name());
            element.render(doc, ctx)?;
        }
        doc.add_page_break();
        Ok(())
    }
}

/// The section of one test case
pub struct CaseSection {
    case: TestCase,
    section: Section,
}

impl CaseSection {
    pub fn new(case: &TestCase) -> Self {
        info!("Initialize a CaseSection for case {}", case.title);
        CaseSection { case: case.clone(), section: Section::new() }
    }

    #[cfg(test)]
    pub fn title(&self) -> &str {
        &self.case.title
    }

    /// Fill the section: title, status, settings, condition tables, images
    pub fn create_section(&mut self) -> &mut Self {
        let case = &self.case;
        let section = &mut self.section;

        section.add_element(Box::new(Title::new(case.title.clone(), 1)));
        let status_role = match case.result {
            CaseResult::Passed => Some(TextRole::PositiveStatus),
            CaseResult::Failed => Some(TextRole::NegativeStatus),
            CaseResult::Other(_) => None,
        };
        if let Some(role) = status_role {
            section.add_element(Box::new(Paragraph::new("", case.result.as_str()).with_role(role)));
        }
        section.add_element(Box::new(Paragraph::new("Test-Settings", case.settings_line())));
        section.add_element(Box::new(ConditionTables::new(case.condition_result.clone())));
        section.add_element(Box::new(Image::new(case.title.clone(), case.image_path.clone())));

        info!("Create a CaseSection for case {}", case.title);
        self
    }

    #[cfg(test)]
    pub fn section(&self) -> &Section {
        &self.section
    }

    pub fn into_section(self) -> Section {
        self.section
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::RgbColor;
    use crate::docx::model::ParagraphStyle;
    use crate::settings::sample_settings;

    fn case(result: &str) -> TestCase {
        serde_json::from_value(serde_json::json!({
            "title": "CCRs_AEB_test_case_1",
            "result": result,
            "settings": {"gvt": "30km/h", "ol": "-50%", "vut": "20km/h"},
            "condition_result": {
                "file1": [[["external_relative_longitudinal_distance > 0", "all"], true]],
                "file2": [[["external_relative_longitudinal_distance > 0", "all"], false]]
            }
        }))
        .unwrap()
    }

    struct Marker(&'static str);

    impl Element for Marker {
        fn name(&self) -> &'static str {
            "marker"
        }

        fn render(&self, doc: &mut Document, _ctx: &RenderContext<'_>) -> Result<(), String> {
            doc.add_paragraph(self.0);
            Ok(())
        }
    }

    #[test]
    fn test_section_renders_in_order_then_breaks_page() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        let mut section = Section::new();
        section.add_element(Box::new(Marker("one")));
        section.add_element(Box::new(Marker("two")));
        section.render(&mut doc, &ctx).unwrap();

        let paragraphs: Vec<_> = doc.paragraphs().collect();
        assert_eq!(paragraphs.len(), 3);
        assert_eq!(paragraphs[0].text(), "one");
        assert_eq!(paragraphs[1].text(), "two");
        assert!(paragraphs[2].has_page_break());
    }

    #[test]
    fn test_empty_section_still_breaks_page() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        Section::new().render(&mut doc, &ctx).unwrap();
        assert_eq!(doc.paragraphs().filter(|p| p.has_page_break()).count(), 1);
    }

    #[test]
    fn test_passed_case_layout() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        let mut case_section = CaseSection::new(&case("PASSED"));
        case_section.create_section();
        assert_eq!(case_section.section().len(), 5);
        case_section.section().render(&mut doc, &ctx).unwrap();

        let texts: Vec<String> = doc.paragraphs().map(|p| p.text()).collect();
        assert_eq!(
            texts,
            vec![
                "CCRs_AEB_test_case_1",
                "",
                "PASSED",
                "Test-Settings",
                "gvt: 30km/h, ol: -50%, vut: 20km/h",
                "file1: Passed",
                "file2: Failed",
                "",
            ]
        );
        let title = doc.paragraphs().next().unwrap();
        assert_eq!(title.style, Some(ParagraphStyle::Heading(1)));
        let status = doc.paragraphs().nth(2).unwrap();
        assert_eq!(status.runs[0].properties.color, Some(RgbColor(0, 0x80, 0)));
        assert_eq!(doc.tables().count(), 2);
        assert!(doc.paragraphs().last().unwrap().has_page_break());
    }

    #[test]
    fn test_failed_case_uses_negative_format() {
        let settings = sample_settings();
        let ctx = RenderContext::new(&settings);
        let mut doc = Document::new();

        let mut case_section = CaseSection::new(&case("FAILED"));
        case_section.create_section().section().render(&mut doc, &ctx).unwrap();

        let status = doc.paragraphs().nth(2).unwrap();
        assert_eq!(status.text(), "FAILED");
        assert_eq!(status.runs[0].properties.color, Some(RgbColor(0xC0, 0, 0)));
    }

    #[test]
    fn test_other_result_has_no_status_paragraph() {
        let mut case_section = CaseSection::new(&case("BLOCKED"));
        case_section.create_section();
        assert_eq!(case_section.title(), "CCRs_AEB_test_case_1");
        assert_eq!(case_section.into_section().len(), 4);
    }
}
