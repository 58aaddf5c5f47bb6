//! Top-level report assembly: global setup, sections, save, convert.

use super::element::RenderContext;
use super::section::Section;
use super::setup::{GlobalSetupBuilder, SetupBuilder, set_global_formatting};
use crate::convert::{ConversionResult, convert_to_pdf};
use crate::docx::Document;
use crate::settings::Settings;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

const DEFAULT_TITLE: &str = "Test Report";
const CREATOR: &str = "report-generator";

/// What a `generate` call produced
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    pub docx_path: PathBuf,
    /// `None` when conversion is disabled
    pub pdf: Option<ConversionResult>,
}

impl GenerateOutcome {
    /// Conversion was attempted and did not produce a PDF
    pub fn pdf_failed(&self) -> bool {
        self.pdf.as_ref().is_some_and(|r| !r.success)
    }
}

/// Holds the sections of a report and turns them into a document
pub struct ReportGenerator<'a> {
    settings: &'a Settings,
    title: String,
    sections: Vec<Section>,
}

impl<'a> ReportGenerator<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        ReportGenerator { settings, title: DEFAULT_TITLE.to_string(), sections: Vec::new() }
    }

    /// Title stored in the document properties
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn add_section(&mut self, section: Section) {
        self.sections.push(section);
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Page geometry, line spacing, header and footer
    pub fn global_setup(&self, doc: &mut Document) -> Result<(), String> {
        let ctx = RenderContext::new(self.settings);
        set_global_formatting(doc, &self.settings.page);

        let builder = GlobalSetupBuilder::from_settings(&self.settings.page);
        builder.header_render(doc, &ctx)?.footer_render(doc, &ctx)?;
        info!("Initialize the global setup for the report.");
        Ok(())
    }

    /// Build the document, save it to `path` and convert it when enabled.
    ///
    /// A failed conversion is reported in the outcome, not as an error:
    /// the `.docx` is already on disk by then.
    pub fn generate(&self, path: &Path) -> Result<GenerateOutcome, String> {
        let ctx = RenderContext::new(self.settings);

        let mut doc = Document::new();
        doc.properties.title = self.title.clone();
        doc.properties.creator = CREATOR.to_string();
        info!("Initialize the document.");

        self.global_setup(&mut doc)?;
        info!("Global setup for the document is done.");

        for (i, section) in self.sections.iter().enumerate() {
            if section.is_empty() {
                debug!("Section {} has no elements", i + 1);
            }
            section.render(&mut doc, &ctx).map_err(|e| format!("Failed to render section {}: {}", i + 1, e))?;
        }
        info!("Render all {} sections to the document.", self.sections.len());

        doc.save(path)?;
        info!("Save the document as a docx file: {}", path.display());

        let pdf = if self.settings.converter.enabled {
            let result = convert_to_pdf(path, &self.settings.converter);
            if !result.stdout.trim().is_empty() {
                debug!("Converter output:\n{}", result.stdout.trim_end());
            }
            match &result.error {
                None => info!("Convert the docx file to PDF: {} ({:.1?})", result.pdf_path.display(), result.duration),
                Some(e) => warn!("PDF conversion failed: {}", e),
            }
            Some(result)
        } else {
            info!("PDF conversion is disabled");
            None
        };

        Ok(GenerateOutcome { docx_path: path.to_path_buf(), pdf })
    }
}
