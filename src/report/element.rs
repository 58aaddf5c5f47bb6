//! Render units applied against a mutable document.

use crate::docx::{Alignment, Border, Document, Inches};
use crate::settings::Settings;
use crate::text_format::{TextFormat, TextFormats, TextRole};
use crate::types::ConditionCheck;
use indexmap::IndexMap;
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// Share of the table width given to the first column, relative to each other column
const FIRST_COLUMN_WEIGHT: f64 = 3.0;

/// What elements can see while rendering
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub settings: &'a Settings,
}

impl<'a> RenderContext<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        RenderContext { settings }
    }

    pub fn formats(&self) -> &'a TextFormats {
        &self.settings.text_formats
    }

    pub fn format(&self, role: TextRole) -> Result<&'a TextFormat, String> {
        self.formats().resolve(role)
    }
}

/// A polymorphic piece of report content
pub trait Element {
    /// Short name for logs
    fn name(&self) -> &'static str;

    fn render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<(), String>;
}

/// A heading formatted with its level's title format
#[derive(Debug, Clone, PartialEq)]
pub struct Title {
    pub text: String,
    pub level: u8,
}

impl Title {
    pub fn new(text: impl Into<String>, level: u8) -> Self {
        Title { text: text.into(), level }
    }
}

impl Element for Title {
    fn name(&self) -> &'static str {
        "title"
    }

    fn render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<(), String> {
        let format = ctx.format(TextRole::Title(self.level))?;
        let heading = doc.add_heading(&self.text, self.level);
        if let Some(run) = heading.first_run_mut() {
            format.apply_format(&mut run.properties);
        }
        Ok(())
    }
}

/// Body text, optionally introduced by a level-2 heading
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub title: String,
    pub text: String,
    pub role: TextRole,
}

impl Paragraph {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Paragraph { title: title.into(), text: text.into(), role: TextRole::Paragraph }
    }

    pub fn with_role(mut self, role: TextRole) -> Self {
        self.role = role;
        self
    }
}

impl Element for Paragraph {
    fn name(&self) -> &'static str {
        "paragraph"
    }

    fn render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<(), String> {
        let format = ctx.format(self.role)?;
        debug!("Paragraph '{}' in {} format", self.title, self.role.as_str());

        if self.title.is_empty() {
            doc.add_empty_paragraph();
        } else {
            doc.add_heading(&self.title, 2);
        }

        let p = doc.add_paragraph(&self.text);
        if let Some(run) = p.first_run_mut() {
            format.apply_format(&mut run.properties);
        }
        p.alignment = Some(format.alignment);
        Ok(())
    }
}

/// Image index file: a list of `{case: {file: [image paths]}}` objects
type ImageIndex = Vec<IndexMap<String, IndexMap<String, Vec<PathBuf>>>>;

/// Images of one case, looked up in an image index file
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    pub case_name: String,
    pub index_path: PathBuf,
    /// Width in inches; the content width when unset
    pub width: Option<f64>,
    /// Height in inches; follows the aspect ratio when unset
    pub height: Option<f64>,
}

impl Image {
    pub fn new(case_name: impl Into<String>, index_path: impl Into<PathBuf>) -> Self {
        Image { case_name: case_name.into(), index_path: index_path.into(), width: None, height: None }
    }

    fn read_index(&self) -> Result<ImageIndex, String> {
        let content = std::fs::read_to_string(&self.index_path)
            .map_err(|e| format!("Failed to read image index {}: {}", self.index_path.display(), e))?;
        serde_json::from_str(&content)
            .map_err(|e| format!("Invalid image index {}: {}", self.index_path.display(), e))
    }
}

impl Element for Image {
    fn name(&self) -> &'static str {
        "image"
    }

    fn render(&self, doc: &mut Document, _ctx: &RenderContext<'_>) -> Result<(), String> {
        if self.index_path.as_os_str().is_empty() {
            debug!("No image index for case '{}'", self.case_name);
            return Ok(());
        }

        let index = self.read_index()?;
        let index_dir = self.index_path.parent().unwrap_or(Path::new(""));
        let width = self.width.map(Inches).unwrap_or_else(|| doc.content_width());
        let height = self.height.map(Inches);

        for entry in &index {
            let Some(files) = entry.get(&self.case_name) else {
                continue;
            };
            for (file_name, images) in files {
                let heading = doc.add_heading(&format!("{} - {}", self.case_name, file_name), 2);
                heading.alignment = Some(Alignment::Left);

                for image in images {
                    let path = resolve_image_path(image, index_dir);
                    debug!("Adding image {:?} for {} - {}", path, self.case_name, file_name);
                    let p = doc.add_picture(&path, Some(width), height)?;
                    p.alignment = Some(Alignment::Center);
                }
            }
        }
        Ok(())
    }
}

/// Resolve an image path from an index: as given when it exists (relative
/// to the working directory), else relative to the index file
pub fn resolve_image_path(image: &Path, index_dir: &Path) -> PathBuf {
    if image.is_absolute() || image.exists() {
        return image.to_path_buf();
    }
    let beside_index = index_dir.join(image);
    if beside_index.exists() { beside_index } else { image.to_path_buf() }
}

/// A bordered data table in the table format
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub title: Option<String>,
    pub data: Vec<Vec<String>>,
}

impl Table {
    pub fn new(data: Vec<Vec<String>>) -> Self {
        Table { title: None, data }
    }

    #[cfg(test)]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Element for Table {
    fn name(&self) -> &'static str {
        "table"
    }

    fn render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<(), String> {
        let format = ctx.format(TextRole::Table)?;

        if let Some(title) = self.title.as_deref().filter(|t| !t.is_empty()) {
            doc.add_heading(title, 2);
        }

        let rows = self.data.len();
        let cols = self.data.first().map(Vec::len).unwrap_or(0);
        if rows == 0 || cols == 0 {
            debug!("Skipping empty table");
            return Ok(());
        }

        let width = doc.content_width();
        let table = doc.add_table(rows, cols, width);

        // widen the first column
        let unit = width.0 / (FIRST_COLUMN_WEIGHT + (cols - 1) as f64);
        if cols > 1 {
            table.set_column_width(0, Inches(unit * FIRST_COLUMN_WEIGHT));
            for col in 1..cols {
                table.set_column_width(col, Inches(unit));
            }
        }

        for (i, row_data) in self.data.iter().enumerate() {
            if row_data.len() > cols {
                warn!("Table row {} has {} cells, only the first {} are shown", i, row_data.len(), cols);
            }
            for (j, value) in row_data.iter().take(cols).enumerate() {
                let cell = &mut table.rows[i][j];
                cell.border = Some(Border::default());
                cell.clear_content();

                let p = cell.add_paragraph(value);
                p.line_spacing = Some(format.line_spacing);
                p.alignment = Some(if j == 0 { Alignment::Left } else { Alignment::Right });
                if let Some(run) = p.first_run_mut() {
                    format.apply_format(&mut run.properties);
                }
            }
        }
        Ok(())
    }
}

/// One pass/fail table per recorded file
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionTables {
    pub condition_result: IndexMap<String, Vec<ConditionCheck>>,
}

impl ConditionTables {
    pub fn new(condition_result: IndexMap<String, Vec<ConditionCheck>>) -> Self {
        ConditionTables { condition_result }
    }
}

/// Header row followed by one `[conditions, verdict]` row per check
pub fn condition_rows(checks: &[ConditionCheck]) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Expected Result".to_string(), "Result".to_string()]];
    rows.extend(checks.iter().map(|(conditions, passed)| vec![conditions.join(", "), verdict(*passed).to_string()]));
    rows
}

fn verdict(passed: bool) -> &'static str {
    if passed { "Passed" } else { "Failed" }
}

impl Element for ConditionTables {
    fn name(&self) -> &'static str {
        "condition tables"
    }

    fn render(&self, doc: &mut Document, ctx: &RenderContext<'_>) -> Result<(), String> {
        for (file, checks) in &self.condition_result {
            let passed = checks.iter().all(|(_, ok)| *ok);
            doc.add_heading(&format!("{}: {}", file, verdict(passed)), 2);
            Table::new(condition_rows(checks)).render(doc, ctx)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;
