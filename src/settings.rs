/// Process-wide configuration store
///
/// This module handles:
/// - Loading the settings file (JSON, or TOML by extension)
/// - Validating page geometry and resolving text formats
/// - Holding the loaded settings for the rest of the run
use crate::text_format::{RawTextFormats, TextFormats, TextRole};
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

static SETTINGS: OnceLock<Settings> = OnceLock::new();

/// Everything read from the settings file
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub page: PageSettings,
    pub text_formats: TextFormats,
    pub logger: LoggerSettings,
    pub converter: ConverterSettings,
}

/// The `SETTINGS` section: page geometry and header/footer content
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageSettings {
    /// Document-wide line spacing, as a multiple of single spacing
    pub line_spacing: f64,
    pub top_margin: f64,
    pub bottom_margin: f64,
    pub left_margin: f64,
    pub right_margin: f64,
    pub page_width: f64,
    pub page_height: f64,
    pub header_text: String,
    pub footer_text: String,
    pub middle_footer_text: String,
    pub logo_path: Option<PathBuf>,
}

impl Default for PageSettings {
    fn default() -> Self {
        PageSettings {
            line_spacing: 1.0,
            top_margin: 1.0,
            bottom_margin: 1.0,
            left_margin: 1.0,
            right_margin: 1.0,
            page_width: 8.5,
            page_height: 11.0,
            header_text: String::new(),
            footer_text: String::new(),
            middle_footer_text: String::new(),
            logo_path: None,
        }
    }
}

impl PageSettings {
    /// Check that the page is usable: positive size, margins that leave room for content
    pub fn validate(&self) -> Result<(), String> {
        if self.page_width <= 0.0 || self.page_height <= 0.0 {
            return Err(format!("Page size must be positive, got {}x{} in", self.page_width, self.page_height));
        }
        if self.line_spacing <= 0.0 {
            return Err(format!("line_spacing must be positive, got {}", self.line_spacing));
        }

        let margins = [
            ("left_margin", self.left_margin, self.page_width),
            ("right_margin", self.right_margin, self.page_width),
            ("top_margin", self.top_margin, self.page_height),
            ("bottom_margin", self.bottom_margin, self.page_height),
        ];
        for (name, value, dimension) in margins {
            if value.is_nan() || value < 0.0 {
                return Err(format!("{} must not be negative, got {}", name, value));
            }
            if value >= dimension / 2.0 {
                return Err(format!("{} of {} in leaves no room on a {} in page", name, value, dimension));
            }
        }

        Ok(())
    }

    /// The configured logo, if any. An empty path counts as none.
    pub fn logo(&self) -> Option<&Path> {
        self.logo_path.as_deref().filter(|p| !p.as_os_str().is_empty())
    }
}

/// The `LOGGER` section
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub name: String,
    pub level: String,
    pub log_path: PathBuf,
    pub save_logfile: bool,
    pub disable_logger: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        LoggerSettings {
            name: "report_generator".to_string(),
            level: "info".to_string(),
            log_path: PathBuf::from("logs"),
            save_logfile: false,
            disable_logger: false,
        }
    }
}

/// The `CONVERTER` section: how the `.docx` is turned into a PDF
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConverterSettings {
    pub enabled: bool,
    pub command: String,
    pub extra_args: Vec<String>,
}

impl Default for ConverterSettings {
    fn default() -> Self {
        ConverterSettings { enabled: true, command: "soffice".to_string(), extra_args: Vec::new() }
    }
}

/// On-disk layout of the settings file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
struct SettingsFile {
    settings: PageSettings,
    text_format: RawTextFormats,
    #[serde(default)]
    logger: LoggerSettings,
    #[serde(default)]
    converter: ConverterSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsFormat {
    Json,
    Toml,
}

impl SettingsFormat {
    /// `.toml` files are TOML, everything else is JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => SettingsFormat::Toml,
            _ => SettingsFormat::Json,
        }
    }
}

/// Read and validate a settings file
pub fn load_settings(path: &Path) -> Result<Settings, String> {
    debug!("Loading settings from {:?}", path);
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read settings file {}: {}", path.display(), e))?;

    parse_settings(&content, SettingsFormat::from_path(path))
        .map_err(|e| format!("Invalid settings file {}: {}", path.display(), e))
}

/// Parse settings from already-read file content
pub fn parse_settings(content: &str, format: SettingsFormat) -> Result<Settings, String> {
    let file: SettingsFile = match format {
        SettingsFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string())?,
        SettingsFormat::Toml => toml::from_str(content).map_err(|e| e.to_string())?,
    };

    file.settings.validate()?;
    let text_formats = TextFormats::from_raw(&file.text_format)?;
    for role in TextRole::ALL {
        let format = text_formats.resolve(role)?;
        debug!(
            "{:?} format: {} {}pt bold={} italic={} color={}",
            role,
            format.font_name,
            format.font_size,
            format.bold,
            format.italic,
            format.color.hex()
        );
    }

    Ok(Settings { page: file.settings, text_formats, logger: file.logger, converter: file.converter })
}

/// Store the process-wide settings. Only the first call succeeds.
pub fn install(settings: Settings) -> Result<&'static Settings, String> {
    SETTINGS.set(settings).map_err(|_| "Settings are already installed".to_string())?;
    global()
}

/// The settings stored by [`install`]
pub fn global() -> Result<&'static Settings, String> {
    SETTINGS.get().ok_or_else(|| "Settings have not been loaded".to_string())
}

/// Settings with distinct, recognizable formats per role, for tests
#[cfg(test)]
pub fn sample_settings() -> Settings {
    let content = r#"{
        "SETTINGS": {
            "line_spacing": 1.15,
            "header_text": "Header",
            "footer_text": "Footer",
            "middle_footer_text": "Middle"
        },
        "TEXT_FORMAT": {
            "TITLE": {
                "L1": {"font_name": "Arial", "font_size": 20, "bold": "True", "italic": "False"},
                "L2": {"font_name": "Arial", "font_size": 14},
                "L3": {"font_name": "Arial", "font_size": 12, "bold": false, "italic": false}
            },
            "PARAGRAPH": {"font_name": "Calibri", "font_size": 11, "bold": false, "italic": false, "alignment": "left"},
            "POSITIVE_STATUS": {"font_size": 12, "italic": false, "color": "(00,80,00)", "alignment": "center"},
            "NEGATIVE_STATUS": {"font_size": 12, "italic": false, "color": "(C0,00,00)", "alignment": "center"},
            "CAPTION": {"font_size": 9, "bold": false, "italic": "True"},
            "TABLE": {"font_name": "Consolas", "font_size": 9, "bold": false, "italic": false, "line_spacing": 1.0},
            "HEADER": {"font_size": 10, "bold": false, "italic": false, "color": "(40,40,40)"},
            "FOOTER": {"font_size": 8, "bold": false, "italic": false}
        },
        "CONVERTER": {"enabled": false}
    }"#;
    match parse_settings(content, SettingsFormat::Json) {
        Ok(settings) => settings,
        Err(e) => panic!("sample settings are invalid: {}", e),
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;
