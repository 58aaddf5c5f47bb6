use crate::logging;
use crate::settings::Settings;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "report-generator")]
#[command(about = "Generate a test report (.docx, then PDF) from test results")]
#[command(version)]
pub struct CliArgs {
    /// Settings file with page settings and text formats (JSON, or TOML with a .toml extension)
    #[arg(long, short = 'c', default_value = "config.json", value_name = "PATH")]
    pub config: PathBuf,

    /// JSON file holding the list of test cases
    #[arg(long, value_name = "PATH")]
    pub cases: PathBuf,

    /// Where to write the report; the PDF lands next to it
    #[arg(long, short = 'o', default_value = "test_results/test_report.docx", value_name = "PATH")]
    pub output: PathBuf,

    /// Title stored in the document properties (default: "Test Report")
    #[arg(long, value_name = "TITLE")]
    pub title: Option<String>,

    /// Only write the .docx, skip PDF conversion
    #[arg(long)]
    pub no_pdf: bool,

    /// Converter executable used for the PDF (default: soffice, or CONVERTER.command)
    #[arg(long, value_name = "CMD")]
    pub converter: Option<String>,

    /// Log level, overriding LOGGER.level (error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        CliArgs::parse()
    }

    /// Validate arguments before anything is read or written
    pub fn validate(&self) -> Result<(), String> {
        let is_docx = self.output.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("docx"));
        if !is_docx {
            return Err(format!("Output file must end in .docx: {}", self.output.display()));
        }

        if !self.config.is_file() {
            return Err(format!("Settings file not found: {}", self.config.display()));
        }

        if !self.cases.is_file() {
            return Err(format!("Cases file not found: {}", self.cases.display()));
        }

        if let Some(level) = &self.log_level {
            logging::parse_level(level)?;
        }

        Ok(())
    }

    /// Apply command-line overrides to the loaded settings
    pub fn apply_overrides(&self, settings: &mut Settings) {
        if self.no_pdf {
            settings.converter.enabled = false;
        }
        if let Some(command) = &self.converter {
            settings.converter.command = command.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::sample_settings;
    use std::path::Path;

    fn args(dir: &Path) -> CliArgs {
        let config = dir.join("config.json");
        let cases = dir.join("cases.json");
        std::fs::write(&config, "{}").unwrap();
        std::fs::write(&cases, "[]").unwrap();
        CliArgs {
            config,
            cases,
            output: PathBuf::from("test_results/test_report.docx"),
            title: None,
            no_pdf: false,
            converter: None,
            log_level: None,
        }
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["report-generator", "--cases", "cases.json"]).unwrap();
        assert_eq!(args.config, PathBuf::from("config.json"));
        assert_eq!(args.output, PathBuf::from("test_results/test_report.docx"));
        assert!(!args.no_pdf);
    }

    #[test]
    fn test_cases_is_required() {
        assert!(CliArgs::try_parse_from(["report-generator"]).is_err());
    }

    #[test]
    fn test_validate_valid_args_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        assert!(args(dir.path()).validate().is_ok());
    }

    #[test]
    fn test_validate_requires_docx_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        args.output = PathBuf::from("report.pdf");
        assert!(args.validate().unwrap_err().contains(".docx"));

        args.output = PathBuf::from("REPORT.DOCX");
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_inputs_fail() {
        let dir = tempfile::tempdir().unwrap();
        let mut missing_config = args(dir.path());
        missing_config.config = dir.path().join("nope.json");
        assert!(missing_config.validate().unwrap_err().contains("nope.json"));

        let mut missing_cases = args(dir.path());
        missing_cases.cases = dir.path().join("no_cases.json");
        assert!(missing_cases.validate().unwrap_err().contains("no_cases.json"));
    }

    #[test]
    fn test_validate_log_level() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        args.log_level = Some("loud".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path());
        args.no_pdf = true;
        args.converter = Some("libreoffice".to_string());

        let mut settings = sample_settings();
        settings.converter.enabled = true;
        args.apply_overrides(&mut settings);
        assert!(!settings.converter.enabled);
        assert_eq!(settings.converter.command, "libreoffice");
    }
}
