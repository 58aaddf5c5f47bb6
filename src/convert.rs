//! PDF conversion of a saved `.docx`.
//!
//! Runs an office suite in headless mode, by default
//! `soffice --headless --convert-to pdf --outdir <dir> <docx>`, with a
//! throw-away user profile so a running desktop instance does not swallow
//! the request.

use crate::settings::ConverterSettings;
use log::debug;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

/// Outcome of one conversion attempt
#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub success: bool,
    pub duration: Duration,
    /// Where the PDF is expected, whether or not it was produced
    pub pdf_path: PathBuf,
    pub stdout: String,
    pub stderr: String,
    /// Why the conversion failed, when it did
    pub error: Option<String>,
}

impl ConversionResult {
    fn failure(pdf_path: PathBuf, duration: Duration, error: String) -> Self {
        ConversionResult {
            success: false,
            duration,
            pdf_path,
            stdout: String::new(),
            stderr: String::new(),
            error: Some(error),
        }
    }
}

/// The PDF a converter writes for `docx`: same stem, same directory
pub fn pdf_path_for(docx: &Path) -> PathBuf {
    docx.with_extension("pdf")
}

/// Convert `docx` to PDF next to it.
///
/// Never panics on converter trouble: a missing executable, a non-zero
/// exit, or a clean exit that left no PDF behind all come back as a
/// failed result.
pub fn convert_to_pdf(docx: &Path, settings: &ConverterSettings) -> ConversionResult {
    let start = Instant::now();
    let pdf_path = pdf_path_for(docx);
    let out_dir = match docx.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let profile = match tempfile::Builder::new().prefix("report-generator-profile").tempdir() {
        Ok(dir) => dir,
        Err(e) => {
            let error = format!("Failed to create converter profile: {}", e);
            return ConversionResult::failure(pdf_path, start.elapsed(), error);
        }
    };
    let (mut stdout_file, mut stderr_file) = match (tempfile::tempfile(), tempfile::tempfile()) {
        (Ok(out), Ok(err)) => (out, err),
        (Err(e), _) | (_, Err(e)) => {
            let error = format!("Failed to create capture file: {}", e);
            return ConversionResult::failure(pdf_path, start.elapsed(), error);
        }
    };

    let mut cmd = Command::new(&settings.command);
    cmd.args(&settings.extra_args);
    cmd.arg(format!("-env:UserInstallation={}", file_url(profile.path())));
    cmd.arg("--headless").arg("--convert-to").arg("pdf").arg("--outdir").arg(&out_dir).arg(docx);
    cmd.stdin(Stdio::null());

    // Files rather than pipes: soffice may leave a child holding the pipe open
    let (out_handle, err_handle) = match (stdout_file.try_clone(), stderr_file.try_clone()) {
        (Ok(out), Ok(err)) => (out, err),
        (Err(e), _) | (_, Err(e)) => {
            let error = format!("Failed to capture converter output: {}", e);
            return ConversionResult::failure(pdf_path, start.elapsed(), error);
        }
    };
    cmd.stdout(Stdio::from(out_handle));
    cmd.stderr(Stdio::from(err_handle));

    debug!("Running converter: {:?}", cmd);
    let status = match cmd.status() {
        Ok(status) => status,
        Err(e) => {
            return ConversionResult::failure(
                pdf_path,
                start.elapsed(),
                format!("Failed to execute {}: {}", settings.command, e),
            );
        }
    };

    let duration = start.elapsed();
    let stdout = read_capture(&mut stdout_file);
    let stderr = read_capture(&mut stderr_file);

    let error = if !status.success() {
        Some(format!("{} exited with {}", settings.command, status))
    } else if !pdf_path.is_file() {
        Some(format!("{} finished but {} was not written", settings.command, pdf_path.display()))
    } else {
        None
    };

    debug!("Converter finished in {:?}: {}", duration, error.as_deref().unwrap_or("ok"));
    ConversionResult { success: error.is_none(), duration, pdf_path, stdout, stderr, error }
}

fn read_capture(file: &mut File) -> String {
    let mut bytes = Vec::new();
    if file.seek(SeekFrom::Start(0)).is_err() || file.read_to_end(&mut bytes).is_err() {
        return String::new();
    }
    String::from_utf8_lossy(&bytes).to_string()
}

/// `file://` URL of an absolute directory, as office suites expect for profiles.
/// Bytes outside the unreserved set are percent-encoded.
fn file_url(path: &Path) -> String {
    let path = path.display().to_string().replace('\\', "/");
    let mut url = String::from(if path.starts_with('/') { "file://" } else { "file:///" });
    for byte in path.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' | b':' => {
                url.push(char::from(byte))
            }
            other => url.push_str(&format!("%{:02X}", other)),
        }
    }
    url
}
