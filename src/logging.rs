//! Logger setup from the `LOGGER` settings.
//!
//! Records go through the `log` facade to an `env_logger` backend. Lines
//! read `time | LEVEL | file:line - message`, with the level colored on a
//! terminal. With `save_logfile` set, every line is also written, without
//! colors, to `<log_path>/<name>_<YYYYmmdd_HHMMSS>.log`.

use crate::settings::LoggerSettings;
use chrono::{DateTime, Local};
use log::{LevelFilter, Record};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;

/// Parse a level name. Accepts the `log` names plus `warning` and `critical`.
pub fn parse_level(level: &str) -> Result<LevelFilter, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "warning" => Ok(LevelFilter::Warn),
        "critical" | "fatal" => Ok(LevelFilter::Error),
        other => LevelFilter::from_str(other).map_err(|_| format!("Unknown log level '{}'", level)),
    }
}

/// Where the log file of a run started at `started` goes
pub fn log_file_path(settings: &LoggerSettings, started: DateTime<Local>) -> PathBuf {
    settings.log_path.join(format!("{}_{}.log", settings.name, started.format("%Y%m%d_%H%M%S")))
}

/// Copies everything written to stderr and a log file
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// `file:line` of a record, the target when the file is unknown
fn location(record: &Record<'_>) -> String {
    match (record.file(), record.line()) {
        (Some(file), Some(line)) => format!("{}:{}", file, line),
        (Some(file), None) => file.to_string(),
        _ => record.target().to_string(),
    }
}

/// Configure a logger without installing it.
///
/// `level_override` (from the command line) wins over the settings level;
/// `RUST_LOG` directives still apply on top. The log file, when enabled,
/// is created here and named after `started`.
pub fn builder(
    settings: &LoggerSettings,
    level_override: Option<&str>,
    started: DateTime<Local>,
) -> Result<(env_logger::Builder, Option<PathBuf>), String> {
    let mut builder = env_logger::Builder::new();

    if settings.disable_logger {
        builder.filter_level(LevelFilter::Off);
        return Ok((builder, None));
    }

    let level = parse_level(level_override.unwrap_or(&settings.level))?;
    builder.filter_level(level).parse_default_env();
    builder.format(|buf, record| {
        let style = buf.default_level_style(record.level());
        writeln!(
            buf,
            "{} | {style}{:<5}{style:#} | {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            location(record),
            record.args()
        )
    });

    let mut log_file = None;
    if settings.save_logfile {
        std::fs::create_dir_all(&settings.log_path)
            .map_err(|e| format!("Failed to create log directory {}: {}", settings.log_path.display(), e))?;
        let path = log_file_path(settings, started);
        let file = File::create(&path).map_err(|e| format!("Failed to create log file {}: {}", path.display(), e))?;
        builder.target(env_logger::Target::Pipe(Box::new(TeeWriter { file })));
        log_file = Some(path);
    }

    Ok((builder, log_file))
}

/// Install the global logger. Returns the log file path when one is written.
pub fn init(settings: &LoggerSettings, level_override: Option<&str>) -> Result<Option<PathBuf>, String> {
    let (mut builder, log_file) = builder(settings, level_override, Local::now())?;
    builder.try_init().map_err(|e| format!("Failed to initialize logger: {}", e))?;
    Ok(log_file)
}
