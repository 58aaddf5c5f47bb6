/// User interface and status output utilities
///
/// This module handles:
/// - Serialized console output
/// - Colored terminal text
/// - The end-of-run summary
use crate::report::GenerateOutcome;
use crate::types::ReportSummary;
use lazy_static::lazy_static;
use std::io::Write;
use std::sync::Mutex;

/// Execute a function with exclusive access to console output
fn status_lock<F>(f: F)
where
    F: FnOnce(),
{
    lazy_static! {
        static ref LOCK: Mutex<()> = Mutex::new(());
    }
    let _guard = LOCK.lock();
    f();
}

/// Print colored text to terminal, with fallback to plain text
fn print_color(s: &str, fg: term::color::Color) {
    if !really_print_color(s, fg) {
        print!("{}", s);
    }

    fn really_print_color(s: &str, fg: term::color::Color) -> bool {
        if let Some(ref mut t) = term::stdout() {
            if t.fg(fg).is_err() {
                return false;
            }
            let _ = t.attr(term::Attr::Bold);
            if write!(t, "{}", s).is_err() {
                return false;
            }
            let _ = t.reset();
            return true;
        }

        false
    }
}

/// Print a status message with "report: " prefix
pub fn status(s: &str) {
    status_lock(|| {
        print!("report: ");
        println!("{}", s);
    });
}

/// Print an error message with colored "error" prefix
pub fn print_error(msg: &str) {
    status_lock(|| {
        println!();
        print_color("error", term::color::BRIGHT_RED);
        println!(": {}", msg);
        println!();
    });
}

/// Print a warning with colored "warning" prefix
pub fn print_warning(msg: &str) {
    status_lock(|| {
        print_color("warning", term::color::BRIGHT_YELLOW);
        println!(": {}", msg);
    });
}

/// One line per outcome: case counts, the report, the PDF
pub fn print_summary(summary: &ReportSummary, outcome: &GenerateOutcome) {
    let counts = format!(
        "{} cases: {} passed, {} failed, {} other",
        summary.total, summary.passed, summary.failed, summary.other
    );
    status_lock(|| {
        print!("report: ");
        if summary.all_passed() {
            print_color(&counts, term::color::BRIGHT_GREEN);
        } else {
            print_color(&counts, term::color::BRIGHT_RED);
        }
        println!();
    });

    status(&format!("Report written to {}", outcome.docx_path.display()));
    match &outcome.pdf {
        Some(pdf) if pdf.success => status(&format!("PDF written to {}", pdf.pdf_path.display())),
        Some(pdf) => {
            print_warning(&format!("PDF conversion failed: {}", pdf.error.as_deref().unwrap_or("unknown error")));
            if !pdf.stderr.trim().is_empty() {
                println!("{}", pdf.stderr.trim_end());
            }
        }
        None => {}
    }
}
