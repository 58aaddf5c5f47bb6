// Copyright 2015 The Rust Project Developers. See the COPYRIGHT
// file at the top-level directory of this distribution and at
// http://rust-lang.org/COPYRIGHT.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

mod cli;
mod convert;
mod docx;
mod logging;
mod report;
mod settings;
mod text_format;
mod types;
mod ui;

use log::{debug, info};
use report::{CaseSection, GenerateOutcome, ReportGenerator};
use types::{ReportSummary, TestCase};

fn main() {
    // Parse CLI arguments
    let args = cli::CliArgs::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        ui::print_error(&e);
        std::process::exit(1);
    }

    // Load settings, apply overrides, store them for the whole run
    let settings = match load_and_install(&args) {
        Ok(s) => s,
        Err(e) => {
            ui::print_error(&format!("Configuration error: {}", e));
            std::process::exit(1);
        }
    };

    match logging::init(&settings.logger, args.log_level.as_deref()) {
        Ok(Some(path)) => debug!("Logging to {}", path.display()),
        Ok(None) => {}
        Err(e) => {
            ui::print_error(&format!("Failed to initialize logging: {}", e));
            std::process::exit(1);
        }
    }
    info!("Settings loaded from {}", args.config.display());

    let cases = match types::load_cases(&args.cases) {
        Ok(c) => c,
        Err(e) => {
            ui::print_error(&e);
            std::process::exit(1);
        }
    };
    info!("Loaded {} test cases from {}", cases.len(), args.cases.display());

    let outcome = match generate_report(settings, &cases, &args) {
        Ok(o) => o,
        Err(e) => {
            ui::print_error(&format!("Report generation failed: {}", e));
            std::process::exit(1);
        }
    };

    let summary = ReportSummary::from_cases(&cases);
    ui::print_summary(&summary, &outcome);

    // The .docx exists either way; a failed conversion gets its own code
    let exit_code = if outcome.pdf_failed() { 2 } else { 0 };
    std::process::exit(exit_code);
}

fn load_and_install(args: &cli::CliArgs) -> Result<&'static settings::Settings, String> {
    let mut loaded = settings::load_settings(&args.config)?;
    args.apply_overrides(&mut loaded);
    settings::install(loaded)
}

/// One section per case, then a single generate call
fn generate_report(
    settings: &settings::Settings,
    cases: &[TestCase],
    args: &cli::CliArgs,
) -> Result<GenerateOutcome, String> {
    let mut generator = ReportGenerator::new(settings);
    if let Some(title) = &args.title {
        generator = generator.with_title(title.clone());
    }
    for case in cases {
        let mut case_section = CaseSection::new(case);
        case_section.create_section();
        generator.add_section(case_section.into_section());
    }
    debug!("Generator holds {} sections", generator.section_count());

    generator.generate(&args.output)
}
