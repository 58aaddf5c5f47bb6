//! Report composition: elements, sections and the generator.
//!
//! This module handles:
//! - Render units (titles, paragraphs, tables, images, condition tables)
//! - Document-wide setup (page geometry, header, footer, page numbers)
//! - Sections of elements, one per test case
//! - Assembling, saving and converting the document
//!
//! # Module Organization
//!
//! - `element` - The `Element` trait and its implementations
//! - `setup` - `SetupBuilder`, `GlobalSetupBuilder`, global formatting
//! - `section` - `Section` and `CaseSection`
//! - `generator` - `ReportGenerator`

mod element;
mod generator;
mod section;
mod setup;

pub use generator::{GenerateOutcome, ReportGenerator};
pub use section::CaseSection;
