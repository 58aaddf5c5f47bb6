//! Minimal WordprocessingML (`.docx`) document model and writer.

pub mod media;
pub mod model;
pub mod package;
pub mod xml;

pub use model::{
    Alignment, Border, Document, HeaderFooter, Inches, Paragraph, RgbColor, Run, RunProperties, VerticalAlignment,
};
