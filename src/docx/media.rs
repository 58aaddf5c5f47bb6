//! Embedded images.

use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;

/// Image formats that can be embedded in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Bmp,
}

impl ImageKind {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpeg",
            ImageKind::Gif => "gif",
            ImageKind::Bmp => "bmp",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Bmp => "image/bmp",
        }
    }

    fn from_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Png => Some(ImageKind::Png),
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Gif => Some(ImageKind::Gif),
            ImageFormat::Bmp => Some(ImageKind::Bmp),
            _ => None,
        }
    }
}

/// Raw image bytes plus what the package needs to describe them
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub data: Vec<u8>,
    pub kind: ImageKind,
    pub pixel_width: u32,
    pub pixel_height: u32,
}

impl Media {
    /// Read an image file, sniffing its format from the content
    pub fn load(path: &Path) -> Result<Self, String> {
        let data = std::fs::read(path).map_err(|e| format!("Failed to read image {}: {}", path.display(), e))?;
        Self::from_bytes(data).map_err(|e| format!("{}: {}", path.display(), e))
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, String> {
        let format = image::guess_format(&data).map_err(|e| format!("Unrecognized image format: {}", e))?;
        let kind =
            ImageKind::from_format(format).ok_or_else(|| format!("Unsupported image format: {:?}", format))?;

        // header only, the bitmap is never decoded
        let (pixel_width, pixel_height) = ImageReader::with_format(Cursor::new(data.as_slice()), format)
            .into_dimensions()
            .map_err(|e| format!("Failed to read image dimensions: {}", e))?;
        if pixel_width == 0 || pixel_height == 0 {
            return Err("Image has no pixels".to_string());
        }

        Ok(Media { data, kind, pixel_width, pixel_height })
    }
}
