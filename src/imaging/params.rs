//! Parameter types for image operations.
//!
//! These types describe *what* to do, not *how* to do it. They are the
//! interface between the Transform Engine in [`operations`](super::operations)
//! (which decides what to do to an image) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: Lossy encoding quality (1–100). Clamped on construction.
//! - [`EncodeFormat`]: Output encoding for blob extraction (JPEG with quality, or PNG).
//! - [`Filter`]: Resampling filter for resizes.
//! - [`CropRegion`]: Rectangle to keep when cropping.
//! - [`Gravity`]: Anchor point for drawn text.
//! - [`Annotation`]: Everything a text draw needs: text, font, size, opacity, gravity.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    /// Quality used when re-encoding an auto-oriented full image.
    pub const LOSSLESS_ISH: Quality = Quality(100);
    /// Quality used for cropped and watermarked full images.
    pub const STANDARD: Quality = Quality(85);

    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Encoding applied when extracting a blob from a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Jpeg(Quality),
    Png,
}

impl EncodeFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            EncodeFormat::Jpeg(_) => "image/jpeg",
            EncodeFormat::Png => "image/png",
        }
    }
}

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    /// Fast bilinear resampling, used for static thumbnails.
    Triangle,
    /// High quality resampling, used per frame for animated GIFs.
    Lanczos3,
}

/// Rectangle kept by a crop, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub width: u32,
    pub height: u32,
    pub x: u32,
    pub y: u32,
}

/// Anchor used to place drawn content within the image bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    Center,
    /// Bottom-left.
    SouthWest,
    /// Bottom, horizontally centred.
    South,
    /// Bottom-right.
    #[default]
    SouthEast,
}

/// Text to draw onto an image.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub text: String,
    pub font: PathBuf,
    /// Font size in pixels.
    pub size: f32,
    /// Fill opacity, 0.0 (invisible) to 1.0 (opaque). The fill colour is white.
    pub opacity: f32,
    pub gravity: Gravity,
}
