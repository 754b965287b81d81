//! The Transform Engine.
//!
//! Each function opens a fresh handle on the source, performs one logical
//! transform and either returns the encoded blob or writes the result to
//! disk. Handles are dropped (and so released) on every return path.
//! Geometry comes from [`calculations`](super::calculations); pixel work is
//! delegated to the [`ImageBackend`].

use super::backend::{BackendError, ImageBackend, ImageHandle};
use super::calculations::{
    gravity_for_label, resize_within_budget, square_crop_region, thumbnail_dimensions,
    watermark_style,
};
use super::params::{Annotation, EncodeFormat, Filter, Quality};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error(transparent)]
    Backend(#[from] BackendError),
    #[error("image file not found: {}", .0.display())]
    ImageMissing(PathBuf),
    #[error("font file not found: {}", .0.display())]
    FontNotFound(PathBuf),
    #[error("could not read identify info: {0}")]
    IdentifyParse(String),
    #[error("thumbnail of {width}x{height} exceeds the resize pixel budget")]
    OutputTooLarge { width: u32, height: u32 },
}

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

fn open_existing<B: ImageBackend>(backend: &B, source: &Path) -> Result<B::Handle> {
    if !source.exists() {
        return Err(ImagingError::ImageMissing(source.to_path_buf()));
    }
    Ok(backend.open(source)?)
}

/// Return the image's mimetype, e.g. `image/jpeg`.
pub fn identify(backend: &impl ImageBackend, source: &Path) -> Result<String> {
    let handle = open_existing(backend, source)?;
    let description = handle.describe()?;
    parse_mime_type(&description)
}

/// Extract the mimetype from an identify-style description.
///
/// The third line carries `<label>: <mime>`; the value after the first colon,
/// trimmed, is the mimetype.
pub fn parse_mime_type(description: &str) -> Result<String> {
    let line = description
        .lines()
        .nth(2)
        .ok_or_else(|| ImagingError::IdentifyParse("missing mime type line".into()))?;
    let (_, value) = line
        .split_once(':')
        .ok_or_else(|| ImagingError::IdentifyParse(format!("malformed line: {line:?}")))?;
    let mime = value.trim();
    if mime.is_empty() {
        return Err(ImagingError::IdentifyParse("empty mime type".into()));
    }
    Ok(mime.to_string())
}

/// Auto-orient the image and re-encode it as JPEG at quality 100.
pub fn auto_orient(backend: &impl ImageBackend, source: &Path) -> Result<Vec<u8>> {
    let mut handle = open_existing(backend, source)?;
    handle.auto_orient()?;
    Ok(handle.encode(EncodeFormat::Jpeg(Quality::LOSSLESS_ISH))?)
}

/// Auto-orient, then crop to the largest centred square, as JPEG at quality 85.
pub fn crop_to_square(backend: &impl ImageBackend, source: &Path) -> Result<Vec<u8>> {
    let mut handle = open_existing(backend, source)?;
    handle.auto_orient()?;

    let region = square_crop_region(handle.dimensions().as_tuple());
    tracing::debug!(
        source = %source.display(),
        size = region.width,
        x = region.x,
        y = region.y,
        "cropping to square"
    );
    handle.crop(region)?;

    Ok(handle.encode(EncodeFormat::Jpeg(Quality::STANDARD))?)
}

/// Auto-orient and scale to `target_height`, preserving aspect ratio, as PNG.
pub fn thumbnail(
    backend: &impl ImageBackend,
    source: &Path,
    target_height: u32,
) -> Result<Vec<u8>> {
    let mut handle = open_existing(backend, source)?;
    handle.auto_orient()?;

    let dims = handle.dimensions().as_tuple();
    let (width, height) = thumbnail_dimensions(dims, target_height);
    if !resize_within_budget(dims, (width, height)) {
        return Err(ImagingError::OutputTooLarge { width, height });
    }
    tracing::debug!(source = %source.display(), width, height, "thumbnailing");
    handle.resize(width, height, Filter::Triangle)?;

    Ok(handle.encode(EncodeFormat::Png)?)
}

/// Scale every frame of an animation to `target_height` and write it to `destination`.
///
/// Each frame keeps its own aspect ratio. The result is written directly
/// rather than returned, since a multi-frame image is not a single blob.
pub fn thumbnail_gif(
    backend: &impl ImageBackend,
    source: &Path,
    target_height: u32,
    destination: &Path,
) -> Result<()> {
    let mut handle = open_existing(backend, source)?;
    handle.auto_orient()?;

    let frames = handle.frame_count();
    for index in 0..frames {
        let dims = handle.frame_dimensions(index).ok_or_else(|| {
            BackendError::ProcessingFailed(format!("frame {index} of {frames} missing"))
        })?;
        let (width, height) = thumbnail_dimensions(dims.as_tuple(), target_height);
        if !resize_within_budget(dims.as_tuple(), (width, height)) {
            return Err(ImagingError::OutputTooLarge { width, height });
        }
        handle.resize_frame(index, width, height, Filter::Lanczos3)?;
    }
    tracing::debug!(
        source = %source.display(),
        destination = %destination.display(),
        frames,
        "resized animation"
    );

    Ok(handle.write_frames(destination)?)
}

/// Draw `text` over the auto-oriented image and re-encode as JPEG at quality 85.
///
/// `gravity` is a request label (`Center`, `BottomLeft`, `Bottom`); anything
/// else anchors bottom-right. Font size and opacity follow the image width,
/// see [`watermark_style`].
pub fn watermark(
    backend: &impl ImageBackend,
    source: &Path,
    text: &str,
    gravity: Option<&str>,
    font: &Path,
) -> Result<Vec<u8>> {
    if !font.exists() {
        return Err(ImagingError::FontNotFound(font.to_path_buf()));
    }
    let gravity = gravity_for_label(gravity);

    let mut handle = open_existing(backend, source)?;
    handle.auto_orient()?;

    let style = watermark_style(handle.dimensions().width);
    tracing::debug!(
        source = %source.display(),
        ?gravity,
        font_size = style.font_size,
        opacity = style.opacity,
        "watermarking"
    );
    handle.draw_text(&Annotation {
        text: text.to_string(),
        font: font.to_path_buf(),
        size: style.font_size,
        opacity: style.opacity,
        gravity,
    })?;

    Ok(handle.encode(EncodeFormat::Jpeg(Quality::STANDARD))?)
}
