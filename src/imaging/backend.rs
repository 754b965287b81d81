//! Image processing backend traits and shared types.
//!
//! The [`ImageBackend`] trait is the narrow capability the Transform Engine
//! calls through: it opens an image file and hands back an [`ImageHandle`].
//! Every pixel operation (orient, crop, resize, draw, encode) is a method on
//! the handle. Closing is the handle's `Drop`, so backend resources are
//! released on every exit path, early `?` returns included.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! and `imageproc` crates.

use super::params::{Annotation, CropRegion, EncodeFormat, Filter};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("can't get image from backend: {0}")]
    Extraction(String),
    #[error("failed to load font {path}: {reason}")]
    FontLoad { path: PathBuf, reason: String },
}

/// Pixel dimensions of an image or frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image processing backends.
///
/// A backend is stateless; all per-image state lives in the handle it opens.
pub trait ImageBackend: Sync {
    type Handle: ImageHandle;

    /// Decode the image at `path` into a fresh handle.
    fn open(&self, path: &Path) -> Result<Self::Handle, BackendError>;
}

/// An open, decoded image. Dropping the handle releases it.
///
/// Multi-frame images (animated GIFs) carry every frame; single-frame
/// operations act on all frames, per-frame operations take an index.
pub trait ImageHandle {
    /// Identify-style description. Line index 2 is `Mime type: <mime>`.
    fn describe(&self) -> Result<String, BackendError>;

    /// Apply the stored orientation so the logical top-left is the stored top-left.
    fn auto_orient(&mut self) -> Result<(), BackendError>;

    /// Dimensions of the first frame.
    fn dimensions(&self) -> Dimensions;

    fn frame_count(&self) -> usize;

    fn frame_dimensions(&self, index: usize) -> Option<Dimensions>;

    fn crop(&mut self, region: CropRegion) -> Result<(), BackendError>;

    /// Resize every frame to exactly `width` x `height`.
    fn resize(&mut self, width: u32, height: u32, filter: Filter) -> Result<(), BackendError>;

    /// Resize a single frame to exactly `width` x `height`.
    fn resize_frame(
        &mut self,
        index: usize,
        width: u32,
        height: u32,
        filter: Filter,
    ) -> Result<(), BackendError>;

    /// Encode the first frame and return the blob.
    fn encode(&self, format: EncodeFormat) -> Result<Vec<u8>, BackendError>;

    /// Write all frames to `path` as a looping GIF. Fails for non-GIF sources.
    fn write_frames(&self, path: &Path) -> Result<(), BackendError>;

    fn draw_text(&mut self, annotation: &Annotation) -> Result<(), BackendError>;
}
