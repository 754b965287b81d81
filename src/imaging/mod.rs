//! Image processing: the Transform Engine and its backends.
//!
//! | Operation | Backend calls |
//! |---|---|
//! | **identify** | `describe` → third line parsed for the mimetype |
//! | **auto_orient** | EXIF orientation → JPEG q100 |
//! | **crop_to_square** | orient + centred square crop → JPEG q85 |
//! | **thumbnail** | orient + triangle resize to a height → PNG |
//! | **thumbnail_gif** | Lanczos3 resize of every frame → GIF file |
//! | **watermark** | orient + size-adaptive text → JPEG q85 |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for geometry (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
pub mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageHandle};
pub use operations::{
    ImagingError, auto_orient, crop_to_square, identify, thumbnail, thumbnail_gif, watermark,
};
pub use params::{Annotation, CropRegion, EncodeFormat, Filter, Gravity, Quality};
pub use rust_backend::RustBackend;
