//! # Fotomat
//!
//! An image transformation service. Given an uploaded image and a destination
//! category, it deterministically produces a "full" artifact and a "thumbnail"
//! artifact: cropped, resized, re-encoded, auto-oriented and optionally
//! watermarked according to where the image is going.
//!
//! # Architecture: Dispatcher Over a Transform Engine
//!
//! ```text
//! request ─→ Dispatcher ─→ Plan ─→ Transform Engine ─→ ImageBackend
//!            (validate,    (branch   (identify, crop,    (decode, pixels,
//!             identify)     table)    thumbnail, ...)     encode)
//! ```
//!
//! The Dispatcher decides *what* happens from the destination category and the
//! detected format; the engine decides *how* each transform is computed; the
//! backend is the only layer that touches pixels. Each engine operation opens
//! its own handle and the handle is released when it goes out of scope, on
//! success and on every error path alike.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dispatch`] | The Dispatcher: request validation, the branch table as a [`dispatch::Plan`], artifact writes, source cleanup |
//! | [`imaging`] | The Transform Engine, its geometry, and the `image`-crate backend |
//! | [`types`] | Request and result types (`ProcessingRequest`, `Category`, `DetectedFormat`, `ArtifactPair`) |
//! | [`naming`] | Deterministic `full/` and `thumbnail/` artifact paths |
//! | [`config`] | `fotomat.toml` loading, validation and merging over stock defaults |
//! | [`output`] | CLI output: JSON status documents and batch listings |
//!
//! # Design Decisions
//!
//! ## Exact Category Matching
//!
//! Only the profile destination changes behaviour, and it is matched by exact
//! string equality on `destDir` (`"images/profile/"` by default). Forum, twitarr
//! and any other destination share one generic branch. A trailing-slash typo is
//! therefore "generic", which matches how existing clients have always been
//! served.
//!
//! ## No Rollback
//!
//! A request writes at most two files. If the second step fails, the first
//! artifact stays on disk and the upload stays where it was, so the caller can
//! retry. The partial artifacts are named in a `warn` log event.
//!
//! ## Pure-Rust Imaging
//!
//! The production backend is built on the `image` crate for decoding, EXIF
//! orientation, resampling and encoding, with `imageproc` and `ab_glyph` for
//! watermark text. There are no system libraries to install.

pub mod config;
pub mod dispatch;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod types;

pub use dispatch::{Dispatcher, ProcessError};
pub use types::{ArtifactPair, ProcessingRequest};

#[cfg(test)]
pub(crate) mod test_helpers;
