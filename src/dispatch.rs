//! The Dispatcher: request → plan → engine calls → artifacts on disk.
//!
//! ## Branch Table
//!
//! | category | format | full | thumbnail |
//! |---|---|---|---|
//! | profile | GIF | rejected (400) | |
//! | profile | other | square crop, JPEG q85 | thumbnail of the cropped JPEG, PNG |
//! | generic | GIF | source moved unchanged | per-frame resize, GIF |
//! | generic | other | watermark or auto-orient, JPEG | thumbnail, PNG |
//!
//! The branch is chosen as a [`Plan`] before anything touches the
//! filesystem, so a rejected request leaves no trace. Heights above
//! `processing.max_thumbnail_height` are rejected up front, and the engine
//! refuses any resize over its pixel budget. Once a plan runs, the
//! uploaded source is removed on success and left in place on failure.
//! Artifacts already written by a failed request are not rolled back; they
//! are reported in a `warn` event.

use crate::config::ServiceConfig;
use crate::imaging::ImageBackend;
use crate::imaging::operations::{self, ImagingError};
use crate::naming::{ArtifactKind, OutputLayout, Slot, validate_dest_dir};
use crate::types::{ArtifactPair, Category, DetectedFormat, ProcessingRequest};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("image not found at imageURL: {}", .0.display())]
    InputNotFound(PathBuf),
    #[error("profile image must be JPEG or PNG")]
    InvalidFormat,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Imaging(#[from] ImagingError),
}

impl ProcessError {
    /// HTTP-style status: 400 for bad requests, 500 for everything else.
    pub fn status_code(&self) -> u16 {
        match self {
            ProcessError::InputNotFound(_)
            | ProcessError::InvalidFormat
            | ProcessError::InvalidRequest(_)
            | ProcessError::Imaging(ImagingError::OutputTooLarge { .. }) => 400,
            ProcessError::Io(_) | ProcessError::Imaging(_) => 500,
        }
    }
}

/// Watermark settings carried by the generic plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Watermark {
    pub text: String,
    pub gravity: Option<String>,
}

/// One row of the branch table.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Square-crop to a JPEG, then thumbnail the written JPEG.
    ProfileCrop,
    /// Resize every frame into the thumbnail, move the source to `full/`.
    AnimatedThumbnail,
    /// PNG thumbnail, then a JPEG that is watermarked or just auto-oriented.
    Generic { watermark: Option<Watermark> },
}

impl Plan {
    pub fn select(
        category: Category,
        format: &DetectedFormat,
        request: &ProcessingRequest,
    ) -> Result<Plan, ProcessError> {
        match (category, format) {
            (Category::Profile, DetectedFormat::Gif) => Err(ProcessError::InvalidFormat),
            (Category::Profile, _) => Ok(Plan::ProfileCrop),
            (_, DetectedFormat::Gif) => Ok(Plan::AnimatedThumbnail),
            _ => Ok(Plan::Generic {
                watermark: request.watermark.as_ref().map(|text| Watermark {
                    text: text.clone(),
                    gravity: request.gravity.clone(),
                }),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Plan::ProfileCrop => "profile",
            Plan::AnimatedThumbnail => "gif",
            Plan::Generic { watermark: Some(_) } => "watermark",
            Plan::Generic { watermark: None } => "generic",
        }
    }
}

/// Runs requests against an [`ImageBackend`].
pub struct Dispatcher<B: ImageBackend> {
    backend: B,
    work_dir: PathBuf,
    profile_dir: String,
    font: PathBuf,
    max_thumbnail_height: u32,
}

impl<B: ImageBackend> Dispatcher<B> {
    pub fn new(backend: B, config: &ServiceConfig) -> Self {
        Self {
            backend,
            work_dir: config.work_dir.clone(),
            profile_dir: config.categories.profile.clone(),
            font: config.font_path(),
            max_thumbnail_height: config.processing.max_thumbnail_height,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mimetype of the image at `path`.
    pub fn identify(&self, path: &Path) -> Result<String, ProcessError> {
        Ok(operations::identify(&self.backend, path)?)
    }

    /// Process one request, returning where its artifacts were written.
    pub fn process(&self, request: &ProcessingRequest) -> Result<ArtifactPair, ProcessError> {
        let source = request.source();
        let span = tracing::info_span!(
            "process",
            dest_dir = %request.dest_dir,
            source = %source.display(),
        );
        let _enter = span.enter();

        if !source.exists() {
            return Err(ProcessError::InputNotFound(source.to_path_buf()));
        }
        if request.height == 0 {
            return Err(ProcessError::InvalidRequest(
                "height must be at least 1".into(),
            ));
        }
        if request.height > self.max_thumbnail_height {
            return Err(ProcessError::InvalidRequest(format!(
                "height {} exceeds the limit of {}",
                request.height, self.max_thumbnail_height
            )));
        }
        validate_dest_dir(&request.dest_dir).map_err(ProcessError::InvalidRequest)?;
        let layout = OutputLayout::new(&self.work_dir, &request.dest_dir, source).ok_or_else(
            || ProcessError::InvalidRequest(format!("imageURL has no file name: {}", source.display())),
        )?;

        let mime = self.identify(source)?;
        let format = DetectedFormat::from_mime(&mime);
        let category = Category::from_dest_dir(&request.dest_dir, &self.profile_dir);
        let plan = Plan::select(category, &format, request)?;
        tracing::debug!(%mime, ?category, plan = plan.name(), "selected plan");

        layout.ensure_dirs()?;
        let mut written = Vec::new();
        match self.execute(&plan, source, request.height, &layout, &mut written) {
            Ok(artifacts) => {
                if source.exists() {
                    fs::remove_file(source)?;
                }
                tracing::info!(
                    plan = plan.name(),
                    full = %artifacts.full.display(),
                    thumbnail = %artifacts.thumbnail.display(),
                    "processed"
                );
                Ok(artifacts)
            }
            Err(err) => {
                if !written.is_empty() {
                    tracing::warn!(
                        plan = plan.name(),
                        error = %err,
                        written = ?written,
                        "request failed after writing artifacts"
                    );
                }
                Err(err)
            }
        }
    }

    fn execute(
        &self,
        plan: &Plan,
        source: &Path,
        height: u32,
        layout: &OutputLayout,
        written: &mut Vec<PathBuf>,
    ) -> Result<ArtifactPair, ProcessError> {
        match plan {
            Plan::ProfileCrop => {
                let full = layout.path(Slot::Full, ArtifactKind::Jpeg);
                let cropped = operations::crop_to_square(&self.backend, source)?;
                write_artifact(&full, &cropped, written)?;

                let thumbnail = layout.path(Slot::Thumbnail, ArtifactKind::Png);
                let thumb = operations::thumbnail(&self.backend, &full, height)?;
                write_artifact(&thumbnail, &thumb, written)?;
                Ok(ArtifactPair { full, thumbnail })
            }
            Plan::AnimatedThumbnail => {
                let thumbnail = layout.path(Slot::Thumbnail, ArtifactKind::Gif);
                operations::thumbnail_gif(&self.backend, source, height, &thumbnail)?;
                written.push(thumbnail.clone());

                let full = layout.path(Slot::Full, ArtifactKind::Gif);
                relocate(source, &full)?;
                written.push(full.clone());
                Ok(ArtifactPair { full, thumbnail })
            }
            Plan::Generic { watermark } => {
                let thumbnail = layout.path(Slot::Thumbnail, ArtifactKind::Png);
                let thumb = operations::thumbnail(&self.backend, source, height)?;
                write_artifact(&thumbnail, &thumb, written)?;

                let full = layout.path(Slot::Full, ArtifactKind::Jpeg);
                let blob = match watermark {
                    Some(mark) => operations::watermark(
                        &self.backend,
                        source,
                        &mark.text,
                        mark.gravity.as_deref(),
                        &self.font,
                    )?,
                    None => operations::auto_orient(&self.backend, source)?,
                };
                write_artifact(&full, &blob, written)?;
                Ok(ArtifactPair { full, thumbnail })
            }
        }
    }
}

fn write_artifact(path: &Path, bytes: &[u8], written: &mut Vec<PathBuf>) -> std::io::Result<()> {
    fs::write(path, bytes)?;
    written.push(path.to_path_buf());
    Ok(())
}

/// Move `from` to `to`, copying when a rename cannot cross filesystems.
fn relocate(from: &Path, to: &Path) -> std::io::Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::Dimensions;
    use crate::imaging::backend::tests::{MockBackend, MockImage, RecordedOp};
    use crate::imaging::params::{EncodeFormat, Filter, Quality};
    use crate::imaging::RustBackend;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    fn config_for(tmp: &TempDir) -> ServiceConfig {
        ServiceConfig {
            work_dir: tmp.path().to_path_buf(),
            ..ServiceConfig::default()
        }
    }

    /// Source upload outside the work tree, registered with the mock.
    fn upload(tmp: &TempDir, backend: &MockBackend, name: &str, image: MockImage) -> PathBuf {
        let dir = tmp.path().join("uploads");
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, b"").unwrap();
        backend.register(&path, image);
        path
    }

    fn pixel_ops(ops: &[RecordedOp]) -> Vec<RecordedOp> {
        ops.iter()
            .filter(|op| !matches!(op, RecordedOp::Open(_) | RecordedOp::Close(_)))
            .cloned()
            .collect()
    }

    // =========================================================================
    // Plan selection
    // =========================================================================

    #[test]
    fn plan_table() {
        let plain = ProcessingRequest::new("images/forum/", "/tmp/a", 10);
        let marked = plain.clone().with_watermark("@me", Some("Center"));

        assert!(matches!(
            Plan::select(Category::Profile, &DetectedFormat::Gif, &plain),
            Err(ProcessError::InvalidFormat)
        ));
        assert_eq!(
            Plan::select(Category::Profile, &DetectedFormat::Png, &marked).unwrap(),
            Plan::ProfileCrop
        );
        assert_eq!(
            Plan::select(Category::Twitarr, &DetectedFormat::Gif, &marked).unwrap(),
            Plan::AnimatedThumbnail
        );
        assert_eq!(
            Plan::select(Category::Forum, &DetectedFormat::Jpeg, &plain).unwrap(),
            Plan::Generic { watermark: None }
        );
        assert_eq!(
            Plan::select(Category::Other, &DetectedFormat::Jpeg, &marked).unwrap(),
            Plan::Generic {
                watermark: Some(Watermark {
                    text: "@me".into(),
                    gravity: Some("Center".into()),
                })
            }
        );
    }

    #[test]
    fn profile_ignores_watermark() {
        let request =
            ProcessingRequest::new("images/profile/", "/tmp/a", 10).with_watermark("x", None);
        assert_eq!(
            Plan::select(Category::Profile, &DetectedFormat::Jpeg, &request).unwrap(),
            Plan::ProfileCrop
        );
    }

    #[test]
    fn status_codes() {
        assert_eq!(ProcessError::InputNotFound("/x".into()).status_code(), 400);
        assert_eq!(ProcessError::InvalidFormat.status_code(), 400);
        assert_eq!(ProcessError::InvalidRequest("h".into()).status_code(), 400);
        assert_eq!(
            ProcessError::Imaging(ImagingError::FontNotFound("/f".into())).status_code(),
            500
        );
        assert_eq!(
            ProcessError::Imaging(ImagingError::ImageMissing("/i".into())).status_code(),
            500
        );
        assert_eq!(
            ProcessError::Io(std::io::Error::other("disk")).status_code(),
            500
        );
        assert_eq!(
            ProcessError::Imaging(ImagingError::OutputTooLarge {
                width: 9,
                height: 9
            })
            .status_code(),
            400
        );
    }

    #[test]
    fn invalid_format_message() {
        assert_eq!(
            ProcessError::InvalidFormat.to_string(),
            "profile image must be JPEG or PNG"
        );
    }

    // =========================================================================
    // Validation
    // =========================================================================

    #[test]
    fn missing_source_is_input_not_found() {
        let tmp = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(MockBackend::new(), &config_for(&tmp));
        let request = ProcessingRequest::new("images/forum/", tmp.path().join("gone"), 10);

        let err = dispatcher.process(&request).unwrap_err();
        assert!(matches!(err, ProcessError::InputNotFound(_)));
        assert_eq!(err.status_code(), 400);
        assert!(dispatcher.backend().get_operations().is_empty());
    }

    #[test]
    fn zero_height_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "u", MockImage::still("image/jpeg", 10, 10));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let err = dispatcher
            .process(&ProcessingRequest::new("images/forum/", &source, 0))
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidRequest(_)));
        assert!(source.exists());
    }

    #[test]
    fn height_over_limit_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "u", MockImage::still("image/jpeg", 10, 10));
        let mut config = config_for(&tmp);
        config.processing.max_thumbnail_height = 300;
        let dispatcher = Dispatcher::new(backend, &config);

        let err = dispatcher
            .process(&ProcessingRequest::new("images/forum/", &source, 301))
            .unwrap_err();
        assert!(matches!(err, ProcessError::InvalidRequest(ref reason) if reason.contains("300")));
        assert!(dispatcher.backend().get_operations().is_empty());

        dispatcher
            .process(&ProcessingRequest::new("images/forum/", &source, 300))
            .unwrap();
    }

    #[test]
    fn escaping_dest_dir_is_invalid() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "u", MockImage::still("image/jpeg", 10, 10));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        for dest in ["../elsewhere/", "/abs/"] {
            let err = dispatcher
                .process(&ProcessingRequest::new(dest, &source, 10))
                .unwrap_err();
            assert_eq!(err.status_code(), 400, "{dest}");
        }
        assert!(dispatcher.backend().get_operations().is_empty());
    }

    #[test]
    fn profile_gif_rejected_without_side_effects() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let frames = vec![Dimensions { width: 20, height: 10 }; 2];
        let source = upload(&tmp, &backend, "anim", MockImage::animated(frames));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let err = dispatcher
            .process(&ProcessingRequest::new("images/profile/", &source, 10))
            .unwrap_err();

        assert!(matches!(err, ProcessError::InvalidFormat));
        assert!(!tmp.path().join("images").exists());
        assert!(source.exists());
    }

    // =========================================================================
    // Branches (mock backend)
    // =========================================================================

    #[test]
    fn profile_crops_then_thumbnails_written_jpeg() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "avatar", MockImage::still("image/png", 300, 200));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let pair = dispatcher
            .process(&ProcessingRequest::new("images/profile/", &source, 100))
            .unwrap();

        let root = tmp.path().join("images/profile");
        assert_eq!(pair.full, root.join("full/avatar.jpg"));
        assert_eq!(pair.thumbnail, root.join("thumbnail/avatar.png"));
        assert_eq!(fs::read_to_string(&pair.full).unwrap(), "mock:200x200:image/jpeg");
        assert_eq!(fs::read_to_string(&pair.thumbnail).unwrap(), "mock:100x100:image/png");
        assert!(!source.exists());

        let ops = dispatcher.backend().get_operations();
        // Thumbnail is derived from the written full artifact, not the upload
        assert!(ops.contains(&RecordedOp::Open(pair.full.to_string_lossy().to_string())));
        assert_eq!(
            pixel_ops(&ops),
            vec![
                RecordedOp::AutoOrient,
                RecordedOp::Crop(crate::imaging::params::CropRegion {
                    width: 200,
                    height: 200,
                    x: 50,
                    y: 0,
                }),
                RecordedOp::Encode(EncodeFormat::Jpeg(Quality::STANDARD)),
                RecordedOp::AutoOrient,
                RecordedOp::Resize {
                    width: 100,
                    height: 100,
                    filter: Filter::Triangle,
                },
                RecordedOp::Encode(EncodeFormat::Png),
            ]
        );
    }

    #[test]
    fn generic_writes_thumbnail_then_oriented_jpeg() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "post", MockImage::still("image/jpeg", 800, 400));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let pair = dispatcher
            .process(&ProcessingRequest::new("images/forum/", &source, 100))
            .unwrap();

        assert_eq!(fs::read_to_string(&pair.thumbnail).unwrap(), "mock:200x100:image/png");
        assert_eq!(fs::read_to_string(&pair.full).unwrap(), "mock:800x400:image/jpeg");
        let encodes: Vec<_> = dispatcher
            .backend()
            .get_operations()
            .into_iter()
            .filter(|op| matches!(op, RecordedOp::Encode(_)))
            .collect();
        assert_eq!(
            encodes,
            vec![
                RecordedOp::Encode(EncodeFormat::Png),
                RecordedOp::Encode(EncodeFormat::Jpeg(Quality::LOSSLESS_ISH)),
            ]
        );
        assert!(!source.exists());
    }

    #[test]
    fn gif_thumbnail_and_relocation() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let frames = vec![
            Dimensions { width: 100, height: 50 },
            Dimensions { width: 40, height: 40 },
        ];
        let source = upload(&tmp, &backend, "party", MockImage::animated(frames));
        fs::write(&source, b"GIF89a original bytes").unwrap();
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let pair = dispatcher
            .process(&ProcessingRequest::new("images/twitarr/", &source, 20))
            .unwrap();

        let root = tmp.path().join("images/twitarr");
        assert_eq!(pair.full, root.join("full/party.gif"));
        assert_eq!(pair.thumbnail, root.join("thumbnail/party.gif"));
        assert_eq!(fs::read_to_string(&pair.thumbnail).unwrap(), "mock-gif:40x20,20x20");
        assert_eq!(fs::read(&pair.full).unwrap(), b"GIF89a original bytes");
        assert!(!source.exists());
    }

    #[test]
    fn watermark_missing_font_keeps_thumbnail_and_source() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "w", MockImage::still("image/jpeg", 400, 200));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let request =
            ProcessingRequest::new("images/forum/", &source, 50).with_watermark("@me", None);
        let err = dispatcher.process(&request).unwrap_err();

        assert!(matches!(
            err,
            ProcessError::Imaging(ImagingError::FontNotFound(_))
        ));
        assert_eq!(err.status_code(), 500);
        // No rollback: the thumbnail written before the failure stays
        assert!(tmp.path().join("images/forum/thumbnail/w.png").exists());
        assert!(!tmp.path().join("images/forum/full/w.jpg").exists());
        assert!(source.exists());
    }

    #[test]
    fn watermark_uses_configured_font() {
        let tmp = TempDir::new().unwrap();
        let fonts = tmp.path().join("fonts");
        fs::create_dir_all(&fonts).unwrap();
        fs::write(fonts.join("OpenSans-SemiBold.ttf"), b"not parsed by the mock").unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "w", MockImage::still("image/jpeg", 400, 200));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let request = ProcessingRequest::new("images/forum/", &source, 50)
            .with_watermark("@me", Some("BottomLeft"));
        dispatcher.process(&request).unwrap();

        let drew = dispatcher
            .backend()
            .get_operations()
            .into_iter()
            .any(|op| matches!(op, RecordedOp::DrawText { ref text, .. } if text == "@me"));
        assert!(drew);
    }

    #[test]
    fn encode_failure_is_server_error_and_releases_handles() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::failing_encode();
        let source = upload(&tmp, &backend, "x", MockImage::still("image/jpeg", 40, 40));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        let err = dispatcher
            .process(&ProcessingRequest::new("images/forum/", &source, 10))
            .unwrap_err();

        assert_eq!(err.status_code(), 500);
        assert!(source.exists());
        let ops = dispatcher.backend().get_operations();
        let opens = ops.iter().filter(|op| matches!(op, RecordedOp::Open(_))).count();
        let closes = ops.iter().filter(|op| matches!(op, RecordedOp::Close(_))).count();
        assert_eq!(opens, closes);
    }

    #[test]
    fn repeated_requests_reuse_directories() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let first = upload(&tmp, &backend, "one", MockImage::still("image/png", 30, 30));
        let second = upload(&tmp, &backend, "two", MockImage::still("image/png", 30, 30));
        let dispatcher = Dispatcher::new(backend, &config_for(&tmp));

        dispatcher
            .process(&ProcessingRequest::new("images/forum/", &first, 10))
            .unwrap();
        dispatcher
            .process(&ProcessingRequest::new("images/forum/", &second, 10))
            .unwrap();

        assert!(tmp.path().join("images/forum/full/one.jpg").exists());
        assert!(tmp.path().join("images/forum/full/two.jpg").exists());
    }

    #[test]
    fn custom_profile_dir() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new();
        let source = upload(&tmp, &backend, "a", MockImage::still("image/jpeg", 60, 30));
        let mut config = config_for(&tmp);
        config.categories.profile = "avatars/".into();
        let dispatcher = Dispatcher::new(backend, &config);

        let pair = dispatcher
            .process(&ProcessingRequest::new("avatars/", &source, 10))
            .unwrap();
        assert_eq!(fs::read_to_string(&pair.full).unwrap(), "mock:30x30:image/jpeg");
    }

    // =========================================================================
    // Real pixels
    // =========================================================================

    #[test]
    fn real_profile_png_becomes_square_jpeg() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("upload");
        write_png(&source, 120, 80);
        let dispatcher = Dispatcher::new(RustBackend::new(), &config_for(&tmp));

        let pair = dispatcher
            .process(&ProcessingRequest::new("images/profile/", &source, 40))
            .unwrap();

        assert_eq!(sniff_format(&pair.full), image::ImageFormat::Jpeg);
        assert_eq!(decoded_dimensions(&pair.full), (80, 80));
        assert_eq!(sniff_format(&pair.thumbnail), image::ImageFormat::Png);
        assert_eq!(decoded_dimensions(&pair.thumbnail), (40, 40));
        assert!(!source.exists());
    }

    #[test]
    fn real_huge_height_rejected_before_decoding() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("tiny.png");
        write_png(&source, 4, 2);
        let dispatcher = Dispatcher::new(RustBackend::new(), &config_for(&tmp));

        let err = dispatcher
            .process(&ProcessingRequest::new("images/forum/", &source, 200_000))
            .unwrap_err();

        assert!(matches!(err, ProcessError::InvalidRequest(_)));
        assert_eq!(err.status_code(), 400);
        assert!(source.exists());
        assert!(!tmp.path().join("images").exists());
    }

    #[test]
    fn real_identify() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("g");
        write_gif(&source, 10, 10, 2);
        let dispatcher = Dispatcher::new(RustBackend::new(), &config_for(&tmp));
        assert_eq!(dispatcher.identify(&source).unwrap(), "image/gif");
    }
}
