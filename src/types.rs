//! Shared types for requests and results.
//!
//! [`ProcessingRequest`] is the wire shape other services send (the same JSON
//! the `batch` command reads); [`ArtifactPair`] is what a successful request
//! leaves on disk.

use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// An image processing request.
///
/// Field names follow the JSON contract: `destDir`, `imageURL`, `height`,
/// `watermark`, `gravity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingRequest {
    /// Relative destination such as `images/forum/`. Artifacts land in its
    /// `full/` and `thumbnail/` subdirectories.
    #[serde(rename = "destDir")]
    pub dest_dir: String,
    /// The uploaded source file. Accepts a plain path or a `file://` URL.
    #[serde(rename = "imageURL", deserialize_with = "deserialize_image_url")]
    pub image_url: PathBuf,
    /// Thumbnail height in pixels.
    pub height: u32,
    /// Watermark text. Present (even empty) means "watermark the full image".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watermark: Option<String>,
    /// Watermark placement label: `Center`, `BottomLeft`, `Bottom`; otherwise bottom-right.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<String>,
}

impl ProcessingRequest {
    pub fn new(dest_dir: impl Into<String>, image: impl Into<PathBuf>, height: u32) -> Self {
        Self {
            dest_dir: dest_dir.into(),
            image_url: image.into(),
            height,
            watermark: None,
            gravity: None,
        }
    }

    pub fn with_watermark(mut self, text: impl Into<String>, gravity: Option<&str>) -> Self {
        self.watermark = Some(text.into());
        self.gravity = gravity.map(str::to_string);
        self
    }

    pub fn source(&self) -> &Path {
        &self.image_url
    }
}

/// Strip a `file://` scheme, leaving the filesystem path.
pub fn path_from_image_url(raw: &str) -> PathBuf {
    PathBuf::from(raw.strip_prefix("file://").unwrap_or(raw))
}

fn deserialize_image_url<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(path_from_image_url(&raw))
}

/// Destination category derived from `destDir`. Only `Profile` changes behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Profile,
    Forum,
    Twitarr,
    Other,
}

impl Category {
    /// Classify a `destDir` by exact string equality.
    pub fn from_dest_dir(dest_dir: &str, profile_dir: &str) -> Self {
        if dest_dir == profile_dir {
            return Category::Profile;
        }
        match dest_dir {
            "images/forum/" => Category::Forum,
            "images/twitarr/" => Category::Twitarr,
            _ => Category::Other,
        }
    }
}

/// Source format as reported by identify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectedFormat {
    Jpeg,
    Png,
    Gif,
    /// Anything else the backend could decode, carrying its mimetype.
    Other(String),
}

impl DetectedFormat {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "image/jpeg" => DetectedFormat::Jpeg,
            "image/png" => DetectedFormat::Png,
            "image/gif" => DetectedFormat::Gif,
            other => DetectedFormat::Other(other.to_string()),
        }
    }
}

/// Paths of the two artifacts a successful request produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtifactPair {
    pub full: PathBuf,
    pub thumbnail: PathBuf,
}
